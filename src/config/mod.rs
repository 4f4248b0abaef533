// ==========================================
// 偏好设置子系统 - 配置层
// ==========================================
// 职责: 偏好存储的连接配置 (数据库路径、busy_timeout)
// 来源: 环境变量，缺省落到用户数据目录
// ==========================================

pub mod store_config;

pub use store_config::{env_keys, StoreConfig};
