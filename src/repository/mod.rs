// ==========================================
// 偏好设置子系统 - 数据仓储层
// ==========================================
// 职责: 提供偏好的数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// 约束: 所有操作要求调用方已开启事务
// ==========================================

pub mod error;
pub mod preference_dao;
pub mod preference_dao_impl;
pub mod queries;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use preference_dao::{PreferenceDao, PreferenceWriter};
pub use preference_dao_impl::PreferencesDaoImpl;
pub use queries::{query_name, FIND_ALL, FIND_BY_OWNER, NQ_FIND_ALL};
