// ==========================================
// 仓储管理系统 - 偏好设置子系统
// ==========================================
// 技术栈: Rust + SQLite (rusqlite)
// 职责: 应用/模块/角色/用户四级偏好的模型与数据访问
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 配置层 - 存储配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/schema）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

pub use domain::{
    AnyPreference, ApplicationPreference, DomainError, ModulePreference, Preference,
    PreferenceFactory, PreferenceKey, Preferences, PropertyScope, RolePreference, UserPreference,
};

pub use repository::{
    PreferenceDao, PreferenceWriter, PreferencesDaoImpl, RepositoryError, RepositoryResult,
};

pub use config::StoreConfig;

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
