// ==========================================
// 偏好设置子系统 - 领域模型层
// ==========================================
// 职责: 偏好实体、作用域类型、偏好工厂
// 红线: 不含数据访问逻辑
// ==========================================

pub mod application_preference;
pub mod error;
pub mod factory;
pub mod module_preference;
pub mod preference;
pub mod preferences;
pub mod role_preference;
pub mod types;
pub mod user_preference;

// 重导出核心类型
pub use application_preference::ApplicationPreference;
pub use error::{DomainError, DomainResult};
pub use factory::PreferenceFactory;
pub use module_preference::ModulePreference;
pub use preference::{AnyPreference, Preference, PreferenceAttributes, PreferenceKey};
pub use preferences::Preferences;
pub use role_preference::RolePreference;
pub use types::PropertyScope;
pub use user_preference::UserPreference;
