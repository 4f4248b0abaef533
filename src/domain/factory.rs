// ==========================================
// 偏好设置子系统 - 偏好工厂
// ==========================================
// 职责: 统一构造各类偏好实例
// - create_xxx(): 绑定层使用的空实例 (标识字段为空)
// - create_user_preference_with(): 运行时构造，校验 owner/key
// ==========================================

use crate::domain::application_preference::ApplicationPreference;
use crate::domain::error::DomainResult;
use crate::domain::module_preference::ModulePreference;
use crate::domain::preference::Preference;
use crate::domain::preferences::Preferences;
use crate::domain::role_preference::RolePreference;
use crate::domain::user_preference::UserPreference;

#[derive(Debug, Default, Clone, Copy)]
pub struct PreferenceFactory;

impl PreferenceFactory {
    pub fn new() -> Self {
        Self
    }

    pub fn create_application_preference(&self) -> ApplicationPreference {
        ApplicationPreference::default()
    }

    pub fn create_module_preference(&self) -> ModulePreference {
        ModulePreference::default()
    }

    pub fn create_role_preference(&self) -> RolePreference {
        RolePreference::default()
    }

    pub fn create_user_preference(&self) -> UserPreference {
        UserPreference::default()
    }

    pub fn create_preferences(&self) -> Preferences {
        Preferences::new()
    }

    /// 创建用户偏好并设置描述
    ///
    /// # 错误
    /// - `DomainError::InvalidArgument`: username 或 key 为空
    pub fn create_user_preference_with(
        username: &str,
        key: &str,
        description: Option<&str>,
    ) -> DomainResult<UserPreference> {
        let mut result = UserPreference::new(username, key)?;
        result.set_description(description.map(str::to_string));
        Ok(result)
    }
}
