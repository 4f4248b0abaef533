// ==========================================
// 偏好设置子系统 - 偏好集合 (绑定层根元素)
// ==========================================
// 职责: 按作用域分组保存偏好；维护已知偏好类型注册表
// ==========================================

use crate::domain::application_preference::ApplicationPreference;
use crate::domain::module_preference::ModulePreference;
use crate::domain::preference::{AnyPreference, Preference};
use crate::domain::role_preference::RolePreference;
use crate::domain::user_preference::UserPreference;
use serde::{Deserialize, Serialize};

/// 已知偏好类型 (类型简名)
///
/// 仓储层只为这些类型提供按类型查询
pub const TYPES: [&str; 4] = [
    ApplicationPreference::TYPE_NAME,
    ModulePreference::TYPE_NAME,
    RolePreference::TYPE_NAME,
    UserPreference::TYPE_NAME,
];

/// 判断类型简名是否在注册表内
pub fn is_known_type(type_name: &str) -> bool {
    TYPES.contains(&type_name)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename = "preferences")]
pub struct Preferences {
    #[serde(rename = "applicationPreference", default)]
    pub application: Vec<ApplicationPreference>,
    #[serde(rename = "modulePreference", default)]
    pub module: Vec<ModulePreference>,
    #[serde(rename = "rolePreference", default)]
    pub role: Vec<RolePreference>,
    #[serde(rename = "userPreference", default)]
    pub user: Vec<UserPreference>,
}

impl Preferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按作用域放入对应分组
    pub fn add(&mut self, preference: impl Into<AnyPreference>) {
        match preference.into() {
            AnyPreference::Application(p) => self.application.push(p),
            AnyPreference::Module(p) => self.module.push(p),
            AnyPreference::Role(p) => self.role.push(p),
            AnyPreference::User(p) => self.user.push(p),
        }
    }

    /// 全部偏好 (应用 → 模块 → 角色 → 用户)
    pub fn all(&self) -> Vec<AnyPreference> {
        self.application
            .iter()
            .cloned()
            .map(AnyPreference::from)
            .chain(self.module.iter().cloned().map(AnyPreference::from))
            .chain(self.role.iter().cloned().map(AnyPreference::from))
            .chain(self.user.iter().cloned().map(AnyPreference::from))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.application.len() + self.module.len() + self.role.len() + self.user.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<AnyPreference> for Preferences {
    fn from_iter<I: IntoIterator<Item = AnyPreference>>(iter: I) -> Self {
        let mut prefs = Preferences::new();
        for p in iter {
            prefs.add(p);
        }
        prefs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::PropertyScope;

    #[test]
    fn test_known_types() {
        assert!(is_known_type("UserPreference"));
        assert!(is_known_type("ApplicationPreference"));
        assert!(!is_known_type(AnyPreference::TYPE_NAME));
        assert!(!is_known_type("userpreference"));
    }

    #[test]
    fn test_add_groups_by_scope() {
        let mut prefs = Preferences::new();
        assert!(prefs.is_empty());
        prefs.add(UserPreference::new("bob", "theme").unwrap());
        prefs.add(ApplicationPreference::new("LOCALE").unwrap());
        prefs.add(RolePreference::new("ROLE_ADMIN", "menu").unwrap());

        assert_eq!(prefs.len(), 3);
        assert_eq!(prefs.user.len(), 1);
        let scopes: Vec<_> = prefs.all().iter().map(|p| p.scope()).collect();
        assert_eq!(
            scopes,
            vec![PropertyScope::Application, PropertyScope::Role, PropertyScope::User]
        );
    }

    #[test]
    fn test_serialized_group_names() {
        let prefs: Preferences = vec![AnyPreference::from(
            ModulePreference::new("INVENTORY", "pageSize").unwrap(),
        )]
        .into_iter()
        .collect();
        let json = serde_json::to_value(&prefs).unwrap();
        assert_eq!(json["modulePreference"][0]["owner"], "INVENTORY");
        assert_eq!(json["userPreference"].as_array().map(Vec::len), Some(0));
    }
}
