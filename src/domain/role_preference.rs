// ==========================================
// 偏好设置子系统 - 角色级偏好
// ==========================================
// 存储: COR_ROLE_PREFERENCE, 唯一约束 (C_TYPE, C_OWNER, C_KEY)
// ==========================================

use crate::domain::error::{require_text, DomainResult};
use crate::domain::preference::{AnyPreference, Preference, PreferenceAttributes, PreferenceKey};
use crate::domain::types::PropertyScope;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// 角色级偏好，对持有该角色的所有用户生效
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename = "rolePreference")]
pub struct RolePreference {
    #[serde(flatten)]
    attributes: PreferenceAttributes,
    /// 角色名
    owner: String,
    key: String,
}

impl RolePreference {
    pub fn new(role_name: impl Into<String>, key: impl Into<String>) -> DomainResult<Self> {
        let owner = role_name.into();
        let key = key.into();
        require_text(&owner, "不允许创建角色名为空的 RolePreference")?;
        require_text(&key, "不允许创建 key 为空的 RolePreference")?;
        Ok(Self {
            attributes: PreferenceAttributes::default(),
            owner,
            key,
        })
    }

    pub(crate) fn from_parts(owner: String, key: String, attributes: PreferenceAttributes) -> Self {
        Self {
            attributes,
            owner,
            key,
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Preference for RolePreference {
    const TYPE_NAME: &'static str = "RolePreference";

    fn scope(&self) -> PropertyScope {
        PropertyScope::Role
    }

    fn fields(&self) -> Vec<Option<String>> {
        vec![
            Some(self.scope().to_string()),
            Some(self.owner.clone()),
            Some(self.key.clone()),
        ]
    }

    fn pref_key(&self) -> PreferenceKey {
        PreferenceKey::new(self.scope(), Some(self.owner.clone()), self.key.clone())
    }

    fn attributes(&self) -> &PreferenceAttributes {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut PreferenceAttributes {
        &mut self.attributes
    }

    fn into_any(self) -> AnyPreference {
        AnyPreference::Role(self)
    }

    fn from_any(any: AnyPreference) -> Option<Self> {
        match any {
            AnyPreference::Role(p) => Some(p),
            _ => None,
        }
    }
}

impl PartialEq for RolePreference {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner && self.key == other.key
    }
}

impl Eq for RolePreference {}

impl Hash for RolePreference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pref_key().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_preference_identity() {
        assert!(RolePreference::new("", "key").is_err());
        let a = RolePreference::new("ROLE_ADMIN", "dashboard").unwrap();
        let b = RolePreference::new("ROLE_ADMIN", "dashboard").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.pref_key().owner.as_deref(), Some("ROLE_ADMIN"));
        assert_eq!(a.scope(), PropertyScope::Role);
    }
}
