// ==========================================
// 偏好设置子系统 - 用户级偏好
// ==========================================
// 存储: COR_USER_PREFERENCE, 唯一约束 (C_TYPE, C_OWNER, C_KEY)
// 说明: 只属于某一个用户，不会被其他作用域的偏好覆盖
// ==========================================

use crate::domain::error::{require_text, DomainResult};
use crate::domain::preference::{AnyPreference, Preference, PreferenceAttributes, PreferenceKey};
use crate::domain::types::PropertyScope;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// 用户级偏好
///
/// `Default` 构造的实例 owner/key 为空，仅供绑定层反序列化使用；
/// 运行时请使用 [`UserPreference::new`]。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename = "userPreference")]
pub struct UserPreference {
    #[serde(flatten)]
    attributes: PreferenceAttributes,
    /// 用户名
    owner: String,
    key: String,
}

impl UserPreference {
    /// 创建用户偏好
    ///
    /// # 错误
    /// - `DomainError::InvalidArgument`: owner 或 key 为空
    pub fn new(owner: impl Into<String>, key: impl Into<String>) -> DomainResult<Self> {
        let owner = owner.into();
        let key = key.into();
        require_text(&owner, "不允许创建 owner 为空的 UserPreference")?;
        require_text(&key, "不允许创建 key 为空的 UserPreference")?;
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

impl Preference for UserPreference {
    const TYPE_NAME: &'static str = "UserPreference";

    fn scope(&self) -> PropertyScope {
        PropertyScope::User
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
        AnyPreference::User(self)
    }

    fn from_any(any: AnyPreference) -> Option<Self> {
        match any {
            AnyPreference::User(p) => Some(p),
            _ => None,
        }
    }
}

// 以 type + owner + key 判等，不比较代理主键和值字段
impl PartialEq for UserPreference {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner && self.key == other.key
    }
}

impl Eq for UserPreference {}

impl Hash for UserPreference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pref_key().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::DomainError;
    use std::collections::HashSet;

    #[test]
    fn test_new_rejects_empty_owner_or_key() {
        assert!(matches!(
            UserPreference::new("", "key1"),
            Err(DomainError::InvalidArgument(_))
        ));
        assert!(matches!(
            UserPreference::new("owner1", ""),
            Err(DomainError::InvalidArgument(_))
        ));
        assert!(matches!(
            UserPreference::new("owner1", "  "),
            Err(DomainError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_equality_by_identity_only() {
        let mut a = UserPreference::new("bob", "theme").unwrap();
        let mut b = UserPreference::new("bob", "theme").unwrap();
        a.attributes_mut().assign_identity(1, 0);
        b.attributes_mut().assign_identity(42, 3);
        b.set_value(Some("dark".to_string()));
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a.clone());
        assert!(set.contains(&b));

        let c = UserPreference::new("alice", "theme").unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_pref_key() {
        let pref = UserPreference::new("bob", "theme").unwrap();
        assert_eq!(
            pref.pref_key(),
            PreferenceKey::new(PropertyScope::User, Some("bob".to_string()), "theme")
        );
        assert!(pref.is_new());
        assert!(pref.is_from_file());
    }

    #[test]
    fn test_binding_attribute_names() {
        let mut pref = UserPreference::new("bob", "theme").unwrap();
        pref.set_value(Some("dark".to_string()));
        pref.set_float_value(Some(0.5));
        pref.set_bin_value(Some(vec![1, 2, 3]));

        let json = serde_json::to_value(&pref).unwrap();
        assert_eq!(json["val"], "dark");
        assert_eq!(json["floatValue"], 0.5);
        assert_eq!(json["owner"], "bob");
        assert_eq!(json["key"], "theme");
        assert!(json.get("bin_value").is_none());
        assert!(json.get("version").is_none());

        let back: UserPreference = serde_json::from_value(json).unwrap();
        assert_eq!(back, pref);
        assert!(back.is_from_file());
        assert!(back.bin_value().is_none());
    }
}
