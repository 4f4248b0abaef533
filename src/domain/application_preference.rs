// ==========================================
// 偏好设置子系统 - 应用级偏好
// ==========================================
// 存储: COR_APP_PREFERENCE, 唯一约束 (C_TYPE, C_KEY)
// 说明: 全局生效，没有 owner
// ==========================================

use crate::domain::error::{require_text, DomainResult};
use crate::domain::preference::{AnyPreference, Preference, PreferenceAttributes, PreferenceKey};
use crate::domain::types::PropertyScope;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename = "applicationPreference")]
pub struct ApplicationPreference {
    #[serde(flatten)]
    attributes: PreferenceAttributes,
    key: String,
}

impl ApplicationPreference {
    /// 创建应用级偏好
    ///
    /// # 错误
    /// - `DomainError::InvalidArgument`: key 为空
    pub fn new(key: impl Into<String>) -> DomainResult<Self> {
        let key = key.into();
        require_text(&key, "不允许创建 key 为空的 ApplicationPreference")?;
        Ok(Self {
            attributes: PreferenceAttributes::default(),
            key,
        })
    }

    pub(crate) fn from_parts(key: String, attributes: PreferenceAttributes) -> Self {
        Self { attributes, key }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Preference for ApplicationPreference {
    const TYPE_NAME: &'static str = "ApplicationPreference";

    fn scope(&self) -> PropertyScope {
        PropertyScope::Application
    }

    fn fields(&self) -> Vec<Option<String>> {
        vec![Some(self.scope().to_string()), Some(self.key.clone())]
    }

    fn pref_key(&self) -> PreferenceKey {
        PreferenceKey::new(self.scope(), None, self.key.clone())
    }

    fn attributes(&self) -> &PreferenceAttributes {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut PreferenceAttributes {
        &mut self.attributes
    }

    fn into_any(self) -> AnyPreference {
        AnyPreference::Application(self)
    }

    fn from_any(any: AnyPreference) -> Option<Self> {
        match any {
            AnyPreference::Application(p) => Some(p),
            _ => None,
        }
    }
}

impl PartialEq for ApplicationPreference {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ApplicationPreference {}

impl Hash for ApplicationPreference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pref_key().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_preference_has_no_owner() {
        let pref = ApplicationPreference::new("LOCALE").unwrap();
        assert_eq!(pref.pref_key().owner, None);
        assert_eq!(pref.fields().len(), 2);
        assert!(ApplicationPreference::new(" ").is_err());
    }
}
