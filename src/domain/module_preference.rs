// ==========================================
// 偏好设置子系统 - 模块级偏好
// ==========================================
// 存储: COR_MODULE_PREFERENCE, 唯一约束 (C_TYPE, C_OWNER, C_KEY)
// ==========================================

use crate::domain::error::{require_text, DomainResult};
use crate::domain::preference::{AnyPreference, Preference, PreferenceAttributes, PreferenceKey};
use crate::domain::types::PropertyScope;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// 模块级偏好，对某一业务模块生效
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename = "modulePreference")]
pub struct ModulePreference {
    #[serde(flatten)]
    attributes: PreferenceAttributes,
    /// 模块名
    owner: String,
    key: String,
}

impl ModulePreference {
    pub fn new(module_name: impl Into<String>, key: impl Into<String>) -> DomainResult<Self> {
        let owner = module_name.into();
        let key = key.into();
        require_text(&owner, "不允许创建模块名为空的 ModulePreference")?;
        require_text(&key, "不允许创建 key 为空的 ModulePreference")?;
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

impl Preference for ModulePreference {
    const TYPE_NAME: &'static str = "ModulePreference";

    fn scope(&self) -> PropertyScope {
        PropertyScope::Module
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
        AnyPreference::Module(self)
    }

    fn from_any(any: AnyPreference) -> Option<Self> {
        match any {
            AnyPreference::Module(p) => Some(p),
            _ => None,
        }
    }
}

impl PartialEq for ModulePreference {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner && self.key == other.key
    }
}

impl Eq for ModulePreference {}

impl Hash for ModulePreference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pref_key().hash(state);
    }
}
