// ==========================================
// 偏好设置子系统 - 偏好基础模型
// ==========================================
// 职责: 所有偏好共享的属性、PreferenceKey、Preference trait
//       以及多态结果 AnyPreference
// 红线: 不含数据访问逻辑
// ==========================================

use crate::domain::application_preference::ApplicationPreference;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::module_preference::ModulePreference;
use crate::domain::role_preference::RolePreference;
use crate::domain::types::PropertyScope;
use crate::domain::user_preference::UserPreference;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// 诊断输出中空值的占位符
const NULL_TEXT: &str = "<null>";

// ==========================================
// PreferenceKey - 偏好逻辑标识
// ==========================================
/// (scope, owner, key) 组合，在作用域内唯一定位一条偏好
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PreferenceKey {
    pub scope: PropertyScope,
    pub owner: Option<String>,
    pub key: String,
}

impl PreferenceKey {
    pub fn new(scope: PropertyScope, owner: Option<String>, key: impl Into<String>) -> Self {
        Self {
            scope,
            owner,
            key: key.into(),
        }
    }
}

impl fmt::Display for PreferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.owner {
            Some(owner) => write!(f, "{}/{}/{}", self.scope, owner, self.key),
            None => write!(f, "{}/{}", self.scope, self.key),
        }
    }
}

// ==========================================
// PreferenceAttributes - 共享属性
// ==========================================
// 对应 COR_PREFERENCE 基表
// id/bin_value/from_file/version 不参与绑定层序列化
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferenceAttributes {
    #[serde(skip)]
    pub(crate) id: Option<i64>,
    #[serde(rename = "val", default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip)]
    pub bin_value: Option<Vec<u8>>,
    #[serde(rename = "floatValue", default, skip_serializing_if = "Option::is_none")]
    pub float_value: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub minimum: i32,
    #[serde(default)]
    pub maximum: i32,
    #[serde(skip, default = "default_from_file")]
    pub from_file: bool,
    #[serde(skip)]
    pub(crate) version: i64,
}

fn default_from_file() -> bool {
    true
}

impl Default for PreferenceAttributes {
    fn default() -> Self {
        Self {
            id: None,
            value: None,
            bin_value: None,
            float_value: None,
            description: None,
            minimum: 0,
            maximum: 0,
            from_file: true,
            version: 0,
        }
    }
}

impl PreferenceAttributes {
    /// 由仓储层在读库/写库后回填存储分配的标识与版本
    pub(crate) fn assign_identity(&mut self, id: i64, version: i64) {
        self.id = Some(id);
        self.version = version;
    }

    /// 写库前校验: SQLite 会把 NaN 存为 NULL，读回后与内存状态不一致
    pub(crate) fn validate(&self) -> DomainResult<()> {
        if self.float_value.is_some_and(f32::is_nan) {
            return Err(DomainError::InvalidArgument(
                "floatValue 不允许为 NaN".to_string(),
            ));
        }
        Ok(())
    }

    /// 判断两份属性的可写字段是否一致 (不比较 id/version)
    pub(crate) fn same_content(&self, other: &Self) -> bool {
        self.value == other.value
            && self.bin_value == other.bin_value
            && float_bits(self.float_value) == float_bits(other.float_value)
            && self.description == other.description
            && self.minimum == other.minimum
            && self.maximum == other.maximum
            && self.from_file == other.from_file
    }
}

fn float_bits(v: Option<f32>) -> Option<u32> {
    v.map(f32::to_bits)
}

// 值相等: 比较全部值字段 (含 version)，不比较代理主键
impl PartialEq for PreferenceAttributes {
    fn eq(&self, other: &Self) -> bool {
        self.same_content(other) && self.version == other.version
    }
}

impl Eq for PreferenceAttributes {}

impl Hash for PreferenceAttributes {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bin_value.hash(state);
        self.description.hash(state);
        float_bits(self.float_value).hash(state);
        self.from_file.hash(state);
        self.maximum.hash(state);
        self.minimum.hash(state);
        self.value.hash(state);
        self.version.hash(state);
    }
}

// ==========================================
// Preference trait - 各作用域偏好的公共行为
// ==========================================
/// 具体偏好类型实现本 trait；相等性必须与 `pref_key()` 保持一致
pub trait Preference: Clone + fmt::Debug {
    /// 类型简名，用于拼接命名查询 (如 `UserPreference.findByOwner`)
    const TYPE_NAME: &'static str;

    /// 该偏好的作用域
    fn scope(&self) -> PropertyScope;

    /// 标识字段元组，仅用于诊断输出
    fn fields(&self) -> Vec<Option<String>>;

    fn pref_key(&self) -> PreferenceKey;

    fn attributes(&self) -> &PreferenceAttributes;

    fn attributes_mut(&mut self) -> &mut PreferenceAttributes;

    fn into_any(self) -> AnyPreference;

    /// 从多态结果还原为具体类型，类型不符时返回 None
    fn from_any(any: AnyPreference) -> Option<Self>;

    fn id(&self) -> Option<i64> {
        self.attributes().id
    }

    /// 尚未持久化 (无存储分配的 id)
    fn is_new(&self) -> bool {
        self.attributes().id.is_none()
    }

    fn version(&self) -> i64 {
        self.attributes().version
    }

    fn value(&self) -> Option<&str> {
        self.attributes().value.as_deref()
    }

    fn set_value(&mut self, value: Option<String>) {
        self.attributes_mut().value = value;
    }

    fn bin_value(&self) -> Option<&[u8]> {
        self.attributes().bin_value.as_deref()
    }

    fn set_bin_value(&mut self, bin_value: Option<Vec<u8>>) {
        self.attributes_mut().bin_value = bin_value;
    }

    fn float_value(&self) -> Option<f32> {
        self.attributes().float_value
    }

    fn set_float_value(&mut self, float_value: Option<f32>) {
        self.attributes_mut().float_value = float_value;
    }

    fn description(&self) -> Option<&str> {
        self.attributes().description.as_deref()
    }

    fn set_description(&mut self, description: Option<String>) {
        self.attributes_mut().description = description;
    }

    fn minimum(&self) -> i32 {
        self.attributes().minimum
    }

    fn set_minimum(&mut self, minimum: i32) {
        self.attributes_mut().minimum = minimum;
    }

    fn maximum(&self) -> i32 {
        self.attributes().maximum
    }

    fn set_maximum(&mut self, maximum: i32) {
        self.attributes_mut().maximum = maximum;
    }

    /// 是否最初由配置文件导入
    fn is_from_file(&self) -> bool {
        self.attributes().from_file
    }

    fn set_from_file(&mut self, from_file: bool) {
        self.attributes_mut().from_file = from_file;
    }

    /// 拼接标识字段与值字段，仅供日志/调试
    ///
    /// 格式: `{SCOPE,owner,key},value,description,floatValue,minimum,maximum`
    fn properties_as_string(&self) -> String {
        let attrs = self.attributes();
        let fields = self
            .fields()
            .into_iter()
            .map(|f| f.unwrap_or_else(|| NULL_TEXT.to_string()))
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "{{{}}},{},{},{},{},{}",
            fields,
            attrs.value.as_deref().unwrap_or(NULL_TEXT),
            attrs.description.as_deref().unwrap_or(NULL_TEXT),
            attrs
                .float_value
                .map(|v| format!("{:?}", v))
                .unwrap_or_else(|| NULL_TEXT.to_string()),
            attrs.minimum,
            attrs.maximum,
        )
    }
}

// ==========================================
// AnyPreference - 多态偏好
// ==========================================
// find_by_key / find_all 的返回类型
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnyPreference {
    Application(ApplicationPreference),
    Module(ModulePreference),
    Role(RolePreference),
    User(UserPreference),
}

impl AnyPreference {
    /// 由存储行组装，不做参数校验 (库内数据视为可信)
    pub(crate) fn from_parts(
        scope: PropertyScope,
        owner: Option<String>,
        key: String,
        attributes: PreferenceAttributes,
    ) -> Self {
        let owner = owner.unwrap_or_default();
        match scope {
            PropertyScope::Application => {
                AnyPreference::Application(ApplicationPreference::from_parts(key, attributes))
            }
            PropertyScope::Module => {
                AnyPreference::Module(ModulePreference::from_parts(owner, key, attributes))
            }
            PropertyScope::Role => {
                AnyPreference::Role(RolePreference::from_parts(owner, key, attributes))
            }
            PropertyScope::User => {
                AnyPreference::User(UserPreference::from_parts(owner, key, attributes))
            }
        }
    }

    /// 具体类型简名
    pub fn type_name(&self) -> &'static str {
        match self {
            AnyPreference::Application(_) => ApplicationPreference::TYPE_NAME,
            AnyPreference::Module(_) => ModulePreference::TYPE_NAME,
            AnyPreference::Role(_) => RolePreference::TYPE_NAME,
            AnyPreference::User(_) => UserPreference::TYPE_NAME,
        }
    }
}

impl Preference for AnyPreference {
    const TYPE_NAME: &'static str = "AbstractPreference";

    fn scope(&self) -> PropertyScope {
        match self {
            AnyPreference::Application(p) => p.scope(),
            AnyPreference::Module(p) => p.scope(),
            AnyPreference::Role(p) => p.scope(),
            AnyPreference::User(p) => p.scope(),
        }
    }

    fn fields(&self) -> Vec<Option<String>> {
        match self {
            AnyPreference::Application(p) => p.fields(),
            AnyPreference::Module(p) => p.fields(),
            AnyPreference::Role(p) => p.fields(),
            AnyPreference::User(p) => p.fields(),
        }
    }

    fn pref_key(&self) -> PreferenceKey {
        match self {
            AnyPreference::Application(p) => p.pref_key(),
            AnyPreference::Module(p) => p.pref_key(),
            AnyPreference::Role(p) => p.pref_key(),
            AnyPreference::User(p) => p.pref_key(),
        }
    }

    fn attributes(&self) -> &PreferenceAttributes {
        match self {
            AnyPreference::Application(p) => p.attributes(),
            AnyPreference::Module(p) => p.attributes(),
            AnyPreference::Role(p) => p.attributes(),
            AnyPreference::User(p) => p.attributes(),
        }
    }

    fn attributes_mut(&mut self) -> &mut PreferenceAttributes {
        match self {
            AnyPreference::Application(p) => p.attributes_mut(),
            AnyPreference::Module(p) => p.attributes_mut(),
            AnyPreference::Role(p) => p.attributes_mut(),
            AnyPreference::User(p) => p.attributes_mut(),
        }
    }

    fn into_any(self) -> AnyPreference {
        self
    }

    fn from_any(any: AnyPreference) -> Option<Self> {
        Some(any)
    }
}

impl From<ApplicationPreference> for AnyPreference {
    fn from(p: ApplicationPreference) -> Self {
        AnyPreference::Application(p)
    }
}

impl From<ModulePreference> for AnyPreference {
    fn from(p: ModulePreference) -> Self {
        AnyPreference::Module(p)
    }
}

impl From<RolePreference> for AnyPreference {
    fn from(p: RolePreference) -> Self {
        AnyPreference::Role(p)
    }
}

impl From<UserPreference> for AnyPreference {
    fn from(p: UserPreference) -> Self {
        AnyPreference::User(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_defaults() {
        let attrs = PreferenceAttributes::default();
        assert!(attrs.id.is_none());
        assert!(attrs.from_file);
        assert_eq!(attrs.minimum, 0);
        assert_eq!(attrs.maximum, 0);
        assert_eq!(attrs.version, 0);
    }

    #[test]
    fn test_attributes_value_equality_ignores_id() {
        let mut a = PreferenceAttributes {
            value: Some("10".to_string()),
            float_value: Some(1.5),
            ..Default::default()
        };
        let mut b = a.clone();
        a.assign_identity(1, 0);
        b.assign_identity(2, 0);
        assert_eq!(a, b);

        b.version = 1;
        assert_ne!(a, b);
        assert!(a.same_content(&b));

        b.float_value = Some(2.5);
        assert!(!a.same_content(&b));
    }

    #[test]
    fn test_validate_rejects_nan_float() {
        let mut attrs = PreferenceAttributes {
            float_value: Some(0.5),
            ..Default::default()
        };
        assert!(attrs.validate().is_ok());

        attrs.float_value = Some(f32::NAN);
        assert!(matches!(
            attrs.validate(),
            Err(DomainError::InvalidArgument(_))
        ));

        attrs.float_value = None;
        assert!(attrs.validate().is_ok());
    }

    #[test]
    fn test_properties_as_string() {
        let mut pref = UserPreference::new("bob", "theme").unwrap();
        pref.set_value(Some("dark".to_string()));
        pref.set_float_value(Some(1.5));
        pref.set_maximum(3);
        assert_eq!(
            pref.properties_as_string(),
            "{USER,bob,theme},dark,<null>,1.5,0,3"
        );

        // 整数值的浮点也保留小数位
        pref.set_float_value(Some(2.0));
        assert_eq!(
            pref.properties_as_string(),
            "{USER,bob,theme},dark,<null>,2.0,0,3"
        );

        let app = ApplicationPreference::new("LOCALE").unwrap();
        assert_eq!(
            app.properties_as_string(),
            "{APPLICATION,LOCALE},<null>,<null>,<null>,0,0"
        );
    }

    #[test]
    fn test_any_preference_delegates() {
        let user = UserPreference::new("alice", "lang").unwrap();
        let any: AnyPreference = user.clone().into();
        assert_eq!(any.scope(), PropertyScope::User);
        assert_eq!(any.type_name(), "UserPreference");
        assert_eq!(any.pref_key(), user.pref_key());
        assert_eq!(UserPreference::from_any(any.clone()), Some(user));
        assert_eq!(RolePreference::from_any(any), None);
    }

    #[test]
    fn test_preference_key_display() {
        let key = PreferenceKey::new(PropertyScope::User, Some("bob".to_string()), "theme");
        assert_eq!(key.to_string(), "USER/bob/theme");
        let key = PreferenceKey::new(PropertyScope::Application, None, "LOCALE");
        assert_eq!(key.to_string(), "APPLICATION/LOCALE");
    }
}
