// ==========================================
// 偏好设置子系统 - 领域类型定义
// ==========================================
// 职责: 偏好作用域 (PropertyScope) 及其数据库映射
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 偏好作用域 (Property Scope)
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库 C_TYPE 列一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyScope {
    Application, // 应用级 (全局)
    Module,      // 模块级
    Role,        // 角色级
    User,        // 用户级
}

impl PropertyScope {
    /// 全部作用域, 按覆盖优先级从低到高排列
    pub const ALL: [PropertyScope; 4] = [
        PropertyScope::Application,
        PropertyScope::Module,
        PropertyScope::Role,
        PropertyScope::User,
    ];

    /// 从数据库字符串解析
    ///
    /// 未知取值返回 None，由调用方决定如何处理脏数据
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "APPLICATION" => Some(PropertyScope::Application),
            "MODULE" => Some(PropertyScope::Module),
            "ROLE" => Some(PropertyScope::Role),
            "USER" => Some(PropertyScope::User),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            PropertyScope::Application => "APPLICATION",
            PropertyScope::Module => "MODULE",
            PropertyScope::Role => "ROLE",
            PropertyScope::User => "USER",
        }
    }

    /// 该作用域的偏好是否带有 owner
    pub fn has_owner(&self) -> bool {
        !matches!(self, PropertyScope::Application)
    }
}

impl fmt::Display for PropertyScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_db_str_roundtrip() {
        for scope in PropertyScope::ALL {
            assert_eq!(PropertyScope::from_db_str(scope.to_db_str()), Some(scope));
        }
        assert_eq!(PropertyScope::from_db_str("user"), Some(PropertyScope::User));
        assert_eq!(PropertyScope::from_db_str("GLOBAL"), None);
    }

    #[test]
    fn test_scope_owner_flag() {
        assert!(!PropertyScope::Application.has_owner());
        assert!(PropertyScope::User.has_owner());
        assert_eq!(PropertyScope::Role.to_string(), "ROLE");
    }
}
