// ==========================================
// 偏好设置子系统 - 命名查询注册表
// ==========================================
// 命名规则: <类型简名><后缀>, 如 `UserPreference.findByOwner`
// 名称到 SQL 的映射为静态 match，编译期确定
// ==========================================

use crate::domain::preference::Preference;
use crate::domain::preferences::is_known_type;
use crate::domain::types::PropertyScope;
use crate::repository::error::{RepositoryError, RepositoryResult};

/// 查询全部记录的后缀
pub const FIND_ALL: &str = ".findAll";

/// 按 owner 查询的后缀
pub const FIND_BY_OWNER: &str = ".findByOwner";

/// 查询全部偏好 (不区分类型)
pub const NQ_FIND_ALL: &str = "AbstractPreference.findAll";

/// 按主键查询 (不区分类型)
pub(crate) const NQ_FIND_BY_ID: &str = "AbstractPreference.findById";

/// 命名查询
#[derive(Debug, Clone, Copy)]
pub(crate) struct NamedQuery {
    pub sql: &'static str,
    /// 是否绑定 owner 参数 (?1)
    pub binds_owner: bool,
}

/// 解析类型的命名查询名称
///
/// # 错误
/// - `RepositoryError::TypeMismatch`: T 不在已知偏好类型注册表内
pub fn query_name<T: Preference>(suffix: &str) -> RepositoryResult<String> {
    if !is_known_type(T::TYPE_NAME) {
        return Err(RepositoryError::TypeMismatch(format!(
            "类型 {} 不是合法的偏好类型",
            T::TYPE_NAME
        )));
    }
    Ok(format!("{}{}", T::TYPE_NAME, suffix))
}

/// V_PREFERENCE 查询: 公共列清单 + 各查询自己的条件
macro_rules! select_view {
    ($tail:literal) => {
        concat!(
            "SELECT C_ID, C_TYPE, C_OWNER, C_KEY, C_VALUE, C_BINVALUE, C_FLOAT_VALUE, ",
            "C_DESCRIPTION, C_MINIMUM, C_MAXIMUM, C_FROM_FILE, C_VERSION ",
            "FROM V_PREFERENCE ",
            $tail
        )
    };
}

/// 按名称取命名查询
pub(crate) fn named_query(name: &str) -> Option<NamedQuery> {
    let (sql, binds_owner) = match name {
        NQ_FIND_ALL => (select_view!("ORDER BY C_ID"), false),
        NQ_FIND_BY_ID => (select_view!("WHERE C_ID = ?1"), false),
        // 应用级偏好没有 owner，对任意 owner 都返回全部应用级偏好
        "ApplicationPreference.findAll" | "ApplicationPreference.findByOwner" => (
            select_view!("WHERE C_TYPE = 'APPLICATION' ORDER BY C_ID"),
            false,
        ),
        "ModulePreference.findAll" => (select_view!("WHERE C_TYPE = 'MODULE' ORDER BY C_ID"), false),
        "ModulePreference.findByOwner" => (
            select_view!("WHERE C_TYPE = 'MODULE' AND C_OWNER = ?1 ORDER BY C_ID"),
            true,
        ),
        "RolePreference.findAll" => (select_view!("WHERE C_TYPE = 'ROLE' ORDER BY C_ID"), false),
        "RolePreference.findByOwner" => (
            select_view!("WHERE C_TYPE = 'ROLE' AND C_OWNER = ?1 ORDER BY C_ID"),
            true,
        ),
        "UserPreference.findAll" => (select_view!("WHERE C_TYPE = 'USER' ORDER BY C_ID"), false),
        "UserPreference.findByOwner" => (
            select_view!("WHERE C_TYPE = 'USER' AND C_OWNER = ?1 ORDER BY C_ID"),
            true,
        ),
        _ => return None,
    };
    Some(NamedQuery { sql, binds_owner })
}

// ==========================================
// 写操作 SQL
// ==========================================

pub(crate) const INSERT_BASE_SQL: &str = r#"
    INSERT INTO COR_PREFERENCE (
        C_VALUE, C_BINVALUE, C_FLOAT_VALUE, C_DESCRIPTION,
        C_MINIMUM, C_MAXIMUM, C_FROM_FILE, C_VERSION
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0)
"#;

pub(crate) const UPDATE_BASE_SQL: &str = r#"
    UPDATE COR_PREFERENCE
    SET C_VALUE = ?1, C_BINVALUE = ?2, C_FLOAT_VALUE = ?3, C_DESCRIPTION = ?4,
        C_MINIMUM = ?5, C_MAXIMUM = ?6, C_FROM_FILE = ?7,
        C_VERSION = C_VERSION + 1
    WHERE C_ID = ?8 AND C_VERSION = ?9
"#;

pub(crate) const DELETE_BASE_SQL: &str =
    "DELETE FROM COR_PREFERENCE WHERE C_ID = ?1 AND C_VERSION = ?2";

pub(crate) const SELECT_VERSION_SQL: &str = "SELECT C_VERSION FROM COR_PREFERENCE WHERE C_ID = ?1";

/// 子表插入语句; 应用级子表没有 C_OWNER
pub(crate) fn insert_identity_sql(scope: PropertyScope) -> &'static str {
    match scope {
        PropertyScope::Application => {
            "INSERT INTO COR_APP_PREFERENCE (C_ID, C_TYPE, C_KEY) VALUES (?1, ?2, ?3)"
        }
        PropertyScope::Module => {
            "INSERT INTO COR_MODULE_PREFERENCE (C_ID, C_TYPE, C_OWNER, C_KEY) VALUES (?1, ?2, ?3, ?4)"
        }
        PropertyScope::Role => {
            "INSERT INTO COR_ROLE_PREFERENCE (C_ID, C_TYPE, C_OWNER, C_KEY) VALUES (?1, ?2, ?3, ?4)"
        }
        PropertyScope::User => {
            "INSERT INTO COR_USER_PREFERENCE (C_ID, C_TYPE, C_OWNER, C_KEY) VALUES (?1, ?2, ?3, ?4)"
        }
    }
}

pub(crate) fn delete_identity_sql(scope: PropertyScope) -> &'static str {
    match scope {
        PropertyScope::Application => "DELETE FROM COR_APP_PREFERENCE WHERE C_ID = ?1",
        PropertyScope::Module => "DELETE FROM COR_MODULE_PREFERENCE WHERE C_ID = ?1",
        PropertyScope::Role => "DELETE FROM COR_ROLE_PREFERENCE WHERE C_ID = ?1",
        PropertyScope::User => "DELETE FROM COR_USER_PREFERENCE WHERE C_ID = ?1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AnyPreference, ModulePreference, UserPreference};

    #[test]
    fn test_query_name_for_known_types() {
        assert_eq!(
            query_name::<UserPreference>(FIND_BY_OWNER).unwrap(),
            "UserPreference.findByOwner"
        );
        assert_eq!(
            query_name::<ModulePreference>(FIND_ALL).unwrap(),
            "ModulePreference.findAll"
        );
    }

    #[test]
    fn test_query_name_rejects_polymorphic_type() {
        assert!(matches!(
            query_name::<AnyPreference>(FIND_ALL),
            Err(RepositoryError::TypeMismatch(_))
        ));
    }

    #[test]
    fn test_every_known_type_has_both_queries() {
        for type_name in crate::domain::preferences::TYPES {
            for suffix in [FIND_ALL, FIND_BY_OWNER] {
                let name = format!("{}{}", type_name, suffix);
                assert!(named_query(&name).is_some(), "缺少命名查询 {}", name);
            }
        }
        assert!(named_query(NQ_FIND_ALL).is_some());
        assert!(named_query("UserPreference.findByKey").is_none());

        let by_owner = named_query("RolePreference.findByOwner").unwrap();
        assert!(by_owner.binds_owner);
        assert!(by_owner
            .sql
            .ends_with("FROM V_PREFERENCE WHERE C_TYPE = 'ROLE' AND C_OWNER = ?1 ORDER BY C_ID"));
    }
}
