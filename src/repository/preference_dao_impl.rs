// ==========================================
// 偏好设置子系统 - 偏好数据访问实现 (SQLite)
// ==========================================
// 职责: 基于 rusqlite 实现 PreferenceWriter
// 存储: COR_PREFERENCE 基表 + 各作用域子表 (联合继承)，读取走 V_PREFERENCE 视图
// 约束:
// - 借用调用方的连接，连接必须处于事务中 (强制传播)
// - 一个实例对应一个事务，实例内维护持久化上下文 (id -> version)
// - 乐观锁基于 C_VERSION，冲突原样上抛，不重试
// ==========================================

use crate::domain::error::require_text;
use crate::domain::preference::{AnyPreference, Preference, PreferenceAttributes};
use crate::domain::types::PropertyScope;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::preference_dao::{PreferenceDao, PreferenceWriter};
use crate::repository::queries::{
    delete_identity_sql, insert_identity_sql, named_query, query_name, DELETE_BASE_SQL,
    FIND_ALL, FIND_BY_OWNER, INSERT_BASE_SQL, NQ_FIND_ALL, NQ_FIND_BY_ID, SELECT_VERSION_SQL,
    UPDATE_BASE_SQL,
};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::cell::RefCell;
use std::collections::HashMap;
use tracing::{debug, warn};

// ==========================================
// PreferencesDaoImpl - 偏好仓储
// ==========================================
pub struct PreferencesDaoImpl<'conn> {
    conn: &'conn Connection,
    /// 持久化上下文: 本实例加载或写入过的 id -> version
    managed: RefCell<HashMap<i64, i64>>,
}

impl<'conn> PreferencesDaoImpl<'conn> {
    /// 绑定到调用方的连接 (通常是 `rusqlite::Transaction`)
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            managed: RefCell::new(HashMap::new()),
        }
    }

    /// 实体是否由当前持久化上下文跟踪 (id 已加载且版本一致)
    pub fn contains<T: Preference>(&self, entity: &T) -> bool {
        match entity.id() {
            Some(id) => self.managed.borrow().get(&id) == Some(&entity.version()),
            None => false,
        }
    }

    fn require_transaction(&self, operation: &str) -> RepositoryResult<()> {
        if self.conn.is_autocommit() {
            return Err(RepositoryError::TransactionRequired {
                operation: operation.to_string(),
            });
        }
        Ok(())
    }

    fn track(&self, preference: &AnyPreference) {
        if let Some(id) = preference.id() {
            self.managed.borrow_mut().insert(id, preference.version());
        }
    }

    /// 执行命名查询
    fn run_named(&self, name: &str, owner: Option<&str>) -> RepositoryResult<Vec<AnyPreference>> {
        let query = named_query(name)
            .ok_or_else(|| RepositoryError::InternalError(format!("未注册的命名查询: {}", name)))?;
        let mut stmt = self.conn.prepare_cached(query.sql)?;

        let rows = if query.binds_owner {
            stmt.query_map(params![owner.unwrap_or_default()], map_row)?
                .collect::<SqliteResult<Vec<_>>>()?
        } else {
            stmt.query_map([], map_row)?
                .collect::<SqliteResult<Vec<_>>>()?
        };

        for row in &rows {
            self.track(row);
        }
        debug!(query = name, count = rows.len(), "命名查询完成");
        Ok(rows)
    }

    fn load(&self, id: i64) -> RepositoryResult<Option<AnyPreference>> {
        let found = self.run_named_by_id(id)?;
        if let Some(p) = &found {
            self.track(p);
        }
        Ok(found)
    }

    fn run_named_by_id(&self, id: i64) -> RepositoryResult<Option<AnyPreference>> {
        let query = named_query(NQ_FIND_BY_ID).ok_or_else(|| {
            RepositoryError::InternalError(format!("未注册的命名查询: {}", NQ_FIND_BY_ID))
        })?;
        let mut stmt = self.conn.prepare_cached(query.sql)?;
        Ok(stmt.query_row(params![id], map_row).optional()?)
    }

    fn current_version(&self, id: i64) -> RepositoryResult<Option<i64>> {
        let mut stmt = self.conn.prepare_cached(SELECT_VERSION_SQL)?;
        Ok(stmt.query_row(params![id], |row| row.get(0)).optional()?)
    }

    /// 写入失败后区分 "记录不存在" 与 "版本冲突"
    fn stale_or_missing(&self, type_name: &str, id: i64, expected: i64) -> RepositoryResult<RepositoryError> {
        Ok(match self.current_version(id)? {
            Some(actual) => {
                warn!(type_name, id, expected, actual, "乐观锁冲突");
                RepositoryError::OptimisticLockFailure {
                    entity: type_name.to_string(),
                    id,
                    expected,
                    actual,
                }
            }
            None => RepositoryError::NotFound {
                entity: type_name.to_string(),
                id: id.to_string(),
            },
        })
    }

    /// 将实体状态合并进存储并返回最新状态
    ///
    /// - 记录不存在: `NotFound`
    /// - 版本不一致: `OptimisticLockFailure`
    /// - 内容未变化: 不写库，版本不变
    fn merge(&self, entity: AnyPreference) -> RepositoryResult<AnyPreference> {
        let id = match entity.id() {
            Some(id) => id,
            None => {
                let mut entity = entity;
                self.persist(&mut entity)?;
                return Ok(entity);
            }
        };
        let type_name = entity.type_name();

        let current = self.load(id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: type_name.to_string(),
            id: id.to_string(),
        })?;

        if current.version() != entity.version() {
            warn!(
                type_name,
                id,
                expected = entity.version(),
                actual = current.version(),
                "乐观锁冲突"
            );
            return Err(RepositoryError::OptimisticLockFailure {
                entity: type_name.to_string(),
                id,
                expected: entity.version(),
                actual: current.version(),
            });
        }

        if current.attributes().same_content(entity.attributes()) {
            return Ok(current);
        }

        let attrs = entity.attributes();
        attrs.validate()?;
        let affected = self.conn.prepare_cached(UPDATE_BASE_SQL)?.execute(params![
            attrs.value,
            attrs.bin_value,
            attrs.float_value.map(f64::from),
            attrs.description,
            attrs.minimum,
            attrs.maximum,
            attrs.from_file,
            id,
            entity.version(),
        ])?;

        if affected == 0 {
            return Err(self.stale_or_missing(type_name, id, entity.version())?);
        }

        let merged = self.load(id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: type_name.to_string(),
            id: id.to_string(),
        })?;
        debug!(type_name, id, version = merged.version(), "偏好已更新");
        Ok(merged)
    }
}

impl PreferenceDao for PreferencesDaoImpl<'_> {
    fn find_by_key(&self, id: i64) -> RepositoryResult<Option<AnyPreference>> {
        self.require_transaction("find_by_key")?;
        self.load(id)
    }

    fn find_by_type<T: Preference>(&self) -> RepositoryResult<Vec<T>> {
        self.require_transaction("find_by_type")?;
        let name = query_name::<T>(FIND_ALL)?;
        downcast_all(self.run_named(&name, None)?)
    }

    fn find_by_type_and_owner<T: Preference>(&self, owner: &str) -> RepositoryResult<Vec<T>> {
        self.require_transaction("find_by_type_and_owner")?;
        let name = query_name::<T>(FIND_BY_OWNER)?;
        downcast_all(self.run_named(&name, Some(owner))?)
    }

    fn find_all(&self) -> RepositoryResult<Vec<AnyPreference>> {
        self.require_transaction("find_all")?;
        self.run_named(NQ_FIND_ALL, None)
    }
}

impl PreferenceWriter for PreferencesDaoImpl<'_> {
    fn save<T: Preference>(&self, entity: T) -> RepositoryResult<T> {
        self.require_transaction("save")?;
        let mut entity = entity;
        if entity.is_new() {
            self.persist(&mut entity)?;
        }
        let merged = self.merge(entity.into_any())?;
        let type_name = merged.type_name();
        T::from_any(merged).ok_or_else(|| {
            RepositoryError::TypeMismatch(format!("{} 不能转换为 {}", type_name, T::TYPE_NAME))
        })
    }

    fn persist<T: Preference>(&self, entity: &mut T) -> RepositoryResult<()> {
        self.require_transaction("persist")?;
        if let Some(id) = entity.id() {
            return Err(RepositoryError::EntityExists {
                entity: T::TYPE_NAME.to_string(),
                id,
            });
        }

        let key = entity.pref_key();
        require_text(&key.key, "不允许持久化 key 为空的偏好")?;
        if key.scope.has_owner() {
            require_text(key.owner.as_deref().unwrap_or_default(), "不允许持久化 owner 为空的偏好")?;
        }

        let attrs = entity.attributes();
        attrs.validate()?;
        self.conn.prepare_cached(INSERT_BASE_SQL)?.execute(params![
            attrs.value,
            attrs.bin_value,
            attrs.float_value.map(f64::from),
            attrs.description,
            attrs.minimum,
            attrs.maximum,
            attrs.from_file,
        ])?;
        let id = self.conn.last_insert_rowid();

        let sql = insert_identity_sql(key.scope);
        let inserted = match (&key.owner, key.scope.has_owner()) {
            (Some(owner), true) => self
                .conn
                .execute(sql, params![id, key.scope.to_db_str(), owner, key.key]),
            _ => self.conn.execute(sql, params![id, key.scope.to_db_str(), key.key]),
        };
        if let Err(e) = inserted {
            // 子表写入失败 (如唯一约束冲突) 时撤掉刚插入的基表行
            self.conn
                .execute("DELETE FROM COR_PREFERENCE WHERE C_ID = ?1", params![id])?;
            return Err(e.into());
        }

        entity.attributes_mut().assign_identity(id, 0);
        self.managed.borrow_mut().insert(id, 0);
        debug!(type_name = T::TYPE_NAME, id, pref_key = %key, "偏好已插入");
        Ok(())
    }

    fn remove<T: Preference>(&self, entity: &T) -> RepositoryResult<()> {
        self.require_transaction("remove")?;
        let Some(id) = entity.id() else {
            debug!(type_name = T::TYPE_NAME, "实体未持久化, 忽略删除");
            return Ok(());
        };

        let (scope, version) = if self.contains(entity) {
            (entity.scope(), entity.version())
        } else {
            // 游离实体: 先合并回持久化上下文
            let attached = self.merge(entity.clone().into_any())?;
            (attached.scope(), attached.version())
        };

        let affected = self
            .conn
            .prepare_cached(DELETE_BASE_SQL)?
            .execute(params![id, version])?;
        if affected == 0 {
            return Err(self.stale_or_missing(T::TYPE_NAME, id, version)?);
        }
        self.conn
            .prepare_cached(delete_identity_sql(scope))?
            .execute(params![id])?;

        self.managed.borrow_mut().remove(&id);
        debug!(type_name = T::TYPE_NAME, id, "偏好已删除");
        Ok(())
    }
}

/// 将多态结果收窄为具体类型
fn downcast_all<T: Preference>(rows: Vec<AnyPreference>) -> RepositoryResult<Vec<T>> {
    rows.into_iter()
        .map(|p| {
            let type_name = p.type_name();
            T::from_any(p).ok_or_else(|| {
                RepositoryError::TypeMismatch(format!("{} 不能转换为 {}", type_name, T::TYPE_NAME))
            })
        })
        .collect()
}

/// 映射 V_PREFERENCE 行
fn map_row(row: &Row<'_>) -> SqliteResult<AnyPreference> {
    let scope_text: String = row.get(1)?;
    let scope = PropertyScope::from_db_str(&scope_text).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            Type::Text,
            Box::new(RepositoryError::InternalError(format!(
                "未知的偏好作用域: {}",
                scope_text
            ))),
        )
    })?;

    let mut attributes = PreferenceAttributes {
        value: row.get(4)?,
        bin_value: row.get(5)?,
        float_value: row.get::<_, Option<f64>>(6)?.map(|v| v as f32),
        description: row.get(7)?,
        minimum: row.get(8)?,
        maximum: row.get(9)?,
        from_file: row.get(10)?,
        ..Default::default()
    };
    attributes.assign_identity(row.get(0)?, row.get(11)?);

    Ok(AnyPreference::from_parts(scope, row.get(2)?, row.get(3)?, attributes))
}
