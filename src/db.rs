// ==========================================
// 偏好设置子系统 - SQLite 连接与 schema
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为 (外键、busy_timeout)
// - 建立偏好表结构 (联合继承: 基表 + 各作用域子表) 与读取视图
// - 为调用方提供事务边界辅助函数；仓储层本身不开启事务
// ==========================================

use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::time::Duration;
use tracing::{info, warn};

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    configure_sqlite_connection_with_timeout(conn, DEFAULT_BUSY_TIMEOUT_MS)
}

pub fn configure_sqlite_connection_with_timeout(
    conn: &Connection,
    busy_timeout_ms: u64,
) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(busy_timeout_ms))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 建立偏好表结构（幂等）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
          version INTEGER PRIMARY KEY,
          applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS COR_PREFERENCE (
          C_ID INTEGER PRIMARY KEY AUTOINCREMENT,
          C_VALUE TEXT,
          C_BINVALUE BLOB,
          C_FLOAT_VALUE REAL,
          C_DESCRIPTION TEXT,
          C_MINIMUM INTEGER NOT NULL DEFAULT 0,
          C_MAXIMUM INTEGER NOT NULL DEFAULT 0,
          C_FROM_FILE INTEGER NOT NULL DEFAULT 1,
          C_VERSION INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS COR_APP_PREFERENCE (
          C_ID INTEGER PRIMARY KEY REFERENCES COR_PREFERENCE(C_ID) ON DELETE CASCADE,
          C_TYPE TEXT NOT NULL,
          C_KEY TEXT NOT NULL,
          UNIQUE(C_TYPE, C_KEY)
        );

        CREATE TABLE IF NOT EXISTS COR_MODULE_PREFERENCE (
          C_ID INTEGER PRIMARY KEY REFERENCES COR_PREFERENCE(C_ID) ON DELETE CASCADE,
          C_TYPE TEXT NOT NULL,
          C_OWNER TEXT NOT NULL,
          C_KEY TEXT NOT NULL,
          UNIQUE(C_TYPE, C_OWNER, C_KEY)
        );

        CREATE TABLE IF NOT EXISTS COR_ROLE_PREFERENCE (
          C_ID INTEGER PRIMARY KEY REFERENCES COR_PREFERENCE(C_ID) ON DELETE CASCADE,
          C_TYPE TEXT NOT NULL,
          C_OWNER TEXT NOT NULL,
          C_KEY TEXT NOT NULL,
          UNIQUE(C_TYPE, C_OWNER, C_KEY)
        );

        CREATE TABLE IF NOT EXISTS COR_USER_PREFERENCE (
          C_ID INTEGER PRIMARY KEY REFERENCES COR_PREFERENCE(C_ID) ON DELETE CASCADE,
          C_TYPE TEXT NOT NULL,
          C_OWNER TEXT NOT NULL,
          C_KEY TEXT NOT NULL,
          UNIQUE(C_TYPE, C_OWNER, C_KEY)
        );

        CREATE INDEX IF NOT EXISTS idx_user_preference_owner
          ON COR_USER_PREFERENCE(C_OWNER);
        CREATE INDEX IF NOT EXISTS idx_role_preference_owner
          ON COR_ROLE_PREFERENCE(C_OWNER);
        CREATE INDEX IF NOT EXISTS idx_module_preference_owner
          ON COR_MODULE_PREFERENCE(C_OWNER);

        CREATE VIEW IF NOT EXISTS V_PREFERENCE AS
          SELECT p.C_ID, s.C_TYPE, NULL AS C_OWNER, s.C_KEY,
                 p.C_VALUE, p.C_BINVALUE, p.C_FLOAT_VALUE, p.C_DESCRIPTION,
                 p.C_MINIMUM, p.C_MAXIMUM, p.C_FROM_FILE, p.C_VERSION
          FROM COR_PREFERENCE p JOIN COR_APP_PREFERENCE s ON s.C_ID = p.C_ID
          UNION ALL
          SELECT p.C_ID, s.C_TYPE, s.C_OWNER, s.C_KEY,
                 p.C_VALUE, p.C_BINVALUE, p.C_FLOAT_VALUE, p.C_DESCRIPTION,
                 p.C_MINIMUM, p.C_MAXIMUM, p.C_FROM_FILE, p.C_VERSION
          FROM COR_PREFERENCE p JOIN COR_MODULE_PREFERENCE s ON s.C_ID = p.C_ID
          UNION ALL
          SELECT p.C_ID, s.C_TYPE, s.C_OWNER, s.C_KEY,
                 p.C_VALUE, p.C_BINVALUE, p.C_FLOAT_VALUE, p.C_DESCRIPTION,
                 p.C_MINIMUM, p.C_MAXIMUM, p.C_FROM_FILE, p.C_VERSION
          FROM COR_PREFERENCE p JOIN COR_ROLE_PREFERENCE s ON s.C_ID = p.C_ID
          UNION ALL
          SELECT p.C_ID, s.C_TYPE, s.C_OWNER, s.C_KEY,
                 p.C_VALUE, p.C_BINVALUE, p.C_FLOAT_VALUE, p.C_DESCRIPTION,
                 p.C_MINIMUM, p.C_MAXIMUM, p.C_FROM_FILE, p.C_VERSION
          FROM COR_PREFERENCE p JOIN COR_USER_PREFERENCE s ON s.C_ID = p.C_ID;
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        params![CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 确保 schema 已建立，并对版本不一致给出告警（不做自动迁移）
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    match read_schema_version(conn)? {
        Some(v) if v > CURRENT_SCHEMA_VERSION => {
            warn!(found = v, expected = CURRENT_SCHEMA_VERSION, "数据库 schema 版本高于当前代码");
        }
        Some(v) if v == CURRENT_SCHEMA_VERSION => return Ok(()),
        found => {
            info!(?found, expected = CURRENT_SCHEMA_VERSION, "初始化偏好表结构");
            init_schema(conn)?;
        }
    }
    Ok(())
}

/// 在事务中执行闭包：Ok 提交，Err 回滚（Transaction drop 时自动回滚）
///
/// 仓储层要求调用方已开启事务，本函数是调用方侧的事务边界。
pub fn with_transaction<T, E, F>(conn: &mut Connection, f: F) -> Result<T, E>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, E>,
    E: From<rusqlite::Error>,
{
    let tx = conn.transaction()?;
    let result = f(&tx)?;
    tx.commit()?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), None);
        ensure_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));
    }

    #[test]
    fn test_with_transaction_rolls_back_on_error() {
        let mut conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let result: Result<(), rusqlite::Error> = with_transaction(&mut conn, |tx| {
            tx.execute("INSERT INTO COR_PREFERENCE (C_VALUE) VALUES ('x')", [])?;
            Err(rusqlite::Error::QueryReturnedNoRows)
        });
        assert!(result.is_err());

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM COR_PREFERENCE", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
