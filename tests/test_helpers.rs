// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化与事务封装
// ==========================================
#![allow(dead_code)]

use openwms_preferences::db::{init_schema, open_sqlite_connection, with_transaction};
use openwms_preferences::repository::{PreferencesDaoImpl, RepositoryResult};
use rusqlite::Connection;
use std::error::Error;
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开一个已配置的连接
pub fn open_conn(db_path: &str) -> Connection {
    open_sqlite_connection(db_path).expect("Failed to open test connection")
}

/// 在一个事务内使用新的 DAO 实例；闭包 Ok 则提交
pub fn in_tx<T, F>(conn: &mut Connection, f: F) -> RepositoryResult<T>
where
    F: FnOnce(&PreferencesDaoImpl<'_>) -> RepositoryResult<T>,
{
    with_transaction(conn, |tx| {
        let dao = PreferencesDaoImpl::new(tx);
        f(&dao)
    })
}
