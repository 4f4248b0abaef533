// ==========================================
// 偏好设置子系统 - 存储配置
// ==========================================

use crate::db::{configure_sqlite_connection_with_timeout, ensure_schema, DEFAULT_BUSY_TIMEOUT_MS};
use crate::repository::error::{RepositoryError, RepositoryResult};
use anyhow::Context;
use rusqlite::Connection;
use std::path::PathBuf;
use tracing::info;

/// 环境变量名
pub mod env_keys {
    /// 数据库文件路径
    pub const DB_PATH: &str = "PREFS_DB_PATH";
    /// busy_timeout 毫秒数
    pub const BUSY_TIMEOUT_MS: &str = "PREFS_BUSY_TIMEOUT_MS";
}

const APP_DIR: &str = "openwms-prefs";
const DB_FILE: &str = "preferences.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub db_path: String,
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl StoreConfig {
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }

    /// 从环境变量加载，未设置的项使用默认值
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源加载 (便于测试)
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = StoreConfig::default();

        if let Some(path) = lookup(env_keys::DB_PATH) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                config.db_path = trimmed.to_string();
            }
        }

        if let Some(raw) = lookup(env_keys::BUSY_TIMEOUT_MS) {
            config.busy_timeout_ms = raw
                .trim()
                .parse()
                .with_context(|| format!("{} 不是合法的毫秒数: {}", env_keys::BUSY_TIMEOUT_MS, raw))?;
        }

        Ok(config)
    }

    /// 打开连接，应用统一 PRAGMA 并确保表结构存在
    pub fn open(&self) -> RepositoryResult<Connection> {
        let conn = Connection::open(&self.db_path).map_err(|e| {
            RepositoryError::DatabaseConnectionError(format!("{}: {}", self.db_path, e))
        })?;
        configure_sqlite_connection_with_timeout(&conn, self.busy_timeout_ms)?;
        ensure_schema(&conn)?;
        info!(db_path = %self.db_path, "偏好存储已打开");
        Ok(conn)
    }
}

/// 默认数据库路径: 用户数据目录/openwms-prefs/preferences.db
///
/// 无法获取数据目录时回退到当前目录
pub fn default_db_path() -> String {
    let path = match dirs::data_dir() {
        Some(data_dir) => {
            let dir = data_dir.join(APP_DIR);
            // best-effort: 目录创建失败时由 open() 报错
            std::fs::create_dir_all(&dir).ok();
            dir.join(DB_FILE)
        }
        None => PathBuf::from(".").join(DB_FILE),
    };
    path.to_string_lossy().to_string()
}
