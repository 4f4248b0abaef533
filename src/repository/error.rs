// ==========================================
// 偏好设置子系统 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 约定: 错误原样上抛，仓储层不做重试与吞错
// ==========================================

use crate::domain::error::DomainError;
use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 并发控制错误 =====
    #[error("乐观锁冲突: {entity} id={id}, expected_version={expected}, actual_version={actual}")]
    OptimisticLockFailure {
        entity: String,
        id: i64,
        expected: i64,
        actual: i64,
    },

    // ===== 事务错误 =====
    #[error("{operation} 必须在已开启的事务中调用")]
    TransactionRequired { operation: String },

    // ===== 实体状态错误 =====
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("实体已持久化, 不能再次 persist: {entity} with id={id}")]
    EntityExists { entity: String, id: i64 },

    #[error("类型不匹配: {0}")]
    TypeMismatch(String),

    // ===== 数据库错误 =====
    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    #[error("唯一约束违反: {0}")]
    UniqueConstraintViolation(String),

    #[error("外键约束违反: {0}")]
    ForeignKeyViolation(String),

    // ===== 数据校验错误 =====
    #[error(transparent)]
    Domain(#[from] DomainError),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    RepositoryError::UniqueConstraintViolation(msg)
                } else if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Unknown".to_string(),
                id: "Unknown".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
