// ==========================================
// 偏好设置子系统 - 领域层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 领域层错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("非法参数: {0}")]
    InvalidArgument(String),
}

/// Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;

/// 断言字符串至少包含一个非空白字符
pub(crate) fn require_text(value: &str, message: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::InvalidArgument(message.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_text() {
        assert!(require_text("alice", "owner").is_ok());
        assert_eq!(
            require_text("   ", "owner 不能为空"),
            Err(DomainError::InvalidArgument("owner 不能为空".to_string()))
        );
        assert!(require_text("", "key").is_err());
    }
}
