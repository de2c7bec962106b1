//! 领域模型错误定义
//!
//! 值对象校验错误与仓储（存储协作方）错误分开定义。

use thiserror::Error;

/// 领域模型错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// 参数校验失败
    #[error("invalid argument {field}: {reason}")]
    InvalidArgument { field: String, reason: String },
}

impl DomainError {
    /// 创建参数校验错误
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// 仓储错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// 记录不存在
    #[error("record not found")]
    NotFound,
    /// 唯一约束冲突
    #[error("record already exists")]
    Conflict,
    /// 底层存储失败
    #[error("storage failure: {message}")]
    Storage { message: String },
}

impl RepositoryError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}

/// 领域模型结果类型
pub type DomainResult<T> = Result<T, DomainError>;
