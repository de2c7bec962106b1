use domain::{DomainError, RepositoryError};
use thiserror::Error;

use crate::password::PasswordHasherError;

#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 输入格式错误，调用方应提示用户修改后重试
    #[error("validation failed: {field}: {message}")]
    Validation { field: String, message: String },
    /// 邮箱或用户名重复
    #[error("conflict: {0}")]
    Conflict(String),
    /// 邮箱或密码错误，刻意不区分是哪一项
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("{0} not found")]
    NotFound(&'static str),
    /// 令牌不对应任何会话
    #[error("session not found")]
    SessionNotFound,
    #[error("session expired")]
    SessionExpired,
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
    /// 存储失败原样上抛，本层不重试
    #[error("storage error: {0}")]
    Storage(String),
    #[error("password error: {0}")]
    Password(#[from] PasswordHasherError),
}

impl ApplicationError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<DomainError> for ApplicationError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::InvalidArgument { field, reason } => Self::Validation {
                field,
                message: reason,
            },
        }
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound => Self::NotFound("record"),
            RepositoryError::Conflict => Self::Conflict("record already exists".to_string()),
            RepositoryError::Storage { message } => Self::Storage(message),
        }
    }
}

impl From<validator::ValidationErrors> for ApplicationError {
    /// 取第一个出错字段的第一条信息，字段按名称排序保证稳定
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let mut fields: Vec<_> = field_errors.iter().collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));

        for (field, errs) in fields {
            if let Some(err) = errs.first() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                return Self::validation(field.to_string(), message);
            }
        }
        Self::validation("input", "invalid input")
    }
}
