//! 密码哈希抽象与注册时的密码规则

use async_trait::async_trait;
use domain::PasswordHash;
use thiserror::Error;
use validator::ValidationError;

/// 去掉首尾空白后的字符数下限
pub const PASSWORD_MIN_CHARS: usize = 4;
/// bcrypt 只使用前 72 字节，上限留足余量
pub const PASSWORD_MAX_CHARS: usize = 64;

#[derive(Debug, Error)]
pub enum PasswordHasherError {
    #[error("hash error: {0}")]
    Hash(String),
    #[error("verify error: {0}")]
    Verify(String),
}

impl PasswordHasherError {
    pub fn hash_error(message: impl Into<String>) -> Self {
        Self::Hash(message.into())
    }

    pub fn verify_error(message: impl Into<String>) -> Self {
        Self::Verify(message.into())
    }
}

/// 密码哈希原语。实现方负责加盐，`verify` 对不匹配返回 `Ok(false)`。
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, plaintext: &str) -> Result<PasswordHash, PasswordHasherError>;
    async fn verify(
        &self,
        plaintext: &str,
        hashed: &PasswordHash,
    ) -> Result<bool, PasswordHasherError>;
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let len = password.chars().count();
    if !(PASSWORD_MIN_CHARS..=PASSWORD_MAX_CHARS).contains(&len) {
        return Err(ValidationError::new("length").with_message(
            format!("must be {PASSWORD_MIN_CHARS}-{PASSWORD_MAX_CHARS} characters").into(),
        ));
    }
    if password.chars().any(char::is_control) {
        return Err(ValidationError::new("charset")
            .with_message("must not contain control characters".into()));
    }
    Ok(())
}
