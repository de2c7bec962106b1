use data_encoding::HEXLOWER;
use domain::{DomainError, SessionToken};

/// 会话令牌字节数
pub const SESSION_TOKEN_BYTES: usize = 32;

/// 生成 32 字节随机令牌，小写十六进制编码（64 个字符）
pub fn generate_session_token() -> Result<SessionToken, DomainError> {
    let bytes: [u8; SESSION_TOKEN_BYTES] = rand::random();
    SessionToken::parse(HEXLOWER.encode(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_64_lowercase_hex_chars() {
        let token = generate_session_token().unwrap();
        assert_eq!(token.as_str().len(), 64);
        assert!(token
            .as_str()
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_tokens_are_unique() {
        let a = generate_session_token().unwrap();
        let b = generate_session_token().unwrap();
        assert_ne!(a, b);
    }
}
