//! 浏览器会话实体
//!
//! 生命周期：`absent → live → expired → absent`。过期会话不能恢复为 live，
//! 只能重新登录。

use time::Duration;

use crate::value_objects::{SessionId, SessionToken, Timestamp, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    pub user_id: UserId,
    pub token: SessionToken,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

impl Session {
    pub fn issue(user_id: UserId, token: SessionToken, now: Timestamp, ttl: Duration) -> Self {
        Self {
            id: SessionId::generate(),
            user_id,
            token,
            expires_at: now + ttl,
            created_at: now,
        }
    }

    /// `now < expires_at` 时会话有效
    pub fn is_live(&self, now: Timestamp) -> bool {
        now < self.expires_at
    }

    pub fn extend(&mut self, now: Timestamp, ttl: Duration) {
        self.expires_at = now + ttl;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn session_at(now: Timestamp) -> Session {
        Session::issue(
            UserId::generate(),
            SessionToken::parse("abc").unwrap(),
            now,
            Duration::hours(24),
        )
    }

    #[test]
    fn live_until_the_expiry_instant() {
        let now = datetime!(2024-01-01 0:00 UTC);
        let session = session_at(now);

        assert!(session.is_live(now));
        assert!(session.is_live(now + Duration::hours(23)));
        assert!(!session.is_live(now + Duration::hours(24)));
        assert!(!session.is_live(now + Duration::hours(25)));
    }

    #[test]
    fn extend_moves_expiry_relative_to_now() {
        let now = datetime!(2024-01-01 0:00 UTC);
        let mut session = session_at(now);

        let later = now + Duration::hours(10);
        session.extend(later, Duration::hours(24));

        assert_eq!(session.expires_at, later + Duration::hours(24));
        assert_eq!(session.created_at, now);
    }
}
