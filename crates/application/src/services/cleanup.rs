use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::{rate_limiter::ActionRateLimiter, services::auth_service::AuthService};

/// 后台定期清理过期会话与限流记录
///
/// 第一次清理在启动时立即执行；单次失败只记录日志，下个周期继续。
pub fn spawn_session_cleanup(
    auth: Arc<AuthService>,
    limiters: Vec<Arc<ActionRateLimiter>>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        info!(period_secs = period.as_secs(), "session cleanup started");

        loop {
            ticker.tick().await;

            match auth.cleanup_expired_sessions().await {
                Ok(removed) if removed > 0 => info!(removed, "expired sessions removed"),
                Ok(_) => {}
                Err(err) => error!(error = %err, "failed to clean up expired sessions"),
            }

            let purged: usize = limiters.iter().map(|limiter| limiter.purge_stale()).sum();
            if purged > 0 {
                info!(purged, "stale rate limit entries purged");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::memory::{InMemorySessionRepository, InMemoryUserRepository};
    use crate::services::auth_service::AuthServiceDependencies;
    use crate::services::test_support::PlainTextHasher;
    use domain::{Session, SessionRepository, SessionToken, UserId};

    #[tokio::test]
    async fn test_cleanup_runs_immediately() {
        let clock = Arc::new(ManualClock::starting_now());
        let sessions = Arc::new(InMemorySessionRepository::new());
        let auth = Arc::new(AuthService::new(AuthServiceDependencies {
            user_repository: Arc::new(InMemoryUserRepository::new()),
            session_repository: sessions.clone(),
            password_hasher: Arc::new(PlainTextHasher),
            clock: clock.clone(),
        }));

        sessions
            .create(Session::issue(
                UserId::generate(),
                SessionToken::parse("stale").unwrap(),
                clock.now() - time::Duration::hours(48),
                time::Duration::hours(24),
            ))
            .await
            .unwrap();

        let limiter = Arc::new(ActionRateLimiter::new(Duration::from_secs(30), clock.clone()));
        limiter.record_action(UserId::generate());
        clock.advance(time::Duration::seconds(31));

        let handle = spawn_session_cleanup(auth, vec![limiter.clone()], Duration::from_secs(3600));

        for _ in 0..50 {
            if sessions.is_empty().await {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.abort();

        assert!(sessions.is_empty().await);
        assert_eq!(limiter.purge_stale(), 0);
    }
}
