use std::sync::Arc;

use domain::{
    PasswordHash, Session, SessionRepository, SessionToken, User, UserEmail, UserId,
    UserRepository, Username,
};
use tracing::{debug, info, warn};
use validator::{Validate, ValidationError};

use crate::{
    clock::Clock,
    error::ApplicationError,
    keyed_mutex::KeyedMutex,
    password::{validate_password, PasswordHasher},
    token::generate_session_token,
};

/// 会话默认有效期
pub const DEFAULT_SESSION_TTL: time::Duration = time::Duration::hours(24);

#[derive(Debug, Clone, Validate)]
pub struct RegisterUserRequest {
    #[validate(custom(function = "validate_username"))]
    pub username: String,
    #[validate(
        email(message = "must be a valid email address"),
        custom(function = "validate_email_domain")
    )]
    pub email: String,
    #[validate(custom(function = "validate_password"))]
    pub password: String,
}

impl RegisterUserRequest {
    /// 去掉首尾空白，邮箱转小写
    fn normalized(self) -> Self {
        Self {
            username: self.username.trim().to_owned(),
            email: self.email.trim().to_lowercase(),
            password: self.password.trim().to_owned(),
        }
    }
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    let len = username.chars().count();
    if !(3..=9).contains(&len) {
        return Err(ValidationError::new("length").with_message("must be 3-9 characters".into()));
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::new("charset")
            .with_message("only ASCII letters and digits are allowed".into()));
    }
    Ok(())
}

fn validate_email_domain(email: &str) -> Result<(), ValidationError> {
    let domain = email.rsplit_once('@').map(|(_, domain)| domain).unwrap_or("");
    let has_tld = domain
        .rsplit_once('.')
        .map(|(name, tld)| !name.is_empty() && !tld.is_empty())
        .unwrap_or(false);
    if !has_tld {
        return Err(ValidationError::new("email")
            .with_message("must be a valid email address".into()));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// 已通过校验的会话及其用户
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub session: Session,
    pub user: User,
}

pub struct AuthServiceDependencies {
    pub user_repository: Arc<dyn UserRepository>,
    pub session_repository: Arc<dyn SessionRepository>,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub clock: Arc<dyn Clock>,
}

/// 注册、登录与会话生命周期
///
/// 登录策略：用户已有存活会话时延长并复用其令牌，否则签发新令牌。
pub struct AuthService {
    deps: AuthServiceDependencies,
    session_ttl: time::Duration,
    /// 同一用户的并发登录串行化，避免各自签发令牌
    login_locks: KeyedMutex<UserId>,
}

impl AuthService {
    pub fn new(deps: AuthServiceDependencies) -> Self {
        Self {
            deps,
            session_ttl: DEFAULT_SESSION_TTL,
            login_locks: KeyedMutex::new(),
        }
    }

    pub fn with_session_ttl(mut self, ttl: time::Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn session_ttl(&self) -> time::Duration {
        self.session_ttl
    }

    pub async fn register(&self, request: RegisterUserRequest) -> Result<User, ApplicationError> {
        let request = request.normalized();
        request.validate()?;

        let username = Username::parse(request.username)?;
        let email = UserEmail::parse(request.email)?;

        if self
            .deps
            .user_repository
            .email_exists(email.clone())
            .await?
        {
            return Err(ApplicationError::Conflict(
                "email is already registered".to_string(),
            ));
        }
        if self
            .deps
            .user_repository
            .username_exists(username.clone())
            .await?
        {
            return Err(ApplicationError::Conflict(
                "username is already taken".to_string(),
            ));
        }

        let password_hash: PasswordHash = self.deps.password_hasher.hash(&request.password).await?;

        let now = self.deps.clock.now();
        let user = User::register(UserId::generate(), username, email, password_hash, now);

        let stored = self.deps.user_repository.create(user).await?;
        info!(user_id = %stored.id, "user registered");
        Ok(stored)
    }

    /// 邮箱不存在与密码错误返回同一种错误
    pub async fn login(
        &self,
        request: LoginRequest,
    ) -> Result<AuthenticatedSession, ApplicationError> {
        let email =
            UserEmail::parse(request.email).map_err(|_| ApplicationError::InvalidCredentials)?;

        let Some(user) = self.deps.user_repository.find_by_email(email).await? else {
            warn!("login rejected");
            return Err(ApplicationError::InvalidCredentials);
        };

        let password_ok = self
            .deps
            .password_hasher
            .verify(request.password.trim(), &user.password)
            .await?;
        if !password_ok {
            warn!(user_id = %user.id, "login rejected");
            return Err(ApplicationError::InvalidCredentials);
        }

        let _guard = self.login_locks.lock(user.id).await;
        let now = self.deps.clock.now();

        let purged = self.deps.session_repository.delete_expired(now).await?;
        if purged > 0 {
            debug!(purged, "expired sessions purged on login");
        }

        let existing = self.deps.session_repository.find_by_user(user.id).await?;
        let session = match existing {
            Some(mut session) if session.is_live(now) => {
                session.extend(now, self.session_ttl);
                let session = self.deps.session_repository.update(session).await?;
                info!(user_id = %user.id, session_id = %session.id, "session reused");
                session
            }
            _ => {
                let token = generate_session_token()?;
                let session = Session::issue(user.id, token, now, self.session_ttl);
                let session = self.deps.session_repository.create(session).await?;
                info!(user_id = %user.id, session_id = %session.id, "session issued");
                session
            }
        };

        Ok(AuthenticatedSession { session, user })
    }

    /// 过期会话在发现时即被删除
    pub async fn validate_session(&self, token: &SessionToken) -> Result<Session, ApplicationError> {
        let session = self
            .deps
            .session_repository
            .find_by_token(token.clone())
            .await?
            .ok_or(ApplicationError::SessionNotFound)?;

        let now = self.deps.clock.now();
        if !session.is_live(now) {
            self.deps.session_repository.delete(session.id).await?;
            debug!(session_id = %session.id, "expired session removed");
            return Err(ApplicationError::SessionExpired);
        }

        Ok(session)
    }

    /// 将会话有效期延长到 `now + ttl`，令牌不变
    pub async fn refresh_session(&self, token: &SessionToken) -> Result<Session, ApplicationError> {
        let mut session = self.validate_session(token).await?;
        let now = self.deps.clock.now();
        session.extend(now, self.session_ttl);
        let session = self.deps.session_repository.update(session).await?;
        debug!(session_id = %session.id, "session refreshed");
        Ok(session)
    }

    /// 校验会话并取出所属用户
    pub async fn authenticate(
        &self,
        token: &SessionToken,
    ) -> Result<AuthenticatedSession, ApplicationError> {
        let session = self.validate_session(token).await?;
        let user = self
            .deps
            .user_repository
            .find_by_id(session.user_id)
            .await?
            .ok_or(ApplicationError::NotFound("user"))?;
        Ok(AuthenticatedSession { session, user })
    }

    /// 删除用户的全部会话，幂等
    pub async fn logout(&self, user_id: UserId) -> Result<(), ApplicationError> {
        let removed = self
            .deps
            .session_repository
            .delete_all_for_user(user_id)
            .await?;
        info!(user_id = %user_id, removed, "user logged out everywhere");
        Ok(())
    }

    /// 删除令牌对应的会话，幂等
    pub async fn logout_by_token(&self, token: &SessionToken) -> Result<(), ApplicationError> {
        self.deps
            .session_repository
            .delete_by_token(token.clone())
            .await?;
        Ok(())
    }

    /// 批量删除过期会话，返回删除条数
    pub async fn cleanup_expired_sessions(&self) -> Result<u64, ApplicationError> {
        let now = self.deps.clock.now();
        let removed = self.deps.session_repository.delete_expired(now).await?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::memory::{InMemorySessionRepository, InMemoryUserRepository};
    use crate::services::test_support::PlainTextHasher;
    use domain::{MockSessionRepository, RepositoryError};

    struct Fixture {
        service: AuthService,
        clock: Arc<ManualClock>,
        sessions: Arc<InMemorySessionRepository>,
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(ManualClock::starting_now());
        let sessions = Arc::new(InMemorySessionRepository::new());
        let service = AuthService::new(AuthServiceDependencies {
            user_repository: Arc::new(InMemoryUserRepository::new()),
            session_repository: sessions.clone(),
            password_hasher: Arc::new(PlainTextHasher),
            clock: clock.clone(),
        });
        Fixture {
            service,
            clock,
            sessions,
        }
    }

    fn register_request(username: &str, email: &str, password: &str) -> RegisterUserRequest {
        RegisterUserRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_normalizes_input() {
        let f = fixture();
        let user = f
            .service
            .register(register_request(" alice ", " Alice@X.COM ", " secret1 "))
            .await
            .unwrap();

        assert_eq!(user.username.as_str(), "alice");
        assert_eq!(user.email.as_str(), "alice@x.com");
        assert_eq!(user.password.as_str(), "plain:secret1");
    }

    #[tokio::test]
    async fn test_register_rejects_malformed_input() {
        let f = fixture();
        let cases = [
            register_request("al", "alice@x.com", "secret1"),
            register_request("alice_1", "alice@x.com", "secret1"),
            register_request("abcdefghij", "alice@x.com", "secret1"),
            register_request("alice", "alice", "secret1"),
            register_request("alice", "alice@x", "secret1"),
            register_request("alice", "alice@x.com", "abc"),
            register_request("alice", "alice@x.com", &"p".repeat(65)),
        ];

        for request in cases {
            let result = f.service.register(request.clone()).await;
            assert!(
                matches!(result, Err(ApplicationError::Validation { .. })),
                "expected validation error for {:?}",
                request.username
            );
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_or_username_conflicts() {
        let f = fixture();
        f.service
            .register(register_request("alice", "alice@x.com", "secret1"))
            .await
            .unwrap();

        let same_email = f
            .service
            .register(register_request("bob", "ALICE@x.com", "secret1"))
            .await;
        assert!(matches!(same_email, Err(ApplicationError::Conflict(_))));

        let same_name = f
            .service
            .register(register_request("alice", "other@x.com", "secret1"))
            .await;
        assert!(matches!(same_name, Err(ApplicationError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let f = fixture();
        f.service
            .register(register_request("alice", "alice@x.com", "secret1"))
            .await
            .unwrap();

        let wrong_password = f
            .service
            .login(login_request("alice@x.com", "wrongpass"))
            .await
            .unwrap_err();
        let unknown_email = f
            .service
            .login(login_request("nobody@x.com", "secret1"))
            .await
            .unwrap_err();
        let malformed_email = f
            .service
            .login(login_request("nobody", "secret1"))
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, ApplicationError::InvalidCredentials));
        assert!(matches!(unknown_email, ApplicationError::InvalidCredentials));
        assert!(matches!(malformed_email, ApplicationError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_login_reuses_live_session() {
        let f = fixture();
        f.service
            .register(register_request("alice", "alice@x.com", "secret1"))
            .await
            .unwrap();

        let first = f
            .service
            .login(login_request(" ALICE@x.com ", "secret1"))
            .await
            .unwrap();
        assert_eq!(first.user.username.as_str(), "alice");
        assert_eq!(first.session.token.as_str().len(), 64);

        f.clock.advance(time::Duration::hours(1));
        let second = f
            .service
            .login(login_request("alice@x.com", "secret1"))
            .await
            .unwrap();

        assert_eq!(second.session.token, first.session.token);
        assert_eq!(
            second.session.expires_at,
            f.clock.now() + DEFAULT_SESSION_TTL
        );
        assert_eq!(f.sessions.len().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_logins_share_one_session() {
        let f = fixture();
        f.service
            .register(register_request("alice", "alice@x.com", "secret1"))
            .await
            .unwrap();
        let service = Arc::new(f.service);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .login(login_request("alice@x.com", "secret1"))
                        .await
                        .map(|authenticated| authenticated.session.token)
                })
            })
            .collect();

        let mut tokens = std::collections::HashSet::new();
        for handle in handles {
            tokens.insert(handle.await.unwrap().unwrap());
        }

        assert_eq!(tokens.len(), 1);
        assert_eq!(f.sessions.len().await, 1);
    }

    #[tokio::test]
    async fn test_login_after_expiry_issues_new_token() {
        let f = fixture();
        f.service
            .register(register_request("alice", "alice@x.com", "secret1"))
            .await
            .unwrap();
        let first = f
            .service
            .login(login_request("alice@x.com", "secret1"))
            .await
            .unwrap();

        f.clock.advance(time::Duration::hours(25));
        let second = f
            .service
            .login(login_request("alice@x.com", "secret1"))
            .await
            .unwrap();

        assert_ne!(second.session.token, first.session.token);
        assert_eq!(f.sessions.len().await, 1);
    }

    #[tokio::test]
    async fn test_expired_session_is_removed_on_validation() {
        let f = fixture();
        f.service
            .register(register_request("alice", "alice@x.com", "secret1"))
            .await
            .unwrap();
        let login = f
            .service
            .login(login_request("alice@x.com", "secret1"))
            .await
            .unwrap();
        let token = login.session.token;

        assert!(f.service.validate_session(&token).await.is_ok());

        f.clock.advance(DEFAULT_SESSION_TTL);
        assert!(matches!(
            f.service.validate_session(&token).await,
            Err(ApplicationError::SessionExpired)
        ));
        assert!(matches!(
            f.service.validate_session(&token).await,
            Err(ApplicationError::SessionNotFound)
        ));
    }

    #[tokio::test]
    async fn test_refresh_extends_expiry() {
        let f = fixture();
        f.service
            .register(register_request("alice", "alice@x.com", "secret1"))
            .await
            .unwrap();
        let login = f
            .service
            .login(login_request("alice@x.com", "secret1"))
            .await
            .unwrap();

        f.clock.advance(time::Duration::hours(20));
        let refreshed = f
            .service
            .refresh_session(&login.session.token)
            .await
            .unwrap();
        assert_eq!(refreshed.token, login.session.token);

        f.clock.advance(time::Duration::hours(20));
        assert!(f
            .service
            .validate_session(&login.session.token)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let f = fixture();
        let user = f
            .service
            .register(register_request("alice", "alice@x.com", "secret1"))
            .await
            .unwrap();
        let login = f
            .service
            .login(login_request("alice@x.com", "secret1"))
            .await
            .unwrap();

        f.service
            .logout_by_token(&login.session.token)
            .await
            .unwrap();
        f.service
            .logout_by_token(&login.session.token)
            .await
            .unwrap();
        f.service.logout(user.id).await.unwrap();

        assert!(f.sessions.is_empty().await);
    }

    #[tokio::test]
    async fn test_cleanup_removes_only_expired_sessions() {
        let f = fixture();
        for (name, email) in [("alice", "alice@x.com"), ("bob", "bob@x.com")] {
            f.service
                .register(register_request(name, email, "secret1"))
                .await
                .unwrap();
        }
        f.service
            .login(login_request("alice@x.com", "secret1"))
            .await
            .unwrap();
        f.clock.advance(time::Duration::hours(12));
        f.service
            .login(login_request("bob@x.com", "secret1"))
            .await
            .unwrap();

        f.clock.advance(time::Duration::hours(13));
        assert_eq!(f.service.cleanup_expired_sessions().await.unwrap(), 1);
        assert_eq!(f.sessions.len().await, 1);
    }

    #[tokio::test]
    async fn test_storage_error_propagates_without_retry() {
        let mut sessions = MockSessionRepository::new();
        sessions
            .expect_find_by_token()
            .times(1)
            .returning(|_| {
                Box::pin(async { Err::<Option<Session>, _>(RepositoryError::storage("connection reset")) })
            });

        let service = AuthService::new(AuthServiceDependencies {
            user_repository: Arc::new(InMemoryUserRepository::new()),
            session_repository: Arc::new(sessions),
            password_hasher: Arc::new(PlainTextHasher),
            clock: Arc::new(ManualClock::starting_now()),
        });

        let token = SessionToken::parse("abc").unwrap();
        match service.validate_session(&token).await {
            Err(ApplicationError::Storage(message)) => assert!(message.contains("connection reset")),
            other => panic!("expected storage error, got {:?}", other),
        }
    }
}
