use std::{sync::Arc, time::Duration};

use application::{
    ActionRateLimiter, AuthService, AuthServiceDependencies, CategoryService,
    CategoryServiceDependencies, CommentService, CommentServiceDependencies, InMemoryStorage,
    ManualClock, PasswordHasher, PasswordHasherError, PostService, PostServiceDependencies,
    ReactionService, ReactionServiceDependencies,
};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use domain::PasswordHash;
use serde_json::Value;
use tower::ServiceExt;

use web_api::{router, AppState};

/// 测试用哈希，避免 bcrypt 拖慢用例
pub struct PlainTextHasher;

#[async_trait]
impl PasswordHasher for PlainTextHasher {
    async fn hash(&self, plaintext: &str) -> Result<PasswordHash, PasswordHasherError> {
        PasswordHash::new(format!("plain:{plaintext}"))
            .map_err(|err| PasswordHasherError::hash_error(err.to_string()))
    }

    async fn verify(
        &self,
        plaintext: &str,
        hashed: &PasswordHash,
    ) -> Result<bool, PasswordHasherError> {
        Ok(hashed.as_str() == format!("plain:{plaintext}"))
    }
}

pub struct TestApp {
    pub app: Router,
    pub clock: Arc<ManualClock>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// `Set-Cookie` 中的 `name=value` 部分
    pub fn session_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find(|value| value.starts_with("session_token="))
            .map(|value| value.split(';').next().unwrap_or_default().to_string())
    }

    pub fn raw_set_cookie(&self) -> String {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }
}

pub async fn test_app() -> TestApp {
    let clock = Arc::new(ManualClock::starting_now());
    let storage = InMemoryStorage::new();

    let auth = Arc::new(AuthService::new(AuthServiceDependencies {
        user_repository: storage.users.clone(),
        session_repository: storage.sessions.clone(),
        password_hasher: Arc::new(PlainTextHasher),
        clock: clock.clone(),
    }));
    let reactions = Arc::new(
        ReactionService::new(ReactionServiceDependencies {
            user_repository: storage.users.clone(),
            post_repository: storage.posts.clone(),
            comment_repository: storage.comments.clone(),
            post_reactions: storage.post_reactions.clone(),
            comment_reactions: storage.comment_reactions.clone(),
            clock: clock.clone(),
        })
        .expect("reaction stores"),
    );
    let posts = Arc::new(PostService::new(PostServiceDependencies {
        auth: auth.clone(),
        reactions: reactions.clone(),
        user_repository: storage.users.clone(),
        category_repository: storage.categories.clone(),
        post_repository: storage.posts.clone(),
        comment_repository: storage.comments.clone(),
        rate_limiter: Arc::new(ActionRateLimiter::new(Duration::from_secs(30), clock.clone())),
        clock: clock.clone(),
    }));
    let comments = Arc::new(CommentService::new(CommentServiceDependencies {
        auth: auth.clone(),
        post_repository: storage.posts.clone(),
        comment_repository: storage.comments.clone(),
        rate_limiter: Arc::new(ActionRateLimiter::new(Duration::from_secs(30), clock.clone())),
        clock: clock.clone(),
    }));
    let categories = Arc::new(CategoryService::new(CategoryServiceDependencies {
        category_repository: storage.categories.clone(),
        clock: clock.clone(),
    }));
    categories
        .seed_defaults(&["General".to_string(), "Music".to_string()])
        .await
        .expect("seed categories");

    let state = AppState::new(auth, reactions, posts, comments, categories);
    TestApp {
        app: router(state),
        clock,
    }
}

impl TestApp {
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self.app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// 注册并登录，返回可直接放入 `Cookie` 头的值
    pub async fn sign_up(&self, username: &str, email: &str) -> String {
        let registered = self
            .send(
                Method::POST,
                "/api/v1/auth/register",
                None,
                Some(serde_json::json!({
                    "username": username,
                    "email": email,
                    "password": "secret1",
                })),
            )
            .await;
        assert_eq!(registered.status, StatusCode::CREATED);

        let login = self
            .send(
                Method::POST,
                "/api/v1/auth/login",
                None,
                Some(serde_json::json!({ "email": email, "password": "secret1" })),
            )
            .await;
        assert_eq!(login.status, StatusCode::OK);
        login.session_cookie().expect("session cookie")
    }

    pub async fn category_id(&self, name: &str) -> String {
        let categories = self
            .send(Method::GET, "/api/v1/categories", None, None)
            .await;
        categories
            .body
            .as_array()
            .and_then(|list| list.iter().find(|c| c["name"] == name))
            .and_then(|c| c["id"].as_str())
            .expect("category")
            .to_string()
    }
}
