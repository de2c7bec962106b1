//! 会话 cookie 与请求身份
//!
//! 令牌只存在于 `session_token` cookie 中；处理器通过 [`CurrentUser`]
//! 提取器拿到已验证的用户，不经由请求扩展传递身份。

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use domain::{Session, SessionToken, User};

use crate::{error::ApiError, state::AppState};

pub const SESSION_COOKIE: &str = "session_token";

/// 登录或续期后下发的 cookie
pub fn session_cookie(token: &SessionToken, ttl: time::Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.as_str().to_owned()))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(ttl)
        .build()
}

/// 让浏览器立即丢弃会话 cookie
pub fn removal_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::ZERO)
        .build()
}

pub fn session_token(jar: &CookieJar) -> Option<SessionToken> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| SessionToken::parse(cookie.value()).ok())
}

/// 已登录的请求方
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub session: Session,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = session_token(&jar).ok_or_else(|| ApiError::unauthorized("login required"))?;
        CurrentUser::resolve(state, &token).await
    }
}

impl CurrentUser {
    pub async fn resolve(state: &AppState, token: &SessionToken) -> Result<Self, ApiError> {
        let authenticated = state.auth.authenticate(token).await?;
        Ok(CurrentUser {
            user: authenticated.user,
            session: authenticated.session,
        })
    }

    /// cookie 可选时使用：无 cookie 返回 `None`，无效 cookie 仍然报错
    pub async fn from_jar(state: &AppState, jar: &CookieJar) -> Result<Option<Self>, ApiError> {
        match session_token(jar) {
            Some(token) => CurrentUser::resolve(state, &token).await.map(Some),
            None => Ok(None),
        }
    }
}
