use application::ApplicationError;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::auth::removal_cookie;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
    retry_after: Option<u64>,
    clear_session: bool,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                code,
                message: message.into(),
            },
            retry_after: None,
            clear_session: false,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn internal_server_error() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "internal server error",
        )
    }

    /// 响应中附带清除会话 cookie
    pub fn clearing_session(mut self) -> Self {
        self.clear_session = true;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.body.code
    }
}

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        use application::ApplicationError as AppErr;

        match error {
            AppErr::Validation { field, message } => ApiError::new(
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                format!("{}: {}", field, message),
            ),
            AppErr::Conflict(message) => ApiError::new(StatusCode::CONFLICT, "CONFLICT", message),
            AppErr::InvalidCredentials => ApiError::new(
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "invalid email or password",
            ),
            AppErr::SessionExpired => ApiError::new(
                StatusCode::UNAUTHORIZED,
                "SESSION_EXPIRED",
                "session expired, please log in again",
            )
            .clearing_session(),
            // 未知令牌等同于未登录
            AppErr::SessionNotFound => ApiError::unauthorized("login required").clearing_session(),
            AppErr::NotFound(what) => ApiError::new(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{} not found", what),
            ),
            AppErr::RateLimited { retry_after_secs } => {
                let mut err = ApiError::new(
                    StatusCode::TOO_MANY_REQUESTS,
                    "RATE_LIMITED",
                    format!("please wait {} seconds before trying again", retry_after_secs),
                );
                err.retry_after = Some(retry_after_secs);
                err
            }
            AppErr::Storage(message) => {
                error!(error = %message, "storage failure");
                ApiError::internal_server_error()
            }
            AppErr::Password(err) => {
                error!(error = %err, "password hasher failure");
                ApiError::internal_server_error()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.body)).into_response();

        if let Some(secs) = self.retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }

        if self.clear_session {
            if let Ok(value) = HeaderValue::from_str(&removal_cookie(false).to_string()) {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_sets_retry_after() {
        let response = ApiError::from(ApplicationError::RateLimited {
            retry_after_secs: 12,
        })
        .into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "12");
    }

    #[test]
    fn test_expired_session_clears_cookie() {
        let response = ApiError::from(ApplicationError::SessionExpired).into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("session_token="));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn test_storage_details_are_not_exposed() {
        let err = ApiError::from(ApplicationError::Storage("connection refused".to_string()));

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "INTERNAL_ERROR");
        assert!(!err.body.message.contains("connection"));
    }

    #[test]
    fn test_conflict_message_is_passed_through() {
        let err = ApiError::from(ApplicationError::Conflict(
            "email is already registered".to_string(),
        ));

        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.body.message, "email is already registered");
    }

    #[test]
    fn test_unknown_session_is_unauthorized() {
        let err = ApiError::from(ApplicationError::SessionNotFound);
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);

        let err = ApiError::from(ApplicationError::NotFound("post"));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
