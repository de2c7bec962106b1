//! Web API 层。
//!
//! 提供 Axum 路由，将 HTTP 请求委托给应用层的用例服务；
//! 身份通过 `session_token` cookie 传递。

mod auth;
mod error;
mod routes;
mod state;

pub use auth::{removal_cookie, session_cookie, CurrentUser, SESSION_COOKIE};
pub use error::{ApiError, ErrorBody};
pub use routes::router;
pub use state::AppState;
