mod auth_service;
mod category_service;
mod cleanup;
mod comment_service;
mod post_service;
mod reaction_service;

pub use auth_service::{
    AuthService, AuthServiceDependencies, AuthenticatedSession, LoginRequest,
    RegisterUserRequest, DEFAULT_SESSION_TTL,
};
pub use category_service::{CategoryService, CategoryServiceDependencies};
pub use cleanup::spawn_session_cleanup;
pub use comment_service::{CommentService, CommentServiceDependencies, DEFAULT_MAX_COMMENT_LENGTH};
pub use post_service::{
    CommentView, CreatePostRequest, PostDetail, PostQuery, PostService, PostServiceDependencies,
    PostSummary, DEFAULT_MAX_POST_LENGTH,
};
pub use reaction_service::{ReactionService, ReactionServiceDependencies};
