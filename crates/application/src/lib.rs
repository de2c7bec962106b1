//! 应用层实现。
//!
//! 围绕领域模型的用例服务：会话生命周期、点赞切换、发帖/评论限流，
//! 以及对外部适配器（密码哈希、时钟、存储）的抽象。

pub mod clock;
pub mod dto;
pub mod error;
pub mod keyed_mutex;
pub mod memory;
pub mod password;
pub mod rate_limiter;
pub mod services;
pub mod token;

pub use clock::{Clock, ManualClock, SystemClock};
pub use dto::{
    CategoryDto, CommentDto, PostDetailDto, PostDto, ReactionDto, SessionDto, UserDto,
};
pub use error::ApplicationError;
pub use keyed_mutex::KeyedMutex;
pub use memory::InMemoryStorage;
pub use password::{PasswordHasher, PasswordHasherError};
pub use rate_limiter::ActionRateLimiter;
pub use services::{
    spawn_session_cleanup, AuthService, AuthServiceDependencies, AuthenticatedSession,
    CategoryService, CategoryServiceDependencies, CommentService, CommentServiceDependencies,
    CommentView, CreatePostRequest, LoginRequest, PostDetail, PostQuery, PostService,
    PostServiceDependencies, PostSummary, ReactionService, ReactionServiceDependencies,
    RegisterUserRequest,
};
pub use token::generate_session_token;
