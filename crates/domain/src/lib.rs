//! 论坛核心领域模型
//!
//! 用户、会话、帖子、评论、分类与点赞/点踩，以及存储协作方接口。

pub mod category;
pub mod comment;
pub mod errors;
pub mod post;
pub mod reaction;
pub mod repository;
pub mod session;
pub mod user;
pub mod value_objects;

// 重新导出常用类型
pub use category::Category;
pub use comment::Comment;
pub use errors::{DomainError, DomainResult, RepositoryError};
pub use post::{Post, PostFilter};
pub use reaction::{
    Polarity, Reaction, ReactionChange, ReactionCounts, ReactionKind, ReactionTarget, ToggleAction,
};
pub use repository::{
    CategoryRepository, CommentRepository, PostRepository, ReactionRepository, RepositoryFuture,
    RepositoryResult, SessionRepository, UserRepository,
};
pub use session::Session;
pub use user::User;
pub use value_objects::{
    CategoryId, CommentId, PasswordHash, PostId, ReactionId, SessionId, SessionToken, Timestamp,
    UserEmail, UserId, Username,
};

#[cfg(feature = "testing")]
pub use repository::{
    MockCategoryRepository, MockCommentRepository, MockPostRepository, MockReactionRepository,
    MockSessionRepository, MockUserRepository,
};
