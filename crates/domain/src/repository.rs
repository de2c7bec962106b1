//! 存储协作方接口
//!
//! 每个实体一个能力接口，返回装箱的 `'static` future，便于以 `Arc<dyn _>` 注入。

use futures::future::BoxFuture;

use crate::category::Category;
use crate::comment::Comment;
use crate::errors::RepositoryError;
use crate::post::{Post, PostFilter};
use crate::reaction::{Polarity, Reaction, ReactionKind, ReactionTarget};
use crate::session::Session;
use crate::user::User;
use crate::value_objects::{
    CategoryId, CommentId, PostId, ReactionId, SessionId, SessionToken, Timestamp, UserEmail,
    UserId, Username,
};

pub type RepositoryResult<T> = Result<T, RepositoryError>;
pub type RepositoryFuture<T> = BoxFuture<'static, RepositoryResult<T>>;

#[cfg_attr(feature = "testing", mockall::automock)]
pub trait UserRepository: Send + Sync {
    fn create(&self, user: User) -> RepositoryFuture<User>;
    fn find_by_id(&self, id: UserId) -> RepositoryFuture<Option<User>>;
    fn find_by_email(&self, email: UserEmail) -> RepositoryFuture<Option<User>>;
    fn email_exists(&self, email: UserEmail) -> RepositoryFuture<bool>;
    fn username_exists(&self, username: Username) -> RepositoryFuture<bool>;
}

#[cfg_attr(feature = "testing", mockall::automock)]
pub trait SessionRepository: Send + Sync {
    fn create(&self, session: Session) -> RepositoryFuture<Session>;
    fn find_by_token(&self, token: SessionToken) -> RepositoryFuture<Option<Session>>;
    /// 用户最近创建的会话
    fn find_by_user(&self, user_id: UserId) -> RepositoryFuture<Option<Session>>;
    /// 只更新过期时间
    fn update(&self, session: Session) -> RepositoryFuture<Session>;
    fn delete(&self, id: SessionId) -> RepositoryFuture<()>;
    fn delete_by_token(&self, token: SessionToken) -> RepositoryFuture<()>;
    /// 删除 `expires_at <= now` 的会话，返回删除条数
    fn delete_expired(&self, now: Timestamp) -> RepositoryFuture<u64>;
    fn delete_all_for_user(&self, user_id: UserId) -> RepositoryFuture<u64>;
}

#[cfg_attr(feature = "testing", mockall::automock)]
pub trait CategoryRepository: Send + Sync {
    fn create(&self, category: Category) -> RepositoryFuture<Category>;
    fn find_by_id(&self, id: CategoryId) -> RepositoryFuture<Option<Category>>;
    fn find_by_name(&self, name: String) -> RepositoryFuture<Option<Category>>;
    fn list(&self) -> RepositoryFuture<Vec<Category>>;
}

#[cfg_attr(feature = "testing", mockall::automock)]
pub trait PostRepository: Send + Sync {
    /// 帖子与分类关联在同一事务内写入
    fn create(&self, post: Post) -> RepositoryFuture<Post>;
    fn find_by_id(&self, id: PostId) -> RepositoryFuture<Option<Post>>;
    /// 按创建时间倒序
    fn list(&self, filter: PostFilter) -> RepositoryFuture<Vec<Post>>;
}

#[cfg_attr(feature = "testing", mockall::automock)]
pub trait CommentRepository: Send + Sync {
    fn create(&self, comment: Comment) -> RepositoryFuture<Comment>;
    fn find_by_id(&self, id: CommentId) -> RepositoryFuture<Option<Comment>>;
    /// 按创建时间正序
    fn list_by_post(&self, post_id: PostId) -> RepositoryFuture<Vec<Comment>>;
    fn count_by_post(&self, post_id: PostId) -> RepositoryFuture<u64>;
}

/// 每种可点赞实体一个实例
#[cfg_attr(feature = "testing", mockall::automock)]
pub trait ReactionRepository: Send + Sync {
    fn kind(&self) -> ReactionKind;
    fn find_by_user_and_target(
        &self,
        user_id: UserId,
        target: ReactionTarget,
    ) -> RepositoryFuture<Option<Reaction>>;
    fn create(&self, reaction: Reaction) -> RepositoryFuture<Reaction>;
    fn update(&self, reaction: Reaction) -> RepositoryFuture<Reaction>;
    fn delete(&self, id: ReactionId) -> RepositoryFuture<()>;
    fn count_by_target(&self, target: ReactionTarget, polarity: Polarity) -> RepositoryFuture<u64>;
    /// 用户以指定极性反应过的目标
    fn list_targets_by_user(
        &self,
        user_id: UserId,
        polarity: Polarity,
    ) -> RepositoryFuture<Vec<ReactionTarget>>;
}
