//! 进程内存储实现
//!
//! 开发模式（`database.backend = "memory"`）与测试共用。重启即丢失。

use std::collections::HashMap;
use std::sync::Arc;

use domain::{
    Category, CategoryId, CategoryRepository, Comment, CommentId, CommentRepository, Polarity,
    Post, PostFilter, PostId, PostRepository, Reaction, ReactionId, ReactionKind,
    ReactionRepository, ReactionTarget, RepositoryError, RepositoryFuture, Session, SessionId,
    SessionRepository, SessionToken, Timestamp, User, UserEmail, UserId, UserRepository, Username,
};
use tokio::sync::RwLock;

#[derive(Default, Clone)]
pub struct InMemoryUserRepository {
    data: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserRepository for InMemoryUserRepository {
    fn create(&self, user: User) -> RepositoryFuture<User> {
        let repo = self.data.clone();
        Box::pin(async move {
            let mut guard = repo.write().await;
            // 与数据库唯一约束一致
            let duplicate = guard.values().any(|u| {
                u.id == user.id || u.email == user.email || u.username == user.username
            });
            if duplicate {
                return Err(RepositoryError::Conflict);
            }
            let stored = user.clone();
            guard.insert(user.id, user);
            Ok(stored)
        })
    }

    fn find_by_id(&self, id: UserId) -> RepositoryFuture<Option<User>> {
        let repo = self.data.clone();
        Box::pin(async move {
            let guard = repo.read().await;
            Ok(guard.get(&id).cloned())
        })
    }

    fn find_by_email(&self, email: UserEmail) -> RepositoryFuture<Option<User>> {
        let repo = self.data.clone();
        Box::pin(async move {
            let guard = repo.read().await;
            Ok(guard.values().find(|u| u.email == email).cloned())
        })
    }

    fn email_exists(&self, email: UserEmail) -> RepositoryFuture<bool> {
        let repo = self.data.clone();
        Box::pin(async move {
            let guard = repo.read().await;
            Ok(guard.values().any(|u| u.email == email))
        })
    }

    fn username_exists(&self, username: Username) -> RepositoryFuture<bool> {
        let repo = self.data.clone();
        Box::pin(async move {
            let guard = repo.read().await;
            Ok(guard.values().any(|u| u.username == username))
        })
    }
}

#[derive(Default, Clone)]
pub struct InMemorySessionRepository {
    data: Arc<RwLock<HashMap<SessionId, Session>>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前保存的会话数量（含已过期未清理的）
    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl SessionRepository for InMemorySessionRepository {
    fn create(&self, session: Session) -> RepositoryFuture<Session> {
        let repo = self.data.clone();
        Box::pin(async move {
            let mut guard = repo.write().await;
            if guard
                .values()
                .any(|s| s.id == session.id || s.token == session.token)
            {
                return Err(RepositoryError::Conflict);
            }
            let stored = session.clone();
            guard.insert(session.id, session);
            Ok(stored)
        })
    }

    fn find_by_token(&self, token: SessionToken) -> RepositoryFuture<Option<Session>> {
        let repo = self.data.clone();
        Box::pin(async move {
            let guard = repo.read().await;
            Ok(guard.values().find(|s| s.token == token).cloned())
        })
    }

    fn find_by_user(&self, user_id: UserId) -> RepositoryFuture<Option<Session>> {
        let repo = self.data.clone();
        Box::pin(async move {
            let guard = repo.read().await;
            Ok(guard
                .values()
                .filter(|s| s.user_id == user_id)
                .max_by_key(|s| s.created_at)
                .cloned())
        })
    }

    fn update(&self, session: Session) -> RepositoryFuture<Session> {
        let repo = self.data.clone();
        Box::pin(async move {
            let mut guard = repo.write().await;
            let stored = guard.get_mut(&session.id).ok_or(RepositoryError::NotFound)?;
            stored.expires_at = session.expires_at;
            Ok(stored.clone())
        })
    }

    fn delete(&self, id: SessionId) -> RepositoryFuture<()> {
        let repo = self.data.clone();
        Box::pin(async move {
            repo.write().await.remove(&id);
            Ok(())
        })
    }

    fn delete_by_token(&self, token: SessionToken) -> RepositoryFuture<()> {
        let repo = self.data.clone();
        Box::pin(async move {
            repo.write().await.retain(|_, s| s.token != token);
            Ok(())
        })
    }

    fn delete_expired(&self, now: Timestamp) -> RepositoryFuture<u64> {
        let repo = self.data.clone();
        Box::pin(async move {
            let mut guard = repo.write().await;
            let before = guard.len();
            guard.retain(|_, s| s.is_live(now));
            Ok((before - guard.len()) as u64)
        })
    }

    fn delete_all_for_user(&self, user_id: UserId) -> RepositoryFuture<u64> {
        let repo = self.data.clone();
        Box::pin(async move {
            let mut guard = repo.write().await;
            let before = guard.len();
            guard.retain(|_, s| s.user_id != user_id);
            Ok((before - guard.len()) as u64)
        })
    }
}

#[derive(Default, Clone)]
pub struct InMemoryCategoryRepository {
    data: Arc<RwLock<HashMap<CategoryId, Category>>>,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CategoryRepository for InMemoryCategoryRepository {
    fn create(&self, category: Category) -> RepositoryFuture<Category> {
        let repo = self.data.clone();
        Box::pin(async move {
            let mut guard = repo.write().await;
            if guard
                .values()
                .any(|c| c.id == category.id || c.name == category.name)
            {
                return Err(RepositoryError::Conflict);
            }
            let stored = category.clone();
            guard.insert(category.id, category);
            Ok(stored)
        })
    }

    fn find_by_id(&self, id: CategoryId) -> RepositoryFuture<Option<Category>> {
        let repo = self.data.clone();
        Box::pin(async move { Ok(repo.read().await.get(&id).cloned()) })
    }

    fn find_by_name(&self, name: String) -> RepositoryFuture<Option<Category>> {
        let repo = self.data.clone();
        Box::pin(async move {
            let guard = repo.read().await;
            Ok(guard.values().find(|c| c.name == name).cloned())
        })
    }

    fn list(&self) -> RepositoryFuture<Vec<Category>> {
        let repo = self.data.clone();
        Box::pin(async move {
            let guard = repo.read().await;
            let mut categories: Vec<Category> = guard.values().cloned().collect();
            categories.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(categories)
        })
    }
}

#[derive(Default, Clone)]
pub struct InMemoryPostRepository {
    data: Arc<RwLock<HashMap<PostId, Post>>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PostRepository for InMemoryPostRepository {
    fn create(&self, post: Post) -> RepositoryFuture<Post> {
        let repo = self.data.clone();
        Box::pin(async move {
            let mut guard = repo.write().await;
            if guard.contains_key(&post.id) {
                return Err(RepositoryError::Conflict);
            }
            let stored = post.clone();
            guard.insert(post.id, post);
            Ok(stored)
        })
    }

    fn find_by_id(&self, id: PostId) -> RepositoryFuture<Option<Post>> {
        let repo = self.data.clone();
        Box::pin(async move { Ok(repo.read().await.get(&id).cloned()) })
    }

    fn list(&self, filter: PostFilter) -> RepositoryFuture<Vec<Post>> {
        let repo = self.data.clone();
        Box::pin(async move {
            let guard = repo.read().await;
            let mut posts: Vec<Post> = guard
                .values()
                .filter(|post| filter.matches(post))
                .cloned()
                .collect();
            posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(posts)
        })
    }
}

#[derive(Default, Clone)]
pub struct InMemoryCommentRepository {
    data: Arc<RwLock<HashMap<CommentId, Comment>>>,
}

impl InMemoryCommentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CommentRepository for InMemoryCommentRepository {
    fn create(&self, comment: Comment) -> RepositoryFuture<Comment> {
        let repo = self.data.clone();
        Box::pin(async move {
            let mut guard = repo.write().await;
            if guard.contains_key(&comment.id) {
                return Err(RepositoryError::Conflict);
            }
            let stored = comment.clone();
            guard.insert(comment.id, comment);
            Ok(stored)
        })
    }

    fn find_by_id(&self, id: CommentId) -> RepositoryFuture<Option<Comment>> {
        let repo = self.data.clone();
        Box::pin(async move { Ok(repo.read().await.get(&id).cloned()) })
    }

    fn list_by_post(&self, post_id: PostId) -> RepositoryFuture<Vec<Comment>> {
        let repo = self.data.clone();
        Box::pin(async move {
            let guard = repo.read().await;
            let mut comments: Vec<Comment> = guard
                .values()
                .filter(|c| c.post_id == post_id)
                .cloned()
                .collect();
            comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
            Ok(comments)
        })
    }

    fn count_by_post(&self, post_id: PostId) -> RepositoryFuture<u64> {
        let repo = self.data.clone();
        Box::pin(async move {
            let guard = repo.read().await;
            Ok(guard.values().filter(|c| c.post_id == post_id).count() as u64)
        })
    }
}

/// 单一目标种类的反应存储
#[derive(Clone)]
pub struct InMemoryReactionRepository {
    kind: ReactionKind,
    data: Arc<RwLock<HashMap<ReactionId, Reaction>>>,
}

impl InMemoryReactionRepository {
    pub fn new(kind: ReactionKind) -> Self {
        Self {
            kind,
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn for_posts() -> Self {
        Self::new(ReactionKind::Post)
    }

    pub fn for_comments() -> Self {
        Self::new(ReactionKind::Comment)
    }

    /// 某个 (用户, 目标) 的记录行数，正常情况下只会是 0 或 1
    pub async fn rows_for(&self, user_id: UserId, target: ReactionTarget) -> usize {
        self.data
            .read()
            .await
            .values()
            .filter(|r| r.user_id == user_id && r.target == target)
            .count()
    }
}

fn check_kind(expected: ReactionKind, target: ReactionTarget) -> Result<(), RepositoryError> {
    if target.kind() != expected {
        return Err(RepositoryError::storage(format!(
            "{} reaction store cannot hold {}",
            expected, target
        )));
    }
    Ok(())
}

impl ReactionRepository for InMemoryReactionRepository {
    fn kind(&self) -> ReactionKind {
        self.kind
    }

    fn find_by_user_and_target(
        &self,
        user_id: UserId,
        target: ReactionTarget,
    ) -> RepositoryFuture<Option<Reaction>> {
        let repo = self.data.clone();
        Box::pin(async move {
            let guard = repo.read().await;
            Ok(guard
                .values()
                .find(|r| r.user_id == user_id && r.target == target)
                .cloned())
        })
    }

    fn create(&self, reaction: Reaction) -> RepositoryFuture<Reaction> {
        let repo = self.data.clone();
        let kind = self.kind;
        Box::pin(async move {
            check_kind(kind, reaction.target)?;
            let mut guard = repo.write().await;
            // (user_id, target) 唯一
            if guard
                .values()
                .any(|r| r.user_id == reaction.user_id && r.target == reaction.target)
            {
                return Err(RepositoryError::Conflict);
            }
            let stored = reaction.clone();
            guard.insert(reaction.id, reaction);
            Ok(stored)
        })
    }

    fn update(&self, reaction: Reaction) -> RepositoryFuture<Reaction> {
        let repo = self.data.clone();
        Box::pin(async move {
            let mut guard = repo.write().await;
            let stored = guard.get_mut(&reaction.id).ok_or(RepositoryError::NotFound)?;
            stored.polarity = reaction.polarity;
            stored.updated_at = reaction.updated_at;
            Ok(stored.clone())
        })
    }

    fn delete(&self, id: ReactionId) -> RepositoryFuture<()> {
        let repo = self.data.clone();
        Box::pin(async move {
            repo.write().await.remove(&id);
            Ok(())
        })
    }

    fn count_by_target(&self, target: ReactionTarget, polarity: Polarity) -> RepositoryFuture<u64> {
        let repo = self.data.clone();
        Box::pin(async move {
            let guard = repo.read().await;
            Ok(guard
                .values()
                .filter(|r| r.target == target && r.polarity == polarity)
                .count() as u64)
        })
    }

    fn list_targets_by_user(
        &self,
        user_id: UserId,
        polarity: Polarity,
    ) -> RepositoryFuture<Vec<ReactionTarget>> {
        let repo = self.data.clone();
        Box::pin(async move {
            let guard = repo.read().await;
            Ok(guard
                .values()
                .filter(|r| r.user_id == user_id && r.polarity == polarity)
                .map(|r| r.target)
                .collect())
        })
    }
}

/// 一整套进程内存储，便于一次性注入各个服务
#[derive(Clone)]
pub struct InMemoryStorage {
    pub users: Arc<InMemoryUserRepository>,
    pub sessions: Arc<InMemorySessionRepository>,
    pub categories: Arc<InMemoryCategoryRepository>,
    pub posts: Arc<InMemoryPostRepository>,
    pub comments: Arc<InMemoryCommentRepository>,
    pub post_reactions: Arc<InMemoryReactionRepository>,
    pub comment_reactions: Arc<InMemoryReactionRepository>,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            sessions: Arc::new(InMemorySessionRepository::new()),
            categories: Arc::new(InMemoryCategoryRepository::new()),
            posts: Arc::new(InMemoryPostRepository::new()),
            comments: Arc::new(InMemoryCommentRepository::new()),
            post_reactions: Arc::new(InMemoryReactionRepository::for_posts()),
            comment_reactions: Arc::new(InMemoryReactionRepository::for_comments()),
        }
    }
}
