use std::sync::Arc;

use domain::{
    Category, CategoryId, CategoryRepository, Comment, CommentId, CommentRepository, Polarity,
    Post, PostFilter, PostId, PostRepository, Reaction, ReactionId, ReactionKind,
    ReactionRepository, ReactionTarget, RepositoryError, RepositoryFuture, Session, SessionId,
    SessionRepository, SessionToken, Timestamp, User, UserEmail, UserId, UserRepository, Username,
};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

fn map_sqlx_err(err: sqlx::Error) -> RepositoryError {
    match &err {
        sqlx::Error::RowNotFound => RepositoryError::NotFound,
        sqlx::Error::Database(db) if db.is_unique_violation() => RepositoryError::Conflict,
        _ => RepositoryError::storage(err.to_string()),
    }
}

fn invalid_data(message: impl Into<String>) -> RepositoryError {
    RepositoryError::storage(message)
}

#[derive(Debug, FromRow)]
struct UserRecord {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    created_at: OffsetDateTime,
}

impl TryFrom<UserRecord> for User {
    type Error = RepositoryError;

    fn try_from(value: UserRecord) -> Result<Self, Self::Error> {
        let username = Username::parse(value.username).map_err(|err| invalid_data(err.to_string()))?;
        let email = UserEmail::parse(value.email).map_err(|err| invalid_data(err.to_string()))?;
        let password = domain::PasswordHash::new(value.password_hash)
            .map_err(|err| invalid_data(err.to_string()))?;

        Ok(User {
            id: UserId::from(value.id),
            username,
            email,
            password,
            created_at: value.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct SessionRecord {
    id: Uuid,
    user_id: Uuid,
    token: String,
    expires_at: OffsetDateTime,
    created_at: OffsetDateTime,
}

impl TryFrom<SessionRecord> for Session {
    type Error = RepositoryError;

    fn try_from(value: SessionRecord) -> Result<Self, Self::Error> {
        let token = SessionToken::parse(value.token).map_err(|err| invalid_data(err.to_string()))?;
        Ok(Session {
            id: SessionId::from(value.id),
            user_id: UserId::from(value.user_id),
            token,
            expires_at: value.expires_at,
            created_at: value.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct CategoryRecord {
    id: Uuid,
    name: String,
    created_at: OffsetDateTime,
}

impl From<CategoryRecord> for Category {
    fn from(value: CategoryRecord) -> Self {
        Category {
            id: CategoryId::from(value.id),
            name: value.name,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct PostRecord {
    id: Uuid,
    author_id: Uuid,
    content: String,
    created_at: OffsetDateTime,
    category_ids: Vec<Uuid>,
}

impl From<PostRecord> for Post {
    fn from(value: PostRecord) -> Self {
        Post::new(
            PostId::from(value.id),
            UserId::from(value.author_id),
            value.content,
            value.category_ids.into_iter().map(CategoryId::from).collect(),
            value.created_at,
        )
    }
}

#[derive(Debug, FromRow)]
struct CommentRecord {
    id: Uuid,
    post_id: Uuid,
    author_id: Uuid,
    content: String,
    created_at: OffsetDateTime,
}

impl From<CommentRecord> for Comment {
    fn from(value: CommentRecord) -> Self {
        Comment::new(
            CommentId::from(value.id),
            PostId::from(value.post_id),
            UserId::from(value.author_id),
            value.content,
            value.created_at,
        )
    }
}

#[derive(Debug, FromRow)]
struct ReactionRecord {
    id: Uuid,
    user_id: Uuid,
    target_id: Uuid,
    is_like: bool,
    updated_at: OffsetDateTime,
}

impl ReactionRecord {
    fn into_reaction(self, kind: ReactionKind) -> Reaction {
        Reaction {
            id: ReactionId::from(self.id),
            user_id: UserId::from(self.user_id),
            target: ReactionTarget::from_raw(kind, self.target_id),
            polarity: Polarity::from_is_like(self.is_like),
            updated_at: self.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl UserRepository for PgUserRepository {
    fn create(&self, user: User) -> RepositoryFuture<User> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, UserRecord>(
                r#"
                INSERT INTO users (id, username, email, password_hash, created_at)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, username, email, password_hash, created_at
                "#,
            )
            .bind(Uuid::from(user.id))
            .bind(user.username.as_str())
            .bind(user.email.as_str())
            .bind(user.password.as_str())
            .bind(user.created_at)
            .fetch_one(&pool)
            .await
            .map_err(map_sqlx_err)?;

            User::try_from(record)
        })
    }

    fn find_by_id(&self, id: UserId) -> RepositoryFuture<Option<User>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, UserRecord>(
                r#"
                SELECT id, username, email, password_hash, created_at
                FROM users
                WHERE id = $1
                "#,
            )
            .bind(Uuid::from(id))
            .fetch_optional(&pool)
            .await
            .map_err(map_sqlx_err)?;

            record.map(User::try_from).transpose()
        })
    }

    fn find_by_email(&self, email: UserEmail) -> RepositoryFuture<Option<User>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, UserRecord>(
                r#"
                SELECT id, username, email, password_hash, created_at
                FROM users
                WHERE email = $1
                "#,
            )
            .bind(email.as_str())
            .fetch_optional(&pool)
            .await
            .map_err(map_sqlx_err)?;

            record.map(User::try_from).transpose()
        })
    }

    fn email_exists(&self, email: UserEmail) -> RepositoryFuture<bool> {
        let pool = self.pool.clone();
        Box::pin(async move {
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&pool)
                .await
                .map_err(map_sqlx_err)
        })
    }

    fn username_exists(&self, username: Username) -> RepositoryFuture<bool> {
        let pool = self.pool.clone();
        Box::pin(async move {
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(username.as_str())
                .fetch_one(&pool)
                .await
                .map_err(map_sqlx_err)
        })
    }
}

#[derive(Clone)]
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl SessionRepository for PgSessionRepository {
    fn create(&self, session: Session) -> RepositoryFuture<Session> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, SessionRecord>(
                r#"
                INSERT INTO sessions (id, user_id, token, expires_at, created_at)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, user_id, token, expires_at, created_at
                "#,
            )
            .bind(Uuid::from(session.id))
            .bind(Uuid::from(session.user_id))
            .bind(session.token.as_str())
            .bind(session.expires_at)
            .bind(session.created_at)
            .fetch_one(&pool)
            .await
            .map_err(map_sqlx_err)?;

            Session::try_from(record)
        })
    }

    fn find_by_token(&self, token: SessionToken) -> RepositoryFuture<Option<Session>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, SessionRecord>(
                r#"
                SELECT id, user_id, token, expires_at, created_at
                FROM sessions
                WHERE token = $1
                "#,
            )
            .bind(token.as_str())
            .fetch_optional(&pool)
            .await
            .map_err(map_sqlx_err)?;

            record.map(Session::try_from).transpose()
        })
    }

    fn find_by_user(&self, user_id: UserId) -> RepositoryFuture<Option<Session>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, SessionRecord>(
                r#"
                SELECT id, user_id, token, expires_at, created_at
                FROM sessions
                WHERE user_id = $1
                ORDER BY created_at DESC
                LIMIT 1
                "#,
            )
            .bind(Uuid::from(user_id))
            .fetch_optional(&pool)
            .await
            .map_err(map_sqlx_err)?;

            record.map(Session::try_from).transpose()
        })
    }

    fn update(&self, session: Session) -> RepositoryFuture<Session> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, SessionRecord>(
                r#"
                UPDATE sessions
                SET expires_at = $2
                WHERE id = $1
                RETURNING id, user_id, token, expires_at, created_at
                "#,
            )
            .bind(Uuid::from(session.id))
            .bind(session.expires_at)
            .fetch_optional(&pool)
            .await
            .map_err(map_sqlx_err)?
            .ok_or(RepositoryError::NotFound)?;

            Session::try_from(record)
        })
    }

    fn delete(&self, id: SessionId) -> RepositoryFuture<()> {
        let pool = self.pool.clone();
        Box::pin(async move {
            sqlx::query("DELETE FROM sessions WHERE id = $1")
                .bind(Uuid::from(id))
                .execute(&pool)
                .await
                .map_err(map_sqlx_err)?;
            Ok(())
        })
    }

    fn delete_by_token(&self, token: SessionToken) -> RepositoryFuture<()> {
        let pool = self.pool.clone();
        Box::pin(async move {
            sqlx::query("DELETE FROM sessions WHERE token = $1")
                .bind(token.as_str())
                .execute(&pool)
                .await
                .map_err(map_sqlx_err)?;
            Ok(())
        })
    }

    fn delete_expired(&self, now: Timestamp) -> RepositoryFuture<u64> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
                .bind(now)
                .execute(&pool)
                .await
                .map_err(map_sqlx_err)?;
            Ok(result.rows_affected())
        })
    }

    fn delete_all_for_user(&self, user_id: UserId) -> RepositoryFuture<u64> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
                .bind(Uuid::from(user_id))
                .execute(&pool)
                .await
                .map_err(map_sqlx_err)?;
            Ok(result.rows_affected())
        })
    }
}

#[derive(Clone)]
pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl CategoryRepository for PgCategoryRepository {
    fn create(&self, category: Category) -> RepositoryFuture<Category> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, CategoryRecord>(
                r#"
                INSERT INTO categories (id, name, created_at)
                VALUES ($1, $2, $3)
                RETURNING id, name, created_at
                "#,
            )
            .bind(Uuid::from(category.id))
            .bind(&category.name)
            .bind(category.created_at)
            .fetch_one(&pool)
            .await
            .map_err(map_sqlx_err)?;

            Ok(Category::from(record))
        })
    }

    fn find_by_id(&self, id: CategoryId) -> RepositoryFuture<Option<Category>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, CategoryRecord>(
                "SELECT id, name, created_at FROM categories WHERE id = $1",
            )
            .bind(Uuid::from(id))
            .fetch_optional(&pool)
            .await
            .map_err(map_sqlx_err)?;

            Ok(record.map(Category::from))
        })
    }

    fn find_by_name(&self, name: String) -> RepositoryFuture<Option<Category>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, CategoryRecord>(
                "SELECT id, name, created_at FROM categories WHERE name = $1",
            )
            .bind(name)
            .fetch_optional(&pool)
            .await
            .map_err(map_sqlx_err)?;

            Ok(record.map(Category::from))
        })
    }

    fn list(&self) -> RepositoryFuture<Vec<Category>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let records = sqlx::query_as::<_, CategoryRecord>(
                "SELECT id, name, created_at FROM categories ORDER BY name",
            )
            .fetch_all(&pool)
            .await
            .map_err(map_sqlx_err)?;

            Ok(records.into_iter().map(Category::from).collect())
        })
    }
}

#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// 帖子连同分类 id 一次查出
const POST_SELECT: &str = r#"
    SELECT p.id, p.author_id, p.content, p.created_at,
           COALESCE(
               array_agg(pc.category_id ORDER BY pc.position)
                   FILTER (WHERE pc.category_id IS NOT NULL),
               '{}'
           ) AS category_ids
    FROM posts p
    LEFT JOIN post_categories pc ON pc.post_id = p.id
"#;

impl PostRepository for PgPostRepository {
    fn create(&self, post: Post) -> RepositoryFuture<Post> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let mut tx = pool.begin().await.map_err(map_sqlx_err)?;

            sqlx::query(
                r#"
                INSERT INTO posts (id, author_id, content, created_at)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(Uuid::from(post.id))
            .bind(Uuid::from(post.author_id))
            .bind(&post.content)
            .bind(post.created_at)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;

            for (position, category_id) in post.category_ids.iter().enumerate() {
                sqlx::query(
                    r#"
                    INSERT INTO post_categories (post_id, category_id, position)
                    VALUES ($1, $2, $3)
                    "#,
                )
                .bind(Uuid::from(post.id))
                .bind(Uuid::from(*category_id))
                .bind(position as i32)
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_err)?;
            }

            tx.commit().await.map_err(map_sqlx_err)?;
            Ok(post)
        })
    }

    fn find_by_id(&self, id: PostId) -> RepositoryFuture<Option<Post>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let sql = format!("{POST_SELECT} WHERE p.id = $1 GROUP BY p.id");
            let record = sqlx::query_as::<_, PostRecord>(&sql)
                .bind(Uuid::from(id))
                .fetch_optional(&pool)
                .await
                .map_err(map_sqlx_err)?;

            Ok(record.map(Post::from))
        })
    }

    fn list(&self, filter: PostFilter) -> RepositoryFuture<Vec<Post>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let sql = format!(
                r#"{POST_SELECT}
                WHERE ($1::uuid IS NULL OR EXISTS (
                        SELECT 1 FROM post_categories f
                        WHERE f.post_id = p.id AND f.category_id = $1))
                  AND ($2::uuid IS NULL OR p.author_id = $2)
                  AND ($3::uuid[] IS NULL OR p.id = ANY($3))
                GROUP BY p.id
                ORDER BY p.created_at DESC
                "#
            );
            let only_ids: Option<Vec<Uuid>> = filter
                .only_ids
                .map(|ids| ids.into_iter().map(Uuid::from).collect());

            let records = sqlx::query_as::<_, PostRecord>(&sql)
                .bind(filter.category_id.map(Uuid::from))
                .bind(filter.author_id.map(Uuid::from))
                .bind(only_ids)
                .fetch_all(&pool)
                .await
                .map_err(map_sqlx_err)?;

            Ok(records.into_iter().map(Post::from).collect())
        })
    }
}

#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl CommentRepository for PgCommentRepository {
    fn create(&self, comment: Comment) -> RepositoryFuture<Comment> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, CommentRecord>(
                r#"
                INSERT INTO comments (id, post_id, author_id, content, created_at)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, post_id, author_id, content, created_at
                "#,
            )
            .bind(Uuid::from(comment.id))
            .bind(Uuid::from(comment.post_id))
            .bind(Uuid::from(comment.author_id))
            .bind(&comment.content)
            .bind(comment.created_at)
            .fetch_one(&pool)
            .await
            .map_err(map_sqlx_err)?;

            Ok(Comment::from(record))
        })
    }

    fn find_by_id(&self, id: CommentId) -> RepositoryFuture<Option<Comment>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, CommentRecord>(
                r#"
                SELECT id, post_id, author_id, content, created_at
                FROM comments
                WHERE id = $1
                "#,
            )
            .bind(Uuid::from(id))
            .fetch_optional(&pool)
            .await
            .map_err(map_sqlx_err)?;

            Ok(record.map(Comment::from))
        })
    }

    fn list_by_post(&self, post_id: PostId) -> RepositoryFuture<Vec<Comment>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let records = sqlx::query_as::<_, CommentRecord>(
                r#"
                SELECT id, post_id, author_id, content, created_at
                FROM comments
                WHERE post_id = $1
                ORDER BY created_at ASC
                "#,
            )
            .bind(Uuid::from(post_id))
            .fetch_all(&pool)
            .await
            .map_err(map_sqlx_err)?;

            Ok(records.into_iter().map(Comment::from).collect())
        })
    }

    fn count_by_post(&self, post_id: PostId) -> RepositoryFuture<u64> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE post_id = $1")
                .bind(Uuid::from(post_id))
                .fetch_one(&pool)
                .await
                .map_err(map_sqlx_err)?;
            Ok(count.max(0) as u64)
        })
    }
}

/// 每种目标一张表：`post_reactions` / `comment_reactions`，
/// 两张表都有 `UNIQUE (user_id, target_id)`
#[derive(Clone)]
pub struct PgReactionRepository {
    pool: PgPool,
    kind: ReactionKind,
}

impl PgReactionRepository {
    pub fn new(pool: PgPool, kind: ReactionKind) -> Self {
        Self { pool, kind }
    }

    fn table(kind: ReactionKind) -> &'static str {
        match kind {
            ReactionKind::Post => "post_reactions",
            ReactionKind::Comment => "comment_reactions",
        }
    }

    fn check_target(&self, target: ReactionTarget) -> Result<Uuid, RepositoryError> {
        if target.kind() != self.kind {
            return Err(invalid_data(format!(
                "{} reaction store cannot hold {}",
                self.kind, target
            )));
        }
        Ok(target.raw_id())
    }
}

impl ReactionRepository for PgReactionRepository {
    fn kind(&self) -> ReactionKind {
        self.kind
    }

    fn find_by_user_and_target(
        &self,
        user_id: UserId,
        target: ReactionTarget,
    ) -> RepositoryFuture<Option<Reaction>> {
        let pool = self.pool.clone();
        let kind = self.kind;
        let target_id = self.check_target(target);
        Box::pin(async move {
            let target_id = target_id?;
            let sql = format!(
                "SELECT id, user_id, target_id, is_like, updated_at FROM {} \
                 WHERE user_id = $1 AND target_id = $2",
                Self::table(kind)
            );
            let record = sqlx::query_as::<_, ReactionRecord>(&sql)
                .bind(Uuid::from(user_id))
                .bind(target_id)
                .fetch_optional(&pool)
                .await
                .map_err(map_sqlx_err)?;

            Ok(record.map(|r| r.into_reaction(kind)))
        })
    }

    fn create(&self, reaction: Reaction) -> RepositoryFuture<Reaction> {
        let pool = self.pool.clone();
        let kind = self.kind;
        let target_id = self.check_target(reaction.target);
        Box::pin(async move {
            let target_id = target_id?;
            let sql = format!(
                "INSERT INTO {} (id, user_id, target_id, is_like, updated_at) \
                 VALUES ($1, $2, $3, $4, $5) \
                 RETURNING id, user_id, target_id, is_like, updated_at",
                Self::table(kind)
            );
            let record = sqlx::query_as::<_, ReactionRecord>(&sql)
                .bind(Uuid::from(reaction.id))
                .bind(Uuid::from(reaction.user_id))
                .bind(target_id)
                .bind(reaction.polarity.is_like())
                .bind(reaction.updated_at)
                .fetch_one(&pool)
                .await
                .map_err(map_sqlx_err)?;

            Ok(record.into_reaction(kind))
        })
    }

    fn update(&self, reaction: Reaction) -> RepositoryFuture<Reaction> {
        let pool = self.pool.clone();
        let kind = self.kind;
        Box::pin(async move {
            let sql = format!(
                "UPDATE {} SET is_like = $2, updated_at = $3 WHERE id = $1 \
                 RETURNING id, user_id, target_id, is_like, updated_at",
                Self::table(kind)
            );
            let record = sqlx::query_as::<_, ReactionRecord>(&sql)
                .bind(Uuid::from(reaction.id))
                .bind(reaction.polarity.is_like())
                .bind(reaction.updated_at)
                .fetch_optional(&pool)
                .await
                .map_err(map_sqlx_err)?
                .ok_or(RepositoryError::NotFound)?;

            Ok(record.into_reaction(kind))
        })
    }

    fn delete(&self, id: ReactionId) -> RepositoryFuture<()> {
        let pool = self.pool.clone();
        let kind = self.kind;
        Box::pin(async move {
            let sql = format!("DELETE FROM {} WHERE id = $1", Self::table(kind));
            sqlx::query(&sql)
                .bind(Uuid::from(id))
                .execute(&pool)
                .await
                .map_err(map_sqlx_err)?;
            Ok(())
        })
    }

    fn count_by_target(&self, target: ReactionTarget, polarity: Polarity) -> RepositoryFuture<u64> {
        let pool = self.pool.clone();
        let kind = self.kind;
        let target_id = self.check_target(target);
        Box::pin(async move {
            let target_id = target_id?;
            let sql = format!(
                "SELECT COUNT(*) FROM {} WHERE target_id = $1 AND is_like = $2",
                Self::table(kind)
            );
            let count = sqlx::query_scalar::<_, i64>(&sql)
                .bind(target_id)
                .bind(polarity.is_like())
                .fetch_one(&pool)
                .await
                .map_err(map_sqlx_err)?;
            Ok(count.max(0) as u64)
        })
    }

    fn list_targets_by_user(
        &self,
        user_id: UserId,
        polarity: Polarity,
    ) -> RepositoryFuture<Vec<ReactionTarget>> {
        let pool = self.pool.clone();
        let kind = self.kind;
        Box::pin(async move {
            let sql = format!(
                "SELECT target_id FROM {} WHERE user_id = $1 AND is_like = $2",
                Self::table(kind)
            );
            let ids = sqlx::query_scalar::<_, Uuid>(&sql)
                .bind(Uuid::from(user_id))
                .bind(polarity.is_like())
                .fetch_all(&pool)
                .await
                .map_err(map_sqlx_err)?;
            Ok(ids
                .into_iter()
                .map(|id| ReactionTarget::from_raw(kind, id))
                .collect())
        })
    }
}

#[derive(Clone)]
pub struct PgStorage {
    pub pool: PgPool,
    pub user_repository: Arc<PgUserRepository>,
    pub session_repository: Arc<PgSessionRepository>,
    pub category_repository: Arc<PgCategoryRepository>,
    pub post_repository: Arc<PgPostRepository>,
    pub comment_repository: Arc<PgCommentRepository>,
    pub post_reactions: Arc<PgReactionRepository>,
    pub comment_reactions: Arc<PgReactionRepository>,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self {
            user_repository: Arc::new(PgUserRepository::new(pool.clone())),
            session_repository: Arc::new(PgSessionRepository::new(pool.clone())),
            category_repository: Arc::new(PgCategoryRepository::new(pool.clone())),
            post_repository: Arc::new(PgPostRepository::new(pool.clone())),
            comment_repository: Arc::new(PgCommentRepository::new(pool.clone())),
            post_reactions: Arc::new(PgReactionRepository::new(pool.clone(), ReactionKind::Post)),
            comment_reactions: Arc::new(PgReactionRepository::new(
                pool.clone(),
                ReactionKind::Comment,
            )),
            pool,
        }
    }
}

pub async fn create_pg_pool(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}
