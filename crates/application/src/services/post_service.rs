use std::collections::HashMap;
use std::sync::Arc;

use domain::{
    CategoryId, CategoryRepository, Comment, CommentRepository, Post, PostFilter, PostId,
    PostRepository, ReactionCounts, ReactionTarget, SessionToken, UserId, UserRepository,
};
use tracing::{info, warn};

use crate::{
    clock::Clock, error::ApplicationError, rate_limiter::ActionRateLimiter,
    services::auth_service::AuthService, services::reaction_service::ReactionService,
};

/// 帖子正文默认长度上限（字符数）
pub const DEFAULT_MAX_POST_LENGTH: usize = 5000;

#[derive(Debug, Clone)]
pub struct CreatePostRequest {
    pub content: String,
    pub category_ids: Vec<CategoryId>,
}

/// 帖子列表查询，条件之间为 AND
#[derive(Debug, Clone, Default)]
pub struct PostQuery {
    pub category_id: Option<CategoryId>,
    /// 只看该用户发的帖子
    pub author_id: Option<UserId>,
    /// 只看该用户点过赞的帖子
    pub liked_by: Option<UserId>,
}

/// 列表中的一条帖子
#[derive(Debug, Clone)]
pub struct PostSummary {
    pub post: Post,
    pub author: String,
    pub categories: Vec<String>,
    pub reactions: ReactionCounts,
    pub comment_count: u64,
}

#[derive(Debug, Clone)]
pub struct CommentView {
    pub comment: Comment,
    pub author: String,
    pub reactions: ReactionCounts,
}

#[derive(Debug, Clone)]
pub struct PostDetail {
    pub summary: PostSummary,
    /// 按创建时间正序
    pub comments: Vec<CommentView>,
}

pub struct PostServiceDependencies {
    pub auth: Arc<AuthService>,
    pub reactions: Arc<ReactionService>,
    pub user_repository: Arc<dyn UserRepository>,
    pub category_repository: Arc<dyn CategoryRepository>,
    pub post_repository: Arc<dyn PostRepository>,
    pub comment_repository: Arc<dyn CommentRepository>,
    pub rate_limiter: Arc<ActionRateLimiter>,
    pub clock: Arc<dyn Clock>,
}

pub struct PostService {
    deps: PostServiceDependencies,
    max_content_length: usize,
}

const UNKNOWN_AUTHOR: &str = "unknown";

impl PostService {
    pub fn new(deps: PostServiceDependencies) -> Self {
        Self {
            deps,
            max_content_length: DEFAULT_MAX_POST_LENGTH,
        }
    }

    pub fn with_max_content_length(mut self, max: usize) -> Self {
        self.max_content_length = max;
        self
    }

    /// 发帖
    ///
    /// 顺序：身份 → 正文 → 分类 → 限流 → 持久化 → 记录动作时间。
    /// 校验失败或存储失败都不消耗冷却窗口。
    pub async fn create_post(
        &self,
        token: &SessionToken,
        request: CreatePostRequest,
    ) -> Result<Post, ApplicationError> {
        let identity = self.deps.auth.authenticate(token).await?;
        let author_id = identity.user.id;

        let content = request.content.trim();
        if content.is_empty() {
            return Err(ApplicationError::validation("content", "cannot be empty"));
        }
        if content.chars().count() > self.max_content_length {
            return Err(ApplicationError::validation(
                "content",
                format!("must be at most {} characters", self.max_content_length),
            ));
        }

        let mut category_ids: Vec<CategoryId> = Vec::with_capacity(request.category_ids.len());
        for id in request.category_ids {
            if !category_ids.contains(&id) {
                category_ids.push(id);
            }
        }
        if category_ids.is_empty() {
            return Err(ApplicationError::validation(
                "categories",
                "at least one category is required",
            ));
        }
        for id in &category_ids {
            if self
                .deps
                .category_repository
                .find_by_id(*id)
                .await?
                .is_none()
            {
                return Err(ApplicationError::NotFound("category"));
            }
        }

        if !self.deps.rate_limiter.can_act(author_id) {
            let retry_after_secs = self.deps.rate_limiter.retry_after(author_id).unwrap_or(1);
            warn!(user_id = %author_id, retry_after_secs, "post rate limited");
            return Err(ApplicationError::RateLimited { retry_after_secs });
        }

        let post = Post::new(
            PostId::generate(),
            author_id,
            content,
            category_ids,
            self.deps.clock.now(),
        );
        let stored = self.deps.post_repository.create(post).await?;
        self.deps.rate_limiter.record_action(author_id);

        info!(user_id = %author_id, post_id = %stored.id, "post created");
        Ok(stored)
    }

    /// 按创建时间倒序
    pub async fn list_posts(&self, query: PostQuery) -> Result<Vec<PostSummary>, ApplicationError> {
        let only_ids = match query.liked_by {
            Some(user_id) => Some(self.deps.reactions.liked_posts(user_id).await?),
            None => None,
        };
        let filter = PostFilter {
            category_id: query.category_id,
            author_id: query.author_id,
            only_ids,
        };

        let posts = self.deps.post_repository.list(filter).await?;
        let category_names = self.category_names().await?;
        let mut authors = HashMap::new();

        let mut summaries = Vec::with_capacity(posts.len());
        for post in posts {
            summaries.push(self.summarize(post, &category_names, &mut authors).await?);
        }
        Ok(summaries)
    }

    pub async fn get_post(&self, post_id: PostId) -> Result<PostDetail, ApplicationError> {
        let post = self
            .deps
            .post_repository
            .find_by_id(post_id)
            .await?
            .ok_or(ApplicationError::NotFound("post"))?;

        let category_names = self.category_names().await?;
        let mut authors = HashMap::new();
        let summary = self.summarize(post, &category_names, &mut authors).await?;

        let comments = self.deps.comment_repository.list_by_post(post_id).await?;
        let mut views = Vec::with_capacity(comments.len());
        for comment in comments {
            let author = self.author_name(comment.author_id, &mut authors).await?;
            let reactions = self
                .deps
                .reactions
                .counts(ReactionTarget::Comment(comment.id))
                .await?;
            views.push(CommentView {
                comment,
                author,
                reactions,
            });
        }

        Ok(PostDetail {
            summary,
            comments: views,
        })
    }

    async fn category_names(&self) -> Result<HashMap<CategoryId, String>, ApplicationError> {
        let categories = self.deps.category_repository.list().await?;
        Ok(categories.into_iter().map(|c| (c.id, c.name)).collect())
    }

    async fn author_name(
        &self,
        user_id: UserId,
        cache: &mut HashMap<UserId, String>,
    ) -> Result<String, ApplicationError> {
        if let Some(name) = cache.get(&user_id) {
            return Ok(name.clone());
        }
        let name = self
            .deps
            .user_repository
            .find_by_id(user_id)
            .await?
            .map(|user| user.username.to_string())
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());
        cache.insert(user_id, name.clone());
        Ok(name)
    }

    async fn summarize(
        &self,
        post: Post,
        category_names: &HashMap<CategoryId, String>,
        authors: &mut HashMap<UserId, String>,
    ) -> Result<PostSummary, ApplicationError> {
        let author = self.author_name(post.author_id, authors).await?;
        let categories = post
            .category_ids
            .iter()
            .filter_map(|id| category_names.get(id).cloned())
            .collect();
        let reactions = self
            .deps
            .reactions
            .counts(ReactionTarget::Post(post.id))
            .await?;
        let comment_count = self.deps.comment_repository.count_by_post(post.id).await?;

        Ok(PostSummary {
            post,
            author,
            categories,
            reactions,
            comment_count,
        })
    }
}
