use std::sync::Arc;

use domain::{Comment, CommentId, CommentRepository, PostId, PostRepository, SessionToken};
use tracing::{info, warn};

use crate::{
    clock::Clock, error::ApplicationError, rate_limiter::ActionRateLimiter,
    services::auth_service::AuthService,
};

/// 评论默认长度上限（字符数）
pub const DEFAULT_MAX_COMMENT_LENGTH: usize = 250;

pub struct CommentServiceDependencies {
    pub auth: Arc<AuthService>,
    pub post_repository: Arc<dyn PostRepository>,
    pub comment_repository: Arc<dyn CommentRepository>,
    pub rate_limiter: Arc<ActionRateLimiter>,
    pub clock: Arc<dyn Clock>,
}

pub struct CommentService {
    deps: CommentServiceDependencies,
    max_content_length: usize,
}

impl CommentService {
    pub fn new(deps: CommentServiceDependencies) -> Self {
        Self {
            deps,
            max_content_length: DEFAULT_MAX_COMMENT_LENGTH,
        }
    }

    pub fn with_max_content_length(mut self, max: usize) -> Self {
        self.max_content_length = max;
        self
    }

    pub async fn create_comment(
        &self,
        token: &SessionToken,
        post_id: PostId,
        content: &str,
    ) -> Result<Comment, ApplicationError> {
        let identity = self.deps.auth.authenticate(token).await?;
        let author_id = identity.user.id;

        let content = content.trim();
        let len = content.chars().count();
        if len == 0 || len > self.max_content_length {
            return Err(ApplicationError::validation(
                "content",
                format!("must be 1-{} characters", self.max_content_length),
            ));
        }

        if self
            .deps
            .post_repository
            .find_by_id(post_id)
            .await?
            .is_none()
        {
            return Err(ApplicationError::NotFound("post"));
        }

        if !self.deps.rate_limiter.can_act(author_id) {
            let retry_after_secs = self.deps.rate_limiter.retry_after(author_id).unwrap_or(1);
            warn!(user_id = %author_id, retry_after_secs, "comment rate limited");
            return Err(ApplicationError::RateLimited { retry_after_secs });
        }

        let comment = Comment::new(
            CommentId::generate(),
            post_id,
            author_id,
            content,
            self.deps.clock.now(),
        );
        let stored = self.deps.comment_repository.create(comment).await?;
        self.deps.rate_limiter.record_action(author_id);

        info!(
            user_id = %author_id,
            post_id = %post_id,
            comment_id = %stored.id,
            "comment created"
        );
        Ok(stored)
    }
}
