use std::sync::Arc;

use application::{AuthService, CategoryService, CommentService, PostService, ReactionService};

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub reactions: Arc<ReactionService>,
    pub posts: Arc<PostService>,
    pub comments: Arc<CommentService>,
    pub categories: Arc<CategoryService>,
    /// 生产环境经由 HTTPS 提供服务时打开
    pub secure_cookie: bool,
}

impl AppState {
    pub fn new(
        auth: Arc<AuthService>,
        reactions: Arc<ReactionService>,
        posts: Arc<PostService>,
        comments: Arc<CommentService>,
        categories: Arc<CategoryService>,
    ) -> Self {
        Self {
            auth,
            reactions,
            posts,
            comments,
            categories,
            secure_cookie: false,
        }
    }

    pub fn with_secure_cookie(mut self, secure: bool) -> Self {
        self.secure_cookie = secure;
        self
    }
}
