//! 主应用程序入口
//!
//! 加载配置、组装存储与服务，启动 Axum Web API 与后台会话清理。

use std::sync::Arc;

use application::{
    ActionRateLimiter, AuthService, AuthServiceDependencies, CategoryService,
    CategoryServiceDependencies, Clock, CommentService, CommentServiceDependencies,
    InMemoryStorage, PasswordHasher, PostService, PostServiceDependencies, ReactionService,
    ReactionServiceDependencies, SystemClock, spawn_session_cleanup,
};
use config::{AppConfig, StorageBackend};
use domain::{
    CategoryRepository, CommentRepository, PostRepository, ReactionRepository, SessionRepository,
    UserRepository,
};
use infrastructure::{BcryptPasswordHasher, Infrastructure, InfrastructureConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use web_api::{router, AppState};

/// 服务层使用的存储句柄
struct Repositories {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
    categories: Arc<dyn CategoryRepository>,
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    post_reactions: Arc<dyn ReactionRepository>,
    comment_reactions: Arc<dyn ReactionRepository>,
}

async fn open_storage(
    config: &AppConfig,
) -> anyhow::Result<(Repositories, Arc<dyn PasswordHasher>)> {
    let hasher_cost = config.server.bcrypt_cost;

    match config.database.backend {
        StorageBackend::Postgres => {
            let infra = Infrastructure::connect(InfrastructureConfig::from(config)).await?;
            let password_hasher = infra.password_hasher_trait();
            let storage = infra.storage;
            let repositories = Repositories {
                users: storage.user_repository.clone(),
                sessions: storage.session_repository.clone(),
                categories: storage.category_repository.clone(),
                posts: storage.post_repository.clone(),
                comments: storage.comment_repository.clone(),
                post_reactions: storage.post_reactions.clone(),
                comment_reactions: storage.comment_reactions.clone(),
            };
            Ok((repositories, password_hasher))
        }
        StorageBackend::Memory => {
            warn!("using in-memory storage, data is lost on restart");
            let storage = InMemoryStorage::new();
            let repositories = Repositories {
                users: storage.users,
                sessions: storage.sessions,
                categories: storage.categories,
                posts: storage.posts,
                comments: storage.comments,
                post_reactions: storage.post_reactions,
                comment_reactions: storage.comment_reactions,
            };
            let password_hasher: Arc<dyn PasswordHasher> =
                Arc::new(BcryptPasswordHasher::new(hasher_cost));
            Ok((repositories, password_hasher))
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        return;
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load()?;
    info!(backend = ?config.database.backend, "configuration loaded");

    let (repos, password_hasher) = open_storage(&config).await?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let auth = Arc::new(
        AuthService::new(AuthServiceDependencies {
            user_repository: repos.users.clone(),
            session_repository: repos.sessions.clone(),
            password_hasher,
            clock: clock.clone(),
        })
        .with_session_ttl(time::Duration::hours(config.session.ttl_hours)),
    );

    let reactions = Arc::new(ReactionService::new(ReactionServiceDependencies {
        user_repository: repos.users.clone(),
        post_repository: repos.posts.clone(),
        comment_repository: repos.comments.clone(),
        post_reactions: repos.post_reactions.clone(),
        comment_reactions: repos.comment_reactions.clone(),
        clock: clock.clone(),
    })?);

    let post_limiter = Arc::new(ActionRateLimiter::new(
        config.rate_limit.post_cooldown(),
        clock.clone(),
    ));
    let comment_limiter = Arc::new(ActionRateLimiter::new(
        config.rate_limit.comment_cooldown(),
        clock.clone(),
    ));

    let posts = Arc::new(
        PostService::new(PostServiceDependencies {
            auth: auth.clone(),
            reactions: reactions.clone(),
            user_repository: repos.users.clone(),
            category_repository: repos.categories.clone(),
            post_repository: repos.posts.clone(),
            comment_repository: repos.comments.clone(),
            rate_limiter: post_limiter.clone(),
            clock: clock.clone(),
        })
        .with_max_content_length(config.forum.max_post_length),
    );

    let comments = Arc::new(
        CommentService::new(CommentServiceDependencies {
            auth: auth.clone(),
            post_repository: repos.posts.clone(),
            comment_repository: repos.comments.clone(),
            rate_limiter: comment_limiter.clone(),
            clock: clock.clone(),
        })
        .with_max_content_length(config.forum.max_comment_length),
    );

    let categories = Arc::new(CategoryService::new(CategoryServiceDependencies {
        category_repository: repos.categories.clone(),
        clock: clock.clone(),
    }));
    let seeded = categories
        .seed_defaults(&config.forum.default_categories)
        .await?;
    info!(seeded, "default categories ready");

    let cleanup = spawn_session_cleanup(
        auth.clone(),
        vec![post_limiter, comment_limiter],
        config.session.cleanup_interval(),
    );

    let state = AppState::new(auth, reactions, posts, comments, categories)
        .with_secure_cookie(config.session.secure_cookie);

    // 启动 Web 服务器
    let app = router(state);
    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(%address, "forum server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cleanup.abort();
    info!("forum server stopped");
    Ok(())
}
