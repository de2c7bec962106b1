use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use application::{
    CategoryDto, CommentDto, CreatePostRequest, LoginRequest, PostDetailDto, PostDto, PostQuery,
    ReactionDto, RegisterUserRequest, SessionDto, UserDto,
};
use domain::{CategoryId, CommentId, Polarity, PostId, ReactionTarget};

use crate::{
    auth::{removal_cookie, session_cookie, session_token, CurrentUser},
    error::ApiError,
    state::AppState,
};

#[derive(Debug, Deserialize)]
struct RegisterPayload {
    username: String,
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct LoginPayload {
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct CreatePostPayload {
    content: String,
    #[serde(default)]
    categories: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
struct CreateCommentPayload {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ReactionPayload {
    reaction: Polarity,
}

/// `category` 可以是分类 id 或分类名
#[derive(Debug, Deserialize)]
struct FeedQuery {
    category: Option<String>,
    #[serde(default)]
    mine: bool,
    #[serde(default)]
    liked: bool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register_user))
        .route("/auth/login", post(login_user))
        .route("/auth/logout", post(logout))
        .route("/auth/logout-all", post(logout_all))
        .route("/auth/refresh", post(refresh_session))
        .route("/auth/me", get(current_user))
        .route("/categories", get(list_categories))
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/{post_id}", get(get_post))
        .route("/posts/{post_id}/comments", post(create_comment))
        .route("/posts/{post_id}/reactions", post(react_to_post))
        .route("/comments/{comment_id}/reactions", post(react_to_comment))
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<(StatusCode, Json<UserDto>), ApiError> {
    let user = state
        .auth
        .register(RegisterUserRequest {
            username: payload.username,
            email: payload.email,
            password: payload.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserDto::from(&user))))
}

async fn login_user(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginPayload>,
) -> Result<(CookieJar, Json<UserDto>), ApiError> {
    let authenticated = state
        .auth
        .login(LoginRequest {
            email: payload.email,
            password: payload.password,
        })
        .await?;

    let jar = jar.add(session_cookie(
        &authenticated.session.token,
        state.auth.session_ttl(),
        state.secure_cookie,
    ));
    Ok((jar, Json(UserDto::from(&authenticated.user))))
}

/// 没有 cookie 也返回成功
async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), ApiError> {
    if let Some(token) = session_token(&jar) {
        state.auth.logout_by_token(&token).await?;
    }

    let jar = jar.add(removal_cookie(state.secure_cookie));
    Ok((jar, StatusCode::NO_CONTENT))
}

async fn logout_all(
    State(state): State<AppState>,
    jar: CookieJar,
    current: CurrentUser,
) -> Result<(CookieJar, StatusCode), ApiError> {
    state.auth.logout(current.user.id).await?;

    let jar = jar.add(removal_cookie(state.secure_cookie));
    Ok((jar, StatusCode::NO_CONTENT))
}

async fn refresh_session(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<SessionDto>), ApiError> {
    let token = session_token(&jar).ok_or_else(|| ApiError::unauthorized("login required"))?;
    let session = state.auth.refresh_session(&token).await?;

    let jar = jar.add(session_cookie(
        &session.token,
        state.auth.session_ttl(),
        state.secure_cookie,
    ));
    Ok((
        jar,
        Json(SessionDto {
            expires_at: session.expires_at,
        }),
    ))
}

async fn current_user(current: CurrentUser) -> Json<UserDto> {
    Json(UserDto::from(&current.user))
}

async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryDto>>, ApiError> {
    let categories = state.categories.list().await?;
    Ok(Json(categories.iter().map(CategoryDto::from).collect()))
}

async fn list_posts(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(feed): Query<FeedQuery>,
) -> Result<Json<Vec<PostDto>>, ApiError> {
    let mut query = PostQuery::default();

    if let Some(category) = feed.category.as_deref().filter(|c| !c.trim().is_empty()) {
        query.category_id = Some(state.categories.resolve(category).await?.id);
    }

    if feed.mine || feed.liked {
        let current = CurrentUser::from_jar(&state, &jar)
            .await?
            .ok_or_else(|| ApiError::unauthorized("login required"))?;
        if feed.mine {
            query.author_id = Some(current.user.id);
        }
        if feed.liked {
            query.liked_by = Some(current.user.id);
        }
    }

    let posts = state.posts.list_posts(query).await?;
    Ok(Json(posts.iter().map(PostDto::from).collect()))
}

async fn create_post(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<CreatePostPayload>,
) -> Result<(StatusCode, Json<PostDetailDto>), ApiError> {
    let post = state
        .posts
        .create_post(
            &current.session.token,
            CreatePostRequest {
                content: payload.content,
                category_ids: payload.categories.into_iter().map(CategoryId::new).collect(),
            },
        )
        .await?;

    let detail = state.posts.get_post(post.id).await?;
    Ok((StatusCode::CREATED, Json(PostDetailDto::from(&detail))))
}

async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<PostDetailDto>, ApiError> {
    let detail = state.posts.get_post(PostId::new(post_id)).await?;
    Ok(Json(PostDetailDto::from(&detail)))
}

async fn create_comment(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(post_id): Path<Uuid>,
    Json(payload): Json<CreateCommentPayload>,
) -> Result<(StatusCode, Json<CommentDto>), ApiError> {
    let comment = state
        .comments
        .create_comment(&current.session.token, PostId::new(post_id), &payload.content)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CommentDto {
            id: Uuid::from(comment.id),
            post_id: Uuid::from(comment.post_id),
            author_id: Uuid::from(comment.author_id),
            author: current.user.username.as_str().to_owned(),
            content: comment.content,
            likes: 0,
            dislikes: 0,
            created_at: comment.created_at,
        }),
    ))
}

async fn react_to_post(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(post_id): Path<Uuid>,
    Json(payload): Json<ReactionPayload>,
) -> Result<Json<ReactionDto>, ApiError> {
    react(
        &state,
        &current,
        ReactionTarget::Post(PostId::new(post_id)),
        payload.reaction,
    )
    .await
}

async fn react_to_comment(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(comment_id): Path<Uuid>,
    Json(payload): Json<ReactionPayload>,
) -> Result<Json<ReactionDto>, ApiError> {
    react(
        &state,
        &current,
        ReactionTarget::Comment(CommentId::new(comment_id)),
        payload.reaction,
    )
    .await
}

async fn react(
    state: &AppState,
    current: &CurrentUser,
    target: ReactionTarget,
    desired: Polarity,
) -> Result<Json<ReactionDto>, ApiError> {
    let change = state
        .reactions
        .react(current.user.id, target, desired)
        .await?;
    let counts = state.reactions.counts(target).await?;

    Ok(Json(ReactionDto::new(&change, counts)))
}
