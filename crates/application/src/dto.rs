use domain::{
    Category, Polarity, ReactionChange, ReactionCounts, Timestamp, ToggleAction, User,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::{CommentView, PostDetail, PostSummary};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDto {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: Timestamp,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: Uuid::from(user.id),
            username: user.username.as_str().to_owned(),
            email: user.email.as_str().to_owned(),
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDto {
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDto {
    pub id: Uuid,
    pub name: String,
}

impl From<&Category> for CategoryDto {
    fn from(category: &Category) -> Self {
        Self {
            id: Uuid::from(category.id),
            name: category.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDto {
    pub id: Uuid,
    pub author_id: Uuid,
    pub author: String,
    pub content: String,
    pub category_ids: Vec<Uuid>,
    pub categories: Vec<String>,
    pub likes: u64,
    pub dislikes: u64,
    pub comment_count: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: Timestamp,
}

impl From<&PostSummary> for PostDto {
    fn from(summary: &PostSummary) -> Self {
        Self {
            id: Uuid::from(summary.post.id),
            author_id: Uuid::from(summary.post.author_id),
            author: summary.author.clone(),
            content: summary.post.content.clone(),
            category_ids: summary
                .post
                .category_ids
                .iter()
                .copied()
                .map(Uuid::from)
                .collect(),
            categories: summary.categories.clone(),
            likes: summary.reactions.likes,
            dislikes: summary.reactions.dislikes,
            comment_count: summary.comment_count,
            created_at: summary.post.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentDto {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub author: String,
    pub content: String,
    pub likes: u64,
    pub dislikes: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: Timestamp,
}

impl From<&CommentView> for CommentDto {
    fn from(view: &CommentView) -> Self {
        Self {
            id: Uuid::from(view.comment.id),
            post_id: Uuid::from(view.comment.post_id),
            author_id: Uuid::from(view.comment.author_id),
            author: view.author.clone(),
            content: view.comment.content.clone(),
            likes: view.reactions.likes,
            dislikes: view.reactions.dislikes,
            created_at: view.comment.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetailDto {
    #[serde(flatten)]
    pub post: PostDto,
    pub comments: Vec<CommentDto>,
}

impl From<&PostDetail> for PostDetailDto {
    fn from(detail: &PostDetail) -> Self {
        Self {
            post: PostDto::from(&detail.summary),
            comments: detail.comments.iter().map(CommentDto::from).collect(),
        }
    }
}

/// 一次点赞切换的结果与最新计数
#[derive(Debug, Clone, Serialize)]
pub struct ReactionDto {
    pub action: ToggleAction,
    /// 切换后用户持有的极性，`None` 表示中立
    pub reaction: Option<Polarity>,
    pub likes: u64,
    pub dislikes: u64,
}

impl ReactionDto {
    pub fn new(change: &ReactionChange, counts: ReactionCounts) -> Self {
        Self {
            action: change.action(),
            reaction: change.resulting_polarity(),
            likes: counts.likes,
            dislikes: counts.dislikes,
        }
    }
}
