use crate::value_objects::{CommentId, PostId, Timestamp, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub author_id: UserId,
    pub content: String,
    pub created_at: Timestamp,
}

impl Comment {
    pub fn new(
        id: CommentId,
        post_id: PostId,
        author_id: UserId,
        content: impl Into<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            post_id,
            author_id,
            content: content.into(),
            created_at,
        }
    }
}
