use crate::value_objects::{CategoryId, PostId, Timestamp, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub author_id: UserId,
    pub content: String,
    /// 至少一个分类，已去重
    pub category_ids: Vec<CategoryId>,
    pub created_at: Timestamp,
}

impl Post {
    pub fn new(
        id: PostId,
        author_id: UserId,
        content: impl Into<String>,
        category_ids: Vec<CategoryId>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            author_id,
            content: content.into(),
            category_ids,
            created_at,
        }
    }
}

/// 帖子列表过滤条件，所有条件为 AND 关系
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub category_id: Option<CategoryId>,
    pub author_id: Option<UserId>,
    /// 仅限这些帖子（例如“我点赞过的帖子”）
    pub only_ids: Option<Vec<PostId>>,
}

impl PostFilter {
    pub fn matches(&self, post: &Post) -> bool {
        if let Some(category_id) = self.category_id {
            if !post.category_ids.contains(&category_id) {
                return false;
            }
        }
        if let Some(author_id) = self.author_id {
            if post.author_id != author_id {
                return false;
            }
        }
        if let Some(ids) = &self.only_ids {
            if !ids.contains(&post.id) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    #[test]
    fn filter_conditions_are_combined() {
        let author = UserId::generate();
        let category = CategoryId::generate();
        let post = Post::new(
            PostId::generate(),
            author,
            "hello",
            vec![category],
            OffsetDateTime::now_utc(),
        );

        assert!(PostFilter::default().matches(&post));
        assert!(PostFilter {
            category_id: Some(category),
            author_id: Some(author),
            only_ids: Some(vec![post.id]),
        }
        .matches(&post));
        assert!(!PostFilter {
            category_id: Some(CategoryId::generate()),
            ..PostFilter::default()
        }
        .matches(&post));
        assert!(!PostFilter {
            only_ids: Some(Vec::new()),
            ..PostFilter::default()
        }
        .matches(&post));
    }
}
