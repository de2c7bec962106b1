//! 点赞/点踩
//!
//! 每个 (用户, 目标) 最多一行记录；没有记录即为中立状态。
//! 计数永远由记录行推导，不单独维护计数器。

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value_objects::{CommentId, PostId, ReactionId, Timestamp, UserId};

/// 反应极性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Like,
    Dislike,
}

impl Polarity {
    pub fn from_is_like(is_like: bool) -> Self {
        if is_like {
            Polarity::Like
        } else {
            Polarity::Dislike
        }
    }

    pub fn is_like(self) -> bool {
        matches!(self, Polarity::Like)
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarity::Like => f.write_str("like"),
            Polarity::Dislike => f.write_str("dislike"),
        }
    }
}

/// 可被点赞的实体种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    Post,
    Comment,
}

impl fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReactionKind::Post => f.write_str("post"),
            ReactionKind::Comment => f.write_str("comment"),
        }
    }
}

/// 反应目标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReactionTarget {
    Post(PostId),
    Comment(CommentId),
}

impl ReactionTarget {
    pub fn kind(self) -> ReactionKind {
        match self {
            ReactionTarget::Post(_) => ReactionKind::Post,
            ReactionTarget::Comment(_) => ReactionKind::Comment,
        }
    }

    pub fn raw_id(self) -> uuid::Uuid {
        match self {
            ReactionTarget::Post(id) => id.0,
            ReactionTarget::Comment(id) => id.0,
        }
    }

    pub fn from_raw(kind: ReactionKind, id: uuid::Uuid) -> Self {
        match kind {
            ReactionKind::Post => ReactionTarget::Post(PostId::from(id)),
            ReactionKind::Comment => ReactionTarget::Comment(CommentId::from(id)),
        }
    }
}

impl fmt::Display for ReactionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.raw_id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub id: ReactionId,
    pub user_id: UserId,
    pub target: ReactionTarget,
    pub polarity: Polarity,
    /// 最后一次变更时间
    pub updated_at: Timestamp,
}

impl Reaction {
    pub fn new(user_id: UserId, target: ReactionTarget, polarity: Polarity, now: Timestamp) -> Self {
        Self {
            id: ReactionId::generate(),
            user_id,
            target,
            polarity,
            updated_at: now,
        }
    }

    pub fn flip(&mut self, polarity: Polarity, now: Timestamp) {
        self.polarity = polarity;
        self.updated_at = now;
    }
}

/// 切换决策
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleAction {
    /// 无记录，新建
    Create,
    /// 重复相同极性，删除
    Remove,
    /// 极性翻转，原地更新
    Flip,
}

impl ToggleAction {
    pub fn decide(existing: Option<Polarity>, desired: Polarity) -> Self {
        match existing {
            None => ToggleAction::Create,
            Some(current) if current == desired => ToggleAction::Remove,
            Some(_) => ToggleAction::Flip,
        }
    }
}

/// 一次切换的结果。`Removed` 携带被删除的记录，供调用方反馈界面。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactionChange {
    Created(Reaction),
    Removed(Reaction),
    Flipped(Reaction),
}

impl ReactionChange {
    pub fn action(&self) -> ToggleAction {
        match self {
            ReactionChange::Created(_) => ToggleAction::Create,
            ReactionChange::Removed(_) => ToggleAction::Remove,
            ReactionChange::Flipped(_) => ToggleAction::Flip,
        }
    }

    pub fn reaction(&self) -> &Reaction {
        match self {
            ReactionChange::Created(r) | ReactionChange::Removed(r) | ReactionChange::Flipped(r) => r,
        }
    }

    /// 切换后用户持有的极性
    pub fn resulting_polarity(&self) -> Option<Polarity> {
        match self {
            ReactionChange::Removed(_) => None,
            ReactionChange::Created(r) | ReactionChange::Flipped(r) => Some(r.polarity),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReactionCounts {
    pub likes: u64,
    pub dislikes: u64,
}
