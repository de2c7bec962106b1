use std::sync::Arc;

use domain::{
    CommentRepository, Polarity, PostId, PostRepository, Reaction, ReactionChange,
    ReactionCounts, ReactionKind, ReactionRepository, ReactionTarget, ToggleAction, UserId,
    UserRepository,
};
use tracing::debug;

use crate::{clock::Clock, error::ApplicationError, keyed_mutex::KeyedMutex};

pub struct ReactionServiceDependencies {
    pub user_repository: Arc<dyn UserRepository>,
    pub post_repository: Arc<dyn PostRepository>,
    pub comment_repository: Arc<dyn CommentRepository>,
    pub post_reactions: Arc<dyn ReactionRepository>,
    pub comment_reactions: Arc<dyn ReactionRepository>,
    pub clock: Arc<dyn Clock>,
}

/// 点赞/点踩切换
///
/// 同一 (用户, 目标) 的 读取-决策-写入 在进程内串行执行；
/// 不同目标之间没有约束。计数每次从记录行统计。
pub struct ReactionService {
    deps: ReactionServiceDependencies,
    locks: KeyedMutex<(UserId, ReactionTarget)>,
}

impl ReactionService {
    pub fn new(deps: ReactionServiceDependencies) -> Result<Self, ApplicationError> {
        if deps.post_reactions.kind() != ReactionKind::Post
            || deps.comment_reactions.kind() != ReactionKind::Comment
        {
            return Err(ApplicationError::validation(
                "reaction_store",
                "post and comment reaction stores are swapped",
            ));
        }
        Ok(Self {
            deps,
            locks: KeyedMutex::new(),
        })
    }

    fn store_for(&self, target: ReactionTarget) -> &Arc<dyn ReactionRepository> {
        match target.kind() {
            ReactionKind::Post => &self.deps.post_reactions,
            ReactionKind::Comment => &self.deps.comment_reactions,
        }
    }

    async fn ensure_target_exists(&self, target: ReactionTarget) -> Result<(), ApplicationError> {
        let exists = match target {
            ReactionTarget::Post(id) => self.deps.post_repository.find_by_id(id).await?.is_some(),
            ReactionTarget::Comment(id) => self
                .deps
                .comment_repository
                .find_by_id(id)
                .await?
                .is_some(),
        };
        if !exists {
            return Err(ApplicationError::NotFound(match target.kind() {
                ReactionKind::Post => "post",
                ReactionKind::Comment => "comment",
            }));
        }
        Ok(())
    }

    /// 按决策表切换反应状态
    ///
    /// `Removed` 携带被删除的记录。
    pub async fn react(
        &self,
        user_id: UserId,
        target: ReactionTarget,
        desired: Polarity,
    ) -> Result<ReactionChange, ApplicationError> {
        if self.deps.user_repository.find_by_id(user_id).await?.is_none() {
            return Err(ApplicationError::NotFound("user"));
        }
        self.ensure_target_exists(target).await?;

        let store = self.store_for(target);
        let _guard = self.locks.lock((user_id, target)).await;

        let existing = store.find_by_user_and_target(user_id, target).await?;
        let action = ToggleAction::decide(existing.as_ref().map(|r| r.polarity), desired);
        let now = self.deps.clock.now();

        let change = match (action, existing) {
            (ToggleAction::Remove, Some(reaction)) => {
                store.delete(reaction.id).await?;
                ReactionChange::Removed(reaction)
            }
            (ToggleAction::Flip, Some(mut reaction)) => {
                reaction.flip(desired, now);
                ReactionChange::Flipped(store.update(reaction).await?)
            }
            _ => {
                let reaction = Reaction::new(user_id, target, desired, now);
                ReactionChange::Created(store.create(reaction).await?)
            }
        };

        debug!(
            user_id = %user_id,
            target = %target,
            action = ?change.action(),
            "reaction toggled"
        );
        Ok(change)
    }

    pub async fn counts(&self, target: ReactionTarget) -> Result<ReactionCounts, ApplicationError> {
        let store = self.store_for(target);
        let likes = store.count_by_target(target, Polarity::Like).await?;
        let dislikes = store.count_by_target(target, Polarity::Dislike).await?;
        Ok(ReactionCounts { likes, dislikes })
    }

    /// 用户点过赞的帖子
    pub async fn liked_posts(&self, user_id: UserId) -> Result<Vec<PostId>, ApplicationError> {
        let targets = self
            .deps
            .post_reactions
            .list_targets_by_user(user_id, Polarity::Like)
            .await?;
        Ok(targets
            .into_iter()
            .filter_map(|target| match target {
                ReactionTarget::Post(id) => Some(id),
                ReactionTarget::Comment(_) => None,
            })
            .collect())
    }
}
