use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use domain::{Timestamp, UserId};

use crate::clock::Clock;

/// 按用户的冷却限流器
///
/// 进程内、尽力而为：只记录每个用户最后一次被接受的动作时间。
/// 发帖与评论各持有一个独立实例，互不共享状态。
pub struct ActionRateLimiter {
    /// 冷却窗口
    cooldown: time::Duration,
    clock: Arc<dyn Clock>,
    /// 用户最后一次动作时间
    last_actions: RwLock<HashMap<UserId, Timestamp>>,
}

impl ActionRateLimiter {
    pub fn new(cooldown: Duration, clock: Arc<dyn Clock>) -> Self {
        let cooldown = time::Duration::try_from(cooldown).unwrap_or(time::Duration::MAX);
        Self {
            cooldown,
            clock,
            last_actions: RwLock::new(HashMap::new()),
        }
    }

    /// 只读检查，不修改状态
    pub fn can_act(&self, user_id: UserId) -> bool {
        let now = self.clock.now();
        let last_actions = self
            .last_actions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        match last_actions.get(&user_id) {
            None => true,
            Some(last) => now - *last > self.cooldown,
        }
    }

    /// 动作成功后调用；失败的动作不应消耗冷却窗口
    pub fn record_action(&self, user_id: UserId) {
        let now = self.clock.now();
        let mut last_actions = self
            .last_actions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        last_actions.insert(user_id, now);
    }

    /// 距离下次允许动作还需等待的整秒数（向上取整），可以动作时为 `None`
    pub fn retry_after(&self, user_id: UserId) -> Option<u64> {
        let now = self.clock.now();
        let last_actions = self
            .last_actions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let last = last_actions.get(&user_id)?;
        let elapsed = now - *last;
        if elapsed > self.cooldown {
            return None;
        }

        let remaining = self.cooldown - elapsed;
        let mut secs = remaining.whole_seconds().max(0) as u64;
        if remaining.subsec_nanoseconds() > 0 {
            secs += 1;
        }
        // 恰好到达窗口边界时仍被限流，至少等待 1 秒
        Some(secs.max(1))
    }

    /// 清理已经过了冷却窗口的记录，返回清理条数
    pub fn purge_stale(&self) -> usize {
        let now = self.clock.now();
        let mut last_actions = self
            .last_actions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let before = last_actions.len();
        let cooldown = self.cooldown;
        last_actions.retain(|_, last| now - *last <= cooldown);
        before - last_actions.len()
    }

    pub fn cooldown(&self) -> time::Duration {
        self.cooldown
    }
}
