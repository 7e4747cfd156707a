//! 成绩记录锁表
//!
//! 每个 (学生, 课程) 对应一把异步互斥锁。同一记录的读-改-写串行执行，
//! 不同记录之间互不阻塞。

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

type RecordKey = (i64, i64);

#[derive(Default)]
pub struct RecordLocks {
    /// (学生 ID, 课程 ID) -> 记录锁
    locks: DashMap<RecordKey, Arc<Mutex<()>>>,
}

impl RecordLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取记录锁，持有返回的守卫期间独占该记录
    pub async fn acquire(&self, student_id: i64, course_id: i64) -> OwnedMutexGuard<()> {
        // 先克隆出 Arc，避免在 await 期间持有 DashMap 分片锁
        let lock = self
            .locks
            .entry((student_id, course_id))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        debug!(
            "Acquiring grade record lock for student {} in course {}",
            student_id, course_id
        );
        lock.lock_owned().await
    }

    /// 已分配的锁数量
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_record_is_exclusive() {
        let locks = RecordLocks::new();
        let guard = locks.acquire(100, 10).await;

        let blocked = tokio::time::timeout(Duration::from_millis(50), locks.acquire(100, 10)).await;
        assert!(blocked.is_err());

        drop(guard);
        let reacquired =
            tokio::time::timeout(Duration::from_millis(50), locks.acquire(100, 10)).await;
        assert!(reacquired.is_ok());
    }

    #[tokio::test]
    async fn test_different_records_do_not_block() {
        let locks = RecordLocks::new();
        let _first = locks.acquire(100, 10).await;

        let other = tokio::time::timeout(Duration::from_millis(50), locks.acquire(101, 10)).await;
        assert!(other.is_ok());
        assert_eq!(locks.len(), 2);
    }
}
