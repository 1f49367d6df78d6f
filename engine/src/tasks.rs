//! Table of every background loop owned by a session.
//!
//! Loops exit on their own when the hero is stopped; the table lets the
//! session wait for them before re-arming, and abort stragglers on drop.

use std::future::Future;
use std::sync::Mutex;

use log::{debug, warn};
use tokio::task::JoinHandle;

use crate::sync_list::lock;

/// What a background loop is driving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Movement(u64),
    Weapon(u64),
}

#[derive(Debug, Default)]
pub struct TaskTable {
    handles: Mutex<Vec<(TaskKind, JoinHandle<()>)>>,
}

impl TaskTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `future` on the runtime and track its handle
    pub fn spawn<F>(&self, kind: TaskKind, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(future);
        let mut handles = lock(&self.handles);
        handles.retain(|(_, handle)| !handle.is_finished());
        handles.push((kind, handle));
    }

    /// Loops still running
    pub fn active_count(&self) -> usize {
        lock(&self.handles).iter().filter(|(_, handle)| !handle.is_finished()).count()
    }

    pub fn count_where<F>(&self, predicate: F) -> usize
    where
        F: Fn(&TaskKind) -> bool,
    {
        lock(&self.handles)
            .iter()
            .filter(|(kind, handle)| !handle.is_finished() && predicate(kind))
            .count()
    }

    /// Wait for every tracked loop to exit. Loops spawned while waiting
    /// are awaited as well.
    pub async fn join_all(&self) {
        loop {
            let drained: Vec<(TaskKind, JoinHandle<()>)> = std::mem::take(&mut *lock(&self.handles));
            if drained.is_empty() {
                return;
            }

            let (kinds, handles): (Vec<TaskKind>, Vec<JoinHandle<()>>) = drained.into_iter().unzip();
            debug!("Joining {} background loops", handles.len());

            for (kind, result) in kinds.iter().zip(futures::future::join_all(handles).await) {
                if let Err(e) = result {
                    if e.is_panic() {
                        warn!("Background loop {:?} panicked: {}", kind, e);
                    }
                }
            }
        }
    }

    /// Cancel every tracked loop without waiting
    pub fn abort_all(&self) {
        for (_, handle) in lock(&self.handles).drain(..) {
            handle.abort();
        }
    }
}

impl Drop for TaskTable {
    fn drop(&mut self) {
        self.abort_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_join_all_waits_for_every_loop() {
        let table = TaskTable::new();
        let finished = Arc::new(AtomicUsize::new(0));

        for id in 0..5 {
            let finished = finished.clone();
            table.spawn(TaskKind::Movement(id), async move {
                tokio::time::sleep(Duration::from_millis(5 * id)).await;
                finished.fetch_add(1, Ordering::SeqCst);
            });
        }

        table.join_all().await;
        assert_eq!(finished.load(Ordering::SeqCst), 5);
        assert_eq!(table.active_count(), 0);
    }

    #[tokio::test]
    async fn test_panicking_loop_does_not_poison_join() {
        let table = TaskTable::new();
        table.spawn(TaskKind::Weapon(1), async {
            panic!("boom");
        });
        table.spawn(TaskKind::Weapon(2), async {});
        table.join_all().await;
        assert_eq!(table.active_count(), 0);
    }

    #[tokio::test]
    async fn test_abort_all() {
        let table = TaskTable::new();
        table.spawn(TaskKind::Weapon(1), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
        });
        assert_eq!(table.count_where(|kind| matches!(kind, TaskKind::Weapon(_))), 1);
        table.abort_all();
        table.join_all().await;
        assert_eq!(table.active_count(), 0);
    }
}
