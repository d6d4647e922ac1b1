//! Keeps a periodic task from overlapping with its previous run.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared flag telling whether a run of a task is in progress.
#[derive(Debug, Clone, Default)]
pub struct RunGuard {
    running: Arc<AtomicBool>,
}

/// Held for the duration of a run; releases the guard when dropped, so a
/// panicking or failing run does not block the next tick.
#[derive(Debug)]
pub struct RunPermit {
    running: Arc<AtomicBool>,
}

impl RunGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `None` while another run still holds its permit.
    pub fn try_begin(&self) -> Option<RunPermit> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunPermit {
                running: Arc::clone(&self.running),
            })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

impl Drop for RunPermit {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_run_is_refused_until_first_finishes() {
        let guard = RunGuard::new();

        let permit = guard.try_begin().expect("first run starts");
        assert!(guard.is_running());
        assert!(guard.try_begin().is_none());
        assert!(guard.clone().try_begin().is_none());

        drop(permit);
        assert!(!guard.is_running());
        assert!(guard.try_begin().is_some());
    }

    #[tokio::test]
    async fn test_permit_released_when_task_panics() {
        let guard = RunGuard::new();
        let shared = guard.clone();

        let result = tokio::spawn(async move {
            let _permit = shared.try_begin();
            panic!("run failed");
        })
        .await;

        assert!(result.is_err());
        assert!(!guard.is_running());
    }
}
