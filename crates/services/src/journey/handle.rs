use std::sync::{Arc, Mutex, PoisonError};

use journey_core::model::{JourneyProgress, Stage};
use tokio::sync::{Mutex as AsyncMutex, MutexGuard as AsyncMutexGuard};

/// Shared handle to one user's journey.
///
/// Progress sits behind a blocking mutex that is only held for short,
/// synchronous reads and writes. Each stage also has an async gate so that
/// two submissions for the same stage run one after the other.
#[derive(Clone)]
pub struct JourneyHandle {
    inner: Arc<Inner>,
}

struct Inner {
    progress: Mutex<JourneyProgress>,
    gates: [AsyncMutex<()>; Stage::ALL.len()],
}

impl JourneyHandle {
    #[must_use]
    pub fn new(progress: JourneyProgress) -> Self {
        Self {
            inner: Arc::new(Inner {
                progress: Mutex::new(progress),
                gates: std::array::from_fn(|_| AsyncMutex::new(())),
            }),
        }
    }

    /// Copy of the current progress.
    #[must_use]
    pub fn snapshot(&self) -> JourneyProgress {
        self.read(Clone::clone)
    }

    pub fn read<T>(&self, f: impl FnOnce(&JourneyProgress) -> T) -> T {
        let guard = self
            .inner
            .progress
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    pub fn update<T>(&self, f: impl FnOnce(&mut JourneyProgress) -> T) -> T {
        let mut guard = self
            .inner
            .progress
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Wait for exclusive use of `stage`.
    pub async fn lock_stage(&self, stage: Stage) -> AsyncMutexGuard<'_, ()> {
        self.inner.gates[stage.position() - 1].lock().await
    }
}

impl Default for JourneyHandle {
    fn default() -> Self {
        Self::new(JourneyProgress::new())
    }
}

impl std::fmt::Debug for JourneyHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JourneyHandle")
            .field("progress", &self.snapshot())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use journey_core::model::AnswerSet;
    use journey_core::time::fixed_now;

    #[tokio::test]
    async fn clones_share_progress() {
        let handle = JourneyHandle::default();
        let other = handle.clone();

        other
            .update(|p| {
                p.record_draft(
                    Stage::Observe,
                    AnswerSet::new().with("observe-q1", "Queues"),
                    fixed_now(),
                )
            })
            .unwrap();

        assert!(handle.read(|p| p.submission(Stage::Observe).is_some()));
    }

    #[tokio::test]
    async fn stage_gates_are_independent() {
        let handle = JourneyHandle::default();
        let _define = handle.lock_stage(Stage::Define).await;

        let ideate =
            tokio::time::timeout(Duration::from_millis(50), handle.lock_stage(Stage::Ideate)).await;
        assert!(ideate.is_ok());

        let define_again =
            tokio::time::timeout(Duration::from_millis(50), handle.lock_stage(Stage::Define)).await;
        assert!(define_again.is_err());
    }
}
