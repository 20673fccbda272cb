//! Periodic resume.

use resumable_rs::Resumer;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Spawns a task that calls [`Resumer::resume`] once per `period`.
///
/// The first resume happens one full period after spawning. The task ends
/// on its own at the first tick after the subscriber behind `resumer`
/// terminated, whether the stream completed, the
/// [`ResumableHandle`](resumable_rs::ResumableHandle) was cancelled or it
/// was dropped. Abort the returned handle to stop it earlier.
///
/// Missed ticks are skipped rather than bunched up, so a slow runtime never
/// turns into a burst of resumes.
///
/// # Panics
///
/// Panics if `period` is zero, or when called outside a tokio runtime.
pub fn spawn_resume_ticker(resumer: Resumer, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticks = interval_at(Instant::now() + period, period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut resumes = 0u64;
        loop {
            ticks.tick().await;
            if resumer.is_terminated() || !resumer.resume() {
                tracing::debug!(resumes, "resume ticker stopped, subscriber terminated");
                return;
            }
            resumes += 1;
        }
    })
}
