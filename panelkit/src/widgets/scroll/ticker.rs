//! Frame tickers driving scroll physics.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use super::ScrollController;

/// Spawns a task running `frame` every `period` until it returns `false`.
pub(crate) fn spawn_frame_loop(
    period: Duration,
    mut frame: impl FnMut() -> bool + Send + 'static,
) -> JoinHandle<()> {
    let period = period.max(Duration::from_millis(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if !frame() {
                break;
            }
        }
    })
}

impl ScrollController {
    /// Time between two physics frames.
    pub fn frame_interval(&self) -> Duration {
        self.inner.read().map(|g| g.config.frame_interval).unwrap_or_default()
    }

    /// Spawns a task calling [`tick`](Self::tick) every frame interval.
    ///
    /// The task holds only a weak reference and ends once every clone of
    /// the controller is dropped. Must be called within a tokio runtime.
    /// Surfaces that react to frames themselves (a grid following a resize
    /// drag) spawn their own ticker instead.
    pub fn spawn_ticker(&self) -> JoinHandle<()> {
        let inner = Arc::downgrade(&self.inner);
        let dirty = Arc::clone(&self.dirty);
        let id = self.id;
        spawn_frame_loop(self.frame_interval(), move || {
            let Some(inner) = inner.upgrade() else {
                log::debug!("{id}: controller dropped, ticker stopped");
                return false;
            };
            let moved = inner.write().map(|mut g| g.tick()).unwrap_or(false);
            if moved {
                dirty.store(true, std::sync::atomic::Ordering::SeqCst);
            }
            true
        })
    }
}
