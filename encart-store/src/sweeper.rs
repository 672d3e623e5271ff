use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::ttl_cache::Sweepable;

/// Periodic expiry sweeps, one independent timer per cache.
///
/// Owned by the process lifecycle: `start` spawns the timers, `stop` (or drop)
/// aborts them.
pub struct CacheSweeper {
    handles: Vec<JoinHandle<()>>,
}

impl CacheSweeper {
    pub fn start(caches: Vec<Arc<dyn Sweepable>>, every: Duration) -> Self {
        let handles = caches
            .into_iter()
            .map(|cache| tokio::spawn(run_sweep_loop(cache, every)))
            .collect::<Vec<_>>();

        info!("Cache sweeper started for {} caches every {}s", handles.len(), every.as_secs());
        Self { handles }
    }

    pub fn stop(&mut self) {
        if self.handles.is_empty() {
            return;
        }
        for handle in self.handles.drain(..) {
            handle.abort();
        }
        info!("Cache sweeper stopped");
    }

    pub fn is_running(&self) -> bool {
        self.handles.iter().any(|h| !h.is_finished())
    }
}

impl Drop for CacheSweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_sweep_loop(cache: Arc<dyn Sweepable>, every: Duration) {
    // First tick one full period after start.
    let mut ticker = interval_at(Instant::now() + every, every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let removed = cache.sweep();
        debug!(cache = cache.name(), removed, "periodic sweep");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ttl_cache::TtlCache;
    use chrono::{TimeZone, Utc};
    use encart_shared::ManualClock;

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_evicts_unread_entries() {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap()));
        let cache = Arc::new(TtlCache::<u32>::new("search", Duration::from_secs(5), clock.clone()));
        cache.set("stale", 1, None);

        let mut sweeper = CacheSweeper::start(vec![cache.clone() as Arc<dyn Sweepable>], Duration::from_secs(60));

        clock.advance(chrono::Duration::seconds(10));
        assert_eq!(cache.len(), 1);

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(cache.len(), 0);

        sweeper.stop();
        assert!(sweeper.handles.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_sweeper_leaves_entries() {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap()));
        let cache = Arc::new(TtlCache::<u32>::new("entity", Duration::from_secs(5), clock.clone()));
        cache.set("stale", 1, None);

        let mut sweeper = CacheSweeper::start(vec![cache.clone() as Arc<dyn Sweepable>], Duration::from_secs(60));
        sweeper.stop();

        clock.advance(chrono::Duration::seconds(10));
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(cache.len(), 1);
    }
}
