use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Fixed-interval poller with explicit jitter. The task is aborted when the
/// handle is dropped, so a poller tied to a view's lifetime cannot write
/// into it after the view is gone.
pub struct Poller {
    handle: JoinHandle<()>,
}

impl Poller {
    pub fn spawn<F, Fut>(interval: Duration, jitter: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval + jitter_within(jitter)).await;
                tick().await;
            }
        });
        Self { handle }
    }

    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn jitter_within(max: Duration) -> Duration {
    if max.is_zero() {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::thread_rng().gen_range(0..=max.as_millis() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn ticks_on_interval_and_stops_on_drop() {
        let ticks = Arc::new(AtomicU32::new(0));
        let counter = ticks.clone();
        let poller = Poller::spawn(Duration::from_secs(30), Duration::ZERO, move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        // Let the task register its first sleep before moving the clock.
        tokio::task::yield_now().await;

        for expected in 1..=3 {
            tokio::time::advance(Duration::from_secs(31)).await;
            tokio::task::yield_now().await;
            assert_eq!(ticks.load(Ordering::SeqCst), expected);
        }

        drop(poller);
        tokio::time::advance(Duration::from_secs(120)).await;
        tokio::task::yield_now().await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
    }
}
