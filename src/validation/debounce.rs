use std::{
    future::Future,
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

/// Debounces probes driven by live user input.
///
/// Each call to `run` is a new input. The probe starts only after `quiet`
/// passes with no newer input, and its result is dropped if newer input
/// arrived while it was in flight. Only the latest input can produce a
/// result.
#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    generation: AtomicU64,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Debouncer {
            quiet,
            generation: AtomicU64::new(0),
        }
    }

    /// Returns `None` when superseded by a later call, either before the
    /// probe was issued or while it was running.
    pub async fn run<T, F, Fut>(&self, probe: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        tokio::time::sleep(self.quiet).await;
        if !self.is_current(generation) {
            return None;
        }

        let result = probe().await;
        match self.is_current(generation) {
            true => Some(result),
            false => None,
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    };
    use tokio::time::{sleep, Instant};

    #[tokio::test(start_paused = true)]
    async fn waits_for_quiet_period() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let start = Instant::now();

        let result = debouncer.run(|| async { "ok" }).await;

        assert_eq!(result, Some("ok"));
        assert!(start.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_input_is_never_probed() {
        let debouncer = Arc::new(Debouncer::new(Duration::from_millis(300)));
        let probes = Arc::new(AtomicU32::new(0));

        let first = {
            let debouncer = Arc::clone(&debouncer);
            let probes = Arc::clone(&probes);
            tokio::spawn(async move {
                debouncer
                    .run(|| async move {
                        probes.fetch_add(1, Ordering::SeqCst);
                        "ali"
                    })
                    .await
            })
        };
        sleep(Duration::from_millis(100)).await;

        let second = {
            let probes = Arc::clone(&probes);
            debouncer
                .run(|| async move {
                    probes.fetch_add(1, Ordering::SeqCst);
                    "alice"
                })
                .await
        };

        assert_eq!(first.await.unwrap(), None);
        assert_eq!(second, Some("alice"));
        assert_eq!(probes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_in_flight_result_is_dropped() {
        let debouncer = Arc::new(Debouncer::new(Duration::from_millis(100)));

        let slow = {
            let debouncer = Arc::clone(&debouncer);
            tokio::spawn(async move {
                debouncer
                    .run(|| async {
                        sleep(Duration::from_secs(2)).await;
                        "ali"
                    })
                    .await
            })
        };
        // The first probe is in flight by now.
        sleep(Duration::from_millis(500)).await;

        let latest = debouncer.run(|| async { "alice" }).await;

        assert_eq!(latest, Some("alice"));
        assert_eq!(slow.await.unwrap(), None);
    }
}
