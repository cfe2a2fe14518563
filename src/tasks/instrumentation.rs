//! Instrumentation Task
//!
//! Periodically samples cache occupancy and hands it to a user hook.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, trace};

use crate::cache::{CacheStats, ExpirationEngine, InstrumentationHandler};

/// Returns how many timestamps are queued but not yet swept.
pub fn pending_signals<T>(signals: &mpsc::Sender<T>) -> usize {
    signals.max_capacity() - signals.capacity()
}

/// Takes a full sample: store sizes plus delivery channel depth.
pub async fn sample<K, V>(
    engine: &ExpirationEngine<K, V>,
    signals: &mpsc::Sender<DateTime<Utc>>,
) -> CacheStats
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Send + 'static,
{
    let mut stats = engine.store().lock().await.stats();
    stats.set_pending_signals(pending_signals(signals));
    stats
}

/// Spawns the sampling loop.
///
/// Sleeps for `interval` before each sample. Each sample is handed to the
/// handler on its own task, outside of the store lock, so a panicking hook
/// does not stop later samples.
///
/// # Arguments
/// * `engine` - Shared expiration engine
/// * `signals` - Delivery channel, inspected for its depth only
/// * `interval` - Sampling period
/// * `handler` - Receives each sample
pub fn spawn_instrumentation<K, V>(
    engine: Arc<ExpirationEngine<K, V>>,
    signals: mpsc::Sender<DateTime<Utc>>,
    interval: Duration,
    handler: InstrumentationHandler,
) -> JoinHandle<()>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Send + 'static,
{
    tokio::spawn(async move {
        info!("Starting instrumentation sampler with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let stats = sample(engine.as_ref(), &signals).await;
            trace!(
                total_entries = stats.total_entries,
                queue_len = stats.queue_len,
                pending_signals = stats.pending_signals,
                "instrumentation sample"
            );
            let handler = Arc::clone(&handler);
            tokio::spawn(async move {
                handler(stats);
            });
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pending_signals_counts_queued() {
        let (tx, _rx) = mpsc::channel::<u8>(4);
        assert_eq!(pending_signals(&tx), 0);

        tx.send(1).await.unwrap();
        tx.send(2).await.unwrap();
        assert_eq!(pending_signals(&tx), 2);
    }

    #[tokio::test]
    async fn test_instrumentation_reports_sizes() {
        let engine = Arc::new(ExpirationEngine::<u32, u32>::new(
            chrono::Duration::seconds(60),
            20,
            None,
        ));
        {
            let mut store = engine.store().lock().await;
            store.insert_or_append(1, 1, Utc::now());
            store.insert_or_append(2, 2, Utc::now());
        }
        let (tx, _rx) = mpsc::channel(8);
        tx.send(Utc::now()).await.unwrap();

        let (sample_tx, mut sample_rx) = mpsc::unbounded_channel();
        let handler: InstrumentationHandler = Arc::new(move |stats| {
            let _ = sample_tx.send(stats);
        });
        let handle = spawn_instrumentation(engine, tx, Duration::from_millis(10), handler);

        let stats = sample_rx.recv().await.unwrap();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.queue_len, 2);
        assert_eq!(stats.pending_signals, 1);

        handle.abort();
    }

    #[tokio::test]
    async fn test_panicking_hook_keeps_sampling() {
        let engine = Arc::new(ExpirationEngine::<u32, u32>::new(
            chrono::Duration::seconds(60),
            20,
            None,
        ));
        let (tx, _rx) = mpsc::channel(8);

        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let (sample_tx, mut sample_rx) = mpsc::unbounded_channel();
        let handler: InstrumentationHandler = Arc::new(move |stats| {
            if counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 0 {
                panic!("hook failed");
            }
            let _ = sample_tx.send(stats);
        });
        let handle = spawn_instrumentation(engine, tx, Duration::from_millis(10), handler);

        let stats = tokio::time::timeout(Duration::from_secs(1), sample_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stats.total_entries, 0);
        assert!(calls.load(std::sync::atomic::Ordering::SeqCst) >= 2);

        handle.abort();
    }
}
