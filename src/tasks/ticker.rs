//! Timestamp Source Tasks
//!
//! Feed "now" instants into the delivery channel so keys expire even when no
//! inserts arrive.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Spawns a periodic clock that sends the wall-clock time every `resolution`.
///
/// Bounds worst-case expiry latency to roughly `ttl + resolution`. Ticks
/// missed while the channel is full are skipped, not replayed.
///
/// # Arguments
/// * `signals` - Sending half of the delivery channel
/// * `resolution` - Tick interval
pub fn spawn_ticker(signals: mpsc::Sender<DateTime<Utc>>, resolution: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting timestamp ticker with resolution of {:?}", resolution);

        let mut ticker = tokio::time::interval(resolution);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            if signals.send(Utc::now()).await.is_err() {
                warn!("Expiration channel closed, ticker exiting");
                return;
            }
        }
    })
}

/// Spawns a task relaying timestamps from a caller-owned source.
///
/// Used in place of [`spawn_ticker`] when the caller wants to drive time
/// itself. Ends when either side of the relay is closed.
///
/// # Arguments
/// * `source` - Caller-owned stream of "now" instants
/// * `signals` - Sending half of the delivery channel
pub fn spawn_forwarder(
    mut source: mpsc::Receiver<DateTime<Utc>>,
    signals: mpsc::Sender<DateTime<Utc>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting external timestamp forwarder");

        while let Some(now) = source.recv().await {
            if signals.send(now).await.is_err() {
                warn!("Expiration channel closed, forwarder exiting");
                return;
            }
        }

        debug!("Timestamp source closed, forwarder exiting");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ticker_sends_periodically() {
        let (tx, mut rx) = mpsc::channel(16);
        let handle = spawn_ticker(tx, Duration::from_millis(10));

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert!(second >= first);

        handle.abort();
    }

    #[tokio::test]
    async fn test_ticker_exits_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel(1);
        let handle = spawn_ticker(tx, Duration::from_millis(5));

        drop(rx);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("ticker should exit")
            .unwrap();
    }

    #[tokio::test]
    async fn test_forwarder_relays_in_order() {
        let (source_tx, source_rx) = mpsc::channel(4);
        let (tx, mut rx) = mpsc::channel(4);
        let handle = spawn_forwarder(source_rx, tx);

        let start = Utc::now();
        let later = start + chrono::Duration::seconds(1);
        source_tx.send(start).await.unwrap();
        source_tx.send(later).await.unwrap();

        assert_eq!(rx.recv().await, Some(start));
        assert_eq!(rx.recv().await, Some(later));

        drop(source_tx);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("forwarder should exit")
            .unwrap();
    }
}
