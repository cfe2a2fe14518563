//! Expiration Sweeper Task
//!
//! Background task that drains the timestamp delivery channel and runs one
//! sweep per received timestamp.

use std::hash::Hash;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::ExpirationEngine;

/// Spawns the task that turns delivered timestamps into sweeps.
///
/// Timestamps are taken one at a time, so sweeps driven by this task never
/// overlap each other. The task ends once every sender is dropped.
///
/// # Arguments
/// * `engine` - Shared expiration engine
/// * `signals` - Receiving half of the bounded delivery channel
///
/// # Returns
/// A JoinHandle for the spawned task, which the cache aborts on drop.
pub fn spawn_sweeper<K, V>(
    engine: Arc<ExpirationEngine<K, V>>,
    mut signals: mpsc::Receiver<DateTime<Utc>>,
) -> JoinHandle<()>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Send + 'static,
{
    tokio::spawn(async move {
        info!("Starting expiration sweeper");

        while let Some(now) = signals.recv().await {
            engine.expire(now).await;
        }

        debug!("Expiration channel closed, sweeper exiting");
    })
}
