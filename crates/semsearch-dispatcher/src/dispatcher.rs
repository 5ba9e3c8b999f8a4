//! The event dispatcher loop: poll, map to an Updater endpoint, POST, sleep.
//! `original_source/faas.py`'s `_read_from_go_queue` stand-in is reproduced
//! here as `FakeEventSource`, used only in tests — the real event source is
//! an external collaborator and is never constructed in production code.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

/// The three mutation kinds an event can carry, named after the Spanish
/// verbs the source event stream uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOp {
    Agregar,
    Actualizar,
    Eliminar,
}

impl EventOp {
    fn endpoint_segment(self) -> &'static str {
        match self {
            EventOp::Agregar => "add",
            EventOp::Actualizar => "modify",
            EventOp::Eliminar => "delete",
        }
    }
}

/// `{op, product_id, timestamp}` carried by an inbound event. The dispatcher
/// only needs enough to route the call; the Updater re-fetches the
/// authoritative record from the catalog.
#[derive(Debug, Clone)]
pub struct ProductEvent {
    pub op: EventOp,
    pub product_id: i64,
    pub timestamp: String,
}

/// Contract with the event source: `poll()` returns either an event or
/// nothing. Implementations may be backed by any queue; this dispatcher
/// does not retry or re-enqueue on failure.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn poll(&self) -> Option<ProductEvent>;
}

/// Drives events from an `EventSource` into POSTs against the Updater.
pub struct Dispatcher<S: EventSource> {
    source: S,
    updater_base_url: String,
    http: reqwest::Client,
}

impl<S: EventSource> Dispatcher<S> {
    pub fn new(source: S, updater_base_url: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            source,
            updater_base_url,
            http,
        })
    }

    /// Runs the cooperative poll/dispatch/sleep loop until `shutdown`
    /// resolves. Sleeps 100ms when there is no event, 1s after a loop-level
    /// error.
    pub async fn run(&self, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        loop {
            if *shutdown.borrow() {
                info!("dispatcher received shutdown signal, exiting");
                return;
            }

            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("dispatcher received shutdown signal, exiting");
                        return;
                    }
                }
                event = self.source.poll() => {
                    match event {
                        Some(event) => self.dispatch_one(event).await,
                        None => tokio::time::sleep(Duration::from_millis(100)).await,
                    }
                }
            }
        }
    }

    async fn dispatch_one(&self, event: ProductEvent) {
        let url = format!(
            "{}/update/{}/{}",
            self.updater_base_url,
            event.op.endpoint_segment(),
            event.product_id
        );

        match self.http.post(&url).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!(
                    "dispatched {:?} for product {} (timestamp {})",
                    event.op, event.product_id, event.timestamp
                );
            }
            Ok(resp) => {
                warn!(
                    "update call to {url} returned status {}, dropping event",
                    resp.status()
                );
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
            Err(e) => {
                warn!("update call to {url} failed: {e}, dropping event");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }
}

/// A stand-in for the real event source, used only in tests. Yields a fixed
/// sequence of events once, then reports empty forever (mirroring
/// `_read_from_go_queue`'s role as a placeholder, not production wiring).
pub struct FakeEventSource {
    events: tokio::sync::Mutex<Vec<ProductEvent>>,
}

impl FakeEventSource {
    pub fn new(events: Vec<ProductEvent>) -> Self {
        Self {
            events: tokio::sync::Mutex::new(events),
        }
    }
}

#[async_trait]
impl EventSource for FakeEventSource {
    async fn poll(&self) -> Option<ProductEvent> {
        self.events.lock().await.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingEventSource {
        remaining: Arc<AtomicUsize>,
        product_id: i64,
    }

    #[async_trait]
    impl EventSource for CountingEventSource {
        async fn poll(&self) -> Option<ProductEvent> {
            if self.remaining.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                if n == 0 {
                    None
                } else {
                    Some(n - 1)
                }
            }).is_ok() {
                Some(ProductEvent {
                    op: EventOp::Agregar,
                    product_id: self.product_id,
                    timestamp: "2026-01-01T00:00:00Z".to_string(),
                })
            } else {
                None
            }
        }
    }

    #[tokio::test]
    async fn fake_event_source_yields_then_empties() {
        let source = FakeEventSource::new(vec![ProductEvent {
            op: EventOp::Agregar,
            product_id: 101,
            timestamp: "t".to_string(),
        }]);

        assert!(source.poll().await.is_some());
        assert!(source.poll().await.is_none());
    }

    #[tokio::test]
    async fn endpoint_segment_mapping_is_correct() {
        assert_eq!(EventOp::Agregar.endpoint_segment(), "add");
        assert_eq!(EventOp::Actualizar.endpoint_segment(), "modify");
        assert_eq!(EventOp::Eliminar.endpoint_segment(), "delete");
    }

    #[tokio::test]
    async fn run_exits_on_shutdown_signal() {
        let remaining = Arc::new(AtomicUsize::new(0));
        let source = CountingEventSource {
            remaining,
            product_id: 1,
        };
        let dispatcher =
            Dispatcher::new(source, "http://127.0.0.1:1".to_string(), Duration::from_millis(50))
                .unwrap();

        let (tx, rx) = tokio::sync::watch::channel(false);
        let handle = tokio::spawn(async move { dispatcher.run(rx).await });

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("dispatcher loop did not exit after shutdown signal")
            .unwrap();
    }
}
