//! A real (if minimal) `EventSource`: reads newline-delimited JSON event
//! records from stdin. Whatever process feeds this binary's stdin — a
//! queue-draining sidecar, a pipe from the real event bus — is the actual
//! external collaborator; this struct only needs to parse what arrives.

use async_trait::async_trait;
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;
use tracing::warn;

use crate::dispatcher::{EventOp, EventSource, ProductEvent};

#[derive(Debug, Deserialize)]
struct EventRecord {
    event_type: String,
    product_id: i64,
    timestamp: String,
}

pub struct StdinEventSource {
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl StdinEventSource {
    pub fn new() -> Self {
        Self {
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }
}

impl Default for StdinEventSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventSource for StdinEventSource {
    async fn poll(&self) -> Option<ProductEvent> {
        let mut lines = self.lines.lock().await;
        let line = match lines.next_line().await {
            Ok(Some(line)) if !line.trim().is_empty() => line,
            Ok(_) => return None,
            Err(e) => {
                warn!("failed to read event source stdin: {e}");
                return None;
            }
        };

        let record: EventRecord = match serde_json::from_str(&line) {
            Ok(r) => r,
            Err(e) => {
                warn!("dropping malformed event record {line:?}: {e}");
                return None;
            }
        };

        let op = match record.event_type.as_str() {
            "agregar" => EventOp::Agregar,
            "actualizar" => EventOp::Actualizar,
            "eliminar" => EventOp::Eliminar,
            other => {
                warn!("dropping event with unrecognized event_type {other:?}");
                return None;
            }
        };

        Some(ProductEvent {
            op,
            product_id: record.product_id,
            timestamp: record.timestamp,
        })
    }
}
