//! Inbound port. The capture layer calls into the application.

use crate::domain::{BatchId, BatchReport, DomainError, Message};
use tokio::sync::oneshot;

/// Input port: hand a batch of captured messages to the forwarding pipeline.
pub trait ForwardingPort: Send + Sync {
    /// Queue a batch. Never blocks on network work; failures surface through the
    /// returned handle and notifications, not as an error here.
    fn submit_batch(&self, messages: Vec<Message>) -> BatchHandle;
}

/// Receipt for a queued batch. Dropping it keeps the submission fire-and-forget.
#[derive(Debug)]
pub struct BatchHandle {
    batch_id: BatchId,
    rx: oneshot::Receiver<BatchReport>,
}

impl BatchHandle {
    pub fn new(batch_id: BatchId, rx: oneshot::Receiver<BatchReport>) -> Self {
        Self { batch_id, rx }
    }

    pub fn batch_id(&self) -> BatchId {
        self.batch_id
    }

    /// Wait until the worker has finished this batch.
    pub async fn report(self) -> Result<BatchReport, DomainError> {
        self.rx.await.map_err(|_| DomainError::WorkerStopped)
    }
}
