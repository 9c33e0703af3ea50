//! Serialized forwarding worker.
//!
//! `Dispatcher` is the handle callers hold; `DispatchWorker` owns the pipeline and runs on a
//! single task fed by an mpsc queue. Batches are processed one at a time in submission order:
//! acquire credential → classify → build payload → POST → record outcome. One message's
//! failure never aborts the batch; nothing is retried.

use crate::domain::{
    BatchId, BatchOutcome, BatchReport, Classifier, Credential, DispatchState, DomainError,
    FailureReason, ForwardingOutcome, Message, Notification, PayloadBuilder,
};
use crate::ports::{BatchHandle, CrmGateway, ForwardingPort};
use crate::usecases::auth_service::AuthService;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// The only status the CRM uses to acknowledge a created record.
pub const HTTP_CREATED: u16 = 201;

/// Buffered notifications per subscriber before lagging receivers drop old events.
const NOTIFICATION_CAPACITY: usize = 64;

/// Everything the worker needs to forward a batch.
pub struct ForwardingPipeline {
    pub auth: AuthService,
    pub gateway: Arc<dyn CrmGateway>,
    pub classifier: Classifier,
    pub payloads: PayloadBuilder,
}

enum Job {
    Batch {
        batch_id: BatchId,
        messages: Vec<Message>,
        reply: oneshot::Sender<BatchReport>,
    },
    Authenticate {
        reply: oneshot::Sender<Result<(), DomainError>>,
    },
}

/// Handle to the forwarding worker. Construct once at startup and share by reference.
pub struct Dispatcher {
    tx: mpsc::UnboundedSender<Job>,
    next_batch_id: AtomicU64,
    events: broadcast::Sender<Notification>,
    state: watch::Receiver<DispatchState>,
}

impl Dispatcher {
    /// Start the worker task. It stops once every `Dispatcher` handle is dropped and the
    /// queue has drained.
    pub fn spawn(pipeline: ForwardingPipeline) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        let (state_tx, state) = watch::channel(DispatchState::Idle);

        let worker = DispatchWorker {
            pipeline,
            events: events.clone(),
            state: state_tx,
        };
        let handle = tokio::spawn(worker.run(rx));

        let dispatcher = Self {
            tx,
            next_batch_id: AtomicU64::new(1),
            events,
            state,
        };
        (dispatcher, handle)
    }

    /// Subscribe to user-facing notifications (auth failures, batch summaries).
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.events.subscribe()
    }

    /// Current worker state.
    pub fn state(&self) -> DispatchState {
        *self.state.borrow()
    }

    /// Make sure a usable credential is cached, logging in if needed. Queued behind any
    /// batches already submitted.
    pub async fn authenticate(&self) -> Result<(), DomainError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Job::Authenticate { reply })
            .map_err(|_| DomainError::WorkerStopped)?;
        rx.await.map_err(|_| DomainError::WorkerStopped)?
    }
}

impl ForwardingPort for Dispatcher {
    fn submit_batch(&self, messages: Vec<Message>) -> BatchHandle {
        let batch_id = self.next_batch_id.fetch_add(1, Ordering::Relaxed);
        let (reply, rx) = oneshot::channel();
        let count = messages.len();
        if self
            .tx
            .send(Job::Batch {
                batch_id,
                messages,
                reply,
            })
            .is_err()
        {
            error!(batch_id, "dispatch worker stopped; batch dropped");
        } else {
            debug!(batch_id, count, "batch queued");
        }
        BatchHandle::new(batch_id, rx)
    }
}

/// Single consumer of the job queue.
struct DispatchWorker {
    pipeline: ForwardingPipeline,
    events: broadcast::Sender<Notification>,
    state: watch::Sender<DispatchState>,
}

impl DispatchWorker {
    /// Run until the queue is closed. Jobs never overlap.
    async fn run(self, mut rx: mpsc::UnboundedReceiver<Job>) {
        while let Some(job) = rx.recv().await {
            match job {
                Job::Batch {
                    batch_id,
                    messages,
                    reply,
                } => {
                    let report = self.process_batch(batch_id, messages).await;
                    self.set_state(DispatchState::Idle);
                    // Receiver dropped means the caller chose fire-and-forget.
                    let _ = reply.send(report);
                }
                Job::Authenticate { reply } => {
                    let result = self.authenticate().await;
                    self.set_state(DispatchState::Idle);
                    let _ = reply.send(result);
                }
            }
        }
        info!("dispatch worker finished (queue closed)");
    }

    fn set_state(&self, state: DispatchState) {
        self.state.send_replace(state);
    }

    fn notify(&self, notification: Notification) {
        // No subscribers is fine.
        let _ = self.events.send(notification);
    }

    async fn authenticate(&self) -> Result<(), DomainError> {
        self.set_state(DispatchState::AcquiringCredential);
        match self.pipeline.auth.acquire().await {
            Ok(_) => Ok(()),
            Err(e) => {
                error!(error = %e, "login failed");
                self.notify(Notification::AuthenticationFailed {
                    batch_id: None,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn process_batch(&self, batch_id: BatchId, messages: Vec<Message>) -> BatchReport {
        info!(batch_id, count = messages.len(), "processing batch");

        self.set_state(DispatchState::AcquiringCredential);
        let credential = match self.pipeline.auth.acquire().await {
            Ok(c) => c,
            Err(e) => {
                error!(batch_id, error = %e, "failed to obtain token; messages not sent");
                self.notify(Notification::AuthenticationFailed {
                    batch_id: Some(batch_id),
                    error: e.to_string(),
                });
                self.set_state(DispatchState::Done);
                return BatchReport {
                    batch_id,
                    outcome: BatchOutcome::AuthenticationFailed(e.to_string()),
                };
            }
        };

        self.set_state(DispatchState::Sending);
        let mut outcomes = Vec::with_capacity(messages.len());
        for (index, message) in messages.iter().enumerate() {
            let outcome = self.forward_one(&credential, message).await;
            debug!(batch_id, index, outcome = ?outcome, "message processed");
            outcomes.push(outcome);
        }

        self.set_state(DispatchState::Done);
        let report = BatchReport {
            batch_id,
            outcome: BatchOutcome::Completed(outcomes),
        };
        let tally = report.tally();
        info!(
            batch_id,
            sent = tally.sent,
            dropped = tally.dropped,
            failed = tally.failed,
            "batch done"
        );
        self.notify(Notification::BatchForwarded { batch_id, tally });
        report
    }

    async fn forward_one(&self, credential: &Credential, message: &Message) -> ForwardingOutcome {
        let classification = self.pipeline.classifier.evaluate(message);
        let Some(payload) = self.pipeline.payloads.build(message, &classification) else {
            debug!(sender = %message.sender, "not transactional; not sent");
            return ForwardingOutcome::DroppedNotTransactional;
        };

        match self.pipeline.gateway.create_record(credential, &payload).await {
            Ok(res) if res.status == HTTP_CREATED => {
                info!(sender = %message.sender, "message sent to CRM");
                ForwardingOutcome::Sent
            }
            Ok(res) => {
                error!(
                    status = res.status,
                    sender = %message.sender,
                    body = %res.body,
                    "CRM rejected message"
                );
                ForwardingOutcome::Failed(FailureReason::HttpStatus(res.status))
            }
            Err(e) => {
                warn!(sender = %message.sender, error = %e, "error while sending message");
                ForwardingOutcome::Failed(FailureReason::Transport(e.to_string()))
            }
        }
    }
}
