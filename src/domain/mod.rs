//! Core domain layer. No external I/O dependencies.
//!
//! Entities, classification and payload mapping live here. Dependencies flow inward.

pub mod classifier;
pub mod entities;
pub mod errors;
pub mod external_id;
pub mod payload;

pub use classifier::{Classifier, TRANSACTION_MARKERS, is_transactional, normalize_content};
pub use entities::{
    BatchId, BatchOutcome, BatchReport, BatchTally, Classification, Credential, DispatchState,
    FailureReason, ForwardingOutcome, Message, Notification, RECEIVED_AT_FORMAT,
};
pub use errors::DomainError;
pub use external_id::ExternalIdMode;
pub use payload::{CREATED_FROM_SMS, CrmPayload, PayloadBuilder};
