//! Application use cases. Orchestrate domain logic via ports.

pub mod auth_service;
pub mod dispatcher;

pub use auth_service::AuthService;
pub use dispatcher::{Dispatcher, ForwardingPipeline, HTTP_CREATED};
