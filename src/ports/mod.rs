//! Port traits. API boundaries for the hexagon.
//!
//! - Inbound: Called by the capture layer into the application
//! - Outbound: Called by application into infrastructure

pub mod inbound;
pub mod outbound;

pub use inbound::{BatchHandle, ForwardingPort};
pub use outbound::{AuthPort, CrmGateway, CrmResponse, TokenStorePort};
