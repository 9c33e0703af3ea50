//! Salesforce adapters: OAuth password grant and REST record creation.

pub mod auth_adapter;
pub mod crm_gateway;

pub use auth_adapter::PasswordGrantAuthAdapter;
pub use crm_gateway::SalesforceCrmGateway;
