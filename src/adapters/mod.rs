//! Infrastructure adapters. Implement outbound ports.
//!
//! Salesforce HTTP, credential persistence, batch input. Map errors to DomainError.

pub mod persistence;
pub mod salesforce;
pub mod source;
