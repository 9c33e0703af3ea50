//! sms-forwarder: forwards transactional SMS messages to a CRM, with Hexagonal Architecture.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
