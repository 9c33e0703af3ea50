//! CRM record payload. Maps a classified message onto the custom object's fields.

use super::entities::{Classification, Message};
use serde::{Deserialize, Serialize};

/// Value of the "created from" field for every record this pipeline creates.
pub const CREATED_FROM_SMS: &str = "SMS";

/// One CRM record. Field names are the custom object's API names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrmPayload {
    #[serde(rename = "FinPlan__Sender__c")]
    pub sender: String,
    #[serde(rename = "FinPlan__Original_Content__c")]
    pub original_content: String,
    #[serde(rename = "FinPlan__Received_At__c")]
    pub received_at: String,
    #[serde(rename = "FinPlan__Created_From__c")]
    pub created_from: String,
    #[serde(rename = "FinPlan__Device__c")]
    pub device: String,
    #[serde(rename = "FinPlan__External_Id__c")]
    pub external_id: String,
    #[serde(rename = "FinPlan__Content__c")]
    pub content: String,
}

/// Builds payloads for one device.
#[derive(Debug, Clone)]
pub struct PayloadBuilder {
    device: String,
}

impl PayloadBuilder {
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
        }
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    /// `None` means "skip, do not send".
    pub fn build(&self, message: &Message, classification: &Classification) -> Option<CrmPayload> {
        match classification {
            Classification::NotTransactional => None,
            Classification::Transactional {
                content,
                external_id,
            } => Some(CrmPayload {
                sender: message.sender.clone(),
                original_content: message.content.clone(),
                received_at: message.received_at.clone(),
                created_from: CREATED_FROM_SMS.to_string(),
                device: self.device.clone(),
                external_id: external_id.clone(),
                content: content.clone(),
            }),
        }
    }
}
