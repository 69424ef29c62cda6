//! Broadcast payload and delivery report

use serde::{Deserialize, Serialize};

/// One admin-authored message to fan out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BroadcastPayload {
    Text(String),
    Photo { file_id: String, caption: Option<String> },
    Video { file_id: String, caption: Option<String> },
}

impl BroadcastPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            BroadcastPayload::Text(_) => "text",
            BroadcastPayload::Photo { .. } => "photo",
            BroadcastPayload::Video { .. } => "video",
        }
    }
}

/// Tally of one fan-out run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastReport {
    pub total: usize,
    pub delivered: usize,
    pub failed: Vec<i64>,
}
