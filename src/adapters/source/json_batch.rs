//! Batch source for the CLI. Reads captured messages as a JSON array or JSON Lines.
//!
//! Messages without `received_at` are stamped with the current local time.

use crate::domain::{DomainError, Message};
use serde::Deserialize;
use std::path::Path;
use tokio::io::AsyncReadExt;
use tracing::info;

#[derive(Deserialize)]
struct RawMessage {
    sender: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    received_at: Option<String>,
}

impl From<RawMessage> for Message {
    fn from(raw: RawMessage) -> Self {
        match raw.received_at {
            Some(ts) if !ts.is_empty() => Message::new(raw.sender, raw.content, ts),
            _ => Message::captured_now(raw.sender, raw.content),
        }
    }
}

/// Parse a batch. Input order is preserved.
pub fn parse_batch(input: &str) -> Result<Vec<Message>, DomainError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    if trimmed.starts_with('[') {
        let raw: Vec<RawMessage> =
            serde_json::from_str(trimmed).map_err(|e| DomainError::Source(e.to_string()))?;
        return Ok(raw.into_iter().map(Message::from).collect());
    }
    trimmed
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str::<RawMessage>(line.trim())
                .map(Message::from)
                .map_err(|e| DomainError::Source(format!("line {}: {}", i + 1, e)))
        })
        .collect()
}

/// Read a batch from `path`, or from stdin when `path` is None.
pub async fn load_batch(path: Option<&Path>) -> Result<Vec<Message>, DomainError> {
    let input = match path {
        Some(p) => tokio::fs::read_to_string(p)
            .await
            .map_err(|e| DomainError::Source(format!("read {}: {}", p.display(), e)))?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .map_err(|e| DomainError::Source(format!("read stdin: {}", e)))?;
            buf
        }
    };
    let batch = parse_batch(&input)?;
    info!(
        count = batch.len(),
        source = %path.map(|p| p.display().to_string()).unwrap_or_else(|| "stdin".into()),
        "loaded message batch"
    );
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_array_keeps_order() {
        let input = r#"[
            {"sender": "A", "content": "Rs 1 debited", "received_at": "2024-01-02 10:20:30.123"},
            {"sender": "B", "content": "hi", "received_at": "2024-01-02 10:21:00.000"}
        ]"#;
        let batch = parse_batch(input).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].sender, "A");
        assert_eq!(batch[1].received_at, "2024-01-02 10:21:00.000");
    }

    #[test]
    fn test_parse_json_lines() {
        let input = "{\"sender\":\"A\",\"content\":\"x\",\"received_at\":\"t1\"}\n\n{\"sender\":\"B\",\"content\":\"y\",\"received_at\":\"t2\"}\n";
        let batch = parse_batch(input).unwrap();
        assert_eq!(
            batch,
            vec![Message::new("A", "x", "t1"), Message::new("B", "y", "t2")]
        );
    }

    #[test]
    fn test_missing_timestamp_is_stamped() {
        let batch = parse_batch(r#"[{"sender": "A", "content": "x"}]"#).unwrap();
        assert!(!batch[0].received_at.is_empty());
    }

    #[test]
    fn test_bad_line_reports_line_number() {
        let err = parse_batch("{\"sender\":\"A\"}\nnot json").unwrap_err().to_string();
        assert!(err.contains("line 2"), "{}", err);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_batch("  \n").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.json");
        std::fs::write(&path, r#"[{"sender":"A","content":"x","received_at":"t"}]"#).unwrap();
        let batch = load_batch(Some(&path)).await.unwrap();
        assert_eq!(batch, vec![Message::new("A", "x", "t")]);
    }
}
