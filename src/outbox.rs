//! Notification outbox.
//!
//! Workflow transitions and callers record outbound-message intents here.
//! Delivery happens elsewhere: a worker reads queued items and reports the
//! result back through [`Outbox::mark`].

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{Result, WorkflowError};
use crate::store::{Document, Persistence};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutboxStatus {
    Queued,
    Sent,
    Failed,
}

impl fmt::Display for OutboxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutboxStatus::Queued => write!(f, "queued"),
            OutboxStatus::Sent => write!(f, "sent"),
            OutboxStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A message waiting for, or done with, delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboxItem {
    pub id: String,
    pub channel: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    pub status: OutboxStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// What a caller wants sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub channel: String,
    pub to: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub text: String,
    #[serde(default)]
    pub task_id: Option<String>,
}

#[derive(Clone)]
pub struct Outbox {
    store: Arc<Persistence>,
}

impl Outbox {
    pub fn new(store: Arc<Persistence>) -> Self {
        Self { store }
    }

    /// Queue a notification. `channel`, `to` and `text` are required.
    pub fn enqueue(&self, notification: Notification) -> Result<OutboxItem> {
        let item = build_item(notification)?;
        self.store.update(|doc| Ok(push(doc, item)))
    }

    /// Up to `limit` items, newest first.
    pub fn list_outbox(&self, limit: usize) -> Result<Vec<OutboxItem>> {
        let doc = self.store.read()?;
        Ok(doc.outbox.iter().rev().take(limit).cloned().collect())
    }

    /// Record a delivery result for a queued item.
    pub fn mark(
        &self,
        id: &str,
        status: OutboxStatus,
        error: Option<String>,
    ) -> Result<OutboxItem> {
        if status == OutboxStatus::Queued {
            return Err(WorkflowError::Validation(
                "an item can only be marked sent or failed".into(),
            ));
        }
        self.store.update(|doc| {
            let item = doc
                .outbox
                .iter_mut()
                .find(|item| item.id == id)
                .ok_or_else(|| WorkflowError::NotFound(format!("outbox item {id}")))?;
            if item.status != OutboxStatus::Queued {
                return Err(WorkflowError::Validation(format!(
                    "outbox item {id} is already {}",
                    item.status
                )));
            }
            item.status = status;
            item.error = error;
            item.updated_at = Some(Utc::now());
            info!(id, %status, channel = %item.channel, "outbox item marked");
            Ok(item.clone())
        })
    }
}

/// Validate a notification and turn it into a queued item.
pub(crate) fn build_item(notification: Notification) -> Result<OutboxItem> {
    let channel = required("channel", &notification.channel)?;
    let to = required("to", &notification.to)?;
    let text = required("text", &notification.text)?;
    Ok(OutboxItem {
        id: Uuid::new_v4().to_string(),
        channel,
        to,
        subject: notification.subject.filter(|s| !s.trim().is_empty()),
        text,
        task_id: notification.task_id,
        status: OutboxStatus::Queued,
        created_at: Utc::now(),
        updated_at: None,
        error: None,
    })
}

pub(crate) fn push(doc: &mut Document, item: OutboxItem) -> OutboxItem {
    info!(id = %item.id, channel = %item.channel, "notification queued");
    doc.outbox.push(item.clone());
    item
}

fn required(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(WorkflowError::Validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn outbox() -> Outbox {
        Outbox::new(Arc::new(Persistence::new(MemoryStore::default())))
    }

    fn sms(text: &str) -> Notification {
        Notification {
            channel: "sms".into(),
            to: "+96890000000".into(),
            text: text.into(),
            ..Default::default()
        }
    }

    #[test]
    fn enqueue_returns_queued_item_listed_first() {
        let outbox = outbox();
        outbox.enqueue(sms("first")).unwrap();
        let item = outbox.enqueue(sms("reminder")).unwrap();
        assert_eq!(item.status, OutboxStatus::Queued);

        let listed = outbox.list_outbox(10).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0], item);
        assert_eq!(listed[1].text, "first");
    }

    #[test]
    fn list_respects_limit() {
        let outbox = outbox();
        for n in 0..5 {
            outbox.enqueue(sms(&format!("msg {n}"))).unwrap();
        }
        let listed = outbox.list_outbox(2).unwrap();
        let texts: Vec<&str> = listed.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(texts, ["msg 4", "msg 3"]);
        assert!(outbox.list_outbox(0).unwrap().is_empty());
    }

    #[test]
    fn missing_required_fields_are_rejected() {
        let outbox = outbox();
        for bad in [
            Notification {
                channel: " ".into(),
                ..sms("x")
            },
            Notification {
                to: String::new(),
                ..sms("x")
            },
            sms("   "),
        ] {
            assert!(matches!(
                outbox.enqueue(bad),
                Err(WorkflowError::Validation(_))
            ));
        }
        assert!(outbox.list_outbox(10).unwrap().is_empty());
    }

    #[test]
    fn mark_records_delivery_result_once() {
        let outbox = outbox();
        let item = outbox.enqueue(sms("hi")).unwrap();

        let failed = outbox
            .mark(&item.id, OutboxStatus::Failed, Some("gateway 503".into()))
            .unwrap();
        assert_eq!(failed.status, OutboxStatus::Failed);
        assert_eq!(failed.error.as_deref(), Some("gateway 503"));
        assert!(failed.updated_at.is_some());

        assert!(matches!(
            outbox.mark(&item.id, OutboxStatus::Sent, None),
            Err(WorkflowError::Validation(_))
        ));
        assert!(matches!(
            outbox.mark("nope", OutboxStatus::Sent, None),
            Err(WorkflowError::NotFound(_))
        ));
        assert!(matches!(
            outbox.mark(&item.id, OutboxStatus::Queued, None),
            Err(WorkflowError::Validation(_))
        ));
    }

    #[test]
    fn item_serializes_camel_case() {
        let item = build_item(Notification {
            task_id: Some("RNT-1".into()),
            ..sms("hello")
        })
        .unwrap();
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["taskId"], "RNT-1");
        assert_eq!(json["status"], "queued");
        assert!(json.get("createdAt").is_some());
    }
}
