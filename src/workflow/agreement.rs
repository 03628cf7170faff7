use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::state::State;

/// What kind of record an agreement is in the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgreementKind {
    #[default]
    Rental,
    Contract,
    Task,
}

/// Structured attachment on a history entry. Each variant carries only the
/// fields that are legal for the action that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    /// Free-text note supplied with a transition.
    Note { text: String },
    /// A contract number was minted for the agreement.
    ContractIssued {
        contract_number: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
    /// A comment posted to the agreement's thread.
    Thread { id: String, text: String },
}

/// One immutable line of an agreement's audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub actor: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
}

/// A comment on an agreement, as returned to the caller that posted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadItem {
    pub id: String,
    pub author: String,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl ThreadItem {
    /// Rebuild a thread item from its history entry, if it is one.
    pub fn from_entry(entry: &HistoryEntry) -> Option<Self> {
        match &entry.payload {
            Some(Payload::Thread { id, text }) => Some(Self {
                id: id.clone(),
                author: entry.actor.clone(),
                text: text.clone(),
                at: entry.timestamp,
            }),
            _ => None,
        }
    }
}

/// Input for registering a new draft agreement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewAgreement {
    /// Caller-chosen id (e.g. `RNT-1`); a UUID is generated when absent.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub kind: AgreementKind,
    pub tenant_id: String,
    pub landlord_id: String,
    #[serde(default)]
    pub property_id: Option<String>,
    /// Address notifications about this agreement are sent to.
    #[serde(default)]
    pub tenant_contact: Option<String>,
}

/// A rental, contract or task tracked by the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agreement {
    pub id: String,
    #[serde(default)]
    pub kind: AgreementKind,
    pub status: State,
    pub tenant_id: String,
    pub landlord_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_number: Option<String>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Agreement {
    pub fn new(input: NewAgreement) -> Self {
        let now = Utc::now();
        Self {
            id: input.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            kind: input.kind,
            status: State::Draft,
            tenant_id: input.tenant_id,
            landlord_id: input.landlord_id,
            property_id: input.property_id,
            tenant_contact: input.tenant_contact,
            contract_number: None,
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append an entry to the audit trail. Existing entries are never touched.
    pub fn record(
        &mut self,
        actor: &str,
        action: &str,
        payload: Option<Payload>,
    ) -> &HistoryEntry {
        let now = Utc::now();
        self.history.push(HistoryEntry {
            timestamp: now,
            actor: actor.to_string(),
            action: action.to_string(),
            payload,
        });
        self.updated_at = now;
        &self.history[self.history.len() - 1]
    }

    /// Comments posted to this agreement, oldest first.
    pub fn thread(&self) -> Vec<ThreadItem> {
        self.history.iter().filter_map(ThreadItem::from_entry).collect()
    }
}
