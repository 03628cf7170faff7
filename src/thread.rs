//! Comment threads on agreements, stored in the agreement's audit trail.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::error::{Result, WorkflowError};
use crate::store::Persistence;
use crate::workflow::{HistoryEntry, Payload, ThreadItem};

pub const COMMENT_ACTION: &str = "comment";

#[derive(Clone)]
pub struct ThreadStore {
    store: Arc<Persistence>,
    system_actor: String,
}

impl ThreadStore {
    pub fn new(store: Arc<Persistence>, system_actor: impl Into<String>) -> Self {
        Self {
            store,
            system_actor: system_actor.into(),
        }
    }

    /// Post `text` to the agreement's thread. A blank `author` is recorded as
    /// the system identity.
    pub fn append_thread(
        &self,
        entity_id: &str,
        author: Option<&str>,
        text: &str,
    ) -> Result<ThreadItem> {
        let text = text.trim();
        if text.is_empty() {
            return Err(WorkflowError::Validation("text is required".into()));
        }
        let author = author
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or(self.system_actor.as_str());

        self.store.update(|doc| {
            let agreement = doc
                .agreements
                .get_mut(entity_id)
                .ok_or_else(|| WorkflowError::NotFound(format!("agreement {entity_id}")))?;
            let id = Uuid::new_v4().to_string();
            let payload = Payload::Thread {
                id: id.clone(),
                text: text.to_string(),
            };
            let entry = agreement.record(author, COMMENT_ACTION, Some(payload));
            let item = ThreadItem {
                id,
                author: entry.actor.clone(),
                text: text.to_string(),
                at: entry.timestamp,
            };
            debug!(entity_id, author, "thread item appended");
            Ok(item)
        })
    }

    /// The agreement's comments, oldest first.
    pub fn thread(&self, entity_id: &str) -> Result<Vec<ThreadItem>> {
        let history = self.history_of(entity_id)?;
        Ok(history.iter().filter_map(ThreadItem::from_entry).collect())
    }

    /// The agreement's full audit trail in insertion order.
    pub fn history_of(&self, entity_id: &str) -> Result<Vec<HistoryEntry>> {
        let mut doc = self.store.read()?;
        doc.agreements
            .remove(entity_id)
            .map(|a| a.history)
            .ok_or_else(|| WorkflowError::NotFound(format!("agreement {entity_id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::workflow::{Agreement, NewAgreement};

    fn setup() -> ThreadStore {
        let store = Arc::new(Persistence::new(MemoryStore::default()));
        store
            .update(|doc| {
                let mut a = Agreement::new(NewAgreement {
                    id: Some("RNT-1".into()),
                    tenant_id: "T-1".into(),
                    landlord_id: "L-1".into(),
                    ..Default::default()
                });
                a.record("system", "generate_contract", None);
                doc.agreements.insert(a.id.clone(), a);
                Ok(())
            })
            .unwrap();
        ThreadStore::new(store, "system")
    }

    #[test]
    fn append_grows_history_by_one_and_keeps_prior_entries() {
        let threads = setup();
        let before = threads.history_of("RNT-1").unwrap();

        let item = threads.append_thread("RNT-1", Some("system"), "hello").unwrap();
        assert_eq!(item.text, "hello");
        assert_eq!(item.author, "system");

        let after = threads.history_of("RNT-1").unwrap();
        assert_eq!(after.len(), before.len() + 1);
        assert_eq!(&after[..before.len()], &before[..]);
        assert_eq!(after.last().unwrap().action, COMMENT_ACTION);
    }

    #[test]
    fn returned_item_matches_recorded_entry() {
        let threads = setup();
        let item = threads.append_thread("RNT-1", Some("alice"), "hi").unwrap();
        let history = threads.history_of("RNT-1").unwrap();
        let entry = history.last().unwrap();
        assert_eq!(ThreadItem::from_entry(entry), Some(item));
    }

    #[test]
    fn blank_author_defaults_to_system() {
        let threads = setup();
        assert_eq!(threads.append_thread("RNT-1", None, "a").unwrap().author, "system");
        assert_eq!(threads.append_thread("RNT-1", Some("  "), "b").unwrap().author, "system");
        assert_eq!(threads.append_thread("RNT-1", Some("alice"), "c").unwrap().author, "alice");
    }

    #[test]
    fn thread_returns_comments_in_order() {
        let threads = setup();
        threads.append_thread("RNT-1", Some("alice"), "one").unwrap();
        threads.append_thread("RNT-1", Some("bob"), " two ").unwrap();
        let texts: Vec<String> = threads
            .thread("RNT-1")
            .unwrap()
            .into_iter()
            .map(|i| i.text)
            .collect();
        assert_eq!(texts, ["one", "two"]);
    }

    #[test]
    fn empty_text_is_rejected_without_writing() {
        let threads = setup();
        assert!(matches!(
            threads.append_thread("RNT-1", Some("alice"), " \n "),
            Err(WorkflowError::Validation(_))
        ));
        assert_eq!(threads.history_of("RNT-1").unwrap().len(), 1);
    }

    #[test]
    fn unknown_agreement_is_not_found() {
        let threads = setup();
        assert!(matches!(
            threads.append_thread("RNT-404", None, "hi"),
            Err(WorkflowError::NotFound(_))
        ));
        assert!(matches!(
            threads.thread("RNT-404"),
            Err(WorkflowError::NotFound(_))
        ));
    }
}
