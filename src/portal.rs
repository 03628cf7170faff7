use std::sync::Arc;

use crate::config::RentflowConfig;
use crate::error::Result;
use crate::outbox::{Notification, Outbox, OutboxItem, OutboxStatus};
use crate::serial::SerialAllocator;
use crate::store::{FileStore, Persistence, Store};
use crate::thread::ThreadStore;
use crate::workflow::{Agreement, Event, HistoryEntry, NewAgreement, ThreadItem, WorkflowEngine};

/// The workflow core as seen by the request layer: every component wired to
/// one shared [`Persistence`].
#[derive(Clone)]
pub struct Portal {
    pub workflow: WorkflowEngine,
    pub serials: SerialAllocator,
    pub threads: ThreadStore,
    pub outbox: Outbox,
}

impl Portal {
    pub fn new(backend: impl Store + 'static, config: &RentflowConfig) -> Self {
        let store = Arc::new(Persistence::new(backend));
        Self {
            workflow: WorkflowEngine::new(store.clone(), config.workflow_settings()),
            serials: SerialAllocator::new(store.clone()),
            threads: ThreadStore::new(store.clone(), config.system_actor.clone()),
            outbox: Outbox::new(store),
        }
    }

    /// Open the file-backed document named by `config.store_path`.
    pub fn open(config: &RentflowConfig) -> Self {
        Self::new(FileStore::new(&config.store_path), config)
    }

    pub fn create(&self, input: NewAgreement) -> Result<Agreement> {
        self.workflow.create(input)
    }

    pub fn get(&self, entity_id: &str) -> Result<Agreement> {
        self.workflow.get(entity_id)
    }

    pub fn list(&self) -> Result<Vec<Agreement>> {
        self.workflow.list()
    }

    pub fn allowed_events(&self, entity_id: &str) -> Result<Vec<Event>> {
        self.workflow.allowed_events(entity_id)
    }

    pub fn transition(
        &self,
        entity_id: &str,
        event: &str,
        actor: &str,
        note: Option<&str>,
    ) -> Result<Agreement> {
        self.workflow.transition(entity_id, event, actor, note)
    }

    pub fn next_serial(&self, prefix: &str) -> Result<String> {
        self.serials.next_serial(prefix)
    }

    pub fn peek_serial(&self, prefix: &str) -> Result<String> {
        self.serials.peek_serial(prefix)
    }

    pub fn reset_counter(&self, prefix: &str, value: u64) -> Result<u64> {
        self.serials.reset_counter(prefix, value)
    }

    pub fn append_thread(
        &self,
        entity_id: &str,
        author: Option<&str>,
        text: &str,
    ) -> Result<ThreadItem> {
        self.threads.append_thread(entity_id, author, text)
    }

    pub fn thread(&self, entity_id: &str) -> Result<Vec<ThreadItem>> {
        self.threads.thread(entity_id)
    }

    pub fn history(&self, entity_id: &str) -> Result<Vec<HistoryEntry>> {
        self.threads.history_of(entity_id)
    }

    pub fn enqueue(&self, notification: Notification) -> Result<OutboxItem> {
        self.outbox.enqueue(notification)
    }

    pub fn list_outbox(&self, limit: usize) -> Result<Vec<OutboxItem>> {
        self.outbox.list_outbox(limit)
    }

    pub fn mark_outbox(
        &self,
        id: &str,
        status: OutboxStatus,
        error: Option<String>,
    ) -> Result<OutboxItem> {
        self.outbox.mark(id, status, error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::workflow::State;

    #[test]
    fn components_share_one_document() {
        let portal = Portal::new(MemoryStore::default(), &RentflowConfig::default());
        portal
            .create(NewAgreement {
                id: Some("RNT-1".into()),
                tenant_id: "T-1".into(),
                landlord_id: "L-1".into(),
                tenant_contact: Some("+96891234567".into()),
                ..Default::default()
            })
            .unwrap();

        let a = portal
            .transition("RNT-1", "generate_contract", "system", None)
            .unwrap();
        assert_eq!(a.status, State::PendingSignature);
        assert_eq!(portal.peek_serial("AO-C").unwrap(), "AO-C-000001");

        portal.append_thread("RNT-1", None, "please sign by Friday").unwrap();
        assert_eq!(portal.history("RNT-1").unwrap().len(), 2);
        assert_eq!(portal.thread("RNT-1").unwrap()[0].author, "system");

        let queued = portal
            .enqueue(Notification {
                channel: "sms".into(),
                to: "+968...".into(),
                text: "reminder".into(),
                ..Default::default()
            })
            .unwrap();
        let listed = portal.list_outbox(10).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, queued.id);
        assert_eq!(listed[1].task_id.as_deref(), Some("RNT-1"));
    }

    #[test]
    fn file_backed_portal_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = RentflowConfig {
            store_path: dir.path().join("portal.json"),
            ..Default::default()
        };

        let portal = Portal::open(&config);
        portal.reset_counter("AO-C", 500).unwrap();
        drop(portal);

        let reopened = Portal::open(&config);
        assert_eq!(reopened.next_serial("AO-C").unwrap(), "AO-C-000501");
    }

    #[test]
    fn configured_prefix_is_used_for_contracts() {
        let config = RentflowConfig {
            contract_prefix: "AO-B".into(),
            ..Default::default()
        };
        let portal = Portal::new(MemoryStore::default(), &config);
        portal
            .create(NewAgreement {
                id: Some("BK-1".into()),
                tenant_id: "T".into(),
                landlord_id: "L".into(),
                ..Default::default()
            })
            .unwrap();
        let a = portal
            .transition("BK-1", "generate_contract", "system", None)
            .unwrap();
        assert_eq!(a.contract_number.as_deref(), Some("AO-B-000001"));
    }
}
