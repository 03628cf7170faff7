use std::sync::Arc;

use tracing::{debug, info};

use super::agreement::{Agreement, NewAgreement, Payload};
use super::state::{Event, allowed_events, next_state};
use crate::error::{Result, WorkflowError};
use crate::outbox::{self, Notification};
use crate::serial;
use crate::store::Persistence;

/// Knobs the engine needs from configuration.
#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    /// Counter prefix used when a contract number is minted.
    pub contract_prefix: String,
    /// Outbox channel for lifecycle notifications.
    pub notify_channel: String,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            contract_prefix: "AO-C".to_string(),
            notify_channel: "sms".to_string(),
        }
    }
}

/// Applies lifecycle events to agreements held in the shared document.
///
/// Every operation is one exclusive read-modify-write: the status change, the
/// contract number, the audit entry and any notification land together or not
/// at all.
#[derive(Clone)]
pub struct WorkflowEngine {
    store: Arc<Persistence>,
    settings: WorkflowSettings,
}

impl WorkflowEngine {
    pub fn new(store: Arc<Persistence>, settings: WorkflowSettings) -> Self {
        Self { store, settings }
    }

    /// Register a new agreement in `draft`.
    pub fn create(&self, input: NewAgreement) -> Result<Agreement> {
        if let Some(id) = &input.id
            && id.trim().is_empty()
        {
            return Err(WorkflowError::Validation("id must not be blank".into()));
        }
        if input.tenant_id.trim().is_empty() || input.landlord_id.trim().is_empty() {
            return Err(WorkflowError::Validation(
                "tenant_id and landlord_id are required".into(),
            ));
        }

        let agreement = Agreement::new(NewAgreement {
            id: input.id.map(|id| id.trim().to_string()),
            tenant_contact: input
                .tenant_contact
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            ..input
        });
        self.store.update(|doc| {
            if doc.agreements.contains_key(&agreement.id) {
                return Err(WorkflowError::Validation(format!(
                    "agreement {} already exists",
                    agreement.id
                )));
            }
            doc.agreements.insert(agreement.id.clone(), agreement.clone());
            info!(id = %agreement.id, kind = ?agreement.kind, "agreement created");
            Ok(agreement)
        })
    }

    pub fn get(&self, entity_id: &str) -> Result<Agreement> {
        let mut doc = self.store.read()?;
        doc.agreements
            .remove(entity_id)
            .ok_or_else(|| not_found(entity_id))
    }

    pub fn list(&self) -> Result<Vec<Agreement>> {
        Ok(self.store.read()?.agreements.into_values().collect())
    }

    /// Events the agreement currently accepts.
    pub fn allowed_events(&self, entity_id: &str) -> Result<Vec<Event>> {
        let agreement = self.get(entity_id)?;
        Ok(allowed_events(agreement.status).to_vec())
    }

    /// Apply `event` to the agreement on behalf of `actor`.
    ///
    /// - `generate_contract` mints a contract number under the configured
    ///   prefix and attaches it.
    /// - `generate_contract` and `activate` queue a notification to the
    ///   tenant contact, when one is on file.
    ///
    /// A disallowed event fails with `InvalidTransition` and leaves the
    /// document untouched.
    pub fn transition(
        &self,
        entity_id: &str,
        event: &str,
        actor: &str,
        note: Option<&str>,
    ) -> Result<Agreement> {
        let event: Event = event.parse()?;
        let actor = actor.trim();
        if actor.is_empty() {
            return Err(WorkflowError::Validation("actor is required".into()));
        }
        let note = note.map(str::trim).filter(|n| !n.is_empty());

        self.store.update(|doc| {
            let current = doc
                .agreements
                .get(entity_id)
                .ok_or_else(|| not_found(entity_id))?
                .status;
            let next = next_state(current, event).ok_or(WorkflowError::InvalidTransition {
                state: current,
                event,
            })?;

            let contract_number = match event {
                Event::GenerateContract => {
                    Some(serial::allocate(doc, &self.settings.contract_prefix)?)
                }
                _ => None,
            };

            let agreement = doc
                .agreements
                .get_mut(entity_id)
                .ok_or_else(|| not_found(entity_id))?;
            agreement.status = next;
            let payload = match &contract_number {
                Some(number) => {
                    agreement.contract_number = Some(number.clone());
                    Some(Payload::ContractIssued {
                        contract_number: number.clone(),
                        note: note.map(str::to_string),
                    })
                }
                None => note.map(|text| Payload::Note {
                    text: text.to_string(),
                }),
            };
            agreement.record(actor, event.as_str(), payload);
            let agreement = agreement.clone();

            info!(
                id = %agreement.id,
                %event,
                from = %current,
                to = %next,
                actor,
                "agreement transitioned"
            );

            if let Some(notification) = self.notification_for(&agreement, event) {
                outbox::push(doc, outbox::build_item(notification)?);
            }

            Ok(agreement)
        })
    }

    fn notification_for(&self, agreement: &Agreement, event: Event) -> Option<Notification> {
        let (subject, text) = match event {
            Event::GenerateContract => (
                "Contract ready for signature",
                format!(
                    "Contract {} for agreement {} is ready for your signature.",
                    agreement.contract_number.as_deref().unwrap_or_default(),
                    agreement.id
                ),
            ),
            Event::Activate => (
                "Agreement active",
                format!("Agreement {} is now active.", agreement.id),
            ),
            _ => return None,
        };
        let contact = agreement.tenant_contact.as_deref().map(str::trim);
        let Some(to) = contact.filter(|c| !c.is_empty()).map(str::to_string) else {
            debug!(id = %agreement.id, %event, "no tenant contact, notification skipped");
            return None;
        };
        Some(Notification {
            channel: self.settings.notify_channel.clone(),
            to,
            subject: Some(subject.to_string()),
            text,
            task_id: Some(agreement.id.clone()),
        })
    }
}

fn not_found(entity_id: &str) -> WorkflowError {
    WorkflowError::NotFound(format!("agreement {entity_id}"))
}
