mod agreement;
mod engine;
mod state;

pub use agreement::{Agreement, AgreementKind, HistoryEntry, NewAgreement, Payload, ThreadItem};
pub use engine::{WorkflowEngine, WorkflowSettings};
pub use state::{Event, State, allowed_events, next_state};
