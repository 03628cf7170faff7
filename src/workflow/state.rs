use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;

/// Lifecycle states of a rental agreement.
///
/// An agreement flows: DRAFT → PENDING_SIGNATURE → SIGNED → ACTIVE, then ends
/// as TERMINATED or EXPIRED (possibly after one or more renewals). CANCELLED
/// is reachable only before signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    Draft,
    PendingSignature,
    Signed,
    Active,
    Renewed,
    Terminated,
    Expired,
    Cancelled,
}

impl State {
    pub const ALL: [State; 8] = [
        State::Draft,
        State::PendingSignature,
        State::Signed,
        State::Active,
        State::Renewed,
        State::Terminated,
        State::Expired,
        State::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            State::Draft => "draft",
            State::PendingSignature => "pending_signature",
            State::Signed => "signed",
            State::Active => "active",
            State::Renewed => "renewed",
            State::Terminated => "terminated",
            State::Expired => "expired",
            State::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        allowed_events(*self).is_empty()
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Business events that drive an agreement through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    GenerateContract,
    Sign,
    Activate,
    Renew,
    Terminate,
    Expire,
    Cancel,
}

impl Event {
    pub const ALL: [Event; 7] = [
        Event::GenerateContract,
        Event::Sign,
        Event::Activate,
        Event::Renew,
        Event::Terminate,
        Event::Expire,
        Event::Cancel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Event::GenerateContract => "generate_contract",
            Event::Sign => "sign",
            Event::Activate => "activate",
            Event::Renew => "renew",
            Event::Terminate => "terminate",
            Event::Expire => "expire",
            Event::Cancel => "cancel",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Event {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let symbol = s.trim();
        if symbol.is_empty() {
            return Err(WorkflowError::Validation("event is required".into()));
        }
        Event::ALL
            .into_iter()
            .find(|e| e.as_str() == symbol)
            .ok_or_else(|| WorkflowError::Validation(format!("unknown event `{symbol}`")))
    }
}

/// Events accepted from `state`, in table order.
pub fn allowed_events(state: State) -> &'static [Event] {
    match state {
        State::Draft => &[Event::GenerateContract, Event::Cancel],
        State::PendingSignature => &[Event::Sign, Event::Cancel],
        State::Signed => &[Event::Activate],
        State::Active | State::Renewed => &[Event::Renew, Event::Terminate, Event::Expire],
        State::Terminated | State::Expired | State::Cancelled => &[],
    }
}

/// The transition table: the state `event` leads to from `state`, if allowed.
pub fn next_state(state: State, event: Event) -> Option<State> {
    let next = match (state, event) {
        (State::Draft, Event::GenerateContract) => State::PendingSignature,
        (State::Draft | State::PendingSignature, Event::Cancel) => State::Cancelled,
        (State::PendingSignature, Event::Sign) => State::Signed,
        (State::Signed, Event::Activate) => State::Active,
        (State::Active | State::Renewed, Event::Renew) => State::Renewed,
        (State::Active | State::Renewed, Event::Terminate) => State::Terminated,
        (State::Active | State::Renewed, Event::Expire) => State::Expired,
        _ => return None,
    };
    Some(next)
}
