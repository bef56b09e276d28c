use beacon_types::Slot;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of scheduled action a distributed validator performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DutyKind {
    Attester,
    Proposer,
    Randao,
}

impl fmt::Display for DutyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attester => write!(f, "attester"),
            Self::Proposer => write!(f, "proposer"),
            Self::Randao => write!(f, "randao"),
        }
    }
}

/// A duty is the unit the cluster coordinates on: one kind of action at one
/// slot. It keys partial-signature fan-out and tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Duty {
    pub slot: Slot,
    pub kind: DutyKind,
}

impl Duty {
    pub fn attester(slot: Slot) -> Self {
        Self {
            slot,
            kind: DutyKind::Attester,
        }
    }

    pub fn proposer(slot: Slot) -> Self {
        Self {
            slot,
            kind: DutyKind::Proposer,
        }
    }

    pub fn randao(slot: Slot) -> Self {
        Self {
            slot,
            kind: DutyKind::Randao,
        }
    }
}

impl fmt::Display for Duty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(Duty::attester(Slot(12)).to_string(), "attester/12");
        assert_eq!(Duty::randao(Slot(0)).to_string(), "randao/0");
    }
}
