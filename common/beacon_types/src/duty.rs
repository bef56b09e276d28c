use crate::primitives::{PublicKeyBytes, Slot};
use serde::{Deserialize, Serialize};

/// An attester duty as returned by the beacon API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttesterDuty {
    pub pubkey: PublicKeyBytes,
    pub validator_index: u64,
    pub slot: Slot,
    pub committee_index: u64,
    pub committee_length: u64,
    pub committees_at_slot: u64,
    pub validator_committee_index: u64,
}

/// A proposer duty as returned by the beacon API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposerDuty {
    pub pubkey: PublicKeyBytes,
    pub validator_index: u64,
    pub slot: Slot,
}
