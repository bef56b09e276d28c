use crate::primitives::{Epoch, PublicKeyBytes};
use serde::{Deserialize, Serialize};

/// Beacon chain configuration values the middleware needs from the
/// upstream node's spec endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeaconSpec {
    pub config_name: String,
    pub slots_per_epoch: u64,
    pub seconds_per_slot: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidatorStatus {
    PendingInitialized,
    PendingQueued,
    ActiveOngoing,
    ActiveExiting,
    ActiveSlashed,
    ExitedUnslashed,
    ExitedSlashed,
    WithdrawalPossible,
    WithdrawalDone,
}

/// A validator record as returned by the beacon API states endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    pub index: u64,
    pub balance: u64,
    pub status: ValidatorStatus,
    pub pubkey: PublicKeyBytes,
    pub effective_balance: u64,
    pub slashed: bool,
    pub activation_epoch: Epoch,
    pub exit_epoch: Epoch,
}
