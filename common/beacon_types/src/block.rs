use crate::primitives::{SignatureBytes, Slot};
use serde::{Deserialize, Serialize};
use tree_hash::Hash256;

/// An unsigned beacon block proposal as agreed on by the cluster.
///
/// The middleware hands this back to the validator client verbatim, so only
/// the header fields and the randao reveal the block was built around are
/// modelled; the execution payload stays behind its body root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnsignedBeaconBlock {
    pub slot: Slot,
    pub proposer_index: u64,
    pub parent_root: Hash256,
    pub state_root: Hash256,
    pub randao_reveal: SignatureBytes,
    pub body_root: Hash256,
}
