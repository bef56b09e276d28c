use crate::primitives::{Epoch, SignatureBytes, Slot};
use serde::{Deserialize, Serialize};
use ssz_types::BitList;
use tree_hash::Hash256;
use tree_hash_derive::TreeHash;
use typenum::U2048;

/// MAX_VALIDATORS_PER_COMMITTEE.
pub type CommitteeBits = BitList<U2048>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TreeHash)]
pub struct Checkpoint {
    pub epoch: Epoch,
    pub root: Hash256,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TreeHash)]
pub struct AttestationData {
    pub slot: Slot,
    pub index: u64,
    pub beacon_block_root: Hash256,
    pub source: Checkpoint,
    pub target: Checkpoint,
}

/// A signed attestation as submitted by a validator client. For an
/// unaggregated attestation exactly one aggregation bit is set, identifying
/// the signer's position within the committee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attestation {
    pub aggregation_bits: CommitteeBits,
    pub data: AttestationData,
    pub signature: SignatureBytes,
}

impl Attestation {
    /// Returns the positions of all set aggregation bits.
    pub fn aggregation_bit_indices(&self) -> Vec<usize> {
        (0..self.aggregation_bits.len())
            .filter(|i| self.aggregation_bits.get(*i).unwrap_or(false))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(len: usize, set: &[usize]) -> CommitteeBits {
        let mut bits = CommitteeBits::with_capacity(len).unwrap();
        for i in set {
            bits.set(*i, true).unwrap();
        }
        bits
    }

    #[test]
    fn bit_indices() {
        assert!(bits(8, &[]).iter().all(|b| !b));

        let attestation = Attestation {
            aggregation_bits: bits(8, &[2, 5]),
            data: AttestationData {
                slot: Slot(1),
                index: 0,
                beacon_block_root: Hash256::zero(),
                source: Checkpoint {
                    epoch: Epoch(0),
                    root: Hash256::zero(),
                },
                target: Checkpoint {
                    epoch: Epoch(0),
                    root: Hash256::zero(),
                },
            },
            signature: SignatureBytes::default(),
        };
        assert_eq!(attestation.aggregation_bit_indices(), vec![2, 5]);
    }

    #[test]
    fn attestation_data_root_is_stable() {
        use tree_hash::TreeHash;

        let data = AttestationData {
            slot: Slot(42),
            index: 3,
            beacon_block_root: Hash256::repeat_byte(7),
            source: Checkpoint {
                epoch: Epoch(1),
                root: Hash256::repeat_byte(1),
            },
            target: Checkpoint {
                epoch: Epoch(2),
                root: Hash256::repeat_byte(2),
            },
        };
        assert_eq!(data.tree_hash_root(), data.clone().tree_hash_root());

        let mut other = data.clone();
        other.index = 4;
        assert_ne!(data.tree_hash_root(), other.tree_hash_root());
    }
}
