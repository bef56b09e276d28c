use beacon_types::{Attestation, PublicKeyBytes, SignatureBytes};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// All partial signatures one peer produced for a single duty during one
/// validator client submission, keyed by the validator's root public key.
/// Share public keys never appear here.
pub type PartialSignedDataSet = HashMap<PublicKeyBytes, PartialSignedData>;

/// A duty-type-specific envelope around a validator-client-submitted
/// artifact and the partial signature one key share produced over it.
///
/// The payload is opaque to everything but the partial-signature database,
/// which decodes it per duty kind when aggregating across the cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialSignedData {
    /// Duty-specific payload; empty for duties whose signature is the
    /// entire artifact (randao).
    pub data: Vec<u8>,
    /// The partial BLS signature produced by this peer's key share.
    pub signature: SignatureBytes,
    /// 1-based index of the peer whose share signed.
    pub share_idx: u64,
}

#[derive(Debug)]
pub enum EncodeError {
    Json(serde_json::Error),
}

impl std::error::Error for EncodeError {}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(e) => write!(f, "partial signed data codec: {e}"),
        }
    }
}

impl From<serde_json::Error> for EncodeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl PartialSignedData {
    /// Encodes a validator client attestation as partial signed data.
    pub fn encode_attestation(
        attestation: &Attestation,
        share_idx: u64,
    ) -> Result<Self, EncodeError> {
        Ok(Self {
            data: serde_json::to_vec(attestation)?,
            signature: attestation.signature,
            share_idx,
        })
    }

    /// Decodes the attestation from attestation partial signed data.
    pub fn decode_attestation(&self) -> Result<Attestation, EncodeError> {
        Ok(serde_json::from_slice(&self.data)?)
    }

    /// Encodes a randao reveal as partial signed data. The reveal is itself
    /// a signature, so it is the only content.
    pub fn encode_randao(randao: SignatureBytes, share_idx: u64) -> Self {
        Self {
            data: Vec::new(),
            signature: randao,
            share_idx,
        }
    }

    /// Decodes the randao reveal from randao partial signed data.
    pub fn decode_randao(&self) -> SignatureBytes {
        self.signature
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_types::{AttestationData, Checkpoint, CommitteeBits, Epoch, Hash256, Slot};

    fn attestation() -> Attestation {
        let mut bits = CommitteeBits::with_capacity(16).unwrap();
        bits.set(3, true).unwrap();
        Attestation {
            aggregation_bits: bits,
            data: AttestationData {
                slot: Slot(9),
                index: 2,
                beacon_block_root: Hash256::repeat_byte(4),
                source: Checkpoint {
                    epoch: Epoch(0),
                    root: Hash256::zero(),
                },
                target: Checkpoint {
                    epoch: Epoch(1),
                    root: Hash256::repeat_byte(1),
                },
            },
            signature: SignatureBytes::new([7; 96]),
        }
    }

    #[test]
    fn attestation_round_trip() {
        let attestation = attestation();
        let encoded = PartialSignedData::encode_attestation(&attestation, 3).unwrap();

        assert_eq!(encoded.share_idx, 3);
        assert_eq!(encoded.signature, attestation.signature);
        assert_eq!(encoded.decode_attestation().unwrap(), attestation);
    }

    #[test]
    fn randao_round_trip() {
        let reveal = SignatureBytes::new([9; 96]);
        let encoded = PartialSignedData::encode_randao(reveal, 1);

        assert!(encoded.data.is_empty());
        assert_eq!(encoded.decode_randao(), reveal);
    }
}
