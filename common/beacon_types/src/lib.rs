pub use attestation::{Attestation, AttestationData, Checkpoint, CommitteeBits};
pub use block::UnsignedBeaconBlock;
pub use duty::{AttesterDuty, ProposerDuty};
pub use primitives::{Epoch, PublicKeyBytes, SignatureBytes, Slot};
pub use signing::{
    compute_signing_root, Domain, DomainType, SigningData, DOMAIN_BEACON_ATTESTER,
    DOMAIN_BEACON_PROPOSER, DOMAIN_RANDAO,
};
pub use validator::{BeaconSpec, Validator, ValidatorStatus};

pub use tree_hash::Hash256;

mod attestation;
mod block;
mod duty;
mod primitives;
mod signing;
mod validator;
