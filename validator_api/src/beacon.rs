use crate::error::Error;
use async_trait::async_trait;
use beacon_types::{
    AttesterDuty, BeaconSpec, Domain, DomainType, Epoch, PublicKeyBytes, Validator,
};
use std::collections::HashMap;

/// The slice of the upstream beacon node API this component consumes.
///
/// Implementations carry their own deadlines and retry policy; the
/// component treats every failure as terminal for the current request.
#[async_trait]
pub trait BeaconNodeProvider: Send + Sync {
    async fn attester_duties(
        &self,
        epoch: Epoch,
        validator_indices: &[u64],
    ) -> Result<Vec<AttesterDuty>, Error>;

    /// The 32-byte signature domain for `domain_type` at `epoch`, fork
    /// boundaries included.
    async fn domain(&self, domain_type: DomainType, epoch: Epoch) -> Result<Domain, Error>;

    async fn spec(&self) -> Result<BeaconSpec, Error>;

    async fn slots_per_epoch(&self) -> Result<u64, Error> {
        Ok(self.spec().await?.slots_per_epoch)
    }

    async fn validators(
        &self,
        state_id: &str,
        validator_indices: &[u64],
    ) -> Result<HashMap<u64, Validator>, Error>;

    async fn validators_by_pubkey(
        &self,
        state_id: &str,
        pubkeys: &[PublicKeyBytes],
    ) -> Result<HashMap<u64, Validator>, Error>;
}
