use crate::beacon::BeaconNodeProvider;
use crate::error::Error;
use beacon_types::{
    compute_signing_root, DomainType, Epoch, Hash256, DOMAIN_BEACON_ATTESTER,
    DOMAIN_BEACON_PROPOSER, DOMAIN_RANDAO,
};
use dv_types::DutyKind;
use tree_hash::TreeHash;

/// The domain type a duty's signatures are bound to.
pub(crate) fn domain_type(kind: DutyKind) -> DomainType {
    match kind {
        DutyKind::Attester => DOMAIN_BEACON_ATTESTER,
        DutyKind::Proposer => DOMAIN_BEACON_PROPOSER,
        DutyKind::Randao => DOMAIN_RANDAO,
    }
}

/// Builds the exact 32-byte signing root the validator client must have
/// signed: `object_root` wrapped with the fork-aware domain for `kind` at
/// `epoch`, as served by the upstream beacon node.
pub(crate) async fn prep_signing_data(
    beacon: &dyn BeaconNodeProvider,
    kind: DutyKind,
    epoch: Epoch,
    object_root: Hash256,
) -> Result<Hash256, Error> {
    let domain = beacon.domain(domain_type(kind), epoch).await?;
    Ok(compute_signing_root(object_root, domain))
}

/// The randao reveal signs the epoch itself, not any block field.
pub(crate) fn randao_signing_root(epoch: Epoch) -> Hash256 {
    epoch.tree_hash_root()
}
