//! The validator-facing core of a distributed validator middleware.
//!
//! [`ValidatorApi`] impersonates a beacon node towards one or more
//! unmodified validator clients. Requests referring to a cluster validator
//! carry this peer's public key *share*; cluster-facing values carry the
//! validator's *root* public key. The component translates between the two,
//! verifies submitted partial BLS signatures against the right share, and
//! bridges the synchronous beacon API onto asynchronous cluster consensus:
//! reads block until the cluster has produced the requested artifact, and
//! submitted partial signatures fan out to all subscribed consumers.
//!
//! The component is wired once at startup (`register_*`) and is immutable
//! while serving; concurrent requests share it behind `Arc` without locks.

pub use beacon::BeaconNodeProvider;
pub use error::Error;
pub use keys::{AllSharesByRoot, KeyRegistry};

mod beacon;
mod error;
mod keys;
mod sign;


use beacon_types::{
    Attestation, AttestationData, AttesterDuty, Epoch, ProposerDuty, PublicKeyBytes,
    SignatureBytes, Slot, UnsignedBeaconBlock, Validator,
};
use dv_types::{Duty, DutyKind, PartialSignedData, PartialSignedDataSet};
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, Instrument, Span};
use tree_hash::TreeHash;

/// Queries attestation data decided by the cluster for a slot and committee.
/// Blocks until consensus has been reached.
pub type AwaitAttestationFunc =
    Box<dyn Fn(Slot, u64) -> BoxFuture<'static, Result<AttestationData, Error>> + Send + Sync>;

/// Resolves the root public key of the validator at a committee position.
/// A fast in-memory lookup.
pub type PubKeyByAttestationFunc =
    Box<dyn Fn(Slot, u64, u64) -> BoxFuture<'static, Result<PublicKeyBytes, Error>> + Send + Sync>;

/// Queries the root public key of the validator proposing at a slot.
/// Blocks until the scheduler has decided.
pub type AwaitProposerFunc =
    Box<dyn Fn(Slot) -> BoxFuture<'static, Result<PublicKeyBytes, Error>> + Send + Sync>;

/// Queries the unsigned block the cluster agreed on for a slot. Blocks
/// until consensus has been reached. The proposer pubkey in the result is
/// redundant with [`AwaitProposerFunc`] and is discarded.
pub type AwaitBeaconBlockFunc = Box<
    dyn Fn(Slot) -> BoxFuture<'static, Result<(PublicKeyBytes, UnsignedBeaconBlock), Error>>
        + Send
        + Sync,
>;

/// Stores a set of partial signed data for a duty, keyed by root public
/// key. The partial-signature database is required to be idempotent on
/// `(duty, pubkey)`.
pub type StorePartialSigFunc =
    Box<dyn Fn(Duty, PartialSignedDataSet) -> BoxFuture<'static, Result<(), Error>> + Send + Sync>;

/// The validator API core component. See the crate docs.
pub struct ValidatorApi {
    beacon: Arc<dyn BeaconNodeProvider>,
    verifier: Arc<dyn tbls::Verifier>,
    registry: KeyRegistry,
    share_idx: u64,
    skip_verify: bool,

    // Registered input functions.
    await_att_func: Option<AwaitAttestationFunc>,
    pubkey_by_att_func: Option<PubKeyByAttestationFunc>,
    await_proposer_func: Option<AwaitProposerFunc>,
    await_block_func: Option<AwaitBeaconBlockFunc>,
    par_sig_store_funcs: Vec<StorePartialSigFunc>,
}

impl ValidatorApi {
    /// Returns a new component for the peer with the given 1-based share
    /// index, verifying partial signatures with `verifier`.
    pub fn new(
        beacon: Arc<dyn BeaconNodeProvider>,
        verifier: Arc<dyn tbls::Verifier>,
        all_shares_by_root: AllSharesByRoot,
        share_idx: u64,
    ) -> Result<Self, Error> {
        Self::with_registry(beacon, verifier, all_shares_by_root, share_idx, false)
    }

    /// Returns a new component that does not perform partial signature
    /// verification but still performs key translation. Test clusters only.
    pub fn new_insecure(
        beacon: Arc<dyn BeaconNodeProvider>,
        all_shares_by_root: AllSharesByRoot,
        share_idx: u64,
    ) -> Result<Self, Error> {
        Self::with_registry(
            beacon,
            Arc::new(tbls::BlstVerifier),
            all_shares_by_root,
            share_idx,
            true,
        )
    }

    fn with_registry(
        beacon: Arc<dyn BeaconNodeProvider>,
        verifier: Arc<dyn tbls::Verifier>,
        all_shares_by_root: AllSharesByRoot,
        share_idx: u64,
        skip_verify: bool,
    ) -> Result<Self, Error> {
        Ok(Self {
            beacon,
            verifier,
            registry: KeyRegistry::new(all_shares_by_root, share_idx)?,
            share_idx,
            skip_verify,
            await_att_func: None,
            pubkey_by_att_func: None,
            await_proposer_func: None,
            await_block_func: None,
            par_sig_store_funcs: Vec::new(),
        })
    }

    /// The key registry backing this component.
    pub fn key_registry(&self) -> &KeyRegistry {
        &self.registry
    }

    /// Registers the function to query attestation data. It only supports
    /// a single function, since it is an input of the component.
    pub fn register_await_attestation(
        &mut self,
        func: impl Fn(Slot, u64) -> BoxFuture<'static, Result<AttestationData, Error>>
            + Send
            + Sync
            + 'static,
    ) {
        self.await_att_func = Some(Box::new(func));
    }

    /// Registers the function to resolve pubkeys by attestation. It only
    /// supports a single function, since it is an input of the component.
    pub fn register_pubkey_by_attestation(
        &mut self,
        func: impl Fn(Slot, u64, u64) -> BoxFuture<'static, Result<PublicKeyBytes, Error>>
            + Send
            + Sync
            + 'static,
    ) {
        self.pubkey_by_att_func = Some(Box::new(func));
    }

    /// Registers the function to query the proposer pubkey for a slot. It
    /// only supports a single function, since it is an input of the
    /// component.
    pub fn register_await_proposer(
        &mut self,
        func: impl Fn(Slot) -> BoxFuture<'static, Result<PublicKeyBytes, Error>>
            + Send
            + Sync
            + 'static,
    ) {
        self.await_proposer_func = Some(Box::new(func));
    }

    /// Registers the function to query the unsigned block for a slot. It
    /// only supports a single function, since it is an input of the
    /// component.
    pub fn register_await_beacon_block(
        &mut self,
        func: impl Fn(Slot) -> BoxFuture<'static, Result<(PublicKeyBytes, UnsignedBeaconBlock), Error>>
            + Send
            + Sync
            + 'static,
    ) {
        self.await_block_func = Some(Box::new(func));
    }

    /// Registers a partial signed data set store function. It supports
    /// multiple functions since it is an output of the component; every set
    /// is delivered to every function in registration order.
    pub fn register_par_sig_store(
        &mut self,
        func: impl Fn(Duty, PartialSignedDataSet) -> BoxFuture<'static, Result<(), Error>>
            + Send
            + Sync
            + 'static,
    ) {
        self.par_sig_store_funcs.push(Box::new(func));
    }

    /// Returns the attestation data the cluster agreed on for the slot and
    /// committee. Blocks until consensus has been reached.
    pub async fn attestation_data(
        &self,
        slot: Slot,
        committee_index: u64,
    ) -> Result<AttestationData, Error> {
        let span = duty_span("attestation_data", Duty::attester(slot));
        (self.await_att_func()?)(slot, committee_index)
            .instrument(span)
            .await
    }

    /// Accepts a batch of single-validator attestations from a validator
    /// client, verifies each partial signature, and fans the batch out to
    /// the partial-signature subscribers grouped by slot.
    ///
    /// No store call happens unless the entire batch verified.
    pub async fn submit_attestations(&self, attestations: &[Attestation]) -> Result<(), Error> {
        let span = match attestations.first() {
            // Trace the whole batch under the first attestation's duty.
            Some(first) => duty_span("submit_attestations", Duty::attester(first.data.slot)),
            None => Span::none(),
        };
        self.submit_attestations_inner(attestations)
            .instrument(span)
            .await
    }

    async fn submit_attestations_inner(
        &self,
        attestations: &[Attestation],
    ) -> Result<(), Error> {
        let mut sets_by_slot: HashMap<Slot, PartialSignedDataSet> = HashMap::new();

        for attestation in attestations {
            let slot = attestation.data.slot;

            // A validator client submits its own attestation, never an
            // aggregate, so exactly one aggregation bit identifies it.
            let indices = attestation.aggregation_bit_indices();
            if indices.len() != 1 {
                return Err(Error::BadRequest(format!(
                    "unexpected number of aggregation bits: {}",
                    indices.len()
                )));
            }

            let pubkey = (self.pubkey_by_att_func()?)(
                slot,
                attestation.data.index,
                indices[0] as u64,
            )
            .await?;

            let sig_root = attestation.data.tree_hash_root();
            self.verify_par_sig(
                DutyKind::Attester,
                attestation.data.target.epoch,
                &pubkey,
                sig_root,
                &attestation.signature,
            )
            .await?;

            let signed = PartialSignedData::encode_attestation(attestation, self.share_idx)?;
            sets_by_slot.entry(slot).or_default().insert(pubkey, signed);
        }

        for (slot, set) in sets_by_slot {
            let duty = Duty::attester(slot);

            debug!(%slot, "attestation submitted by validator client");

            for store in &self.par_sig_store_funcs {
                store(duty, set.clone()).await?;
            }
        }

        Ok(())
    }

    /// Submits the randao reveal for aggregation and inclusion in the
    /// proposal pipeline, then returns the unsigned block the cluster
    /// agreed on.
    ///
    /// The order is a hard contract: the proposer is resolved first (the
    /// randao verifies against the proposer's share, not the submitting
    /// client), and the randao fan-out must complete before the block is
    /// awaited, because the cluster builds the block around the aggregated
    /// randao.
    pub async fn beacon_block_proposal(
        &self,
        slot: Slot,
        randao_reveal: SignatureBytes,
    ) -> Result<UnsignedBeaconBlock, Error> {
        let span = duty_span("beacon_block_proposal", Duty::proposer(slot));
        async move {
            // Blocking query.
            let pubkey = (self.await_proposer_func()?)(slot).await?;

            self.verify_randao_par_sig(&pubkey, slot, &randao_reveal)
                .await?;

            self.submit_randao_duty(pubkey, slot, randao_reveal).await?;

            // Before this blocking query returns, the cluster needs to
            // exchange and aggregate the partial randao reveals submitted
            // above, fetch an unsigned block including the aggregate from
            // the upstream node, and reach consensus on it.
            let (_, block) = (self.await_block_func()?)(slot).await?;

            Ok(block)
        }
        .instrument(span)
        .await
    }

    /// Returns the attester duties for the given validators, with every
    /// root public key replaced by this peer's share. The validator client
    /// uses the returned pubkey to index its local keystore, which holds
    /// the share.
    pub async fn attester_duties(
        &self,
        epoch: Epoch,
        validator_indices: &[u64],
    ) -> Result<Vec<AttesterDuty>, Error> {
        let mut duties = self.beacon.attester_duties(epoch, validator_indices).await?;

        for duty in &mut duties {
            duty.pubkey = self.registry.share_for(&duty.pubkey)?;
        }

        Ok(duties)
    }

    /// No proposer duties for now.
    pub async fn proposer_duties(
        &self,
        _epoch: Epoch,
        _validator_indices: &[u64],
    ) -> Result<Vec<ProposerDuty>, Error> {
        Ok(Vec::new())
    }

    /// Returns the validators for the given indices, with root public keys
    /// replaced by public shares.
    pub async fn validators(
        &self,
        state_id: &str,
        validator_indices: &[u64],
    ) -> Result<HashMap<u64, Validator>, Error> {
        let validators = self.beacon.validators(state_id, validator_indices).await?;

        self.convert_validators(validators)
    }

    /// Returns the validators for the given public shares. Shares are
    /// translated to root public keys before querying the beacon node, and
    /// the result is translated back.
    pub async fn validators_by_pubkey(
        &self,
        state_id: &str,
        pubshares: &[PublicKeyBytes],
    ) -> Result<HashMap<u64, Validator>, Error> {
        let mut pubkeys = Vec::with_capacity(pubshares.len());
        for pubshare in pubshares {
            pubkeys.push(self.registry.root_for(pubshare)?);
        }

        let validators = self.beacon.validators_by_pubkey(state_id, &pubkeys).await?;

        self.convert_validators(validators)
    }

    /// Replaces all root public keys in the validator map by public shares.
    fn convert_validators(
        &self,
        mut validators: HashMap<u64, Validator>,
    ) -> Result<HashMap<u64, Validator>, Error> {
        for validator in validators.values_mut() {
            validator.pubkey = self.registry.share_for(&validator.pubkey)?;
        }

        Ok(validators)
    }

    async fn verify_randao_par_sig(
        &self,
        pubkey: &PublicKeyBytes,
        slot: Slot,
        randao_reveal: &SignatureBytes,
    ) -> Result<(), Error> {
        let slots_per_epoch = self.beacon.slots_per_epoch().await?;
        let epoch = slot.epoch(slots_per_epoch);

        let sig_root = sign::randao_signing_root(epoch);

        self.verify_par_sig(DutyKind::Randao, epoch, pubkey, sig_root, randao_reveal)
            .await
    }

    async fn submit_randao_duty(
        &self,
        pubkey: PublicKeyBytes,
        slot: Slot,
        randao_reveal: SignatureBytes,
    ) -> Result<(), Error> {
        let set = PartialSignedDataSet::from([(
            pubkey,
            PartialSignedData::encode_randao(randao_reveal, self.share_idx),
        )]);
        let duty = Duty::randao(slot);

        for store in &self.par_sig_store_funcs {
            store(duty, set.clone()).await?;
        }

        Ok(())
    }

    /// Verifies a partial signature over `sig_root` against this peer's
    /// share of `pubkey`.
    async fn verify_par_sig(
        &self,
        kind: DutyKind,
        epoch: Epoch,
        pubkey: &PublicKeyBytes,
        sig_root: beacon_types::Hash256,
        signature: &SignatureBytes,
    ) -> Result<(), Error> {
        if self.skip_verify {
            return Ok(());
        }

        let span = tracing::debug_span!("verify_par_sig", duty_kind = %kind);
        async move {
            let signing_root =
                sign::prep_signing_data(self.beacon.as_ref(), kind, epoch, sig_root).await?;

            let share = self.registry.verify_share_for(pubkey)?;

            self.verifier
                .verify(
                    share.as_bytes(),
                    signing_root.as_bytes(),
                    signature.as_bytes(),
                )
                .map_err(Error::from)
        }
        .instrument(span)
        .await
    }

    fn await_att_func(&self) -> Result<&AwaitAttestationFunc, Error> {
        self.await_att_func
            .as_ref()
            .ok_or_else(|| Error::Internal("await attestation input not registered".to_string()))
    }

    fn pubkey_by_att_func(&self) -> Result<&PubKeyByAttestationFunc, Error> {
        self.pubkey_by_att_func.as_ref().ok_or_else(|| {
            Error::Internal("pubkey by attestation input not registered".to_string())
        })
    }

    fn await_proposer_func(&self) -> Result<&AwaitProposerFunc, Error> {
        self.await_proposer_func
            .as_ref()
            .ok_or_else(|| Error::Internal("await proposer input not registered".to_string()))
    }

    fn await_block_func(&self) -> Result<&AwaitBeaconBlockFunc, Error> {
        self.await_block_func
            .as_ref()
            .ok_or_else(|| Error::Internal("await beacon block input not registered".to_string()))
    }
}

/// A span covering one duty-scoped operation. Spans are best effort; they
/// never fail the operation.
fn duty_span(operation: &'static str, duty: Duty) -> Span {
    tracing::debug_span!("duty", %duty, operation)
}
