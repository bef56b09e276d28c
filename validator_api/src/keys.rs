use crate::error::Error;
use beacon_types::PublicKeyBytes;
use std::collections::HashMap;

/// Maps public shares of all cluster peers to root public keys, per peer
/// index.
pub type AllSharesByRoot = HashMap<PublicKeyBytes, HashMap<u64, PublicKeyBytes>>;

/// The dual-identity key registry of a distributed validator peer.
///
/// A validator client only ever knows this peer's public share; the cluster
/// only ever speaks in root public keys. The registry translates between the
/// two. All maps are built at construction and never mutated.
#[derive(Debug)]
pub struct KeyRegistry {
    share_idx: u64,
    /// This peer's public share for each root public key.
    shares_by_root: HashMap<PublicKeyBytes, PublicKeyBytes>,
    /// Reverse of `shares_by_root`, this peer's shares only.
    roots_by_share: HashMap<PublicKeyBytes, PublicKeyBytes>,
    /// Every peer's shares, used to diagnose misdistributed key material.
    all_shares_by_root: AllSharesByRoot,
}

impl KeyRegistry {
    /// Builds the registry for the peer with the given 1-based share index.
    ///
    /// Fails if any validator lacks a share for this peer, or if the same
    /// share appears under two validators or peers.
    pub fn new(all_shares_by_root: AllSharesByRoot, share_idx: u64) -> Result<Self, Error> {
        let mut shares_by_root = HashMap::new();
        let mut roots_by_share = HashMap::new();
        let mut seen = HashMap::new();

        for (root, shares) in &all_shares_by_root {
            let own_share = shares.get(&share_idx).copied().ok_or_else(|| {
                Error::Internal(format!(
                    "validator {root} has no key share for peer {share_idx}"
                ))
            })?;
            shares_by_root.insert(*root, own_share);
            roots_by_share.insert(own_share, *root);

            for share in shares.values() {
                if seen.insert(*share, *root).is_some_and(|prev| prev != *root) {
                    return Err(Error::Internal(format!(
                        "public share {share} appears under multiple validators"
                    )));
                }
            }
        }

        Ok(Self {
            share_idx,
            shares_by_root,
            roots_by_share,
            all_shares_by_root,
        })
    }

    /// 1-based index of this peer within the cluster.
    pub fn share_idx(&self) -> u64 {
        self.share_idx
    }

    /// Returns the public share partial signatures of `root` must verify
    /// against on this peer.
    pub fn verify_share_for(&self, root: &PublicKeyBytes) -> Result<PublicKeyBytes, Error> {
        self.shares_by_root
            .get(root)
            .copied()
            .ok_or(Error::UnknownRootKey)
    }

    /// Returns this peer's public share for `root`, the key the validator
    /// client indexes its keystore by.
    pub fn share_for(&self, root: &PublicKeyBytes) -> Result<PublicKeyBytes, Error> {
        self.shares_by_root
            .get(root)
            .copied()
            .ok_or(Error::UnknownRootKey)
    }

    /// Returns the root public key for one of this peer's public shares.
    ///
    /// A share that belongs to a known validator under a different peer
    /// index yields [`Error::MismatchedShareIndex`] rather than
    /// [`Error::UnknownShare`], so operators can tell a mis-wired validator
    /// client apart from a foreign key.
    pub fn root_for(&self, share: &PublicKeyBytes) -> Result<PublicKeyBytes, Error> {
        if let Some(root) = self.roots_by_share.get(share) {
            return Ok(*root);
        }

        for shares in self.all_shares_by_root.values() {
            for (peer_idx, candidate) in shares {
                if candidate == share {
                    return Err(Error::MismatchedShareIndex {
                        share_idx: *peer_idx,
                        peer_idx: self.share_idx,
                    });
                }
            }
        }

        Err(Error::UnknownShare)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(fill: u8) -> PublicKeyBytes {
        PublicKeyBytes::new([fill; 48])
    }

    #[test]
    fn no_mismatch() {
        // A single-peer registry where the share is the root key itself.
        let root = key(1);
        let registry = KeyRegistry::new(
            HashMap::from([(root, HashMap::from([(1, root)]))]),
            1,
        )
        .unwrap();

        assert_eq!(registry.share_for(&root).unwrap(), root);
        assert_eq!(registry.root_for(&root).unwrap(), root);
        assert_eq!(registry.verify_share_for(&root).unwrap(), root);
    }

    #[test]
    fn mismatched_share_index() {
        let root = key(1);
        let own_share = key(2);
        let other_share = key(3);
        let registry = KeyRegistry::new(
            HashMap::from([(root, HashMap::from([(1, own_share), (2, other_share)]))]),
            1,
        )
        .unwrap();

        let err = registry.root_for(&other_share).unwrap_err();
        assert!(matches!(
            err,
            Error::MismatchedShareIndex {
                share_idx: 2,
                peer_idx: 1,
            },
        ));
        let msg = err.to_string();
        assert!(msg.contains("2th key share submitted to 1th peer"), "{msg}");
    }

    #[test]
    fn unknown_share() {
        let root = key(1);
        let registry = KeyRegistry::new(
            HashMap::from([(root, HashMap::from([(1, root)]))]),
            1,
        )
        .unwrap();

        assert!(matches!(
            registry.root_for(&key(42)),
            Err(Error::UnknownShare),
        ));
        assert!(matches!(
            registry.share_for(&key(42)),
            Err(Error::UnknownRootKey),
        ));
    }

    #[test]
    fn share_root_round_trip() {
        let mut all_shares = HashMap::new();
        for i in 0..3u8 {
            all_shares.insert(
                key(i),
                HashMap::from([(1, key(10 + i)), (2, key(20 + i))]),
            );
        }
        let registry = KeyRegistry::new(all_shares.clone(), 1).unwrap();

        for root in all_shares.keys() {
            let share = registry.share_for(root).unwrap();
            assert_eq!(registry.root_for(&share).unwrap(), *root);
        }
    }

    #[test]
    fn missing_own_share_is_rejected() {
        // Peer 3 has no share for this validator.
        let err = KeyRegistry::new(
            HashMap::from([(key(1), HashMap::from([(1, key(2)), (2, key(3))]))]),
            3,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
    }

    #[test]
    fn duplicate_share_is_rejected() {
        let shared = key(9);
        let err = KeyRegistry::new(
            HashMap::from([
                (key(1), HashMap::from([(1, shared)])),
                (key(2), HashMap::from([(1, shared)])),
            ]),
            1,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
    }
}
