use serde::{Deserialize, Serialize};
use tree_hash::Hash256;
use tree_hash_derive::TreeHash;

/// 32-byte fork-aware signature domain, as served by the beacon node.
pub type Domain = Hash256;

/// 4-byte domain type selecting which duty a signature is bound to.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct DomainType(pub [u8; 4]);

pub const DOMAIN_BEACON_PROPOSER: DomainType = DomainType([0, 0, 0, 0]);
pub const DOMAIN_BEACON_ATTESTER: DomainType = DomainType([1, 0, 0, 0]);
pub const DOMAIN_RANDAO: DomainType = DomainType([2, 0, 0, 0]);

/// The container a validator actually signs: the object root wrapped with
/// the signature domain.
#[derive(Debug, Clone, PartialEq, TreeHash)]
pub struct SigningData {
    pub object_root: Hash256,
    pub domain: Domain,
}

/// Returns the 32-byte signing root for `object_root` under `domain`.
pub fn compute_signing_root(object_root: Hash256, domain: Domain) -> Hash256 {
    use tree_hash::TreeHash;

    SigningData {
        object_root,
        domain,
    }
    .tree_hash_root()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signing_root_depends_on_domain() {
        let root = Hash256::repeat_byte(1);
        let domain_a = Hash256::repeat_byte(2);
        let domain_b = Hash256::repeat_byte(3);

        assert_eq!(
            compute_signing_root(root, domain_a),
            compute_signing_root(root, domain_a),
        );
        assert_ne!(
            compute_signing_root(root, domain_a),
            compute_signing_root(root, domain_b),
        );
    }
}
