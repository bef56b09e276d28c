use derive_more::{Deref, Display, From};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use tree_hash::{PackedEncoding, TreeHash, TreeHashType};

/// Beacon chain slot number.
#[derive(
    Clone, Copy, Debug, Default, Display, Eq, PartialEq, Ord, PartialOrd, Hash, From, Deref,
    Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Slot(pub u64);

impl Slot {
    pub fn epoch(&self, slots_per_epoch: u64) -> Epoch {
        Epoch(self.0 / slots_per_epoch)
    }
}

/// Beacon chain epoch number.
#[derive(
    Clone, Copy, Debug, Default, Display, Eq, PartialEq, Ord, PartialOrd, Hash, From, Deref,
    Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Epoch(pub u64);

impl TreeHash for Slot {
    fn tree_hash_type() -> TreeHashType {
        u64::tree_hash_type()
    }

    fn tree_hash_packed_encoding(&self) -> PackedEncoding {
        self.0.tree_hash_packed_encoding()
    }

    fn tree_hash_packing_factor() -> usize {
        u64::tree_hash_packing_factor()
    }

    fn tree_hash_root(&self) -> tree_hash::Hash256 {
        self.0.tree_hash_root()
    }
}

impl TreeHash for Epoch {
    fn tree_hash_type() -> TreeHashType {
        u64::tree_hash_type()
    }

    fn tree_hash_packed_encoding(&self) -> PackedEncoding {
        self.0.tree_hash_packed_encoding()
    }

    fn tree_hash_packing_factor() -> usize {
        u64::tree_hash_packing_factor()
    }

    fn tree_hash_root(&self) -> tree_hash::Hash256 {
        self.0.tree_hash_root()
    }
}

/// Compressed BLS12-381 public key.
///
/// Used both for root validator keys and for the per-peer public shares of a
/// split validator key. The two are distinguished by where they appear, not
/// by type: a validator-client-facing value always carries a share, a
/// cluster-facing value always carries the root key.
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct PublicKeyBytes([u8; 48]);

impl PublicKeyBytes {
    pub const fn new(bytes: [u8; 48]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, String> {
        if bytes.len() != 48 {
            return Err(format!(
                "invalid public key length: expected 48, got {}",
                bytes.len()
            ));
        }
        let mut key = [0; 48];
        key.copy_from_slice(bytes);
        Ok(Self(key))
    }

    pub fn as_bytes(&self) -> &[u8; 48] {
        &self.0
    }

    pub fn as_hex_string(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl Default for PublicKeyBytes {
    fn default() -> Self {
        Self([0; 48])
    }
}

impl fmt::Display for PublicKeyBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_hex_string())
    }
}

impl fmt::Debug for PublicKeyBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_hex_string())
    }
}

impl Serialize for PublicKeyBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_hex_string())
    }
}

impl<'de> Deserialize<'de> for PublicKeyBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex_string = String::deserialize(deserializer)?;
        let bytes = hex::decode(hex_string.trim_start_matches("0x"))
            .map_err(|e| D::Error::custom(format!("invalid hex public key: {e}")))?;
        Self::from_slice(&bytes).map_err(D::Error::custom)
    }
}

/// Compressed BLS12-381 signature.
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct SignatureBytes([u8; 96]);

impl SignatureBytes {
    pub const fn new(bytes: [u8; 96]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, String> {
        if bytes.len() != 96 {
            return Err(format!(
                "invalid signature length: expected 96, got {}",
                bytes.len()
            ));
        }
        let mut sig = [0; 96];
        sig.copy_from_slice(bytes);
        Ok(Self(sig))
    }

    pub fn as_bytes(&self) -> &[u8; 96] {
        &self.0
    }

    pub fn as_hex_string(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl Default for SignatureBytes {
    fn default() -> Self {
        Self([0; 96])
    }
}

impl fmt::Display for SignatureBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_hex_string())
    }
}

impl fmt::Debug for SignatureBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_hex_string())
    }
}

impl Serialize for SignatureBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_hex_string())
    }
}

impl<'de> Deserialize<'de> for SignatureBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex_string = String::deserialize(deserializer)?;
        let bytes = hex::decode(hex_string.trim_start_matches("0x"))
            .map_err(|e| D::Error::custom(format!("invalid hex signature: {e}")))?;
        Self::from_slice(&bytes).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_to_epoch() {
        assert_eq!(Slot(0).epoch(32), Epoch(0));
        assert_eq!(Slot(31).epoch(32), Epoch(0));
        assert_eq!(Slot(32).epoch(32), Epoch(1));
        assert_eq!(Slot(100).epoch(32), Epoch(3));
    }

    #[test]
    fn epoch_tree_hash_is_little_endian_leaf() {
        let root = Epoch(5).tree_hash_root();
        let mut expected = [0u8; 32];
        expected[0] = 5;
        assert_eq!(root.as_bytes(), &expected);
    }

    #[test]
    fn pubkey_hex_round_trip() {
        let key = PublicKeyBytes::new([0xab; 48]);
        let encoded = serde_json::to_string(&key).unwrap();
        assert!(encoded.starts_with("\"0xabab"));
        let decoded: PublicKeyBytes = serde_json::from_str(&encoded).unwrap();
        assert_eq!(key, decoded);
    }

    #[test]
    fn pubkey_rejects_bad_length() {
        assert!(PublicKeyBytes::from_slice(&[0; 47]).is_err());
        assert!(SignatureBytes::from_slice(&[0; 95]).is_err());
    }
}
