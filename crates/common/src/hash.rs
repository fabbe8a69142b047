use sha2::{Digest, Sha256};

/// SHA-256 digest of the provided bytes.
///
/// Soroban identifies installed contract code by the SHA-256 hash of the WASM blob.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}
