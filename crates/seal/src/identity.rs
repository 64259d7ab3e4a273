use rand::RngCore;

use crate::error::{Result, SealError};

/// Nonce size appended to the album id bytes when deriving an identity.
pub const NONCE_LEN: usize = 5;

/// Derive a per-content encryption identity from an album id and a nonce.
///
/// The identity is the hex encoding of the album id's raw bytes followed by
/// the nonce bytes. Every content item under an album must use a fresh nonce
/// so that no two items share an identity.
pub fn derive_identity(album_id: &str, nonce: &[u8; NONCE_LEN]) -> Result<String> {
    let raw = album_id.strip_prefix("0x").unwrap_or(album_id);
    let mut bytes = hex::decode(raw).map_err(|e| SealError::InvalidAlbumId {
        id: album_id.to_string(),
        reason: e.to_string(),
    })?;
    bytes.extend_from_slice(nonce);
    Ok(hex::encode(bytes))
}

/// Derive an identity with a freshly drawn random nonce.
pub fn fresh_identity(album_id: &str) -> Result<String> {
    let mut nonce = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce);
    derive_identity(album_id, &nonce)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const ALBUM: &str = "0xa1b2c3d4e5f60718291a2b3c4d5e6f708192a3b4c5d6e7f8091a2b3c4d5e6f70";

    #[test]
    fn identity_is_album_bytes_plus_nonce() {
        let identity = derive_identity(ALBUM, &[1, 2, 3, 4, 5]).unwrap();
        assert!(identity.starts_with(&ALBUM[2..]));
        assert!(identity.ends_with("0102030405"));
        assert_eq!(identity.len(), ALBUM.len() - 2 + NONCE_LEN * 2);
    }

    #[test]
    fn prefix_is_optional() {
        let with = derive_identity(ALBUM, &[9; 5]).unwrap();
        let without = derive_identity(&ALBUM[2..], &[9; 5]).unwrap();
        assert_eq!(with, without);
    }

    #[test]
    fn malformed_album_id_is_rejected() {
        let err = derive_identity("not-hex", &[0; 5]).unwrap_err();
        assert!(matches!(err, SealError::InvalidAlbumId { .. }));
    }

    #[test]
    fn no_collision_in_ten_thousand_trials() {
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            let identity = fresh_identity(ALBUM).unwrap();
            assert!(seen.insert(identity), "identity collision within one album");
        }
    }
}
