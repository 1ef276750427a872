use sha1::{Digest, Sha1};

/// Returns whether `data` hashes to `expected_hash` under SHA-1.
///
/// Compares raw 20-byte digests rather than hex strings; the caller owns
/// the byte slices straight out of the metainfo file.
pub fn verify_piece(data: &[u8], expected_hash: &[u8; 20]) -> bool {
    let digest = Sha1::digest(data);
    digest.as_slice() == expected_hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_matching_data() {
        let data = b"the quick brown fox".to_vec();
        let hash: [u8; 20] = Sha1::digest(&data).into();

        assert!(verify_piece(&data, &hash));
    }

    #[test]
    fn rejects_corrupted_data() {
        let data = b"the quick brown fox".to_vec();
        let hash: [u8; 20] = Sha1::digest(&data).into();

        let mut corrupted = data;
        corrupted[0] ^= 0xFF;

        assert!(!verify_piece(&corrupted, &hash));
    }
}
