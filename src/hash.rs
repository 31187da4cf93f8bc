// Copyright (c) 2024, The Tari Project
// SPDX-License-Identifier: BSD-3-Clause

use blake3::Hasher;
use curve25519_dalek::{RistrettoPoint, Scalar};

use crate::domains;

/// Hash input bytes to a group element under a domain separator.
///
/// Uses `BLAKE3` in extended-output mode so the resulting 64 bytes are mapped uniformly onto the group.
pub(crate) fn hash_to_point(domain: &str, data: &[u8]) -> RistrettoPoint {
    let mut bytes = [0u8; 64];
    let mut hasher = Hasher::new();
    hasher.update(domain.as_bytes());
    hasher.update(data);
    hasher.finalize_xof().fill(&mut bytes);

    RistrettoPoint::from_uniform_bytes(&bytes)
}

/// Start a domain-separated hasher binding the protocol version and a message digest.
///
/// Challenge terms are appended to the result before finalizing with [`finalize_scalar`].
pub(crate) fn challenge_hasher(domain: &str, message: &[u8]) -> Hasher {
    let mut hasher = Hasher::new();
    hasher.update(domain.as_bytes());
    hasher.update(&domains::VERSION.to_le_bytes());
    hasher.update(message);

    hasher
}

/// Finalize a hasher into a scalar using wide reduction.
pub(crate) fn finalize_scalar(hasher: &Hasher) -> Scalar {
    let mut bytes = [0u8; 64];
    hasher.finalize_xof().fill(&mut bytes);

    Scalar::from_bytes_mod_order_wide(&bytes)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_hash_to_point_domains() {
        // The same input under distinct domains must map to distinct group elements
        let input = b"input";
        assert_ne!(
            hash_to_point(domains::HASH_KEY_IMAGE, input),
            hash_to_point(domains::HASH_CHALLENGE, input)
        );

        // Determinism
        assert_eq!(
            hash_to_point(domains::HASH_KEY_IMAGE, input),
            hash_to_point(domains::HASH_KEY_IMAGE, input)
        );
    }

    #[test]
    fn test_challenge_scalar() {
        let mut hasher = challenge_hasher(domains::HASH_CHALLENGE, &[0u8; 32]);
        let c = finalize_scalar(&hasher);

        // Appending data must change the result
        hasher.update(b"term");
        assert_ne!(c, finalize_scalar(&hasher));

        // The variant domains must be separated
        let hasher_ca = challenge_hasher(domains::HASH_CHALLENGE_CA, &[0u8; 32]);
        assert_ne!(c, finalize_scalar(&hasher_ca));
    }
}
