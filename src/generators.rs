// Copyright (c) 2024, The Tari Project
// SPDX-License-Identifier: BSD-3-Clause

//! The scheme uses two fixed generators of the Ristretto group.
//!
//! The standard base point `G` defines spend-authority verification keys.
//! The commitment base `T` defines the trailing balance layer (or layers, for the confidential-asset variant) of each
//! ring row; it is derived by hashing, so no discrete logarithm relationship to `G` is known.
//!
//! Both generators are process-wide constants: they are pure functions of fixed domain separators and evaluate to the
//! same group element in every call.

use blake3::Hasher;
use curve25519_dalek::{constants::RISTRETTO_BASEPOINT_POINT, RistrettoPoint};

use crate::domains;

/// Get the standard base point `G`.
///
/// This is the generator used for defining spend-authority verification keys.
pub fn basepoint() -> RistrettoPoint {
    RISTRETTO_BASEPOINT_POINT
}

/// Get the commitment base `T`.
///
/// This is the generator used for defining the balance layers of a ring.
/// Callers that build commitments intended to cancel across a ring row must use this generator for masks.
#[allow(non_snake_case)]
pub fn commitment_basepoint() -> RistrettoPoint {
    // Use `BLAKE3` to generate `T`
    let mut T_bytes = [0u8; 64];
    let mut hasher = Hasher::new();
    hasher.update(domains::POINT_COMMITMENT_BASE.as_bytes());
    hasher.finalize_xof().fill(&mut T_bytes);

    RistrettoPoint::from_uniform_bytes(&T_bytes)
}

#[cfg(test)]
mod test {
    use curve25519_dalek::traits::Identity;

    use super::*;

    #[test]
    fn test_commitment_basepoint() {
        let basepoint = basepoint();
        let commitment_basepoint = commitment_basepoint();

        // The generators must be distinct and nontrivial
        assert_ne!(commitment_basepoint, basepoint);
        assert_ne!(commitment_basepoint, RistrettoPoint::identity());

        // Derivation is deterministic
        assert_eq!(commitment_basepoint, super::commitment_basepoint());
    }
}
