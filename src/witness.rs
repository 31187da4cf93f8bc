// Copyright (c) 2024, The Tari Project
// SPDX-License-Identifier: BSD-3-Clause

use alloc::vec::Vec;

use curve25519_dalek::Scalar;
use rand_core::CryptoRngCore;
use snafu::prelude::*;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::ring::MAX_DIMENSION;

/// An MLSAG witness.
///
/// The witness consists of one private key per ring layer and the index of the ring row where the corresponding
/// verification keys appear. It is the secret half of a signing operation: it is held only in memory, never
/// serialized, and zeroized on drop.
///
/// Verification keys and key images are derived from a witness by a scheme variant, since the two variants bind
/// different trailing layers to the commitment base; see [`Mlsag`](`crate::scheme::Mlsag`).
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Witness {
    l: u32,
    keys: Vec<Scalar>,
}

/// Errors that can arise relating to [`Witness`].
#[derive(Debug, Snafu)]
pub enum WitnessError {
    /// An invalid parameter was provided.
    #[snafu(display("An invalid parameter was provided: {reason}"))]
    InvalidParameter {
        /// The reason for the parameter error.
        reason: &'static str,
    },
}

impl Witness {
    /// Generate a new [`Witness`] from secret data.
    ///
    /// The private keys `keys` must be nonzero, with one key per layer up to 255 layers, and the ring index `l` must
    /// be valid for some serializable ring. If any of these conditions is not met, returns a [`WitnessError`].
    ///
    /// If you'd like a [`Witness`] generated securely for you, use [`Witness::random`] instead.
    pub fn new(l: u32, keys: &[Scalar]) -> Result<Self, WitnessError> {
        if keys.is_empty() {
            return Err(WitnessError::InvalidParameter {
                reason: "`keys` was empty",
            });
        }
        if keys.len() > MAX_DIMENSION {
            return Err(WitnessError::InvalidParameter {
                reason: "`keys` had more than 255 layers",
            });
        }
        if keys.contains(&Scalar::ZERO) {
            return Err(WitnessError::InvalidParameter {
                reason: "a key was zero",
            });
        }
        if l as usize >= MAX_DIMENSION {
            return Err(WitnessError::InvalidParameter {
                reason: "`l` exceeded the maximum ring size",
            });
        }

        Ok(Self {
            l,
            keys: keys.to_vec(),
        })
    }

    /// Generate a new random [`Witness`].
    ///
    /// You must provide the intended ring size, the number of key layers, and a [`CryptoRngCore`] random number
    /// generator `rng`. This will generate a [`Witness`] with cryptographically-secure private keys and a random ring
    /// index. Both dimensions must be between 1 and 255.
    ///
    /// If you'd rather provide your own secret data, use [`Witness::new`] instead.
    #[allow(clippy::cast_possible_truncation)]
    pub fn random<R: CryptoRngCore>(ring_size: u32, layers: u32, rng: &mut R) -> Result<Self, WitnessError> {
        if ring_size == 0 || ring_size as usize > MAX_DIMENSION {
            return Err(WitnessError::InvalidParameter {
                reason: "`ring_size` must be between 1 and 255",
            });
        }
        if layers == 0 || layers as usize > MAX_DIMENSION {
            return Err(WitnessError::InvalidParameter {
                reason: "`layers` must be between 1 and 255",
            });
        }

        // Generate a random index using wide reduction
        // This can't truncate since `ring_size` is bounded by `u32`
        // It is also defined since `ring_size > 0`
        #[allow(clippy::arithmetic_side_effects)]
        let l = (rng.as_rngcore().next_u64() % u64::from(ring_size)) as u32;

        Ok(Self {
            l,
            keys: (0..layers).map(|_| Scalar::random(rng)).collect(),
        })
    }

    /// Get the ring index from this [`Witness`].
    pub fn get_l(&self) -> u32 {
        self.l
    }

    /// Get the number of key layers from this [`Witness`].
    pub fn layers(&self) -> usize {
        self.keys.len()
    }

    /// Get the private keys from this [`Witness`].
    pub fn get_keys(&self) -> &[Scalar] {
        &self.keys
    }
}
