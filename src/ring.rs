// Copyright (c) 2024, The Tari Project
// SPDX-License-Identifier: BSD-3-Clause

use alloc::vec::Vec;

use curve25519_dalek::{ristretto::CompressedRistretto, RistrettoPoint};
use snafu::prelude::*;

use crate::domains;

// Size of a compressed group element
pub(crate) const POINT_BYTES: usize = 32;

// Rings are dimensioned with single bytes when serialized
pub(crate) const MAX_DIMENSION: usize = u8::MAX as usize;

/// A ring of candidate verification keys.
///
/// A ring is a rectangular matrix of group elements: each row is a candidate ring member, and each column is a key
/// layer. The row holding the signer's verification keys is indistinguishable from the decoy rows.
///
/// Construction performs no validation, since the full shape requirements depend on the consumer; every consumer
/// re-validates the shape before use.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Ring {
    keys: Vec<Vec<RistrettoPoint>>,
}

/// Errors that can arise relating to [`Ring`].
#[derive(Debug, Snafu)]
pub enum RingError {
    /// The ring was structurally invalid.
    #[snafu(display("The ring was malformed: {reason}"))]
    MalformedRing {
        /// The reason the ring was rejected.
        reason: &'static str,
    },
}

impl Ring {
    /// Generate a new [`Ring`] from a matrix of verification keys.
    ///
    /// The matrix must be rectangular with `1 <= n <= 255` rows and `1 <= m <= 255` columns, but this is not checked
    /// here; serialization and the signing and verification routines reject invalid shapes.
    pub fn new(keys: Vec<Vec<RistrettoPoint>>) -> Self {
        Self { keys }
    }

    /// Get the verification key matrix for this [`Ring`].
    pub fn get_keys(&self) -> &[Vec<RistrettoPoint>] {
        &self.keys
    }

    /// Check the ring shape, returning the dimensions `(n, m)`.
    pub(crate) fn check_shape(&self) -> Result<(usize, usize), RingError> {
        let n = self.keys.len();
        if n == 0 {
            return Err(RingError::MalformedRing {
                reason: "the ring has no rows",
            });
        }
        if n > MAX_DIMENSION {
            return Err(RingError::MalformedRing {
                reason: "the ring has more than 255 rows",
            });
        }

        let m = self.keys[0].len();
        if m == 0 {
            return Err(RingError::MalformedRing {
                reason: "the ring has no layers",
            });
        }
        if m > MAX_DIMENSION {
            return Err(RingError::MalformedRing {
                reason: "the ring has more than 255 layers",
            });
        }
        if self.keys.iter().any(|row| row.len() != m) {
            return Err(RingError::MalformedRing {
                reason: "the ring is not rectangular",
            });
        }

        Ok((n, m))
    }

    /// Serialize the [`Ring`] to a canonical byte array.
    ///
    /// The layout is a format tag, the dimensions `n` and `m` as single bytes, and the compressed keys in row-major
    /// order. Returns a [`RingError`] if the ring is empty, not rectangular, or exceeds 255 rows or layers.
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_bytes(&self) -> Result<Vec<u8>, RingError> {
        let (n, m) = self.check_shape()?;

        let mut bytes = Vec::with_capacity(3 + n * m * POINT_BYTES);
        bytes.push(domains::RING_TAG);
        // These casts cannot truncate, since the shape check bounds both dimensions by 255
        bytes.push(n as u8);
        bytes.push(m as u8);
        for row in &self.keys {
            for key in row {
                bytes.extend_from_slice(key.compress().as_bytes());
            }
        }

        Ok(bytes)
    }

    /// Deserialize a [`Ring`] from a canonical byte slice.
    ///
    /// Returns a [`RingError`] on a format tag mismatch, if the length does not match the encoded dimensions exactly,
    /// or if any key fails to decompress to a valid group element.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RingError> {
        if bytes.len() < 3 {
            return Err(RingError::MalformedRing {
                reason: "the encoding is too short",
            });
        }
        if bytes[0] != domains::RING_TAG {
            return Err(RingError::MalformedRing {
                reason: "unexpected format tag",
            });
        }

        let n = bytes[1] as usize;
        let m = bytes[2] as usize;
        if n == 0 || m == 0 {
            return Err(RingError::MalformedRing {
                reason: "the ring has a zero dimension",
            });
        }
        // This cannot overflow, since both dimensions are bounded by 255
        if bytes.len() != 3 + n * m * POINT_BYTES {
            return Err(RingError::MalformedRing {
                reason: "the encoding length does not match the ring dimensions",
            });
        }

        let mut points = Vec::with_capacity(n * m);
        for chunk in bytes[3..].chunks_exact(POINT_BYTES) {
            let point = CompressedRistretto::from_slice(chunk)
                .ok()
                .and_then(|compressed| compressed.decompress())
                .ok_or(RingError::MalformedRing {
                    reason: "a key failed to decompress",
                })?;
            points.push(point);
        }

        Ok(Self {
            keys: points.chunks_exact(m).map(<[RistrettoPoint]>::to_vec).collect(),
        })
    }
}
