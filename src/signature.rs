// Copyright (c) 2024, The Tari Project
// SPDX-License-Identifier: BSD-3-Clause

use alloc::vec::Vec;

use curve25519_dalek::{ristretto::CompressedRistretto, RistrettoPoint, Scalar};
use snafu::prelude::*;

use crate::{
    domains,
    ring::{MAX_DIMENSION, POINT_BYTES},
};

// Size of a canonical scalar encoding
pub(crate) const SCALAR_BYTES: usize = 32;

/// An MLSAG signature.
///
/// A signature consists of the challenge recorded at ring index 0, one key image per ring layer, and a response
/// matrix matching the ring dimensions. It reveals nothing about which ring row produced it.
///
/// The fields maintain a shape invariant: the response matrix is rectangular, with one column per key image. The
/// invariant is established at construction and never changes, since signatures are immutable.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Signature {
    c: Scalar,
    key_images: Vec<RistrettoPoint>,
    responses: Vec<Vec<Scalar>>,
}

/// Errors that can arise relating to [`Signature`].
#[derive(Debug, Snafu)]
pub enum SignatureError {
    /// A dimension exceeded the serialization limit.
    #[snafu(display("A signature dimension exceeded 255 elements"))]
    TooManyElements,
    /// The input ended before a field could be read.
    #[snafu(display("The input was truncated"))]
    TruncatedInput,
    /// A decoded scalar was out of canonical range, or a decoded point failed to decompress.
    #[snafu(display("An encoded field element was invalid"))]
    InvalidFieldElement,
    /// The signature was structurally invalid.
    #[snafu(display("The signature was malformed: {reason}"))]
    MalformedSignature {
        /// The reason the signature was rejected.
        reason: &'static str,
    },
}

impl Signature {
    /// Generate a new [`Signature`] from its components.
    ///
    /// The response matrix `responses` must be rectangular and nonempty, with one column per element of
    /// `key_images`. If this is not the case, returns a [`SignatureError`].
    ///
    /// Signatures are normally produced by [`Mlsag::sign`](`crate::scheme::Mlsag::sign`); this constructor exists so
    /// that externally-assembled components can be formed into a signature for verification.
    pub fn new(
        c: Scalar,
        key_images: Vec<RistrettoPoint>,
        responses: Vec<Vec<Scalar>>,
    ) -> Result<Self, SignatureError> {
        if key_images.is_empty() {
            return Err(SignatureError::MalformedSignature {
                reason: "the signature has no key images",
            });
        }
        if responses.is_empty() {
            return Err(SignatureError::MalformedSignature {
                reason: "the signature has no response rows",
            });
        }
        if responses.iter().any(|row| row.len() != key_images.len()) {
            return Err(SignatureError::MalformedSignature {
                reason: "the response matrix does not have one column per key image",
            });
        }

        Ok(Self {
            c,
            key_images,
            responses,
        })
    }

    /// Get the challenge recorded at ring index 0 from this [`Signature`].
    pub fn get_c(&self) -> &Scalar {
        &self.c
    }

    /// Get the key images from this [`Signature`], one per ring layer.
    pub fn get_key_images(&self) -> &[RistrettoPoint] {
        &self.key_images
    }

    /// Get the response matrix from this [`Signature`].
    pub fn get_responses(&self) -> &[Vec<Scalar>] {
        &self.responses
    }

    /// Serialize the [`Signature`] to a canonical byte array.
    ///
    /// The layout is a format tag, the challenge preceded by its length tag, the key images preceded by a count byte,
    /// and the response matrix preceded by its dimensions, all using fixed 32-byte element encodings. Returns a
    /// [`SignatureError`] if any dimension exceeds 255.
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_bytes(&self) -> Result<Vec<u8>, SignatureError> {
        let n = self.responses.len();
        let m = self.key_images.len();
        if n > MAX_DIMENSION || m > MAX_DIMENSION {
            return Err(SignatureError::TooManyElements);
        }

        let mut bytes = Vec::with_capacity(2 + SCALAR_BYTES + 1 + m * POINT_BYTES + 2 + n * m * SCALAR_BYTES);
        bytes.push(domains::SIGNATURE_TAG);
        bytes.push(SCALAR_BYTES as u8);
        bytes.extend_from_slice(self.c.as_bytes());
        // These casts cannot truncate, since both dimensions are bounded by 255
        bytes.push(m as u8);
        for image in &self.key_images {
            bytes.extend_from_slice(image.compress().as_bytes());
        }
        bytes.push(n as u8);
        bytes.push(m as u8);
        for row in &self.responses {
            for response in row {
                bytes.extend_from_slice(response.as_bytes());
            }
        }

        Ok(bytes)
    }

    /// Deserialize a [`Signature`] from a canonical byte slice.
    ///
    /// Bounds are checked strictly at every step, every scalar must be in canonical range, and every point must
    /// decompress to a valid group element; the encoding must be consumed exactly. If any of these conditions is not
    /// met, returns a [`SignatureError`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignatureError> {
        let mut reader = SliceReader { bytes };

        if reader.take_byte()? != domains::SIGNATURE_TAG {
            return Err(SignatureError::MalformedSignature {
                reason: "unexpected format tag",
            });
        }
        if usize::from(reader.take_byte()?) != SCALAR_BYTES {
            return Err(SignatureError::MalformedSignature {
                reason: "the challenge length tag must be 32",
            });
        }
        let c = read_scalar(&mut reader)?;

        let image_count = usize::from(reader.take_byte()?);
        if image_count == 0 {
            return Err(SignatureError::MalformedSignature {
                reason: "the signature has no key images",
            });
        }
        let mut key_images = Vec::with_capacity(image_count);
        for _ in 0..image_count {
            key_images.push(read_point(&mut reader)?);
        }

        let n = usize::from(reader.take_byte()?);
        let m = usize::from(reader.take_byte()?);
        if n == 0 {
            return Err(SignatureError::MalformedSignature {
                reason: "the signature has no response rows",
            });
        }
        if m != image_count {
            return Err(SignatureError::MalformedSignature {
                reason: "the response matrix does not have one column per key image",
            });
        }
        let mut responses = Vec::with_capacity(n);
        for _ in 0..n {
            let mut row = Vec::with_capacity(m);
            for _ in 0..m {
                row.push(read_scalar(&mut reader)?);
            }
            responses.push(row);
        }

        if !reader.bytes.is_empty() {
            return Err(SignatureError::MalformedSignature {
                reason: "the encoding has trailing input",
            });
        }

        Ok(Self {
            c,
            key_images,
            responses,
        })
    }
}

// Incremental bounds-checked reads over an input slice
struct SliceReader<'a> {
    bytes: &'a [u8],
}

impl<'a> SliceReader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8], SignatureError> {
        if self.bytes.len() < len {
            return Err(SignatureError::TruncatedInput);
        }
        let (head, tail) = self.bytes.split_at(len);
        self.bytes = tail;

        Ok(head)
    }

    fn take_byte(&mut self) -> Result<u8, SignatureError> {
        Ok(self.take(1)?[0])
    }
}

fn read_scalar(reader: &mut SliceReader) -> Result<Scalar, SignatureError> {
    let bytes: [u8; SCALAR_BYTES] = reader
        .take(SCALAR_BYTES)?
        .try_into()
        .map_err(|_| SignatureError::InvalidFieldElement)?;

    Option::from(Scalar::from_canonical_bytes(bytes)).ok_or(SignatureError::InvalidFieldElement)
}

fn read_point(reader: &mut SliceReader) -> Result<RistrettoPoint, SignatureError> {
    CompressedRistretto::from_slice(reader.take(POINT_BYTES)?)
        .ok()
        .and_then(|compressed| compressed.decompress())
        .ok_or(SignatureError::InvalidFieldElement)
}

#[cfg(feature = "borsh")]
impl borsh::BorshSerialize for Signature {
    fn serialize<W: borsh::io::Write>(&self, writer: &mut W) -> borsh::io::Result<()> {
        let bytes = self
            .to_bytes()
            .map_err(|_| borsh::io::Error::new(borsh::io::ErrorKind::InvalidData, "the signature could not be serialized"))?;

        writer.write_all(&bytes)
    }
}

#[cfg(feature = "borsh")]
impl borsh::BorshDeserialize for Signature {
    #[allow(clippy::arithmetic_side_effects)]
    fn deserialize_reader<R: borsh::io::Read>(reader: &mut R) -> borsh::io::Result<Self> {
        fn take<R: borsh::io::Read>(reader: &mut R, len: usize) -> borsh::io::Result<Vec<u8>> {
            let mut buffer = alloc::vec![0u8; len];
            reader.read_exact(&mut buffer)?;

            Ok(buffer)
        }

        // The encoding is self-describing, so parse the counts as they stream in; all are bounded by 255
        let mut bytes = take(reader, 2)?;
        let c_len = usize::from(bytes[1]);
        bytes.extend_from_slice(&take(reader, c_len + 1)?);
        let image_count = usize::from(bytes[1 + c_len + 1]);
        bytes.extend_from_slice(&take(reader, image_count * POINT_BYTES + 2)?);
        let n = usize::from(bytes[bytes.len() - 2]);
        let m = usize::from(bytes[bytes.len() - 1]);
        bytes.extend_from_slice(&take(reader, n * m * SCALAR_BYTES)?);

        Self::from_bytes(&bytes)
            .map_err(|_| borsh::io::Error::new(borsh::io::ErrorKind::InvalidData, "the signature could not be deserialized"))
    }
}
