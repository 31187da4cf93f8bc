// Copyright (c) 2024, The Tari Project
// SPDX-License-Identifier: BSD-3-Clause

use alloc::{vec, vec::Vec};

use curve25519_dalek::{
    traits::{Identity, MultiscalarMul, VartimeMultiscalarMul},
    RistrettoPoint,
    Scalar,
};
use itertools::izip;
use rand_core::CryptoRngCore;
#[cfg(feature = "rand")]
use rand_core::OsRng;
use snafu::prelude::*;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::{
    domains,
    generators,
    hash::{challenge_hasher, finalize_scalar, hash_to_point},
    ring::{Ring, RingError, MAX_DIMENSION},
    signature::Signature,
    witness::Witness,
};

/// Errors that can arise when signing or verifying.
#[derive(Debug, Snafu)]
pub enum SchemeError {
    /// The message was not a fixed-size digest.
    #[snafu(display("The message must be a 32-byte digest"))]
    InvalidMessageLength,
    /// The ring was structurally invalid.
    #[snafu(display("The ring was malformed: {reason}"))]
    MalformedRing {
        /// The reason the ring was rejected.
        reason: &'static str,
    },
    /// Dimensions did not agree between the ring, witness, key images, or responses.
    #[snafu(display("A ring shape mismatch was found: {reason}"))]
    RingShapeMismatch {
        /// The mismatch that was found.
        reason: &'static str,
    },
}

impl From<RingError> for SchemeError {
    fn from(error: RingError) -> Self {
        match error {
            RingError::MalformedRing { reason } => Self::MalformedRing { reason },
        }
    }
}

mod sealed {
    /// Constants distinguishing the scheme variants.
    ///
    /// Implementing this trait is what makes a type a scheme variant; it is sealed so the two variants stay the only
    /// implementations and cannot have their parameters mixed.
    pub trait Sealed {
        /// The number of trailing ring layers bound to the commitment base.
        const COMMITMENT_LAYERS: usize;
        /// The domain separator for this variant's challenge chain.
        const CHALLENGE_DOMAIN: &'static str;
    }
}

/// The standard MLSAG variant.
///
/// The last ring layer is a value-balance layer bound to the commitment base; all preceding layers are
/// spend-authority layers paired with key images.
#[derive(Clone, Copy, Debug)]
pub struct Standard;

impl sealed::Sealed for Standard {
    const CHALLENGE_DOMAIN: &'static str = domains::HASH_CHALLENGE;
    const COMMITMENT_LAYERS: usize = 1;
}

/// The confidential-asset MLSAG variant.
///
/// The last two ring layers are balance layers bound to the commitment base: one conserving values and one conserving
/// blinded asset identifiers. All preceding layers are spend-authority layers paired with key images.
#[derive(Clone, Copy, Debug)]
pub struct ConfidentialAsset;

impl sealed::Sealed for ConfidentialAsset {
    const CHALLENGE_DOMAIN: &'static str = domains::HASH_CHALLENGE_CA;
    const COMMITMENT_LAYERS: usize = 2;
}

/// The MLSAG signing and verification capability, implemented by [`Standard`] and [`ConfidentialAsset`].
///
/// The two variants share the same control flow but bind a different number of trailing ring layers to the commitment
/// base and derive challenges under distinct domain separators, so their signatures are not interchangeable: a
/// signature produced by one variant fails verification under the other. Callers select the variant once and use it
/// for signing, verification, and key-image derivation together.
pub trait Mlsag: sealed::Sealed {
    /// Compute the verification keys for a [`Witness`], one per layer.
    ///
    /// Spend-authority layers use the standard base point; the trailing balance layer (or layers) use the commitment
    /// base. This is the row that [`Mlsag::random_ring`] places at the witness index.
    fn verification_keys(witness: &Witness) -> Vec<RistrettoPoint>;

    /// Derive the key images for a [`Witness`], one per layer.
    ///
    /// Each key image binds the corresponding private key to the exact verification key bytes, so the same secret
    /// always yields the same key image. Derivation is deterministic; the result is published in signatures and can
    /// be used externally for double-spend detection.
    fn derive_key_images(witness: &Witness) -> Vec<RistrettoPoint>;

    /// Generate a [`Ring`] of `ring_size` rows with the witness verification keys at the witness index.
    ///
    /// All other rows are filled with independently random group elements that act as decoys. The ring size must be
    /// between 1 and 255 and must exceed the witness index; if not, returns a [`SchemeError`].
    fn random_ring<R: CryptoRngCore>(witness: &Witness, ring_size: u32, rng: &mut R) -> Result<Ring, SchemeError>;

    /// Sign a 32-byte message digest `message` over `ring` using `witness`.
    ///
    /// This requires that the ring row at the witness index holds the witness verification keys; the signature will
    /// fail to verify otherwise. Returns a [`SchemeError`] if the message is not a 32-byte digest or if the witness
    /// and ring shapes disagree.
    ///
    /// This uses a cryptographically-secure random number generator internally.
    /// If you want to provide your own, use [`Mlsag::sign_with_rng`] instead.
    #[cfg(feature = "rand")]
    fn sign(witness: &Witness, ring: &Ring, message: &[u8]) -> Result<Signature, SchemeError>;

    /// Sign a 32-byte message digest `message` over `ring` using `witness` and a [`CryptoRngCore`] random number
    /// generator `rng`.
    ///
    /// This requires that the ring row at the witness index holds the witness verification keys; the signature will
    /// fail to verify otherwise. Returns a [`SchemeError`] if the message is not a 32-byte digest or if the witness
    /// and ring shapes disagree.
    fn sign_with_rng<R: CryptoRngCore>(
        witness: &Witness,
        ring: &Ring,
        message: &[u8],
        rng: &mut R,
    ) -> Result<Signature, SchemeError>;

    /// Sign a 32-byte message digest `message` over `ring` using `witness` and a [`CryptoRngCore`] random number
    /// generator `rng`, using variable-time operations.
    ///
    /// This is generally faster than [`Mlsag::sign_with_rng`], but produces timing variation related to the witness.
    /// You should only use this if you absolutely know what you're doing.
    #[cfg(feature = "hazmat")]
    fn sign_with_rng_vartime<R: CryptoRngCore>(
        witness: &Witness,
        ring: &Ring,
        message: &[u8],
        rng: &mut R,
    ) -> Result<Signature, SchemeError>;

    /// Verify `signature` against `ring` and a 32-byte message digest `message`.
    ///
    /// A structurally well-formed but invalid signature yields `Ok(false)`; a [`SchemeError`] is returned only for
    /// malformed inputs, such as a ring whose row count does not match the response matrix. Verification uses public
    /// data only, so it runs in variable time.
    fn verify(signature: &Signature, ring: &Ring, message: &[u8]) -> Result<bool, SchemeError>;
}

impl<S: sealed::Sealed> Mlsag for S {
    fn verification_keys(witness: &Witness) -> Vec<RistrettoPoint> {
        compute_verification_keys::<S>(witness)
    }

    fn derive_key_images(witness: &Witness) -> Vec<RistrettoPoint> {
        compute_key_images::<S>(witness)
    }

    fn random_ring<R: CryptoRngCore>(witness: &Witness, ring_size: u32, rng: &mut R) -> Result<Ring, SchemeError> {
        if ring_size == 0 || ring_size as usize > MAX_DIMENSION {
            return Err(SchemeError::MalformedRing {
                reason: "`ring_size` must be between 1 and 255",
            });
        }
        if witness.get_l() >= ring_size {
            return Err(SchemeError::RingShapeMismatch {
                reason: "the witness index exceeds the ring size",
            });
        }

        let layers = witness.layers();
        Ok(Ring::new(
            (0..ring_size)
                .map(|i| {
                    if i == witness.get_l() {
                        compute_verification_keys::<S>(witness)
                    } else {
                        (0..layers).map(|_| RistrettoPoint::random(rng)).collect()
                    }
                })
                .collect(),
        ))
    }

    #[cfg(feature = "rand")]
    fn sign(witness: &Witness, ring: &Ring, message: &[u8]) -> Result<Signature, SchemeError> {
        create_signature::<S, OsRng>(witness, ring, message, &mut OsRng, false)
    }

    fn sign_with_rng<R: CryptoRngCore>(
        witness: &Witness,
        ring: &Ring,
        message: &[u8],
        rng: &mut R,
    ) -> Result<Signature, SchemeError> {
        create_signature::<S, R>(witness, ring, message, rng, false)
    }

    #[cfg(feature = "hazmat")]
    fn sign_with_rng_vartime<R: CryptoRngCore>(
        witness: &Witness,
        ring: &Ring,
        message: &[u8],
        rng: &mut R,
    ) -> Result<Signature, SchemeError> {
        create_signature::<S, R>(witness, ring, message, rng, true)
    }

    fn verify(signature: &Signature, ring: &Ring, message: &[u8]) -> Result<bool, SchemeError> {
        verify_signature::<S>(signature, ring, message)
    }
}

/// Compute `a*A + b*B`, optionally in variable time.
#[allow(non_snake_case)]
fn mul2(vartime: bool, a: &Scalar, A: &RistrettoPoint, b: &Scalar, B: &RistrettoPoint) -> RistrettoPoint {
    if vartime {
        RistrettoPoint::vartime_multiscalar_mul([a, b], [A, B])
    } else {
        RistrettoPoint::multiscalar_mul([a, b], [A, B])
    }
}

/// Hash a verification key to the auxiliary base used for its key image.
fn key_image_base(key: &RistrettoPoint) -> RistrettoPoint {
    hash_to_point(domains::HASH_KEY_IMAGE, key.compress().as_bytes())
}

fn compute_verification_keys<S: sealed::Sealed>(witness: &Witness) -> Vec<RistrettoPoint> {
    let split = witness.layers().saturating_sub(S::COMMITMENT_LAYERS);
    #[allow(non_snake_case)]
    let G = generators::basepoint();
    #[allow(non_snake_case)]
    let T = generators::commitment_basepoint();

    witness
        .get_keys()
        .iter()
        .enumerate()
        .map(|(j, key)| if j < split { key * G } else { key * T })
        .collect()
}

fn compute_key_images<S: sealed::Sealed>(witness: &Witness) -> Vec<RistrettoPoint> {
    compute_verification_keys::<S>(witness)
        .iter()
        .zip(witness.get_keys())
        .map(|(public, key)| key * key_image_base(public))
        .collect()
}

/// Check that the layer count supports the variant's trailing balance layers.
fn check_layers<S: sealed::Sealed>(m: usize) -> Result<(), SchemeError> {
    if m < S::COMMITMENT_LAYERS {
        return Err(SchemeError::RingShapeMismatch {
            reason: "the ring has fewer layers than the variant requires",
        });
    }

    Ok(())
}

/// Compute the challenge for the row after the signer from the signer's nonce commitments.
///
/// Spend-authority layers contribute a base-point term and a key-image-base term; balance layers contribute a single
/// commitment-base term, since they have no key-image pairing.
#[allow(non_snake_case)]
fn first_challenge<S: sealed::Sealed>(
    message: &[u8],
    alpha: &[Scalar],
    signer_row: &[RistrettoPoint],
    T: &RistrettoPoint,
) -> Scalar {
    let split = alpha.len().saturating_sub(S::COMMITMENT_LAYERS);
    let G = generators::basepoint();

    let mut hasher = challenge_hasher(S::CHALLENGE_DOMAIN, message);
    for (alpha_j, key) in alpha.iter().zip(signer_row).take(split) {
        hasher.update((alpha_j * G).compress().as_bytes());
        hasher.update((alpha_j * key_image_base(key)).compress().as_bytes());
    }
    for alpha_j in &alpha[split..] {
        hasher.update((alpha_j * T).compress().as_bytes());
    }

    finalize_scalar(&hasher)
}

/// Compute the challenge for the row after row `i` from row `i`'s responses and challenge.
#[allow(non_snake_case)]
fn next_challenge<S: sealed::Sealed>(
    message: &[u8],
    responses: &[Scalar],
    c: &Scalar,
    row: &[RistrettoPoint],
    key_images: &[RistrettoPoint],
    T: &RistrettoPoint,
    vartime: bool,
) -> Result<Scalar, SchemeError> {
    let m = row.len();
    if responses.len() != m {
        return Err(SchemeError::RingShapeMismatch {
            reason: "a response row does not match the ring layers",
        });
    }
    if key_images.len() != m {
        return Err(SchemeError::RingShapeMismatch {
            reason: "the key images do not match the ring layers",
        });
    }
    let split = m.saturating_sub(S::COMMITMENT_LAYERS);
    let G = generators::basepoint();

    let mut hasher = challenge_hasher(S::CHALLENGE_DOMAIN, message);
    for (response, key, image) in izip!(responses, row, key_images).take(split) {
        hasher.update(mul2(vartime, response, &G, c, key).compress().as_bytes());
        hasher.update(mul2(vartime, response, &key_image_base(key), c, image).compress().as_bytes());
    }
    for (response, key) in responses[split..].iter().zip(&row[split..]) {
        hasher.update(mul2(vartime, response, T, c, key).compress().as_bytes());
    }

    Ok(finalize_scalar(&hasher))
}

#[allow(non_snake_case, clippy::arithmetic_side_effects)]
fn create_signature<S: sealed::Sealed, R: CryptoRngCore>(
    witness: &Witness,
    ring: &Ring,
    message: &[u8],
    rng: &mut R,
    vartime: bool,
) -> Result<Signature, SchemeError> {
    if message.len() != domains::MESSAGE_BYTES {
        return Err(SchemeError::InvalidMessageLength);
    }
    let (n, m) = ring.check_shape()?;
    check_layers::<S>(m)?;
    if witness.layers() != m {
        return Err(SchemeError::RingShapeMismatch {
            reason: "the witness does not match the ring layers",
        });
    }
    let l = witness.get_l() as usize;
    if l >= n {
        return Err(SchemeError::RingShapeMismatch {
            reason: "the witness index exceeds the ring size",
        });
    }

    let T = generators::commitment_basepoint();
    let keys = ring.get_keys();
    let key_images = compute_key_images::<S>(witness);

    // Per-signature nonces; these must be fresh for every signature, since nonce reuse across two messages leaks the
    // private keys through the linear responses
    let alpha = Zeroizing::new((0..m).map(|_| Scalar::random(rng)).collect::<Vec<Scalar>>());

    let mut responses = vec![vec![Scalar::ZERO; m]; n];
    let mut challenges = vec![Scalar::ZERO; n];

    // Walk the ring cyclically from the row after the signer, assigning each position's challenge from the previous
    // one; the walk ends by assigning the signer's own challenge, which closes the ring
    let mut i = (l + 1) % n;
    let mut c = first_challenge::<S>(message, &alpha, &keys[l], &T);
    challenges[i] = c;
    while i != l {
        for response in &mut responses[i] {
            *response = Scalar::random(rng);
        }
        c = next_challenge::<S>(message, &responses[i], &c, &keys[i], &key_images, &T, vartime)?;
        i = (i + 1) % n;
        challenges[i] = c;
    }

    // Close the ring at the signer row with Schnorr-style responses
    for (response, alpha_j, key) in izip!(responses[l].iter_mut(), alpha.iter(), witness.get_keys()) {
        *response = alpha_j - challenges[l] * key;
    }

    // The anchor challenge is the one assigned to ring index 0, which hides the signer index
    Signature::new(challenges[0], key_images, responses).map_err(|_| SchemeError::RingShapeMismatch {
        reason: "the signature components were inconsistent",
    })
}

/// Check that every key image can serve as a linkability tag.
///
/// This check is shared by both scheme variants. Decompression only produces group elements of prime order, so what
/// remains is rejecting the identity, which the zero key would produce and which would link to every other use.
fn key_images_valid(key_images: &[RistrettoPoint]) -> bool {
    let identity = RistrettoPoint::identity();
    !key_images.is_empty() && key_images.iter().all(|image| *image != identity)
}

fn verify_signature<S: sealed::Sealed>(signature: &Signature, ring: &Ring, message: &[u8]) -> Result<bool, SchemeError> {
    if message.len() != domains::MESSAGE_BYTES {
        return Err(SchemeError::InvalidMessageLength);
    }
    let (n, m) = ring.check_shape()?;
    check_layers::<S>(m)?;
    if signature.get_responses().len() != n {
        return Err(SchemeError::MalformedRing {
            reason: "the ring and response row counts do not match",
        });
    }
    let key_images = signature.get_key_images();
    if key_images.len() != m {
        return Err(SchemeError::RingShapeMismatch {
            reason: "the key images do not match the ring layers",
        });
    }

    if !key_images_valid(key_images) {
        return Ok(false);
    }

    #[allow(non_snake_case)]
    let T = generators::commitment_basepoint();

    // Rebuild the challenge chain once through all rows from the anchor at index 0; the signature is valid exactly
    // when the chain closes back onto the anchor
    let mut c = *signature.get_c();
    for (row, row_responses) in izip!(ring.get_keys(), signature.get_responses()) {
        c = next_challenge::<S>(message, row_responses, &c, row, key_images, &T, true)?;
    }

    Ok(bool::from(c.ct_eq(signature.get_c())))
}

#[cfg(test)]
mod test {
    use rand_chacha::ChaCha12Rng;
    use rand_core::SeedableRng;

    use super::*;

    const MESSAGE: [u8; 32] = [0x2a; 32];

    // Generate a witness with a chosen ring index
    fn random_witness<R: CryptoRngCore>(l: u32, layers: u32, rng: &mut R) -> Witness {
        let keys = (0..layers).map(|_| Scalar::random(rng)).collect::<Vec<Scalar>>();

        Witness::new(l, &keys).unwrap()
    }

    #[test]
    fn test_sign_verify() {
        let mut rng = ChaCha12Rng::seed_from_u64(8675309);

        // Ring of three rows and two layers, with the signer at row 1
        let witness = random_witness(1, 2, &mut rng);
        let ring = Standard::random_ring(&witness, 3, &mut rng).unwrap();
        let signature = Standard::sign_with_rng(&witness, &ring, &MESSAGE, &mut rng).unwrap();
        assert!(Standard::verify(&signature, &ring, &MESSAGE).unwrap());

        // Incrementing a single response must break the chain
        let mut responses = signature.get_responses().to_vec();
        responses[0][0] += Scalar::ONE;
        let evil = Signature::new(*signature.get_c(), signature.get_key_images().to_vec(), responses).unwrap();
        assert!(!Standard::verify(&evil, &ring, &MESSAGE).unwrap());
    }

    #[test]
    fn test_sign_verify_every_index() {
        let mut rng = ChaCha12Rng::seed_from_u64(8675309);

        for l in 0..5 {
            let witness = random_witness(l, 3, &mut rng);
            let ring = Standard::random_ring(&witness, 5, &mut rng).unwrap();
            let signature = Standard::sign_with_rng(&witness, &ring, &MESSAGE, &mut rng).unwrap();
            assert!(Standard::verify(&signature, &ring, &MESSAGE).unwrap());
        }
    }

    #[test]
    fn test_degenerate_ring() {
        let mut rng = ChaCha12Rng::seed_from_u64(8675309);

        // A ring of one row has no decoys, but must still close
        let witness = random_witness(0, 2, &mut rng);
        let ring = Standard::random_ring(&witness, 1, &mut rng).unwrap();
        let signature = Standard::sign_with_rng(&witness, &ring, &MESSAGE, &mut rng).unwrap();
        assert!(Standard::verify(&signature, &ring, &MESSAGE).unwrap());
    }

    #[test]
    fn test_wrong_message() {
        let mut rng = ChaCha12Rng::seed_from_u64(8675309);

        let witness = random_witness(2, 2, &mut rng);
        let ring = Standard::random_ring(&witness, 4, &mut rng).unwrap();
        let signature = Standard::sign_with_rng(&witness, &ring, &MESSAGE, &mut rng).unwrap();

        assert!(!Standard::verify(&signature, &ring, &[0x2b; 32]).unwrap());
    }

    #[test]
    fn test_mutations_fail() {
        let mut rng = ChaCha12Rng::seed_from_u64(8675309);

        let witness = random_witness(0, 2, &mut rng);
        let ring = Standard::random_ring(&witness, 3, &mut rng).unwrap();
        let signature = Standard::sign_with_rng(&witness, &ring, &MESSAGE, &mut rng).unwrap();

        // Mutated anchor challenge
        let evil = Signature::new(
            signature.get_c() + Scalar::ONE,
            signature.get_key_images().to_vec(),
            signature.get_responses().to_vec(),
        )
        .unwrap();
        assert!(!Standard::verify(&evil, &ring, &MESSAGE).unwrap());

        // Mutated response in every position
        for i in 0..3 {
            for j in 0..2 {
                let mut responses = signature.get_responses().to_vec();
                responses[i][j] += Scalar::ONE;
                let evil =
                    Signature::new(*signature.get_c(), signature.get_key_images().to_vec(), responses).unwrap();
                assert!(!Standard::verify(&evil, &ring, &MESSAGE).unwrap());
            }
        }

        // Mutated key image
        let mut key_images = signature.get_key_images().to_vec();
        key_images[0] += generators::basepoint();
        let evil = Signature::new(*signature.get_c(), key_images, signature.get_responses().to_vec()).unwrap();
        assert!(!Standard::verify(&evil, &ring, &MESSAGE).unwrap());
    }

    #[test]
    fn test_key_image_determinism() {
        let mut rng = ChaCha12Rng::seed_from_u64(8675309);

        let witness = random_witness(0, 3, &mut rng);
        let images = Standard::derive_key_images(&witness);
        assert_eq!(images.len(), 3);

        // Derivation is a pure function of the witness keys
        assert_eq!(images, Standard::derive_key_images(&witness));

        // A different witness yields different images
        let other = random_witness(0, 3, &mut rng);
        assert_ne!(images, Standard::derive_key_images(&other));

        // The variants bind different trailing layers, so their images differ as well
        assert_ne!(images, ConfidentialAsset::derive_key_images(&witness));
    }

    #[test]
    fn test_confidential_asset_sign_verify() {
        let mut rng = ChaCha12Rng::seed_from_u64(8675309);

        for l in 0..4 {
            let witness = random_witness(l, 4, &mut rng);
            let ring = ConfidentialAsset::random_ring(&witness, 4, &mut rng).unwrap();
            let signature = ConfidentialAsset::sign_with_rng(&witness, &ring, &MESSAGE, &mut rng).unwrap();
            assert!(ConfidentialAsset::verify(&signature, &ring, &MESSAGE).unwrap());
        }
    }

    #[test]
    fn test_confidential_asset_unbalanced() {
        let mut rng = ChaCha12Rng::seed_from_u64(8675309);

        // Build the ring against the honest witness
        let witness = random_witness(1, 3, &mut rng);
        let ring = ConfidentialAsset::random_ring(&witness, 3, &mut rng).unwrap();

        // A witness whose asset-tag blinding does not cancel against the ring row must not produce a valid signature
        let mut keys = witness.get_keys().to_vec();
        keys[2] += Scalar::ONE;
        let unbalanced = Witness::new(1, &keys).unwrap();
        let signature = ConfidentialAsset::sign_with_rng(&unbalanced, &ring, &MESSAGE, &mut rng).unwrap();
        assert!(!ConfidentialAsset::verify(&signature, &ring, &MESSAGE).unwrap());
    }

    #[test]
    fn test_variants_not_interchangeable() {
        let mut rng = ChaCha12Rng::seed_from_u64(8675309);

        let witness = random_witness(0, 3, &mut rng);
        let ring = Standard::random_ring(&witness, 3, &mut rng).unwrap();
        let signature = Standard::sign_with_rng(&witness, &ring, &MESSAGE, &mut rng).unwrap();

        assert!(Standard::verify(&signature, &ring, &MESSAGE).unwrap());
        assert!(!ConfidentialAsset::verify(&signature, &ring, &MESSAGE).unwrap());
    }

    #[test]
    fn test_shape_validation() {
        let mut rng = ChaCha12Rng::seed_from_u64(8675309);

        let witness = random_witness(0, 2, &mut rng);
        let ring = Standard::random_ring(&witness, 3, &mut rng).unwrap();
        let signature = Standard::sign_with_rng(&witness, &ring, &MESSAGE, &mut rng).unwrap();

        // Messages must be 32-byte digests
        assert!(matches!(
            Standard::sign_with_rng(&witness, &ring, &MESSAGE[..31], &mut rng),
            Err(SchemeError::InvalidMessageLength)
        ));
        assert!(matches!(
            Standard::verify(&signature, &ring, &MESSAGE[..31]),
            Err(SchemeError::InvalidMessageLength)
        ));

        // The response matrix must match the ring row count
        let short = Ring::new(ring.get_keys()[..2].to_vec());
        assert!(matches!(
            Standard::verify(&signature, &short, &MESSAGE),
            Err(SchemeError::MalformedRing { .. })
        ));

        // The key images must match the ring layers
        let narrow = Signature::new(
            *signature.get_c(),
            signature.get_key_images()[..1].to_vec(),
            signature.get_responses().iter().map(|row| row[..1].to_vec()).collect(),
        )
        .unwrap();
        assert!(matches!(
            Standard::verify(&narrow, &ring, &MESSAGE),
            Err(SchemeError::RingShapeMismatch { .. })
        ));

        // A ragged ring is rejected before any arithmetic
        let mut keys = ring.get_keys().to_vec();
        keys[2].pop();
        assert!(matches!(
            Standard::verify(&signature, &Ring::new(keys), &MESSAGE),
            Err(SchemeError::MalformedRing { .. })
        ));

        // The confidential-asset variant needs at least two layers
        let thin = random_witness(0, 1, &mut rng);
        let thin_ring = Standard::random_ring(&thin, 3, &mut rng).unwrap();
        assert!(matches!(
            ConfidentialAsset::sign_with_rng(&thin, &thin_ring, &MESSAGE, &mut rng),
            Err(SchemeError::RingShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_identity_key_image_rejected() {
        let mut rng = ChaCha12Rng::seed_from_u64(8675309);

        let witness = random_witness(0, 2, &mut rng);
        let ring = Standard::random_ring(&witness, 3, &mut rng).unwrap();
        let signature = Standard::sign_with_rng(&witness, &ring, &MESSAGE, &mut rng).unwrap();

        // An identity key image is well-formed data, but can never be a valid linkability tag
        let mut key_images = signature.get_key_images().to_vec();
        key_images[0] = RistrettoPoint::identity();
        let evil = Signature::new(*signature.get_c(), key_images, signature.get_responses().to_vec()).unwrap();
        assert!(!Standard::verify(&evil, &ring, &MESSAGE).unwrap());
    }

    #[cfg(feature = "hazmat")]
    #[test]
    fn test_sign_vartime() {
        let mut rng = ChaCha12Rng::seed_from_u64(8675309);

        let witness = random_witness(1, 2, &mut rng);
        let ring = Standard::random_ring(&witness, 3, &mut rng).unwrap();
        let signature = Standard::sign_with_rng_vartime(&witness, &ring, &MESSAGE, &mut rng).unwrap();
        assert!(Standard::verify(&signature, &ring, &MESSAGE).unwrap());
    }
}
