// Copyright (c) 2024, The Tari Project
// SPDX-License-Identifier: BSD-3-Clause

//! An experimental Rust implementation of the MLSAG linkable ring signature scheme.
//!
//! # Overview
//!
//! MLSAG (Multilayer Linkable Spontaneous Anonymous Group signatures) is a construction that allows a signer to sign a
//! message against a rectangular matrix of verification keys: each row is a candidate ring member, and each column is
//! an independent key layer. Successful verification means the signer knew every private key of one of the rows, but
//! does not reveal which row. The signature also contains one key image per layer; if any two verified signatures share
//! a key image, they were produced using the same private key. However, it is not possible to determine the private key
//! associated to a key image, nor the corresponding verification key.
//!
//! The last column of the matrix is special: it does not represent spend authority, but a value-balance check.
//! Verification keys in this column are bound to a distinguished commitment generator instead of the standard base
//! point, so a row only closes the ring if its commitments algebraically cancel. The
//! [confidential-asset variant](`ConfidentialAsset`) extends this treatment to the last _two_ columns, additionally
//! proving conservation of blinded asset identifiers.
//!
//! More formally, let `G` be the standard base point and `T` an independent commitment generator.
//! For a ring `M` of `n` rows and `m` layers, a signature under the standard variant proves knowledge of scalars
//! `x[0..m)` and a row index `l` such that:
//!
//! `M[l][j] = x[j]*G` for `j < m-1`, `M[l][m-1] = x[m-1]*T`, and `I[j] = x[j]*HashToPoint(M[l][j])`
//!
//! where the key images `I` are published with the signature and enable external double-spend detection.
//!
//! # Implementation notes
//!
//! This implementation makes several opinionated choices:
//! - It uses [Ristretto](https://ristretto.group/) for group operations.
//! - It uses [BLAKE3](https://github.com/BLAKE3-team/BLAKE3) for all cryptographic hashing operations, including the
//!   challenge chain and derivation of the commitment generator.
//!
//! The implementation keeps dependencies to a minimum, and is `no_std` friendly.
//!
//! There are several features available.
//!
//! | Feature | Default? | Description |
//! | :--- | :---: | :--- |
//! | `borsh` | | Adds signature serialization and deserialization via [`borsh`](https://crates.io/crates/borsh) |
//! | `hazmat` | | Adds variable-time signer functionality that should only be used if you absolutely know what you're doing |
//! | `rand` | ✓ | Adds additional signer functionality that supplies a cryptographically-secure random number generator |
//! | `serde` | | Adds signature serialization and deserialization via [`serde`](https://crates.io/crates/serde) |
//! | `std` | ✓ | Adds corresponding dependency features |
//!
//! The underlying [curve library](https://crates.io/crates/curve25519-dalek) chooses an arithmetic backend based on CPU feature detection.
//! Using a nightly compiler broadens the backend set, and may provide better performance.
//! You can examine performance using the benchmarks: either `cargo bench --all-features` or `cargo +nightly bench
//! --all-features`.
//!
//! Rings and signatures support a custom serialization format designed to be efficient and canonical.
//! This is used for `borsh` serialization and deserialization, or can be accessed directly.
//! This functionality has an associated fuzzer that can be run using a nightly compiler: `cargo +nightly fuzz run
//! signatures`.
//!
//! # Warning
//!
//! While this implementation is written with security in mind, it is currently **experimental** and not suitable for
//! production use.
//!
//! # Example
//!
//! Here's a complete example of how to generate and verify an MLSAG signature; see the documentation for additional
//! functionality.
//!
//! ```
//! # #[cfg(feature = "rand")]
//! # {
//! use mlsag::{Mlsag, Standard, Witness};
//! use rand_core::OsRng;
//!
//! let mut rng = OsRng;
//!
//! // Generate a random witness: two key layers, hidden among eight ring members
//! let witness = Witness::random(8, 2, &mut rng).unwrap();
//!
//! // Generate a ring of decoy rows, placing the witness verification keys at the witness index
//! let ring = Standard::random_ring(&witness, 8, &mut rng).unwrap();
//!
//! // Sign a fixed-size message digest; the caller is responsible for pre-hashing
//! let message = [0x2a; 32];
//! let signature = Standard::sign(&witness, &ring, &message).unwrap();
//!
//! // The signature should verify against the same ring and message
//! assert!(Standard::verify(&signature, &ring, &message).unwrap());
//! # }
//! ```

#![no_std]

extern crate alloc;

/// Fixed group generators used to define verification keys and commitments.
pub mod generators;
/// Hashing to group elements and scalars.
pub(crate) mod hash;
/// Candidate verification-key matrices.
pub mod ring;
pub use ring::Ring;
/// Signing and verification for the standard and confidential-asset variants.
pub mod scheme;
pub use scheme::{ConfidentialAsset, Mlsag, Standard};
/// MLSAG signatures.
pub mod signature;
pub use signature::Signature;
/// MLSAG witnesses.
pub mod witness;
pub use witness::Witness;

/// Domain separators used for hashing operations
pub(crate) mod domains {
    // Version
    pub(crate) const VERSION: u64 = 0;

    // Number of bytes in a message digest
    pub(crate) const MESSAGE_BYTES: usize = 32;

    // Serialization format tags
    pub(crate) const RING_TAG: u8 = 0x01;
    pub(crate) const SIGNATURE_TAG: u8 = 0x02;

    // Generators
    pub(crate) const POINT_COMMITMENT_BASE: &str = "MLSAG commitment base";

    // Hashing
    pub(crate) const HASH_KEY_IMAGE: &str = "MLSAG key image";
    pub(crate) const HASH_CHALLENGE: &str = "MLSAG challenge";
    pub(crate) const HASH_CHALLENGE_CA: &str = "MLSAG confidential-asset challenge";
}
