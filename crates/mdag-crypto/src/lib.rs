//! Cryptographic primitives for mdag.
//!
//! Provides domain-separated BLAKE3 hashing for object identities and
//! Ed25519 signing for mutable-name records.
//!
//! All crypto operations wrap established libraries; there is no custom cryptography.

pub mod hasher;
pub mod signer;

pub use hasher::ContentHasher;
pub use signer::{Signature, SignatureError, SigningKey, VerifyingKey};
