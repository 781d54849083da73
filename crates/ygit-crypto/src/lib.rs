//! Cryptographic primitives for ygit.
//!
//! Provides kind-tagged SHA-1 hashing: every object is addressed by the digest
//! of `"<kind> <len>\0" + payload`, so a blob and a tree with identical bytes
//! never share an identifier.
//!
//! All crypto operations wrap established libraries, no custom cryptography.

pub mod hasher;

pub use hasher::ContentHasher;
