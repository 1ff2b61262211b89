#![warn(missing_docs, unused_imports)]

//! _This is a part of **crtpaillier**. For more information, head to the
//! [crtpaillier](https://crates.io/crates/crtpaillier) crate homepage._
//!
//! The Paillier cryptosystem with decryption through the Chinese Remainder Theorem.

/// Partially homomorphic cryptosystems with one key.
pub mod cryptosystems;

pub use crtpaillier_traits;
