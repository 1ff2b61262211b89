#![warn(missing_docs, unused_imports)]

//! _This is a part of **crtpaillier**. For more information, head to the
//! [crtpaillier](https://crates.io/crates/crtpaillier) crate homepage._
//!
//! General traits for additively homomorphic cryptosystems, the random number context that is
//! shared with `rug`, and the error type returned throughout the workspace.

use rug::Integer;

/// Random number generation that is consistent with the dependencies' requirements.
pub mod randomness;

/// Concepts expressing the security level of a given cryptosystem.
pub mod security;

/// General notion of a cryptosystem
pub mod cryptosystems;

/// Homomorphic operations on ciphertexts.
pub mod homomorphic;

/// Errors that can arise when generating keys, encrypting, or combining ciphertexts.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The operating system could not provide a seed for the random number generator.
    #[error("the secure entropy source is unavailable")]
    EntropySourceUnavailable(#[source] rand_core::Error),
    /// The plaintext cannot be encoded without wrapping around the plaintext modulus.
    #[error("plaintext {plaintext} lies outside the signed range [-{bound}, {bound}]")]
    PlaintextOutOfRange {
        /// The rejected plaintext.
        plaintext: Integer,
        /// The largest absolute value that can be encrypted under this key.
        bound: Integer,
    },
    /// A ciphertext has no inverse modulo $n^2$, so it cannot be subtracted.
    #[error("ciphertext is not invertible modulo n^2")]
    NonInvertibleCiphertext,
    /// The requested modulus size cannot be split into two primes of equal length.
    #[error("invalid key length of {0} bits: must be even and at least 16")]
    InvalidKeyLength(u32),
    /// The given factors are equal or not prime.
    #[error("p and q must be distinct primes")]
    InvalidPrimes,
}
