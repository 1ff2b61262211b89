use std::ops::{Add, Mul};

use crate::cryptosystems::{Associable, AssociatedCiphertext, EncryptionKey};
use crate::Error;

/// Encryption keys whose ciphertexts can be combined into encryptions of sums and differences
/// of their plaintexts.
pub trait HomomorphicAddition: EncryptionKey {
    /// Combines two ciphertexts so that the result encrypts the sum of their plaintexts.
    fn add(
        &self,
        ciphertext_a: &Self::Ciphertext,
        ciphertext_b: &Self::Ciphertext,
    ) -> Self::Ciphertext;

    /// Combines two ciphertexts so that the result encrypts the difference of their plaintexts.
    /// Fails when `ciphertext_b` is malformed and has no inverse.
    fn sub(
        &self,
        ciphertext_a: &Self::Ciphertext,
        ciphertext_b: &Self::Ciphertext,
    ) -> Result<Self::Ciphertext, Error>;

    /// Multiplies the plaintext of `ciphertext` by the scalar `input`.
    fn mul_constant(&self, ciphertext: &Self::Ciphertext, input: &Self::Input) -> Self::Ciphertext;

    /// Adds a known plaintext `constant` to the plaintext of `ciphertext`.
    fn add_constant(
        &self,
        ciphertext: &Self::Ciphertext,
        constant: &Self::Plaintext,
    ) -> Self::Ciphertext;

    /// Subtracts a known plaintext `constant` from the plaintext of `ciphertext`.
    fn sub_constant(
        &self,
        ciphertext: &Self::Ciphertext,
        constant: &Self::Plaintext,
    ) -> Self::Ciphertext;
}

impl<'pk, C: Associable<PK>, PK: EncryptionKey<Ciphertext = C> + HomomorphicAddition> Add
    for AssociatedCiphertext<'pk, C, PK>
{
    type Output = AssociatedCiphertext<'pk, C, PK>;

    fn add(self, rhs: Self) -> Self::Output {
        debug_assert_eq!(self.public_key, rhs.public_key);
        self.public_key
            .add(&self.ciphertext, &rhs.ciphertext)
            .associate(self.public_key)
    }
}

impl<'pk, C: Associable<PK>, PK: EncryptionKey<Ciphertext = C> + HomomorphicAddition>
    Mul<PK::Input> for AssociatedCiphertext<'pk, C, PK>
{
    type Output = AssociatedCiphertext<'pk, C, PK>;

    fn mul(self, rhs: PK::Input) -> Self::Output {
        self.public_key
            .mul_constant(&self.ciphertext, &rhs)
            .associate(self.public_key)
    }
}

impl<'pk, C: Associable<PK>, PK: EncryptionKey<Ciphertext = C> + HomomorphicAddition>
    AssociatedCiphertext<'pk, C, PK>
{
    /// Homomorphically subtracts `rhs`, failing if `rhs` is not a well-formed ciphertext.
    pub fn checked_sub(self, rhs: Self) -> Result<Self, Error> {
        debug_assert_eq!(self.public_key, rhs.public_key);
        Ok(self
            .public_key
            .sub(&self.ciphertext, &rhs.ciphertext)?
            .associate(self.public_key))
    }
}
