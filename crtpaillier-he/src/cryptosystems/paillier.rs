use crtpaillier_numbertheory::{gen_coprime, gen_prime, is_probable_prime, l_function};
use crtpaillier_traits::cryptosystems::{
    Associable, AsymmetricCryptosystem, DecryptionKey, EncryptionKey,
};
use crtpaillier_traits::homomorphic::HomomorphicAddition;
use crtpaillier_traits::randomness::GeneralRng;
use crtpaillier_traits::randomness::SecureRng;
use crtpaillier_traits::security::BitsOfSecurity;
use crtpaillier_traits::Error;
use rug::Integer;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, trace, warn};

/// Smallest modulus for which two distinct primes of half the length always exist.
const MIN_MODULUS_SIZE: u32 = 16;
/// Smallest modulus that is not considered broken.
const SECURE_MODULUS_SIZE: u32 = 2048;

/// Whether ciphertexts are blinded with fresh randomness during encryption.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum EncryptionMode {
    /// Encrypts $m$ as $1 + m n$. Equal plaintexts always give equal ciphertexts, so an observer
    /// learns which ciphertexts hold the same value.
    Deterministic,
    /// Encrypts $m$ as $(1 + m n) \cdot r^n \bmod n^2$ for a fresh random $r$ coprime to $n$,
    /// as in textbook Paillier. Use this mode unless ciphertexts must be reproducible.
    Randomized,
}

/// The Paillier cryptosystem.
#[derive(Copy, Clone)]
pub struct Paillier {
    modulus_size: u32,
    mode: EncryptionMode,
}

impl Paillier {
    /// Returns the same cryptosystem, but generating public keys that encrypt in `mode`.
    pub fn with_mode(self, mode: EncryptionMode) -> Self {
        Paillier { mode, ..self }
    }
}

/// Public key for the Paillier cryptosystem.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct PaillierPK {
    n: Integer,
    n_squared: Integer,
    g: Integer,
    mode: EncryptionMode,
}

impl PaillierPK {
    /// Public modulus $n = pq$.
    pub fn n(&self) -> &Integer {
        &self.n
    }

    /// The ciphertext modulus $n^2$.
    pub fn n_squared(&self) -> &Integer {
        &self.n_squared
    }

    /// Public generator $g = n + 1$.
    pub fn g(&self) -> &Integer {
        &self.g
    }

    /// The encryption mode this key was generated for.
    pub fn mode(&self) -> EncryptionMode {
        self.mode
    }

    /// The largest absolute plaintext value, $\lfloor n / 2 \rfloor$. Plaintexts in
    /// $[-\lfloor n/2 \rfloor, \lfloor n/2 \rfloor]$ decrypt to themselves.
    pub fn plaintext_bound(&self) -> Integer {
        Integer::from(&self.n >> 1)
    }

    /// Maps a signed value to its representative in $[0, n)$.
    fn reduce(&self, value: &Integer) -> Integer {
        let mut residue = Integer::from(value % &self.n);
        if residue < 0 {
            residue += &self.n;
        }
        residue
    }
}

/// Decryption key for the Paillier cryptosystem. It keeps the factorization of $n$ together with
/// everything that CRT decryption needs per prime.
#[derive(Serialize, Deserialize)]
pub struct PaillierSK {
    p: CrtFactor,
    q: CrtFactor,
    pos_neg_boundary: Integer,
}

/// Precomputations for decrypting modulo one prime factor of $n$.
#[derive(Serialize, Deserialize)]
struct CrtFactor {
    prime: Integer,
    prime_minus_one: Integer,
    prime_squared: Integer,
    /// $h = L(g^{prime - 1} \bmod prime^2)^{-1} \bmod prime$
    h: Integer,
    /// $other \cdot (other^{-1} \bmod prime)$, which is $1$ modulo `prime` and $0$ modulo `other`.
    crt_coefficient: Integer,
}

impl CrtFactor {
    fn new(prime: Integer, other: &Integer, g: &Integer) -> Result<Self, Error> {
        let prime_minus_one = Integer::from(&prime - 1);
        let prime_squared = Integer::from(prime.square_ref());

        let u = Integer::from(g.secure_pow_mod_ref(&prime_minus_one, &prime_squared));
        let h = l_function(u, &prime)
            .invert(&prime)
            .map_err(|_| Error::InvalidPrimes)?;

        let other_inverse = Integer::from(other.invert_ref(&prime).ok_or(Error::InvalidPrimes)?);
        let crt_coefficient = other_inverse * other;

        Ok(CrtFactor {
            prime,
            prime_minus_one,
            prime_squared,
            h,
            crt_coefficient,
        })
    }

    /// Recovers the plaintext modulo this prime.
    fn decrypt(&self, ciphertext: &Integer) -> Integer {
        let u = Integer::from(
            ciphertext.secure_pow_mod_ref(&self.prime_minus_one, &self.prime_squared),
        );

        let mut inner = l_function(u, &self.prime);
        inner *= &self.h;
        inner %= &self.prime;
        inner
    }
}

impl PaillierSK {
    /// Builds a key pair from two given primes instead of random ones. This is mostly useful for
    /// reproducible fixtures; `p` and `q` must be distinct odd primes.
    /// ```
    /// # use crtpaillier_he::cryptosystems::paillier::{EncryptionMode, PaillierSK};
    /// # use rug::Integer;
    /// let (public_key, secret_key) =
    ///     PaillierSK::from_primes(Integer::from(61), Integer::from(53), EncryptionMode::Deterministic)
    ///         .unwrap();
    /// assert_eq!(*public_key.n(), 3233);
    /// assert_eq!(*secret_key.pos_neg_boundary(), 1616);
    /// ```
    pub fn from_primes(
        p: Integer,
        q: Integer,
        mode: EncryptionMode,
    ) -> Result<(PaillierPK, PaillierSK), Error> {
        if p == q || p < 3 || q < 3 || !is_probable_prime(&p) || !is_probable_prime(&q) {
            return Err(Error::InvalidPrimes);
        }

        let n = Integer::from(&p * &q);
        let n_squared = Integer::from(n.square_ref());
        let g = Integer::from(&n + 1);
        let pos_neg_boundary = Integer::from(&n >> 1);

        let p_factor = CrtFactor::new(p, &q, &g)?;
        let q_factor = CrtFactor::new(q, &p_factor.prime, &g)?;

        Ok((
            PaillierPK {
                n,
                n_squared,
                g,
                mode,
            },
            PaillierSK {
                p: p_factor,
                q: q_factor,
                pos_neg_boundary,
            },
        ))
    }

    /// Decrypted values above this boundary are mapped to negative numbers.
    pub fn pos_neg_boundary(&self) -> &Integer {
        &self.pos_neg_boundary
    }
}

/// Ciphertext of the Paillier cryptosystem, which is additively homomorphic.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct PaillierCiphertext {
    /// Encrypted message (Ciphertext)
    pub c: Integer,
}

impl Associable<PaillierPK> for PaillierCiphertext {}

impl AsymmetricCryptosystem for Paillier {
    type PublicKey = PaillierPK;
    type SecretKey = PaillierSK;

    /// Sets up deterministic Paillier, see [`Paillier::with_mode`] to enable randomization.
    fn setup(security_param: &BitsOfSecurity) -> Self {
        Paillier {
            modulus_size: security_param.to_public_key_bit_length(),
            mode: EncryptionMode::Deterministic,
        }
    }

    /// Generates a fresh Paillier keypair. The modulus $n$ has exactly the requested number of
    /// bits and is the product of two distinct primes of half that length.
    /// ```
    /// # use crtpaillier_traits::randomness::GeneralRng;
    /// # use crtpaillier_he::cryptosystems::paillier::Paillier;
    /// # use crtpaillier_traits::security::BitsOfSecurity;
    /// # use crtpaillier_traits::cryptosystems::AsymmetricCryptosystem;
    /// # use rand_core::OsRng;
    /// let mut rng = GeneralRng::new(OsRng);
    /// let paillier = Paillier::setup(&BitsOfSecurity::ToyParameters);
    /// let (public_key, secret_key) = paillier.generate_keys(&mut rng).unwrap();
    /// ```
    fn generate_keys<R: SecureRng>(
        &self,
        rng: &mut GeneralRng<R>,
    ) -> Result<(PaillierPK, PaillierSK), Error> {
        if self.modulus_size < MIN_MODULUS_SIZE || self.modulus_size % 2 != 0 {
            return Err(Error::InvalidKeyLength(self.modulus_size));
        }
        if self.modulus_size < SECURE_MODULUS_SIZE {
            warn!(
                modulus_size = self.modulus_size,
                "Paillier modulus is below {} bits and offers no real security", SECURE_MODULUS_SIZE
            );
        }

        let prime_size = self.modulus_size / 2;

        let mut attempts = 0u32;
        let (p, q) = loop {
            attempts += 1;

            let mut p = gen_prime(prime_size, rng);
            let q = gen_prime(prime_size, rng);
            while p == q {
                p = gen_prime(prime_size, rng);
            }

            // Two primes of `prime_size` bits can have a product that is one bit short
            if Integer::from(&p * &q).significant_bits() == self.modulus_size {
                break (p, q);
            }
        };
        trace!(attempts, "found primes with a product of the right size");

        let (public_key, secret_key) = PaillierSK::from_primes(p, q, self.mode)?;

        debug!(
            n = %public_key.n,
            pos_neg_boundary = %secret_key.pos_neg_boundary,
            "generated Paillier key pair"
        );

        Ok((public_key, secret_key))
    }
}

impl EncryptionKey for PaillierPK {
    type Input = Integer;
    type Plaintext = Integer;
    type Ciphertext = PaillierCiphertext;
    type Randomness = Integer;

    /// Encrypts a signed plaintext integer using the Paillier public key, blinding it only when
    /// the key is in [`EncryptionMode::Randomized`].
    /// ```
    /// # use crtpaillier_traits::randomness::GeneralRng;
    /// # use crtpaillier_he::cryptosystems::paillier::Paillier;
    /// # use crtpaillier_traits::security::BitsOfSecurity;
    /// # use crtpaillier_traits::cryptosystems::{AsymmetricCryptosystem, EncryptionKey};
    /// # use rug::Integer;
    /// # use rand_core::OsRng;
    /// # let mut rng = GeneralRng::new(OsRng);
    /// # let paillier = Paillier::setup(&BitsOfSecurity::ToyParameters);
    /// # let (public_key, secret_key) = paillier.generate_keys(&mut rng).unwrap();
    /// let ciphertext = public_key.encrypt(&Integer::from(-5), &mut rng).unwrap();
    /// ```
    fn encrypt_raw<R: SecureRng>(
        &self,
        plaintext: &Integer,
        rng: &mut GeneralRng<R>,
    ) -> Result<PaillierCiphertext, Error> {
        let ciphertext = self.encrypt_without_randomness(plaintext)?;

        Ok(match self.mode {
            EncryptionMode::Deterministic => ciphertext,
            EncryptionMode::Randomized => self.randomize(ciphertext, rng),
        })
    }

    /// Computes $g^m = 1 + m n$, where $m$ is the plaintext reduced into $[0, n)$. The result is
    /// already smaller than $n^2$.
    fn encrypt_without_randomness(
        &self,
        plaintext: &Integer,
    ) -> Result<PaillierCiphertext, Error> {
        let bound = self.plaintext_bound();
        if plaintext.cmp_abs(&bound) == Ordering::Greater {
            return Err(Error::PlaintextOutOfRange {
                plaintext: plaintext.clone(),
                bound,
            });
        }

        let mut c = self.reduce(plaintext);
        c *= &self.n;
        c += 1;

        Ok(PaillierCiphertext { c })
    }

    fn randomize<R: SecureRng>(
        &self,
        ciphertext: PaillierCiphertext,
        rng: &mut GeneralRng<R>,
    ) -> PaillierCiphertext {
        let r = gen_coprime(&self.n, rng);

        self.randomize_with(ciphertext, &r)
    }

    fn randomize_with(
        &self,
        ciphertext: PaillierCiphertext,
        randomness: &Integer,
    ) -> PaillierCiphertext {
        let randomizer = Integer::from(randomness.secure_pow_mod_ref(&self.n, &self.n_squared));

        PaillierCiphertext {
            c: (ciphertext.c * randomizer) % &self.n_squared,
        }
    }
}

impl DecryptionKey<PaillierPK> for PaillierSK {
    /// Decrypts a rich Paillier ciphertext using the secret key.
    /// ```
    /// # use crtpaillier_traits::randomness::GeneralRng;
    /// # use crtpaillier_he::cryptosystems::paillier::Paillier;
    /// # use crtpaillier_traits::security::BitsOfSecurity;
    /// # use crtpaillier_traits::cryptosystems::{AsymmetricCryptosystem, EncryptionKey, DecryptionKey};
    /// # use rug::Integer;
    /// # use rand_core::OsRng;
    /// # let mut rng = GeneralRng::new(OsRng);
    /// # let paillier = Paillier::setup(&BitsOfSecurity::ToyParameters);
    /// # let (public_key, secret_key) = paillier.generate_keys(&mut rng).unwrap();
    /// # let ciphertext = public_key.encrypt(&Integer::from(-5), &mut rng).unwrap();
    /// println!("The decrypted message is {}", secret_key.decrypt(&ciphertext));
    /// // Prints: "The decrypted message is -5".
    /// ```
    fn decrypt_raw(&self, public_key: &PaillierPK, ciphertext: &PaillierCiphertext) -> Integer {
        let m_p = self.p.decrypt(&ciphertext.c);
        let m_q = self.q.decrypt(&ciphertext.c);

        let mut m = m_p * &self.p.crt_coefficient;
        m += m_q * &self.q.crt_coefficient;
        m %= &public_key.n;

        if m > self.pos_neg_boundary {
            m -= &public_key.n;
        }

        m
    }
}

impl HomomorphicAddition for PaillierPK {
    fn add(
        &self,
        ciphertext_a: &PaillierCiphertext,
        ciphertext_b: &PaillierCiphertext,
    ) -> PaillierCiphertext {
        PaillierCiphertext {
            c: Integer::from(&ciphertext_a.c * &ciphertext_b.c) % &self.n_squared,
        }
    }

    fn sub(
        &self,
        ciphertext_a: &PaillierCiphertext,
        ciphertext_b: &PaillierCiphertext,
    ) -> Result<PaillierCiphertext, Error> {
        let inverse = Integer::from(
            ciphertext_b
                .c
                .invert_ref(&self.n_squared)
                .ok_or(Error::NonInvertibleCiphertext)?,
        );

        Ok(PaillierCiphertext {
            c: (inverse * &ciphertext_a.c) % &self.n_squared,
        })
    }

    /// Raises the ciphertext to `input` reduced modulo $n$, so negative scalars are supported.
    fn mul_constant(
        &self,
        ciphertext: &PaillierCiphertext,
        input: &Integer,
    ) -> PaillierCiphertext {
        let exponent = self.reduce(input);
        if exponent == 0 {
            return PaillierCiphertext { c: Integer::from(1) };
        }

        PaillierCiphertext {
            c: Integer::from(ciphertext.c.secure_pow_mod_ref(&exponent, &self.n_squared)),
        }
    }

    fn add_constant(
        &self,
        ciphertext: &PaillierCiphertext,
        constant: &Integer,
    ) -> PaillierCiphertext {
        let mut shift = self.reduce(constant);
        shift *= &self.n;
        shift += 1;

        PaillierCiphertext {
            c: (shift * &ciphertext.c) % &self.n_squared,
        }
    }

    fn sub_constant(
        &self,
        ciphertext: &PaillierCiphertext,
        constant: &Integer,
    ) -> PaillierCiphertext {
        self.add_constant(ciphertext, &Integer::from(-constant))
    }
}
