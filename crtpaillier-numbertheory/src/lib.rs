#![warn(missing_docs, unused_imports)]

//! _This is a part of **crtpaillier**. For more information, head to the
//! [crtpaillier](https://crates.io/crates/crtpaillier) crate homepage._
//!
//! Number theoretic building blocks: random prime generation, coprime sampling and the
//! $L$ function used by Paillier decryption.

use crtpaillier_traits::randomness::{GeneralRng, SecureRng};
use rug::integer::IsPrime;
use rug::Integer;

/// Miller-Rabin rounds; the probability of accepting a composite is at most $4^{-25}$.
const REPS: u32 = 25;

/// Generates a uniformly random prime number of a given bit length. A candidate is drawn from
/// $[2^{b-1}, 2^b)$ by sampling $b - 1$ random bits and setting the top bit, and candidates are
/// redrawn until one passes a probabilistic primality test.
/// ```
/// # use crtpaillier_traits::randomness::GeneralRng;
/// # use crtpaillier_numbertheory::gen_prime;
/// # use rand_core::OsRng;
/// let mut rng = GeneralRng::new(OsRng);
/// let prime = gen_prime(32, &mut rng);
/// assert_eq!(prime.significant_bits(), 32);
/// ```
///
/// # Panics
/// Panics if `bit_length` is smaller than 2, since no prime has fewer bits.
pub fn gen_prime<R: SecureRng>(bit_length: u32, rng: &mut GeneralRng<R>) -> Integer {
    assert!(bit_length >= 2, "a prime has at least two bits");

    loop {
        let mut candidate =
            Integer::from(Integer::random_bits(bit_length - 1, &mut rng.rug_rng()));
        candidate.set_bit(bit_length - 1, true);

        if is_probable_prime(&candidate) {
            return candidate;
        }
    }
}

/// Returns whether `candidate` passes the same probabilistic primality test that [`gen_prime`]
/// uses to accept its candidates.
pub fn is_probable_prime(candidate: &Integer) -> bool {
    candidate.is_probably_prime(REPS) != IsPrime::No
}

/// Generates a uniformly random coprime $x$ to the `other` integer $y$, with $0 < x < y$. This
/// means that $\gcd(x, y) = 1$.
pub fn gen_coprime<R: SecureRng>(other: &Integer, rng: &mut GeneralRng<R>) -> Integer {
    loop {
        let candidate = Integer::from(other.random_below_ref(&mut rng.rug_rng()));

        if Integer::from(candidate.gcd_ref(other)) == 1 {
            return candidate;
        }
    }
}

/// Computes $L(u) = \frac{u - 1}{d}$ using truncating integer division. For the values Paillier
/// works with, $u \equiv 1 \pmod d$ and the division is exact.
pub fn l_function(mut u: Integer, d: &Integer) -> Integer {
    u -= 1;
    u /= d;
    u
}

#[cfg(test)]
mod tests {
    use crate::{gen_coprime, gen_prime, is_probable_prime, l_function};
    use crtpaillier_traits::randomness::GeneralRng;
    use rand_core::OsRng;
    use rug::Integer;

    fn assert_primality_100_000_factors(integer: &Integer) {
        let (_, hi) = primal::estimate_nth_prime(100_000);
        for prime in primal::Sieve::new(hi as usize).primes_from(0) {
            assert!(
                !integer.is_divisible_u(prime as u32),
                "{} is divisible by {}",
                integer,
                prime
            );
        }
    }

    #[test]
    fn test_gen_prime_for_factors() {
        let mut rng = GeneralRng::new(OsRng);
        let generated_prime = gen_prime(256, &mut rng);

        assert_primality_100_000_factors(&generated_prime);
    }

    #[test]
    fn test_gen_prime_exact_bit_length() {
        let mut rng = GeneralRng::new(OsRng);

        for bit_length in [3u32, 8, 17, 32, 64, 100].iter() {
            let prime = gen_prime(*bit_length, &mut rng);
            assert_eq!(prime.significant_bits(), *bit_length);
        }
    }

    #[test]
    fn test_gen_prime_two_bits() {
        let mut rng = GeneralRng::new(OsRng);

        for _ in 0..10 {
            let prime = gen_prime(2, &mut rng);
            assert!(prime == 2 || prime == 3);
        }
    }

    #[test]
    #[should_panic(expected = "a prime has at least two bits")]
    fn test_gen_prime_rejects_one_bit() {
        let mut rng = GeneralRng::new(OsRng);
        gen_prime(1, &mut rng);
    }

    #[test]
    #[should_panic(expected = "a prime has at least two bits")]
    fn test_gen_prime_rejects_zero_bits() {
        let mut rng = GeneralRng::new(OsRng);
        gen_prime(0, &mut rng);
    }

    #[test]
    fn test_gen_prime_small_is_prime() {
        let mut rng = GeneralRng::new(OsRng);

        for _ in 0..50 {
            let prime = gen_prime(32, &mut rng).to_u64().unwrap();
            assert!(primal::is_prime(prime), "{} is not prime", prime);
        }
    }

    #[test]
    fn test_is_probable_prime_small_values() {
        for value in 0u32..2_000 {
            assert_eq!(
                is_probable_prime(&Integer::from(value)),
                primal::is_prime(value as u64),
                "disagreement on {}",
                value
            );
        }
    }

    #[test]
    fn test_gen_coprime() {
        let mut rng = GeneralRng::new(OsRng);
        let n = Integer::from(61 * 53);

        for _ in 0..100 {
            let r = gen_coprime(&n, &mut rng);

            assert!(r > 0 && r < n);
            assert_eq!(Integer::from(r.gcd_ref(&n)), 1);
        }
    }

    #[test]
    fn test_l_function_recovers_exponent() {
        let n = Integer::from(3233);
        let n_squared = Integer::from(n.square_ref());
        let g = Integer::from(&n + 1);

        let u = Integer::from(g.pow_mod_ref(&Integer::from(5), &n_squared).unwrap());

        assert_eq!(l_function(u, &n), 5);
    }
}
