use crate::Error;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_core::{OsRng, RngCore};
use rug::rand::{ThreadRandGen, ThreadRandState};

/// A random number generator that is suitable for cryptographic purposes.
pub trait SecureRng: rand_core::RngCore + rand_core::CryptoRng {}

impl<R: rand_core::RngCore + rand_core::CryptoRng> SecureRng for R {}

/// General RNG that can be used for all dependencies. It owns the generator state, so it is
/// created once and passed by mutable reference to whatever needs randomness.
pub struct GeneralRng<R: SecureRng> {
    rng_wrapper: RngWrapper<R>,
}

impl<R: SecureRng> GeneralRng<R> {
    /// Creates a new `GeneralRng` based on an RNG that implements both `RngCore` and `CryptoRng`
    /// to ensure that the underlying RNG is indeed cryptographically secure.
    pub fn new(rng: R) -> Self {
        GeneralRng {
            rng_wrapper: RngWrapper { rng },
        }
    }

    /// Creates a RNG for the `rug` crate that is only suitable for a single thread.
    pub fn rug_rng(&mut self) -> ThreadRandState<'_> {
        ThreadRandState::new_custom(&mut self.rng_wrapper)
    }
}

impl GeneralRng<StdRng> {
    /// Seeds a `StdRng` once from the operating system's entropy source. Fails with
    /// [`Error::EntropySourceUnavailable`] when no seed can be read.
    /// ```
    /// # use crtpaillier_traits::randomness::GeneralRng;
    /// let mut rng = GeneralRng::from_os_entropy().unwrap();
    /// ```
    pub fn from_os_entropy() -> Result<Self, Error> {
        let mut seed = <StdRng as SeedableRng>::Seed::default();
        OsRng
            .try_fill_bytes(&mut seed)
            .map_err(Error::EntropySourceUnavailable)?;

        Ok(GeneralRng::new(StdRng::from_seed(seed)))
    }
}

struct RngWrapper<R: SecureRng> {
    rng: R,
}

impl<R: SecureRng> ThreadRandGen for RngWrapper<R> {
    fn gen(&mut self) -> u32 {
        self.rng.next_u32()
    }
}
