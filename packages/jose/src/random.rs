//! Per-request randomness
//!
//! Every operation that needs random bytes (IVs, content encryption keys,
//! salts, PSS salts, ephemeral EC keys) takes them from a [`Randomness`]
//! supplied with the request. When the caller supplies none the thread-local
//! CSPRNG from `rand::rng()` is used.

use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

/// Optional caller-supplied CSPRNG.
#[derive(Default)]
pub struct Randomness<'a> {
    rng: Option<&'a mut dyn CryptoRng>,
}

impl<'a> Randomness<'a> {
    /// Use the thread-local CSPRNG.
    #[must_use]
    pub fn system() -> Self {
        Self { rng: None }
    }

    /// Use the supplied CSPRNG for every draw.
    #[must_use]
    pub fn from_rng(rng: &'a mut dyn CryptoRng) -> Self {
        Self { rng: Some(rng) }
    }

    /// Whether a caller-supplied CSPRNG is in use.
    #[must_use]
    pub fn is_overridden(&self) -> bool {
        self.rng.is_some()
    }

    /// Borrow this source for a nested operation.
    pub fn reborrow(&mut self) -> Randomness<'_> {
        match self.rng {
            Some(ref mut rng) => Randomness::from_rng(&mut **rng),
            None => Randomness::system(),
        }
    }

    /// Fill `dest` with random bytes.
    pub fn fill(&mut self, dest: &mut [u8]) {
        match self.rng {
            Some(ref mut rng) => rng.fill_bytes(dest),
            None => rand::rng().fill_bytes(dest),
        }
    }

    /// Draw `len` random bytes into a buffer that is zeroed on drop.
    pub fn bytes(&mut self, len: usize) -> Zeroizing<Vec<u8>> {
        let mut out = Zeroizing::new(vec![0u8; len]);
        self.fill(&mut out);
        out
    }

    /// Adapter for RustCrypto APIs built on `rand_core` 0.6 (`rsa`, `p256`, `p384`).
    pub(crate) fn bridge(&mut self) -> RngBridge<'_, 'a> {
        RngBridge(self)
    }
}

impl std::fmt::Debug for Randomness<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Randomness")
            .field("overridden", &self.is_overridden())
            .finish()
    }
}

/// Exposes a [`Randomness`] through the `rand_core` 0.6 traits.
pub(crate) struct RngBridge<'r, 'a>(&'r mut Randomness<'a>);

impl rsa::rand_core::RngCore for RngBridge<'_, '_> {
    fn next_u32(&mut self) -> u32 {
        let mut buf = [0u8; 4];
        self.0.fill(&mut buf);
        u32::from_le_bytes(buf)
    }

    fn next_u64(&mut self) -> u64 {
        let mut buf = [0u8; 8];
        self.0.fill(&mut buf);
        u64::from_le_bytes(buf)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rsa::rand_core::Error> {
        self.0.fill(dest);
        Ok(())
    }
}

impl rsa::rand_core::CryptoRng for RngBridge<'_, '_> {}
