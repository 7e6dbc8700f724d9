//! Shared fixtures for the integration tests

#![allow(dead_code)]

use cryypt_jose::jwa;
use cryypt_jose::Randomness;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rsa::RsaPrivateKey;
use std::sync::OnceLock;

/// Route `tracing` events to `env_logger` when `RUST_LOG` is set.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Deterministic CSPRNG for reproducible IVs and keys.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// One 2048-bit RSA key shared by every test in the binary.
pub fn rsa_2048() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| {
        let mut rng = seeded_rng(2048);
        jwa::RS256
            .generate_key_pair(None, &mut Randomness::from_rng(&mut rng))
            .expect("RSA key generation")
    })
}

/// A 1024-bit RSA key, below the JOSE minimum.
pub fn rsa_1024() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| {
        RsaPrivateKey::new(&mut rsa::rand_core::OsRng, 1024).expect("RSA key generation")
    })
}
