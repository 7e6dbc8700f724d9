//! Tunable defaults for the algorithm catalog

use crate::compression::DEFAULT_MAX_DECOMPRESSED_LEN;
use crate::error::{JoseError, JoseResult};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoseConfig {
    /// PBES2 key derivation settings
    #[serde(default)]
    pub pbes2: Pbes2Config,
    /// RSA key generation settings
    #[serde(default)]
    pub rsa: RsaConfig,
    /// `zip` payload limits
    #[serde(default)]
    pub compression: CompressionConfig,
}

/// Limits applied when a JWE payload is decompressed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionConfig {
    /// Largest accepted decompressed payload, in bytes
    #[serde(default = "default_max_decompressed_len")]
    pub max_decompressed_len: usize,
}

/// PBES2 iteration policy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pbes2Config {
    /// Default `p2c` for PBES2-HS256+A128KW
    #[serde(default = "default_hs256_iterations")]
    pub hs256_iterations: u32,
    /// Default `p2c` for PBES2-HS384+A192KW
    #[serde(default = "default_hs384_iterations")]
    pub hs384_iterations: u32,
    /// Default `p2c` for PBES2-HS512+A256KW
    #[serde(default = "default_hs512_iterations")]
    pub hs512_iterations: u32,
    /// Lowest accepted `p2c`
    #[serde(default = "default_min_iterations")]
    pub min_iterations: u32,
    /// Highest accepted `p2c`, bounds work done on untrusted headers
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    /// Length of generated `p2s` salts in bytes
    #[serde(default = "default_salt_len")]
    pub salt_len: usize,
}

/// RSA key generation sizes, in bits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsaConfig {
    /// RS256 / PS256
    #[serde(default = "default_rsa_256_bits")]
    pub sha256_bits: usize,
    /// RS384 / PS384
    #[serde(default = "default_rsa_384_bits")]
    pub sha384_bits: usize,
    /// RS512 / PS512
    #[serde(default = "default_rsa_512_bits")]
    pub sha512_bits: usize,
}

fn default_hs256_iterations() -> u32 {
    310_000
}

fn default_hs384_iterations() -> u32 {
    250_000
}

fn default_hs512_iterations() -> u32 {
    120_000
}

fn default_min_iterations() -> u32 {
    1_000
}

fn default_max_iterations() -> u32 {
    1_000_000
}

fn default_salt_len() -> usize {
    16
}

fn default_max_decompressed_len() -> usize {
    DEFAULT_MAX_DECOMPRESSED_LEN
}

fn default_rsa_256_bits() -> usize {
    2048
}

fn default_rsa_384_bits() -> usize {
    3072
}

fn default_rsa_512_bits() -> usize {
    4096
}

impl Default for Pbes2Config {
    fn default() -> Self {
        Self {
            hs256_iterations: default_hs256_iterations(),
            hs384_iterations: default_hs384_iterations(),
            hs512_iterations: default_hs512_iterations(),
            min_iterations: default_min_iterations(),
            max_iterations: default_max_iterations(),
            salt_len: default_salt_len(),
        }
    }
}

impl Default for RsaConfig {
    fn default() -> Self {
        Self {
            sha256_bits: default_rsa_256_bits(),
            sha384_bits: default_rsa_384_bits(),
            sha512_bits: default_rsa_512_bits(),
        }
    }
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            max_decompressed_len: default_max_decompressed_len(),
        }
    }
}

impl JoseConfig {
    /// Load configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> JoseResult<Self> {
        let config: JoseConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would weaken or break the algorithms.
    pub fn validate(&self) -> JoseResult<()> {
        let pbes2 = &self.pbes2;
        if pbes2.min_iterations == 0 || pbes2.min_iterations > pbes2.max_iterations {
            return Err(JoseError::invalid_request(format!(
                "PBES2 iteration bounds [{}, {}] are invalid",
                pbes2.min_iterations, pbes2.max_iterations
            )));
        }
        for count in [
            pbes2.hs256_iterations,
            pbes2.hs384_iterations,
            pbes2.hs512_iterations,
        ] {
            if count < pbes2.min_iterations || count > pbes2.max_iterations {
                return Err(JoseError::invalid_request(format!(
                    "PBES2 default iteration count {count} is outside [{}, {}]",
                    pbes2.min_iterations, pbes2.max_iterations
                )));
            }
        }
        if pbes2.salt_len < 8 {
            return Err(JoseError::invalid_request(
                "PBES2 salt length must be at least 8 bytes",
            ));
        }
        for bits in [self.rsa.sha256_bits, self.rsa.sha384_bits, self.rsa.sha512_bits] {
            if bits < crate::algorithms::signature::rsa::MIN_RSA_KEY_BITS {
                return Err(JoseError::weak_key(
                    format!("Configured RSA key size {bits} is below the JWA minimum"),
                    crate::algorithms::signature::rsa::MIN_RSA_KEY_BITS,
                    bits,
                ));
            }
        }
        if self.compression.max_decompressed_len == 0 {
            return Err(JoseError::invalid_request(
                "Maximum decompressed payload length must be positive",
            ));
        }
        if pbes2.min_iterations < default_min_iterations() {
            warn!(
                min_iterations = pbes2.min_iterations,
                "PBES2 minimum iteration count is below the recommended floor"
            );
        }
        Ok(())
    }
}
