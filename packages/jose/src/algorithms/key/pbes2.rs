//! Password-based key encryption, PBES2-HSxxx+AxxxKW (RFC 7518 §4.8)
//!
//! The key-encryption key is PBKDF2 over the password with salt input
//! `UTF8(alg) || 0x00 || p2s`. The generated CEK is AES-wrapped under it.

use crate::algorithms::key::aes_kw;
use crate::algorithms::{
    secret_bytes, HashAlgorithm, Identifiable, KeyAlgorithm, KeyAlgorithmCategory,
};
use crate::config::Pbes2Config;
use crate::encoding::{base64_url_decode, base64_url_encode};
use crate::error::{JoseError, JoseResult};
use crate::header::Header;
use crate::key::{Key, SecretKey};
use crate::request::{DecryptionKeyRequest, KeyRequest, KeyResult};
use pbkdf2::pbkdf2_hmac;
use serde_json::Value;
use sha2::{Sha256, Sha384, Sha512};
use tracing::{debug, warn};
use zeroize::Zeroizing;

const MIN_SALT_LEN: usize = 8;

/// PBKDF2 with HMAC-SHA2 followed by AES key wrap.
#[derive(Debug)]
pub struct Pbes2KeyAlgorithm {
    id: &'static str,
    hash: HashAlgorithm,
    kek_len: usize,
    default_iterations: u32,
    min_iterations: u32,
    max_iterations: u32,
    salt_len: usize,
}

impl Pbes2KeyAlgorithm {
    pub(crate) const fn new(
        id: &'static str,
        hash: HashAlgorithm,
        kek_len: usize,
        default_iterations: u32,
    ) -> Self {
        Self {
            id,
            hash,
            kek_len,
            default_iterations,
            min_iterations: 1_000,
            max_iterations: 1_000_000,
            salt_len: 16,
        }
    }

    /// Same algorithm with iteration policy and salt length from `config`.
    #[must_use]
    pub fn with_config(&self, config: &Pbes2Config) -> Self {
        let default_iterations = match self.hash {
            HashAlgorithm::Sha256 => config.hs256_iterations,
            HashAlgorithm::Sha384 => config.hs384_iterations,
            HashAlgorithm::Sha512 => config.hs512_iterations,
        };
        Self {
            id: self.id,
            hash: self.hash,
            kek_len: self.kek_len,
            default_iterations,
            min_iterations: config.min_iterations,
            max_iterations: config.max_iterations,
            salt_len: config.salt_len,
        }
    }

    /// `p2c` used when the header does not fix one.
    #[must_use]
    pub fn default_iterations(&self) -> u32 {
        self.default_iterations
    }

    fn check_iterations(&self, count: u64) -> JoseResult<u32> {
        if count < u64::from(self.min_iterations) || count > u64::from(self.max_iterations) {
            return Err(JoseError::invalid_request(format!(
                "{} iteration count {count} is outside the accepted range [{}, {}]",
                self.id, self.min_iterations, self.max_iterations
            )));
        }
        u32::try_from(count).map_err(|_| JoseError::internal("Iteration count overflow"))
    }

    fn iterations(&self, header: &Header) -> JoseResult<Option<u32>> {
        match header.get("p2c") {
            None => Ok(None),
            Some(value) => match value.as_u64() {
                Some(count) => self.check_iterations(count).map(Some),
                None => Err(JoseError::invalid_request(
                    "Header parameter 'p2c' must be a positive integer",
                )),
            },
        }
    }

    fn password<'k>(&self, key: &'k Key) -> JoseResult<&'k [u8]> {
        match key {
            Key::Password(password) if password.as_bytes().is_empty() => Err(
                JoseError::invalid_key(format!("{} password cannot be empty", self.id)),
            ),
            Key::Password(password) => Ok(password.as_bytes()),
            other => Err(JoseError::invalid_key(format!(
                "{} requires a password, found {}",
                self.id,
                other.describe()
            ))),
        }
    }

    fn derive_kek(&self, password: &[u8], p2s: &[u8], iterations: u32) -> Zeroizing<Vec<u8>> {
        let mut salt = Vec::with_capacity(self.id.len() + 1 + p2s.len());
        salt.extend_from_slice(self.id.as_bytes());
        salt.push(0);
        salt.extend_from_slice(p2s);

        let mut kek = Zeroizing::new(vec![0u8; self.kek_len]);
        match self.hash {
            HashAlgorithm::Sha256 => pbkdf2_hmac::<Sha256>(password, &salt, iterations, &mut kek),
            HashAlgorithm::Sha384 => pbkdf2_hmac::<Sha384>(password, &salt, iterations, &mut kek),
            HashAlgorithm::Sha512 => pbkdf2_hmac::<Sha512>(password, &salt, iterations, &mut kek),
        }
        kek
    }
}

impl Identifiable for Pbes2KeyAlgorithm {
    fn id(&self) -> &'static str {
        self.id
    }
}

impl KeyAlgorithm for Pbes2KeyAlgorithm {
    fn category(&self) -> KeyAlgorithmCategory {
        KeyAlgorithmCategory::KeyEncryption
    }

    fn get_encryption_key(&self, mut request: KeyRequest<'_>) -> JoseResult<KeyResult> {
        let cek = request.cek.ok_or_else(|| {
            JoseError::invalid_request(format!("{} requires a content encryption key", self.id))
        })?;
        let password = self.password(request.key)?;
        let iterations = match self.iterations(request.header)? {
            Some(count) => count,
            None => self.check_iterations(u64::from(self.default_iterations))?,
        };
        let p2s = request.random.bytes(self.salt_len);
        debug!(alg = self.id, iterations, "Deriving PBES2 key-encryption key");
        let kek = self.derive_kek(password, &p2s, iterations);
        let encrypted = aes_kw::wrap(&kek, secret_bytes(cek, self.id)?)?;
        Ok(KeyResult::wrapped(cek.clone(), encrypted)
            .with_header_param("p2s", base64_url_encode(&p2s))
            .with_header_param("p2c", iterations))
    }

    fn get_decryption_key(&self, request: DecryptionKeyRequest<'_>) -> JoseResult<SecretKey> {
        let password = self.password(request.key)?;
        let iterations = self.iterations(request.header)?.ok_or_else(|| {
            JoseError::invalid_request(format!("{} requires the 'p2c' header parameter", self.id))
        })?;
        let p2s = match request.header.get("p2s") {
            Some(Value::String(encoded)) => base64_url_decode(encoded)?,
            _ => {
                return Err(JoseError::invalid_request(format!(
                    "{} requires the 'p2s' header parameter",
                    self.id
                )))
            }
        };
        if p2s.len() < MIN_SALT_LEN {
            warn!(alg = self.id, salt_len = p2s.len(), "Rejecting short PBES2 salt");
            return Err(JoseError::invalid_request(format!(
                "{} salt must be at least {MIN_SALT_LEN} bytes",
                self.id
            )));
        }
        let kek = self.derive_kek(password, &p2s, iterations);
        let cek = aes_kw::unwrap(&kek, request.encrypted_key)?;
        Ok(SecretKey::with_algorithm(cek.to_vec(), request.enc.id()))
    }
}
