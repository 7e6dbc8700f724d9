//! HMAC-SHA2 signatures (HS256, HS384, HS512)

use crate::algorithms::{secret_bytes, HashAlgorithm, Identifiable, SignatureAlgorithm};
use crate::encoding::constant_time_eq;
use crate::error::{JoseError, JoseResult};
use crate::key::{Key, SecretKey};
use crate::random::Randomness;
use crate::request::{SignatureRequest, VerifySignatureRequest};
use tracing::debug;

/// HMAC with a SHA-2 digest.
#[derive(Debug)]
pub struct HmacSignatureAlgorithm {
    id: &'static str,
    hash: HashAlgorithm,
}

impl HmacSignatureAlgorithm {
    pub(crate) const fn new(id: &'static str, hash: HashAlgorithm) -> Self {
        Self { id, hash }
    }

    /// Digest backing this MAC.
    #[must_use]
    pub fn hash(&self) -> HashAlgorithm {
        self.hash
    }

    /// Minimum key length in bits (RFC 7518 §3.2).
    #[must_use]
    pub fn min_key_bits(&self) -> usize {
        self.hash.output_len() * 8
    }

    /// Random key of exactly the minimum length.
    #[must_use]
    pub fn generate_key(&self, random: &mut Randomness<'_>) -> SecretKey {
        SecretKey::with_algorithm(random.bytes(self.hash.output_len()).to_vec(), self.id)
    }

    fn key_bytes<'k>(&self, key: &'k Key) -> JoseResult<&'k [u8]> {
        let Key::Secret(secret) = key else {
            return Err(JoseError::invalid_key(format!(
                "{} requires a secret key, found {}",
                self.id,
                key.describe()
            )));
        };
        let bytes = secret_bytes(secret, self.id)?;
        let bits = bytes.len() * 8;
        if bits < self.min_key_bits() {
            return Err(JoseError::weak_key(
                format!(
                    "The {bits}-bit key is not secure enough for {}; RFC 7518 §3.2 requires a key at least as long as the hash output",
                    self.id
                ),
                self.min_key_bits(),
                bits,
            ));
        }
        Ok(bytes)
    }

    fn mac(&self, key: &Key, payload: &[u8]) -> JoseResult<Vec<u8>> {
        let bytes = self.key_bytes(key)?;
        Ok(self.hash.hmac(bytes, &[payload])?.to_vec())
    }
}

impl Identifiable for HmacSignatureAlgorithm {
    fn id(&self) -> &'static str {
        self.id
    }
}

impl SignatureAlgorithm for HmacSignatureAlgorithm {
    fn validate_key(&self, key: &Key, _signing: bool) -> JoseResult<()> {
        self.key_bytes(key).map(|_| ())
    }

    fn sign(&self, request: SignatureRequest<'_>) -> JoseResult<Vec<u8>> {
        if request.payload.is_empty() {
            return Err(JoseError::invalid_request("Signing input cannot be empty"));
        }
        debug!(alg = self.id, "Computing HMAC signature");
        self.mac(request.key, request.payload)
    }

    fn verify(&self, request: VerifySignatureRequest<'_>) -> JoseResult<bool> {
        if request.payload.is_empty() {
            return Err(JoseError::invalid_request("Signing input cannot be empty"));
        }
        let expected = self.mac(request.key, request.payload)?;
        Ok(constant_time_eq(request.signature, &expected))
    }
}
