//! JWA algorithm families
//!
//! Each family is a capability trait with a fixed set of `static` catalog
//! instances in [`jwa`]. Instances hold only fixed parameters and are safe to
//! share across threads.

pub mod aead;
pub mod jwa;
pub mod key;
pub mod provider;
pub mod signature;

use crate::error::{JoseError, JoseResult};
use crate::key::{Key, SecretKey};
use crate::random::Randomness;
use crate::request::{
    AeadRequest, AeadResult, DecryptAeadRequest, DecryptionKeyRequest, KeyRequest, KeyResult,
    Message, SignatureRequest, VerifySignatureRequest,
};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha384, Sha512};
use std::fmt::Debug;
use zeroize::Zeroizing;

/// Anything named by a JOSE `alg` or `enc` identifier.
pub trait Identifiable {
    /// Case-sensitive JWA identifier, e.g. `"A256CBC-HS512"`.
    fn id(&self) -> &'static str;
}

/// JWS signing algorithms.
pub trait SignatureAlgorithm: Identifiable + Send + Sync + Debug {
    /// Check that `key` is usable, for signing when `signing` is true and for
    /// verification otherwise.
    fn validate_key(&self, key: &Key, signing: bool) -> JoseResult<()>;

    /// Sign the request payload.
    fn sign(&self, request: SignatureRequest<'_>) -> JoseResult<Vec<u8>>;

    /// Verify a signature. `Ok(false)` means the signature does not match.
    fn verify(&self, request: VerifySignatureRequest<'_>) -> JoseResult<bool>;
}

/// JWE content encryption algorithms.
pub trait AeadAlgorithm: Identifiable + Send + Sync + Debug {
    /// Required content encryption key size in bits.
    fn key_bit_length(&self) -> usize;

    /// Fresh random content encryption key of the right size.
    fn generate_key(&self, random: &mut Randomness<'_>) -> SecretKey {
        SecretKey::with_algorithm(
            random.bytes(self.key_bit_length() / 8).to_vec(),
            self.id(),
        )
    }

    /// Encrypt and authenticate.
    fn encrypt(&self, request: AeadRequest<'_>) -> JoseResult<AeadResult>;

    /// Authenticate and decrypt.
    fn decrypt(&self, request: DecryptAeadRequest<'_>) -> JoseResult<Message>;
}

/// Whether the JWE builder must supply a content encryption key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAlgorithmCategory {
    /// The algorithm supplies or derives the CEK itself.
    Direct,
    /// The builder generates a CEK which the algorithm encrypts.
    KeyEncryption,
}

/// JWE key management algorithms.
pub trait KeyAlgorithm: Identifiable + Send + Sync + Debug {
    /// Direct or key-encryption.
    fn category(&self) -> KeyAlgorithmCategory;

    /// Produce the CEK and its encrypted form for a recipient.
    fn get_encryption_key(&self, request: KeyRequest<'_>) -> JoseResult<KeyResult>;

    /// Recover the CEK from the encrypted key segment.
    fn get_decryption_key(&self, request: DecryptionKeyRequest<'_>) -> JoseResult<SecretKey>;
}

/// SHA-2 digests used across the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// SHA-256
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
}

impl HashAlgorithm {
    /// Digest size in bytes.
    #[must_use]
    pub fn output_len(self) -> usize {
        match self {
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }

    /// Standard name, e.g. `"SHA-256"`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "SHA-256",
            HashAlgorithm::Sha384 => "SHA-384",
            HashAlgorithm::Sha512 => "SHA-512",
        }
    }

    /// Hash `data`.
    #[must_use]
    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            HashAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
            HashAlgorithm::Sha384 => Sha384::digest(data).to_vec(),
            HashAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
        }
    }

    /// HMAC over the concatenation of `parts`.
    pub fn hmac(self, key: &[u8], parts: &[&[u8]]) -> JoseResult<Zeroizing<Vec<u8>>> {
        fn run<M: Mac + hmac::digest::KeyInit>(
            key: &[u8],
            parts: &[&[u8]],
        ) -> JoseResult<Zeroizing<Vec<u8>>> {
            let mut mac = <M as hmac::digest::KeyInit>::new_from_slice(key)
                .map_err(|_| JoseError::invalid_key("Invalid HMAC key"))?;
            for part in parts {
                mac.update(part);
            }
            Ok(Zeroizing::new(mac.finalize().into_bytes().to_vec()))
        }

        match self {
            HashAlgorithm::Sha256 => run::<Hmac<Sha256>>(key, parts),
            HashAlgorithm::Sha384 => run::<Hmac<Sha384>>(key, parts),
            HashAlgorithm::Sha512 => run::<Hmac<Sha512>>(key, parts),
        }
    }
}

/// Raw bytes of a secret key, or unsupported-key for opaque handles.
pub(crate) fn secret_bytes<'k>(key: &'k SecretKey, alg: &str) -> JoseResult<&'k [u8]> {
    key.encoded().ok_or_else(|| {
        JoseError::unsupported_key(format!(
            "{alg} requires exportable key bytes; the supplied {} key is opaque",
            key.algorithm()
        ))
    })
}
