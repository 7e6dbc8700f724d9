//! RSAES-OAEP key encryption: RSA-OAEP (SHA-1) and RSA-OAEP-256 (SHA-256)

use crate::algorithms::signature::rsa::MIN_RSA_KEY_BITS;
use crate::algorithms::{secret_bytes, Identifiable, KeyAlgorithm, KeyAlgorithmCategory};
use crate::error::{JoseError, JoseResult};
use crate::key::{Key, SecretKey};
use crate::request::{DecryptionKeyRequest, KeyRequest, KeyResult};
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, RsaPrivateKey};
use tracing::{debug, warn};

/// OAEP digest, also used for MGF1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OaepHash {
    /// SHA-1, as RFC 7518 §4.3 specifies for `RSA-OAEP`
    Sha1,
    /// SHA-256
    Sha256,
}

/// RSA-OAEP key encryption.
#[derive(Debug)]
pub struct RsaOaepKeyAlgorithm {
    id: &'static str,
    hash: OaepHash,
}

impl RsaOaepKeyAlgorithm {
    pub(crate) const fn new(id: &'static str, hash: OaepHash) -> Self {
        Self { id, hash }
    }

    fn padding(&self) -> Oaep {
        match self.hash {
            OaepHash::Sha1 => Oaep::new::<sha1::Sha1>(),
            OaepHash::Sha256 => Oaep::new::<sha2::Sha256>(),
        }
    }

    fn check_strength(&self, bits: usize) -> JoseResult<()> {
        if bits < MIN_RSA_KEY_BITS {
            return Err(JoseError::weak_key(
                format!(
                    "The RSA key size is {bits} bits, which is not secure enough for {}. RFC 7518 §4.3 requires RSA keys of {MIN_RSA_KEY_BITS} bits or larger.",
                    self.id
                ),
                MIN_RSA_KEY_BITS,
                bits,
            ));
        }
        Ok(())
    }

    fn decryption_key<'k>(&self, key: &'k Key) -> JoseResult<&'k RsaPrivateKey> {
        match key {
            Key::RsaPrivate(private) => {
                self.check_strength(private.n().bits())?;
                Ok(private)
            }
            other => Err(JoseError::invalid_key(format!(
                "{} decryption requires an RSA private key, found {}",
                self.id,
                other.describe()
            ))),
        }
    }
}

impl Identifiable for RsaOaepKeyAlgorithm {
    fn id(&self) -> &'static str {
        self.id
    }
}

impl KeyAlgorithm for RsaOaepKeyAlgorithm {
    fn category(&self) -> KeyAlgorithmCategory {
        KeyAlgorithmCategory::KeyEncryption
    }

    fn get_encryption_key(&self, mut request: KeyRequest<'_>) -> JoseResult<KeyResult> {
        let cek = request.cek.ok_or_else(|| {
            JoseError::invalid_request(format!("{} requires a content encryption key", self.id))
        })?;
        let public = match request.key {
            Key::RsaPublic(public) => public.clone(),
            Key::RsaPrivate(private) => private.to_public_key(),
            other => {
                return Err(JoseError::invalid_key(format!(
                    "{} encryption requires an RSA public key, found {}",
                    self.id,
                    other.describe()
                )))
            }
        };
        self.check_strength(public.n().bits())?;
        debug!(alg = self.id, bits = public.n().bits(), "Encrypting CEK with RSA-OAEP");
        let encrypted = public
            .encrypt(&mut request.random.bridge(), self.padding(), secret_bytes(cek, self.id)?)
            .map_err(|e| JoseError::key_management(format!("RSA-OAEP encryption failed: {e}")))?;
        Ok(KeyResult::wrapped(cek.clone(), encrypted))
    }

    fn get_decryption_key(&self, request: DecryptionKeyRequest<'_>) -> JoseResult<SecretKey> {
        let private = self.decryption_key(request.key)?;
        let cek = private
            .decrypt(self.padding(), request.encrypted_key)
            .map_err(|_| {
                warn!(alg = self.id, "RSA-OAEP decryption failed");
                JoseError::key_management("RSA-OAEP decryption failed")
            })?;
        Ok(SecretKey::with_algorithm(cek, request.enc.id()))
    }
}
