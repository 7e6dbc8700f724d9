//! `dir`: the shared symmetric key is used as the content encryption key

use crate::algorithms::{Identifiable, KeyAlgorithm, KeyAlgorithmCategory};
use crate::error::{JoseError, JoseResult};
use crate::key::{Key, SecretKey};
use crate::request::{DecryptionKeyRequest, KeyRequest, KeyResult};

/// Direct use of a shared symmetric key.
#[derive(Debug, Default)]
pub struct DirectKeyAlgorithm;

impl DirectKeyAlgorithm {
    fn secret<'k>(key: &'k Key) -> JoseResult<&'k SecretKey> {
        match key {
            Key::Secret(secret) => Ok(secret),
            other => Err(JoseError::invalid_key(format!(
                "dir requires a secret key, found {}",
                other.describe()
            ))),
        }
    }
}

impl Identifiable for DirectKeyAlgorithm {
    fn id(&self) -> &'static str {
        "dir"
    }
}

impl KeyAlgorithm for DirectKeyAlgorithm {
    fn category(&self) -> KeyAlgorithmCategory {
        KeyAlgorithmCategory::Direct
    }

    fn get_encryption_key(&self, request: KeyRequest<'_>) -> JoseResult<KeyResult> {
        Ok(KeyResult::direct(Self::secret(request.key)?.clone()))
    }

    fn get_decryption_key(&self, request: DecryptionKeyRequest<'_>) -> JoseResult<SecretKey> {
        if !request.encrypted_key.is_empty() {
            return Err(JoseError::key_management(
                "dir requires an empty encrypted key segment",
            ));
        }
        Ok(Self::secret(request.key)?.clone())
    }
}
