//! AES key wrap (RFC 3394): A128KW, A192KW, A256KW

use crate::algorithms::{secret_bytes, Identifiable, KeyAlgorithm, KeyAlgorithmCategory};
use crate::error::{JoseError, JoseResult};
use crate::key::{Key, SecretKey};
use crate::request::{DecryptionKeyRequest, KeyRequest, KeyResult};
use aes::cipher::generic_array::GenericArray;
use aes_kw::{KekAes128, KekAes192, KekAes256};
use zeroize::Zeroizing;

/// AES key wrap with a shared key-encryption key.
#[derive(Debug)]
pub struct AesWrapKeyAlgorithm {
    id: &'static str,
    kek_len: usize,
}

impl AesWrapKeyAlgorithm {
    pub(crate) const fn new(id: &'static str, kek_len: usize) -> Self {
        Self { id, kek_len }
    }

    /// Key-encryption key length in bytes.
    #[must_use]
    pub fn kek_len(&self) -> usize {
        self.kek_len
    }

    fn kek<'k>(&self, key: &'k Key) -> JoseResult<&'k [u8]> {
        let Key::Secret(secret) = key else {
            return Err(JoseError::invalid_key(format!(
                "{} requires a secret key, found {}",
                self.id,
                key.describe()
            )));
        };
        let bytes = secret_bytes(secret, self.id)?;
        check_kek_len(self.id, bytes, self.kek_len)?;
        Ok(bytes)
    }
}

fn check_kek_len(alg: &str, kek: &[u8], kek_len: usize) -> JoseResult<()> {
    if kek.len() != kek_len {
        let bits = kek.len() * 8;
        let required = kek_len * 8;
        let message =
            format!("{alg} requires a {required}-bit key, the supplied key is {bits} bits");
        return Err(if bits < required {
            JoseError::weak_key(message, required, bits)
        } else {
            JoseError::invalid_key(message)
        });
    }
    Ok(())
}

/// Wrap `cek` under `kek`. `kek` must be 16, 24 or 32 bytes.
pub(crate) fn wrap(kek: &[u8], cek: &[u8]) -> JoseResult<Vec<u8>> {
    if cek.len() < 16 || cek.len() % 8 != 0 {
        return Err(JoseError::key_management(format!(
            "Cannot wrap a {}-byte key; AES key wrap requires a multiple of 8 bytes, at least 16",
            cek.len()
        )));
    }
    let mut out = vec![0u8; cek.len() + 8];
    let result = match kek.len() {
        16 => KekAes128::new(GenericArray::from_slice(kek)).wrap(cek, &mut out),
        24 => KekAes192::new(GenericArray::from_slice(kek)).wrap(cek, &mut out),
        32 => KekAes256::new(GenericArray::from_slice(kek)).wrap(cek, &mut out),
        other => {
            return Err(JoseError::invalid_key(format!(
                "Invalid AES key wrap key length {other}"
            )))
        }
    };
    result.map_err(|e| JoseError::key_management(format!("Key wrap failed: {e}")))?;
    Ok(out)
}

/// Unwrap `wrapped` under `kek`, returning the CEK bytes.
pub(crate) fn unwrap(kek: &[u8], wrapped: &[u8]) -> JoseResult<Zeroizing<Vec<u8>>> {
    if wrapped.len() < 24 || wrapped.len() % 8 != 0 {
        return Err(JoseError::key_management(format!(
            "Encrypted key of {} bytes is not a valid AES key wrap output",
            wrapped.len()
        )));
    }
    let mut out = Zeroizing::new(vec![0u8; wrapped.len() - 8]);
    let result = match kek.len() {
        16 => KekAes128::new(GenericArray::from_slice(kek)).unwrap(wrapped, &mut out),
        24 => KekAes192::new(GenericArray::from_slice(kek)).unwrap(wrapped, &mut out),
        32 => KekAes256::new(GenericArray::from_slice(kek)).unwrap(wrapped, &mut out),
        other => {
            return Err(JoseError::invalid_key(format!(
                "Invalid AES key wrap key length {other}"
            )))
        }
    };
    result.map_err(|_| JoseError::key_management("Key unwrap failed integrity check"))?;
    Ok(out)
}

impl Identifiable for AesWrapKeyAlgorithm {
    fn id(&self) -> &'static str {
        self.id
    }
}

impl KeyAlgorithm for AesWrapKeyAlgorithm {
    fn category(&self) -> KeyAlgorithmCategory {
        KeyAlgorithmCategory::KeyEncryption
    }

    fn get_encryption_key(&self, request: KeyRequest<'_>) -> JoseResult<KeyResult> {
        let cek = request.cek.ok_or_else(|| {
            JoseError::invalid_request(format!("{} requires a content encryption key", self.id))
        })?;
        let kek = self.kek(request.key)?;
        let encrypted = wrap(kek, secret_bytes(cek, self.id)?)?;
        Ok(KeyResult::wrapped(cek.clone(), encrypted))
    }

    fn get_decryption_key(&self, request: DecryptionKeyRequest<'_>) -> JoseResult<SecretKey> {
        let kek = self.kek(request.key)?;
        let cek = unwrap(kek, request.encrypted_key)?;
        Ok(SecretKey::with_algorithm(cek.to_vec(), request.enc.id()))
    }
}
