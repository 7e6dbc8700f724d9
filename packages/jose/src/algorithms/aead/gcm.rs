//! AES-GCM content encryption (A128GCM, A192GCM, A256GCM)

use crate::algorithms::{secret_bytes, AeadAlgorithm, Identifiable};
use crate::error::{JoseError, JoseResult};
use crate::request::{AeadRequest, AeadResult, DecryptAeadRequest, Message};
use aes_gcm::aead::consts::{U12, U16};
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes128Gcm, Aes256Gcm, AesGcm};
use tracing::warn;

type Aes192Gcm = AesGcm<aes::Aes192, U12>;

const IV_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// AES in Galois/Counter Mode with a 96-bit IV and 128-bit tag.
#[derive(Debug)]
pub struct GcmAeadAlgorithm {
    id: &'static str,
    key_len: usize,
}

impl GcmAeadAlgorithm {
    pub(crate) const fn new(id: &'static str, key_len: usize) -> Self {
        Self { id, key_len }
    }

    fn check_key<'k>(&self, key: &'k [u8]) -> JoseResult<&'k [u8]> {
        if key.len() != self.key_len {
            let bits = key.len() * 8;
            let required = self.key_len * 8;
            let message = format!(
                "{} requires a {required}-bit key, the supplied key is {bits} bits",
                self.id
            );
            return Err(if bits < required {
                JoseError::weak_key(message, required, bits)
            } else {
                JoseError::invalid_key(message)
            });
        }
        Ok(key)
    }
}

fn seal<C>(
    key: &[u8],
    iv: &[u8],
    aad: &[u8],
    plaintext: &[u8],
) -> JoseResult<(Vec<u8>, Vec<u8>)>
where
    C: AeadInPlace<NonceSize = U12, TagSize = U16> + KeyInit,
{
    let cipher =
        C::new_from_slice(key).map_err(|_| JoseError::invalid_key("Invalid AES key length"))?;
    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(GenericArray::from_slice(iv), aad, &mut buffer)
        .map_err(|e| JoseError::Encryption(format!("AES-GCM encryption failed: {e}")))?;
    Ok((buffer, tag.to_vec()))
}

fn open<C>(
    key: &[u8],
    iv: &[u8],
    aad: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> JoseResult<Vec<u8>>
where
    C: AeadInPlace<NonceSize = U12, TagSize = U16> + KeyInit,
{
    let cipher =
        C::new_from_slice(key).map_err(|_| JoseError::invalid_key("Invalid AES key length"))?;
    let mut buffer = ciphertext.to_vec();
    cipher
        .decrypt_in_place_detached(
            GenericArray::from_slice(iv),
            aad,
            &mut buffer,
            GenericArray::from_slice(tag),
        )
        .map_err(|_| JoseError::signature("Authentication tag check failed"))?;
    Ok(buffer)
}

impl Identifiable for GcmAeadAlgorithm {
    fn id(&self) -> &'static str {
        self.id
    }
}

impl AeadAlgorithm for GcmAeadAlgorithm {
    fn key_bit_length(&self) -> usize {
        self.key_len * 8
    }

    fn encrypt(&self, mut request: AeadRequest<'_>) -> JoseResult<AeadResult> {
        if request.content.is_empty() {
            return Err(JoseError::invalid_request("Plaintext cannot be empty"));
        }
        let key = self.check_key(secret_bytes(request.key, self.id)?)?;
        let iv = match request.iv {
            Some(iv) if iv.len() == IV_LEN => iv.to_vec(),
            Some(iv) => {
                return Err(JoseError::invalid_request(format!(
                    "{} requires a {IV_LEN}-byte IV, found {} bytes",
                    self.id,
                    iv.len()
                )))
            }
            None => request.random.bytes(IV_LEN).to_vec(),
        };
        let aad = request.aad.unwrap_or_default();
        let (ciphertext, tag) = match self.key_len {
            16 => seal::<Aes128Gcm>(key, &iv, aad, request.content)?,
            24 => seal::<Aes192Gcm>(key, &iv, aad, request.content)?,
            _ => seal::<Aes256Gcm>(key, &iv, aad, request.content)?,
        };
        Ok(AeadResult {
            ciphertext,
            tag,
            iv,
        })
    }

    fn decrypt(&self, request: DecryptAeadRequest<'_>) -> JoseResult<Message> {
        if request.content.is_empty() {
            return Err(JoseError::invalid_request("Ciphertext cannot be empty"));
        }
        let key = self.check_key(secret_bytes(request.key, self.id)?)?;
        if request.iv.len() != IV_LEN {
            return Err(JoseError::invalid_request(format!(
                "{} requires a {IV_LEN}-byte IV, found {} bytes",
                self.id,
                request.iv.len()
            )));
        }
        if request.tag.len() != TAG_LEN {
            warn!(
                alg = self.id,
                tag_len = request.tag.len(),
                "Authentication tag has the wrong length"
            );
            return Err(JoseError::signature("Authentication tag check failed"));
        }
        let aad = request.aad.unwrap_or_default();
        let plaintext = match self.key_len {
            16 => open::<Aes128Gcm>(key, request.iv, aad, request.content, request.tag),
            24 => open::<Aes192Gcm>(key, request.iv, aad, request.content, request.tag),
            _ => open::<Aes256Gcm>(key, request.iv, aad, request.content, request.tag),
        };
        match plaintext {
            Ok(plaintext) => Ok(Message::new(plaintext)),
            Err(err) => {
                warn!(alg = self.id, "Authentication tag check failed");
                Err(err)
            }
        }
    }
}
