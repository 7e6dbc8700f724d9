//! AES-CBC with HMAC-SHA2 (RFC 7518 §5.2)
//!
//! The content encryption key is `MAC_KEY || ENC_KEY`, each half the AES key
//! length. The tag is the HMAC over `AAD || IV || ciphertext || AL`,
//! truncated to the MAC key length, where `AL` is the AAD length in bits as a
//! 64-bit big-endian integer. An absent AAD still contributes `AL = 0`.
//!
//! Decryption recomputes and checks the tag in constant time before any
//! block is decrypted.

use crate::algorithms::{secret_bytes, AeadAlgorithm, HashAlgorithm, Identifiable};
use crate::encoding::constant_time_eq;
use crate::error::{JoseError, JoseResult};
use crate::request::{AeadRequest, AeadResult, DecryptAeadRequest, Message};
use aes::cipher::consts::U16;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes128, Aes192, Aes256};
use tracing::{debug, trace, warn};
use zeroize::Zeroizing;

const BLOCK_LEN: usize = 16;

/// AxxxCBC-HSxxx composite AEAD.
#[derive(Debug)]
pub struct HmacAesAeadAlgorithm {
    id: &'static str,
    enc_key_len: usize,
    hash: HashAlgorithm,
}

impl HmacAesAeadAlgorithm {
    pub(crate) const fn new(id: &'static str, enc_key_len: usize, hash: HashAlgorithm) -> Self {
        Self {
            id,
            enc_key_len,
            hash,
        }
    }

    /// Tag length in bytes, equal to the MAC key length.
    #[must_use]
    pub fn tag_len(&self) -> usize {
        self.enc_key_len
    }

    fn split_key<'k>(&self, key: &'k [u8]) -> JoseResult<(&'k [u8], &'k [u8])> {
        let required = self.enc_key_len * 2;
        if key.len() < required {
            return Err(JoseError::weak_key(
                format!(
                    "{} requires a {}-bit key, the supplied key is {} bits",
                    self.id,
                    required * 8,
                    key.len() * 8
                ),
                required * 8,
                key.len() * 8,
            ));
        }
        if key.len() != required {
            return Err(JoseError::invalid_key(format!(
                "{} requires a {}-bit key, the supplied key is {} bits",
                self.id,
                required * 8,
                key.len() * 8
            )));
        }
        Ok(key.split_at(self.enc_key_len))
    }

    fn tag(
        &self,
        mac_key: &[u8],
        aad: Option<&[u8]>,
        iv: &[u8],
        ciphertext: &[u8],
    ) -> JoseResult<Vec<u8>> {
        let aad = aad.unwrap_or_default();
        let al = ((aad.len() as u64) * 8).to_be_bytes();
        let mac = self.hash.hmac(mac_key, &[aad, iv, ciphertext, &al[..]])?;
        Ok(mac[..self.tag_len()].to_vec())
    }

    fn cbc_encrypt(&self, enc_key: &[u8], iv: &[u8], plaintext: &[u8]) -> JoseResult<Vec<u8>> {
        match self.enc_key_len {
            16 => cbc_encrypt::<Aes128>(enc_key, iv, plaintext),
            24 => cbc_encrypt::<Aes192>(enc_key, iv, plaintext),
            32 => cbc_encrypt::<Aes256>(enc_key, iv, plaintext),
            other => Err(JoseError::internal(format!("Unsupported AES key length {other}"))),
        }
    }

    fn cbc_decrypt(
        &self,
        enc_key: &[u8],
        iv: &[u8],
        ciphertext: &[u8],
    ) -> JoseResult<Zeroizing<Vec<u8>>> {
        match self.enc_key_len {
            16 => cbc_decrypt::<Aes128>(enc_key, iv, ciphertext),
            24 => cbc_decrypt::<Aes192>(enc_key, iv, ciphertext),
            32 => cbc_decrypt::<Aes256>(enc_key, iv, ciphertext),
            other => Err(JoseError::internal(format!("Unsupported AES key length {other}"))),
        }
    }
}

fn cbc_encrypt<C>(key: &[u8], iv: &[u8], plaintext: &[u8]) -> JoseResult<Vec<u8>>
where
    C: BlockEncrypt<BlockSize = U16> + KeyInit,
{
    let cipher = C::new_from_slice(key)
        .map_err(|_| JoseError::invalid_key("Invalid AES key length"))?;

    // PKCS#7: always at least one byte of padding
    let pad = BLOCK_LEN - plaintext.len() % BLOCK_LEN;
    let mut data = Vec::with_capacity(plaintext.len() + pad);
    data.extend_from_slice(plaintext);
    data.resize(plaintext.len() + pad, pad as u8);

    let mut prev = [0u8; BLOCK_LEN];
    prev.copy_from_slice(iv);
    for block in data.chunks_exact_mut(BLOCK_LEN) {
        for (b, p) in block.iter_mut().zip(prev.iter()) {
            *b ^= p;
        }
        cipher.encrypt_block(GenericArray::from_mut_slice(block));
        prev.copy_from_slice(block);
    }
    Ok(data)
}

fn cbc_decrypt<C>(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> JoseResult<Zeroizing<Vec<u8>>>
where
    C: BlockDecrypt<BlockSize = U16> + KeyInit,
{
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
        return Err(JoseError::Decryption(
            "Ciphertext is not a whole number of blocks".to_string(),
        ));
    }
    let cipher = C::new_from_slice(key)
        .map_err(|_| JoseError::invalid_key("Invalid AES key length"))?;

    let mut data = Zeroizing::new(ciphertext.to_vec());
    let mut prev = [0u8; BLOCK_LEN];
    prev.copy_from_slice(iv);
    for block in data.chunks_exact_mut(BLOCK_LEN) {
        let mut current = [0u8; BLOCK_LEN];
        current.copy_from_slice(block);
        cipher.decrypt_block(GenericArray::from_mut_slice(block));
        for (b, p) in block.iter_mut().zip(prev.iter()) {
            *b ^= p;
        }
        prev = current;
    }

    let pad = data.last().copied().unwrap_or(0) as usize;
    if pad == 0 || pad > BLOCK_LEN || data[data.len() - pad..].iter().any(|&b| b as usize != pad) {
        return Err(JoseError::Decryption("Invalid PKCS#7 padding".to_string()));
    }
    let len = data.len() - pad;
    data.truncate(len);
    Ok(data)
}

impl Identifiable for HmacAesAeadAlgorithm {
    fn id(&self) -> &'static str {
        self.id
    }
}

impl AeadAlgorithm for HmacAesAeadAlgorithm {
    fn key_bit_length(&self) -> usize {
        self.enc_key_len * 2 * 8
    }

    fn encrypt(&self, mut request: AeadRequest<'_>) -> JoseResult<AeadResult> {
        if request.content.is_empty() {
            return Err(JoseError::invalid_request("Plaintext cannot be empty"));
        }
        let key = secret_bytes(request.key, self.id)?;
        let (mac_key, enc_key) = self.split_key(key)?;

        let iv = match request.iv {
            Some(iv) if iv.len() == BLOCK_LEN => iv.to_vec(),
            Some(iv) => {
                return Err(JoseError::invalid_request(format!(
                    "{} requires a {BLOCK_LEN}-byte IV, found {} bytes",
                    self.id,
                    iv.len()
                )))
            }
            None => request.random.bytes(BLOCK_LEN).to_vec(),
        };

        let ciphertext = self.cbc_encrypt(enc_key, &iv, request.content)?;
        let tag = self.tag(mac_key, request.aad, &iv, &ciphertext)?;
        trace!(
            alg = self.id,
            plaintext_len = request.content.len(),
            ciphertext_len = ciphertext.len(),
            "Encrypted content"
        );
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
        let key = secret_bytes(request.key, self.id)?;
        let (mac_key, enc_key) = self.split_key(key)?;
        if request.iv.len() != BLOCK_LEN {
            return Err(JoseError::invalid_request(format!(
                "{} requires a {BLOCK_LEN}-byte IV, found {} bytes",
                self.id,
                request.iv.len()
            )));
        }

        let expected = self.tag(mac_key, request.aad, request.iv, request.content)?;
        if !constant_time_eq(&expected, request.tag) {
            warn!(alg = self.id, "Authentication tag check failed");
            return Err(JoseError::signature("Authentication tag check failed"));
        }
        debug!(alg = self.id, "Authentication tag verified");

        let plaintext = self.cbc_decrypt(enc_key, request.iv, request.content)?;
        Ok(Message::new(plaintext.to_vec()))
    }
}
