//! Compact JWE production

use super::resolve_payload;
use crate::algorithms::jwa::DIRECT;
use crate::algorithms::{AeadAlgorithm, Identifiable, KeyAlgorithm, KeyAlgorithmCategory};
use crate::compact::CompactJwe;
use crate::compression::CompressionCodec;
use crate::encoding::{base64_url_encode, JsonSerializer, Serializer};
use crate::error::{JoseError, JoseResult};
use crate::header::Header;
use crate::key::{Key, SecretKey};
use crate::random::Randomness;
use crate::request::{AeadRequest, KeyRequest};
use rand::CryptoRng;
use serde_json::{Map, Value};
use tracing::{debug, trace};

fn require_non_empty(bytes: &[u8], what: &str) -> JoseResult<()> {
    if bytes.is_empty() {
        return Err(JoseError::internal(format!("{what} is empty")));
    }
    Ok(())
}

/// Accumulates a JWE and serializes it with [`compact`](Self::compact).
///
/// ```ignore
/// let token = JweBuilder::new()
///     .payload(b"hello world".to_vec())
///     .encrypt_with(&jwa::A128CBC_HS256)
///     .key(cek)
///     .compact()?;
/// ```
pub struct JweBuilder<'a> {
    header: Header,
    payload: Option<Vec<u8>>,
    claims: Option<Map<String, Value>>,
    enc: Option<&'a dyn AeadAlgorithm>,
    key: Option<(Key, &'a dyn KeyAlgorithm)>,
    compression: Option<&'a dyn CompressionCodec>,
    serializer: &'a dyn Serializer,
    random: Randomness<'a>,
}

impl Default for JweBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> JweBuilder<'a> {
    /// Empty builder with the JSON serializer and the thread-local CSPRNG.
    #[must_use]
    pub fn new() -> Self {
        Self {
            header: Header::new(),
            payload: None,
            claims: None,
            enc: None,
            key: None,
            compression: None,
            serializer: &JsonSerializer,
            random: Randomness::system(),
        }
    }

    /// Raw payload bytes. Mutually exclusive with [`claims`](Self::claims).
    #[inline]
    #[must_use]
    pub fn payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Claims serialized as the payload. Mutually exclusive with
    /// [`payload`](Self::payload).
    #[inline]
    #[must_use]
    pub fn claims(mut self, claims: Map<String, Value>) -> Self {
        self.claims = Some(claims);
        self
    }

    /// Extra protected header parameter. `alg`, `enc` and `zip` are
    /// overwritten by the builder.
    #[inline]
    #[must_use]
    pub fn header_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.header.put(name, value);
        self
    }

    /// Compress the payload before encryption and announce it in `zip`.
    #[inline]
    #[must_use]
    pub fn compress_with(mut self, codec: &'a dyn CompressionCodec) -> Self {
        self.compression = Some(codec);
        self
    }

    /// Content encryption algorithm (`enc`).
    #[inline]
    #[must_use]
    pub fn encrypt_with(mut self, enc: &'a dyn AeadAlgorithm) -> Self {
        self.enc = Some(enc);
        self
    }

    /// Shared symmetric key used directly as the CEK (`alg: dir`).
    #[inline]
    #[must_use]
    pub fn key(mut self, key: SecretKey) -> Self {
        self.key = Some((Key::Secret(key), &DIRECT));
        self
    }

    /// Recipient key with an explicit key management algorithm.
    #[inline]
    #[must_use]
    pub fn key_from(mut self, key: impl Into<Key>, algorithm: &'a dyn KeyAlgorithm) -> Self {
        self.key = Some((key.into(), algorithm));
        self
    }

    /// Draw CEKs, IVs and algorithm randomness from `rng`.
    #[inline]
    #[must_use]
    pub fn random(mut self, rng: &'a mut dyn CryptoRng) -> Self {
        self.random = Randomness::from_rng(rng);
        self
    }

    /// Header and claims serializer.
    #[inline]
    #[must_use]
    pub fn serializer(mut self, serializer: &'a dyn Serializer) -> Self {
        self.serializer = serializer;
        self
    }

    /// Encrypt and produce `B64(header).B64(encrypted_key).B64(iv).B64(ciphertext).B64(tag)`.
    pub fn compact(self) -> JoseResult<String> {
        Ok(self.build()?.to_string())
    }

    /// Encrypt and return the segments without joining them.
    pub fn build(mut self) -> JoseResult<CompactJwe> {
        let payload = resolve_payload(self.payload.take(), self.claims.take(), self.serializer)?;
        let (key, algorithm) = self
            .key
            .take()
            .ok_or_else(|| JoseError::builder_state("A key must be set before encrypting"))?;
        let enc = self.enc.ok_or_else(|| {
            JoseError::builder_state("A content encryption algorithm must be set")
        })?;
        debug!(alg = algorithm.id(), enc = enc.id(), "building compact JWE");

        let mut header = self.header;
        header.put("alg", algorithm.id());
        header.put("enc", enc.id());

        let payload = match self.compression {
            Some(codec) => {
                header.put("zip", codec.id());
                let compressed = codec.compress(&payload)?;
                trace!(
                    zip = codec.id(),
                    before = payload.len(),
                    after = compressed.len(),
                    "payload compressed"
                );
                compressed
            }
            None => {
                header.remove("zip");
                payload
            }
        };
        require_non_empty(&payload, "Payload")?;

        let cek = match algorithm.category() {
            KeyAlgorithmCategory::KeyEncryption => Some(enc.generate_key(&mut self.random)),
            KeyAlgorithmCategory::Direct => None,
        };
        let key_result = algorithm.get_encryption_key(KeyRequest {
            cek: cek.as_ref(),
            key: &key,
            enc,
            header: &header,
            random: self.random.reborrow(),
        })?;
        match key_result.key.encoded() {
            Some(bytes) => require_non_empty(bytes, "Content encryption key")?,
            None => {
                return Err(JoseError::internal(
                    "Key algorithm returned a content encryption key without bytes",
                ))
            }
        }
        trace!(
            encrypted_key_len = key_result.encrypted_key.len(),
            params = key_result.header_params.len(),
            "content encryption key resolved"
        );

        header.extend(key_result.header_params);
        header.put("alg", algorithm.id());
        header.put("enc", enc.id());

        let header_bytes = self.serializer.serialize(header.as_map())?;
        require_non_empty(&header_bytes, "Serialized header")?;
        let protected = base64_url_encode(&header_bytes);

        let sealed = enc.encrypt(
            AeadRequest::new(&payload, &key_result.key)
                .with_aad(protected.as_bytes())
                .with_random(self.random.reborrow()),
        )?;
        require_non_empty(&sealed.iv, "Initialization vector")?;
        require_non_empty(&sealed.ciphertext, "Ciphertext")?;
        require_non_empty(&sealed.tag, "Authentication tag")?;

        Ok(CompactJwe::from_encoded_header(
            protected,
            key_result.encrypted_key,
            sealed.iv,
            sealed.ciphertext,
            sealed.tag,
        ))
    }
}
