//! Compact serializations (RFC 7516 §7.1, RFC 7515 §7.1)
//!
//! [`CompactJwe`] and [`CompactJws`] only handle the segment structure. The
//! protected header is kept as the exact Base64URL text received, since that
//! text is the JWE additional authenticated data and the JWS signing input.

use crate::algorithms::{jwa, Identifiable, KeyAlgorithm, SignatureAlgorithm};
use crate::compression::compression_codec;
use crate::config::CompressionConfig;
use crate::encoding::{base64_url_decode, base64_url_encode, JsonSerializer, Serializer};
use crate::error::{JoseError, JoseResult};
use crate::header::Header;
use crate::key::Key;
use crate::request::{DecryptAeadRequest, DecryptionKeyRequest, Message, VerifySignatureRequest};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

fn split_segments<'a, const N: usize>(token: &'a str, kind: &str) -> JoseResult<[&'a str; N]> {
    let parts: Vec<&str> = token.split('.').collect();
    parts.try_into().map_err(|parts: Vec<&str>| {
        JoseError::serialization(format!(
            "A compact {kind} has {N} segments, found {}",
            parts.len()
        ))
    })
}

fn decode_segment(segment: &str, name: &str) -> JoseResult<Vec<u8>> {
    base64_url_decode(segment)
        .map_err(|_| JoseError::serialization(format!("The {name} segment is not valid Base64URL")))
}

fn decode_header(protected: &str) -> JoseResult<Header> {
    let bytes = decode_segment(protected, "protected header")?;
    Ok(JsonSerializer.deserialize(&bytes)?.into())
}

/// The five segments of a compact JWE.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompactJwe {
    protected: String,
    /// Encrypted content encryption key, empty for direct algorithms
    pub encrypted_key: Vec<u8>,
    /// Initialization vector
    pub iv: Vec<u8>,
    /// Ciphertext
    pub ciphertext: Vec<u8>,
    /// Authentication tag
    pub tag: Vec<u8>,
}

impl CompactJwe {
    /// Assemble from the serialized header bytes and the binary segments.
    #[must_use]
    pub fn new(
        header: &[u8],
        encrypted_key: Vec<u8>,
        iv: Vec<u8>,
        ciphertext: Vec<u8>,
        tag: Vec<u8>,
    ) -> Self {
        Self::from_encoded_header(base64_url_encode(header), encrypted_key, iv, ciphertext, tag)
    }

    pub(crate) fn from_encoded_header(
        protected: String,
        encrypted_key: Vec<u8>,
        iv: Vec<u8>,
        ciphertext: Vec<u8>,
        tag: Vec<u8>,
    ) -> Self {
        Self {
            protected,
            encrypted_key,
            iv,
            ciphertext,
            tag,
        }
    }

    /// Split and decode a compact JWE.
    pub fn parse(token: &str) -> JoseResult<Self> {
        let [protected, encrypted_key, iv, ciphertext, tag] = split_segments::<5>(token, "JWE")?;
        if protected.is_empty() {
            return Err(JoseError::serialization("The protected header segment is empty"));
        }
        Ok(Self {
            protected: protected.to_string(),
            encrypted_key: decode_segment(encrypted_key, "encrypted key")?,
            iv: decode_segment(iv, "initialization vector")?,
            ciphertext: decode_segment(ciphertext, "ciphertext")?,
            tag: decode_segment(tag, "authentication tag")?,
        })
    }

    /// Protected header as transmitted, the AEAD additional authenticated data.
    #[must_use]
    pub fn protected(&self) -> &str {
        &self.protected
    }

    /// Decoded protected header.
    pub fn header(&self) -> JoseResult<Header> {
        decode_header(&self.protected)
    }

    /// Recover the plaintext with `key` under the expected key algorithm.
    ///
    /// The header `alg` must name `algorithm`; `enc` and `zip` are resolved
    /// from the catalog.
    pub fn decrypt(&self, key: &Key, algorithm: &dyn KeyAlgorithm) -> JoseResult<Message> {
        self.decrypt_with_config(key, algorithm, &CompressionConfig::default())
    }

    /// [`decrypt`](Self::decrypt) with caller-supplied decompression limits.
    pub fn decrypt_with_config(
        &self,
        key: &Key,
        algorithm: &dyn KeyAlgorithm,
        limits: &CompressionConfig,
    ) -> JoseResult<Message> {
        let header = self.header()?;
        match header.algorithm() {
            Some(alg) if alg == algorithm.id() => {}
            Some(alg) => {
                return Err(JoseError::unsupported_algorithm(format!(
                    "Token uses '{alg}' but '{}' was expected",
                    algorithm.id()
                )))
            }
            None => return Err(JoseError::invalid_request("JWE header has no 'alg'")),
        }
        let enc = jwa::aead_algorithm(
            header
                .encryption_algorithm()
                .ok_or_else(|| JoseError::invalid_request("JWE header has no 'enc'"))?,
        )?;
        debug!(alg = algorithm.id(), enc = enc.id(), "decrypting compact JWE");

        let cek = algorithm.get_decryption_key(DecryptionKeyRequest {
            encrypted_key: &self.encrypted_key,
            key,
            enc,
            header: &header,
        })?;
        let message = enc.decrypt(
            DecryptAeadRequest::new(&self.ciphertext, &cek, &self.iv, &self.tag)
                .with_aad(self.protected.as_bytes()),
        )?;

        match header.compression_algorithm() {
            Some(zip) => Ok(Message::new(
                compression_codec(zip)?
                    .decompress_limited(message.as_bytes(), limits.max_decompressed_len)?,
            )),
            None => Ok(message),
        }
    }
}

impl fmt::Display for CompactJwe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}.{}",
            self.protected,
            base64_url_encode(&self.encrypted_key),
            base64_url_encode(&self.iv),
            base64_url_encode(&self.ciphertext),
            base64_url_encode(&self.tag)
        )
    }
}

impl FromStr for CompactJwe {
    type Err = JoseError;

    fn from_str(token: &str) -> JoseResult<Self> {
        Self::parse(token)
    }
}

/// The three segments of a compact JWS.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompactJws {
    protected: String,
    payload: String,
    /// Signature bytes
    pub signature: Vec<u8>,
}

impl CompactJws {
    pub(crate) fn from_encoded(protected: String, payload: String, signature: Vec<u8>) -> Self {
        Self {
            protected,
            payload,
            signature,
        }
    }

    /// Split and decode a compact JWS.
    pub fn parse(token: &str) -> JoseResult<Self> {
        let [protected, payload, signature] = split_segments::<3>(token, "JWS")?;
        if protected.is_empty() {
            return Err(JoseError::serialization("The protected header segment is empty"));
        }
        Ok(Self {
            protected: protected.to_string(),
            payload: payload.to_string(),
            signature: decode_segment(signature, "signature")?,
        })
    }

    /// Decoded protected header.
    pub fn header(&self) -> JoseResult<Header> {
        decode_header(&self.protected)
    }

    /// `B64(header).B64(payload)`
    #[must_use]
    pub fn signing_input(&self) -> String {
        format!("{}.{}", self.protected, self.payload)
    }

    /// Check the signature and return the payload.
    ///
    /// The header `alg` must name `algorithm`.
    pub fn verify(&self, key: &Key, algorithm: &dyn SignatureAlgorithm) -> JoseResult<Vec<u8>> {
        let header = self.header()?;
        if header.algorithm() != Some(algorithm.id()) {
            return Err(JoseError::unsupported_algorithm(format!(
                "Token uses '{}' but '{}' was expected",
                header.algorithm().unwrap_or("none"),
                algorithm.id()
            )));
        }
        let input = self.signing_input();
        if !algorithm.verify(VerifySignatureRequest::new(input.as_bytes(), key, &self.signature))? {
            warn!(alg = algorithm.id(), "JWS signature rejected");
            return Err(JoseError::signature("Signature does not match"));
        }
        decode_segment(&self.payload, "payload")
    }
}

impl fmt::Display for CompactJws {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}",
            self.protected,
            self.payload,
            base64_url_encode(&self.signature)
        )
    }
}

impl FromStr for CompactJws {
    type Err = JoseError;

    fn from_str(token: &str) -> JoseResult<Self> {
        Self::parse(token)
    }
}
