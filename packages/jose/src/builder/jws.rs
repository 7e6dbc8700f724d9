//! Compact JWS production

use super::resolve_payload;
use crate::algorithms::{Identifiable, SignatureAlgorithm};
use crate::compact::CompactJws;
use crate::encoding::{base64_url_encode, JsonSerializer, Serializer};
use crate::error::{JoseError, JoseResult};
use crate::header::Header;
use crate::key::Key;
use crate::random::Randomness;
use crate::request::SignatureRequest;
use rand::CryptoRng;
use serde_json::{Map, Value};
use tracing::debug;

/// Accumulates a JWS and signs it with [`compact`](Self::compact).
pub struct JwsBuilder<'a> {
    header: Header,
    payload: Option<Vec<u8>>,
    claims: Option<Map<String, Value>>,
    signer: Option<(&'a dyn SignatureAlgorithm, Key)>,
    serializer: &'a dyn Serializer,
    random: Randomness<'a>,
}

impl Default for JwsBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> JwsBuilder<'a> {
    /// Empty builder with the JSON serializer and the thread-local CSPRNG.
    #[must_use]
    pub fn new() -> Self {
        Self {
            header: Header::new(),
            payload: None,
            claims: None,
            signer: None,
            serializer: &JsonSerializer,
            random: Randomness::system(),
        }
    }

    /// Raw payload bytes.
    #[inline]
    #[must_use]
    pub fn payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Claims serialized as the payload.
    #[inline]
    #[must_use]
    pub fn claims(mut self, claims: Map<String, Value>) -> Self {
        self.claims = Some(claims);
        self
    }

    /// Extra protected header parameter. `alg` is overwritten.
    #[inline]
    #[must_use]
    pub fn header_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.header.put(name, value);
        self
    }

    /// Signing algorithm and key.
    #[inline]
    #[must_use]
    pub fn sign_with(
        mut self,
        algorithm: &'a dyn SignatureAlgorithm,
        key: impl Into<Key>,
    ) -> Self {
        self.signer = Some((algorithm, key.into()));
        self
    }

    /// Randomness for PSS salts and ECDSA nonces.
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

    /// Sign and produce `B64(header).B64(payload).B64(signature)`.
    pub fn compact(self) -> JoseResult<String> {
        Ok(self.build()?.to_string())
    }

    /// Sign and return the segments without joining them.
    pub fn build(mut self) -> JoseResult<CompactJws> {
        let payload = resolve_payload(self.payload.take(), self.claims.take(), self.serializer)?;
        let (algorithm, key) = self
            .signer
            .take()
            .ok_or_else(|| JoseError::builder_state("A signing algorithm and key must be set"))?;
        algorithm.validate_key(&key, true)?;
        debug!(alg = algorithm.id(), "building compact JWS");

        let mut header = self.header;
        header.put("alg", algorithm.id());
        let header_bytes = self.serializer.serialize(header.as_map())?;
        let protected = base64_url_encode(&header_bytes);
        let encoded_payload = base64_url_encode(&payload);

        let signing_input = format!("{protected}.{encoded_payload}");
        let request = SignatureRequest::new(signing_input.as_bytes(), &key)
            .with_random(self.random.reborrow());
        let signature = algorithm.sign(request)?;
        if signature.is_empty() {
            return Err(JoseError::internal(format!(
                "{} produced an empty signature",
                algorithm.id()
            )));
        }
        Ok(CompactJws::from_encoded(protected, encoded_payload, signature))
    }
}
