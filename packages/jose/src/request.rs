//! Request and result values passed to the algorithm traits
//!
//! Requests borrow their inputs and are consumed by the algorithm they are
//! handed to. Byte fields must be non-empty unless documented otherwise.

use crate::algorithms::{AeadAlgorithm, Identifiable};
use crate::header::Header;
use crate::key::{Key, SecretKey};
use crate::random::Randomness;
use serde_json::{Map, Value};
use std::fmt;
use zeroize::Zeroizing;

/// Input to [`SignatureAlgorithm::sign`](crate::algorithms::SignatureAlgorithm::sign).
#[derive(Debug)]
pub struct SignatureRequest<'a> {
    /// Signing input
    pub payload: &'a [u8],
    /// Signing key
    pub key: &'a Key,
    /// Randomness for probabilistic schemes (PSS, ECDSA blinding)
    pub random: Randomness<'a>,
}

impl<'a> SignatureRequest<'a> {
    /// Request using the thread-local CSPRNG.
    #[must_use]
    pub fn new(payload: &'a [u8], key: &'a Key) -> Self {
        Self {
            payload,
            key,
            random: Randomness::system(),
        }
    }

    /// Replace the randomness source.
    #[must_use]
    pub fn with_random(mut self, random: Randomness<'a>) -> Self {
        self.random = random;
        self
    }
}

/// Input to [`SignatureAlgorithm::verify`](crate::algorithms::SignatureAlgorithm::verify).
#[derive(Debug)]
pub struct VerifySignatureRequest<'a> {
    /// Signing input
    pub payload: &'a [u8],
    /// Verification key
    pub key: &'a Key,
    /// Candidate signature
    pub signature: &'a [u8],
}

impl<'a> VerifySignatureRequest<'a> {
    /// Verification request.
    #[must_use]
    pub fn new(payload: &'a [u8], key: &'a Key, signature: &'a [u8]) -> Self {
        Self {
            payload,
            key,
            signature,
        }
    }
}

/// Input to [`AeadAlgorithm::encrypt`].
#[derive(Debug)]
pub struct AeadRequest<'a> {
    /// Plaintext
    pub content: &'a [u8],
    /// Content encryption key
    pub key: &'a SecretKey,
    /// Additional authenticated data, may be absent
    pub aad: Option<&'a [u8]>,
    /// Initialization vector, generated when absent
    pub iv: Option<&'a [u8]>,
    /// Source for generated IVs
    pub random: Randomness<'a>,
}

impl<'a> AeadRequest<'a> {
    /// Request with no AAD and a generated IV.
    #[must_use]
    pub fn new(content: &'a [u8], key: &'a SecretKey) -> Self {
        Self {
            content,
            key,
            aad: None,
            iv: None,
            random: Randomness::system(),
        }
    }

    /// Attach additional authenticated data.
    #[must_use]
    pub fn with_aad(mut self, aad: &'a [u8]) -> Self {
        self.aad = Some(aad);
        self
    }

    /// Use a caller-chosen IV.
    #[must_use]
    pub fn with_iv(mut self, iv: &'a [u8]) -> Self {
        self.iv = Some(iv);
        self
    }

    /// Replace the randomness source.
    #[must_use]
    pub fn with_random(mut self, random: Randomness<'a>) -> Self {
        self.random = random;
        self
    }
}

/// Input to [`AeadAlgorithm::decrypt`].
#[derive(Debug)]
pub struct DecryptAeadRequest<'a> {
    /// Ciphertext
    pub content: &'a [u8],
    /// Content encryption key
    pub key: &'a SecretKey,
    /// Additional authenticated data, may be absent
    pub aad: Option<&'a [u8]>,
    /// Initialization vector used for encryption
    pub iv: &'a [u8],
    /// Authentication tag
    pub tag: &'a [u8],
}

impl<'a> DecryptAeadRequest<'a> {
    /// Decryption request with no AAD.
    #[must_use]
    pub fn new(content: &'a [u8], key: &'a SecretKey, iv: &'a [u8], tag: &'a [u8]) -> Self {
        Self {
            content,
            key,
            aad: None,
            iv,
            tag,
        }
    }

    /// Attach additional authenticated data.
    #[must_use]
    pub fn with_aad(mut self, aad: &'a [u8]) -> Self {
        self.aad = Some(aad);
        self
    }
}

/// Output of a successful AEAD encryption.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AeadResult {
    /// Ciphertext
    pub ciphertext: Vec<u8>,
    /// Authentication tag
    pub tag: Vec<u8>,
    /// Initialization vector
    pub iv: Vec<u8>,
}

/// Decrypted plaintext, zeroed on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct Message(Zeroizing<Vec<u8>>);

impl Message {
    /// Wrap plaintext bytes.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Plaintext bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Plaintext length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for an empty plaintext.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for Message {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("len", &self.0.len())
            .finish_non_exhaustive()
    }
}

/// Producer-side input to key management.
pub struct KeyRequest<'a> {
    /// Content encryption key to protect. Absent for direct algorithms.
    pub cek: Option<&'a SecretKey>,
    /// Recipient or management key
    pub key: &'a Key,
    /// Content encryption algorithm the CEK is destined for
    pub enc: &'a dyn AeadAlgorithm,
    /// Header under construction
    pub header: &'a Header,
    /// Randomness for ephemeral keys, salts and OAEP padding
    pub random: Randomness<'a>,
}

impl fmt::Debug for KeyRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyRequest")
            .field("has_cek", &self.cek.is_some())
            .field("key", &self.key.describe())
            .field("enc", &self.enc.id())
            .field("header", self.header)
            .finish_non_exhaustive()
    }
}

/// Output of key management on the producer side.
#[derive(Debug)]
pub struct KeyResult {
    /// Content encryption key to use with the AEAD algorithm
    pub key: SecretKey,
    /// Encrypted key segment, empty for direct algorithms
    pub encrypted_key: Vec<u8>,
    /// Header parameters the algorithm publishes
    pub header_params: Map<String, Value>,
}

impl KeyResult {
    /// Result with no encrypted key and no header parameters.
    #[must_use]
    pub fn direct(key: SecretKey) -> Self {
        Self {
            key,
            encrypted_key: Vec::new(),
            header_params: Map::new(),
        }
    }

    /// Result carrying an encrypted key.
    #[must_use]
    pub fn wrapped(key: SecretKey, encrypted_key: Vec<u8>) -> Self {
        Self {
            key,
            encrypted_key,
            header_params: Map::new(),
        }
    }

    /// Publish a header parameter.
    #[must_use]
    pub fn with_header_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.header_params.insert(name.into(), value.into());
        self
    }
}

/// Consumer-side input to key management.
pub struct DecryptionKeyRequest<'a> {
    /// Encrypted key segment, may be empty
    pub encrypted_key: &'a [u8],
    /// Recipient key
    pub key: &'a Key,
    /// Content encryption algorithm named by `enc`
    pub enc: &'a dyn AeadAlgorithm,
    /// Received header
    pub header: &'a Header,
}

impl fmt::Debug for DecryptionKeyRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecryptionKeyRequest")
            .field("encrypted_key_len", &self.encrypted_key.len())
            .field("key", &self.key.describe())
            .field("enc", &self.enc.id())
            .field("header", self.header)
            .finish()
    }
}
