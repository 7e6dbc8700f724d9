//! JOSE error types

use thiserror::Error;

/// JOSE operation result type
pub type JoseResult<T> = Result<T, JoseError>;

/// JOSE error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoseError {
    /// Key has the wrong type, family or role for the algorithm
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Key has the right type but not enough strength
    #[error("Weak key: {message}")]
    WeakKey {
        /// Human readable explanation
        message: String,
        /// Minimum key size in bits the algorithm requires
        min_bits: usize,
        /// Size in bits of the rejected key
        actual_bits: usize,
    },

    /// Key material cannot be exported or represented
    #[error("Unsupported key: {0}")]
    UnsupportedKey(String),

    /// Signature or authentication tag verification failed
    #[error("Signature verification failed: {0}")]
    Signature(String),

    /// Caller misused a builder
    #[error("Builder state error: {0}")]
    BuilderState(String),

    /// Serializer or codec failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A JWK field is missing or malformed
    #[error("Malformed JWK: '{field}' {reason}")]
    MalformedJwk {
        /// JWK member name
        field: String,
        /// What is wrong with it
        reason: String,
    },

    /// Algorithm identifier or parameter set is not supported
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Request is missing required input
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Compression codec failed
    #[error("Compression error: {0}")]
    Compression(String),

    /// Key management (wrap, agreement, derivation) failed
    #[error("Key management failed: {0}")]
    KeyManagement(String),

    /// Content encryption failed
    #[error("Encryption failed: {0}")]
    Encryption(String),

    /// Content decryption failed after successful authentication
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// An algorithm returned a result that violates its contract
    #[error("Internal error: {0}")]
    Internal(String),
}

impl JoseError {
    /// Create an invalid key error
    #[inline]
    #[must_use]
    pub fn invalid_key(msg: impl Into<String>) -> Self {
        JoseError::InvalidKey(msg.into())
    }

    /// Create a weak key error
    #[inline]
    #[must_use]
    pub fn weak_key(msg: impl Into<String>, min_bits: usize, actual_bits: usize) -> Self {
        JoseError::WeakKey {
            message: msg.into(),
            min_bits,
            actual_bits,
        }
    }

    /// Create an unsupported key error
    #[inline]
    #[must_use]
    pub fn unsupported_key(msg: impl Into<String>) -> Self {
        JoseError::UnsupportedKey(msg.into())
    }

    /// Create a signature error
    #[inline]
    #[must_use]
    pub fn signature(msg: impl Into<String>) -> Self {
        JoseError::Signature(msg.into())
    }

    /// Create a builder state error
    #[inline]
    #[must_use]
    pub fn builder_state(msg: impl Into<String>) -> Self {
        JoseError::BuilderState(msg.into())
    }

    /// Create a serialization error
    #[inline]
    #[must_use]
    pub fn serialization(msg: impl Into<String>) -> Self {
        JoseError::Serialization(msg.into())
    }

    /// Create a malformed JWK error for `field`
    #[inline]
    #[must_use]
    pub fn malformed_jwk(field: impl Into<String>, reason: impl Into<String>) -> Self {
        JoseError::MalformedJwk {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an unsupported algorithm error
    #[inline]
    #[must_use]
    pub fn unsupported_algorithm(alg: impl Into<String>) -> Self {
        JoseError::UnsupportedAlgorithm(alg.into())
    }

    /// Create an invalid request error
    #[inline]
    #[must_use]
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        JoseError::InvalidRequest(msg.into())
    }

    /// Create a key management error
    #[inline]
    #[must_use]
    pub fn key_management(msg: impl Into<String>) -> Self {
        JoseError::KeyManagement(msg.into())
    }

    /// Create an internal error
    #[inline]
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        JoseError::Internal(msg.into())
    }

    /// True for failures that reflect key policy or a failed integrity check
    /// rather than caller misuse.
    #[must_use]
    pub fn is_security_failure(&self) -> bool {
        matches!(
            self,
            JoseError::InvalidKey(_)
                | JoseError::WeakKey { .. }
                | JoseError::UnsupportedKey(_)
                | JoseError::Signature(_)
        )
    }
}

impl From<serde_json::Error> for JoseError {
    fn from(err: serde_json::Error) -> Self {
        JoseError::Serialization(err.to_string())
    }
}

impl From<base64::DecodeError> for JoseError {
    fn from(err: base64::DecodeError) -> Self {
        JoseError::Serialization(format!("Base64URL decode error: {err}"))
    }
}

impl From<std::io::Error> for JoseError {
    fn from(err: std::io::Error) -> Self {
        JoseError::Compression(err.to_string())
    }
}
