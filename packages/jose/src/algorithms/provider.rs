//! Ordered RSA backend selection
//!
//! An RSA signature algorithm runs on the first backend in its
//! [`ProviderChain`] that supports the algorithm's parameter set. Selection
//! happens once, on first use, and is cached for the lifetime of the
//! algorithm instance.

use crate::algorithms::signature::rsa::{RsaPadding, RsaSignatureParams};
use crate::algorithms::HashAlgorithm;
use crate::error::{JoseError, JoseResult};
use crate::random::Randomness;
use once_cell::sync::OnceCell;
use rsa::{Pkcs1v15Sign, Pss, RsaPrivateKey, RsaPublicKey};
use sha2::{Sha256, Sha384, Sha512};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// An implementation of RSA signing and verification.
pub trait RsaBackend: Send + Sync + fmt::Debug {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Whether this backend can execute `params`.
    fn supports(&self, params: &RsaSignatureParams) -> bool;

    /// Sign the digest of `payload`.
    fn sign(
        &self,
        params: &RsaSignatureParams,
        key: &RsaPrivateKey,
        payload: &[u8],
        random: &mut Randomness<'_>,
    ) -> JoseResult<Vec<u8>>;

    /// Verify `signature` over `payload`.
    fn verify(
        &self,
        params: &RsaSignatureParams,
        key: &RsaPublicKey,
        payload: &[u8],
        signature: &[u8],
    ) -> JoseResult<bool>;
}

/// Built-in backend on the `rsa` crate.
///
/// PSS is supported only in the RFC 7518 form: MGF1 with the message digest
/// and trailer field 1.
#[derive(Clone, Copy, Debug, Default)]
pub struct RustCryptoRsa;

fn pkcs1v15_scheme(hash: HashAlgorithm) -> Pkcs1v15Sign {
    match hash {
        HashAlgorithm::Sha256 => Pkcs1v15Sign::new::<Sha256>(),
        HashAlgorithm::Sha384 => Pkcs1v15Sign::new::<Sha384>(),
        HashAlgorithm::Sha512 => Pkcs1v15Sign::new::<Sha512>(),
    }
}

fn pss_scheme(hash: HashAlgorithm, salt_len: usize) -> Pss {
    match hash {
        HashAlgorithm::Sha256 => Pss::new_with_salt::<Sha256>(salt_len),
        HashAlgorithm::Sha384 => Pss::new_with_salt::<Sha384>(salt_len),
        HashAlgorithm::Sha512 => Pss::new_with_salt::<Sha512>(salt_len),
    }
}

impl RsaBackend for RustCryptoRsa {
    fn name(&self) -> &str {
        "rustcrypto-rsa"
    }

    fn supports(&self, params: &RsaSignatureParams) -> bool {
        match params.padding {
            RsaPadding::Pkcs1v15 => true,
            RsaPadding::Pss {
                mgf1,
                trailer_field,
                ..
            } => mgf1 == params.hash && trailer_field == 1,
        }
    }

    fn sign(
        &self,
        params: &RsaSignatureParams,
        key: &RsaPrivateKey,
        payload: &[u8],
        random: &mut Randomness<'_>,
    ) -> JoseResult<Vec<u8>> {
        let hashed = params.hash.digest(payload);
        let mut rng = random.bridge();
        let signed = match params.padding {
            RsaPadding::Pkcs1v15 => {
                key.sign_with_rng(&mut rng, pkcs1v15_scheme(params.hash), &hashed)
            }
            RsaPadding::Pss { salt_len, .. } => {
                key.sign_with_rng(&mut rng, pss_scheme(params.hash, salt_len), &hashed)
            }
        };
        signed.map_err(|e| JoseError::signature(format!("RSA signing failed: {e}")))
    }

    fn verify(
        &self,
        params: &RsaSignatureParams,
        key: &RsaPublicKey,
        payload: &[u8],
        signature: &[u8],
    ) -> JoseResult<bool> {
        let hashed = params.hash.digest(payload);
        let verified = match params.padding {
            RsaPadding::Pkcs1v15 => key.verify(pkcs1v15_scheme(params.hash), &hashed, signature),
            RsaPadding::Pss { salt_len, .. } => {
                key.verify(pss_scheme(params.hash, salt_len), &hashed, signature)
            }
        };
        Ok(verified.is_ok())
    }
}

/// Ordered list of RSA backends. An empty chain uses [`RustCryptoRsa`].
pub struct ProviderChain {
    backends: Vec<Arc<dyn RsaBackend>>,
    selected: OnceCell<Arc<dyn RsaBackend>>,
}

impl ProviderChain {
    /// Chain containing only the built-in backend.
    #[must_use]
    pub const fn builtin() -> Self {
        Self {
            backends: Vec::new(),
            selected: OnceCell::new(),
        }
    }

    /// Chain trying `backends` in order.
    #[must_use]
    pub fn new(backends: Vec<Arc<dyn RsaBackend>>) -> Self {
        Self {
            backends,
            selected: OnceCell::new(),
        }
    }

    /// Name of the selected backend, `None` before first use.
    #[must_use]
    pub fn selected_name(&self) -> Option<&str> {
        self.selected.get().map(|backend| backend.name())
    }

    /// Backend for `params`, chosen on first call and cached afterwards.
    pub fn select(&self, params: &RsaSignatureParams) -> JoseResult<&dyn RsaBackend> {
        let backend = self.selected.get_or_try_init(|| {
            if self.backends.is_empty() && RustCryptoRsa.supports(params) {
                debug!(backend = RustCryptoRsa.name(), "Using built-in RSA backend");
                return Ok(Arc::new(RustCryptoRsa) as Arc<dyn RsaBackend>);
            }
            for backend in &self.backends {
                if backend.supports(params) {
                    debug!(backend = backend.name(), ?params, "Selected RSA backend");
                    return Ok(Arc::clone(backend));
                }
                debug!(
                    backend = backend.name(),
                    ?params,
                    "RSA backend does not support parameters, trying next"
                );
            }
            Err(JoseError::unsupported_algorithm(format!(
                "No RSA backend supports {params:?}"
            )))
        })?;
        Ok(backend.as_ref())
    }
}

impl Default for ProviderChain {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for ProviderChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.backends.iter().map(|b| b.name()).collect();
        f.debug_struct("ProviderChain")
            .field("backends", &names)
            .field("selected", &self.selected_name())
            .finish()
    }
}
