//! RSA signatures: RSASSA-PKCS1-v1_5 (RS256/384/512) and RSASSA-PSS (PS256/384/512)

use crate::algorithms::provider::ProviderChain;
use crate::algorithms::{HashAlgorithm, Identifiable, SignatureAlgorithm};
use crate::config::RsaConfig;
use crate::error::{JoseError, JoseResult};
use crate::key::Key;
use crate::random::Randomness;
use crate::request::{SignatureRequest, VerifySignatureRequest};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::borrow::Cow;
use tracing::debug;

/// Smallest RSA modulus accepted for any JWA RSA algorithm (RFC 7518 §3.3, §3.5).
pub const MIN_RSA_KEY_BITS: usize = 2048;

/// RSA signature padding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RsaPadding {
    /// RSASSA-PKCS1-v1_5
    Pkcs1v15,
    /// RSASSA-PSS
    Pss {
        /// MGF1 digest
        mgf1: HashAlgorithm,
        /// Salt length in bytes
        salt_len: usize,
        /// Trailer field, 1 means `0xBC`
        trailer_field: u8,
    },
}

/// Full parameter set of an RSA signature algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RsaSignatureParams {
    /// Message digest
    pub hash: HashAlgorithm,
    /// Padding scheme
    pub padding: RsaPadding,
}

/// An RS* or PS* algorithm bound to a provider chain.
#[derive(Debug)]
pub struct RsaSignatureAlgorithm {
    id: &'static str,
    params: RsaSignatureParams,
    preferred_bits: usize,
    providers: ProviderChain,
}

impl RsaSignatureAlgorithm {
    pub(crate) const fn pkcs1v15(
        id: &'static str,
        hash: HashAlgorithm,
        preferred_bits: usize,
    ) -> Self {
        Self {
            id,
            params: RsaSignatureParams {
                hash,
                padding: RsaPadding::Pkcs1v15,
            },
            preferred_bits,
            providers: ProviderChain::builtin(),
        }
    }

    pub(crate) const fn pss(
        id: &'static str,
        hash: HashAlgorithm,
        salt_len: usize,
        preferred_bits: usize,
    ) -> Self {
        Self {
            id,
            params: RsaSignatureParams {
                hash,
                padding: RsaPadding::Pss {
                    mgf1: hash,
                    salt_len,
                    trailer_field: 1,
                },
            },
            preferred_bits,
            providers: ProviderChain::builtin(),
        }
    }

    /// Same algorithm executed through `providers`.
    #[must_use]
    pub fn with_providers(&self, providers: ProviderChain) -> Self {
        Self {
            id: self.id,
            params: self.params,
            preferred_bits: self.preferred_bits,
            providers,
        }
    }

    /// Parameter set of this algorithm.
    #[must_use]
    pub fn params(&self) -> &RsaSignatureParams {
        &self.params
    }

    /// Provider chain executing this algorithm.
    #[must_use]
    pub fn providers(&self) -> &ProviderChain {
        &self.providers
    }

    /// Generated key size for this algorithm, taken from `config` when given.
    #[must_use]
    pub fn preferred_key_bits(&self, config: Option<&RsaConfig>) -> usize {
        match (config, self.params.hash) {
            (Some(c), HashAlgorithm::Sha256) => c.sha256_bits,
            (Some(c), HashAlgorithm::Sha384) => c.sha384_bits,
            (Some(c), HashAlgorithm::Sha512) => c.sha512_bits,
            (None, _) => self.preferred_bits,
        }
    }

    /// Generate a key pair of the preferred size.
    pub fn generate_key_pair(
        &self,
        config: Option<&RsaConfig>,
        random: &mut Randomness<'_>,
    ) -> JoseResult<RsaPrivateKey> {
        let bits = self.preferred_key_bits(config).max(MIN_RSA_KEY_BITS);
        debug!(alg = self.id, bits, "Generating RSA key pair");
        RsaPrivateKey::new(&mut random.bridge(), bits)
            .map_err(|e| JoseError::internal(format!("RSA key generation failed: {e}")))
    }

    fn section(&self) -> &'static str {
        match self.params.padding {
            RsaPadding::Pkcs1v15 => "3.3",
            RsaPadding::Pss { .. } => "3.5",
        }
    }

    fn check_strength(&self, modulus_bits: usize, role: &str) -> JoseResult<()> {
        if modulus_bits < MIN_RSA_KEY_BITS {
            return Err(JoseError::weak_key(
                format!(
                    "The RSA {role} key size is {modulus_bits} bits, which is not secure enough for {}. RFC 7518 §{} requires RSA keys of {MIN_RSA_KEY_BITS} bits or larger.",
                    self.id,
                    self.section()
                ),
                MIN_RSA_KEY_BITS,
                modulus_bits,
            ));
        }
        Ok(())
    }

    fn signing_key<'k>(&self, key: &'k Key) -> JoseResult<&'k RsaPrivateKey> {
        match key {
            Key::RsaPrivate(private) => {
                self.check_strength(private.n().bits(), "signing")?;
                Ok(private)
            }
            other => Err(JoseError::invalid_key(format!(
                "{} signing requires an RSA private key, found {}",
                self.id,
                other.describe()
            ))),
        }
    }

    fn verification_key<'k>(&self, key: &'k Key) -> JoseResult<Cow<'k, RsaPublicKey>> {
        let public = match key {
            Key::RsaPublic(public) => Cow::Borrowed(public),
            Key::RsaPrivate(private) => {
                // Legacy allowance: some callers verify with the private key.
                debug!(alg = self.id, "Verifying with an RSA private key");
                Cow::Owned(private.to_public_key())
            }
            other => {
                return Err(JoseError::invalid_key(format!(
                    "{} verification requires an RSA public or private key, found {}",
                    self.id,
                    other.describe()
                )))
            }
        };
        self.check_strength(public.n().bits(), "verification")?;
        Ok(public)
    }
}

impl Identifiable for RsaSignatureAlgorithm {
    fn id(&self) -> &'static str {
        self.id
    }
}

impl SignatureAlgorithm for RsaSignatureAlgorithm {
    fn validate_key(&self, key: &Key, signing: bool) -> JoseResult<()> {
        if signing {
            self.signing_key(key).map(|_| ())
        } else {
            self.verification_key(key).map(|_| ())
        }
    }

    fn sign(&self, mut request: SignatureRequest<'_>) -> JoseResult<Vec<u8>> {
        if request.payload.is_empty() {
            return Err(JoseError::invalid_request("Signing input cannot be empty"));
        }
        let key = self.signing_key(request.key)?;
        let backend = self.providers.select(&self.params)?;
        backend.sign(&self.params, key, request.payload, &mut request.random)
    }

    fn verify(&self, request: VerifySignatureRequest<'_>) -> JoseResult<bool> {
        if request.payload.is_empty() {
            return Err(JoseError::invalid_request("Signing input cannot be empty"));
        }
        let key = self.verification_key(request.key)?;
        let backend = self.providers.select(&self.params)?;
        backend.verify(&self.params, &key, request.payload, request.signature)
    }
}
