//! Credential derivation and request signing for authenticated endpoints.
//!
//! API credentials are derived from the configured signing key with an EIP-712 signed
//! ("L1") request, cached for the lifetime of the process, and then used to HMAC-sign
//! every authenticated request ("L2").

use std::str::FromStr as _;

/// The [`Signer`] trait from alloy for signing operations.
pub use alloy::signers::Signer;
/// Local wallet signer for signing with a private key.
pub use alloy::signers::local::PrivateKeySigner;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE;
use chrono::Utc;
use hmac::{Hmac, Mac as _};
use reqwest::header::HeaderMap;
use reqwest::{Body, Client as ReqwestClient, Method, Request};
/// Secret string types that redact values in debug output for security.
pub use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::Sha256;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};
/// UUID type used for API keys and identifiers.
pub use uuid::Uuid;

use crate::config::Config;
use crate::error::{Error, Kind as ErrorKind};
use crate::types::{Address, ChainId};
use crate::{Result, Timestamp, endpoint_url};

/// Type alias for API keys, which are UUIDs.
pub type ApiKey = Uuid;

/// Set of credentials used to authenticate to the Polymarket API. Returned by the
/// `auth/api-key` and `auth/derive-api-key` endpoints.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Credentials {
    #[serde(alias = "apiKey")]
    pub(crate) key: ApiKey,
    pub(crate) secret: SecretString,
    pub(crate) passphrase: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(key: Uuid, secret: String, passphrase: String) -> Self {
        Self {
            key,
            secret: SecretString::from(secret),
            passphrase: SecretString::from(passphrase),
        }
    }

    /// Returns the API key.
    #[must_use]
    pub fn key(&self) -> ApiKey {
        self.key
    }

    /// Returns the secret.
    #[must_use]
    pub fn secret(&self) -> &SecretString {
        &self.secret
    }

    /// Returns the passphrase.
    #[must_use]
    pub fn passphrase(&self) -> &SecretString {
        &self.passphrase
    }
}

/// The credential bundle: the signer's address together with the [`Credentials`] it owns.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct ApiCredentials {
    pub address: Address,
    pub credentials: Credentials,
}

pub(crate) mod l1 {
    use std::borrow::Cow;

    use alloy::core::sol;
    use alloy::dyn_abi::Eip712Domain;
    use alloy::hex::ToHexExt as _;
    use alloy::primitives::{ChainId, U256};
    use alloy::signers::Signer;
    use alloy::sol_types::SolStruct as _;
    use reqwest::header::HeaderMap;

    use crate::{Result, Timestamp};

    pub(crate) const POLY_ADDRESS: &str = "POLY_ADDRESS";
    pub(crate) const POLY_NONCE: &str = "POLY_NONCE";
    pub(crate) const POLY_SIGNATURE: &str = "POLY_SIGNATURE";
    pub(crate) const POLY_TIMESTAMP: &str = "POLY_TIMESTAMP";

    sol! {
        #[non_exhaustive]
        struct ClobAuth {
            address address;
            string  timestamp;
            uint256 nonce;
            string  message;
        }
    }

    /// Returns the [`HeaderMap`] needed to obtain [`super::Credentials`].
    pub(crate) async fn create_headers<S: Signer>(
        signer: &S,
        chain_id: ChainId,
        timestamp: Timestamp,
        nonce: u32,
    ) -> Result<HeaderMap> {
        let auth = ClobAuth {
            address: signer.address(),
            timestamp: timestamp.to_string(),
            nonce: U256::from(nonce),
            message: "This message attests that I control the given wallet".to_owned(),
        };

        let domain = Eip712Domain {
            name: Some(Cow::Borrowed("ClobAuthDomain")),
            version: Some(Cow::Borrowed("1")),
            chain_id: Some(U256::from(chain_id)),
            ..Eip712Domain::default()
        };

        let hash = auth.eip712_signing_hash(&domain);
        let signature = signer.sign_hash(&hash).await?;

        let mut map = HeaderMap::new();
        map.insert(
            POLY_ADDRESS,
            signer.address().encode_hex_with_prefix().parse()?,
        );
        map.insert(POLY_NONCE, nonce.to_string().parse()?);
        map.insert(POLY_SIGNATURE, signature.to_string().parse()?);
        map.insert(POLY_TIMESTAMP, timestamp.to_string().parse()?);

        Ok(map)
    }
}

pub(crate) mod l2 {
    use alloy::hex::ToHexExt as _;
    use reqwest::Request;
    use reqwest::header::HeaderMap;
    use secrecy::ExposeSecret as _;

    use crate::auth::{ApiCredentials, hmac, to_message};
    use crate::{Result, Timestamp};

    pub(crate) const POLY_ADDRESS: &str = "POLY_ADDRESS";
    pub(crate) const POLY_API_KEY: &str = "POLY_API_KEY";
    pub(crate) const POLY_PASSPHRASE: &str = "POLY_PASSPHRASE";
    pub(crate) const POLY_SIGNATURE: &str = "POLY_SIGNATURE";
    pub(crate) const POLY_TIMESTAMP: &str = "POLY_TIMESTAMP";

    /// Returns the [`HeaderMap`] needed to interact with any authenticated endpoints.
    pub(crate) fn create_headers(
        bundle: &ApiCredentials,
        request: &Request,
        timestamp: Timestamp,
    ) -> Result<HeaderMap> {
        let credentials = &bundle.credentials;
        let signature = hmac(&credentials.secret, &to_message(request, timestamp))?;

        let mut map = HeaderMap::new();

        map.insert(
            POLY_ADDRESS,
            bundle.address.encode_hex_with_prefix().parse()?,
        );
        map.insert(POLY_API_KEY, credentials.key.to_string().parse()?);
        map.insert(
            POLY_PASSPHRASE,
            credentials.passphrase.expose_secret().parse()?,
        );
        map.insert(POLY_SIGNATURE, signature.parse()?);
        map.insert(POLY_TIMESTAMP, timestamp.to_string().parse()?);

        Ok(map)
    }
}

/// Derives [`ApiCredentials`] at most once per process and signs authenticated requests.
///
/// The signing key is loaded when the provider is constructed. If the key is absent or cannot
/// be loaded, the provider reports itself unavailable and every authenticated operation fails
/// fast instead of reaching the network.
#[derive(Debug)]
pub struct CredentialProvider {
    base_url: String,
    client: ReqwestClient,
    chain_id: ChainId,
    signer: Option<PrivateKeySigner>,
    enabled: bool,
    cache: OnceCell<ApiCredentials>,
}

impl CredentialProvider {
    #[must_use]
    pub fn new(config: &Config, client: ReqwestClient) -> Self {
        let chain_id = config.chain_id();
        let signer = config.signing_key().and_then(|key| {
            PrivateKeySigner::from_str(key.expose_secret().trim())
                .inspect_err(|e| warn!(error = %e, "unable to load signing key, authentication disabled"))
                .ok()
                .map(|signer| signer.with_chain_id(Some(chain_id)))
        });

        Self {
            base_url: config.api_url().to_owned(),
            client,
            chain_id,
            signer,
            enabled: config.auth_enabled(),
            cache: OnceCell::new(),
        }
    }

    /// Whether a usable signing key was loaded.
    #[must_use]
    pub fn can_sign(&self) -> bool {
        self.signer.is_some()
    }

    /// Whether authenticated requests will carry signed headers.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.enabled && self.can_sign()
    }

    /// Returns the cached credential bundle, deriving it on first use.
    ///
    /// Concurrent callers share a single in-flight derivation. A failed derivation is not
    /// cached, so a later call tries again.
    pub async fn credentials(&self) -> Result<&ApiCredentials> {
        let Some(signer) = &self.signer else {
            return Err(Error::configuration(format!(
                "no usable signing key configured, set {}",
                crate::PRIVATE_KEY_VAR
            )));
        };

        self.cache
            .get_or_try_init(|| self.derive(signer))
            .await
            .inspect_err(|e| tracing::error!(error = %e, "failed to create API credentials"))
    }

    /// Returns the signed headers for `request`, or an empty map when authentication is
    /// disabled or the credentials cannot be obtained.
    pub async fn auth_headers(&self, request: &Request) -> HeaderMap {
        if !self.is_available() {
            return HeaderMap::new();
        }

        match self.signed_headers(request).await {
            Ok(headers) => headers,
            Err(e) => {
                warn!(error = %e, "could not create authentication headers, proceeding without");
                HeaderMap::new()
            }
        }
    }

    async fn signed_headers(&self, request: &Request) -> Result<HeaderMap> {
        let bundle = self.credentials().await?;
        l2::create_headers(bundle, request, Utc::now().timestamp())
    }

    async fn derive(&self, signer: &PrivateKeySigner) -> Result<ApiCredentials> {
        let credentials = match self.create_api_key(signer).await {
            Ok(credentials) => credentials,
            Err(err) if err.kind() == ErrorKind::Status => {
                // The key may already exist; only fall back when the server actually answered.
                debug!(error = %err, "API key creation rejected, deriving the existing key");
                self.derive_api_key(signer).await?
            }
            Err(err) => return Err(err),
        };

        info!(address = %signer.address(), "API credentials ready");

        Ok(ApiCredentials {
            address: signer.address(),
            credentials,
        })
    }

    async fn create_api_key(&self, signer: &PrivateKeySigner) -> Result<Credentials> {
        self.l1_request(signer, Method::POST, "auth/api-key").await
    }

    async fn derive_api_key(&self, signer: &PrivateKeySigner) -> Result<Credentials> {
        self.l1_request(signer, Method::GET, "auth/derive-api-key")
            .await
    }

    async fn l1_request(
        &self,
        signer: &PrivateKeySigner,
        method: Method,
        endpoint: &str,
    ) -> Result<Credentials> {
        let request = self
            .client
            .request(method, endpoint_url(&self.base_url, endpoint))
            .build()?;
        let headers = l1::create_headers(signer, self.chain_id, Utc::now().timestamp(), 0).await?;

        crate::request(&self.client, request, Some(headers)).await
    }
}

#[must_use]
fn to_message(request: &Request, timestamp: Timestamp) -> String {
    let method = request.method();
    let body = request.body().and_then(body_to_string).unwrap_or_default();
    let path = request.url().path();

    format!("{timestamp}{method}{path}{body}")
}

#[must_use]
fn body_to_string(body: &Body) -> Option<String> {
    body.as_bytes()
        .map(String::from_utf8_lossy)
        .map(|b| b.replace('\'', "\""))
}

fn hmac(secret: &SecretString, message: &str) -> Result<String> {
    let decoded_secret = URL_SAFE.decode(secret.expose_secret())?;
    let mut mac = Hmac::<Sha256>::new_from_slice(&decoded_secret)?;
    mac.update(message.as_bytes());

    let result = mac.finalize().into_bytes();
    Ok(URL_SAFE.encode(result))
}
