//! Client for the external decryption/authorization service.
//!
//! The gateway releases a symmetric key when the submitted access-control
//! conditions are satisfied by the attached authorization signature. The
//! client is explicitly constructed and injected wherever it is needed;
//! nothing here is process-global.

use crate::auth_sig::AuthSig;
use crate::conditions::AccessControlCondition;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Request asking the gateway to release the symmetric key for an
/// encrypted payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptionKeyRequest {
    pub access_control_conditions: Vec<AccessControlCondition>,
    /// The wrapped symmetric key from the encrypted payload.
    pub to_decrypt: String,
    /// Network name the conditions are evaluated on.
    pub chain: String,
    pub auth_sig: AuthSig,
}

/// Seam for the external decryption service, enabling test substitution.
#[async_trait]
pub trait DecryptionGateway: Send + Sync {
    /// Submit conditions and proof of address, returning the released
    /// symmetric key bytes.
    async fn get_encryption_key(&self, request: &EncryptionKeyRequest) -> Result<Vec<u8>>;
}

#[derive(Deserialize)]
struct EncryptionKeyResponse {
    /// Hex-encoded symmetric key.
    key: String,
}

/// HTTP client for the decryption gateway.
pub struct HttpDecryptionGateway {
    base_url: Url,
    http_client: reqwest::Client,
    connected: AtomicBool,
}

impl HttpDecryptionGateway {
    pub fn new(base_url: &str) -> Result<Self> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized).context("Invalid decryption gateway URL")?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Ok(Self {
            base_url,
            http_client,
            connected: AtomicBool::new(false),
        })
    }

    /// Handshake with the gateway before first use.
    ///
    /// [`DecryptionGateway::get_encryption_key`] performs this lazily if
    /// the caller has not.
    pub async fn connect(&self) -> Result<()> {
        let url = self.base_url.join("connect")?;
        let response = self
            .http_client
            .post(url)
            .send()
            .await
            .context("Gateway handshake failed")?;

        if !response.status().is_success() {
            bail!("Gateway handshake rejected: {}", response.status());
        }

        self.connected.store(true, Ordering::SeqCst);
        info!(gateway = %self.base_url, "Connected to decryption gateway");
        Ok(())
    }
}

#[async_trait]
impl DecryptionGateway for HttpDecryptionGateway {
    async fn get_encryption_key(&self, request: &EncryptionKeyRequest) -> Result<Vec<u8>> {
        if !self.connected.load(Ordering::SeqCst) {
            self.connect().await?;
        }

        let url = self.base_url.join("encryption_key")?;
        let response = self
            .http_client
            .post(url)
            .json(request)
            .send()
            .await
            .context("Gateway request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            bail!("Gateway refused to release the key: {} - {}", status, text);
        }

        let body: EncryptionKeyResponse = response
            .json()
            .await
            .context("Could not parse gateway response")?;
        let key = hex::decode(body.key.trim_start_matches("0x"))
            .context("Gateway returned a non-hex key")?;

        debug!(chain = %request.chain, "Decryption gateway released symmetric key");
        Ok(key)
    }
}

impl std::fmt::Debug for HttpDecryptionGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpDecryptionGateway")
            .field("base_url", &self.base_url.as_str())
            .field("connected", &self.connected.load(Ordering::SeqCst))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth_sig::DERIVATION_METHOD;
    use serde_json::json;

    const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    fn test_request() -> EncryptionKeyRequest {
        EncryptionKeyRequest {
            access_control_conditions: vec![AccessControlCondition::wallet_is(
                TEST_ADDRESS,
                "xdai",
            )],
            to_decrypt: "wrapped-key".to_string(),
            chain: "xdai".to_string(),
            auth_sig: AuthSig {
                sig: "0xabcd".to_string(),
                derived_via: DERIVATION_METHOD.to_string(),
                signed_message: "message".to_string(),
                address: TEST_ADDRESS.to_string(),
            },
        }
    }

    #[test]
    fn test_request_serializes_with_service_wire_names() {
        let value = serde_json::to_value(test_request()).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), 4);
        assert!(object.contains_key("accessControlConditions"));
        assert!(object.contains_key("toDecrypt"));
        assert!(object.contains_key("chain"));
        assert!(object.contains_key("authSig"));
        assert_eq!(value["authSig"]["derivedVia"], json!(DERIVATION_METHOD));
    }

    #[test]
    fn test_new_normalizes_base_url() {
        let gateway = HttpDecryptionGateway::new("https://gateway.example.com/v1").unwrap();
        assert_eq!(gateway.base_url.as_str(), "https://gateway.example.com/v1/");
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        assert!(HttpDecryptionGateway::new("not a url").is_err());
    }
}
