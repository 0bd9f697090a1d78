//! Client for the platform's off-chain "additional services" API.
//!
//! Each network runs its own instance of the service behind a production
//! and a develop URL. The client builds a network-to-URL table at
//! construction and serves bid-signature lookups plus auction listings.
//!
//! The signature endpoint discriminates plain vs encrypted replies only by
//! JSON shape (a bare string vs an object); that untagged form is confined
//! to this wire boundary and surfaced as an explicit [`SignatureReply`]
//! variant.

use crate::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Per-network endpoint configuration for the additional services API.
#[derive(Debug, Clone)]
pub struct ServiceEndpoint {
    pub network_id: u64,
    pub url_production: Option<String>,
    pub url_develop: Option<String>,
}

/// Selects which URL variant a client uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiEnvironment {
    #[default]
    Production,
    Develop,
}

/// Request shape for a bid-signature lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureQuery {
    pub network_id: u64,
    pub auction_id: u64,
    /// Requesting account, 0x-prefixed checksummed hex.
    pub address: String,
}

/// Ciphertext plus wrapped symmetric key, opaque until the decryption
/// service releases the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedPayload {
    pub encrypted_string: String,
    pub encrypted_symmetric_key: String,
}

/// Result of a bid-signature lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureReply {
    /// Already-authorized signature, usable as-is.
    Plain(String),
    /// Signature gated behind the decryption service.
    Encrypted(EncryptedPayload),
}

/// Wire shape of the signature response: a bare JSON string or an
/// encrypted-payload object, with no explicit tag.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireSignatureReply {
    Encrypted(EncryptedPayload),
    Plain(String),
}

impl From<WireSignatureReply> for SignatureReply {
    fn from(wire: WireSignatureReply) -> Self {
        match wire {
            WireSignatureReply::Plain(signature) => SignatureReply::Plain(signature),
            WireSignatureReply::Encrypted(payload) => SignatureReply::Encrypted(payload),
        }
    }
}

/// Auction listing entry as served by the additional services API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionDetails {
    pub auction_id: u64,
    pub chain_id: u64,
    pub symbol_auctioning_token: String,
    pub symbol_bidding_token: String,
    pub address_auctioning_token: String,
    pub address_bidding_token: String,
    pub decimals_auctioning_token: u32,
    pub decimals_bidding_token: u32,
    /// Unix seconds.
    pub start_time_timestamp: i64,
    /// Unix seconds.
    pub end_time_timestamp: i64,
    /// Unix seconds; absent when order cancellation is disabled.
    #[serde(default)]
    pub order_cancellation_end_date: Option<i64>,
    pub current_clearing_price: Decimal,
    pub minimum_bidding_amount_per_order: String,
    pub is_private_auction: bool,
    #[serde(default)]
    pub interest_score: f64,
    #[serde(default)]
    pub usd_amount_traded: Decimal,
}

impl AuctionDetails {
    /// Auction end time as a UTC datetime, if the timestamp is in range.
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.end_time_timestamp, 0)
    }
}

/// Seam the signature resolver depends on, enabling test substitution.
#[async_trait]
pub trait SignatureService: Send + Sync {
    /// Fetch the bid signature for one account on one auction.
    async fn get_signature(&self, query: &SignatureQuery) -> Result<SignatureReply>;
}

/// HTTP client for the additional services API.
pub struct AdditionalServicesClient {
    urls: HashMap<u64, Url>,
    http_client: reqwest::Client,
}

impl AdditionalServicesClient {
    /// Build the network-to-URL table for the selected environment.
    ///
    /// Networks with no URL for the selected environment fall back to the
    /// other variant; networks with neither are skipped and stay
    /// unsupported.
    pub fn new(endpoints: Vec<ServiceEndpoint>, environment: ApiEnvironment) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        let mut urls = HashMap::new();
        for endpoint in endpoints {
            let raw = match environment {
                ApiEnvironment::Production => endpoint.url_production.or(endpoint.url_develop),
                ApiEnvironment::Develop => endpoint.url_develop.or(endpoint.url_production),
            };
            let Some(raw) = raw else {
                warn!(
                    network_id = endpoint.network_id,
                    "Services endpoint has no URL for either environment"
                );
                continue;
            };
            // Url::join treats a base without a trailing slash as a file path
            let normalized = if raw.ends_with('/') {
                raw
            } else {
                format!("{}/", raw)
            };
            urls.insert(endpoint.network_id, Url::parse(&normalized)?);
        }

        Ok(Self { urls, http_client })
    }

    /// Network ids with a usable endpoint, in ascending order.
    pub fn configured_networks(&self) -> Vec<u64> {
        let mut networks: Vec<u64> = self.urls.keys().copied().collect();
        networks.sort_unstable();
        networks
    }

    fn base_url(&self, network_id: u64) -> Result<&Url> {
        self.urls
            .get(&network_id)
            .ok_or(Error::UnsupportedNetwork { network_id })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        network_id: u64,
        path: &str,
    ) -> Result<T> {
        let url = self.base_url(network_id)?.join(path)?;
        let response = self.http_client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                message: format!("{} failed: {} - {}", path, status, text),
                status: Some(status),
            });
        }

        Ok(response.json().await?)
    }

    /// Fetch the full details of one auction.
    pub async fn auction_details(
        &self,
        network_id: u64,
        auction_id: u64,
    ) -> Result<AuctionDetails> {
        self.get_json(network_id, &format!("get_auction_details/{}", auction_id))
            .await
    }

    /// Fetch the `count` most interesting auctions on one network.
    pub async fn interesting_auctions(
        &self,
        network_id: u64,
        count: usize,
    ) -> Result<Vec<AuctionDetails>> {
        self.get_json(
            network_id,
            &format!("get_most_interesting_auction_details/{}", count),
        )
        .await
    }

    /// Fetch the most interesting auctions across every configured network.
    ///
    /// Networks whose service is unavailable are skipped with a warning so
    /// a single down instance does not hide the others.
    pub async fn all_interesting_auctions(&self, count: usize) -> Result<Vec<AuctionDetails>> {
        let mut merged = Vec::new();
        for network_id in self.configured_networks() {
            match self.interesting_auctions(network_id, count).await {
                Ok(mut auctions) => merged.append(&mut auctions),
                Err(e) => {
                    warn!(network_id, error = %e, "Skipping network with unavailable services");
                }
            }
        }
        merged.sort_by(|a, b| {
            b.interest_score
                .partial_cmp(&a.interest_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        merged.truncate(count);
        Ok(merged)
    }
}

#[async_trait]
impl SignatureService for AdditionalServicesClient {
    async fn get_signature(&self, query: &SignatureQuery) -> Result<SignatureReply> {
        let path = format!("get_signature/{}/{}", query.auction_id, query.address);
        let wire: WireSignatureReply = self.get_json(query.network_id, &path).await?;
        debug!(
            network_id = query.network_id,
            auction_id = query.auction_id,
            "Fetched bid signature"
        );
        Ok(wire.into())
    }
}

impl std::fmt::Debug for AdditionalServicesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdditionalServicesClient")
            .field("networks", &self.configured_networks())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains;

    fn endpoint(network_id: u64, production: Option<&str>, develop: Option<&str>) -> ServiceEndpoint {
        ServiceEndpoint {
            network_id,
            url_production: production.map(String::from),
            url_develop: develop.map(String::from),
        }
    }

    #[test]
    fn test_wire_reply_parses_plain_string() {
        let reply: WireSignatureReply = serde_json::from_str(r#""0xdeadbeef""#).unwrap();
        assert_eq!(
            SignatureReply::from(reply),
            SignatureReply::Plain("0xdeadbeef".to_string())
        );
    }

    #[test]
    fn test_wire_reply_parses_encrypted_payload() {
        let json = r#"{"encryptedString":"abc","encryptedSymmetricKey":"def"}"#;
        let reply: WireSignatureReply = serde_json::from_str(json).unwrap();
        assert_eq!(
            SignatureReply::from(reply),
            SignatureReply::Encrypted(EncryptedPayload {
                encrypted_string: "abc".to_string(),
                encrypted_symmetric_key: "def".to_string(),
            })
        );
    }

    #[test]
    fn test_encrypted_payload_uses_camel_case_wire_names() {
        let payload = EncryptedPayload {
            encrypted_string: "cipher".to_string(),
            encrypted_symmetric_key: "wrapped".to_string(),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["encryptedString"], "cipher");
        assert_eq!(value["encryptedSymmetricKey"], "wrapped");
    }

    #[test]
    fn test_base_urls_are_normalized_with_trailing_slash() {
        let client = AdditionalServicesClient::new(
            vec![endpoint(chains::MAINNET, Some("https://api.example.com/mainnet"), None)],
            ApiEnvironment::Production,
        )
        .unwrap();
        assert_eq!(
            client.base_url(chains::MAINNET).unwrap().as_str(),
            "https://api.example.com/mainnet/"
        );
    }

    #[test]
    fn test_environment_selection_falls_back_to_other_variant() {
        // Only a develop URL configured, but the client runs in production
        let client = AdditionalServicesClient::new(
            vec![endpoint(chains::XDAI, None, Some("https://dev.example.com/xdai"))],
            ApiEnvironment::Production,
        )
        .unwrap();
        assert_eq!(
            client.base_url(chains::XDAI).unwrap().as_str(),
            "https://dev.example.com/xdai/"
        );

        // Develop environment prefers the develop variant
        let client = AdditionalServicesClient::new(
            vec![endpoint(
                chains::XDAI,
                Some("https://prod.example.com/xdai"),
                Some("https://dev.example.com/xdai"),
            )],
            ApiEnvironment::Develop,
        )
        .unwrap();
        assert_eq!(
            client.base_url(chains::XDAI).unwrap().as_str(),
            "https://dev.example.com/xdai/"
        );
    }

    #[test]
    fn test_endpoint_without_any_url_is_skipped() {
        let client = AdditionalServicesClient::new(
            vec![endpoint(chains::POLYGON, None, None)],
            ApiEnvironment::Production,
        )
        .unwrap();
        assert!(client.configured_networks().is_empty());
    }

    #[tokio::test]
    async fn test_unconfigured_network_fails_without_http() {
        let client = AdditionalServicesClient::new(
            vec![endpoint(chains::MAINNET, Some("https://api.example.com/"), None)],
            ApiEnvironment::Production,
        )
        .unwrap();

        let query = SignatureQuery {
            network_id: chains::POLYGON,
            auction_id: 1,
            address: "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".to_string(),
        };
        let err = client.get_signature(&query).await.unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedNetwork { network_id } if network_id == chains::POLYGON
        ));
    }

    #[test]
    fn test_auction_details_parses_camel_case() {
        let json = r#"{
            "auctionId": 447,
            "chainId": 100,
            "symbolAuctioningToken": "GNO",
            "symbolBiddingToken": "WXDAI",
            "addressAuctioningToken": "0x9c58bacc331c9aa871afd802db6379a98e80cedb",
            "addressBiddingToken": "0xe91d153e0b41518a2ce8dd3d7944fa863463a97d",
            "decimalsAuctioningToken": 18,
            "decimalsBiddingToken": 18,
            "startTimeTimestamp": 1646500000,
            "endTimeTimestamp": 1646586400,
            "orderCancellationEndDate": 1646543200,
            "currentClearingPrice": 112.5,
            "minimumBiddingAmountPerOrder": "1000000000000000000",
            "isPrivateAuction": false,
            "interestScore": 7.25,
            "usdAmountTraded": 150000.75
        }"#;

        let details: AuctionDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.auction_id, 447);
        assert_eq!(details.chain_id, 100);
        assert_eq!(details.symbol_auctioning_token, "GNO");
        assert_eq!(details.order_cancellation_end_date, Some(1646543200));
        assert!(!details.is_private_auction);
        assert_eq!(
            details.end_time().unwrap().timestamp(),
            details.end_time_timestamp
        );
    }

    #[test]
    fn test_auction_details_optional_fields_default() {
        let json = r#"{
            "auctionId": 1,
            "chainId": 1,
            "symbolAuctioningToken": "A",
            "symbolBiddingToken": "B",
            "addressAuctioningToken": "0x0",
            "addressBiddingToken": "0x1",
            "decimalsAuctioningToken": 18,
            "decimalsBiddingToken": 6,
            "startTimeTimestamp": 0,
            "endTimeTimestamp": 3600,
            "currentClearingPrice": 1,
            "minimumBiddingAmountPerOrder": "1",
            "isPrivateAuction": true
        }"#;

        let details: AuctionDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.order_cancellation_end_date, None);
        assert_eq!(details.interest_score, 0.0);
    }
}
