//! The bid-signature resolution flow.
//!
//! One logical flow runs per `resolve` call: fetch the signature, and if
//! it comes back encrypted, authorize with a sign-in signature and ask the
//! gateway to release the symmetric key. Each flow carries a generation
//! number; only the newest generation may publish a result, so a slow
//! flow can never overwrite the outcome of a newer one.

use alloy_primitives::Address;
use anyhow::{Context, Result};
use auction_core::api::{SignatureQuery, SignatureReply, SignatureService};
use auction_core::chains;
use auction_core::types::AuctionIdentifier;
use bid_access::auth_sig::{generate_auth_sig, SignInSite};
use bid_access::cipher;
use bid_access::conditions::AccessControlCondition;
use bid_access::gateway::{DecryptionGateway, EncryptionKeyRequest};
use bid_access::wallet::WalletSession;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Inputs for one resolution flow, exactly as the caller's session
/// supplies them. Any absent field makes the flow a silent no-op.
#[derive(Clone, Default)]
pub struct ResolveRequest {
    pub chain_id: Option<u64>,
    pub auction_id: Option<u64>,
    pub account: Option<Address>,
    pub wallet: Option<Arc<dyn WalletSession>>,
}

impl ResolveRequest {
    /// Request for a fully identified auction with a connected wallet.
    pub fn for_auction(
        identifier: AuctionIdentifier,
        account: Address,
        wallet: Arc<dyn WalletSession>,
    ) -> Self {
        Self {
            chain_id: Some(identifier.chain_id),
            auction_id: Some(identifier.auction_id),
            account: Some(account),
            wallet: Some(wallet),
        }
    }
}

impl std::fmt::Debug for ResolveRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolveRequest")
            .field("chain_id", &self.chain_id)
            .field("auction_id", &self.auction_id)
            .field("account", &self.account)
            .field("has_wallet", &self.wallet.is_some())
            .finish()
    }
}

struct Gate {
    generation: u64,
    closed: bool,
}

struct Shared {
    tx: watch::Sender<Option<String>>,
    gate: Mutex<Gate>,
}

impl Shared {
    fn is_stale(&self, generation: u64) -> bool {
        let gate = self.gate.lock().unwrap();
        gate.closed || gate.generation != generation
    }

    /// Publish a flow's outcome if it is still the newest and the
    /// resolver is still open. Returns false when the result was dropped
    /// as stale.
    fn apply(&self, generation: u64, value: Option<String>) -> bool {
        let gate = self.gate.lock().unwrap();
        if gate.closed || gate.generation != generation {
            return false;
        }
        self.tx.send_replace(value);
        true
    }
}

/// Resolves bid signatures for batch auctions, transparently decrypting
/// gated signatures via the decryption gateway.
pub struct SignatureResolver {
    service: Arc<dyn SignatureService>,
    gateway: Arc<dyn DecryptionGateway>,
    site: SignInSite,
    shared: Arc<Shared>,
}

impl SignatureResolver {
    pub fn new(
        service: Arc<dyn SignatureService>,
        gateway: Arc<dyn DecryptionGateway>,
        site: SignInSite,
    ) -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            service,
            gateway,
            site,
            shared: Arc::new(Shared {
                tx,
                gate: Mutex::new(Gate {
                    generation: 0,
                    closed: false,
                }),
            }),
        }
    }

    /// Start a resolution flow for `request`, superseding any in-flight
    /// flow. The superseded flow's eventual result, success or failure,
    /// is silently dropped.
    ///
    /// Missing inputs make the flow a no-op: nothing is fetched, nothing
    /// is published, no error is raised. Failures of the current flow
    /// clear the held signature and log once at error level; the consumer
    /// only ever observes an absent signature.
    pub fn resolve(&self, request: ResolveRequest) -> JoinHandle<()> {
        let generation = {
            let mut gate = self.shared.gate.lock().unwrap();
            gate.generation += 1;
            gate.generation
        };

        let flow = Flow {
            service: Arc::clone(&self.service),
            gateway: Arc::clone(&self.gateway),
            site: self.site.clone(),
            shared: Arc::clone(&self.shared),
            generation,
        };

        tokio::spawn(async move {
            let ResolveRequest {
                chain_id,
                auction_id,
                account,
                wallet,
            } = request;
            let (Some(chain_id), Some(auction_id), Some(account), Some(wallet)) =
                (chain_id, auction_id, account, wallet)
            else {
                debug!("Skipping signature resolution - incomplete inputs");
                return;
            };

            match flow.run(chain_id, auction_id, account, wallet).await {
                Ok(Some(signature)) => {
                    if flow.shared.apply(flow.generation, Some(signature)) {
                        debug!(chain_id, auction_id, "Resolved bid signature");
                    } else {
                        debug!(chain_id, auction_id, "Dropping stale signature result");
                    }
                }
                Ok(None) => {
                    debug!(chain_id, auction_id, "Dropping superseded signature flow");
                }
                Err(e) => {
                    if flow.shared.apply(flow.generation, None) {
                        error!(
                            chain_id,
                            auction_id,
                            error = %e,
                            "Failed to resolve bid signature"
                        );
                    } else {
                        debug!(chain_id, auction_id, "Dropping stale signature failure");
                    }
                }
            }
        })
    }

    /// Watch the latest resolved signature.
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.shared.tx.subscribe()
    }

    /// The currently held signature, if any.
    pub fn signature(&self) -> Option<String> {
        self.shared.tx.borrow().clone()
    }

    /// Tear the resolver down. In-flight flows finish without publishing.
    pub fn close(&self) {
        let mut gate = self.shared.gate.lock().unwrap();
        gate.closed = true;
    }
}

impl Drop for SignatureResolver {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for SignatureResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let gate = self.shared.gate.lock().unwrap();
        f.debug_struct("SignatureResolver")
            .field("generation", &gate.generation)
            .field("closed", &gate.closed)
            .finish()
    }
}

/// One resolution attempt, pinned to a generation.
struct Flow {
    service: Arc<dyn SignatureService>,
    gateway: Arc<dyn DecryptionGateway>,
    site: SignInSite,
    shared: Arc<Shared>,
    generation: u64,
}

impl Flow {
    /// Fetch, then optionally authorize and decrypt. `Ok(None)` means the
    /// flow observed itself superseded after an await point and gave up
    /// without a result.
    async fn run(
        &self,
        chain_id: u64,
        auction_id: u64,
        account: Address,
        wallet: Arc<dyn WalletSession>,
    ) -> Result<Option<String>> {
        let address = account.to_string();
        let query = SignatureQuery {
            network_id: chain_id,
            auction_id,
            address: address.clone(),
        };
        let reply = self
            .service
            .get_signature(&query)
            .await
            .context("Signature fetch failed")?;
        if self.shared.is_stale(self.generation) {
            return Ok(None);
        }

        let payload = match reply {
            SignatureReply::Plain(signature) => return Ok(Some(signature)),
            SignatureReply::Encrypted(payload) => payload,
        };

        let auth_sig = generate_auth_sig(wallet.as_ref(), &self.site, chain_id, auction_id)
            .await
            .context("Sign-in authorization failed")?;

        let chain = chains::chain_name(chain_id);
        let request = EncryptionKeyRequest {
            access_control_conditions: vec![AccessControlCondition::wallet_is(&address, chain)],
            to_decrypt: payload.encrypted_symmetric_key,
            chain: chain.to_string(),
            auth_sig,
        };
        let key = self
            .gateway
            .get_encryption_key(&request)
            .await
            .context("Encryption key retrieval failed")?;
        if self.shared.is_stale(self.generation) {
            return Ok(None);
        }

        let signature = cipher::decrypt_string(&payload.encrypted_string, &key)
            .context("Signature decryption failed")?;
        Ok(Some(signature))
    }
}
