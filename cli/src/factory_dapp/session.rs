//! Session state: which account is connected, which chain it is on and what
//! the dapp currently believes the factory contains.

use ethers::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use basemint_common::{
    ChainId, CreateTokenForm, Error, FactoryStats, Network, NetworkRegistry, SwitchError,
    TokenRecord,
};

use super::contract::PendingCreate;
use super::gateway::FactoryGateway;
use super::wallet::{WalletBridge, WalletEvent};

#[derive(Debug, Clone, Copy, Default)]
struct Session {
    account: Option<Address>,
    chain_id: Option<ChainId>,
}

/// A point-in-time copy of the session, for display.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub account: Option<Address>,
    pub chain_id: Option<ChainId>,
    pub network_name: Option<String>,
    pub explorer_endpoint: Option<String>,
    /// Whether the session can only read: no factory is bound.
    pub read_only: bool,
}

/// What the dapp last read from the factory: the connected creator's tokens,
/// oldest first, plus the factory-wide counters.
#[derive(Debug, Clone, Default)]
pub struct LedgerView {
    pub tokens: Vec<TokenRecord>,
    pub stats: FactoryStats,
}

/// The dapp's session. The bound gateway and the token ledger follow the
/// connected account and the active chain around; commands ask this type for
/// a snapshot instead of tracking wallet state themselves.
pub struct SessionManager {
    wallet: Arc<dyn WalletBridge>,
    registry: NetworkRegistry,
    session: RwLock<Session>,
    gateway: RwLock<Option<FactoryGateway>>,
    ledger: RwLock<LedgerView>,
    create_in_flight: AtomicBool,
}

impl SessionManager {
    pub fn new(wallet: Arc<dyn WalletBridge>, registry: NetworkRegistry) -> SessionManager {
        SessionManager {
            wallet,
            registry,
            session: RwLock::new(Session::default()),
            gateway: RwLock::new(None),
            ledger: RwLock::new(LedgerView::default()),
            create_in_flight: AtomicBool::new(false),
        }
    }

    /// Connects the wallet: asks it for accounts, finds out which chain it is
    /// on and binds the factory deployed there, if any.
    pub async fn connect(&self) -> Result<SessionSnapshot, Error> {
        let accounts = self.wallet.request_accounts().await?;
        let Some(&account) = accounts.first() else {
            return Err(Error::UserRejected);
        };
        let chain_id = self.wallet.chain_id().await?;

        {
            let mut session = self.session.write().await;
            session.account = Some(account);
            session.chain_id = Some(chain_id);
        }

        self.rebind_gateway(chain_id).await;
        if let Err(err) = self.refresh_ledger().await {
            tracing::warn!("Failed to load token listing: {err}");
        }

        Ok(self.snapshot().await)
    }

    /// Moves the wallet to another network. If the wallet does not recognize
    /// the chain, it is taught the chain first.
    pub async fn switch_network(&self, network: Network) -> Result<SessionSnapshot, Error> {
        let entry = self.registry.get(network);
        let chain_id = entry.descriptor.chain_id;

        match self.wallet.switch_chain(chain_id).await {
            Ok(()) => {}
            Err(SwitchError::UnrecognizedChain(_)) => {
                // Register the chain and retry the switch, once.
                self.wallet
                    .add_chain(&entry.descriptor)
                    .await
                    .map_err(|err| Error::NetworkSwitchFailed {
                        network: entry.descriptor.display_name.clone(),
                        reason: err.to_string(),
                    })?;
                self.wallet
                    .switch_chain(chain_id)
                    .await
                    .map_err(|err| Error::NetworkSwitchFailed {
                        network: entry.descriptor.display_name.clone(),
                        reason: err.to_string(),
                    })?;
            }
            Err(SwitchError::Failed(reason)) => {
                return Err(Error::NetworkSwitchFailed {
                    network: entry.descriptor.display_name.clone(),
                    reason,
                });
            }
        }

        self.apply_chain(chain_id).await;

        Ok(self.snapshot().await)
    }

    /// Applies an event the wallet emitted on its own initiative.
    pub async fn apply_event(&self, event: WalletEvent) {
        match event {
            WalletEvent::AccountsChanged(accounts) => {
                if let Some(&account) = accounts.first() {
                    self.session.write().await.account = Some(account);
                    if let Err(err) = self.refresh_ledger().await {
                        tracing::warn!("Failed to reload token listing: {err}");
                    }
                } else {
                    self.disconnect().await;
                }
            }
            WalletEvent::ChainChanged(chain_id) => self.apply_chain(chain_id).await,
        }
    }

    /// Forgets the account, the gateway and everything read through them.
    pub async fn disconnect(&self) {
        *self.session.write().await = Session::default();
        *self.gateway.write().await = None;
        *self.ledger.write().await = LedgerView::default();
    }

    async fn apply_chain(&self, chain_id: ChainId) {
        self.session.write().await.chain_id = Some(chain_id);
        self.rebind_gateway(chain_id).await;
        if let Err(err) = self.refresh_ledger().await {
            tracing::warn!("Failed to reload token listing: {err}");
        }
    }

    async fn rebind_gateway(&self, chain_id: ChainId) {
        let entry = self.registry.by_chain_id(chain_id);
        let factory_address = entry.and_then(|entry| entry.factory_address);

        let gateway = match (entry, factory_address) {
            (Some(entry), Some(factory_address)) => {
                match self
                    .wallet
                    .bind_factory(&entry.descriptor, factory_address)
                    .await
                {
                    Ok(factory) => Some(FactoryGateway::new(entry.descriptor.clone(), factory)),
                    Err(err) => {
                        tracing::warn!(
                            "Failed to bind factory on {}: {err}",
                            entry.descriptor.display_name
                        );
                        None
                    }
                }
            }
            _ => {
                tracing::info!("No factory bound for chain {chain_id}; session is read-only");
                None
            }
        };

        *self.gateway.write().await = gateway;
    }

    /// Reloads the token listing and the factory counters. The projection is
    /// swapped wholesale; if the reload fails midway, the previous projection
    /// stays.
    pub async fn refresh_ledger(&self) -> Result<(), Error> {
        let Some(account) = self.session.read().await.account else {
            return Ok(());
        };
        let Some(gateway) = self.gateway.read().await.clone() else {
            // No factory to read from here.
            *self.ledger.write().await = LedgerView::default();
            return Ok(());
        };

        let (tokens, stats) = gateway.load_projection(account).await?;
        *self.ledger.write().await = LedgerView { tokens, stats };

        Ok(())
    }

    /// Submits a token creation, optionally waiting for it to be mined. At
    /// most one creation may be in flight at a time.
    pub async fn create_token(
        &self,
        form: &CreateTokenForm,
        wait_for_confirmation: bool,
    ) -> Result<PendingCreate, Error> {
        let gateway = self.bound_gateway().await?;
        let _guard = self.begin_write()?;

        let pending = gateway.create_token(form).await?;

        if wait_for_confirmation {
            gateway.confirm(pending).await?;
            if let Err(err) = self.refresh_ledger().await {
                tracing::warn!("Failed to reload token listing: {err}");
            }
        }

        Ok(pending)
    }

    /// The gateway for the current session, or why there is none.
    pub async fn bound_gateway(&self) -> Result<FactoryGateway, Error> {
        let session = *self.session.read().await;

        if session.account.is_none() {
            return Err(Error::NotConnected);
        }

        match self.gateway.read().await.clone() {
            Some(gateway) => Ok(gateway),
            None => {
                let network = session
                    .chain_id
                    .map(|chain_id| self.registry.display_name_for(chain_id))
                    .unwrap_or_else(|| "this network".to_owned());
                Err(Error::UnsupportedNetwork(network))
            }
        }
    }

    fn begin_write(&self) -> Result<WriteGuard, Error> {
        if self.create_in_flight.swap(true, Ordering::SeqCst) {
            return Err(Error::WriteInFlight);
        }

        Ok(WriteGuard {
            flag: &self.create_in_flight,
        })
    }

    /// A point-in-time copy of the session state.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let session = *self.session.read().await;
        let read_only = self.gateway.read().await.is_none();

        SessionSnapshot {
            account: session.account,
            chain_id: session.chain_id,
            network_name: session
                .chain_id
                .map(|chain_id| self.registry.display_name_for(chain_id)),
            explorer_endpoint: session
                .chain_id
                .and_then(|chain_id| self.registry.by_chain_id(chain_id))
                .map(|entry| entry.descriptor.explorer_endpoint.clone()),
            read_only,
        }
    }

    /// What the dapp last read from the factory.
    pub async fn ledger(&self) -> LedgerView {
        self.ledger.read().await.clone()
    }

    pub fn registry(&self) -> &NetworkRegistry {
        &self.registry
    }
}

/// Clears the in-flight flag when the write path ends, on success and on
/// error alike.
struct WriteGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
