//! The wallet side of the dapp.
//!
//! In a browser, the dapp and the wallet are separate programs talking through
//! a narrow request interface. Here the CLI plays both roles: [`WalletBridge`]
//! is the interface and [`LocalWalletBridge`] is the wallet behind it, owning
//! the private key and the manifest that serves as the wallet's memory.

use async_trait::async_trait;
use ethers::prelude::*;
use std::env;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, RwLock};

use basemint_common::{ChainId, Error, Network, NetworkDescriptor, SwitchError};

use crate::util::MARKER;
use crate::Manifest;

use super::contract::{EthersFactory, FactoryContract};

/// Something the wallet tells the dapp on its own initiative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    /// The set of exposed accounts changed. Empty means disconnected.
    AccountsChanged(Vec<Address>),
    /// The wallet moved to another chain.
    ChainChanged(ChainId),
}

/// The requests a dapp can make of a wallet.
#[async_trait]
pub trait WalletBridge: Send + Sync {
    /// Asks the wallet to expose its accounts, unlocking a key if necessary.
    async fn request_accounts(&self) -> Result<Vec<Address>, Error>;
    /// The chain the wallet is currently on.
    async fn chain_id(&self) -> Result<ChainId, Error>;
    /// Asks the wallet to move to another chain.
    async fn switch_chain(&self, chain_id: ChainId) -> Result<(), SwitchError>;
    /// Teaches the wallet about a chain it does not know yet.
    async fn add_chain(&self, descriptor: &NetworkDescriptor) -> Result<(), Error>;
    /// A stream of events the wallet emits on its own initiative.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<WalletEvent>;
    /// Binds the factory deployed at `factory_address`, signing with the
    /// wallet's key.
    async fn bind_factory(
        &self,
        descriptor: &NetworkDescriptor,
        factory_address: Address,
    ) -> Result<Arc<dyn FactoryContract>, Error>;
}

struct WalletState {
    manifest: Manifest,
    wallet: Option<LocalWallet>,
}

/// A wallet living in the same process as the dapp. The private key comes
/// from `BASEMINT_PRIVATE_KEY` or from an interactive prompt; everything else
/// the wallet remembers lives in `Basemint.toml`.
pub struct LocalWalletBridge {
    state: RwLock<WalletState>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<WalletEvent>>>,
}

impl LocalWalletBridge {
    pub fn new(manifest: Manifest) -> LocalWalletBridge {
        LocalWalletBridge {
            state: RwLock::new(WalletState {
                manifest,
                wallet: None,
            }),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Re-reads the manifest from disk, emitting a chain-change event if the
    /// active network moved.
    pub async fn reload_manifest(&self) -> Result<(), Error> {
        let manifest = Manifest::find().map_err(|err| Error::Message(err.to_string()))?;

        let changed_to = {
            let mut state = self.state.write().await;
            let changed = state.manifest.network.active != manifest.network.active;
            let active = manifest.network.active;
            state.manifest = manifest;
            changed.then(|| active.chain_id())
        };

        if let Some(chain_id) = changed_to {
            self.emit(WalletEvent::ChainChanged(chain_id));
        }

        Ok(())
    }

    /// A provider for the network the wallet is currently on.
    async fn provider(&self) -> Result<Provider<Http>, Error> {
        let state = self.state.read().await;
        let network = state.manifest.network.active;
        let endpoint = state.manifest.rpc_endpoint(network).ok_or_else(|| {
            Error::Message(format!(
                "no RPC endpoint is registered for {network}; add `rpc-endpoint` under \
                 `[networks.{network}]` in `Basemint.toml`"
            ))
        })?;

        Provider::<Http>::try_from(endpoint.as_str())
            .map_err(|err| Error::Message(err.to_string()))
    }

    fn emit(&self, event: WalletEvent) {
        self.subscribers
            .lock()
            .expect("poisoned")
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }
}

#[async_trait]
impl WalletBridge for LocalWalletBridge {
    async fn request_accounts(&self) -> Result<Vec<Address>, Error> {
        {
            let state = self.state.read().await;
            if let Some(wallet) = &state.wallet {
                return Ok(vec![wallet.address()]);
            }
        }

        let key = match env::var("BASEMINT_PRIVATE_KEY") {
            Ok(key) => key,
            Err(env::VarError::NotPresent) => {
                let key = rpassword::prompt_password(format!("{MARKER} Insert private key: "))
                    .map_err(|_| Error::WalletUnavailable)?;
                println!();
                key
            }
            Err(err) => return Err(Error::Message(err.to_string())),
        };

        if key.trim().is_empty() {
            return Err(Error::UserRejected);
        }

        let wallet: LocalWallet = key.trim().parse().map_err(|err| Error::InvalidField {
            field: "private key",
            reason: format!("{err}"),
        })?;
        let address = wallet.address();

        {
            let mut state = self.state.write().await;
            state.wallet = Some(wallet);
        }

        self.emit(WalletEvent::AccountsChanged(vec![address]));

        Ok(vec![address])
    }

    async fn chain_id(&self) -> Result<ChainId, Error> {
        let chain_id = self
            .provider()
            .await?
            .get_chainid()
            .await
            .map_err(|err| Error::ReadFailed(err.to_string()))?;

        Ok(ChainId(chain_id.as_u64()))
    }

    async fn switch_chain(&self, chain_id: ChainId) -> Result<(), SwitchError> {
        let Some(network) = Network::by_chain_id(chain_id) else {
            return Err(SwitchError::UnrecognizedChain(chain_id));
        };

        {
            let mut state = self.state.write().await;

            // A network without an endpoint is one the wallet does not know.
            if state.manifest.rpc_endpoint(network).is_none() {
                return Err(SwitchError::UnrecognizedChain(chain_id));
            }

            state.manifest.network.active = network;
            state
                .manifest
                .persist()
                .map_err(|err| SwitchError::Failed(err.to_string()))?;
        }

        self.emit(WalletEvent::ChainChanged(chain_id));

        Ok(())
    }

    async fn add_chain(&self, descriptor: &NetworkDescriptor) -> Result<(), Error> {
        let Some(network) = Network::by_chain_id(descriptor.chain_id) else {
            return Err(Error::Message(format!(
                "cannot register chain {}: not a supported Base network",
                descriptor.chain_id
            )));
        };

        let mut state = self.state.write().await;
        state
            .manifest
            .set_rpc_endpoint(network, descriptor.rpc_endpoint.clone());
        state
            .manifest
            .persist()
            .map_err(|err| Error::Message(err.to_string()))?;

        Ok(())
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<WalletEvent> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.subscribers.lock().expect("poisoned").push(sender);

        receiver
    }

    async fn bind_factory(
        &self,
        descriptor: &NetworkDescriptor,
        factory_address: Address,
    ) -> Result<Arc<dyn FactoryContract>, Error> {
        let wallet = {
            let state = self.state.read().await;
            state.wallet.clone().ok_or(Error::NotConnected)?
        };
        let wallet = wallet.with_chain_id(descriptor.chain_id.0);

        Ok(Arc::new(EthersFactory::new(
            &descriptor.rpc_endpoint,
            factory_address,
            wallet,
        )?))
    }
}
