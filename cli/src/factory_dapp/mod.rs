//! The moving parts of the token factory dapp: wallet, contract, and session.

pub mod contract;
pub mod gateway;
pub mod session;
pub mod wallet;

use std::sync::Arc;

use crate::Manifest;

use self::session::SessionManager;
use self::wallet::LocalWalletBridge;

/// Introduces a delay between blockchain operations to prevent provider
/// throttling.
pub(crate) async fn wait() {
    tokio::time::sleep(basemint_common::blockchain::THROTTLE_LIMIT).await;
}

/// The dapp as a whole: a wallet bridge plus the session driven through it.
pub struct FactoryDapp {
    wallet: Arc<LocalWalletBridge>,
    session: SessionManager,
}

impl FactoryDapp {
    /// Loads the dapp from the manifest in the current directory.
    pub fn load() -> Result<FactoryDapp, anyhow::Error> {
        let manifest = Manifest::find()?;
        let registry = manifest.registry()?;
        let wallet = Arc::new(LocalWalletBridge::new(manifest));
        let session = SessionManager::new(wallet.clone(), registry);

        Ok(FactoryDapp { wallet, session })
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn wallet(&self) -> &Arc<LocalWalletBridge> {
        &self.wallet
    }
}
