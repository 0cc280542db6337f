//! The on-chain token factory, seen through its ABI.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use ethers::abi::Abi;
use ethers::prelude::*;
use std::sync::Arc;

use basemint_common::{format_supply, Error, FactoryStats, TokenRecord, ValidatedForm};

use super::wait;

/// A `createToken` transaction that has been submitted but not yet mined.
#[derive(Debug, Clone, Copy)]
pub struct PendingCreate {
    pub tx_hash: TxHash,
}

/// The operations the token factory exposes. Reads go through the active
/// RPC endpoint; `create_token` goes through the signer.
#[async_trait]
pub trait FactoryContract: Send + Sync {
    /// Submits a `createToken` transaction with the given parameters.
    async fn create_token(&self, form: &ValidatedForm) -> Result<PendingCreate, Error>;
    /// Waits for a submitted transaction to be mined and checks that it did
    /// not revert.
    async fn confirm(&self, pending: PendingCreate) -> Result<(), Error>;
    /// The addresses of all tokens a creator has deployed, oldest first.
    async fn creator_tokens(&self, creator: Address) -> Result<Vec<Address>, Error>;
    /// The full record of a single deployed token.
    async fn token_info(&self, token: Address) -> Result<TokenRecord, Error>;
    /// Factory-wide counters.
    async fn factory_stats(&self) -> Result<FactoryStats, Error>;
}

/// The real factory, bound to a deployment through `ethers`.
pub struct EthersFactory {
    contract: Contract<SignerMiddleware<Provider<Http>, LocalWallet>>,
    provider: Provider<Http>,
    sender: Address,
}

impl EthersFactory {
    /// Binds the factory deployed at `factory_address`, signing with `wallet`.
    pub fn new(
        endpoint: &str,
        factory_address: Address,
        wallet: LocalWallet,
    ) -> Result<EthersFactory, Error> {
        let provider =
            Provider::<Http>::try_from(endpoint).map_err(|err| Error::Message(err.to_string()))?;
        let sender = wallet.address();
        let client = Arc::new(SignerMiddleware::new(provider.clone(), wallet));
        let abi: Abi = serde_json::from_str(include_str!("../../../blockchain/TokenFactory.json"))
            .expect("TokenFactory abi is valid");
        let contract = Contract::new(factory_address, abi, client);

        Ok(EthersFactory {
            contract,
            provider,
            sender,
        })
    }
}

#[async_trait]
impl FactoryContract for EthersFactory {
    async fn create_token(&self, form: &ValidatedForm) -> Result<PendingCreate, Error> {
        let call = self
            .contract
            .method::<_, Address>(
                "createToken",
                (
                    form.name.clone(),
                    form.symbol.clone(),
                    form.decimals,
                    form.initial_supply,
                    form.max_supply,
                ),
            )
            .expect("ABI was not declared as expected")
            .from(self.sender);

        // Gas shenanigans:
        wait().await;
        let estimate = match call.estimate_gas().await {
            Ok(estimate) => estimate,
            Err(err) => {
                let Some(revert) = err.decode_revert::<String>() else {
                    return Err(Error::ChainRejected(format!(
                        "estimating gas for `createToken`: {err}"
                    )));
                };
                return Err(Error::ChainRejected(format!("contract says: {revert}")));
            }
        };
        let call = call.gas(estimate);

        wait().await;
        let pending = match call.send().await {
            Ok(pending) => pending,
            Err(err) => {
                return if let Some(revert) = err.decode_revert::<String>() {
                    Err(Error::ChainRejected(format!("contract says: {revert}")))
                } else {
                    Err(Error::SubmissionRejected(err.to_string()))
                };
            }
        };

        Ok(PendingCreate {
            tx_hash: pending.tx_hash(),
        })
    }

    async fn confirm(&self, pending: PendingCreate) -> Result<(), Error> {
        let receipt = PendingTransaction::new(pending.tx_hash, &self.provider)
            .await
            .map_err(|err| Error::ChainRejected(err.to_string()))?
            .ok_or_else(|| {
                Error::ChainRejected("transaction dropped from the mempool".to_owned())
            })?;

        if receipt.status == Some(0u64.into()) {
            return Err(Error::ChainRejected(format!(
                "transaction {:?} reverted",
                pending.tx_hash
            )));
        }

        Ok(())
    }

    async fn creator_tokens(&self, creator: Address) -> Result<Vec<Address>, Error> {
        self.contract
            .method::<_, Vec<Address>>("getCreatorTokens", creator)
            .expect("ABI was not declared as expected")
            .call()
            .await
            .map_err(|err| Error::ReadFailed(err.to_string()))
    }

    async fn token_info(&self, token: Address) -> Result<TokenRecord, Error> {
        let (address, name, symbol, decimals, initial_supply, max_supply, creator, created_at, is_active) = self
            .contract
            .method::<_, (Address, String, String, u8, U256, U256, Address, u64, bool)>(
                "getTokenInfo",
                token,
            )
            .expect("ABI was not declared as expected")
            .call()
            .await
            .map_err(|err| Error::ReadFailed(err.to_string()))?;

        let created_at = Utc
            .timestamp_opt(created_at as i64, 0)
            .single()
            .ok_or_else(|| {
                Error::ReadFailed(format!(
                    "token {token:?} has an out-of-range creation timestamp"
                ))
            })?;

        Ok(TokenRecord {
            address,
            name,
            symbol,
            decimals,
            initial_supply: format_supply(initial_supply, decimals)?,
            max_supply: format_supply(max_supply, decimals)?,
            creator,
            created_at,
            is_active,
        })
    }

    async fn factory_stats(&self) -> Result<FactoryStats, Error> {
        let (total_tokens, total_creators, is_paused) = self
            .contract
            .method::<_, (u64, u64, bool)>("getFactoryStats", ())
            .expect("ABI was not declared as expected")
            .call()
            .await
            .map_err(|err| Error::ReadFailed(err.to_string()))?;

        Ok(FactoryStats {
            total_tokens,
            total_creators,
            is_paused,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn the_bundled_abi_declares_the_factory_operations() {
        let abi: Abi = serde_json::from_str(include_str!("../../../blockchain/TokenFactory.json"))
            .expect("TokenFactory abi is valid");

        for name in [
            "createToken",
            "getCreatorTokens",
            "getTokenInfo",
            "getFactoryStats",
        ] {
            assert!(abi.function(name).is_ok(), "missing function {name}");
        }
    }
}
