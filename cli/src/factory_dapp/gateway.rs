//! The dapp's view of one factory deployment on one network.

use ethers::prelude::*;
use futures::future;
use std::sync::Arc;

use basemint_common::{CreateTokenForm, Error, FactoryStats, NetworkDescriptor, TokenRecord};

use super::contract::{FactoryContract, PendingCreate};

/// A factory deployment, paired with the network it lives on.
#[derive(Clone)]
pub struct FactoryGateway {
    descriptor: NetworkDescriptor,
    factory: Arc<dyn FactoryContract>,
}

impl FactoryGateway {
    pub fn new(descriptor: NetworkDescriptor, factory: Arc<dyn FactoryContract>) -> FactoryGateway {
        FactoryGateway {
            descriptor,
            factory,
        }
    }

    /// The network this gateway is bound to.
    pub fn descriptor(&self) -> &NetworkDescriptor {
        &self.descriptor
    }

    /// Validates a creation form and submits it to the factory.
    pub async fn create_token(&self, form: &CreateTokenForm) -> Result<PendingCreate, Error> {
        let validated = form.validate()?;
        self.factory.create_token(&validated).await
    }

    /// Waits for a submitted creation to be mined.
    pub async fn confirm(&self, pending: PendingCreate) -> Result<(), Error> {
        self.factory.confirm(pending).await
    }

    /// All tokens a creator has deployed, in creation order. One failed lookup
    /// fails the whole listing.
    pub async fn list_creator_tokens(&self, creator: Address) -> Result<Vec<TokenRecord>, Error> {
        let addresses = self.factory.creator_tokens(creator).await?;

        future::try_join_all(
            addresses
                .into_iter()
                .map(|token| self.factory.token_info(token)),
        )
        .await
    }

    pub async fn factory_stats(&self) -> Result<FactoryStats, Error> {
        self.factory.factory_stats().await
    }

    /// The creator's tokens and the factory counters, in one go.
    pub async fn load_projection(
        &self,
        creator: Address,
    ) -> Result<(Vec<TokenRecord>, FactoryStats), Error> {
        let tokens = self.list_creator_tokens(creator).await?;
        let stats = self.factory_stats().await?;

        Ok((tokens, stats))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use async_trait::async_trait;
    use basemint_common::{Network, NetworkRegistry, ValidatedForm};
    use chrono::Utc;
    use std::time::Duration;

    struct ScriptedFactory {
        addresses: Vec<Address>,
        fail_at: Option<usize>,
    }

    #[async_trait]
    impl FactoryContract for ScriptedFactory {
        async fn create_token(&self, _form: &ValidatedForm) -> Result<PendingCreate, Error> {
            unimplemented!("read-only fake")
        }

        async fn confirm(&self, _pending: PendingCreate) -> Result<(), Error> {
            unimplemented!("read-only fake")
        }

        async fn creator_tokens(&self, _creator: Address) -> Result<Vec<Address>, Error> {
            Ok(self.addresses.clone())
        }

        async fn token_info(&self, token: Address) -> Result<TokenRecord, Error> {
            let position = self
                .addresses
                .iter()
                .position(|address| *address == token)
                .unwrap();

            // Later lookups finish first.
            let staggered = 5 * (self.addresses.len() - position) as u64;
            tokio::time::sleep(Duration::from_millis(staggered)).await;

            if self.fail_at == Some(position) {
                return Err(Error::ReadFailed(format!("no such token {token:?}")));
            }

            Ok(TokenRecord {
                address: token,
                name: format!("Token {position}"),
                symbol: format!("T{position}"),
                decimals: 18,
                initial_supply: "1000000".to_owned(),
                max_supply: "10000000".to_owned(),
                creator: Address::from_low_u64_be(0xaa),
                created_at: Utc::now(),
                is_active: true,
            })
        }

        async fn factory_stats(&self) -> Result<FactoryStats, Error> {
            Ok(FactoryStats {
                total_tokens: self.addresses.len() as u64,
                total_creators: 1,
                is_paused: false,
            })
        }
    }

    fn gateway(factory: ScriptedFactory) -> FactoryGateway {
        let descriptor = NetworkRegistry::with_defaults()
            .get(Network::Sepolia)
            .descriptor
            .clone();

        FactoryGateway::new(descriptor, Arc::new(factory))
    }

    fn addresses(count: u64) -> Vec<Address> {
        (1..=count).map(Address::from_low_u64_be).collect()
    }

    #[tokio::test]
    async fn listings_preserve_creation_order() {
        let gateway = gateway(ScriptedFactory {
            addresses: addresses(3),
            fail_at: None,
        });

        let tokens = gateway
            .list_creator_tokens(Address::from_low_u64_be(0xaa))
            .await
            .unwrap();
        let symbols = tokens
            .iter()
            .map(|token| token.symbol.as_str())
            .collect::<Vec<_>>();

        assert_eq!(symbols, ["T0", "T1", "T2"]);
    }

    #[tokio::test]
    async fn one_failing_lookup_fails_the_whole_listing() {
        let gateway = gateway(ScriptedFactory {
            addresses: addresses(3),
            fail_at: Some(1),
        });

        let outcome = gateway
            .list_creator_tokens(Address::from_low_u64_be(0xaa))
            .await;
        assert!(matches!(outcome, Err(Error::ReadFailed(_))), "{outcome:?}");
    }

    #[tokio::test]
    async fn validation_happens_before_submission() {
        let gateway = gateway(ScriptedFactory {
            addresses: vec![],
            fail_at: None,
        });
        let form = CreateTokenForm {
            name: "My Token".to_owned(),
            symbol: "MTK".to_owned(),
            decimals: 18,
            initial_supply: "2".to_owned(),
            max_supply: "1".to_owned(),
        };

        // The scripted factory panics if `create_token` is ever reached.
        let outcome = gateway.create_token(&form).await;
        assert!(
            matches!(outcome, Err(Error::SupplyExceedsMax { .. })),
            "{outcome:?}"
        );
    }
}
