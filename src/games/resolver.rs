use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tracing::instrument;

use crate::{
    api::FirestoreApi,
    documents::Platform,
    library::firestore::external_games,
    logging::ResolveEvent,
    traits::IdentityResolver,
    Status,
};

/// Resolves titles through the `external_games` collection, which maps
/// `{platform}_{platform_title_id}` to a catalog id.
pub struct ExternalGamesResolver {
    firestore: Arc<FirestoreApi>,
}

impl ExternalGamesResolver {
    pub fn new(firestore: Arc<FirestoreApi>) -> Self {
        ExternalGamesResolver { firestore }
    }
}

#[async_trait]
impl IdentityResolver for ExternalGamesResolver {
    #[instrument(name = "external_games::resolve", level = "trace", skip(self))]
    async fn resolve(
        &self,
        platform_title_id: &str,
        platform: Platform,
    ) -> Result<Option<u64>, Status> {
        let response = match external_games::read(&self.firestore, platform, platform_title_id).await
        {
            Ok(external_game) => Ok(Some(external_game.catalog_id)),
            Err(Status::NotFound(_)) => Ok(None),
            Err(status) => Err(status),
        };
        ResolveEvent::resolve(platform, platform_title_id, &response);
        response
    }
}

/// Resolver for platforms whose library is a single title. Every title id
/// maps to the same catalog id.
pub struct FixedTitleResolver {
    catalog_id: u64,
}

impl FixedTitleResolver {
    pub fn new(catalog_id: u64) -> Self {
        FixedTitleResolver { catalog_id }
    }
}

#[async_trait]
impl IdentityResolver for FixedTitleResolver {
    async fn resolve(
        &self,
        _platform_title_id: &str,
        _platform: Platform,
    ) -> Result<Option<u64>, Status> {
        Ok(Some(self.catalog_id))
    }
}

/// In-process lookup table keyed by (platform, platform_title_id).
#[derive(Default)]
pub struct LookupTableResolver {
    table: HashMap<(Platform, String), u64>,
}

impl LookupTableResolver {
    pub fn new() -> Self {
        LookupTableResolver::default()
    }

    pub fn with(mut self, platform: Platform, platform_title_id: &str, catalog_id: u64) -> Self {
        self.table
            .insert((platform, platform_title_id.to_owned()), catalog_id);
        self
    }
}

#[async_trait]
impl IdentityResolver for LookupTableResolver {
    async fn resolve(
        &self,
        platform_title_id: &str,
        platform: Platform,
    ) -> Result<Option<u64>, Status> {
        Ok(self
            .table
            .get(&(platform, platform_title_id.to_owned()))
            .copied())
    }
}

/// Dispatches resolution to the strategy of each platform.
pub struct PlatformResolver {
    catalog: Arc<dyn IdentityResolver>,
    single_title: FixedTitleResolver,
}

impl PlatformResolver {
    /// `catalog` resolves game-list platforms; Riot titles always resolve to
    /// `riot_catalog_id`.
    pub fn new(catalog: Arc<dyn IdentityResolver>, riot_catalog_id: u64) -> Self {
        PlatformResolver {
            catalog,
            single_title: FixedTitleResolver::new(riot_catalog_id),
        }
    }
}

#[async_trait]
impl IdentityResolver for PlatformResolver {
    async fn resolve(
        &self,
        platform_title_id: &str,
        platform: Platform,
    ) -> Result<Option<u64>, Status> {
        match platform {
            Platform::Steam | Platform::PlayStation => {
                self.catalog.resolve(platform_title_id, platform).await
            }
            Platform::Riot => self.single_title.resolve(platform_title_id, platform).await,
            Platform::Manual => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> PlatformResolver {
        PlatformResolver::new(
            Arc::new(
                LookupTableResolver::new()
                    .with(Platform::Steam, "620", 100)
                    .with(Platform::PlayStation, "PPSA01284_00", 100),
            ),
            7,
        )
    }

    #[tokio::test]
    async fn lookup_per_platform() {
        let resolver = resolver();

        assert_eq!(resolver.resolve("620", Platform::Steam).await, Ok(Some(100)));
        assert_eq!(
            resolver.resolve("PPSA01284_00", Platform::PlayStation).await,
            Ok(Some(100))
        );
        assert_eq!(resolver.resolve("620", Platform::PlayStation).await, Ok(None));
        assert_eq!(resolver.resolve("999", Platform::Steam).await, Ok(None));
    }

    #[tokio::test]
    async fn riot_always_resolves_to_fixed_title() {
        let resolver = resolver();

        assert_eq!(resolver.resolve("valorant", Platform::Riot).await, Ok(Some(7)));
        assert_eq!(resolver.resolve("anything", Platform::Riot).await, Ok(Some(7)));
    }

    #[tokio::test]
    async fn manual_never_resolves() {
        assert_eq!(resolver().resolve("620", Platform::Manual).await, Ok(None));
    }
}
