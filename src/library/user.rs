use crate::{
    api::{FirestoreApi, PsnApi, RiotApi, SteamApi},
    documents::{Platform, PlatformKeys, SyncResult, UserData},
    traits::PlatformAdapter,
    util, Status,
};
use futures::future;
use std::sync::Arc;
use tracing::{error, info, instrument};

use super::{firestore, LibrarySync};

pub struct User {
    data: UserData,
    firestore: Arc<FirestoreApi>,
}

impl User {
    /// Returns a User instance that is loaded from the Firestore users
    /// collection. Creates a new User entry in Firestore if user does not
    /// already exist.
    #[instrument(level = "trace", skip(firestore))]
    pub async fn fetch(firestore: Arc<FirestoreApi>, user_id: &str) -> Result<Self, Status> {
        load_user(user_id, firestore).await
    }

    pub fn uid(&self) -> &str {
        &self.data.uid
    }

    /// Platforms with a linked account.
    pub fn linked_platforms(&self) -> Vec<Platform> {
        match &self.data.keys {
            Some(keys) => Platform::remote()
                .into_iter()
                .filter(|platform| keys.is_linked(*platform))
                .collect(),
            None => vec![],
        }
    }

    /// Returns the adapter for a linked `platform`.
    pub fn adapter(
        &self,
        platform: Platform,
        keys: &util::keys::Keys,
    ) -> Result<Box<dyn PlatformAdapter>, Status> {
        let adapter = match &self.data.keys {
            Some(user_keys) => make_adapter(platform, user_keys, keys),
            None => None,
        };
        adapter.ok_or_else(|| {
            Status::invalid_argument(format!(
                "User '{}' has no linked {platform} account.",
                &self.data.uid
            ))
        })
    }

    /// Sync user library with every linked platform. Platforms are synced
    /// concurrently and independently; a failing platform does not affect
    /// the others.
    #[instrument(level = "trace", skip(self, library_sync, keys))]
    pub async fn sync_accounts(
        &self,
        library_sync: &LibrarySync,
        keys: &util::keys::Keys,
    ) -> Vec<(Platform, Result<SyncResult, Status>)> {
        let adapters = self
            .linked_platforms()
            .into_iter()
            .filter_map(|platform| self.adapter(platform, keys).ok())
            .collect::<Vec<_>>();

        future::join_all(adapters.iter().map(|adapter| async {
            (
                adapter.platform(),
                library_sync
                    .sync_full_library(&self.data.uid, adapter.as_ref())
                    .await,
            )
        }))
        .await
    }

    /// Remove user credentials of a platform.
    #[instrument(level = "trace", skip(self))]
    pub async fn remove_platform(&mut self, platform: Platform) -> Result<(), Status> {
        if platform == Platform::Manual {
            return Err(Status::invalid_argument(format!(
                "Platform '{platform}' has no credentials."
            )));
        }

        if let Some(keys) = &mut self.data.keys {
            keys.clear(platform);
            firestore::user_data::write(&self.firestore, &self.data).await?;
        }
        Ok(())
    }
}

/// Builds the adapter of `platform` from the user's linked account, or
/// `None` if the account is not linked.
fn make_adapter(
    platform: Platform,
    user_keys: &PlatformKeys,
    keys: &util::keys::Keys,
) -> Option<Box<dyn PlatformAdapter>> {
    if !user_keys.is_linked(platform) {
        return None;
    }

    match platform {
        Platform::Steam => Some(Box::new(SteamApi::new(
            &keys.steam.client_key,
            &user_keys.steam_user_id,
        ))),
        Platform::PlayStation => Some(Box::new(PsnApi::new(
            &user_keys.psn_account_id,
            &user_keys.psn_access_token,
        ))),
        Platform::Riot => {
            let shard = match user_keys.riot_shard.is_empty() {
                false => &user_keys.riot_shard,
                true => &keys.riot.region,
            };
            Some(Box::new(RiotApi::new(
                &keys.riot.api_key,
                &user_keys.riot_puuid,
                shard,
            )))
        }
        Platform::Manual => None,
    }
}

#[instrument(level = "trace", skip(user_id, firestore))]
async fn load_user(user_id: &str, firestore: Arc<FirestoreApi>) -> Result<User, Status> {
    match firestore::user_data::read(&firestore, user_id).await {
        Ok(data) => Ok(User { data, firestore }),
        Err(Status::NotFound(_)) => {
            info!("Creating new user '{user_id}'");
            let user = User {
                data: UserData {
                    uid: String::from(user_id),
                    ..Default::default()
                },
                firestore: Arc::clone(&firestore),
            };

            match firestore::user_data::write(&firestore, &user.data).await {
                Ok(_) => Ok(user),
                Err(e) => {
                    error!("Failed to create user '{user_id}': {e}");
                    Err(Status::new(&format!("Failed to create user '{user_id}'"), e))
                }
            }
        }
        Err(e) => Err(e),
    }
}
