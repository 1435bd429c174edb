use crate::{
    api::FirestoreApi,
    documents::{ExternalGame, Platform},
    Status,
};
use tracing::instrument;

use super::utils;

/// Reads `external_games/{platform}_{platform_title_id}` document in
/// Firestore.
#[instrument(name = "external_games::read", level = "trace", skip(firestore))]
pub async fn read(
    firestore: &FirestoreApi,
    platform: Platform,
    platform_title_id: &str,
) -> Result<ExternalGame, Status> {
    utils::read(
        firestore,
        EXTERNAL_GAMES,
        ExternalGame::doc_id(platform, platform_title_id),
    )
    .await
}

const EXTERNAL_GAMES: &str = "external_games";
