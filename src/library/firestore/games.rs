use crate::{api::FirestoreApi, documents::CanonicalGame, Status};
use tracing::instrument;

use super::utils;

/// Reads `games/{catalog_id}` document in Firestore.
#[instrument(name = "games::read", level = "trace", skip(firestore))]
pub async fn read(firestore: &FirestoreApi, catalog_id: u64) -> Result<CanonicalGame, Status> {
    utils::read(firestore, GAMES, catalog_id.to_string()).await
}

const GAMES: &str = "games";
