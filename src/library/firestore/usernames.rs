use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{api::FirestoreApi, Status};

use super::utils;

/// Document type under 'usernames/{username}' claiming a username for a user.
#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct UsernameClaim {
    pub uid: String,
}

/// Returns true if `usernames/{username}` document exists in Firestore.
#[instrument(name = "usernames::exists", level = "trace", skip(firestore))]
pub async fn exists(firestore: &FirestoreApi, username: &str) -> Result<bool, Status> {
    match utils::read::<UsernameClaim>(firestore, USERNAMES, username.to_owned()).await {
        Ok(_) => Ok(true),
        Err(Status::NotFound(_)) => Ok(false),
        Err(status) => Err(status),
    }
}

const USERNAMES: &str = "usernames";
