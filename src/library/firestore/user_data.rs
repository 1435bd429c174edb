use tracing::instrument;

use crate::{api::FirestoreApi, documents::UserData, Status};

use super::utils;

/// Reads `users/{user_id}` document in Firestore.
#[instrument(name = "users::read", level = "trace", skip(firestore))]
pub async fn read(firestore: &FirestoreApi, user_id: &str) -> Result<UserData, Status> {
    utils::read(firestore, utils::USERS, user_id.to_owned()).await
}

/// Writes `users/{user_id}` document in Firestore.
#[instrument(
    name = "users::write",
    level = "trace",
    skip(firestore, user_data),
    fields(user_id = %user_data.uid),
)]
pub async fn write(firestore: &FirestoreApi, user_data: &UserData) -> Result<(), Status> {
    utils::write(firestore, utils::USERS, &user_data.uid, user_data).await
}
