use firestore::FirestoreResult;
use futures::{stream::BoxStream, TryStreamExt};
use tracing::instrument;

use crate::{api::FirestoreApi, documents::LibraryEntry, Status};

use super::utils;

/// Returns all library entries of a user.
///
/// Reads `users/{user_id}/library_entries` collection in Firestore.
#[instrument(name = "library_entries::list", level = "trace", skip(firestore))]
pub async fn list(firestore: &FirestoreApi, user_id: &str) -> Result<Vec<LibraryEntry>, Status> {
    let parent_path = firestore.db().parent_path(utils::USERS, user_id)?;

    let entries: BoxStream<FirestoreResult<LibraryEntry>> = firestore
        .db()
        .fluent()
        .select()
        .from(LIBRARY_ENTRIES)
        .parent(&parent_path)
        .obj()
        .stream_query_with_errors()
        .await?;

    Ok(entries.try_collect::<Vec<LibraryEntry>>().await?)
}

/// Reads `users/{user_id}/library_entries/{catalog_id}` document in Firestore.
#[instrument(name = "library_entries::read", level = "trace", skip(firestore))]
pub async fn read(
    firestore: &FirestoreApi,
    user_id: &str,
    catalog_id: u64,
) -> Result<Option<LibraryEntry>, Status> {
    let parent_path = firestore.db().parent_path(utils::USERS, user_id)?;

    let doc = firestore
        .db()
        .fluent()
        .select()
        .by_id_in(LIBRARY_ENTRIES)
        .parent(&parent_path)
        .obj()
        .one(catalog_id.to_string())
        .await;

    match doc {
        Ok(doc) => Ok(doc),
        Err(e) => Err(utils::make_status(
            e,
            &format!("/{}/{user_id}/{LIBRARY_ENTRIES}", utils::USERS),
            catalog_id.to_string(),
        )),
    }
}

/// Writes the entry only if the stored revision matches `entry.revision`.
///
/// The read and the write run in one Firestore transaction, so concurrent
/// syncs touching the same game cannot overwrite each other.
///
/// Reads/writes `users/{user_id}/library_entries/{catalog_id}` document in
/// Firestore.
#[instrument(
    name = "library_entries::upsert",
    level = "trace",
    skip(firestore, entry),
    fields(
        user_id = %entry.user_id,
        catalog_id = %entry.catalog_id,
        revision = %entry.revision,
    )
)]
pub async fn upsert(firestore: &FirestoreApi, entry: &LibraryEntry) -> Result<LibraryEntry, Status> {
    let parent_path = firestore.db().parent_path(utils::USERS, &entry.user_id)?;
    let doc_id = entry.catalog_id.to_string();
    let expected_revision = entry.revision;

    let mut next = entry.clone();
    next.revision += 1;

    let written = firestore
        .db()
        .run_transaction(|db, transaction| {
            let parent_path = parent_path.clone();
            let doc_id = doc_id.clone();
            let next = next.clone();

            Box::pin(async move {
                let stored: Option<LibraryEntry> = db
                    .fluent()
                    .select()
                    .by_id_in(LIBRARY_ENTRIES)
                    .parent(&parent_path)
                    .obj()
                    .one(&doc_id)
                    .await?;

                let stored_revision = stored.map_or(0, |e| e.revision);
                if stored_revision != expected_revision {
                    return Ok(false);
                }

                db.fluent()
                    .update()
                    .in_col(LIBRARY_ENTRIES)
                    .document_id(&doc_id)
                    .parent(&parent_path)
                    .object(&next)
                    .add_to_transaction(transaction)?;
                Ok(true)
            })
        })
        .await?;

    match written {
        true => Ok(next),
        false => Err(Status::conflict(format!(
            "'{}/{}' changed since revision {expected_revision}",
            &entry.user_id, &entry.catalog_id
        ))),
    }
}

/// Deletes `users/{user_id}/library_entries/{id}` document in Firestore.
#[instrument(name = "library_entries::delete", level = "trace", skip(firestore))]
pub async fn delete(firestore: &FirestoreApi, user_id: &str, id: &str) -> Result<(), Status> {
    let parent_path = firestore.db().parent_path(utils::USERS, user_id)?;

    firestore
        .db()
        .fluent()
        .delete()
        .from(LIBRARY_ENTRIES)
        .parent(&parent_path)
        .document_id(id)
        .execute()
        .await?;
    Ok(())
}

const LIBRARY_ENTRIES: &str = "library_entries";
