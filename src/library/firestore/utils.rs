use std::fmt::Display;

use firestore::errors::FirestoreError;
use tracing::debug;

use crate::{api::FirestoreApi, Status};

pub async fn read<Document: serde::de::DeserializeOwned + Send>(
    firestore: &FirestoreApi,
    collection: &str,
    doc_id: String,
) -> Result<Document, Status> {
    let doc = firestore
        .db()
        .fluent()
        .select()
        .by_id_in(collection)
        .obj()
        .one(&doc_id)
        .await;

    let collection = format!("/{collection}");
    match doc {
        Ok(doc) => match doc {
            Some(doc) => Ok(doc),
            None => {
                debug!("'{collection}/{doc_id}' not found");
                Err(Status::not_found(format!(
                    "Firestore '{collection}/{doc_id}' document was not found"
                )))
            }
        },
        Err(e) => Err(make_status(e, &collection, doc_id)),
    }
}

pub async fn write<Document: serde::Serialize + serde::de::DeserializeOwned + Send + Sync>(
    firestore: &FirestoreApi,
    collection: &str,
    doc_id: &str,
    document: &Document,
) -> Result<(), Status> {
    let result = firestore
        .db()
        .fluent()
        .update()
        .in_col(collection)
        .document_id(doc_id)
        .object(document)
        .execute::<()>()
        .await;

    match result {
        Ok(()) => Ok(()),
        Err(e) => Err(make_status(e, &format!("/{collection}"), doc_id)),
    }
}

/// Converts a Firestore error into a `Status` naming the document, keeping
/// the error class (network, conflict, ...) intact.
pub fn make_status<S: Into<String> + Display>(
    error: FirestoreError,
    collection: &str,
    doc_id: S,
) -> Status {
    match error {
        FirestoreError::DeserializeError(e) => Status::internal(format!(
            "Firestore '{collection}/{doc_id}' document failed to parse with error '{}'",
            e.message,
        )),
        e => match Status::from(e) {
            Status::Internal(msg) => {
                Status::internal(format!("Firestore '{collection}/{doc_id}' error: {msg}"))
            }
            status => status,
        },
    }
}

pub const USERS: &str = "users";
