use crate::{
    api::FirestoreApi,
    library::LibrarySync,
    traits::{Catalog, LibraryStore, UsernameDirectory},
    util,
};
use std::{convert::Infallible, sync::Arc};
use warp::{self, Filter};

pub fn with_firestore(
    firestore: Arc<FirestoreApi>,
) -> impl Filter<Extract = (Arc<FirestoreApi>,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&firestore))
}

pub fn with_keys(
    keys: Arc<util::keys::Keys>,
) -> impl Filter<Extract = (Arc<util::keys::Keys>,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&keys))
}

pub fn with_store(
    store: Arc<dyn LibraryStore>,
) -> impl Filter<Extract = (Arc<dyn LibraryStore>,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&store))
}

pub fn with_catalog(
    catalog: Arc<dyn Catalog>,
) -> impl Filter<Extract = (Arc<dyn Catalog>,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&catalog))
}

pub fn with_library_sync(
    library_sync: Arc<LibrarySync>,
) -> impl Filter<Extract = (Arc<LibrarySync>,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&library_sync))
}

pub fn with_usernames(
    usernames: Arc<dyn UsernameDirectory>,
) -> impl Filter<Extract = (Arc<dyn UsernameDirectory>,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&usernames))
}
