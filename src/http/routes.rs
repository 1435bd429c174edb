use crate::{
    api::FirestoreApi,
    library::LibrarySync,
    traits::{Catalog, LibraryStore, UsernameDirectory},
    util,
};
use std::sync::Arc;
use tracing::warn;
use warp::{self, Filter};

use super::{handlers, models, resources::*};

/// Returns a Filter with all available routes.
pub fn routes(
    keys: Arc<util::keys::Keys>,
    firestore: Arc<FirestoreApi>,
    store: Arc<dyn LibraryStore>,
    catalog: Arc<dyn Catalog>,
    library_sync: Arc<LibrarySync>,
    usernames: Arc<dyn UsernameDirectory>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    home()
        .or(post_sync(
            keys,
            Arc::clone(&firestore),
            Arc::clone(&library_sync),
        ))
        .or(post_combined(Arc::clone(&store)))
        .or(post_can_rate(Arc::clone(&store)))
        .or(post_badges(Arc::clone(&store)))
        .or(post_update(Arc::clone(&store)))
        .or(post_game(Arc::clone(&store), catalog))
        .or(post_wishlist(Arc::clone(&store)))
        .or(post_remove(Arc::clone(&store)))
        .or(post_unlink(Arc::clone(&firestore), Arc::clone(&store)))
        .or(post_username_check(usernames))
        .or_else(|e| async {
            warn! {"Rejected route: {:?}", e};
            Err(e)
        })
}

/// GET /
fn home() -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path!().and(warp::get()).and_then(handlers::welcome)
}

/// POST /library/sync
fn post_sync(
    keys: Arc<util::keys::Keys>,
    firestore: Arc<FirestoreApi>,
    library_sync: Arc<LibrarySync>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path!("library" / "sync")
        .and(warp::post())
        .and(json_body::<models::Sync>())
        .and(with_keys(keys))
        .and(with_firestore(firestore))
        .and(with_library_sync(library_sync))
        .and_then(handlers::post_sync)
}

/// POST /library/combined
fn post_combined(
    store: Arc<dyn LibraryStore>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path!("library" / "combined")
        .and(warp::post())
        .and(json_body::<models::Library>())
        .and(with_store(store))
        .and_then(handlers::post_combined)
}

/// POST /library/can_rate
fn post_can_rate(
    store: Arc<dyn LibraryStore>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path!("library" / "can_rate")
        .and(warp::post())
        .and(json_body::<models::CanRate>())
        .and(with_store(store))
        .and_then(handlers::post_can_rate)
}

/// POST /library/badges
fn post_badges(
    store: Arc<dyn LibraryStore>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path!("library" / "badges")
        .and(warp::post())
        .and(json_body::<models::Badges>())
        .and(with_store(store))
        .and_then(handlers::post_badges)
}

/// POST /library/update
fn post_update(
    store: Arc<dyn LibraryStore>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path!("library" / "update")
        .and(warp::post())
        .and(json_body::<models::UpdateOp>())
        .and(with_store(store))
        .and_then(handlers::post_update)
}

/// POST /library/game
fn post_game(
    store: Arc<dyn LibraryStore>,
    catalog: Arc<dyn Catalog>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path!("library" / "game")
        .and(warp::post())
        .and(json_body::<models::Game>())
        .and(with_store(store))
        .and(with_catalog(catalog))
        .and_then(handlers::post_game)
}

/// POST /library/wishlist
fn post_wishlist(
    store: Arc<dyn LibraryStore>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path!("library" / "wishlist")
        .and(warp::post())
        .and(json_body::<models::WishlistOp>())
        .and(with_store(store))
        .and_then(handlers::post_wishlist)
}

/// POST /library/remove
fn post_remove(
    store: Arc<dyn LibraryStore>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path!("library" / "remove")
        .and(warp::post())
        .and(json_body::<models::RemoveOp>())
        .and(with_store(store))
        .and_then(handlers::post_remove)
}

/// POST /library/unlink
fn post_unlink(
    firestore: Arc<FirestoreApi>,
    store: Arc<dyn LibraryStore>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path!("library" / "unlink")
        .and(warp::post())
        .and(json_body::<models::Unlink>())
        .and(with_firestore(firestore))
        .and(with_store(store))
        .and_then(handlers::post_unlink)
}

/// POST /username/check
fn post_username_check(
    usernames: Arc<dyn UsernameDirectory>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path!("username" / "check")
        .and(warp::post())
        .and(json_body::<models::UsernameCheck>())
        .and(with_usernames(usernames))
        .and_then(handlers::post_username_check)
}

fn json_body<T: serde::de::DeserializeOwned + Send>(
) -> impl Filter<Extract = (T,), Error = warp::Rejection> + Clone {
    warp::body::content_length_limit(16 * 1024).and(warp::body::json())
}
