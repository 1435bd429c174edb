use crate::{
    api::FirestoreApi,
    documents::{Platform, SyncResult},
    http::models,
    library::{LibraryManager, LibrarySync, User},
    traits::{Catalog, LibraryStore, UsernameDirectory},
    util,
    validation::{check_username_available, RetryPolicy},
    Status,
};
use std::{convert::Infallible, sync::Arc};
use tracing::{info, instrument};
use warp::http::StatusCode;

use super::query_logs::*;

#[instrument(level = "trace")]
pub async fn welcome() -> Result<impl warp::Reply, Infallible> {
    info!(
        http_request.request_method = "GET",
        http_request.request_url = "/",
        labels.log_type = "query_logs",
        labels.handler = "welcome",
        "welcome"
    );
    Ok("welcome")
}

#[instrument(level = "trace", skip(keys, firestore, library_sync))]
pub async fn post_sync(
    sync: models::Sync,
    keys: Arc<util::keys::Keys>,
    firestore: Arc<FirestoreApi>,
    library_sync: Arc<LibrarySync>,
) -> Result<Box<dyn warp::Reply>, Infallible> {
    let event = SyncQuery::new(&sync);

    let user = match User::fetch(Arc::clone(&firestore), &sync.user_id).await {
        Ok(user) => user,
        Err(status) => {
            event.log_error(&status);
            return Ok(Box::new(status_code(&status)));
        }
    };

    let results = match sync.platform {
        Some(platform) => match user.adapter(platform, &keys) {
            Ok(adapter) => vec![(
                platform,
                library_sync
                    .sync_full_library(user.uid(), adapter.as_ref())
                    .await,
            )],
            Err(status) => {
                event.log_error(&status);
                return Ok(Box::new(status_code(&status)));
            }
        },
        None => user.sync_accounts(&library_sync, &keys).await,
    };

    let response = models::SyncResponse {
        results: results
            .into_iter()
            .map(|(platform, result)| sync_response(platform, result))
            .collect(),
    };
    event.log(&response);
    Ok(Box::new(warp::reply::json(&response)))
}

fn sync_response(platform: Platform, result: Result<SyncResult, Status>) -> models::PlatformSyncResult {
    match result {
        Ok(result) => models::PlatformSyncResult {
            platform: Some(platform),
            result: Some(result),
            ..Default::default()
        },
        Err(status) => models::PlatformSyncResult {
            platform: Some(platform),
            result: None,
            relink_required: matches!(status, Status::AuthExpired(_)),
            error: Some(status.to_string()),
        },
    }
}

#[instrument(level = "trace", skip(store))]
pub async fn post_combined(
    library: models::Library,
    store: Arc<dyn LibraryStore>,
) -> Result<Box<dyn warp::Reply>, Infallible> {
    let event = LibraryQuery::new("combined", &library.user_id);

    let manager = LibraryManager::new(&library.user_id, store);
    match manager.get_combined_library().await {
        Ok(entries) => {
            event.log();
            Ok(Box::new(warp::reply::json(&entries)))
        }
        Err(status) => {
            event.log_error(&status);
            Ok(Box::new(status_code(&status)))
        }
    }
}

#[instrument(level = "trace", skip(store))]
pub async fn post_can_rate(
    can_rate: models::CanRate,
    store: Arc<dyn LibraryStore>,
) -> Result<Box<dyn warp::Reply>, Infallible> {
    let event = LibraryQuery::new("can_rate", &can_rate.user_id);

    let manager = LibraryManager::new(&can_rate.user_id, store);
    match manager.can_rate(can_rate.catalog_id).await {
        Ok(eligibility) => {
            event.log();
            Ok(Box::new(warp::reply::json(&eligibility)))
        }
        Err(status) => {
            event.log_error(&status);
            Ok(Box::new(status_code(&status)))
        }
    }
}

#[instrument(level = "trace", skip(badges, store), fields(user_id = %badges.user_id))]
pub async fn post_badges(
    badges: models::Badges,
    store: Arc<dyn LibraryStore>,
) -> Result<Box<dyn warp::Reply>, Infallible> {
    let event = LibraryQuery::new("badges", &badges.user_id);

    let manager = LibraryManager::new(&badges.user_id, store);
    match manager.badge_progress(&badges.tiers).await {
        Ok(progress) => {
            event.log();
            Ok(Box::new(warp::reply::json(&progress)))
        }
        Err(status) => {
            event.log_error(&status);
            Ok(Box::new(status_code(&status)))
        }
    }
}

#[instrument(level = "trace", skip(update, store), fields(user_id = %update.user_id))]
pub async fn post_update(
    update: models::UpdateOp,
    store: Arc<dyn LibraryStore>,
) -> Result<Box<dyn warp::Reply>, Infallible> {
    let event = LibraryQuery::new("update", &update.user_id);

    let manager = LibraryManager::new(&update.user_id, store);
    match manager.update_entry(update.catalog_id, update.update).await {
        Ok(entry) => {
            event.log();
            Ok(Box::new(warp::reply::json(&entry)))
        }
        Err(status) => {
            event.log_error(&status);
            Ok(Box::new(status_code(&status)))
        }
    }
}

#[instrument(level = "trace", skip(store, catalog))]
pub async fn post_game(
    game: models::Game,
    store: Arc<dyn LibraryStore>,
    catalog: Arc<dyn Catalog>,
) -> Result<Box<dyn warp::Reply>, Infallible> {
    let event = LibraryQuery::new("game", &game.user_id);

    let manager = LibraryManager::new(&game.user_id, store);
    match manager.game_details(catalog.as_ref(), game.catalog_id).await {
        Ok(details) => {
            event.log();
            Ok(Box::new(warp::reply::json(&details)))
        }
        Err(status) => {
            event.log_error(&status);
            Ok(Box::new(status_code(&status)))
        }
    }
}

#[instrument(level = "trace", skip(store))]
pub async fn post_wishlist(
    wishlist: models::WishlistOp,
    store: Arc<dyn LibraryStore>,
) -> Result<Box<dyn warp::Reply>, Infallible> {
    let event = LibraryQuery::new("wishlist", &wishlist.user_id);

    let manager = LibraryManager::new(&wishlist.user_id, store);
    match manager.add_to_wishlist(wishlist.catalog_id).await {
        Ok(entry) => {
            event.log();
            Ok(Box::new(warp::reply::json(&entry)))
        }
        Err(status) => {
            event.log_error(&status);
            Ok(Box::new(status_code(&status)))
        }
    }
}

#[instrument(level = "trace", skip(store))]
pub async fn post_remove(
    remove: models::RemoveOp,
    store: Arc<dyn LibraryStore>,
) -> Result<Box<dyn warp::Reply>, Infallible> {
    let event = LibraryQuery::new("remove", &remove.user_id);

    let manager = LibraryManager::new(&remove.user_id, store);
    match manager.remove_entry(remove.catalog_id).await {
        Ok(()) => {
            event.log();
            Ok(Box::new(StatusCode::OK))
        }
        Err(status) => {
            event.log_error(&status);
            Ok(Box::new(status_code(&status)))
        }
    }
}

#[instrument(level = "trace", skip(firestore, store))]
pub async fn post_unlink(
    unlink: models::Unlink,
    firestore: Arc<FirestoreApi>,
    store: Arc<dyn LibraryStore>,
) -> Result<impl warp::Reply, Infallible> {
    let event = LibraryQuery::new("unlink", &unlink.user_id);

    match User::fetch(Arc::clone(&firestore), &unlink.user_id).await {
        // Remove platform credentials from UserData.
        Ok(mut user) => match user.remove_platform(unlink.platform).await {
            Ok(()) => {
                // Remove the platform from library entries.
                let manager = LibraryManager::new(&unlink.user_id, store);
                match manager.unlink_platform(unlink.platform).await {
                    Ok(count) => {
                        info!("Unlinked {} from {count} entries", unlink.platform);
                        event.log();
                        Ok(StatusCode::OK)
                    }
                    Err(status) => {
                        event.log_error(&status);
                        Ok(status_code(&status))
                    }
                }
            }
            Err(status) => {
                event.log_error(&status);
                Ok(status_code(&status))
            }
        },
        Err(status) => {
            event.log_error(&status);
            Ok(status_code(&status))
        }
    }
}

#[instrument(level = "trace", skip(usernames))]
pub async fn post_username_check(
    check: models::UsernameCheck,
    usernames: Arc<dyn UsernameDirectory>,
) -> Result<Box<dyn warp::Reply>, Infallible> {
    let event = UsernameQuery::new();

    match check_username_available(usernames.as_ref(), &RetryPolicy::default(), &check.username)
        .await
    {
        Ok(outcome) => {
            event.log(&outcome);
            Ok(Box::new(warp::reply::json(&outcome)))
        }
        Err(status) => {
            event.log_error(&status);
            Ok(Box::new(status_code(&status)))
        }
    }
}

/// Maps errors to the HTTP status returned to callers.
pub fn status_code(status: &Status) -> StatusCode {
    match status {
        Status::Ok => StatusCode::OK,
        Status::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        Status::NotFound(_) => StatusCode::NOT_FOUND,
        Status::AuthExpired(_) => StatusCode::UNAUTHORIZED,
        Status::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        Status::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        Status::Network(_) => StatusCode::BAD_GATEWAY,
        Status::Conflict(_) => StatusCode::CONFLICT,
        Status::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
