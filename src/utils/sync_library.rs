use clap::Parser;
use questlog_backend::{
    api::FirestoreApi,
    documents::Platform,
    games::{ExternalGamesResolver, PlatformResolver},
    library::{firestore::FirestoreStore, LibrarySync, User},
    util, Status, Tracing,
};
use std::{sync::Arc, time::Duration};
use tracing::{error, info, trace_span, Instrument};

/// Syncs a user's library with their linked platforms and prints the sync
/// results.
#[derive(Parser)]
struct Opts {
    /// User id owning the game library.
    #[clap(short, long)]
    user: String,

    /// Sync only this platform (steam, playstation, riot). Syncs every linked
    /// platform if not set.
    #[clap(long)]
    platform: Option<Platform>,

    /// JSON file that contains application keys for the service.
    #[clap(long, default_value = "keys.json")]
    key_store: String,

    #[clap(long, default_value = "questlog")]
    project_id: String,

    #[clap(long, default_value = "126459")]
    valorant_catalog_id: u64,

    #[clap(long, default_value = "60")]
    fetch_timeout_secs: u64,

    #[clap(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Status> {
    let opts: Opts = Opts::parse();
    Tracing::setup("utils/sync_library", opts.verbose)?;

    let keys = util::keys::Keys::from_file(&opts.key_store)?;

    let firestore = Arc::new(FirestoreApi::connect(&opts.project_id).await?);
    let library_sync = LibrarySync::new(
        Arc::new(FirestoreStore::new(Arc::clone(&firestore))),
        Arc::new(PlatformResolver::new(
            Arc::new(ExternalGamesResolver::new(Arc::clone(&firestore))),
            opts.valorant_catalog_id,
        )),
        Duration::from_secs(opts.fetch_timeout_secs),
    );

    let user = User::fetch(Arc::clone(&firestore), &opts.user).await?;
    let results = async {
        match opts.platform {
            Some(platform) => {
                let adapter = user.adapter(platform, &keys)?;
                Ok::<_, Status>(vec![(
                    platform,
                    library_sync
                        .sync_full_library(user.uid(), adapter.as_ref())
                        .await,
                )])
            }
            None => Ok(user.sync_accounts(&library_sync, &keys).await),
        }
    }
    .instrument(trace_span!("library sync"))
    .await?;

    for (platform, result) in results {
        match result {
            Ok(result) => info!(
                "{platform}: {} imported, {} updated, {} unchanged, {} failed",
                result.imported, result.updated, result.unchanged, result.failed
            ),
            Err(status) => error!("{platform}: {status}"),
        }
    }
    Ok(())
}
