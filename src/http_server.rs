use clap::Parser;
use questlog_backend::{
    api::FirestoreApi,
    games::{ExternalGamesResolver, PlatformResolver},
    http,
    library::{firestore::FirestoreStore, LibrarySync},
    util, Status, Tracing,
};
use std::{env, sync::Arc, time::Duration};
use tracing::info;
use warp::{self, Filter};

#[derive(Parser)]
struct Opts {
    /// Port number to use for listening to HTTP requests.
    #[clap(short, long, default_value = "8080")]
    port: u16,

    /// JSON file that contains application keys for the service.
    #[clap(long, default_value = "keys.json")]
    key_store: String,

    /// GCP project hosting the Firestore database.
    #[clap(long, default_value = "questlog")]
    project_id: String,

    /// Catalog id that VALORANT activity is recorded under.
    #[clap(long, default_value = "126459")]
    valorant_catalog_id: u64,

    /// Deadline for fetching a platform library.
    #[clap(long, default_value = "60")]
    fetch_timeout_secs: u64,

    #[clap(long)]
    prod_tracing: bool,
}

#[tokio::main]
async fn main() -> Result<(), Status> {
    let opts: Opts = Opts::parse();

    match opts.prod_tracing {
        false => Tracing::setup("questlog-http", false)?,
        true => Tracing::setup_prod(&opts.project_id)?,
    }

    // Let ENV VAR override flag.
    let port: u16 = match env::var("PORT") {
        Ok(port) => match port.parse::<u16>() {
            Ok(port) => port,
            Err(_) => opts.port,
        },
        Err(_) => opts.port,
    };

    let keys = util::keys::Keys::from_file(&opts.key_store)?;
    let firestore = Arc::new(FirestoreApi::connect(&opts.project_id).await?);
    let store = Arc::new(FirestoreStore::new(Arc::clone(&firestore)));
    let resolver = Arc::new(PlatformResolver::new(
        Arc::new(ExternalGamesResolver::new(Arc::clone(&firestore))),
        opts.valorant_catalog_id,
    ));
    let library_sync = Arc::new(LibrarySync::new(
        store.clone(),
        resolver,
        Duration::from_secs(opts.fetch_timeout_secs),
    ));

    info!("questlog http server started on port {port}");

    warp::serve(
        http::routes::routes(
            Arc::new(keys),
            firestore,
            store.clone(),
            store.clone(),
            library_sync,
            store,
        )
        .with(
            warp::cors()
                .allow_methods(vec!["GET", "POST"])
                .allow_headers(vec!["Content-Type", "Authorization"])
                .allow_any_origin(),
        ),
    )
    .run(([0, 0, 0, 0], port))
    .await;

    Ok(())
}
