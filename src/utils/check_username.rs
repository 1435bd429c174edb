use clap::Parser;
use questlog_backend::{
    api::FirestoreApi,
    library::firestore::FirestoreStore,
    validation::{RetryPolicy, UsernameChecker},
    Status, Tracing,
};
use std::{sync::Arc, time::Duration};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

/// Checks username availability for each line read from stdin, as if typed
/// into a sign-up form. Lines arriving within the quiet period supersede the
/// previous one.
#[derive(Parser)]
struct Opts {
    #[clap(long, default_value = "questlog")]
    project_id: String,

    /// Quiet period before a probe is issued.
    #[clap(long, default_value = "300")]
    debounce_ms: u64,

    /// Base delay of the linear retry backoff.
    #[clap(long, default_value = "500")]
    backoff_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Status> {
    Tracing::setup("utils/check_username", false)?;

    let opts: Opts = Opts::parse();

    let firestore = Arc::new(FirestoreApi::connect(&opts.project_id).await?);
    let checker = Arc::new(UsernameChecker::new(
        Arc::new(FirestoreStore::new(firestore)),
        RetryPolicy {
            base_delay: Duration::from_millis(opts.backoff_ms),
            ..Default::default()
        },
        Duration::from_millis(opts.debounce_ms),
    ));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut checks = vec![];
    while let Some(line) = lines.next_line().await? {
        let checker = Arc::clone(&checker);
        checks.push(tokio::spawn(async move {
            match checker.check(&line).await {
                Some(Ok(outcome)) => info!("'{line}': {outcome:?}"),
                Some(Err(status)) => error!("'{line}': {status}"),
                None => info!("'{line}': superseded"),
            }
        }));
    }

    for check in checks {
        if let Err(e) = check.await {
            error!("{e}");
        }
    }
    Ok(())
}
