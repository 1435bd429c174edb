use std::{sync::Arc, time::Duration};

use lazy_static::lazy_static;
use phf::phf_set;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{traits::UsernameDirectory, Status};

use super::{check_with_retry, Debouncer, RetryError, RetryPolicy};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum UsernameAvailability {
    Available,
    Taken,
    InvalidFormat(String),

    /// The registry could not be reached after all retries. Never to be
    /// treated as available.
    CouldNotVerify,
}

pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 20;

static RESERVED: phf::Set<&'static str> = phf_set! {
    "admin",
    "administrator",
    "api",
    "help",
    "mod",
    "moderator",
    "null",
    "official",
    "questlog",
    "root",
    "staff",
    "support",
    "system",
    "undefined",
    "www",
};

/// Checks a username against the format rules without touching the
/// registry. Returns the reason on failure.
pub fn validate_format(candidate: &str) -> Result<(), String> {
    lazy_static! {
        static ref RE: Regex = Regex::new(r"^[a-z0-9_]+$").unwrap();
    }

    let len = candidate.chars().count();
    if !(MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&len) {
        return Err(format!(
            "Username must be between {MIN_USERNAME_LEN} and {MAX_USERNAME_LEN} characters."
        ));
    }
    if !RE.is_match(candidate) {
        return Err(
            "Username may only contain lowercase letters, digits and underscores.".to_owned(),
        );
    }
    if !candidate.starts_with(|c: char| c.is_ascii_lowercase()) {
        return Err("Username must start with a letter.".to_owned());
    }
    if RESERVED.contains(candidate) {
        return Err(format!("Username '{candidate}' is reserved."));
    }
    Ok(())
}

/// Normalizes user input before validation.
pub fn normalize_username(candidate: &str) -> String {
    candidate.trim().to_lowercase()
}

/// Checks whether `candidate` can be claimed.
///
/// Format problems and taken names terminate immediately. Transient registry
/// errors are retried under `policy`; when retries run out the outcome is
/// `CouldNotVerify`. Other registry errors are returned as is.
#[instrument(level = "trace", skip(directory, policy))]
pub async fn check_username_available(
    directory: &dyn UsernameDirectory,
    policy: &RetryPolicy,
    candidate: &str,
) -> Result<UsernameAvailability, Status> {
    let candidate = normalize_username(candidate);
    if let Err(reason) = validate_format(&candidate) {
        return Ok(UsernameAvailability::InvalidFormat(reason));
    }

    match check_with_retry(policy, || directory.is_taken(&candidate)).await {
        Ok(true) => Ok(UsernameAvailability::Taken),
        Ok(false) => Ok(UsernameAvailability::Available),
        Err(RetryError::Exhausted { attempts, last }) => {
            info!("Could not verify username '{candidate}' after {attempts} attempts: {last}");
            Ok(UsernameAvailability::CouldNotVerify)
        }
        Err(RetryError::Failed(status)) => Err(status),
    }
}

/// Username check for callers driven by live input, e.g. a text field that
/// probes as the user types.
pub struct UsernameChecker {
    directory: Arc<dyn UsernameDirectory>,
    policy: RetryPolicy,
    debouncer: Debouncer,
}

impl UsernameChecker {
    pub fn new(directory: Arc<dyn UsernameDirectory>, policy: RetryPolicy, quiet: Duration) -> Self {
        UsernameChecker {
            directory,
            policy,
            debouncer: Debouncer::new(quiet),
        }
    }

    /// Returns `None` if newer input superseded this call.
    pub async fn check(&self, candidate: &str) -> Option<Result<UsernameAvailability, Status>> {
        self.debouncer
            .run(|| check_username_available(self.directory.as_ref(), &self.policy, candidate))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::MemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Registry failing with `error` on the first `failures` probes.
    struct FlakyDirectory {
        failures: u32,
        error: Status,
        calls: AtomicU32,
    }

    #[async_trait]
    impl UsernameDirectory for FlakyDirectory {
        async fn is_taken(&self, username: &str) -> Result<bool, Status> {
            match self.calls.fetch_add(1, Ordering::SeqCst) < self.failures {
                true => Err(self.error.clone()),
                false => Ok(username == "taken_name"),
            }
        }
    }

    fn flaky(failures: u32, error: Status) -> FlakyDirectory {
        FlakyDirectory {
            failures,
            error,
            calls: AtomicU32::new(0),
        }
    }

    #[test]
    fn format_rules() {
        assert_eq!(validate_format("alice_99"), Ok(()));
        assert_eq!(validate_format("abc"), Ok(()));
        assert_eq!(validate_format("a2345678901234567890"), Ok(()));

        assert!(validate_format("ab").is_err());
        assert!(validate_format("a23456789012345678901").is_err());
        assert!(validate_format("9lives").is_err());
        assert!(validate_format("_alice").is_err());
        assert!(validate_format("Alice").is_err());
        assert!(validate_format("ali ce").is_err());
        assert!(validate_format("alicé").is_err());
        assert!(validate_format("admin").is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn available_and_taken() {
        let store = MemoryStore::new();
        store.claim_username("bob").await;
        let policy = RetryPolicy::default();

        assert_eq!(
            check_username_available(&store, &policy, "alice").await,
            Ok(UsernameAvailability::Available)
        );
        assert_eq!(
            check_username_available(&store, &policy, " Bob ").await,
            Ok(UsernameAvailability::Taken)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_format_never_probes() {
        let directory = flaky(0, Status::Ok);

        let result =
            check_username_available(&directory, &RetryPolicy::default(), "x!").await;

        assert!(matches!(
            result,
            Ok(UsernameAvailability::InvalidFormat(_))
        ));
        assert_eq!(directory.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn three_transient_errors_could_not_verify() {
        let directory = flaky(u32::MAX, Status::network("unreachable"));

        let result =
            check_username_available(&directory, &RetryPolicy::default(), "alice").await;

        assert_eq!(result, Ok(UsernameAvailability::CouldNotVerify));
        assert_eq!(directory.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_from_transient_error() {
        let directory = flaky(2, Status::rate_limited("429"));

        let result =
            check_username_available(&directory, &RetryPolicy::default(), "taken_name").await;

        assert_eq!(result, Ok(UsernameAvailability::Taken));
        assert_eq!(directory.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn non_transient_error_propagates() {
        let directory = flaky(1, Status::internal("corrupt"));

        let result =
            check_username_available(&directory, &RetryPolicy::default(), "alice").await;

        assert_eq!(result, Err(Status::internal("corrupt")));
        assert_eq!(directory.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn checker_drops_superseded_input() {
        let store = Arc::new(MemoryStore::new());
        let checker = Arc::new(UsernameChecker::new(
            store,
            RetryPolicy::default(),
            Duration::from_millis(300),
        ));

        let first = {
            let checker = Arc::clone(&checker);
            tokio::spawn(async move { checker.check("ali").await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        let second = checker.check("alice").await;

        assert_eq!(first.await.unwrap(), None);
        assert_eq!(second, Some(Ok(UsernameAvailability::Available)));
    }
}
