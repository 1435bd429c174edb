use serde::de::DeserializeOwned;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::Status;

/// Sends the request and parses a JSON response.
///
/// Non-success HTTP statuses are mapped through `Status::from_http` so auth,
/// rate limit and server failures surface as distinct errors.
pub async fn get_json<R: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<R, Status> {
    let resp = request.send().await?;

    // Query strings carry API keys and must not leak into error messages.
    let url = format!(
        "{}{}",
        resp.url().host_str().unwrap_or_default(),
        resp.url().path()
    );
    if !resp.status().is_success() {
        return Err(Status::from_http(resp.status(), &url));
    }

    let text = resp.text().await?;
    match serde_json::from_str::<R>(&text) {
        Ok(resp) => Ok(resp),
        Err(e) => Err(Status::internal(format!(
            "Failed to parse response: {e}\nurl: {url}"
        ))),
    }
}

/// Current time in unix seconds.
pub fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
