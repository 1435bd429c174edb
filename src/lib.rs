pub mod api;
pub mod documents;
pub mod games;
pub mod http;
pub mod library;
pub mod logging;
pub mod traits;
pub mod util;
pub mod validation;

mod status;
pub use status::Status;

mod tracing;
pub use crate::tracing::Tracing;
