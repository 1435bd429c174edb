mod common;
mod firestore;
mod psn;
mod riot;
mod steam;
mod util;

pub use common::*;
pub use firestore::FirestoreApi;
pub use psn::PsnApi;
pub use riot::*;
pub use steam::SteamApi;
pub use util::now;
