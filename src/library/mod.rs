pub mod firestore;
mod manager;
mod memory;
mod sync;
mod user;

pub use manager::LibraryManager;
pub use memory::MemoryStore;
pub use sync::LibrarySync;
pub use user::User;

/// Write attempts per entry before a conflict is reported as a failure.
pub(crate) const MAX_WRITE_ATTEMPTS: usize = 5;
