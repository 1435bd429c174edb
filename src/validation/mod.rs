mod debounce;
mod retry;
mod username;

pub use debounce::Debouncer;
pub use retry::*;
pub use username::*;
