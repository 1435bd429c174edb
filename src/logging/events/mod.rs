mod platform_events;
mod resolve_events;
mod sync_events;

pub use platform_events::*;
pub use resolve_events::*;
pub use sync_events::*;
