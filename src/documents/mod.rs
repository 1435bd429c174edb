mod badges;
mod canonical_game;
mod external_game;
mod library_entry;
mod platform;
mod platform_record;
mod sync_result;
mod user_data;

pub use badges::*;
pub use canonical_game::*;
pub use external_game::*;
pub use library_entry::*;
pub use platform::*;
pub use platform_record::*;
pub use sync_result::*;
pub use user_data::*;
