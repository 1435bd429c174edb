mod riot;

pub use riot::{RiotApi, VALORANT_GAME_ID};
