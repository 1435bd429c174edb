mod steam;

pub use steam::SteamApi;
