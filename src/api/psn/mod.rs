mod psn;

pub use psn::PsnApi;
