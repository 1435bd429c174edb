pub mod eligibility;
mod reconciler;
mod resolver;

pub use reconciler::*;
pub use resolver::*;
