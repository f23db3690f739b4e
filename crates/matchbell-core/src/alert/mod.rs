mod engine;
mod timing;

pub use engine::{AlertEngine, Competition, HostServices};
pub use timing::{plan, AlertTiming};
