pub mod duration;
pub mod record;

pub use duration::*;
pub use record::*;
