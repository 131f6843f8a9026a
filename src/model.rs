pub mod plan;
pub mod stop;

pub use plan::*;
pub use stop::*;
