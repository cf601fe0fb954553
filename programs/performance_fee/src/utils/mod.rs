pub mod pda;
pub mod math;

pub use pda::*;
pub use math::*;
