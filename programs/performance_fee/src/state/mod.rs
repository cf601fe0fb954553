pub mod fee_record;
pub mod hooks;

pub use fee_record::*;
pub use hooks::*;
