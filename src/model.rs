pub mod asset;
pub mod dsl;
pub mod logo;
pub mod patch;
