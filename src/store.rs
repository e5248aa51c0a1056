pub mod logo;
pub mod media;
