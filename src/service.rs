pub mod assets;
pub mod export;
pub mod layers;
pub mod library;
