pub mod compose;
pub mod fingerprint;
pub mod raster;
pub(crate) mod svg;
