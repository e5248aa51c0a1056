pub mod maintainer;
