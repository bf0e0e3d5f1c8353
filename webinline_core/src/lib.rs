pub mod asset;
pub mod build;
pub mod compose;
pub mod error;
pub mod minify;
pub mod report;
