//! subdx - subtitle search, ranking and selection for subdivx

pub mod config;
pub mod error;
pub mod filter;
pub mod keys;
pub mod log;
pub mod markup;
pub mod matching;
pub mod metadata;
pub mod paginate;
pub mod pipeline;
pub mod query;
pub mod scoring;
pub mod selection;
pub mod subdivx;

pub use error::{Result, SubdxError};
