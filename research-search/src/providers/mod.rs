//! Provider implementations.
//!
//! Each module provides a struct implementing [`crate::provider::SourceProvider`].

pub mod custom;
pub mod news;
pub mod web;

pub use custom::CustomUrlProvider;
pub use news::NewsSearchProvider;
pub use web::WebSearchProvider;
