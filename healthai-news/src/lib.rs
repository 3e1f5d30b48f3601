//! GNews upstream client
//!
//! Wraps the GNews v4 search and top-headlines endpoints and converts their
//! wire records into the core `Article` type. The pool builder in the
//! services crate drives this client; nothing here caches or deduplicates.

pub mod client;
pub mod error;
pub mod types;

pub use client::GnewsClient;
pub use error::NewsError;
pub use types::{GnewsArticle, GnewsResponse, GnewsSource};
