pub mod auth;
pub mod config;
pub mod connector;
pub mod error;
pub mod models;
pub mod normalize;

pub use connector::{EbayConnector, ListingSource, MAX_SEARCH_LIMIT};
pub use error::{Error, Result};
