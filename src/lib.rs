//! Keyword search over a feed-style Atom endpoint.
//!
//! `chirp` builds a query URL from a keyword, fetches the Atom document the
//! endpoint returns, and converts it into an ordered list of typed
//! [`Post`] records with a single-pass, error-tolerant streaming scan.
//!
//! ```ignore
//! use chirp::{Query, Reloadable, SearchClient};
//!
//! let client = SearchClient::new();
//! let posts = client.search("#netbeans").await?;
//!
//! // Or hold results in a reloadable query:
//! let mut query = Query::new("#netbeans", client);
//! query.reload().await?;
//! println!("{} posts", query.posts().len());
//! ```

pub mod config;
pub mod entities;
pub mod feed;

pub use config::{Config, ConfigError};
pub use entities::{Author, HasText, Post, Query, Reloadable};
pub use feed::{parse_feed, FeedError, SearchClient, SearchError};
