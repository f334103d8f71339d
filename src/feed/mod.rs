//! Fetching and parsing of feed-style search results.
//!
//! Two components in dependency order:
//!
//! - [`parser`] - single-pass streaming scan turning Atom XML into posts
//! - [`client`] - query URL construction and HTTP fetch feeding the parser
//!
//! Control flow: caller → [`SearchClient::search`] → HTTP GET → body bytes →
//! [`parse_feed`] → ordered `Vec<Post>` → caller. No shared mutable state;
//! each search owns its own response and reader.

mod client;
mod parser;

pub use client::{SearchClient, SearchError, DEFAULT_ENDPOINT, RESULTS_PER_PAGE};
pub use parser::{parse_feed, FeedError, UNKNOWN_SOURCE_URL};
