//! Entity types shared between the search core and its callers.
//!
//! Abilities are plain traits wired to concrete implementors at
//! construction time: [`HasText`] for anything a UI can render as a line of
//! text, [`Reloadable`] for anything a refresh action can re-fetch.

mod post;
mod query;

use async_trait::async_trait;

pub use post::{Author, Post};
pub use query::Query;

/// Entities that carry human-readable text content.
pub trait HasText {
    fn text(&self) -> String;
}

/// Entities whose contents can be re-fetched from their backing source.
#[async_trait]
pub trait Reloadable {
    /// Refreshes the entity in place.
    async fn reload(&mut self) -> anyhow::Result<()>;
}
