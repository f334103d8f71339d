use chrono::{DateTime, Utc};
use std::fmt;
use url::Url;

use crate::entities::HasText;

/// One parsed feed entry.
///
/// Every field is optional from the wire's perspective: a short or
/// malformed entry produces a partially populated post, never an error.
/// Posts are immutable value objects once constructed; they are owned by
/// the [`Query`](crate::entities::Query) that fetched them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Post {
    /// When the entry was published, UTC. `None` when the feed carried no
    /// parseable timestamp.
    pub published_at: Option<DateTime<Utc>>,
    /// Permalink of the entry. A malformed href is replaced by
    /// [`UNKNOWN_SOURCE_URL`](crate::feed::UNKNOWN_SOURCE_URL) during
    /// parsing; a missing `link` element leaves this unset.
    pub permalink: Option<Url>,
    /// Title/body text, XML entities already decoded.
    pub text: Option<String>,
    /// Who wrote the entry.
    pub author: Author,
}

/// Author of a [`Post`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Author {
    pub name: Option<String>,
    pub profile_url: Option<Url>,
}

impl HasText for Post {
    fn text(&self) -> String {
        self.text.clone().unwrap_or_default()
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let when = self
            .published_at
            .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "unknown time".to_string());
        let who = self.author.name.as_deref().unwrap_or("unknown author");
        let what = self.text.as_deref().unwrap_or("");
        match &self.permalink {
            Some(url) => write!(f, "{when}  {who}: {what}  ({url})"),
            None => write!(f, "{when}  {who}: {what}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn display_handles_missing_fields() {
        let post = Post::default();
        assert_eq!(post.to_string(), "unknown time  unknown author: ");
    }

    #[test]
    fn display_includes_permalink_when_set() {
        let post = Post {
            published_at: DateTime::from_timestamp(1_299_304_262, 0),
            permalink: Some(Url::parse("http://example.com/statuses/1").unwrap()),
            text: Some("hello".to_string()),
            author: Author {
                name: Some("alice".to_string()),
                profile_url: None,
            },
        };
        assert_eq!(
            post.to_string(),
            "2011-03-05 05:51:02  alice: hello  (http://example.com/statuses/1)"
        );
    }

    #[test]
    fn has_text_yields_body_or_empty() {
        let mut post = Post::default();
        assert_eq!(HasText::text(&post), "");
        post.text = Some("something".to_string());
        assert_eq!(HasText::text(&post), "something");
    }
}
