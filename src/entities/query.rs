use async_trait::async_trait;

use crate::entities::{HasText, Post, Reloadable};
use crate::feed::SearchClient;

/// A search keyword together with the posts last fetched for it.
///
/// The result list is replaced wholesale on every successful reload — never
/// cleared first, never merged or appended — so readers holding the query
/// across a reload only ever see the previous complete result set or the
/// new one. A failed reload leaves the previous results untouched.
#[derive(Debug, Clone)]
pub struct Query {
    keyword: String,
    posts: Vec<Post>,
    client: SearchClient,
}

impl Query {
    /// A query with an empty result list, bound to the client that will
    /// serve its reloads.
    pub fn new(keyword: impl Into<String>, client: SearchClient) -> Self {
        Self {
            keyword: keyword.into(),
            posts: Vec::new(),
            client,
        }
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// The posts from the most recent successful reload, in document order.
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }
}

#[async_trait]
impl Reloadable for Query {
    /// Runs the search and swaps in the new result list on success.
    async fn reload(&mut self) -> anyhow::Result<()> {
        let posts = self.client.search(&self.keyword).await?;
        self.posts = posts;
        Ok(())
    }
}

impl HasText for Query {
    fn text(&self) -> String {
        format!("Query term: {}", self.keyword)
    }
}
