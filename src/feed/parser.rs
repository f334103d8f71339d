//! Streaming scan over an Atom search result document.
//!
//! The scan is a single forward pass with no backtracking and no DOM: a
//! cursor walks the token stream, finds each `entry` element, and pulls a
//! fixed set of child fields out of it. Anything the data model does not
//! know about (extension namespaces, extra links, `content`, `updated`) is
//! skipped without validation. Malformed field values never abort the scan;
//! only well-formedness violations in the XML itself do.

use chrono::{DateTime, NaiveDateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;
use url::Url;

use crate::entities::Post;

/// Placeholder substituted for permalinks and author URIs that fail to parse.
/// Documented legacy behavior: the feed source is still reachable through
/// this host even when an individual entry carries a garbage URL.
pub const UNKNOWN_SOURCE_URL: &str = "http://www.twitter.com/";

/// Timestamp layout the endpoint uses for `published` elements, UTC.
const PUBLISHED_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Errors that abort the scan entirely.
///
/// Field-level defects (bad dates, bad URLs, missing child elements) are
/// absorbed per entry and never surface here.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The supplied document is empty. Rejected before any XML work.
    #[error("feed input is empty")]
    EmptyInput,

    /// The XML tokenizer reported a well-formedness violation.
    #[error("malformed feed XML at byte {position}: {message}")]
    Malformed { position: u64, message: String },
}

/// Parses an Atom search result document into posts.
///
/// Returns one [`Post`] per `entry` element, in document order. Entries are
/// populated by the sequential field policy (see [`parse_entry`]): a short
/// or truncated entry yields a partially populated post, not an error.
///
/// # Errors
///
/// - [`FeedError::EmptyInput`] if `bytes` is empty
/// - [`FeedError::Malformed`] if the XML itself is not well-formed
///   (unterminated tags, mismatched end tags, invalid syntax)
///
/// # Security
///
/// XXE is structurally impossible here: `quick-xml` (0.37) never parses
/// `<!ENTITY>` declarations or resolves external entities. An unrecognized
/// entity reference in text is logged and the raw reference kept verbatim.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<Post>, FeedError> {
    if bytes.is_empty() {
        return Err(FeedError::EmptyInput);
    }

    let mut cursor = Cursor::new(bytes);
    let mut posts = Vec::new();

    // Scan-forward loop: find the next `entry` anywhere in the document,
    // parse it, and continue from wherever the cursor now sits.
    while let Some(tag) = cursor.seek(b"entry", 0)? {
        if tag.self_closing {
            // `<entry/>` has no content to populate from.
            posts.push(Post::default());
            continue;
        }
        posts.push(parse_entry(&mut cursor)?);
    }

    Ok(posts)
}

/// Applies the sequential field policy to one open `entry` element.
///
/// Fields are extracted by scanning forward, in this fixed order, for
/// `published`, then `link` (its `href` attribute), then `title`, then
/// optionally `author` with `name` and `uri` inside it. Each step starts
/// from the cursor's current position. If `published`, `link`, or `title`
/// never appears before the entry's content is exhausted, the post is
/// returned as populated so far — a deliberate short-circuit, never an
/// error. A missing `author` block is fine on its own; a missing `name` or
/// `uri` inside one truncates author population the same way.
fn parse_entry(cursor: &mut Cursor<'_>) -> Result<Post, FeedError> {
    let floor = cursor.depth;
    let mut post = Post::default();

    let Some(tag) = cursor.seek(b"published", floor)? else {
        return Ok(post);
    };
    post.published_at = parse_published(&text_of(cursor, &tag)?);

    let Some(tag) = cursor.seek(b"link", floor)? else {
        return Ok(post);
    };
    post.permalink = Some(parse_url(tag.href.as_deref().unwrap_or_default()));

    let Some(tag) = cursor.seek(b"title", floor)? else {
        return Ok(post);
    };
    post.text = Some(text_of(cursor, &tag)?);

    if cursor.seek(b"author", floor)?.is_some() {
        let Some(tag) = cursor.seek(b"name", floor)? else {
            return Ok(post);
        };
        post.author.name = Some(text_of(cursor, &tag)?);

        let Some(tag) = cursor.seek(b"uri", floor)? else {
            return Ok(post);
        };
        post.author.profile_url = Some(parse_url(&text_of(cursor, &tag)?));
    }

    Ok(post)
}

/// A start tag captured from the stream, owning the one attribute the data
/// model reads so the reader's buffer can be reused for the next step.
struct Tag {
    href: Option<String>,
    self_closing: bool,
}

/// Forward-only position in the token stream.
///
/// `depth` counts currently open elements; per-entry field searches pass the
/// depth recorded when the entry was opened as their `floor` so the search
/// stops once the scan pops back out of the entry. The cursor never rewinds.
struct Cursor<'x> {
    reader: Reader<&'x [u8]>,
    buf: Vec<u8>,
    depth: usize,
}

impl<'x> Cursor<'x> {
    fn new(bytes: &'x [u8]) -> Self {
        Self {
            reader: Reader::from_reader(bytes),
            buf: Vec::new(),
            depth: 0,
        }
    }

    /// Advances to the next element with the given local name.
    ///
    /// Returns `None` without a match once the scan leaves the scope that
    /// was `floor` elements deep when the search began, or at end of
    /// document. Namespace prefixes are ignored, matching only local names,
    /// so `<title>` in any namespace qualifies.
    fn seek(&mut self, name: &[u8], floor: usize) -> Result<Option<Tag>, FeedError> {
        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf) {
                Ok(Event::Start(e)) => {
                    self.depth += 1;
                    if e.local_name().as_ref() == name {
                        let tag = capture(&self.reader, &e, false);
                        return Ok(Some(tag));
                    }
                }
                Ok(Event::Empty(e)) => {
                    if e.local_name().as_ref() == name {
                        let tag = capture(&self.reader, &e, true);
                        return Ok(Some(tag));
                    }
                }
                Ok(Event::End(_)) => {
                    self.depth = self.depth.saturating_sub(1);
                    if self.depth < floor {
                        return Ok(None);
                    }
                }
                Ok(Event::Eof) => {
                    if self.depth > 0 {
                        return Err(FeedError::Malformed {
                            position: self.reader.buffer_position(),
                            message: "unexpected end of document inside an open element".into(),
                        });
                    }
                    return Ok(None);
                }
                Ok(_) => {}
                Err(e) => {
                    return Err(FeedError::Malformed {
                        position: self.reader.error_position(),
                        message: e.to_string(),
                    });
                }
            }
        }
    }

    /// Collects the text content of the element the cursor just entered, up
    /// to its matching end tag. Adjacent text and CDATA are coalesced; child
    /// elements are skipped.
    fn element_text(&mut self) -> Result<String, FeedError> {
        let floor = self.depth;
        let mut out = String::new();
        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf) {
                Ok(Event::Start(_)) => self.depth += 1,
                Ok(Event::End(_)) => {
                    self.depth = self.depth.saturating_sub(1);
                    if self.depth < floor {
                        return Ok(out);
                    }
                }
                Ok(Event::Text(t)) => match t.unescape() {
                    Ok(decoded) => out.push_str(&decoded),
                    Err(err) => {
                        // Entity references are never resolved; keep the
                        // raw reference and move on.
                        tracing::warn!(error = %err, "unresolvable entity reference in feed text");
                        out.push_str(&String::from_utf8_lossy(t.as_ref()));
                    }
                },
                Ok(Event::CData(c)) => out.push_str(&String::from_utf8_lossy(c.as_ref())),
                Ok(Event::Eof) => {
                    return Err(FeedError::Malformed {
                        position: self.reader.buffer_position(),
                        message: "unexpected end of document inside an open element".into(),
                    });
                }
                Ok(_) => {}
                Err(e) => {
                    return Err(FeedError::Malformed {
                        position: self.reader.error_position(),
                        message: e.to_string(),
                    });
                }
            }
        }
    }
}

fn capture(reader: &Reader<&[u8]>, e: &BytesStart<'_>, self_closing: bool) -> Tag {
    let mut href = None;
    for attr in e.attributes() {
        let attr = match attr {
            Ok(attr) => attr,
            Err(err) => {
                tracing::warn!(error = %err, "skipping malformed attribute");
                continue;
            }
        };
        if attr.key.as_ref() == b"href" {
            match attr.decode_and_unescape_value(reader.decoder()) {
                Ok(value) => href = Some(value.into_owned()),
                Err(err) => {
                    tracing::warn!(error = %err, "could not decode href attribute");
                }
            }
        }
    }
    Tag { href, self_closing }
}

fn text_of(cursor: &mut Cursor<'_>, tag: &Tag) -> Result<String, FeedError> {
    if tag.self_closing {
        Ok(String::new())
    } else {
        cursor.element_text()
    }
}

/// Parses a `published` value in the endpoint's exact format, UTC.
/// A mismatch is absorbed: the post carries no timestamp and the scan
/// continues.
fn parse_published(text: &str) -> Option<DateTime<Utc>> {
    let trimmed = text.trim();
    match NaiveDateTime::parse_from_str(trimmed, PUBLISHED_FORMAT) {
        Ok(naive) => Some(naive.and_utc()),
        Err(err) => {
            tracing::warn!(value = trimmed, error = %err, "unparsable published timestamp");
            None
        }
    }
}

/// Parses a URL, substituting [`UNKNOWN_SOURCE_URL`] when the value is
/// malformed so a single bad link never fails the whole scan.
fn parse_url(text: &str) -> Url {
    let trimmed = text.trim();
    Url::parse(trimmed).unwrap_or_else(|err| {
        tracing::warn!(value = trimmed, error = %err, "unparsable URL, substituting placeholder");
        Url::parse(UNKNOWN_SOURCE_URL).expect("placeholder URL is valid")
    })
}
