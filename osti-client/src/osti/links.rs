//! Citation URL extraction from record link relations
//!
//! Every OSTI record carries a `links` array of `{"rel": ..., "href": ...}`
//! objects. The entry tagged `rel == "citation"` points at the record's
//! landing page on OSTI.gov.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{OstiError, Result};

/// Relation type of the landing-page link
pub const CITATION_REL: &str = "citation";

/// A tagged URL attached to a record
///
/// Both fields are optional so malformed input survives deserialization;
/// the extractors report missing fields as [`OstiError::FieldMissing`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRelation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl LinkRelation {
    pub fn new<R: Into<String>, H: Into<String>>(rel: R, href: H) -> Self {
        Self {
            rel: Some(rel.into()),
            href: Some(href.into()),
        }
    }

    fn require_rel(&self) -> Result<&str> {
        self.rel
            .as_deref()
            .ok_or_else(|| OstiError::field_missing("rel"))
    }

    fn require_href(&self) -> Result<String> {
        self.href
            .clone()
            .ok_or_else(|| OstiError::field_missing("href"))
    }

    pub fn is_citation(&self) -> bool {
        self.rel.as_deref() == Some(CITATION_REL)
    }
}

/// Return the citation URL if the FIRST link relation is a citation
///
/// Only the first entry is inspected: when it is not tagged `"citation"`
/// the result is `None` even if a later entry is. Use
/// [`find_citation_url`] to scan the whole list.
///
/// # Errors
///
/// * `OstiError::FieldMissing` - the first entry has no `rel`, or it is a
///   citation without an `href`
///
/// # Example
///
/// ```
/// use osti_client::osti::{extract_citation_url, LinkRelation};
///
/// let links = vec![
///     LinkRelation::new("citation", "https://www.osti.gov/biblio/1234"),
///     LinkRelation::new("fulltext", "https://www.osti.gov/servlets/purl/1234"),
/// ];
/// assert_eq!(
///     extract_citation_url(&links).unwrap().as_deref(),
///     Some("https://www.osti.gov/biblio/1234")
/// );
/// ```
pub fn extract_citation_url(relations: &[LinkRelation]) -> Result<Option<String>> {
    let Some(first) = relations.first() else {
        return Ok(None);
    };

    if first.require_rel()? == CITATION_REL {
        first.require_href().map(Some)
    } else {
        Ok(None)
    }
}

/// Return the `href` of the first citation entry anywhere in the list
///
/// Entries before the match must carry a `rel`; entries after it are not
/// inspected.
///
/// # Example
///
/// ```
/// use osti_client::osti::{find_citation_url, LinkRelation};
///
/// let links = vec![
///     LinkRelation::new("fulltext", "https://www.osti.gov/servlets/purl/1234"),
///     LinkRelation::new("citation", "https://www.osti.gov/biblio/1234"),
/// ];
/// assert_eq!(
///     find_citation_url(&links).unwrap().as_deref(),
///     Some("https://www.osti.gov/biblio/1234")
/// );
/// ```
pub fn find_citation_url(relations: &[LinkRelation]) -> Result<Option<String>> {
    for relation in relations {
        if relation.require_rel()? == CITATION_REL {
            return relation.require_href().map(Some);
        }
    }
    Ok(None)
}

/// Read the `links` array of a single record
///
/// # Errors
///
/// * `OstiError::FieldMissing` - the record has no `links` (or it is null)
/// * `OstiError::JsonError` - `links` is not an array of link objects
pub fn record_links(record: &Value) -> Result<Vec<LinkRelation>> {
    match record.get("links") {
        None | Some(Value::Null) => Err(OstiError::field_missing("links")),
        Some(links) => Ok(Vec::<LinkRelation>::deserialize(links)?),
    }
}

/// Citation URL of a record, scanning all of its link relations
pub fn record_citation_url(record: &Value) -> Result<Option<String>> {
    find_citation_url(&record_links(record)?)
}
