use std::str::FromStr;

use bytes::Bytes;
use mime::Mime;

use crate::path::ResourcePath;

/// Linked-data serialization of a blob body, classified from its media type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RdfFormat {
    Turtle,
    N3,
    NTriples,
    NQuads,
    JsonLd,
    RdfXml,
    /// Not a linked-data document
    NotRdf,
}

impl RdfFormat {
    pub fn from_mime(mime: &Mime) -> Self {
        match mime.essence_str() {
            "text/turtle" | "application/x-turtle" => RdfFormat::Turtle,
            "text/n3" | "text/rdf+n3" => RdfFormat::N3,
            "application/n-triples" => RdfFormat::NTriples,
            "application/n-quads" => RdfFormat::NQuads,
            "application/ld+json" => RdfFormat::JsonLd,
            "application/rdf+xml" => RdfFormat::RdfXml,
            _ => RdfFormat::NotRdf,
        }
    }

    pub fn is_rdf(&self) -> bool {
        !matches!(self, RdfFormat::NotRdf)
    }
}

/// The stored value of a blob: body plus provenance metadata.
///
/// Values are immutable; a write replaces the whole representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Representation {
    content_type: Mime,
    body: Bytes,
    etag: String,
    format: RdfFormat,
}

impl Representation {
    /// Build a representation, falling back to `application/octet-stream`
    ///  when the content type does not parse
    pub fn new(content_type: &str, body: impl Into<Bytes>) -> Self {
        let content_type =
            Mime::from_str(content_type).unwrap_or(mime::APPLICATION_OCTET_STREAM);
        Self::with_mime(content_type, body.into())
    }

    /// Build a representation for a write at `path`.
    ///
    /// A declared type wins unless it is empty, unparseable or the generic
    ///  `application/octet-stream`; then the type is guessed from the path.
    pub fn for_write(path: &ResourcePath, content_type: &str, body: impl Into<Bytes>) -> Self {
        match Mime::from_str(content_type.trim()) {
            Ok(mime) if mime != mime::APPLICATION_OCTET_STREAM => {
                Self::with_mime(mime, body.into())
            }
            _ => Self::for_path(path, body),
        }
    }

    /// Build a representation whose content type is guessed from the path.
    ///
    /// Authorization documents carry no extension a registry knows about and
    ///  are treated as Turtle.
    pub fn for_path(path: &ResourcePath, body: impl Into<Bytes>) -> Self {
        let content_type = if path.is_acl_document() {
            mime_guess::from_ext("ttl").first_or_octet_stream()
        } else {
            path.name()
                .and_then(|name| mime_guess::from_path(name).first())
                .unwrap_or(mime::APPLICATION_OCTET_STREAM)
        };
        Self::with_mime(content_type, body.into())
    }

    fn with_mime(content_type: Mime, body: Bytes) -> Self {
        let etag = format!("\"{}\"", blake3::hash(&body).to_hex());
        let format = RdfFormat::from_mime(&content_type);
        Self {
            content_type,
            body,
            etag,
            format,
        }
    }

    pub fn content_type(&self) -> &Mime {
        &self.content_type
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Content-derived entity tag, quoted as it would appear on the wire
    pub fn etag(&self) -> &str {
        &self.etag
    }

    pub fn format(&self) -> RdfFormat {
        self.format
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}
