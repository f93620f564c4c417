//! # Resource paths
//!
//! A [`ResourcePath`] addresses a node in the store tree. It is an ordered,
//! non-empty list of segments whose first entry is always the root marker,
//! plus a flag saying whether the node is a container or a blob.
//!
//! The container flag is carried alongside the segments instead of being
//! encoded as a trailing separator, so `/foo` (a blob) and `/foo/` (a
//! container) never collide.
//!
//! Segments are opaque: `.`, `..`, whitespace and control characters are all
//! legal and are never normalised. The store is not a filesystem.

use std::fmt;
use std::str::FromStr;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use url::Url;

use crate::vocab::{ACL_CONTAINER_DOCUMENT, ACL_SUFFIX};

/// Separator used when a path is rendered as a string
pub const SEPARATOR: char = '/';
/// The first segment of every path
pub const ROOT_SEGMENT: &str = "";

/// Escaped inside a url path segment. Tab and newline are included because
///  the url parser strips them instead of encoding them.
const URL_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum PathError {
    /// A segment contains the separator
    #[error("invalid path segment: {0:?}")]
    InvalidSegment(String),
    /// Attempted to climb above the root
    #[error("the root path has no parent")]
    NoParent,
    /// String form did not start with the separator
    #[error("path is not absolute: {0:?}")]
    NotAbsolute(String),
    /// Segment list did not start with the root marker
    #[error("path does not start at the root")]
    MissingRoot,
    /// Suffixes can only be appended to named (non-root) paths
    #[error("cannot append a suffix to the root path")]
    RootHasNoName,
    /// The base URL cannot carry path segments
    #[error("cannot map path onto base url: {0}")]
    UnsupportedBase(Url),
    /// `.` and `..` are legal store segments but have no url form
    #[error("segment {0:?} has no url form")]
    NoUrlForm(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourcePath {
    segments: Vec<String>,
    container: bool,
}

fn validate_segment(segment: &str) -> Result<(), PathError> {
    if segment.contains(SEPARATOR) {
        return Err(PathError::InvalidSegment(segment.to_string()));
    }
    Ok(())
}

impl ResourcePath {
    /// Build a path from its full segment list, root marker included.
    ///
    /// The root is always a container, whatever `container` says.
    pub fn new(segments: Vec<String>, container: bool) -> Result<Self, PathError> {
        match segments.first() {
            Some(first) if first == ROOT_SEGMENT => {}
            _ => return Err(PathError::MissingRoot),
        }
        for segment in segments.iter().skip(1) {
            validate_segment(segment)?;
        }
        let container = container || segments.len() == 1;
        Ok(Self {
            segments,
            container,
        })
    }

    /// The root container
    pub fn root() -> Self {
        Self {
            segments: vec![ROOT_SEGMENT.to_string()],
            container: true,
        }
    }

    /// Build a container path from the segments below the root
    pub fn container<I, S>(segments: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::below_root(segments, true)
    }

    /// Build a blob path from the segments below the root
    pub fn blob<I, S>(segments: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::below_root(segments, false)
    }

    fn below_root<I, S>(segments: I, container: bool) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut all = vec![ROOT_SEGMENT.to_string()];
        all.extend(segments.into_iter().map(Into::into));
        Self::new(all, container)
    }

    /// Parse the separator-joined form. A trailing separator marks a container.
    pub fn parse(s: &str) -> Result<Self, PathError> {
        let Some(rest) = s.strip_prefix(SEPARATOR) else {
            return Err(PathError::NotAbsolute(s.to_string()));
        };
        if rest.is_empty() {
            return Ok(Self::root());
        }
        let (rest, container) = match rest.strip_suffix(SEPARATOR) {
            Some(stripped) => (stripped, true),
            None => (rest, false),
        };
        Self::below_root(rest.split(SEPARATOR), container)
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_container(&self) -> bool {
        self.container
    }

    pub fn is_root(&self) -> bool {
        self.segments.len() == 1
    }

    /// Number of segments below the root
    pub fn depth(&self) -> usize {
        self.segments.len() - 1
    }

    /// The last segment, or `None` for the root
    pub fn name(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }
        self.segments.last().map(String::as_str)
    }

    /// The immediate parent, which is always a container
    pub fn parent(&self) -> Result<Self, PathError> {
        if self.is_root() {
            return Err(PathError::NoParent);
        }
        Ok(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
            container: true,
        })
    }

    /// Append one segment
    pub fn child(&self, name: &str, container: bool) -> Result<Self, PathError> {
        validate_segment(name)?;
        Ok(self.child_unchecked(name, container))
    }

    fn child_unchecked(&self, name: &str, container: bool) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self {
            segments,
            container,
        }
    }

    /// Append `suffix` to the last segment, keeping the container flag
    pub fn with_suffix(&self, suffix: &str) -> Result<Self, PathError> {
        validate_segment(suffix)?;
        if self.is_root() {
            return Err(PathError::RootHasNoName);
        }
        Ok(self.with_suffix_unchecked(suffix))
    }

    fn with_suffix_unchecked(&self, suffix: &str) -> Self {
        let mut segments = self.segments.clone();
        if let Some(last) = segments.last_mut() {
            last.push_str(suffix);
        }
        Self {
            segments,
            container: self.container,
        }
    }

    /// The same segments viewed as a container
    pub fn to_container(&self) -> Self {
        Self {
            segments: self.segments.clone(),
            container: true,
        }
    }

    /// Address of the authorization document adjacent to this resource.
    ///
    /// Containers keep theirs as a child blob, blobs as a suffixed sibling.
    pub fn acl_path(&self) -> Self {
        if self.container {
            self.child_unchecked(ACL_CONTAINER_DOCUMENT, false)
        } else {
            self.with_suffix_unchecked(ACL_SUFFIX)
        }
    }

    /// Whether this path addresses an authorization document itself
    pub fn is_acl_document(&self) -> bool {
        !self.container
            && self
                .name()
                .is_some_and(|name| name == ACL_CONTAINER_DOCUMENT || name.ends_with(ACL_SUFFIX))
    }

    /// The resource an authorization document governs, if this is one
    pub fn acl_base(&self) -> Option<Self> {
        if !self.is_acl_document() {
            return None;
        }
        let name = self.name()?;
        if name == ACL_CONTAINER_DOCUMENT {
            return self.parent().ok();
        }
        let stem = name.strip_suffix(ACL_SUFFIX)?;
        let mut segments = self.segments.clone();
        if let Some(last) = segments.last_mut() {
            *last = stem.to_string();
        }
        Some(Self {
            segments,
            container: false,
        })
    }

    /// Resolve this path against the store's base URL.
    ///
    /// Segments are percent-encoded, so characters such as `?` or `#` stay
    /// part of the path. A `.` or `..` segment is refused: every url spelling
    /// of it is a dot segment that the url parser folds into its neighbours.
    pub fn to_url(&self, base: &Url) -> Result<Url, PathError> {
        if base.cannot_be_a_base() {
            return Err(PathError::UnsupportedBase(base.clone()));
        }

        let base_path = base.path();
        let mut path = base_path
            .strip_suffix(SEPARATOR)
            .unwrap_or(base_path)
            .to_string();
        for segment in self.segments.iter().skip(1) {
            if matches!(segment.as_str(), "." | "..") {
                return Err(PathError::NoUrlForm(segment.clone()));
            }
            path.push(SEPARATOR);
            path.extend(utf8_percent_encode(segment, URL_SEGMENT));
        }
        if self.container {
            path.push(SEPARATOR);
        }

        let mut url = base.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.set_path(&path);
        Ok(url)
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return write!(f, "{}", SEPARATOR);
        }
        write!(f, "{}", self.segments.join(&SEPARATOR.to_string()))?;
        if self.container {
            write!(f, "{}", SEPARATOR)?;
        }
        Ok(())
    }
}

impl FromStr for ResourcePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let blob = ResourcePath::parse("/foo/bar").unwrap();
        assert!(!blob.is_container());
        assert_eq!(blob.depth(), 2);
        assert_eq!(blob.to_string(), "/foo/bar");

        let container = ResourcePath::parse("/foo/bar/").unwrap();
        assert!(container.is_container());
        assert_eq!(container.to_string(), "/foo/bar/");
        assert_ne!(blob, container);

        let root = ResourcePath::parse("/").unwrap();
        assert!(root.is_root());
        assert!(root.is_container());
        assert_eq!(root.to_string(), "/");
        assert_eq!(root, ResourcePath::root());
    }

    #[test]
    fn test_parse_requires_leading_separator() {
        assert!(matches!(
            ResourcePath::parse("foo/bar"),
            Err(PathError::NotAbsolute(_))
        ));
    }

    #[test]
    fn test_invalid_segment() {
        let result = ResourcePath::blob(["foo", "bar/baz"]);
        assert_eq!(result, Err(PathError::InvalidSegment("bar/baz".into())));

        let root = ResourcePath::root();
        assert!(matches!(
            root.child("a/b", false),
            Err(PathError::InvalidSegment(_))
        ));
        assert!(matches!(
            ResourcePath::new(vec!["x".into()], true),
            Err(PathError::MissingRoot)
        ));
    }

    #[test]
    fn test_parent() {
        let path = ResourcePath::parse("/a/b/c").unwrap();
        let parent = path.parent().unwrap();
        assert_eq!(parent.to_string(), "/a/b/");
        assert!(parent.is_container());
        assert_eq!(parent.parent().unwrap().parent().unwrap(), ResourcePath::root());
        assert_eq!(ResourcePath::root().parent(), Err(PathError::NoParent));
    }

    #[test]
    fn test_child_and_suffix() {
        let dir = ResourcePath::parse("/docs/").unwrap();
        let file = dir.child("notes.ttl", false).unwrap();
        assert_eq!(file.to_string(), "/docs/notes.ttl");

        let sibling = file.with_suffix(".meta").unwrap();
        assert_eq!(sibling.to_string(), "/docs/notes.ttl.meta");
        // the source is untouched
        assert_eq!(file.to_string(), "/docs/notes.ttl");

        assert_eq!(
            ResourcePath::root().with_suffix(".acl"),
            Err(PathError::RootHasNoName)
        );
    }

    #[test]
    fn test_opaque_segments() {
        let path = ResourcePath::blob(["a", "..", ".", " ", "line\nbreak"]).unwrap();
        assert_eq!(path.depth(), 5);
        assert_eq!(path.name(), Some("line\nbreak"));
        assert_eq!(path.parent().unwrap().name(), Some(" "));
    }

    #[test]
    fn test_acl_paths() {
        let dir = ResourcePath::parse("/foo/").unwrap();
        assert_eq!(dir.acl_path().to_string(), "/foo/.acl");

        let file = ResourcePath::parse("/foo/bar").unwrap();
        assert_eq!(file.acl_path().to_string(), "/foo/bar.acl");

        assert_eq!(ResourcePath::root().acl_path().to_string(), "/.acl");
    }

    #[test]
    fn test_acl_base() {
        let container_acl = ResourcePath::parse("/foo/.acl").unwrap();
        assert!(container_acl.is_acl_document());
        assert_eq!(container_acl.acl_base().unwrap().to_string(), "/foo/");

        let blob_acl = ResourcePath::parse("/foo/bar.acl").unwrap();
        assert_eq!(blob_acl.acl_base().unwrap().to_string(), "/foo/bar");

        let root_acl = ResourcePath::parse("/.acl").unwrap();
        assert_eq!(root_acl.acl_base().unwrap(), ResourcePath::root());

        let plain = ResourcePath::parse("/foo/bar").unwrap();
        assert!(!plain.is_acl_document());
        assert!(plain.acl_base().is_none());

        // a container is never an authorization document
        let dir = ResourcePath::parse("/x.acl/").unwrap();
        assert!(!dir.is_acl_document());
    }

    #[test]
    fn test_to_url() {
        let base = Url::parse("https://pod.example/").unwrap();
        let path = ResourcePath::parse("/foo/bar").unwrap();
        assert_eq!(path.to_url(&base).unwrap().as_str(), "https://pod.example/foo/bar");

        let dir = ResourcePath::parse("/foo/").unwrap();
        assert_eq!(dir.to_url(&base).unwrap().as_str(), "https://pod.example/foo/");

        let odd = ResourcePath::blob(["what?", "#frag"]).unwrap();
        assert_eq!(
            odd.to_url(&base).unwrap().as_str(),
            "https://pod.example/what%3F/%23frag"
        );

        let prefixed = Url::parse("https://host.example/pods/alice/").unwrap();
        assert_eq!(
            path.to_url(&prefixed).unwrap().as_str(),
            "https://host.example/pods/alice/foo/bar"
        );
        assert_eq!(
            ResourcePath::root().to_url(&prefixed).unwrap().as_str(),
            "https://host.example/pods/alice/"
        );
        assert_eq!(
            ResourcePath::root().to_url(&base).unwrap().as_str(),
            "https://pod.example/"
        );
    }

    #[test]
    fn test_to_url_keeps_distinct_paths_distinct() {
        let base = Url::parse("https://pod.example/").unwrap();
        let url = |path: ResourcePath| path.to_url(&base).unwrap().to_string();

        assert_eq!(
            url(ResourcePath::blob(["line\nbreak"]).unwrap()),
            "https://pod.example/line%0Abreak"
        );
        assert_ne!(
            url(ResourcePath::blob(["line\nbreak"]).unwrap()),
            url(ResourcePath::blob(["linebreak"]).unwrap())
        );
        assert_eq!(
            url(ResourcePath::blob(["%2E"]).unwrap()),
            "https://pod.example/%252E"
        );
        assert_eq!(
            url(ResourcePath::container(["...", "a b"]).unwrap()),
            "https://pod.example/.../a%20b/"
        );
        assert_eq!(
            url(ResourcePath::blob(["a\\b"]).unwrap()),
            "https://pod.example/a%5Cb"
        );

        let dotted = ResourcePath::container(["foo", "."]).unwrap();
        assert_eq!(
            dotted.to_url(&base),
            Err(PathError::NoUrlForm(".".to_string()))
        );
        let climbing = ResourcePath::blob(["a", ".."]).unwrap();
        assert_eq!(
            climbing.to_url(&base),
            Err(PathError::NoUrlForm("..".to_string()))
        );
        assert!(dotted.acl_path().to_url(&base).is_err());
    }
}
