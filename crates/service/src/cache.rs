//! Parse cache for authorization documents.
//!
//! Entries are keyed by the document address and its content-derived ETag,
//! so a write to the document changes the key and the stale entry is simply
//! never asked for again. Eviction is oldest-first.

use std::collections::{HashMap, VecDeque};

use common::collaborators::{DocumentParser, ParseError};
use common::graph::Graph;
use common::store::Representation;
use parking_lot::Mutex;
use url::Url;

type CacheKey = (String, String);

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<CacheKey, Graph>,
    order: VecDeque<CacheKey>,
    hits: u64,
    misses: u64,
}

/// Hit and miss counters since construction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

#[derive(Debug)]
pub struct CachingParser<P> {
    parser: P,
    capacity: usize,
    inner: Mutex<CacheInner>,
}

impl<P: DocumentParser> CachingParser<P> {
    /// A capacity of zero disables caching
    pub fn new(parser: P, capacity: usize) -> Self {
        Self {
            parser,
            capacity,
            inner: Mutex::new(CacheInner::default()),
        }
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            entries: inner.entries.len(),
        }
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.order.clear();
    }
}

impl<P: DocumentParser> DocumentParser for CachingParser<P> {
    fn parse(&self, document: &Representation, base: &Url) -> Result<Graph, ParseError> {
        let key = (base.to_string(), document.etag().to_string());

        {
            let mut inner = self.inner.lock();
            if let Some(graph) = inner.entries.get(&key).cloned() {
                inner.hits += 1;
                return Ok(graph);
            }
            inner.misses += 1;
        }

        // parse outside the lock; failures are not cached
        let graph = self.parser.parse(document, base)?;
        if self.capacity == 0 {
            return Ok(graph);
        }

        let mut inner = self.inner.lock();
        if inner.entries.insert(key.clone(), graph.clone()).is_none() {
            inner.order.push_back(key);
        }
        while inner.entries.len() > self.capacity {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.entries.remove(&oldest);
                    tracing::trace!(document = %oldest.0, "evicted parsed document");
                }
                None => break,
            }
        }

        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use common::testkit::{graph_body, AuthorizationBuilder, JsonGraphParser, JSON_GRAPH_TYPE};

    #[derive(Debug, Default)]
    struct CountingParser {
        calls: AtomicUsize,
    }

    impl DocumentParser for CountingParser {
        fn parse(&self, document: &Representation, base: &Url) -> Result<Graph, ParseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            JsonGraphParser.parse(document, base)
        }
    }

    fn document(fragment: &str) -> Representation {
        let graph = AuthorizationBuilder::new(fragment).into_graph();
        Representation::new(JSON_GRAPH_TYPE, graph_body(&graph))
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_hits_by_address_and_etag() {
        let cache = CachingParser::new(CountingParser::default(), 8);
        let base = url("https://pod.example/.acl");
        let first = document("a");

        let parsed = cache.parse(&first, &base).unwrap();
        assert_eq!(cache.parse(&first, &base).unwrap(), parsed);
        assert_eq!(cache.parser.calls.load(Ordering::SeqCst), 1);

        // new content, new etag
        cache.parse(&document("b"), &base).unwrap();
        assert_eq!(cache.parser.calls.load(Ordering::SeqCst), 2);

        // same content elsewhere resolves differently
        cache
            .parse(&first, &url("https://pod.example/foo/.acl"))
            .unwrap();
        assert_eq!(cache.parser.calls.load(Ordering::SeqCst), 3);

        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 1,
                misses: 3,
                entries: 3
            }
        );
    }

    #[test]
    fn test_evicts_oldest() {
        let cache = CachingParser::new(CountingParser::default(), 2);
        let base = url("https://pod.example/.acl");
        let (a, b, c) = (document("a"), document("b"), document("c"));

        cache.parse(&a, &base).unwrap();
        cache.parse(&b, &base).unwrap();
        cache.parse(&c, &base).unwrap();
        assert_eq!(cache.stats().entries, 2);

        cache.parse(&c, &base).unwrap();
        assert_eq!(cache.parser.calls.load(Ordering::SeqCst), 3);
        cache.parse(&a, &base).unwrap();
        assert_eq!(cache.parser.calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_failures_are_not_cached() {
        let cache = CachingParser::new(CountingParser::default(), 2);
        let base = url("https://pod.example/.acl");
        let broken = Representation::new(JSON_GRAPH_TYPE, "[{");

        assert!(cache.parse(&broken, &base).is_err());
        assert!(cache.parse(&broken, &base).is_err());
        assert_eq!(cache.parser.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn test_zero_capacity_disables() {
        let cache = CachingParser::new(CountingParser::default(), 0);
        let base = url("https://pod.example/.acl");
        let a = document("a");

        cache.parse(&a, &base).unwrap();
        cache.parse(&a, &base).unwrap();
        assert_eq!(cache.parser.calls.load(Ordering::SeqCst), 2);

        cache.clear();
        assert_eq!(cache.stats().entries, 0);
    }
}
