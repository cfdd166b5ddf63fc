//! Loading graphs from files or URLs and sharing them between searches.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::graph::{Graph, GraphData};

/// Location of a graph JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GraphSource {
    File(PathBuf),
    Url(String),
}

impl GraphSource {
    pub fn is_remote(&self) -> bool {
        matches!(self, GraphSource::Url(_))
    }
}

impl fmt::Display for GraphSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphSource::File(path) => write!(f, "{}", path.display()),
            GraphSource::Url(url) => f.write_str(url),
        }
    }
}

impl FromStr for GraphSource {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Ok(GraphSource::Url(trimmed.to_string()))
        } else {
            Ok(GraphSource::File(PathBuf::from(trimmed)))
        }
    }
}

impl From<&str> for GraphSource {
    fn from(value: &str) -> Self {
        match value.parse() {
            Ok(source) => source,
            Err(never) => match never {},
        }
    }
}

/// Decode and validate a graph from raw JSON bytes.
pub fn parse_graph(bytes: &[u8]) -> Result<Graph> {
    let data: GraphData = serde_json::from_slice(bytes)?;
    Graph::from_data(data)
}

/// Load a graph from a JSON file on disk.
pub fn load_graph_file(path: impl AsRef<Path>) -> Result<Graph> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let graph = parse_graph(&bytes)?;
    info!(
        path = %path.display(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "loaded graph file"
    );
    Ok(graph)
}

/// Download and parse a graph over HTTP(S).
pub fn fetch_graph(url: &str) -> Result<Graph> {
    let client = build_client()?;
    let response = client.get(url).send()?.error_for_status()?;
    let bytes = response.bytes()?;
    let graph = parse_graph(&bytes)?;
    info!(
        url,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "fetched graph"
    );
    Ok(graph)
}

/// Load a graph from whichever source `source` names.
pub fn load_graph(source: &GraphSource) -> Result<Graph> {
    match source {
        GraphSource::File(path) => load_graph_file(path),
        GraphSource::Url(url) => fetch_graph(url),
    }
}

fn build_client() -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(user_agent())
        .build()
        .map_err(Error::Http)
}

fn user_agent() -> String {
    format!("waypath-lib/{}", env!("CARGO_PKG_VERSION"))
}

type Slot = Arc<OnceCell<Arc<Graph>>>;

/// Number of loaded graphs a [`GraphCache`] keeps by default.
pub const DEFAULT_GRAPH_CACHE_CAPACITY: usize = 16;

#[derive(Debug)]
struct CacheEntry {
    slot: Slot,
    last_used: u64,
}

#[derive(Debug, Default)]
struct Slots {
    entries: HashMap<String, CacheEntry>,
    clock: u64,
}

impl Slots {
    fn touch(&mut self, key: &str) -> Slot {
        self.clock += 1;
        let clock = self.clock;
        let entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| CacheEntry {
                slot: Slot::default(),
                last_used: clock,
            });
        entry.last_used = clock;
        Arc::clone(&entry.slot)
    }

    fn loaded(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| entry.slot.get().is_some())
            .count()
    }

    /// Drop least recently used loaded graphs, never `keep`, until at most
    /// `capacity` remain. Slots still loading are left alone.
    fn evict_beyond(&mut self, capacity: usize, keep: &str) -> Vec<String> {
        let mut evicted = Vec::new();
        while self.loaded() > capacity {
            let victim = self
                .entries
                .iter()
                .filter(|(key, entry)| key.as_str() != keep && entry.slot.get().is_some())
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(key, _)| key.clone());
            let Some(victim) = victim else {
                break;
            };
            self.entries.remove(&victim);
            evicted.push(victim);
        }
        evicted
    }
}

/// Process-wide graph cache keyed by source string.
///
/// Each key is initialised at most once; concurrent callers for the same key
/// wait for the first load. A failed load removes its key so a later call
/// retries and unknown keys do not pile up. Once more than `capacity` graphs
/// are loaded the least recently used one is evicted; callers holding its
/// `Arc` keep using it.
#[derive(Debug)]
pub struct GraphCache {
    slots: Mutex<Slots>,
    capacity: usize,
}

impl Default for GraphCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_GRAPH_CACHE_CAPACITY)
    }
}

impl GraphCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache holding at most `capacity` loaded graphs (minimum one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Mutex::new(Slots::default()),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn slot(&self, key: &str) -> Slot {
        self.lock().touch(key)
    }

    fn evict_excess(&self, keep: &str) {
        let evicted = self.lock().evict_beyond(self.capacity, keep);
        for key in evicted {
            debug!(key = %key, capacity = self.capacity, "evicted graph from cache");
        }
    }

    /// Remove `key` if it still maps to `slot` and nothing was loaded into it.
    fn forget_failed(&self, key: &str, slot: &Slot) {
        let mut slots = self.lock();
        let stale = slots
            .entries
            .get(key)
            .is_some_and(|entry| Arc::ptr_eq(&entry.slot, slot) && entry.slot.get().is_none());
        if stale {
            slots.entries.remove(key);
        }
    }

    /// Return the cached graph for `key`, loading it with [`load_graph`] on first use.
    pub fn get_or_load(&self, key: &str) -> Result<Arc<Graph>> {
        self.get_or_load_with(key, || load_graph(&GraphSource::from(key)))
    }

    /// Like [`GraphCache::get_or_load`] with a caller-supplied loader.
    pub fn get_or_load_with<F>(&self, key: &str, loader: F) -> Result<Arc<Graph>>
    where
        F: FnOnce() -> Result<Graph>,
    {
        let slot = self.slot(key);
        let loaded = slot
            .get_or_try_init(|| {
                debug!(key, "graph cache miss");
                loader().map(Arc::new)
            })
            .map(Arc::clone);

        match loaded {
            Ok(graph) => {
                self.evict_excess(key);
                Ok(graph)
            }
            Err(err) => {
                self.forget_failed(key, &slot);
                Err(err)
            }
        }
    }

    /// Store an already loaded graph under `key`. Returns `false` if the key was populated.
    pub fn insert(&self, key: &str, graph: Arc<Graph>) -> bool {
        let inserted = self.slot(key).set(graph).is_ok();
        if inserted {
            self.evict_excess(key);
        }
        inserted
    }

    pub fn get(&self, key: &str) -> Option<Arc<Graph>> {
        let mut slots = self.lock();
        let graph = slots.entries.get(key)?.slot.get().cloned()?;
        slots.touch(key);
        Some(graph)
    }

    /// Number of keys holding a loaded graph.
    pub fn len(&self) -> usize {
        self.lock().loaded()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of tracked keys, including loads still in flight.
    pub fn key_count(&self) -> usize {
        self.lock().entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TINY: &str = r#"{
        "nodes": [{"id": 1, "lat": 0.0, "lon": 0.0}, {"id": 2, "lat": 0.0, "lon": 0.001}],
        "edges": [{"u": 1, "v": 2, "weight": 111.2}],
        "bounds": [[0.0, 0.0], [0.0, 0.001]]
    }"#;

    #[test]
    fn source_kind_from_prefix() {
        assert_eq!(
            GraphSource::from("https://maps.example.com/a.json"),
            GraphSource::Url("https://maps.example.com/a.json".into())
        );
        assert_eq!(
            GraphSource::from("HTTP://host/g.json"),
            GraphSource::Url("HTTP://host/g.json".into())
        );
        assert_eq!(
            GraphSource::from("maps/campus.json"),
            GraphSource::File(PathBuf::from("maps/campus.json"))
        );
        assert!(!GraphSource::from("campus.json").is_remote());
    }

    #[test]
    fn parse_graph_reads_json() {
        let graph = parse_graph(TINY.as_bytes()).expect("valid");
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.bounds().len(), 2);
    }

    #[test]
    fn parse_graph_rejects_garbage() {
        assert!(matches!(parse_graph(b"{\"nodes\": 3}"), Err(Error::Json(_))));
    }

    #[test]
    fn cache_loads_each_key_once() {
        let cache = GraphCache::new();
        let calls = AtomicUsize::new(0);
        let load = || {
            calls.fetch_add(1, Ordering::SeqCst);
            parse_graph(TINY.as_bytes())
        };

        let first = cache.get_or_load_with("tiny", load).unwrap();
        let second = cache.get_or_load_with("tiny", load).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failed_loads_are_not_cached() {
        let cache = GraphCache::new();
        assert!(cache
            .get_or_load_with("broken", || parse_graph(b"not json"))
            .is_err());
        assert!(cache.is_empty());
        assert_eq!(cache.key_count(), 0);
        assert!(cache.get("broken").is_none());

        cache
            .get_or_load_with("broken", || parse_graph(TINY.as_bytes()))
            .expect("retry succeeds");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failed_keys_do_not_accumulate() {
        let cache = GraphCache::new();
        for i in 0..1000 {
            let key = format!("/nonexistent/campus-{i}.json");
            assert!(cache.get_or_load(&key).is_err());
        }
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.key_count(), 0);
    }

    #[test]
    fn least_recently_used_graph_is_evicted() {
        let cache = GraphCache::with_capacity(2);
        let load = || parse_graph(TINY.as_bytes());

        let first = cache.get_or_load_with("a", load).unwrap();
        cache.get_or_load_with("b", load).unwrap();
        // Touch "a" so "b" becomes the oldest.
        assert!(cache.get("a").is_some());
        cache.get_or_load_with("c", load).unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.key_count(), 2);
        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_none());
        assert!(cache.get("c").is_some());
        // Evicted graphs stay usable by whoever already holds them.
        assert_eq!(first.node_count(), 2);
    }

    #[test]
    fn capacity_is_at_least_one() {
        let cache = GraphCache::with_capacity(0);
        assert_eq!(cache.capacity(), 1);
        cache
            .get_or_load_with("only", || parse_graph(TINY.as_bytes()))
            .unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(GraphCache::new().capacity(), DEFAULT_GRAPH_CACHE_CAPACITY);
    }

    #[test]
    fn insert_does_not_overwrite() {
        let cache = GraphCache::new();
        let graph = Arc::new(parse_graph(TINY.as_bytes()).unwrap());
        assert!(cache.insert("default", Arc::clone(&graph)));
        assert!(!cache.insert("default", graph));
        assert!(cache.get("default").is_some());
    }
}
