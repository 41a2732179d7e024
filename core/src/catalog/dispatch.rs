use super::{Catalog, CatalogError};
use crate::models::{MovieRecord, SearchResult};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

/// Hands out monotonically increasing request tags and remembers the latest
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: u64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag for a new request; supersedes every earlier tag
    pub fn next(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    pub fn latest(&self) -> u64 {
        self.latest
    }

    pub fn is_current(&self, seq: u64) -> bool {
        seq == self.latest
    }
}

/// Outcome of a dispatched catalog request
#[derive(Debug)]
pub enum CatalogReply {
    Search {
        seq: u64,
        query: String,
        result: Result<SearchResult, CatalogError>,
    },
    Detail {
        seq: u64,
        /// The record the detail was requested for
        requested: MovieRecord,
        result: Result<MovieRecord, CatalogError>,
    },
}

impl CatalogReply {
    pub fn seq(&self) -> u64 {
        match self {
            CatalogReply::Search { seq, .. } | CatalogReply::Detail { seq, .. } => *seq,
        }
    }
}

/// Runs catalog requests on worker threads.
///
/// Searches and detail fetches are tagged from separate sequences. Only the
/// reply to the latest request of each kind is ever handed back; a late
/// reply to a superseded request is dropped. In-flight requests are not
/// cancelled.
pub struct CatalogDispatcher {
    catalog: Arc<dyn Catalog>,
    tx: Sender<CatalogReply>,
    rx: Receiver<CatalogReply>,
    searches: RequestSequencer,
    details: RequestSequencer,
    search_pending: bool,
    detail_pending: bool,
}

impl CatalogDispatcher {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            catalog,
            tx,
            rx,
            searches: RequestSequencer::new(),
            details: RequestSequencer::new(),
            search_pending: false,
            detail_pending: false,
        }
    }

    /// Start a search, superseding any search still in flight
    pub fn search(&mut self, query: impl Into<String>) -> u64 {
        let query = query.into();
        let seq = self.searches.next();
        self.search_pending = true;
        debug!(seq, query = %query, "Dispatching search");

        let catalog = Arc::clone(&self.catalog);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = catalog.search(&query);
            // Receiver gone means the dispatcher was dropped
            let _ = tx.send(CatalogReply::Search { seq, query, result });
        });
        seq
    }

    /// Start a detail fetch for `requested`, superseding any earlier one
    pub fn detail(&mut self, requested: MovieRecord) -> u64 {
        let seq = self.details.next();
        self.detail_pending = true;
        debug!(seq, movie_id = requested.id, "Dispatching detail fetch");

        let catalog = Arc::clone(&self.catalog);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = catalog.detail(requested.id);
            let _ = tx.send(CatalogReply::Detail {
                seq,
                requested,
                result,
            });
        });
        seq
    }

    pub fn is_search_pending(&self) -> bool {
        self.search_pending
    }

    pub fn is_detail_pending(&self) -> bool {
        self.detail_pending
    }

    /// Drain finished requests without blocking, keeping only current ones
    pub fn poll(&mut self) -> Vec<CatalogReply> {
        let mut current = Vec::new();
        while let Ok(reply) = self.rx.try_recv() {
            if let Some(reply) = self.accept(reply) {
                current.push(reply);
            }
        }
        current
    }

    /// Wait up to `timeout` for the next current reply
    pub fn wait(&mut self, timeout: Duration) -> Option<CatalogReply> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(reply) => {
                    if let Some(reply) = self.accept(reply) {
                        return Some(reply);
                    }
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    fn accept(&mut self, reply: CatalogReply) -> Option<CatalogReply> {
        let (sequencer, pending) = match reply {
            CatalogReply::Search { .. } => (&self.searches, &mut self.search_pending),
            CatalogReply::Detail { .. } => (&self.details, &mut self.detail_pending),
        };

        if !sequencer.is_current(reply.seq()) {
            debug!(seq = reply.seq(), latest = sequencer.latest(), "Dropping stale catalog reply");
            return None;
        }
        *pending = false;
        Some(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MovieId;
    use std::sync::{Condvar, Mutex};

    /// Catalog whose searches block until released, in any order.
    /// With `gate_details` set, detail fetches block on their id too.
    #[derive(Default)]
    struct GatedCatalog {
        released: Mutex<Vec<String>>,
        signal: Condvar,
        gate_details: bool,
    }

    impl GatedCatalog {
        fn release(&self, key: &str) {
            self.released.lock().unwrap().push(key.to_string());
            self.signal.notify_all();
        }

        fn block_until_released(&self, key: &str) {
            let mut released = self.released.lock().unwrap();
            while !released.iter().any(|k| k == key) {
                released = self.signal.wait(released).unwrap();
            }
        }
    }

    impl Catalog for GatedCatalog {
        fn search(&self, query: &str) -> Result<SearchResult, CatalogError> {
            self.block_until_released(query);
            let mut result = SearchResult::empty();
            result.results.push(MovieRecord::new(query.len() as MovieId, query));
            Ok(result)
        }

        fn detail(&self, id: MovieId) -> Result<MovieRecord, CatalogError> {
            if id == 0 {
                return Err(CatalogError::MissingCredential);
            }
            if self.gate_details {
                self.block_until_released(&id.to_string());
            }
            let mut record = MovieRecord::new(id, "Detailed");
            record.runtime_minutes = Some(120);
            Ok(record)
        }
    }

    #[test]
    fn test_sequencer_is_monotonic() {
        let mut sequencer = RequestSequencer::new();
        let first = sequencer.next();
        let second = sequencer.next();

        assert!(second > first);
        assert!(!sequencer.is_current(first));
        assert!(sequencer.is_current(second));
    }

    #[test]
    fn test_stale_search_reply_is_dropped() {
        let catalog = Arc::new(GatedCatalog::default());
        let mut dispatcher = CatalogDispatcher::new(catalog.clone());

        let _old = dispatcher.search("matr");
        let new = dispatcher.search("matrix");

        // the newer search answers first, the older one arrives late
        catalog.release("matrix");
        let reply = dispatcher.wait(Duration::from_secs(5)).unwrap();
        assert_eq!(reply.seq(), new);
        assert!(!dispatcher.is_search_pending());

        catalog.release("matr");
        assert!(dispatcher.wait(Duration::from_millis(200)).is_none());
        assert!(dispatcher.poll().is_empty());
    }

    #[test]
    fn test_stale_detail_reply_is_dropped() {
        let catalog = Arc::new(GatedCatalog {
            gate_details: true,
            ..GatedCatalog::default()
        });
        let mut dispatcher = CatalogDispatcher::new(catalog.clone());

        let _old = dispatcher.detail(MovieRecord::new(603, "The Matrix"));
        let new = dispatcher.detail(MovieRecord::new(604, "The Matrix Reloaded"));

        catalog.release("604");
        match dispatcher.wait(Duration::from_secs(5)) {
            Some(CatalogReply::Detail { seq, requested, .. }) => {
                assert_eq!(seq, new);
                assert_eq!(requested.id, 604);
            }
            other => panic!("unexpected reply: {:?}", other),
        }
        assert!(!dispatcher.is_detail_pending());

        catalog.release("603");
        assert!(dispatcher.wait(Duration::from_millis(200)).is_none());
        assert!(dispatcher.poll().is_empty());
    }

    #[test]
    fn test_detail_reply_carries_requested_record() {
        let catalog = Arc::new(GatedCatalog::default());
        let mut dispatcher = CatalogDispatcher::new(catalog);

        let seq = dispatcher.detail(MovieRecord::new(603, "The Matrix"));
        assert!(dispatcher.is_detail_pending());

        match dispatcher.wait(Duration::from_secs(5)) {
            Some(CatalogReply::Detail { seq: got, requested, result }) => {
                assert_eq!(got, seq);
                assert_eq!(requested.title, "The Matrix");
                assert_eq!(result.unwrap().runtime_minutes, Some(120));
            }
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[test]
    fn test_search_and_detail_sequences_are_independent() {
        let catalog = Arc::new(GatedCatalog::default());
        let mut dispatcher = CatalogDispatcher::new(catalog.clone());

        let search_seq = dispatcher.search("alien");
        dispatcher.detail(MovieRecord::new(0, "Broken"));

        let detail = dispatcher.wait(Duration::from_secs(5)).unwrap();
        assert!(matches!(detail, CatalogReply::Detail { result: Err(_), .. }));

        catalog.release("alien");
        let search = dispatcher.wait(Duration::from_secs(5)).unwrap();
        assert_eq!(search.seq(), search_seq);
    }
}
