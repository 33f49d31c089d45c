//! Table view controller.
//!
//! Owns the [`ViewState`] of the data viewer and turns user intents (switch
//! kind, next/previous page, refresh) into store fetches. Every fetch runs on
//! a worker thread; inside it the count, schema and page queries run
//! concurrently and are joined, so a page is installed all at once.
//!
//! Each fetch carries a generation number. Only the outcome of the most
//! recent fetch may touch the state: when the user switches kind while a
//! fetch is still in flight, the late outcome is discarded.

use std::fmt;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::pagination::PageWindow;
use crate::model::{ColumnDescriptor, EntityKind, Row};
use crate::store::{RecordStore, StoreError};

/// Errors surfaced at the controller boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewError {
    /// The store could not be reached or a query failed.
    NetworkFailure(String),
    /// The table behind the selected kind is missing or malformed.
    SchemaMismatch(String),
    /// Outcome of a superseded fetch; discarded without touching state.
    StaleResponse { generation: u64, current: u64 },
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewError::NetworkFailure(msg) => write!(f, "network failure: {}", msg),
            ViewError::SchemaMismatch(msg) => write!(f, "schema mismatch: {}", msg),
            ViewError::StaleResponse {
                generation,
                current,
            } => write!(
                f,
                "stale response from fetch #{} (current #{})",
                generation, current
            ),
        }
    }
}

impl std::error::Error for ViewError {}

impl From<StoreError> for ViewError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::SchemaMismatch(msg) => ViewError::SchemaMismatch(msg),
            StoreError::Connection(msg) | StoreError::Query(msg) | StoreError::Rejected(msg) => {
                ViewError::NetworkFailure(msg)
            }
        }
    }
}

/// Everything one fetch brings back.
#[derive(Debug, Clone, PartialEq)]
pub struct PageData {
    pub total: u64,
    pub columns: Vec<ColumnDescriptor>,
    pub rows: Vec<Row>,
}

/// Completion message sent by a fetch worker.
#[derive(Debug)]
pub struct FetchOutcome {
    pub generation: u64,
    pub kind: EntityKind,
    pub page: u64,
    pub result: Result<PageData, StoreError>,
}

/// What the table view renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub kind: EntityKind,
    pub window: PageWindow,
    pub columns: Vec<ColumnDescriptor>,
    pub rows: Vec<Row>,
    pub is_loading: bool,
    /// Message of the last failed fetch, cleared by the next success.
    pub last_error: Option<String>,
}

/// Runs the count, schema and page queries for one page concurrently.
///
/// The first error (in that order) wins; a panicking query is reported as a
/// query error.
pub fn fetch_page(
    store: &dyn RecordStore,
    table: &str,
    window: &PageWindow,
) -> Result<PageData, StoreError> {
    let range = window.range();
    thread::scope(|s| {
        let count = s.spawn(|| store.count(table, None));
        let columns = s.spawn(|| store.columns(table));
        let rows = s.spawn(|| store.rows(table, range.start, range.end - range.start));

        let total = join(count)?;
        let columns = join(columns)?;
        let rows = join(rows)?;
        Ok(PageData {
            total,
            columns,
            rows,
        })
    })
}

fn join<T>(handle: thread::ScopedJoinHandle<'_, Result<T, StoreError>>) -> Result<T, StoreError> {
    handle
        .join()
        .unwrap_or_else(|_| Err(StoreError::Query("fetch worker panicked".to_string())))
}

/// Controller of the paginated table view.
pub struct TableViewController {
    store: Arc<dyn RecordStore>,
    state: ViewState,
    generation: u64,
    tx: Sender<FetchOutcome>,
    rx: Receiver<FetchOutcome>,
}

impl TableViewController {
    /// Creates an idle controller on the default kind. Nothing is fetched
    /// until the first intent (usually [`refresh`](Self::refresh)).
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            store,
            state: ViewState::default(),
            generation: 0,
            tx,
            rx,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Switches to `kind`, back to page 1, and refetches (even when `kind`
    /// is already selected).
    pub fn select_kind(&mut self, kind: EntityKind) {
        self.state.kind = kind;
        self.state.window.page = 1;
        self.refetch();
    }

    /// Advances one page. Returns false (and does nothing) on the last page.
    pub fn next_page(&mut self) -> bool {
        if !self.state.window.next() {
            return false;
        }
        self.refetch();
        true
    }

    /// Goes back one page. Returns false (and does nothing) on page 1.
    pub fn prev_page(&mut self) -> bool {
        if !self.state.window.prev() {
            return false;
        }
        self.refetch();
        true
    }

    /// Jumps to `page` (at least 1). A page past the end is clamped once the
    /// fetch reports the total.
    pub fn goto_page(&mut self, page: u64) {
        self.state.window.page = page.max(1);
        self.refetch();
    }

    /// Selects `kind` and `page` with a single fetch. Used for the initial load.
    pub fn open(&mut self, kind: EntityKind, page: u64) {
        self.state.kind = kind;
        self.goto_page(page);
    }

    /// Refetches the current kind and page.
    pub fn refresh(&mut self) {
        self.refetch();
    }

    /// Restores the default state. Fetches still in flight become stale.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = ViewState::default();
    }

    fn refetch(&mut self) {
        self.generation += 1;
        self.state.is_loading = true;

        let generation = self.generation;
        let kind = self.state.kind;
        let window = self.state.window;
        let store = Arc::clone(&self.store);
        let tx = self.tx.clone();
        debug!(generation, table = kind.table_name(), page = window.page, "fetch started");

        let spawned = thread::Builder::new()
            .name(format!("fetch-{}", generation))
            .spawn(move || {
                let result = fetch_page(store.as_ref(), kind.table_name(), &window);
                // The receiver is gone only when the controller was dropped.
                let _ = tx.send(FetchOutcome {
                    generation,
                    kind,
                    page: window.page,
                    result,
                });
            });

        if let Err(e) = spawned {
            self.fail(StoreError::Query(format!("cannot start fetch: {}", e)));
        }
    }

    /// Applies every completed fetch without blocking. Returns true if the
    /// state changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(outcome) = self.rx.try_recv() {
            if !matches!(self.apply(outcome), Err(ViewError::StaleResponse { .. })) {
                changed = true;
            }
        }
        changed
    }

    /// Blocks up to `timeout` for the next completed fetch and applies it.
    /// Returns `None` on timeout.
    pub fn wait(&mut self, timeout: Duration) -> Option<Result<(), ViewError>> {
        match self.rx.recv_timeout(timeout) {
            Ok(outcome) => Some(self.apply(outcome)),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Blocks until no fetch is outstanding, skipping stale outcomes.
    /// Returns the error of the fetch that settled the state, if any.
    pub fn wait_idle(&mut self, timeout: Duration) -> Result<(), ViewError> {
        let deadline = Instant::now() + timeout;
        let mut last = Ok(());
        while self.state.is_loading {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.wait(remaining) {
                Some(Err(ViewError::StaleResponse { .. })) => {}
                Some(result) => last = result,
                None => {
                    return Err(ViewError::NetworkFailure(format!(
                        "no response within {:?}",
                        timeout
                    )));
                }
            }
        }
        last
    }

    /// Applies one fetch outcome.
    ///
    /// Outcomes of superseded fetches are rejected with `StaleResponse` and
    /// leave the state untouched. A failed fetch empties the table and keeps
    /// the error message for the banner.
    pub fn apply(&mut self, outcome: FetchOutcome) -> Result<(), ViewError> {
        if outcome.generation != self.generation {
            debug!(
                generation = outcome.generation,
                current = self.generation,
                table = outcome.kind.table_name(),
                "discarding stale fetch"
            );
            return Err(ViewError::StaleResponse {
                generation: outcome.generation,
                current: self.generation,
            });
        }

        match outcome.result {
            Ok(data) => {
                let window = PageWindow::new(outcome.page, data.total);
                if window.is_past_end() {
                    // Rows were removed since the page was chosen.
                    let last = window.display_total_pages();
                    debug!(
                        table = outcome.kind.table_name(),
                        page = outcome.page,
                        last,
                        "page past end, clamping"
                    );
                    self.state.window = PageWindow::new(last, data.total);
                    self.refetch();
                    return Ok(());
                }
                self.state.window = window;
                self.state.columns = data.columns;
                self.state.rows = data.rows;
                self.state.last_error = None;
                self.state.is_loading = false;
                Ok(())
            }
            Err(e) => {
                warn!(table = outcome.kind.table_name(), page = outcome.page, error = %e, "fetch failed");
                Err(self.fail(e))
            }
        }
    }

    fn fail(&mut self, e: StoreError) -> ViewError {
        self.state.rows.clear();
        self.state.columns.clear();
        self.state.window = PageWindow::default();
        self.state.last_error = Some(e.to_string());
        self.state.is_loading = false;
        ViewError::from(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;
    use crate::store::{Filter, MemoryStore};
    use std::sync::{Condvar, Mutex};

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn demo_controller() -> TableViewController {
        TableViewController::new(Arc::new(MemoryStore::demo()))
    }

    fn ids(state: &ViewState) -> Vec<String> {
        state.rows.iter().map(|r| r.id()).collect()
    }

    /// Store that holds back page fetches of one table until released.
    struct GatedStore {
        inner: MemoryStore,
        gated_table: &'static str,
        open: Mutex<bool>,
        cv: Condvar,
    }

    impl GatedStore {
        fn new(gated_table: &'static str) -> Self {
            Self {
                inner: MemoryStore::demo(),
                gated_table,
                open: Mutex::new(false),
                cv: Condvar::new(),
            }
        }

        fn release(&self) {
            *self.open.lock().unwrap() = true;
            self.cv.notify_all();
        }
    }

    impl RecordStore for GatedStore {
        fn count(&self, table: &str, filter: Option<&Filter>) -> Result<u64, StoreError> {
            self.inner.count(table, filter)
        }

        fn columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>, StoreError> {
            self.inner.columns(table)
        }

        fn rows(&self, table: &str, offset: u64, limit: u64) -> Result<Vec<Row>, StoreError> {
            if table == self.gated_table {
                let mut open = self.open.lock().unwrap();
                while !*open {
                    open = self.cv.wait(open).unwrap();
                }
            }
            self.inner.rows(table, offset, limit)
        }

        fn insert(&self, table: &str, record: &Row) -> Result<(), StoreError> {
            self.inner.insert(table, record)
        }

        fn distribution(&self, table: &str, column: &str) -> Result<Vec<(Value, u64)>, StoreError> {
            self.inner.distribution(table, column)
        }

        fn describe(&self) -> String {
            "gated".to_string()
        }
    }

    /// Store whose every call fails with a connection error.
    struct DownStore;

    impl RecordStore for DownStore {
        fn count(&self, _: &str, _: Option<&Filter>) -> Result<u64, StoreError> {
            Err(StoreError::Connection("connection refused".to_string()))
        }

        fn columns(&self, _: &str) -> Result<Vec<ColumnDescriptor>, StoreError> {
            Err(StoreError::Connection("connection refused".to_string()))
        }

        fn rows(&self, _: &str, _: u64, _: u64) -> Result<Vec<Row>, StoreError> {
            Err(StoreError::Connection("connection refused".to_string()))
        }

        fn insert(&self, _: &str, _: &Row) -> Result<(), StoreError> {
            Err(StoreError::Connection("connection refused".to_string()))
        }

        fn distribution(&self, _: &str, _: &str) -> Result<Vec<(Value, u64)>, StoreError> {
            Err(StoreError::Connection("connection refused".to_string()))
        }

        fn describe(&self) -> String {
            "down".to_string()
        }
    }

    #[test]
    fn pages_through_23_rows() {
        let mut c = demo_controller();
        c.refresh();
        assert!(c.state().is_loading);
        c.wait_idle(TIMEOUT).unwrap();

        let s = c.state();
        assert!(!s.is_loading);
        assert_eq!(s.window.total, 23);
        assert_eq!(s.window.label(), "Page 1 of 3");
        assert_eq!(s.rows.len(), 10);
        assert_eq!(ids(s)[0], "1");
        assert!(!s.window.has_prev());

        assert!(c.next_page());
        c.wait_idle(TIMEOUT).unwrap();
        assert_eq!(c.state().rows.len(), 10);
        assert_eq!(ids(c.state())[0], "11");

        assert!(c.next_page());
        c.wait_idle(TIMEOUT).unwrap();
        assert_eq!(ids(c.state()), vec!["21", "22", "23"]);
        assert!(!c.state().window.has_next());

        let generation = c.generation();
        assert!(!c.next_page());
        assert_eq!(c.generation(), generation);
        assert!(!c.state().is_loading);

        assert!(c.prev_page());
        c.wait_idle(TIMEOUT).unwrap();
        assert_eq!(c.state().window.page, 2);
    }

    #[test]
    fn prev_on_first_page_is_noop() {
        let mut c = demo_controller();
        c.refresh();
        c.wait_idle(TIMEOUT).unwrap();
        let generation = c.generation();
        assert!(!c.prev_page());
        assert_eq!(c.generation(), generation);
        assert_eq!(c.state().window.page, 1);
    }

    #[test]
    fn select_kind_resets_to_first_page() {
        let mut c = demo_controller();
        c.refresh();
        c.wait_idle(TIMEOUT).unwrap();
        c.next_page();
        c.wait_idle(TIMEOUT).unwrap();
        assert_eq!(c.state().window.page, 2);

        c.select_kind(EntityKind::Parent);
        assert_eq!(c.state().window.page, 1);
        c.wait_idle(TIMEOUT).unwrap();
        let s = c.state();
        assert_eq!(s.kind, EntityKind::Parent);
        assert_eq!(s.window.total, 12);
        assert_eq!(s.window.label(), "Page 1 of 2");
        assert!(s.columns.iter().any(|col| col.raw_name == "noticed_anxiety"));
    }

    #[test]
    fn reselecting_same_kind_refetches() {
        let mut c = demo_controller();
        c.select_kind(EntityKind::Student);
        c.wait_idle(TIMEOUT).unwrap();
        let generation = c.generation();
        c.select_kind(EntityKind::Student);
        assert_eq!(c.generation(), generation + 1);
        c.wait_idle(TIMEOUT).unwrap();
        assert_eq!(c.state().window.total, 23);
    }

    #[test]
    fn late_response_for_previous_kind_is_discarded() {
        let store = Arc::new(GatedStore::new("student_surveys"));
        let mut c = TableViewController::new(store.clone());

        c.select_kind(EntityKind::Student);
        let student_generation = c.generation();
        c.select_kind(EntityKind::Parent);
        c.wait_idle(TIMEOUT).unwrap();

        let parent_state = c.state().clone();
        assert_eq!(parent_state.kind, EntityKind::Parent);
        assert_eq!(parent_state.window.total, 12);

        store.release();
        match c.wait(TIMEOUT) {
            Some(Err(ViewError::StaleResponse {
                generation,
                current,
            })) => {
                assert_eq!(generation, student_generation);
                assert_eq!(current, c.generation());
            }
            other => panic!("expected stale response, got {:?}", other),
        }
        assert_eq!(c.state(), &parent_state);
    }

    #[test]
    fn prior_state_stays_visible_while_loading() {
        let store = Arc::new(GatedStore::new("student_surveys"));
        let mut c = TableViewController::new(store.clone());
        c.select_kind(EntityKind::Teacher);
        c.wait_idle(TIMEOUT).unwrap();

        c.select_kind(EntityKind::Student);
        assert!(!c.poll());
        let s = c.state();
        assert!(s.is_loading);
        assert_eq!(s.rows.len(), 8);
        assert_eq!(s.kind, EntityKind::Student);

        store.release();
        c.wait_idle(TIMEOUT).unwrap();
        assert_eq!(c.state().window.total, 23);
    }

    #[test]
    fn failure_empties_table_and_sets_error() {
        let mut c = TableViewController::new(Arc::new(DownStore));
        c.refresh();
        let err = c.wait_idle(TIMEOUT).unwrap_err();
        assert!(matches!(err, ViewError::NetworkFailure(_)));

        let s = c.state();
        assert!(!s.is_loading);
        assert!(s.rows.is_empty());
        assert!(s.columns.is_empty());
        assert_eq!(s.window.total, 0);
        assert_eq!(
            s.last_error.as_deref(),
            Some("connection error: connection refused")
        );
    }

    #[test]
    fn missing_table_is_schema_mismatch_and_clears_rows() {
        let store = MemoryStore::new();
        store.create_table(
            "student_surveys",
            vec![ColumnDescriptor::new("id"), ColumnDescriptor::new("night_use")],
        );
        for _ in 0..12 {
            store
                .insert("student_surveys", &Row::new().with("night_use", "yes"))
                .unwrap();
        }
        let mut c = TableViewController::new(Arc::new(store));
        c.refresh();
        c.wait_idle(TIMEOUT).unwrap();
        assert_eq!(c.state().rows.len(), 10);

        c.select_kind(EntityKind::Teacher);
        let err = c.wait_idle(TIMEOUT).unwrap_err();
        assert!(matches!(err, ViewError::SchemaMismatch(_)));
        let s = c.state();
        assert!(s.rows.is_empty());
        assert!(s.columns.is_empty());
        assert_eq!(s.window.label(), "Page 1 of 1");
        assert!(s.last_error.is_some());
    }

    #[test]
    fn success_after_failure_clears_error() {
        let mut c = demo_controller();
        c.state.last_error = Some("connection error: timeout".to_string());
        c.refresh();
        c.wait_idle(TIMEOUT).unwrap();
        assert!(c.state().last_error.is_none());
    }

    #[test]
    fn page_past_end_is_clamped() {
        let mut c = demo_controller();
        c.goto_page(5);
        c.wait_idle(TIMEOUT).unwrap();
        let s = c.state();
        assert_eq!(s.window.page, 3);
        assert_eq!(s.window.total, 23);
        assert_eq!(ids(s), vec!["21", "22", "23"]);
    }

    #[test]
    fn table_emptied_under_later_page_returns_to_page_one() {
        let store = Arc::new(MemoryStore::demo());
        let mut c = TableViewController::new(store.clone());
        c.goto_page(3);
        c.wait_idle(TIMEOUT).unwrap();
        assert_eq!(c.state().window.page, 3);

        store.create_table("student_surveys", vec![ColumnDescriptor::new("id")]);
        c.refresh();
        c.wait_idle(TIMEOUT).unwrap();
        let s = c.state();
        assert_eq!(s.window.page, 1);
        assert_eq!(s.window.total, 0);
        assert_eq!(s.window.label(), "Page 1 of 1");
        assert!(!s.window.has_prev());
        assert!(!s.is_loading);
    }

    #[test]
    fn failure_on_later_page_returns_to_page_one() {
        let mut c = TableViewController::new(Arc::new(DownStore));
        c.goto_page(3);
        c.wait_idle(TIMEOUT).unwrap_err();
        let s = c.state();
        assert_eq!(s.window, PageWindow::default());
        assert_eq!(s.window.label(), "Page 1 of 1");
        assert!(!s.window.has_prev());
        let generation = c.generation();
        assert!(!c.prev_page());
        assert_eq!(c.generation(), generation);
    }

    #[test]
    fn huge_page_is_clamped_to_last_page() {
        let mut c = demo_controller();
        c.goto_page(u64::MAX);
        c.wait_idle(TIMEOUT).unwrap();
        let s = c.state();
        assert_eq!(s.window.page, 3);
        assert_eq!(ids(s), vec!["21", "22", "23"]);
        assert!(!s.window.has_next());
    }

    #[test]
    fn empty_table_has_columns_and_one_page() {
        let mut c = TableViewController::new(Arc::new(MemoryStore::with_survey_tables()));
        c.refresh();
        c.wait_idle(TIMEOUT).unwrap();
        let s = c.state();
        assert!(s.rows.is_empty());
        assert!(!s.columns.is_empty());
        assert_eq!(s.window.label(), "Page 1 of 1");
        assert!(!s.window.has_next());
        assert!(!s.window.has_prev());
    }

    #[test]
    fn reset_restores_defaults_and_drops_in_flight_fetch() {
        let mut c = demo_controller();
        c.select_kind(EntityKind::Parent);
        c.wait_idle(TIMEOUT).unwrap();

        c.refresh();
        c.reset();
        assert_eq!(c.state(), &ViewState::default());
        let result = c.wait(TIMEOUT);
        assert!(matches!(result, Some(Err(ViewError::StaleResponse { .. }))));
        assert_eq!(c.state(), &ViewState::default());
    }

    #[test]
    fn store_errors_map_to_view_errors() {
        assert_eq!(
            ViewError::from(StoreError::SchemaMismatch("x".to_string())),
            ViewError::SchemaMismatch("x".to_string())
        );
        assert_eq!(
            ViewError::from(StoreError::Query("y".to_string())),
            ViewError::NetworkFailure("y".to_string())
        );
    }
}
