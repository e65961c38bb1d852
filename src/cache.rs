use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use crate::error::AppError;
use crate::feed::FeedSource;
use crate::ingest::build_report;
use crate::models::CaseTable;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// What a caller gets back from the cache.
#[derive(Debug, Clone)]
pub enum TableSnapshot {
    Ready {
        table: Arc<CaseTable>,
        fetched_at: DateTime<Utc>,
    },
    /// The last refresh failed. `stale` is the previous good table, if any;
    /// it is never handed out as current.
    Unavailable {
        error: Arc<AppError>,
        stale: Option<Arc<CaseTable>>,
    },
}

impl TableSnapshot {
    pub fn table(&self) -> Option<&Arc<CaseTable>> {
        match self {
            TableSnapshot::Ready { table, .. } => Some(table),
            TableSnapshot::Unavailable { .. } => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, TableSnapshot::Ready { .. })
    }
}

#[derive(Default)]
struct CacheState {
    table: Option<Arc<CaseTable>>,
    /// Time of the last refresh attempt, successful or not.
    fetched_at: Option<DateTime<Utc>>,
    error: Option<Arc<AppError>>,
    stale: Option<Arc<CaseTable>>,
}

impl CacheState {
    fn is_due(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        match self.fetched_at {
            None => true,
            Some(at) => now - at >= ttl,
        }
    }

    fn snapshot(&self) -> TableSnapshot {
        match (&self.table, self.fetched_at) {
            (Some(table), Some(fetched_at)) => TableSnapshot::Ready {
                table: Arc::clone(table),
                fetched_at,
            },
            _ => TableSnapshot::Unavailable {
                error: self
                    .error
                    .clone()
                    .unwrap_or_else(|| Arc::new(AppError::Transport("no data fetched yet".into()))),
                stale: self.stale.clone(),
            },
        }
    }
}

/// In-memory holder for the most recent case table.
///
/// Refreshes run under the state lock, so concurrent callers during a miss
/// wait for the one in-flight fetch and then share its table.
pub struct RefreshCache<S, C = SystemClock> {
    source: S,
    clock: C,
    ttl: Duration,
    state: Mutex<CacheState>,
}

impl<S: FeedSource> RefreshCache<S, SystemClock> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self::with_clock(source, SystemClock, ttl)
    }
}

impl<S: FeedSource, C: Clock> RefreshCache<S, C> {
    pub fn with_clock(source: S, clock: C, ttl: Duration) -> Self {
        Self {
            source,
            clock,
            ttl,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub async fn get_table(&self) -> TableSnapshot {
        let mut state = self.state.lock().await;
        let now = self.clock.now();

        if !state.is_due(now, self.ttl) {
            tracing::debug!("Serving cached table");
            return state.snapshot();
        }

        match self.source.fetch().await {
            Ok(records) => {
                let report = build_report(records);
                if !report.warnings.is_empty() {
                    tracing::warn!(
                        "{} field values could not be parsed and were left empty",
                        report.warnings.len()
                    );
                }
                tracing::info!("Refreshed case table with {} rows", report.table.len());

                state.table = Some(Arc::new(report.table));
                state.error = None;
                state.stale = None;
            }
            Err(e) => {
                tracing::error!("Failed to refresh case table: {}", e);

                let previous = state.table.take().or_else(|| state.stale.take());
                state.stale = previous;
                state.error = Some(Arc::new(e));
            }
        }
        state.fetched_at = Some(now);

        state.snapshot()
    }

    /// Force the next [`get_table`](Self::get_table) call to refetch.
    pub async fn invalidate(&self) {
        self.state.lock().await.fetched_at = None;
    }

    pub async fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.state.lock().await.fetched_at
    }
}
