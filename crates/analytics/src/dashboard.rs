//! Dashboard session
//!
//! Holds the enriched table derived from one source snapshot and rebuilds it
//! when the source files change. Readers get an `Arc` to immutable state and
//! never block each other; the rebuild runs at most once per change.

use std::sync::Arc;
use std::time::Instant;

use conso_source::{Catalogs, Fingerprint, LoadStats, SnapshotLoader};
use parking_lot::RwLock;
use tracing::{info, warn};

use crate::enrich::{EnrichStats, EnrichedTable};
use crate::error::Result;
use crate::metrics::{DEFAULT_TOP_LIMIT, MetricsEngine};

/// Immutable state derived from one snapshot
#[derive(Debug)]
pub struct DashboardState {
    fingerprint: Fingerprint,
    load_stats: LoadStats,
    table: Arc<EnrichedTable>,
    catalogs: Arc<Catalogs>,
}

impl DashboardState {
    fn build(loader: &SnapshotLoader) -> Result<Self> {
        let start = Instant::now();
        let snapshot = loader.load()?;
        let table = EnrichedTable::build(&snapshot);

        info!(
            rows = table.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "dashboard state built"
        );

        Ok(Self {
            fingerprint: snapshot.fingerprint,
            load_stats: snapshot.stats,
            table: Arc::new(table),
            catalogs: Arc::new(snapshot.catalogs),
        })
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    pub fn load_stats(&self) -> &LoadStats {
        &self.load_stats
    }

    pub fn enrich_stats(&self) -> EnrichStats {
        self.table.stats()
    }

    pub fn table(&self) -> &EnrichedTable {
        &self.table
    }

    pub fn catalogs(&self) -> &Catalogs {
        &self.catalogs
    }
}

/// Served state plus the fingerprint of the last load attempt
#[derive(Debug)]
struct Session {
    current: Arc<DashboardState>,
    attempted: Fingerprint,
}

impl Session {
    fn new(state: DashboardState) -> Self {
        Self {
            attempted: state.fingerprint.clone(),
            current: Arc::new(state),
        }
    }
}

/// A dashboard session over a set of source files
#[derive(Debug)]
pub struct Dashboard {
    loader: SnapshotLoader,
    top_limit: usize,
    session: RwLock<Session>,
}

impl Dashboard {
    /// Load the sources and build the enriched table
    ///
    /// # Errors
    ///
    /// Fails when a source file is missing or lacks a required column.
    pub fn open(loader: SnapshotLoader) -> Result<Self> {
        let state = DashboardState::build(&loader)?;
        Ok(Self {
            loader,
            top_limit: DEFAULT_TOP_LIMIT,
            session: RwLock::new(Session::new(state)),
        })
    }

    /// Set the leaderboard size of engines handed out by this session
    pub fn with_top_limit(mut self, limit: usize) -> Self {
        self.top_limit = limit;
        self
    }

    /// Current state, rebuilt first if the source files changed
    ///
    /// When the sources cannot be read or reloaded, the previous state is kept.
    /// A failed reload is retried only once the files change again.
    pub fn state(&self) -> Arc<DashboardState> {
        let fingerprint = match self.loader.fingerprint() {
            Ok(fingerprint) => fingerprint,
            Err(e) => {
                warn!(error = %e, "cannot fingerprint sources, keeping current state");
                return self.session.read().current.clone();
            }
        };

        {
            let session = self.session.read();
            if session.attempted == fingerprint {
                return session.current.clone();
            }
        }

        let mut session = self.session.write();
        // another caller may have rebuilt while we waited
        if session.attempted == fingerprint {
            return session.current.clone();
        }

        info!("source files changed, rebuilding");
        match DashboardState::build(&self.loader) {
            Ok(state) => *session = Session::new(state),
            Err(e) => {
                warn!(error = %e, "reload failed, keeping current state");
                session.attempted = fingerprint;
            }
        }
        session.current.clone()
    }

    /// Reload the sources unconditionally
    pub fn refresh(&self) -> Result<Arc<DashboardState>> {
        let state = DashboardState::build(&self.loader)?;
        let mut session = self.session.write();
        *session = Session::new(state);
        Ok(session.current.clone())
    }

    /// Metrics engine over the current state
    pub fn engine(&self) -> MetricsEngine {
        let state = self.state();
        MetricsEngine::new(state.table.clone(), state.catalogs.clone()).with_top_limit(self.top_limit)
    }
}
