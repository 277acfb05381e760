//! Application state container shared across Axum route handlers.
//!
//! Holds the database connection, the WebSocket manager used as the
//! notification fan-out sink, the stats cache, and the scanner device
//! registry. Wrapped in `Clone` handles throughout; passed into routes via
//! Axum's `State<T>` extractor.

use crate::cache::StatsCache;
use crate::clock::{Clock, SystemClock};
use crate::config;
use crate::scanner::ScannerRegistry;
use crate::ws::WebSocketManager;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Central application state shared across the server.
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    ws: WebSocketManager,
    stats_cache: StatsCache,
    scanner: ScannerRegistry,
}

impl AppState {
    /// Builds state from configuration using the system clock.
    pub fn new(db: DatabaseConnection, ws: WebSocketManager) -> Self {
        Self::with_clock(db, ws, Arc::new(SystemClock))
    }

    /// Builds state around an explicit clock. Tests pass a `ManualClock` so
    /// cache TTLs and scanner sweeps are deterministic.
    pub fn with_clock(db: DatabaseConnection, ws: WebSocketManager, clock: Arc<dyn Clock>) -> Self {
        let stats_cache = StatsCache::new(clock.clone(), config::stats_cache_ttl_seconds());
        let scanner = ScannerRegistry::new(
            clock,
            config::scanner_command_ttl_seconds(),
            config::scanner_offline_after_seconds(),
        );
        Self {
            db,
            ws,
            stats_cache,
            scanner,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn ws(&self) -> &WebSocketManager {
        &self.ws
    }

    pub fn stats_cache(&self) -> &StatsCache {
        &self.stats_cache
    }

    pub fn scanner(&self) -> &ScannerRegistry {
        &self.scanner
    }

    /// Returns a cloned copy of the database connection.
    ///
    /// Useful for async contexts or spawning tasks that require ownership.
    pub fn db_clone(&self) -> DatabaseConnection {
        self.db.clone()
    }

    /// Returns a cloned instance of the `WebSocketManager`.
    pub fn ws_clone(&self) -> WebSocketManager {
        self.ws.clone()
    }
}
