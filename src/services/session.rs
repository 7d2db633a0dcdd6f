// ZDB-34: In-memory session state
// Transcript is append-only, the report slot is replace-only

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::info;
use uuid::Uuid;

use crate::models::message::Message;
use crate::models::report::AggregatedReport;
use crate::models::scan::{ScanTarget, ScanType};

/// Where a scan currently sits in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStage {
    Idle,
    DomainAnalyzed,
    ContentFetched,
    ContentAnalyzed,
    FetchFailed,
    DigestBuilt,
    Summarizing,
    Completed,
    Failed,
}

impl ScanStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanStage::Completed | ScanStage::Failed)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InFlightScan {
    pub scan_id: Uuid,
    pub url: String,
    pub scan_type: ScanType,
    pub stage: ScanStage,
    pub started_at: DateTime<Utc>,
}

/// Read-only view handed to the HTTP layer
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub messages: Vec<Message>,
    pub current_report: Option<AggregatedReport>,
    pub scans_in_flight: Vec<InFlightScan>,
    pub awaiting_reply: bool,
}

#[derive(Debug)]
pub struct SessionContext {
    id: Uuid,
    created_at: DateTime<Utc>,
    messages: Vec<Message>,
    current_report: Option<AggregatedReport>,
    in_flight: HashMap<Uuid, InFlightScan>,
    pending_replies: usize,
    last_active: Instant,
}

pub type SharedSession = Arc<RwLock<SessionContext>>;

impl SessionContext {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            messages: Vec::new(),
            current_report: None,
            in_flight: HashMap::new(),
            pending_replies: 0,
            last_active: Instant::now(),
        }
    }

    pub fn shared(self) -> SharedSession {
        Arc::new(RwLock::new(self))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn current_report(&self) -> Option<&AggregatedReport> {
        self.current_report.as_ref()
    }

    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
        self.touch();
    }

    pub fn replace_report(&mut self, report: AggregatedReport) {
        self.current_report = Some(report);
        self.touch();
    }

    fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    /// Time since the transcript, report or scan set last changed
    pub fn idle_for(&self) -> Duration {
        self.last_active.elapsed()
    }

    /// A scan or chat reply is still pending
    pub fn is_busy(&self) -> bool {
        self.is_scanning() || self.is_awaiting_reply()
    }

    // =============================================================================
    // IN-FLIGHT TRACKING
    // =============================================================================

    /// Register a scan; returns its id
    pub fn begin_scan(&mut self, target: &ScanTarget) -> Uuid {
        let scan_id = Uuid::new_v4();
        self.in_flight.insert(
            scan_id,
            InFlightScan {
                scan_id,
                url: target.url().to_string(),
                scan_type: target.scan_type(),
                stage: ScanStage::Idle,
                started_at: Utc::now(),
            },
        );
        self.touch();
        scan_id
    }

    pub fn set_stage(&mut self, scan_id: Uuid, stage: ScanStage) {
        if let Some(scan) = self.in_flight.get_mut(&scan_id) {
            scan.stage = stage;
        }
    }

    pub fn stage_of(&self, scan_id: Uuid) -> Option<ScanStage> {
        self.in_flight.get(&scan_id).map(|s| s.stage)
    }

    /// Clears the in-progress indicator for a scan
    pub fn finish_scan(&mut self, scan_id: Uuid) -> Option<InFlightScan> {
        self.touch();
        self.in_flight.remove(&scan_id)
    }

    pub fn is_scanning(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Scans still running, oldest first
    pub fn scans_in_flight(&self) -> Vec<InFlightScan> {
        let mut scans: Vec<InFlightScan> = self.in_flight.values().cloned().collect();
        scans.sort_by_key(|s| s.started_at);
        scans
    }

    pub fn begin_reply(&mut self) {
        self.pending_replies += 1;
        self.touch();
    }

    pub fn finish_reply(&mut self) {
        self.pending_replies = self.pending_replies.saturating_sub(1);
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.pending_replies > 0
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            created_at: self.created_at,
            messages: self.messages.clone(),
            current_report: self.current_report.clone(),
            scans_in_flight: self.scans_in_flight(),
            awaiting_reply: self.is_awaiting_reply(),
        }
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// SESSION STORE
// =============================================================================

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session limit of {0} reached")]
    CapacityReached(usize),
}

/// Bounds on the in-memory store
#[derive(Debug, Clone, Copy)]
pub struct SessionLimits {
    /// Idle sessions older than this are evicted unless a scan or reply is pending
    pub idle_ttl: Duration,
    pub max_sessions: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            idle_ttl: Duration::from_secs(60 * 60),
            max_sessions: 10_000,
        }
    }
}

/// Sessions keyed by id. Cloning shares the same map.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SharedSession>>>,
    limits: SessionLimits,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: SessionLimits) -> Self {
        Self {
            sessions: Arc::default(),
            limits,
        }
    }

    /// Register a new session. A full store is swept once before giving up.
    pub async fn create(&self) -> Result<(Uuid, SharedSession), SessionError> {
        if self.len().await >= self.limits.max_sessions {
            self.evict_idle().await;
        }

        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.limits.max_sessions {
            return Err(SessionError::CapacityReached(self.limits.max_sessions));
        }

        let context = SessionContext::new();
        let id = context.id();
        let shared = context.shared();
        sessions.insert(id, shared.clone());
        Ok((id, shared))
    }

    /// Drop sessions idle past the TTL with nothing pending. Sessions locked
    /// by a writer at sweep time are kept for the next pass.
    pub async fn evict_idle(&self) -> usize {
        let ttl = self.limits.idle_ttl;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| match session.try_read() {
            Ok(context) => context.is_busy() || context.idle_for() < ttl,
            Err(_) => true,
        });
        before - sessions.len()
    }

    /// Periodic eviction on the current runtime
    pub fn spawn_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let evicted = store.evict_idle().await;
                if evicted > 0 {
                    info!("Evicted {} idle sessions", evicted);
                }
            }
        })
    }

    pub async fn get(&self, id: Uuid) -> Option<SharedSession> {
        self.sessions.read().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
