//! In-memory session store with TTL expiry.
//!
//! Each browser session owns an essay submission and a rubric. Sessions are
//! identified by an explicit `session_id` carried in requests and expire
//! after a configurable idle period (30 minutes by default). The store is
//! the only cross-request shared state in the service.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::rubric::Rubric;
use crate::state::AppState;
use crate::submission::EssaySubmission;

/// Per-session mutable state. Overwritten/appended by the request that
/// owns it; never shared across sessions.
#[derive(Debug, Default)]
pub struct Session {
    pub submission: Option<EssaySubmission>,
    pub rubric: Rubric,
}

struct Entry {
    session: Session,
    last_touched: Instant,
}

#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Entry>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Creates a fresh session and returns its id.
    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        let mut map = self.inner.write().await;
        let now = Instant::now();
        purge_expired(&mut map, self.ttl, now);
        map.insert(
            id,
            Entry {
                session: Session::default(),
                last_touched: now,
            },
        );
        id
    }

    /// Runs `f` against the session, refreshing its TTL.
    /// Unknown or expired ids are `NotFound`.
    pub async fn with_session<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Session) -> T,
    ) -> Result<T, AppError> {
        let mut map = self.inner.write().await;
        let now = Instant::now();
        purge_expired(&mut map, self.ttl, now);

        let entry = map
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found or expired")))?;
        entry.last_touched = now;
        Ok(f(&mut entry.session))
    }
}

fn purge_expired(map: &mut HashMap<Uuid, Entry>, ttl: Duration, now: Instant) {
    map.retain(|_, entry| now.duration_since(entry.last_touched) <= ttl);
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
}

/// POST /api/v1/session
pub async fn handle_create_session(State(state): State<AppState>) -> Json<CreateSessionResponse> {
    let session_id = state.sessions.create().await;
    Json(CreateSessionResponse { session_id })
}
