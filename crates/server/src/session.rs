//! Session Management
//!
//! Holds the live dialogue sessions served over HTTP. Each session sits
//! behind its own async mutex, so two requests for the same session are
//! handled one after the other while different sessions run concurrently.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, Mutex};

use voice_assistant_agent::{AgentConfig, DialogueServices, DialogueSession};
use voice_assistant_config::ServerConfig;

use crate::ServerError;

/// A dialogue session plus bookkeeping the manager needs without locking it
pub struct SessionHandle {
    /// Session ID
    pub id: String,
    dialogue: Mutex<DialogueSession>,
    created_at: Instant,
    last_activity: RwLock<Instant>,
}

impl SessionHandle {
    fn new(id: String, dialogue: DialogueSession) -> Self {
        let now = Instant::now();
        Self {
            id,
            dialogue: Mutex::new(dialogue),
            created_at: now,
            last_activity: RwLock::new(now),
        }
    }

    /// Exclusive access to the dialogue; waits while another request holds it
    pub async fn lock(&self) -> tokio::sync::MutexGuard<'_, DialogueSession> {
        self.touch();
        self.dialogue.lock().await
    }

    /// Update last activity
    pub fn touch(&self) {
        *self.last_activity.write() = Instant::now();
    }

    /// Check if session is expired
    pub fn is_expired(&self, timeout: Duration) -> bool {
        self.last_activity.read().elapsed() > timeout
    }

    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Destroy the dialogue once no request holds it
    fn close(self: Arc<Self>) {
        match Arc::try_unwrap(self) {
            Ok(handle) => handle.dialogue.into_inner().destroy(),
            Err(shared) => {
                tracing::info!(session_id = %shared.id, "Session closed while a request is in flight");
            },
        }
    }
}

/// Session manager
pub struct SessionManager {
    sessions: RwLock<HashMap<String, Arc<SessionHandle>>>,
    services: DialogueServices,
    agent_config: AgentConfig,
    max_sessions: usize,
    session_timeout: Duration,
    cleanup_interval: Duration,
}

impl SessionManager {
    /// Create a new session manager with default limits
    pub fn new(services: DialogueServices, agent_config: AgentConfig) -> Self {
        Self::with_config(services, agent_config, &ServerConfig::default())
    }

    /// Create a session manager with limits from the server config
    pub fn with_config(services: DialogueServices, agent_config: AgentConfig, server: &ServerConfig) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            services,
            agent_config,
            max_sessions: server.max_sessions,
            session_timeout: Duration::from_secs(server.session_timeout_secs),
            cleanup_interval: Duration::from_secs(server.cleanup_interval_secs),
        }
    }

    /// Start a background task that periodically removes expired sessions
    ///
    /// Send `true` on the returned channel to stop the task.
    pub fn start_cleanup_task(self: &Arc<Self>) -> watch::Sender<bool> {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let manager = Arc::clone(self);
        let interval = manager.cleanup_interval;

        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(interval);
            interval_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        let removed = manager.cleanup_expired();
                        if removed > 0 {
                            tracing::info!(
                                "Session cleanup: removed {} expired sessions ({} remaining)",
                                removed,
                                manager.count()
                            );
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            tracing::info!("Session cleanup task shutting down");
                            break;
                        }
                    }
                }
            }
        });

        shutdown_tx
    }

    /// Create a new session
    pub fn create(&self) -> Result<Arc<SessionHandle>, ServerError> {
        let mut sessions = self.sessions.write();

        if sessions.len() >= self.max_sessions {
            self.cleanup_expired_internal(&mut sessions);

            if sessions.len() >= self.max_sessions {
                tracing::warn!(max_sessions = self.max_sessions, "Session capacity reached");
                return Err(ServerError::CapacityReached);
            }
        }

        let id = uuid::Uuid::new_v4().to_string();
        let dialogue = DialogueSession::new(id.clone(), self.agent_config.clone(), self.services.clone());
        let handle = Arc::new(SessionHandle::new(id.clone(), dialogue));
        sessions.insert(id, handle.clone());

        metrics::gauge!("active_sessions").set(sessions.len() as f64);
        Ok(handle)
    }

    /// Get a session by ID
    pub fn get(&self, id: &str) -> Option<Arc<SessionHandle>> {
        self.sessions.read().get(id).cloned()
    }

    /// Remove and destroy a session; false if it did not exist
    pub fn remove(&self, id: &str) -> bool {
        let removed = {
            let mut sessions = self.sessions.write();
            let removed = sessions.remove(id);
            metrics::gauge!("active_sessions").set(sessions.len() as f64);
            removed
        };

        match removed {
            Some(handle) => {
                handle.close();
                true
            },
            None => false,
        }
    }

    /// Get active session count
    pub fn count(&self) -> usize {
        self.sessions.read().len()
    }

    /// Remove expired sessions, returning how many were removed
    pub fn cleanup_expired(&self) -> usize {
        let mut sessions = self.sessions.write();
        self.cleanup_expired_internal(&mut sessions)
    }

    fn cleanup_expired_internal(&self, sessions: &mut HashMap<String, Arc<SessionHandle>>) -> usize {
        let timeout = self.session_timeout;
        let expired: Vec<String> = sessions
            .iter()
            .filter(|(_, s)| s.is_expired(timeout))
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            if let Some(handle) = sessions.remove(id) {
                tracing::info!(session_id = %id, "Expired session");
                handle.close();
            }
        }

        metrics::gauge!("active_sessions").set(sessions.len() as f64);
        expired.len()
    }

    /// List all session IDs
    pub fn list(&self) -> Vec<String> {
        self.sessions.read().keys().cloned().collect()
    }

    pub fn model_name(&self) -> &str {
        self.services.requester.model_name()
    }
}
