//! Login sessions
//!
//! Issues opaque bearer keys, enforces a single live session per user,
//! and times sessions out after [`SESSION_TIMEOUT`]. Stale entries are
//! reaped by an opportunistic background sweep.

use crate::auction::UserId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

pub type SessionKey = String;
pub type SessionKeyRef<'a> = &'a str;

pub const SESSION_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Minimum wall-clock gap between two expiry sweeps.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("invalid or expired session key")]
    InvalidSession,
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct Session {
    pub(crate) user: UserId,
    pub(crate) expires_at: Instant,
}

impl Session {
    /// Live strictly before `expires_at`; a session expiring exactly
    /// "now" is already gone.
    pub(crate) fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

// The forward and reverse map only ever change together, under one lock,
// so every key in `user_keys` has a matching entry in `sessions`.
#[derive(Default)]
struct SessionMaps {
    sessions: HashMap<SessionKey, Session>,
    user_keys: HashMap<UserId, SessionKey>,
    last_sweep: Option<Instant>,
}

impl SessionMaps {
    fn sweep_due(&mut self, now: Instant) -> bool {
        let due = self
            .last_sweep
            .map_or(true, |at| now.duration_since(at) >= SWEEP_INTERVAL);
        if due {
            self.last_sweep = Some(now);
        }
        due
    }
}

/// Shared handle to the session table. Cheap to clone.
#[derive(Clone, Default)]
pub struct SessionManager {
    maps: Arc<Mutex<SessionMaps>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh session for `user`, revoking any session they
    /// already hold. Both maps change in one lock scope, so a concurrent
    /// `validate` sees either the old key or the new one, never both.
    pub fn login(&self, user: UserId) -> SessionKey {
        let key = fresh_key();
        let now = Instant::now();
        let sweep = {
            let mut maps = self.maps.lock();
            if let Some(old) = maps.user_keys.remove(&user) {
                maps.sessions.remove(&old);
            }
            maps.sessions.insert(
                key.clone(),
                Session {
                    user,
                    expires_at: now + SESSION_TIMEOUT,
                },
            );
            maps.user_keys.insert(user, key.clone());
            maps.sweep_due(now)
        };
        debug!(user, "login");
        if sweep {
            self.spawn_sweep();
        }
        key
    }

    /// Resolve a bearer key to its user. Only keys expiring strictly in
    /// the future count.
    pub fn validate(&self, key: SessionKeyRef) -> Result<UserId, SessionError> {
        let now = Instant::now();
        let (res, sweep) = {
            let mut maps = self.maps.lock();
            let session = maps.sessions.get(key).copied();
            match session {
                Some(session) if session.is_live(now) => (Ok(session.user), false),
                _ => (Err(SessionError::InvalidSession), maps.sweep_due(now)),
            }
        };
        if sweep {
            self.spawn_sweep();
        }
        res
    }

    /// Hand the sweep to a background thread; callers never wait for it.
    fn spawn_sweep(&self) {
        let this = self.clone();
        thread::spawn(move || this.sweep());
    }

    fn sweep(&self) {
        let now = Instant::now();
        let mut maps = self.maps.lock();
        let expired: Vec<SessionKey> = maps
            .sessions
            .iter()
            .filter(|(_, session)| !session.is_live(now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            if let Some(session) = maps.sessions.remove(key) {
                maps.user_keys.remove(&session.user);
            }
        }
        if !expired.is_empty() {
            debug!(count = expired.len(), "swept expired sessions");
        }
    }
}

#[cfg(test)]
impl SessionManager {
    pub(crate) fn force_expire(&self, key: SessionKeyRef, ago: Duration) {
        let mut maps = self.maps.lock();
        if let Some(session) = maps.sessions.get_mut(key) {
            session.expires_at = Instant::now() - ago;
        }
    }

    pub(crate) fn sweep_now(&self) {
        self.sweep();
    }

    pub(crate) fn session_count(&self) -> usize {
        self.maps.lock().sessions.len()
    }

    pub(crate) fn user_count(&self) -> usize {
        self.maps.lock().user_keys.len()
    }

    pub(crate) fn contains_key(&self, key: SessionKeyRef) -> bool {
        self.maps.lock().sessions.contains_key(key)
    }

    pub(crate) fn contains_user(&self, user: UserId) -> bool {
        self.maps.lock().user_keys.contains_key(&user)
    }
}

/// 128 opaque random bits, hex-encoded.
fn fresh_key() -> SessionKey {
    format!("{:032x}", rand::random::<u128>())
}
