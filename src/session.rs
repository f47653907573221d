//! Per-session context: the currently loaded dataset, the last lookup and the
//! password gate deadline. Handlers receive a `&mut Session` instead of
//! reaching for shared global state.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::data::{self, Dataset, LookupError, MatchResult, Query, SourceFormat};

/// Optional password gate.
///
/// This is a plain string comparison used to keep casual visitors out of a
/// shared desktop. It is not a credential store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordGate {
    password: Option<String>,
    timeout: Duration,
}

impl PasswordGate {
    pub fn new(password: Option<String>, timeout: Duration) -> Self {
        // An empty password in the config means "no gate".
        let password = password.filter(|p| !p.is_empty());
        Self { password, timeout }
    }

    pub fn disabled() -> Self {
        Self::new(None, Duration::ZERO)
    }

    pub fn is_enabled(&self) -> bool {
        self.password.is_some()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn accepts(&self, attempt: &str) -> bool {
        self.password.as_deref().is_some_and(|p| p == attempt)
    }
}

/// The query and outcome of the most recent lookup, kept for plotting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LastLookup {
    pub query: Query,
    pub result: Option<MatchResult>,
}

/// How long a successful login lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Login {
    Until(Instant),
    /// The timeout reaches past what `Instant` can represent.
    NoExpiry,
}

#[derive(Debug, Default)]
pub struct Session {
    dataset: Option<Arc<Dataset>>,
    source_name: Option<String>,
    last_lookup: Option<LastLookup>,
    login: Option<Login>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dataset(&self) -> Option<&Arc<Dataset>> {
        self.dataset.as_ref()
    }

    /// Display name of the loaded source (file name or upload name).
    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    pub fn last_lookup(&self) -> Option<&LastLookup> {
        self.last_lookup.as_ref()
    }

    /// Load a file, replacing the current dataset.
    ///
    /// On any failure the previous dataset is dropped, so a stale table is
    /// never looked up against.
    pub fn load_path(&mut self, path: &Path, max_bytes: u64) -> Result<Arc<Dataset>, LookupError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let result = data::load_file(path, max_bytes);
        self.replace(name, result)
    }

    /// Load an in-memory source, replacing the current dataset.
    pub fn load_bytes(
        &mut self,
        name: &str,
        bytes: &[u8],
        format: SourceFormat,
        max_bytes: u64,
    ) -> Result<Arc<Dataset>, LookupError> {
        let result = data::load_bytes(bytes, format, max_bytes);
        self.replace(name.to_string(), result)
    }

    fn replace(
        &mut self,
        name: String,
        result: Result<Dataset, LookupError>,
    ) -> Result<Arc<Dataset>, LookupError> {
        self.last_lookup = None;
        match result {
            Ok(dataset) => {
                log::info!(
                    "loaded {name}: {} rows, columns {:?}",
                    dataset.len(),
                    dataset.columns()
                );
                let dataset = Arc::new(dataset);
                self.dataset = Some(Arc::clone(&dataset));
                self.source_name = Some(name);
                Ok(dataset)
            }
            Err(e) => {
                log::error!("failed to load {name}: {e:#}");
                self.clear_dataset();
                Err(e)
            }
        }
    }

    pub fn clear_dataset(&mut self) {
        self.dataset = None;
        self.source_name = None;
        self.last_lookup = None;
    }

    /// Run a lookup against the current dataset and remember it.
    pub fn lookup(&mut self, query: Query) -> Option<MatchResult> {
        let result = data::find_nearest(self.dataset.as_deref(), &query);
        self.last_lookup = Some(LastLookup { query, result });
        result
    }

    /// Check `attempt` against the gate, starting a session on success.
    pub fn authenticate(&mut self, gate: &PasswordGate, attempt: &str, now: Instant) -> bool {
        if gate.accepts(attempt) {
            let login = match now.checked_add(gate.timeout()) {
                Some(until) => Login::Until(until),
                None => {
                    log::warn!("session timeout {:?} is out of range, session will not expire", gate.timeout());
                    Login::NoExpiry
                }
            };
            self.login = Some(login);
            log::info!("session authenticated for {:?}", gate.timeout());
            true
        } else {
            log::warn!("rejected password attempt");
            false
        }
    }

    /// Whether the session may use the app. A disabled gate always passes.
    /// An expired session is logged out as a side effect.
    pub fn is_authenticated(&mut self, gate: &PasswordGate, now: Instant) -> bool {
        if !gate.is_enabled() {
            return true;
        }
        match self.login {
            Some(Login::NoExpiry) => true,
            Some(Login::Until(until)) if now < until => true,
            Some(Login::Until(_)) => {
                log::info!("session expired");
                self.logout();
                false
            }
            None => false,
        }
    }

    /// Whether a login is on record, expired or not.
    pub fn has_login(&self) -> bool {
        self.login.is_some()
    }

    /// Time left before the session expires, `None` when not authenticated
    /// or when the session does not expire.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        match self.login {
            Some(Login::Until(until)) => until.checked_duration_since(now),
            _ => None,
        }
    }

    /// End the session. The dataset goes with it.
    pub fn logout(&mut self) {
        self.login = None;
        self.clear_dataset();
    }
}
