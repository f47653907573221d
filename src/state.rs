use std::path::Path;
use std::time::Instant;

use crate::color::ColorScale;
use crate::config::Config;
use crate::data::{MatchResult, Query};
use crate::session::{PasswordGate, Session};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Outcome of the last "Find" click as shown in the result box.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultDisplay {
    /// Nothing looked up yet.
    Prompt,
    Found(MatchResult),
    NoMatch,
}

impl ResultDisplay {
    pub fn text(&self) -> String {
        match self {
            ResultDisplay::Prompt => {
                "Enter values and click 'Find Corresponding Density'".to_string()
            }
            ResultDisplay::Found(m) => format!(
                "Corresponding Density: {:.4} (Distance: {:.4})",
                m.corresponding_density, m.distance
            ),
            ResultDisplay::NoMatch => "No matching data found for the given inputs".to_string(),
        }
    }
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: Config,
    pub gate: PasswordGate,
    pub session: Session,

    /// Raw text of the query inputs.
    pub density_input: String,
    pub temperature_input: String,
    /// Text of the login form.
    pub password_input: String,

    pub result: ResultDisplay,

    /// Colour scale over the loaded corresponding densities.
    pub color_scale: Option<ColorScale>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let gate = PasswordGate::new(config.password.clone(), config.session_timeout());
        Self {
            config,
            gate,
            session: Session::new(),
            density_input: String::new(),
            temperature_input: String::new(),
            password_input: String::new(),
            result: ResultDisplay::Prompt,
            color_scale: None,
            status_message: None,
        }
    }

    /// Load a file into the session. Any failure leaves no dataset behind.
    pub fn load_path(&mut self, path: &Path) {
        self.result = ResultDisplay::Prompt;
        match self.session.load_path(path, self.config.max_source_bytes) {
            Ok(dataset) => {
                self.color_scale = dataset
                    .corresponding_density_range()
                    .map(|(lo, hi)| ColorScale::new(lo, hi));
                self.status_message = None;
            }
            Err(e) => {
                self.color_scale = None;
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Parse the inputs and run the lookup.
    pub fn find(&mut self) {
        if self.session.dataset().is_none() {
            self.status_message = Some("Please load a data file first!".to_string());
            return;
        }
        match Query::parse(&self.density_input, &self.temperature_input) {
            Ok(query) => {
                self.result = match self.session.lookup(query) {
                    Some(m) => ResultDisplay::Found(m),
                    None => ResultDisplay::NoMatch,
                };
                self.status_message = None;
            }
            Err(e) => {
                log::warn!("rejected query input: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    pub fn login(&mut self, now: Instant) {
        let attempt = std::mem::take(&mut self.password_input);
        if self.session.authenticate(&self.gate, &attempt, now) {
            self.status_message = None;
        } else {
            self.status_message = Some("Invalid password. Access denied.".to_string());
        }
    }

    pub fn logout(&mut self) {
        self.session.logout();
        self.result = ResultDisplay::Prompt;
        self.color_scale = None;
        self.status_message = None;
    }

    /// Whether the main view may be shown. Resets the view when the session
    /// has just expired.
    pub fn check_access(&mut self, now: Instant) -> bool {
        let had_login = self.session.has_login();
        if self.session.is_authenticated(&self.gate, now) {
            return true;
        }
        if had_login {
            self.logout();
            self.status_message = Some("Session expired. Please login again.".to_string());
        }
        false
    }
}
