use std::fmt;

use crate::api::Chokepoint;

use super::Generation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Info,
    Success,
    Warning,
    Danger,
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlertLevel::Info => "info",
            AlertLevel::Success => "ok",
            AlertLevel::Warning => "warning",
            AlertLevel::Danger => "danger",
        };
        f.write_str(s)
    }
}

/// User-facing notice produced while populating overlays
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub level: AlertLevel,
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(level: AlertLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(AlertLevel::Info, title, message)
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(AlertLevel::Warning, title, message)
    }

    pub fn danger(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(AlertLevel::Danger, title, message)
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

/// What a route calculation drew, and what the caller may do next
#[derive(Debug, Clone)]
pub struct RouteSummary {
    pub generation: Generation,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub length: Option<f64>,
    pub units: Option<String>,
    pub alerts: Vec<Alert>,
    /// Chokepoints the route passes, for an on-demand ship lookup
    pub chokepoints: Vec<Chokepoint>,
    /// Disaster ids to check for collisions; empty when the check is disabled
    pub collision_targets: Vec<String>,
}

impl RouteSummary {
    pub(super) fn new(generation: Generation) -> Self {
        Self {
            generation,
            origin: None,
            destination: None,
            length: None,
            units: None,
            alerts: Vec::new(),
            chokepoints: Vec::new(),
            collision_targets: Vec::new(),
        }
    }

    /// `10543.2 km`, or `unknown` when the backend sent no length
    pub fn length_label(&self) -> String {
        match self.length {
            Some(length) => format!("{length:.1} {}", self.units.as_deref().unwrap_or("km")),
            None => "unknown".to_string(),
        }
    }
}

pub(super) fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
