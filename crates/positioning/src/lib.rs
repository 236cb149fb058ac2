use serde::Serialize;
use tracing::{debug, warn};

/// Failure reported by the positioning feed, numbered like the browser
/// geolocation API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PositionErrorCode {
    PermissionDenied,
    Unavailable,
    Timeout,
}

impl PositionErrorCode {
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(Self::PermissionDenied),
            2 => Some(Self::Unavailable),
            3 => Some(Self::Timeout),
            _ => None,
        }
    }

    pub fn code(self) -> u16 {
        match self {
            Self::PermissionDenied => 1,
            Self::Unavailable => 2,
            Self::Timeout => 3,
        }
    }

    /// A transient error does not end a running watch.
    pub fn is_transient(self) -> bool {
        matches!(self, Self::Unavailable | Self::Timeout)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSample {
    pub lon: f64,
    pub lat: f64,
    pub accuracy_m: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum PositionState {
    Off,
    Loading,
    #[serde(rename_all = "camelCase")]
    On {
        lon_lat: [f64; 2],
        accuracy_m: Option<f64>,
        /// Last transient error while the position is still shown.
        warning: Option<String>,
        warning_code: Option<PositionErrorCode>,
    },
    Error {
        message: String,
        code: Option<PositionErrorCode>,
    },
}

const UNSUPPORTED_MESSAGE: &str = "Geolocation nicht verfügbar.";
const TRANSIENT_MESSAGE: &str = "Standort kurz nicht verfügbar.";
const FATAL_MESSAGE: &str = "Standort nicht verfügbar.";

/// Follows a device position feed.
///
/// The host owns the feed: it starts watching when `start` is called, feeds
/// every fix to `on_sample` and every failure to `on_error`, and stops
/// watching once `is_watching` turns false.
#[derive(Debug, Clone)]
pub struct PositionTracker {
    state: PositionState,
    watching: bool,
}

impl Default for PositionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionTracker {
    pub fn new() -> Self {
        Self {
            state: PositionState::Off,
            watching: false,
        }
    }

    pub fn state(&self) -> &PositionState {
        &self.state
    }

    pub fn enabled(&self) -> bool {
        matches!(self.state, PositionState::Loading | PositionState::On { .. })
    }

    pub fn is_watching(&self) -> bool {
        self.watching
    }

    pub fn lon_lat(&self) -> Option<[f64; 2]> {
        match self.state {
            PositionState::On { lon_lat, .. } => Some(lon_lat),
            _ => None,
        }
    }

    /// Begins a fresh watch; a running one is reset.
    pub fn start(&mut self) {
        if self.watching {
            debug!("position watch restarted");
        }
        self.watching = true;
        self.state = PositionState::Loading;
    }

    /// The platform has no positioning feed at all.
    pub fn start_unsupported(&mut self) {
        warn!("positioning not supported");
        self.watching = false;
        self.state = PositionState::Error {
            message: UNSUPPORTED_MESSAGE.to_string(),
            code: None,
        };
    }

    pub fn stop(&mut self) {
        self.watching = false;
        self.state = PositionState::Off;
    }

    /// Returns false when the sample arrived after the watch ended.
    pub fn on_sample(&mut self, sample: PositionSample) -> bool {
        if !self.watching {
            debug!("position sample after watch ended");
            return false;
        }
        self.state = PositionState::On {
            lon_lat: [sample.lon, sample.lat],
            accuracy_m: sample.accuracy_m.filter(|a| a.is_finite()),
            warning: None,
            warning_code: None,
        };
        true
    }

    pub fn on_error(&mut self, code: PositionErrorCode, message: Option<&str>) {
        if !self.watching {
            return;
        }
        let message = message.filter(|m| !m.is_empty());
        if code.is_transient()
            && let PositionState::On {
                warning,
                warning_code,
                ..
            } = &mut self.state
        {
            debug!(code = code.code(), "transient position error");
            *warning = Some(message.unwrap_or(TRANSIENT_MESSAGE).to_string());
            *warning_code = Some(code);
            return;
        }
        warn!(code = code.code(), "position error");
        self.state = PositionState::Error {
            message: message.unwrap_or(FATAL_MESSAGE).to_string(),
            code: Some(code),
        };
        // Without a fix nothing keeps the watch alive.
        self.watching = false;
    }
}
