use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use thiserror::Error;

use crate::capabilities::{CapabilityKind, ImageHandle};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::gate::AttemptTracker;

// --- Coordinate: validated, NaN-safe ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Coordinate {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CoordinateError {
    #[error("Latitude {0} is out of valid range [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("Longitude {0} is out of valid range [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("Coordinate is not a finite number")]
    NonFinite,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoordinateError> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(CoordinateError::NonFinite);
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(CoordinateError::LongitudeOutOfRange(lng));
        }
        Ok(Self { lat, lng })
    }

    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.lat
    }

    #[must_use]
    pub const fn lng(&self) -> f64 {
        self.lng
    }
}

/// `lat,lng` exactly as the map search query expects it.
impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        self.lat.to_bits() == other.lat.to_bits() && self.lng.to_bits() == other.lng.to_bits()
    }
}

impl Eq for Coordinate {}

// --- Chat entries ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Text,
    Image,
    Location,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryPayload {
    Text(String),
    Image(ImageHandle),
    Location(Coordinate),
}

impl EntryPayload {
    #[must_use]
    pub const fn kind(&self) -> EntryKind {
        match self {
            Self::Text(_) => EntryKind::Text,
            Self::Image(_) => EntryKind::Image,
            Self::Location(_) => EntryKind::Location,
        }
    }
}

/// One message in the log. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    id: EntryId,
    payload: EntryPayload,
    created_at: DateTime<Utc>,
}

impl ChatEntry {
    #[must_use]
    pub const fn id(&self) -> EntryId {
        self.id
    }

    #[must_use]
    pub const fn kind(&self) -> EntryKind {
        self.payload.kind()
    }

    #[must_use]
    pub const fn payload(&self) -> &EntryPayload {
        &self.payload
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn location(&self) -> Option<Coordinate> {
        match &self.payload {
            EntryPayload::Location(coord) => Some(*coord),
            _ => None,
        }
    }
}

/// Append-only, in-memory ordered list of chat entries. Only `append`
/// creates entries, so ids stay sorted.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    entries: Vec<ChatEntry>,
    next_id: u64,
}

impl MessageLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Text payloads are trimmed and dropped when blank.
    pub fn append(&mut self, payload: EntryPayload, at: DateTime<Utc>) -> Option<EntryId> {
        let payload = match payload {
            EntryPayload::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return None;
                }
                EntryPayload::Text(trimmed.to_owned())
            }
            other => other,
        };

        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries.push(ChatEntry {
            id,
            payload,
            created_at: at,
        });
        Some(id)
    }

    #[must_use]
    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, id: EntryId) -> Option<&ChatEntry> {
        self.entries
            .binary_search_by_key(&id, ChatEntry::id)
            .ok()
            .map(|index| &self.entries[index])
    }

    #[must_use]
    pub fn last(&self) -> Option<&ChatEntry> {
        self.entries.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// --- Session & screens ---

#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    pub username: String,
    pub log: MessageLog,
    pub draft: String,
    pub attempts: AttemptTracker,
}

impl ChatSession {
    pub fn start(username: impl Into<String>, welcome: &str, at: DateTime<Utc>) -> Self {
        let mut log = MessageLog::new();
        log.append(EntryPayload::Text(welcome.to_owned()), at);
        Self {
            username: username.into(),
            log,
            draft: String::new(),
            attempts: AttemptTracker::default(),
        }
    }

    /// Submits the draft; it is cleared only when an entry was appended.
    pub fn submit_draft(&mut self, at: DateTime<Utc>) -> Option<EntryId> {
        if self.draft.trim().is_empty() {
            return None;
        }
        self.log
            .append(EntryPayload::Text(std::mem::take(&mut self.draft)), at)
    }

    #[must_use]
    pub fn is_busy(&self, kind: CapabilityKind) -> bool {
        self.attempts.is_busy(kind)
    }
}

#[derive(Debug, Clone, Default)]
pub enum Screen {
    #[default]
    Login,
    Chat(Box<ChatSession>),
}

#[derive(Debug, Clone, Default)]
pub struct Model {
    pub config: AppConfig,
    pub screen: Screen,
    pub notices: VecDeque<AppError>,
}

impl Model {
    #[must_use]
    pub fn session(&self) -> Option<&ChatSession> {
        match &self.screen {
            Screen::Chat(session) => Some(session.as_ref()),
            Screen::Login => None,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut ChatSession> {
        match &mut self.screen {
            Screen::Chat(session) => Some(session.as_mut()),
            Screen::Login => None,
        }
    }

    pub fn start_session(&mut self, username: impl Into<String>, at: DateTime<Utc>) {
        let session = ChatSession::start(username, &self.config.welcome_message, at);
        self.screen = Screen::Chat(Box::new(session));
    }

    /// Drops the log, the draft and any in-flight attempts.
    pub fn end_session(&mut self) {
        self.screen = Screen::Login;
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self.screen, Screen::Chat(_))
    }

    pub fn push_notice(&mut self, error: AppError) {
        self.notices.push_back(error);
    }

    pub fn dismiss_notice(&mut self) -> Option<AppError> {
        self.notices.pop_front()
    }

    #[must_use]
    pub fn active_notice(&self) -> Option<&AppError> {
        self.notices.front()
    }
}
