use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::capabilities::CapabilityKind;
use crate::error::{AppError, ErrorSeverity, NoticeAction};
use crate::gate::GateStage;
use crate::model::{ChatEntry, ChatSession, EntryId, EntryKind, EntryPayload, Model, Screen};

pub const CLOCK_FORMAT: &str = "%H:%M";

/// Hour and minute of `at` in the given zone, e.g. `09:05`.
pub fn format_clock_time<Tz>(at: DateTime<Utc>, zone: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    at.with_timezone(zone).format(CLOCK_FORMAT).to_string()
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ViewModel {
    pub screen: ScreenView,
    pub notice: Option<NoticeView>,
    /// Notices queued behind the visible one.
    pub pending_notices: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum ScreenView {
    Login { hint: Option<String> },
    Chat(ChatView),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatView {
    pub username: String,
    pub greeting: String,
    pub entries: Vec<EntryView>,
    pub draft: String,
    pub can_send: bool,
    /// A location fix is being acquired.
    pub is_locating: bool,
    pub location_busy: bool,
    pub camera_busy: bool,
    /// Id of the newest entry; shells scroll to the end when it changes.
    pub scroll_anchor: Option<EntryId>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EntryView {
    pub id: EntryId,
    pub kind: EntryKind,
    pub text: Option<String>,
    pub image_uri: Option<String>,
    pub location_label: Option<String>,
    pub can_open_in_maps: bool,
    pub time: String,
}

impl EntryView {
    pub fn from_entry<Tz>(entry: &ChatEntry, zone: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let (text, image_uri, location_label) = match entry.payload() {
            EntryPayload::Text(text) => (Some(text.clone()), None, None),
            EntryPayload::Image(handle) => (None, Some(handle.uri.clone()), None),
            EntryPayload::Location(coord) => (None, None, Some(coord.to_string())),
        };
        Self {
            id: entry.id(),
            kind: entry.kind(),
            text,
            image_uri,
            can_open_in_maps: location_label.is_some(),
            location_label,
            time: format_clock_time(entry.created_at(), zone),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NoticeView {
    pub title: String,
    pub message: String,
    pub error_code: String,
    pub is_transient: bool,
    /// Trying the same action again can succeed.
    pub is_retryable: bool,
    pub action: Option<NoticeAction>,
    pub action_label: Option<String>,
    pub dismiss_label: String,
}

impl From<&AppError> for NoticeView {
    fn from(e: &AppError) -> Self {
        let action = e.action();
        Self {
            title: e.title().to_string(),
            message: e.user_facing_message(),
            error_code: e.code().to_string(),
            is_transient: e.severity == ErrorSeverity::Transient,
            is_retryable: e.is_retryable(),
            action,
            action_label: action.map(|a| a.label().to_string()),
            dismiss_label: if action.is_some() { "Cancel" } else { "OK" }.to_string(),
        }
    }
}

impl ChatView {
    pub fn from_session<Tz>(session: &ChatSession, zone: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let entries = session
            .log
            .entries()
            .iter()
            .map(|entry| EntryView::from_entry(entry, zone))
            .collect();

        Self {
            greeting: format!("Welcome, {}", session.username),
            username: session.username.clone(),
            entries,
            draft: session.draft.clone(),
            can_send: !session.draft.trim().is_empty(),
            is_locating: session.attempts.stage(CapabilityKind::Location)
                == Some(GateStage::Invoking),
            location_busy: session.is_busy(CapabilityKind::Location),
            camera_busy: session.is_busy(CapabilityKind::Camera),
            scroll_anchor: session.log.last().map(ChatEntry::id),
        }
    }
}

impl ViewModel {
    /// Builds the view with local wall-clock times.
    #[must_use]
    pub fn from_model(model: &Model, login_hint: Option<String>) -> Self {
        Self::from_model_in(model, login_hint, &Local)
    }

    pub fn from_model_in<Tz>(model: &Model, login_hint: Option<String>, zone: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let screen = match &model.screen {
            Screen::Login => ScreenView::Login { hint: login_hint },
            Screen::Chat(session) => ScreenView::Chat(ChatView::from_session(session, zone)),
        };
        Self {
            screen,
            notice: model.active_notice().map(NoticeView::from),
            pending_notices: model.notices.len().saturating_sub(1),
        }
    }
}
