use serde::{Deserialize, Serialize};

use crate::auth::Password;
use crate::capabilities::{ImageHandle, LinkingResult};
use crate::config::AppConfig;
use crate::gate::{AttemptId, GateStage, Outcome};
use crate::model::{Coordinate, EntryId};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Event {
    Noop,
    Configure(Box<AppConfig>),

    // Auth
    LoginSubmitted {
        username: String,
        password: Password,
    },
    LogoutRequested,

    // Chat
    DraftChanged {
        text: String,
    },
    SendTapped,
    ShareLocationRequested,
    CapturePhotoRequested,
    OpenInMapsRequested {
        entry_id: EntryId,
    },

    // Notices
    NoticeDismissed,
    NoticeActionSelected,

    // Internal: capability resolutions
    #[serde(skip)]
    GateProgressed {
        attempt: AttemptId,
        stage: GateStage,
    },
    #[serde(skip)]
    LocationResolved {
        attempt: AttemptId,
        outcome: Box<Outcome<Coordinate>>,
    },
    #[serde(skip)]
    PhotoResolved {
        attempt: AttemptId,
        outcome: Box<Outcome<ImageHandle>>,
    },
    #[serde(skip)]
    MapOpened(LinkingResult),
    #[serde(skip)]
    SettingsOpened {
        opened: bool,
    },
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::Configure(_) => "configure",
            Self::LoginSubmitted { .. } => "login_submitted",
            Self::LogoutRequested => "logout_requested",
            Self::DraftChanged { .. } => "draft_changed",
            Self::SendTapped => "send_tapped",
            Self::ShareLocationRequested => "share_location_requested",
            Self::CapturePhotoRequested => "capture_photo_requested",
            Self::OpenInMapsRequested { .. } => "open_in_maps_requested",
            Self::NoticeDismissed => "notice_dismissed",
            Self::NoticeActionSelected => "notice_action_selected",
            Self::GateProgressed { .. } => "gate_progressed",
            Self::LocationResolved { .. } => "location_resolved",
            Self::PhotoResolved { .. } => "photo_resolved",
            Self::MapOpened(_) => "map_opened",
            Self::SettingsOpened { .. } => "settings_opened",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::LoginSubmitted { .. }
                | Self::LogoutRequested
                | Self::SendTapped
                | Self::ShareLocationRequested
                | Self::CapturePhotoRequested
                | Self::OpenInMapsRequested { .. }
                | Self::NoticeDismissed
                | Self::NoticeActionSelected
        )
    }
}
