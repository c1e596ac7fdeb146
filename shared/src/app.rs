use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::auth::{Authenticator, Credentials, StaticCredentials};
use crate::capabilities::{Capabilities, CapabilityKind};
use crate::error::{AppError, ErrorKind, NoticeAction};
use crate::event::Event;
use crate::gate::{AttemptId, CapabilityGate, GateStage, GatedCapability, Outcome};
use crate::model::{ChatEntry, EntryPayload, Model};
use crate::view::ViewModel;

pub struct App {
    authenticator: Arc<dyn Authenticator>,
}

impl Default for App {
    fn default() -> Self {
        Self {
            authenticator: Arc::new(StaticCredentials::demo()),
        }
    }
}

impl App {
    #[must_use]
    pub fn with_authenticator(authenticator: impl Authenticator + 'static) -> Self {
        Self {
            authenticator: Arc::new(authenticator),
        }
    }

    /// Runs one gated attempt in the background and reports its outcome
    /// through `resolved`.
    fn spawn_attempt<C, R>(
        caps: &Capabilities,
        attempt: AttemptId,
        capability: C,
        options: C::Options,
        explain: bool,
        resolved: R,
    ) where
        C: GatedCapability + 'static,
        R: FnOnce(AttemptId, Outcome<C::Output>) -> Event + Send + 'static,
    {
        let gate = CapabilityGate::new(caps.permissions.clone(), caps.dialog.clone());
        caps.compose.spawn(move |context| async move {
            let progress =
                |stage: GateStage| context.update_app(Event::GateProgressed { attempt, stage });
            let outcome = gate
                .invoke(attempt, &capability, options, explain, progress)
                .await;
            context.update_app(resolved(attempt, outcome));
        });
    }

    /// Applies a finished attempt. Outcomes for attempts the session no
    /// longer tracks are dropped.
    fn complete_attempt<T>(
        model: &mut Model,
        kind: CapabilityKind,
        attempt: AttemptId,
        outcome: Outcome<T>,
        into_payload: impl FnOnce(T) -> EntryPayload,
    ) {
        let Some(session) = model.session_mut() else {
            info!(%attempt, capability = %kind, "discarding outcome, no active session");
            return;
        };
        if !session.attempts.finish(kind, attempt) {
            warn!(%attempt, capability = %kind, "discarding stale outcome");
            return;
        }

        info!(%attempt, capability = %kind, outcome = outcome.name(), "attempt finished");
        match outcome {
            Outcome::Success(data) => {
                if let Some(id) = session.log.append(into_payload(data), Utc::now()) {
                    debug!(entry = %id, "entry appended");
                }
            }
            other => {
                if let Some(error) = AppError::from_outcome(kind, &other) {
                    model.push_notice(error);
                }
            }
        }
    }

    /// Reserves the attempt slot for `kind`; `None` when there is no session
    /// or an attempt is already running.
    fn begin_attempt(model: &mut Model, kind: CapabilityKind) -> Option<AttemptId> {
        let Some(session) = model.session_mut() else {
            warn!(capability = %kind, "capability requested without a session");
            return None;
        };
        let attempt = session.attempts.begin(kind);
        if attempt.is_none() {
            info!(capability = %kind, "attempt already in flight, ignoring request");
        }
        attempt
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        if event.is_user_initiated() {
            info!(event = event.name(), "user action");
        } else {
            debug!(event = event.name(), "event");
        }

        match event {
            Event::Noop => {}

            Event::Configure(config) => {
                model.config = config.validated();
                caps.render.render();
            }

            Event::LoginSubmitted { username, password } => {
                if model.is_authenticated() {
                    warn!("login submitted while a session is active");
                    return;
                }
                let credentials = Credentials::new(username, password);
                if self.authenticator.verify(&credentials) {
                    info!(username = credentials.username(), "login succeeded");
                    model.start_session(credentials.username(), Utc::now());
                } else {
                    warn!("login rejected");
                    model.push_notice(AppError::new(
                        ErrorKind::Authentication,
                        "credentials rejected",
                    ));
                }
                caps.render.render();
            }

            Event::LogoutRequested => {
                model.end_session();
                caps.render.render();
            }

            Event::DraftChanged { text } => {
                if let Some(session) = model.session_mut() {
                    session.draft = text;
                    caps.render.render();
                }
            }

            Event::SendTapped => {
                let Some(session) = model.session_mut() else {
                    return;
                };
                match session.submit_draft(Utc::now()) {
                    Some(id) => debug!(entry = %id, "text entry appended"),
                    None => debug!("blank draft ignored"),
                }
                caps.render.render();
            }

            Event::ShareLocationRequested => {
                let explain = model.config.explain_before_request;
                let options = model.config.location;
                let Some(attempt) = Self::begin_attempt(model, CapabilityKind::Location) else {
                    return;
                };
                Self::spawn_attempt(
                    caps,
                    attempt,
                    caps.location.clone(),
                    options,
                    explain,
                    |attempt, outcome| Event::LocationResolved {
                        attempt,
                        outcome: Box::new(outcome),
                    },
                );
                caps.render.render();
            }

            Event::CapturePhotoRequested => {
                let explain = model.config.explain_before_request;
                let config = model.config.camera.clone();
                let Some(attempt) = Self::begin_attempt(model, CapabilityKind::Camera) else {
                    return;
                };
                Self::spawn_attempt(
                    caps,
                    attempt,
                    caps.camera.clone(),
                    config,
                    explain,
                    |attempt, outcome| Event::PhotoResolved {
                        attempt,
                        outcome: Box::new(outcome),
                    },
                );
                caps.render.render();
            }

            Event::GateProgressed { attempt, stage } => {
                let Some(session) = model.session_mut() else {
                    return;
                };
                if session.attempts.advance(attempt, stage) {
                    debug!(%attempt, ?stage, "gate progressed");
                    caps.render.render();
                }
            }

            Event::LocationResolved { attempt, outcome } => {
                Self::complete_attempt(
                    model,
                    CapabilityKind::Location,
                    attempt,
                    *outcome,
                    EntryPayload::Location,
                );
                caps.render.render();
            }

            Event::PhotoResolved { attempt, outcome } => {
                Self::complete_attempt(
                    model,
                    CapabilityKind::Camera,
                    attempt,
                    *outcome,
                    EntryPayload::Image,
                );
                caps.render.render();
            }

            Event::OpenInMapsRequested { entry_id } => {
                let coordinate = model
                    .session()
                    .and_then(|session| session.log.get(entry_id))
                    .and_then(ChatEntry::location);
                let Some(coordinate) = coordinate else {
                    warn!(entry = %entry_id, "no location entry to open");
                    return;
                };
                match model.config.map_search_url(coordinate) {
                    Ok(url) => {
                        debug!(%url, "opening map");
                        caps.linking.open_url(url, Event::MapOpened);
                    }
                    Err(e) => {
                        model.push_notice(
                            AppError::new(ErrorKind::Linking, "could not build map url")
                                .with_internal(e.to_string()),
                        );
                        caps.render.render();
                    }
                }
            }

            Event::MapOpened(result) => {
                if let Err(e) = result {
                    warn!(error = %e, "map viewer failed to open");
                    model.push_notice(AppError::from(e));
                    caps.render.render();
                }
            }

            Event::NoticeDismissed => {
                model.dismiss_notice();
                caps.render.render();
            }

            Event::NoticeActionSelected => {
                let action = model.dismiss_notice().and_then(|notice| notice.action());
                if action == Some(NoticeAction::OpenSettings) {
                    caps.permissions
                        .open_settings(|opened| Event::SettingsOpened { opened });
                }
                caps.render.render();
            }

            Event::SettingsOpened { opened } => {
                if !opened {
                    warn!("settings could not be opened");
                }
            }
        }
    }

    fn view(&self, model: &Model) -> ViewModel {
        ViewModel::from_model(model, self.authenticator.hint())
    }
}
