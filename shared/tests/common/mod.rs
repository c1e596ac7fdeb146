#![allow(dead_code)]

use std::collections::VecDeque;

use chat_shared::capabilities::{
    CameraOperation, DialogOperation, LinkingOperation, LocationOperation, PermissionsOperation,
};
use chat_shared::{App, Effect, Event, Model, Password, ScreenView, ViewModel};
use crux_core::capability::Operation;
use crux_core::testing::AppTester;
use crux_core::Request;

/// Plays the shell: feeds events back into the core and keeps unresolved
/// capability requests until the test answers them.
pub struct Shell {
    pub app: AppTester<App, Effect>,
    pub model: Model,
    pending: VecDeque<Effect>,
    pub renders: usize,
}

impl Default for Shell {
    fn default() -> Self {
        Self::with_app(App::default())
    }
}

impl Shell {
    pub fn with_app(app: App) -> Self {
        Self {
            app: AppTester::new(app),
            model: Model::default(),
            pending: VecDeque::new(),
            renders: 0,
        }
    }

    pub fn send(&mut self, event: Event) {
        let update = self.app.update(event, &mut self.model);
        self.absorb(update.effects, update.events);
    }

    pub fn resolve<Op: Operation>(&mut self, mut request: Request<Op>, output: Op::Output) {
        let update = self
            .app
            .resolve(&mut request, output)
            .expect("request should be resolvable");
        self.absorb(update.effects, update.events);
    }

    fn absorb(&mut self, effects: Vec<Effect>, events: Vec<Event>) {
        for effect in effects {
            if matches!(effect, Effect::Render(_)) {
                self.renders += 1;
            } else {
                self.pending.push_back(effect);
            }
        }
        for event in events {
            self.send(event);
        }
    }

    fn take<T>(&mut self, pick: impl Fn(Effect) -> Result<T, Effect>) -> Option<T> {
        let mut found = None;
        let mut kept = VecDeque::with_capacity(self.pending.len());
        while let Some(effect) = self.pending.pop_front() {
            if found.is_some() {
                kept.push_back(effect);
                continue;
            }
            match pick(effect) {
                Ok(request) => found = Some(request),
                Err(effect) => kept.push_back(effect),
            }
        }
        self.pending = kept;
        found
    }

    pub fn dialog(&mut self) -> Option<Request<DialogOperation>> {
        self.take(|e| match e {
            Effect::Dialog(request) => Ok(request),
            other => Err(other),
        })
    }

    pub fn permissions(&mut self) -> Option<Request<PermissionsOperation>> {
        self.take(|e| match e {
            Effect::Permissions(request) => Ok(request),
            other => Err(other),
        })
    }

    pub fn location(&mut self) -> Option<Request<LocationOperation>> {
        self.take(|e| match e {
            Effect::Location(request) => Ok(request),
            other => Err(other),
        })
    }

    pub fn camera(&mut self) -> Option<Request<CameraOperation>> {
        self.take(|e| match e {
            Effect::Camera(request) => Ok(request),
            other => Err(other),
        })
    }

    pub fn linking(&mut self) -> Option<Request<LinkingOperation>> {
        self.take(|e| match e {
            Effect::Linking(request) => Ok(request),
            other => Err(other),
        })
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn login(&mut self, username: &str, password: &str) {
        self.send(Event::LoginSubmitted {
            username: username.into(),
            password: Password::new(password),
        });
    }

    pub fn view(&self) -> ViewModel {
        self.app.view(&self.model)
    }

    pub fn log_len(&self) -> usize {
        self.model.session().map_or(0, |s| s.log.len())
    }

    pub fn chat_view(&self) -> chat_shared::ChatView {
        match self.view().screen {
            ScreenView::Chat(chat) => chat,
            ScreenView::Login { .. } => panic!("expected chat screen"),
        }
    }
}
