//! Hands a URL to whichever external app can open it.

use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub struct Linking<E> {
    context: CapabilityContext<LinkingOperation, E>,
}

impl<E> Clone for Linking<E> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
        }
    }
}

impl<Ev> Capability<Ev> for Linking<Ev> {
    type Operation = LinkingOperation;
    type MappedSelf<MappedEv> = Linking<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Linking::new(self.context.map_event(f))
    }
}

impl<E> Linking<E>
where
    E: 'static,
{
    pub fn new(context: CapabilityContext<LinkingOperation, E>) -> Self {
        Self { context }
    }

    pub fn open_url<F>(&self, url: url::Url, callback: F)
    where
        F: FnOnce(LinkingResult) -> E + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let result = context
                .request_from_shell(LinkingOperation::OpenUrl { url: url.into() })
                .await;
            context.update_app(callback(result));
        });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum LinkingOperation {
    OpenUrl { url: String },
}

impl Operation for LinkingOperation {
    type Output = LinkingResult;
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum LinkingError {
    #[error("no application can open {url}")]
    NoHandler { url: String },

    #[error("failed to open url: {message}")]
    Failed { message: String },
}

pub type LinkingResult = Result<(), LinkingError>;
