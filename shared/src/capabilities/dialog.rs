//! Modal dialogs the core needs an answer from before it can continue.

use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

use super::permissions::RationalePrompt;

pub struct Dialog<E> {
    context: CapabilityContext<DialogOperation, E>,
}

impl<E> Clone for Dialog<E> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
        }
    }
}

impl<Ev> Capability<Ev> for Dialog<Ev> {
    type Operation = DialogOperation;
    type MappedSelf<MappedEv> = Dialog<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Dialog::new(self.context.map_event(f))
    }
}

impl<E> Dialog<E>
where
    E: 'static,
{
    pub fn new(context: CapabilityContext<DialogOperation, E>) -> Self {
        Self { context }
    }

    /// Shows the prompt and waits for the user's choice. There is no timeout.
    pub async fn confirm_async(&self, prompt: RationalePrompt) -> DialogChoice {
        self.context
            .request_from_shell(DialogOperation::Confirm(prompt))
            .await
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DialogOperation {
    Confirm(RationalePrompt),
}

impl Operation for DialogOperation {
    type Output = DialogChoice;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DialogChoice {
    Proceed,
    Cancel,
}

impl DialogChoice {
    #[must_use]
    pub const fn is_proceed(self) -> bool {
        matches!(self, Self::Proceed)
    }
}
