//! Confirmation prompts.
//!
//! Destructive operations ask a [`Confirmer`] first and only proceed on
//! [`Confirmation::Confirmed`].

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

/// The user's answer to a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// Go ahead.
    Confirmed,

    /// Do nothing.
    Cancelled,
}

/// What the user is asked to confirm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// Dialog title
    pub title: String,

    /// Dialog body
    pub body: String,
}

impl Prompt {
    /// Prompt shown before removing a line.
    #[must_use]
    pub fn remove_item() -> Self {
        Self {
            title: "Remove Item".to_string(),
            body: "Are you sure you want to remove this item from your cart?".to_string(),
        }
    }

    /// Prompt shown before clearing the cart.
    #[must_use]
    pub fn clear_cart() -> Self {
        Self {
            title: "Clear Cart".to_string(),
            body: "Are you sure you want to remove all items from your cart?".to_string(),
        }
    }
}

/// Asks the user to confirm a destructive operation.
#[async_trait]
pub trait Confirmer: Send + Sync {
    /// Resolve once the user has answered.
    async fn confirm(&self, prompt: Prompt) -> Confirmation;
}

/// Confirms everything without asking.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

#[async_trait]
impl Confirmer for AutoConfirm {
    async fn confirm(&self, _prompt: Prompt) -> Confirmation {
        Confirmation::Confirmed
    }
}

/// A prompt waiting for the front end to answer it.
///
/// Dropping it unanswered counts as cancelling.
#[derive(Debug)]
pub struct PendingConfirmation {
    prompt: Prompt,
    reply: oneshot::Sender<Confirmation>,
}

impl PendingConfirmation {
    /// The prompt to display.
    #[must_use]
    pub fn prompt(&self) -> &Prompt {
        &self.prompt
    }

    /// Answer the prompt.
    pub fn answer(self, confirmation: Confirmation) {
        if self.reply.send(confirmation).is_err() {
            debug!(title = %self.prompt.title, "confirmation answered after the caller went away");
        }
    }

    /// Confirm the prompt.
    pub fn confirm(self) {
        self.answer(Confirmation::Confirmed);
    }

    /// Cancel the prompt.
    pub fn cancel(self) {
        self.answer(Confirmation::Cancelled);
    }
}

/// Confirmer backed by a modal the front end renders.
///
/// Each prompt is handed over as a [`PendingConfirmation`]; the future
/// returned by [`Confirmer::confirm`] resolves when it is answered.
#[derive(Debug, Clone)]
pub struct ModalConfirmer {
    requests: mpsc::UnboundedSender<PendingConfirmation>,
}

impl ModalConfirmer {
    /// Create a confirmer and the receiver the front end reads prompts from.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<PendingConfirmation>) {
        let (requests, receiver) = mpsc::unbounded_channel();

        (Self { requests }, receiver)
    }
}

#[async_trait]
impl Confirmer for ModalConfirmer {
    async fn confirm(&self, prompt: Prompt) -> Confirmation {
        let (reply, answer) = oneshot::channel();

        if self
            .requests
            .send(PendingConfirmation { prompt, reply })
            .is_err()
        {
            debug!("no front end to confirm with, treating as cancelled");

            return Confirmation::Cancelled;
        }

        answer.await.unwrap_or(Confirmation::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[tokio::test]
    async fn modal_resolves_with_the_front_end_answer() -> TestResult {
        let (confirmer, mut prompts) = ModalConfirmer::channel();

        let front_end = tokio::spawn(async move {
            if let Some(pending) = prompts.recv().await {
                assert_eq!(pending.prompt().title, "Clear Cart");

                pending.confirm();
            }
        });

        let answer = confirmer.confirm(Prompt::clear_cart()).await;

        front_end.await?;

        assert_eq!(answer, Confirmation::Confirmed);

        Ok(())
    }

    #[tokio::test]
    async fn dropping_a_pending_prompt_cancels() -> TestResult {
        let (confirmer, mut prompts) = ModalConfirmer::channel();

        let front_end = tokio::spawn(async move {
            drop(prompts.recv().await);
        });

        let answer = confirmer.confirm(Prompt::remove_item()).await;

        front_end.await?;

        assert_eq!(answer, Confirmation::Cancelled);

        Ok(())
    }

    #[tokio::test]
    async fn modal_without_front_end_cancels() {
        let (confirmer, prompts) = ModalConfirmer::channel();
        drop(prompts);

        assert_eq!(
            confirmer.confirm(Prompt::remove_item()).await,
            Confirmation::Cancelled
        );
    }
}
