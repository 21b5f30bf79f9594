//! Terminal confirmation prompt.

use std::io::{self, BufRead, Write};

use async_trait::async_trait;
use lattice_cart::confirm::{Confirmation, Confirmer, Prompt};
use tracing::warn;

/// Asks `[y/N]` on the terminal. Anything but yes cancels.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct TerminalConfirmer;

#[async_trait]
impl Confirmer for TerminalConfirmer {
    async fn confirm(&self, prompt: Prompt) -> Confirmation {
        match tokio::task::spawn_blocking(move || ask(&prompt)).await {
            Ok(Ok(confirmation)) => confirmation,
            Ok(Err(error)) => {
                warn!(%error, "could not read the answer, cancelling");

                Confirmation::Cancelled
            }
            Err(join_error) => {
                warn!(%join_error, "confirmation prompt failed, cancelling");

                Confirmation::Cancelled
            }
        }
    }
}

fn ask(prompt: &Prompt) -> io::Result<Confirmation> {
    {
        let mut stderr = io::stderr().lock();

        write!(stderr, "{}\n{} [y/N] ", prompt.title, prompt.body)?;
        stderr.flush()?;
    }

    let mut answer = String::new();

    io::stdin().lock().read_line(&mut answer)?;

    Ok(parse_answer(&answer))
}

fn parse_answer(answer: &str) -> Confirmation {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Confirmation::Confirmed,
        _ => Confirmation::Cancelled,
    }
}
