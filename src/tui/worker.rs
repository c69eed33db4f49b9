use crate::advisor::{CompletionClient, Persona, render_answer};
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use tokio::runtime::Handle;
use tracing::{error, info, warn};

/// A request accepted by the app state, ready to run off the UI thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub persona: Persona,
    pub question: String,
}

/// Result of one job, handed back to the UI thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub persona: Persona,
    pub text: String,
}

pub const WORKER_PANICKED: &str = "agent stopped unexpectedly";

/// Run `job` on its own short-lived thread. The thread sends exactly one
/// [`Update`] on `tx`, whatever the outcome of the call.
pub fn dispatch(
    handle: Handle,
    client: Arc<CompletionClient>,
    job: Job,
    tx: Sender<Update>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(format!("agent-{}", job.persona.index() + 1))
        .spawn(move || {
            let update = answer(job.persona, || {
                handle.block_on(client.complete(job.persona.system_prompt(), &job.question))
            });
            if tx.send(update).is_err() {
                warn!("ui closed before {:?} answered", job.persona);
            }
        })
}

/// Turn one completion call into its update. A panic inside `call` becomes
/// an error answer, so the agent is always released.
fn answer<F>(persona: Persona, call: F) -> Update
where
    F: FnOnce() -> Result<String, String>,
{
    let result = panic::catch_unwind(AssertUnwindSafe(call)).unwrap_or_else(|_| {
        error!(?persona, "completion panicked");
        Err(WORKER_PANICKED.to_string())
    });
    info!(?persona, ok = result.is_ok(), "completion finished");
    Update {
        persona,
        text: render_answer(result),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_wraps_result() {
        let update = answer(Persona::DataAnalyst, || Ok("trend is flat".to_string()));
        assert_eq!(update.persona, Persona::DataAnalyst);
        assert_eq!(update.text, "trend is flat");

        let update = answer(Persona::DataAnalyst, || Err("timed out".to_string()));
        assert_eq!(update.text, "Error: timed out");
    }

    #[test]
    fn panicking_call_still_answers() {
        let update = answer(Persona::LegalConsultant, || panic!("boom"));
        assert_eq!(update.persona, Persona::LegalConsultant);
        assert_eq!(update.text, format!("Error: {WORKER_PANICKED}"));
    }
}
