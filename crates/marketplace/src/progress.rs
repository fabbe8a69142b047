//! Workflow progress events.

use derive_more::Display;

/// Progress of a deployment workflow or a single transaction.
#[derive(Clone, Debug, Display, PartialEq, Eq)]
pub enum DeployProgress {
    #[display(fmt = "Installing WASM...")]
    InstallingWasm,

    #[display(fmt = "Deploying contract instance...")]
    Deploying,

    #[display(fmt = "Updating registry...")]
    UpdatingRegistry,

    #[display(fmt = "Waiting for signature...")]
    AwaitingSignature,

    #[display(fmt = "Submitted transaction {}", hash)]
    Submitted { hash: String },

    #[display(fmt = "Confirming ({}/{})...", attempt, max_attempts)]
    Confirming { attempt: u32, max_attempts: u32 },
}

/// Receiver of progress events.
pub trait ProgressObserver: Send + Sync {
    fn notify(&self, progress: &DeployProgress);
}

impl<F> ProgressObserver for F
where
    F: Fn(&DeployProgress) + Send + Sync,
{
    fn notify(&self, progress: &DeployProgress) {
        self(progress)
    }
}

/// Observer that ignores all events.
pub(crate) fn ignore(_: &DeployProgress) {}
