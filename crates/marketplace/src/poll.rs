//! Transaction confirmation polling.
//!
//! [`poll`] is a pure transition function over a single status check, while
//! [`await_confirmation`] drives it by repeatedly querying the network.

use std::time::Duration;

use common::config::Polling;
use derive_more::{Display, Error, From};
use tokio::time::sleep;
use tracing::{debug, instrument};

use crate::network::{Network, NetworkError, TransactionStatus};

/// Polling budget.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay between two consecutive status checks.
    pub interval: Duration,

    /// Total number of status checks.
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: 30,
        }
    }
}

impl From<&Polling> for PollConfig {
    fn from(polling: &Polling) -> Self {
        Self {
            interval: polling.interval(),
            max_attempts: polling.max_attempts,
        }
    }
}

/// Next polling step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PollStep {
    /// Status is not terminal yet, check again after the interval.
    Continue,

    /// Transaction reached a terminal status.
    Done(TransactionStatus),

    /// Budget is exhausted without a terminal status.
    TimedOut,
}

/// Decide what to do after the `attempt`-th status check, counting from one.
pub fn poll(status: TransactionStatus, attempt: u32, max_attempts: u32) -> PollStep {
    if status.status.is_terminal() {
        PollStep::Done(status)
    } else if attempt >= max_attempts {
        PollStep::TimedOut
    } else {
        PollStep::Continue
    }
}

/// Confirmation polling errors.
#[derive(Debug, Display, From, Error)]
pub enum PollError {
    Network(NetworkError),

    /// Transaction did not reach a terminal status within the budget.
    ///
    /// The transaction may still be included later.
    #[display(
        fmt = "transaction {} was not confirmed after {} attempts",
        hash,
        attempts
    )]
    #[from(ignore)]
    TimedOut { hash: String, attempts: u32 },
}

/// Poll the network until the transaction reaches a terminal status.
///
/// `on_attempt` is called before each status check with the attempt number.
#[instrument(skip(network, on_attempt))]
pub async fn await_confirmation<N, F>(
    network: &N,
    hash: &str,
    config: PollConfig,
    mut on_attempt: F,
) -> Result<TransactionStatus, PollError>
where
    N: Network + ?Sized,
    F: FnMut(u32),
{
    let mut attempt = 1;

    loop {
        on_attempt(attempt);

        let status = network.get_transaction(hash).await?;

        debug!(attempt, status = %status.status, "checked transaction status");

        match poll(status, attempt, config.max_attempts) {
            PollStep::Done(status) => return Ok(status),
            PollStep::TimedOut => {
                return Err(PollError::TimedOut {
                    hash: hash.to_owned(),
                    attempts: attempt,
                })
            }
            PollStep::Continue => {
                attempt += 1;
                sleep(config.interval).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::{
        network::TxStatus,
        testing::{status, MockNetwork},
    };

    fn fast(max_attempts: u32) -> PollConfig {
        PollConfig {
            interval: Duration::ZERO,
            max_attempts,
        }
    }

    #[test]
    fn transitions() {
        assert_eq!(poll(status(TxStatus::NotFound), 1, 30), PollStep::Continue);
        assert_eq!(poll(status(TxStatus::NotFound), 29, 30), PollStep::Continue);
        assert_eq!(poll(status(TxStatus::NotFound), 30, 30), PollStep::TimedOut);
        assert_eq!(
            poll(status(TxStatus::Failed), 30, 30),
            PollStep::Done(status(TxStatus::Failed))
        );
        assert_eq!(
            poll(status(TxStatus::Success), 1, 30),
            PollStep::Done(status(TxStatus::Success))
        );
    }

    #[test]
    fn default_budget() {
        let config = PollConfig::default();

        assert_eq!(config.max_attempts, 30);
        assert_eq!(config.interval, Duration::from_secs(1));
        assert_eq!(PollConfig::from(&Polling::default()), config);
    }

    #[tokio::test]
    async fn confirmed_after_pending_checks() {
        let network = MockNetwork::new();
        network.script_statuses([TxStatus::NotFound, TxStatus::NotFound, TxStatus::Success]);

        let attempts = AtomicU32::new(0);
        let result = await_confirmation(&network, "abcd", fast(30), |attempt| {
            attempts.store(attempt, Ordering::SeqCst)
        })
        .await
        .unwrap();

        assert_eq!(result.status, TxStatus::Success);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert_eq!(network.status_checks(), 3);
    }

    #[tokio::test]
    async fn times_out_after_budget() {
        let network = MockNetwork::pending();

        let result = await_confirmation(&network, "abcd", fast(30), |_| {}).await;

        assert!(matches!(
            result,
            Err(PollError::TimedOut { attempts: 30, ref hash }) if hash == "abcd"
        ));
        assert_eq!(network.status_checks(), 30);
    }
}
