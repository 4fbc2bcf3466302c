//! Homework polling loop
//!
//! The poller owns the only mutable state in the bot: the `from_date` cursor
//! and the de-duplication memory. Each cycle runs the fetch, validate, format
//! and notify steps in order, then sleeps for the configured interval.
//!
//! # Example
//!
//! ```no_run
//! use homework_bot::{Config, HomeworkPoller, PracticumClient, TelegramBot};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env()?;
//! let poller = HomeworkPoller::new(
//!     PracticumClient::new(&config)?,
//!     TelegramBot::new(&config)?,
//!     &config,
//! );
//!
//! let cancel = CancellationToken::new();
//! // Runs until `cancel.cancel()` is called
//! poller.run(cancel).await;
//! # Ok(())
//! # }
//! ```

use crate::api::{HomeworkApi, check_response};
use crate::config::{Config, DeliveryPolicy};
use crate::error::{Error, Result};
use crate::notifier::{Notifier, send_message};
use crate::status::parse_status;
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Prefix of the chat message sent when a cycle fails
pub const FAILURE_PREFIX: &str = "Сбой в работе программы";

/// State carried from one polling cycle to the next
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PollState {
    /// Unix timestamp sent as `from_date` on the next fetch
    pub cursor: i64,

    /// Homework list that was last notified about
    pub last_homeworks: Option<Vec<Value>>,

    /// List whose delivery stopped partway, with how many of its records
    /// already reached the chat
    pub partial_delivery: Option<(Vec<Value>, usize)>,

    /// Error that was last reported to the chat
    pub last_error: Option<Error>,
}

/// What a single cycle did
#[derive(Clone, Debug, PartialEq)]
pub enum CycleOutcome {
    /// New statuses were found and sent; the cursor moved
    Notified {
        /// Number of messages sent
        sent: usize,
        /// Cursor after the cycle
        cursor: i64,
    },

    /// Empty list, or the same list as last time
    NothingNew,

    /// The cycle failed
    Failed {
        /// What went wrong
        error: Error,
        /// Whether the failure was sent to the chat this cycle
        reported: bool,
    },
}

/// Periodically checks homework statuses and notifies about changes
pub struct HomeworkPoller<A, N> {
    api: A,
    notifier: N,
    delivery_policy: DeliveryPolicy,
    retry_interval: Duration,
    state: PollState,
}

impl<A, N> HomeworkPoller<A, N>
where
    A: HomeworkApi,
    N: Notifier,
{
    /// Creates a poller whose cursor starts at the current time
    pub fn new(api: A, notifier: N, config: &Config) -> Self {
        Self {
            api,
            notifier,
            delivery_policy: config.delivery_policy,
            retry_interval: config.retry_interval,
            state: PollState {
                cursor: chrono::Utc::now().timestamp(),
                ..PollState::default()
            },
        }
    }

    /// Start from an explicit cursor instead of the current time
    pub fn with_cursor(mut self, cursor: i64) -> Self {
        self.state.cursor = cursor;
        self
    }

    /// Current cursor
    pub fn cursor(&self) -> i64 {
        self.state.cursor
    }

    /// Cycle-to-cycle state
    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// Runs cycles until `cancel` fires
    ///
    /// Every cycle is followed by a sleep of the configured interval, whether
    /// it succeeded or not. Cancellation is honoured both during a cycle and
    /// during the sleep.
    pub async fn run(mut self, cancel: CancellationToken) {
        info!(
            cursor = self.state.cursor,
            interval_secs = self.retry_interval.as_secs(),
            "homework poller started"
        );

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                outcome = self.poll_once() => {
                    debug!(?outcome, "polling cycle finished");
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = sleep(self.retry_interval) => {}
            }
        }

        info!(cursor = self.state.cursor, "homework poller stopped");
    }

    /// Runs exactly one cycle
    ///
    /// Errors never escape: they are logged, reported to the chat unless the
    /// same error was reported last time, and returned inside the outcome.
    pub async fn poll_once(&mut self) -> CycleOutcome {
        match self.check_homeworks().await {
            Ok(outcome) => {
                if self.state.last_error.take().is_some() {
                    info!("homework API checks are succeeding again");
                }
                outcome
            }
            Err(error) => {
                error!(code = error.error_code(), error = %error, "polling cycle failed");
                let reported = self.report_failure(&error).await;
                CycleOutcome::Failed { error, reported }
            }
        }
    }

    async fn check_homeworks(&mut self) -> Result<CycleOutcome> {
        let body = self.api.fetch(Some(self.state.cursor)).await?;
        let response = check_response(&body)?;

        if response.homeworks.is_empty() {
            info!(cursor = self.state.cursor, "no new homework statuses");
            return Ok(CycleOutcome::NothingNew);
        }
        if self.state.last_homeworks.as_ref() == Some(&response.homeworks) {
            info!(
                cursor = self.state.cursor,
                count = response.homeworks.len(),
                "no new homework statuses, list unchanged since last cycle"
            );
            return Ok(CycleOutcome::NothingNew);
        }

        // Format everything first so an unknown status sends nothing.
        let messages = response
            .homeworks
            .iter()
            .map(parse_status)
            .collect::<Result<Vec<_>>>()?;

        let already_sent = match &self.state.partial_delivery {
            Some((homeworks, delivered)) if *homeworks == response.homeworks => *delivered,
            _ => 0,
        };
        if already_sent > 0 {
            info!(
                skipped = already_sent,
                "resuming delivery of a partly sent homework list"
            );
        }

        for (index, message) in messages.iter().enumerate().skip(already_sent) {
            if let Err(e) = send_message(&self.notifier, message, self.delivery_policy).await {
                self.state.partial_delivery = Some((response.homeworks, index));
                return Err(e);
            }
        }

        debug!(
            from = self.state.cursor,
            to = response.current_date,
            "advancing cursor"
        );
        self.state.cursor = response.current_date;
        self.state.last_homeworks = Some(response.homeworks);
        self.state.partial_delivery = None;

        Ok(CycleOutcome::Notified {
            sent: messages.len() - already_sent,
            cursor: self.state.cursor,
        })
    }

    /// Tell the chat about `error` unless it was the last thing reported
    async fn report_failure(&mut self, error: &Error) -> bool {
        if self.state.last_error.as_ref() == Some(error) {
            debug!(code = error.error_code(), "same failure as last cycle, not reporting again");
            return false;
        }

        // Bypasses the delivery policy: only a delivered report is remembered.
        let message = format!("{FAILURE_PREFIX}: {error}");
        match self.notifier.notify(&message).await {
            Ok(()) => {
                info!(code = error.error_code(), "failure reported to chat");
                self.state.last_error = Some(error.clone());
                true
            }
            Err(e) => {
                warn!(error = %e, "could not report failure to chat, will retry next cycle");
                false
            }
        }
    }
}
