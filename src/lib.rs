//! # homework-bot
//!
//! Watches the Practicum homework review API and tells a Telegram chat when
//! the review status of a submitted homework changes.
//!
//! ## Design
//!
//! - **One serial loop** - a fetch every interval, nothing runs concurrently
//! - **Explicit state** - the cursor and de-duplication memory live in the
//!   [`HomeworkPoller`], configuration in a [`Config`] built once at startup
//! - **Closed error set** - every failure is an [`Error`] variant that can be
//!   compared, so the same problem is reported to the chat only once
//! - **Replaceable collaborators** - the API and the chat sit behind the
//!   [`HomeworkApi`] and [`Notifier`] traits
//!
//! ## Quick Start
//!
//! ```no_run
//! use homework_bot::{Config, HomeworkPoller, PracticumClient, TelegramBot, run_with_shutdown};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let poller = HomeworkPoller::new(
//!         PracticumClient::new(&config)?,
//!         TelegramBot::new(&config)?,
//!         &config,
//!     );
//!
//!     // Poll until SIGINT/SIGTERM
//!     run_with_shutdown(poller).await;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Homework API access and response validation
pub mod api;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Chat notification delivery
pub mod notifier;
/// Polling loop
pub mod poller;
/// Homework record formatting
pub mod status;
/// Core types
pub mod types;

// Re-export commonly used types
pub use api::{HomeworkApi, PracticumClient, check_response};
pub use config::{Config, Credentials, DeliveryPolicy};
pub use error::{DeliveryError, Error, Result, ShapeError, TransportError};
pub use notifier::{Notifier, TelegramBot, send_message};
pub use poller::{CycleOutcome, HomeworkPoller, PollState};
pub use status::parse_status;
pub use types::{ApiResponse, HomeworkStatus};

use tokio_util::sync::CancellationToken;

/// Run the poller until the process receives SIGTERM or Ctrl+C.
///
/// The cycle in flight when the signal arrives is abandoned; no state
/// survives the process anyway.
pub async fn run_with_shutdown<A, N>(poller: HomeworkPoller<A, N>)
where
    A: HomeworkApi,
    N: Notifier,
{
    run_until(poller, wait_for_signal()).await;
}

/// Run the poller until `shutdown` completes
pub async fn run_until<A, N, F>(poller: HomeworkPoller<A, N>, shutdown: F)
where
    A: HomeworkApi,
    N: Notifier,
    F: Future<Output = ()>,
{
    let cancel = CancellationToken::new();
    let on_shutdown = async {
        shutdown.await;
        cancel.cancel();
    };

    tokio::join!(poller.run(cancel.clone()), on_shutdown);
}

async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {
                        tracing::info!(signal = "SIGTERM", "shutdown requested");
                        return;
                    }
                    _ = wait_for_ctrl_c() => return,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not register SIGTERM handler, stopping on Ctrl+C only");
            }
        }
    }

    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!(signal = "SIGINT", "shutdown requested"),
        Err(e) => {
            // Without a handler there is nothing to wait for; keep polling.
            tracing::error!(error = %e, "could not listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}
