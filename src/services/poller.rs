//! Session status poller.
//!
//! Drives the long-poll loop against the connector until the session reaches
//! its terminal state. The poller owns the inter-poll sleep interval and the
//! long-poll socket-open duration forwarded to the service; it enforces no
//! upper bound on total duration — the service is the source of terminal
//! states, including its own `TIMEOUT` end result.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::adapters::rest::Connector;
use crate::domain::session::{SessionId, SessionStatus};
use crate::infra::error::{RemoteIdError, RemoteIdResult};

/// Default sleep between consecutive status fetches.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Consecutive unrecognized-state responses tolerated before the poller gives
/// up. Unknown states are non-terminal by contract, but an endless stream of
/// them means the protocol has changed under us.
const UNKNOWN_STATE_LIMIT: u32 = 50;

/// Polls a session until it completes.
pub struct SessionStatusPoller<'a, C: ?Sized> {
    connector: &'a C,
    poll_interval: Duration,
    long_poll_timeout: Option<Duration>,
}

impl<'a, C: Connector + ?Sized> SessionStatusPoller<'a, C> {
    /// Create a poller with the default 1-second interval and no long polling.
    #[must_use]
    pub fn new(connector: &'a C) -> Self {
        Self {
            connector,
            poll_interval: DEFAULT_POLL_INTERVAL,
            long_poll_timeout: None,
        }
    }

    /// Set the sleep between consecutive status fetches.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Ask the service to hold each status response open for up to the given
    /// duration. Additive to the poll interval, not a replacement for it.
    #[must_use]
    pub fn with_long_poll_timeout(mut self, timeout: Duration) -> Self {
        self.long_poll_timeout = Some(timeout);
        self
    }

    /// The connector this poller fetches through.
    #[must_use]
    pub fn connector(&self) -> &'a C {
        self.connector
    }

    /// Fetch repeatedly until the session state is `COMPLETE` and return the
    /// final status.
    ///
    /// # Errors
    /// Propagates connector errors; in-band cancellation surfaces as an
    /// unprocessable-response error. Dropping the returned future is the
    /// caller-initiated cancellation path.
    pub async fn fetch_final_status(
        &self,
        session_id: &SessionId,
        cancel: &CancellationToken,
    ) -> RemoteIdResult<SessionStatus> {
        let mut unknown_streak: u32 = 0;
        loop {
            if cancel.is_cancelled() {
                return Err(cancelled());
            }

            let status = self
                .connector
                .fetch_session_status(session_id, self.long_poll_timeout, cancel)
                .await?;

            if !status.ignored_properties.is_empty() {
                log::warn!(
                    "Service ignored unknown request properties: {:?}",
                    status.ignored_properties
                );
            }

            if status.is_complete() {
                log::debug!("Session {session_id} completed");
                return Ok(status);
            }

            if status.is_running() {
                unknown_streak = 0;
            } else {
                unknown_streak += 1;
                log::warn!(
                    "Session {session_id} reported unrecognized state '{}', treating as non-terminal",
                    status.state
                );
                if unknown_streak >= UNKNOWN_STATE_LIMIT {
                    return Err(RemoteIdError::UnprocessableResponse(format!(
                        "session state '{}' was reported {UNKNOWN_STATE_LIMIT} times in a row",
                        status.state
                    )));
                }
            }

            tokio::select! {
                () = tokio::time::sleep(self.poll_interval) => {}
                () = cancel.cancelled() => return Err(cancelled()),
            }
        }
    }
}

fn cancelled() -> RemoteIdError {
    RemoteIdError::UnprocessableResponse("session status polling was cancelled".to_string())
}
