//! Bounded fan-in of replies from an unknown number of nodes.

use crate::connection::Connection;
use crate::error::SyncError;
use crate::message::ServerResponse;
use bytes::Bytes;
use std::time::Duration;
use tokio::time::Instant;

/// Publish `payload` on `subject` and hand every well-formed reply to
/// `on_response` until `window` has elapsed since the request went out.
///
/// Each wait uses the time remaining in the window, so the whole call is
/// bounded by `window` no matter how replies are spaced. Malformed replies
/// are logged and skipped. Returns the number of replies counted.
pub async fn collect_responses<F>(
    connection: &dyn Connection,
    subject: &str,
    payload: Bytes,
    window: Duration,
    mut on_response: F,
) -> Result<usize, SyncError>
where
    F: FnMut(ServerResponse) + Send,
{
    let inbox = connection.new_inbox();
    let mut subscription = connection.subscribe(&inbox).await?;
    connection.publish_request(subject, &inbox, payload).await?;

    let started = Instant::now();
    let mut counted = 0;
    loop {
        let remaining = window.saturating_sub(started.elapsed());
        if remaining.is_zero() {
            break;
        }

        let Some(reply) = subscription.next_message(remaining).await? else {
            break;
        };

        match ServerResponse::parse(&reply) {
            Ok(response) => {
                tracing::debug!(
                    subject = %subject,
                    server = %response.server.name,
                    error = response.is_error(),
                    "Control-plane reply"
                );
                counted += 1;
                on_response(response);
            }
            Err(reason) => {
                tracing::warn!(subject = %subject, reason = %reason, "Ignoring malformed reply");
            }
        }
    }

    tracing::debug!(subject = %subject, replies = counted, "Response window closed");
    Ok(counted)
}
