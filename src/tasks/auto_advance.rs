use std::time::Duration;

use log::debug;
use tokio::sync::mpsc::Sender;
use tokio::time::sleep;

use crate::funnel::FunnelEvent;
use crate::session::nav::AdvanceToken;

/// Sleeps out the visual-feedback delay, then reports back through the
/// event channel. The receiver decides whether the token is still live, so
/// firing for a superseded token is harmless.
pub fn schedule(events: Sender<FunnelEvent>, token: AdvanceToken, delay: Duration) {
    tokio::spawn(async move {
        sleep(delay).await;
        if events
            .send(FunnelEvent::AdvanceElapsed(token))
            .await
            .is_err()
        {
            debug!(
                "auto-advance for question {} fired after the session ended",
                token.question()
            );
        }
    });
}
