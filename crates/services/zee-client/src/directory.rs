//! Periodic refresh of the model and conversation lists.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{client::Client, config::Config, error::ZeeError, store::StoreAction};

/// Delay between two directory polls
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Fetch models and conversations concurrently.
///
/// # Errors
///
/// Returns the first error of either request.
pub async fn refresh<C: Config>(client: &Client<C>) -> Result<StoreAction, ZeeError> {
    let models = client.models();
    let conversations = client.conversations();
    let (models, conversations) = tokio::try_join!(models.list(), conversations.list())?;
    Ok(StoreAction::DirectoryRefreshed {
        models,
        conversations,
    })
}

/// Poll the directory every [`POLL_INTERVAL`] until `cancel` fires.
///
/// The first poll runs immediately. Failed polls are logged at debug level
/// and skipped; the store keeps its previous lists.
pub fn spawn_poller<C>(
    client: Client<C>,
    tx: mpsc::UnboundedSender<StoreAction>,
    cancel: CancellationToken,
) -> JoinHandle<()>
where
    C: Config + Clone + 'static,
{
    spawn_poller_every(client, POLL_INTERVAL, tx, cancel)
}

/// [`spawn_poller`] with a custom period
pub fn spawn_poller_every<C>(
    client: Client<C>,
    period: Duration,
    tx: mpsc::UnboundedSender<StoreAction>,
    cancel: CancellationToken,
) -> JoinHandle<()>
where
    C: Config + Clone + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let refreshed = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                refreshed = refresh(&client) => refreshed,
            };

            match refreshed {
                Ok(action) => {
                    if tx.send(action).is_err() {
                        tracing::debug!("store receiver closed; stopping directory poller");
                        break;
                    }
                }
                Err(e) => tracing::debug!(error = %e, "directory refresh failed"),
            }
        }
    })
}
