use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, unexpected};
use crate::entities::matches::Match as MatchEntity;
use crate::models::matches::{Match, MatchCommit};
use crate::repositories::{match_updates, matches};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

/// Pending snapshots buffered per subscriber before the listener applies backpressure.
const UPDATES_BUFFER: usize = 64;

pub async fn create<C: Context>(ctx: &C) -> ServiceResult<Match> {
    let new_match: MatchEntity = Match::with_defaults(Uuid::new_v4()).into();
    let created = match matches::create(ctx, &new_match).await {
        Ok(created) => created,
        Err(e) => return unexpected(e),
    };
    let created = Match::try_from(created)?;
    info!(match_id = %created.id, "Created match");
    Ok(created)
}

pub async fn fetch_one<C: Context>(ctx: &C, match_id: Uuid) -> ServiceResult<Match> {
    match matches::fetch_one(ctx, &match_id.to_string()).await {
        Ok(Some(entity)) => Ok(Match::try_from(entity)?),
        Ok(None) => Err(AppError::MatchesNotFound),
        Err(e) => {
            warn!(%match_id, "Error fetching match: {e}");
            Err(AppError::MatchesLoadFailed)
        }
    }
}

/// Persists `commit` and fans the post-update snapshot out to subscribers.
pub async fn update<C: Context>(ctx: &C, match_id: Uuid, commit: &MatchCommit) -> ServiceResult<()> {
    match matches::update(ctx, match_id, commit).await {
        Ok(true) => {}
        Ok(false) => return Err(AppError::MatchesNotFound),
        Err(e) => return unexpected(e),
    }
    let Some(snapshot) = reloaded(match_id, fetch_one(ctx, match_id).await) else {
        return Ok(());
    };
    if let Err(e) = match_updates::publish(ctx, &snapshot).await {
        warn!(%match_id, "Failed to publish match update: {e}");
    }
    Ok(())
}

/// The row is already written by the time this runs, so a failed reload only
/// skips the publish. Subscribers catch up on the next update.
fn reloaded(match_id: Uuid, result: ServiceResult<Match>) -> Option<Match> {
    match result {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            warn!(%match_id, code = e.as_str(), "Failed to reload match after update");
            None
        }
    }
}

pub async fn subscribe<C: Context>(ctx: &C, match_id: Uuid) -> ServiceResult<MatchUpdates> {
    let (sender, receiver) = mpsc::channel(UPDATES_BUFFER);
    match match_updates::listen(ctx, match_id, sender).await {
        Ok(listener) => Ok(MatchUpdates::new(receiver, listener)),
        Err(e) => unexpected(e),
    }
}

/// Snapshots pushed for one match, in the order the backend delivered them.
///
/// Dropping the value unsubscribes.
pub struct MatchUpdates {
    receiver: mpsc::Receiver<Match>,
    listener: JoinHandle<()>,
}

impl MatchUpdates {
    pub fn new(receiver: mpsc::Receiver<Match>, listener: JoinHandle<()>) -> Self {
        Self { receiver, listener }
    }

    pub async fn next(&mut self) -> Option<Match> {
        self.receiver.recv().await
    }
}

impl Drop for MatchUpdates {
    fn drop(&mut self) {
        self.receiver.close();
        self.listener.abort();
    }
}
