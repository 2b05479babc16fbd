use crate::common::context::Context;
use crate::common::redis_json::Json;
use crate::models::matches::Match;
use redis::AsyncCommands;
use std::ops::DerefMut;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{error, warn};
use uuid::Uuid;

/// How often the blocking listener checks whether its receiver went away.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

fn make_channel(match_id: Uuid) -> String {
    format!("scoreboard:matches:{match_id}")
}

pub async fn publish<C: Context>(ctx: &C, snapshot: &Match) -> anyhow::Result<()> {
    let mut redis = ctx.redis().await?;
    let _: i64 = redis
        .deref_mut()
        .publish(make_channel(snapshot.id), Json(snapshot))
        .await?;
    Ok(())
}

/// Forwards every snapshot published for `match_id` into `sender`, in arrival order.
///
/// The listener runs on a blocking thread and exits once `sender` is closed.
pub async fn listen<C: Context>(
    ctx: &C,
    match_id: Uuid,
    sender: mpsc::Sender<Match>,
) -> anyhow::Result<JoinHandle<()>> {
    let client = ctx.redis_client().clone();
    let channel = make_channel(match_id);
    let (ready_tx, ready_rx) = oneshot::channel::<redis::RedisResult<()>>();

    let handle = tokio::task::spawn_blocking(move || {
        let mut conn = match client.get_connection() {
            Ok(conn) => conn,
            Err(e) => {
                let _ = ready_tx.send(Err(e));
                return;
            }
        };
        let mut pubsub = conn.as_pubsub();
        let setup = pubsub
            .subscribe(&channel)
            .and_then(|_| pubsub.set_read_timeout(Some(POLL_INTERVAL)));
        let subscribed = setup.is_ok();
        let _ = ready_tx.send(setup);
        if !subscribed {
            return;
        }

        while !sender.is_closed() {
            let msg = match pubsub.get_message() {
                Ok(msg) => msg,
                Err(e) if e.is_timeout() => continue,
                Err(e) => {
                    error!(channel = %channel, "Match update listener failed: {e}");
                    break;
                }
            };
            let snapshot: Json<Match> = match msg.get_payload() {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    warn!(channel = %channel, "Dropping undecodable match update: {e}");
                    continue;
                }
            };
            if sender.blocking_send(snapshot.into_inner()).is_err() {
                break;
            }
        }
        let _ = pubsub.unsubscribe(&channel);
    });

    ready_rx.await??;
    Ok(handle)
}
