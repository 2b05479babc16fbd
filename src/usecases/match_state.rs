use crate::models::matches::{CommitOutcome, Match, MatchCommit, MatchFields, Side, clamp_score};
use crate::usecases::match_store::MatchStore;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};
use uuid::Uuid;

/// Handle on a persistence request that was queued in the background.
///
/// Dropping it does not cancel the request.
#[must_use = "dropping a pending commit ignores its outcome"]
pub struct PendingCommit {
    persisted: Option<oneshot::Receiver<bool>>,
}

impl PendingCommit {
    fn local_only() -> Self {
        Self { persisted: None }
    }

    pub async fn outcome(self) -> CommitOutcome {
        match self.persisted {
            None => CommitOutcome::LocalOnly,
            Some(persisted) => match persisted.await {
                Ok(true) => CommitOutcome::Persisted,
                Ok(false) | Err(_) => CommitOutcome::Failed,
            },
        }
    }
}

type QueuedCommit = (MatchCommit, oneshot::Sender<bool>);

/// Single writer for one match. Commits reach the store one at a time, in
/// the order they were queued.
///
/// The task drains whatever is queued and exits once the writer is dropped.
struct CommitWriter {
    queue: mpsc::UnboundedSender<QueuedCommit>,
}

impl CommitWriter {
    fn start(store: Arc<dyn MatchStore>, match_id: Uuid) -> Self {
        let (queue, mut queued) = mpsc::unbounded_channel::<QueuedCommit>();
        tokio::spawn(async move {
            while let Some((commit, done)) = queued.recv().await {
                let persisted = match store.update_match(match_id, &commit).await {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(
                            %match_id,
                            fields = ?commit.fields(),
                            code = e.as_str(),
                            "Failed to persist match commit",
                        );
                        false
                    }
                };
                let _ = done.send(persisted);
            }
        });
        Self { queue }
    }

    fn submit(&self, commit: MatchCommit) -> PendingCommit {
        let (done, persisted) = oneshot::channel();
        if let Err(e) = self.queue.send((commit, done)) {
            let (commit, _) = e.0;
            warn!(fields = ?commit.fields(), "Commit writer is gone, commit not persisted");
        }
        PendingCommit {
            persisted: Some(persisted),
        }
    }
}

/// The local mirror of one match.
///
/// The mirror is written only by [`MatchState::apply_local_commit`] and
/// [`MatchState::apply_remote_update`].
pub struct MatchState {
    mirror: Match,
    editing: MatchFields,
    writer: Option<CommitWriter>,
}

impl MatchState {
    /// A locally defaulted match with nothing to persist to.
    pub fn local() -> Self {
        Self {
            mirror: Match::with_defaults(Uuid::new_v4()),
            editing: MatchFields::empty(),
            writer: None,
        }
    }

    /// Must be called from within a tokio runtime.
    pub fn remote(snapshot: Match, store: Arc<dyn MatchStore>) -> Self {
        let writer = CommitWriter::start(store, snapshot.id);
        Self {
            mirror: snapshot,
            editing: MatchFields::empty(),
            writer: Some(writer),
        }
    }

    pub fn snapshot(&self) -> &Match {
        &self.mirror
    }

    pub fn match_id(&self) -> Uuid {
        self.mirror.id
    }

    pub fn editing(&self) -> MatchFields {
        self.editing
    }

    pub(crate) fn set_editing(&mut self, fields: MatchFields, editing: bool) {
        self.editing.set(fields, editing);
    }

    /// Applies `commit` to the mirror right away and queues it for persistence.
    pub fn apply_local_commit(&mut self, commit: MatchCommit) -> PendingCommit {
        let commit = commit.validated();
        commit.apply_to(&mut self.mirror);
        debug!(match_id = %self.mirror.id, fields = ?commit.fields(), "Applied local commit");

        match &self.writer {
            Some(writer) => writer.submit(commit),
            None => PendingCommit::local_only(),
        }
    }

    /// Overwrites the mirror with `snapshot`, except for fields under local edit.
    ///
    /// Returns the fields that were taken from the snapshot.
    pub fn apply_remote_update(&mut self, snapshot: &Match) -> MatchFields {
        if snapshot.id != self.mirror.id {
            warn!(
                match_id = %self.mirror.id,
                snapshot_id = %snapshot.id,
                "Ignoring update for another match",
            );
            return MatchFields::empty();
        }
        let fields = MatchFields::all() - self.editing;
        self.mirror.copy_fields(snapshot, fields);
        self.mirror.created_at = snapshot.created_at;
        self.mirror.updated_at = snapshot.updated_at;
        debug!(match_id = %self.mirror.id, skipped = ?self.editing, "Applied remote update");
        fields
    }

    pub fn adjust_score(&mut self, side: Side, delta: i64) -> PendingCommit {
        let score = clamp_score(self.mirror.player_score(side), delta);
        self.apply_local_commit(MatchCommit::PlayerScore { side, score })
    }

    pub fn adjust_match_score(&mut self, side: Side, delta: i64) -> PendingCommit {
        let (mut score_a, mut score_b) = self.mirror.match_score();
        match side {
            Side::A => score_a = clamp_score(score_a, delta),
            Side::B => score_b = clamp_score(score_b, delta),
        }
        self.apply_local_commit(MatchCommit::MatchScore { score_a, score_b })
    }
}
