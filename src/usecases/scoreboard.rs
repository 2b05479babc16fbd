use crate::common::error::ServiceResult;
use crate::models::matches::{Match, MatchFields, Side};
use crate::models::overlay::{
    Draft, EditKey, MatchScoreView, MatchTypeView, OverlayView, PlayerView, Region,
};
use crate::usecases::editable_field::EditableField;
use crate::usecases::match_state::{MatchState, PendingCommit};
use crate::usecases::match_store::MatchStore;
use crate::usecases::matches::MatchUpdates;
use crate::models::media::{CameraStatus, FacingMode, Resolution};
use crate::usecases::camera_feed::Camera;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// The match mirror together with one edit controller per region.
pub struct Scoreboard {
    state: MatchState,
    fields: [EditableField; 4],
}

impl Scoreboard {
    pub fn new(state: MatchState) -> Self {
        Self {
            state,
            fields: Region::ALL.map(EditableField::new),
        }
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn field(&self, region: Region) -> &EditableField {
        &self.fields[region.index()]
    }

    pub fn begin_edit(&mut self, region: Region) {
        self.fields[region.index()].begin_edit(&mut self.state);
    }

    pub fn set_draft(&mut self, region: Region, draft: Draft) -> ServiceResult<()> {
        self.fields[region.index()].set_draft(draft)
    }

    pub fn step_draft_score(&mut self, side: Side, delta: i64) -> ServiceResult<()> {
        self.fields[Region::MatchScore.index()].step_draft_score(side, delta)
    }

    pub fn save(&mut self, region: Region) -> Option<PendingCommit> {
        self.fields[region.index()].save(&mut self.state)
    }

    pub fn cancel(&mut self, region: Region) {
        self.fields[region.index()].cancel(&mut self.state);
    }

    pub fn handle_key(&mut self, region: Region, key: EditKey) -> Option<PendingCommit> {
        self.fields[region.index()].handle_key(key, &mut self.state)
    }

    pub fn adjust_score(&mut self, side: Side, delta: i64) -> PendingCommit {
        self.state.adjust_score(side, delta)
    }

    pub fn adjust_match_score(&mut self, side: Side, delta: i64) -> PendingCommit {
        self.state.adjust_match_score(side, delta)
    }

    pub fn apply_remote_update(&mut self, snapshot: &Match) -> MatchFields {
        self.state.apply_remote_update(snapshot)
    }

    pub fn view(&self) -> OverlayView {
        let m = self.state.snapshot();
        let match_type = match self.field(Region::MatchType).draft() {
            Some(Draft::MatchType { match_type }) => match_type.clone(),
            _ => m.match_type.clone(),
        };
        let (score_a, score_b) = match self.field(Region::MatchScore).draft() {
            Some(Draft::MatchScore { score_a, score_b }) => (*score_a, *score_b),
            _ => m.match_score(),
        };
        OverlayView {
            match_id: m.id,
            match_type: MatchTypeView {
                editing: self.field(Region::MatchType).is_editing(),
                match_type,
            },
            match_score: MatchScoreView {
                editing: self.field(Region::MatchScore).is_editing(),
                score_a,
                score_b,
            },
            player_a: self.player_view(Side::A),
            player_b: self.player_view(Side::B),
            camera: None,
        }
    }

    fn player_view(&self, side: Side) -> PlayerView {
        let field = self.field(Region::player(side));
        let info = match field.draft() {
            Some(Draft::Player(info)) => info.clone(),
            _ => self.state.snapshot().player(side).clone(),
        };
        PlayerView {
            editing: field.is_editing(),
            info,
            score: self.state.snapshot().player_score(side),
        }
    }
}

pub type SharedScoreboard = Arc<Mutex<Scoreboard>>;
pub type SharedCamera = Arc<Mutex<Box<dyn Camera>>>;

const RESUBSCRIBE_BACKOFF_MIN: Duration = Duration::from_millis(100);
const RESUBSCRIBE_BACKOFF_MAX: Duration = Duration::from_secs(10);

/// Applies pushed snapshots to a scoreboard until dropped.
///
/// When the update stream ends on its own, the task resubscribes with
/// backoff and reloads the match. Dropping it stops the task, which drops
/// the [`MatchUpdates`] and with it the backend subscription.
pub struct LiveSync {
    task: JoinHandle<()>,
    live: Arc<AtomicBool>,
}

impl LiveSync {
    pub fn start(
        scoreboard: SharedScoreboard,
        store: Arc<dyn MatchStore>,
        match_id: Uuid,
        updates: MatchUpdates,
    ) -> Self {
        let live = Arc::new(AtomicBool::new(true));
        let task = tokio::spawn(Self::run(scoreboard, store, match_id, updates, live.clone()));
        Self { task, live }
    }

    /// Whether a subscription is currently open.
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    async fn run(
        scoreboard: SharedScoreboard,
        store: Arc<dyn MatchStore>,
        match_id: Uuid,
        mut updates: MatchUpdates,
        live: Arc<AtomicBool>,
    ) {
        loop {
            while let Some(snapshot) = updates.next().await {
                let applied = scoreboard.lock().await.apply_remote_update(&snapshot);
                debug!(match_id = %snapshot.id, fields = ?applied, "Received match update");
            }
            live.store(false, Ordering::SeqCst);
            error!(%match_id, "Match update stream ended");
            updates = Self::resubscribe(&scoreboard, store.as_ref(), match_id).await;
            live.store(true, Ordering::SeqCst);
        }
    }

    /// Retries until a subscription is open, then reloads the match to pick
    /// up anything published while disconnected.
    async fn resubscribe(
        scoreboard: &SharedScoreboard,
        store: &dyn MatchStore,
        match_id: Uuid,
    ) -> MatchUpdates {
        let mut backoff = RESUBSCRIBE_BACKOFF_MIN;
        loop {
            tokio::time::sleep(backoff).await;
            match store.subscribe(match_id).await {
                Ok(updates) => {
                    match store.fetch_match(match_id).await {
                        Ok(snapshot) => {
                            scoreboard.lock().await.apply_remote_update(&snapshot);
                        }
                        Err(e) => {
                            warn!(%match_id, code = e.as_str(), "Failed to reload match after resubscribing")
                        }
                    }
                    info!(%match_id, "Resubscribed to match updates");
                    return updates;
                }
                Err(e) => {
                    warn!(%match_id, code = e.as_str(), ?backoff, "Failed to resubscribe to match updates");
                    backoff = (backoff * 2).min(RESUBSCRIBE_BACKOFF_MAX);
                }
            }
        }
    }
}

impl Drop for LiveSync {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// A mounted overlay: the scoreboard plus its subscription and background
/// camera, if any. Both are released on unmount and on drop.
pub struct OverlaySession {
    scoreboard: SharedScoreboard,
    sync: Option<LiveSync>,
    camera: Option<SharedCamera>,
}

impl OverlaySession {
    /// Mounts on a locally defaulted match when `store` is `None`. Otherwise
    /// attaches to `match_id`, or to a newly created match when it is `None`.
    pub async fn mount(
        store: Option<Arc<dyn MatchStore>>,
        match_id: Option<Uuid>,
    ) -> ServiceResult<Self> {
        let Some(store) = store else {
            let state = MatchState::local();
            info!(match_id = %state.match_id(), "Mounted overlay without a backend");
            return Ok(Self {
                scoreboard: Arc::new(Mutex::new(Scoreboard::new(state))),
                sync: None,
                camera: None,
            });
        };

        let (snapshot, updates) = match match_id {
            Some(match_id) => {
                // subscribe first so nothing published during the fetch is lost
                let updates = store.subscribe(match_id).await?;
                let snapshot = store.fetch_match(match_id).await?;
                (snapshot, updates)
            }
            None => {
                let snapshot = store.create_match().await?;
                let updates = store.subscribe(snapshot.id).await?;
                (snapshot, updates)
            }
        };

        let match_id = snapshot.id;
        info!(%match_id, "Mounted overlay");
        let state = MatchState::remote(snapshot, store.clone());
        let scoreboard = Arc::new(Mutex::new(Scoreboard::new(state)));
        let sync = LiveSync::start(scoreboard.clone(), store, match_id, updates);
        Ok(Self {
            scoreboard,
            sync: Some(sync),
            camera: None,
        })
    }

    /// Attaches the background camera and starts it facing the table at
    /// 1080p. A capture failure stays in the camera status.
    pub async fn attach_camera(&mut self, camera: Box<dyn Camera>) -> CameraStatus {
        let camera: SharedCamera = Arc::new(Mutex::new(camera));
        let status = {
            let mut camera = camera.lock().await;
            let _ = camera
                .acquire(FacingMode::default(), Resolution::default())
                .await;
            camera.status()
        };
        if let Some(previous) = self.camera.replace(camera) {
            previous.lock().await.teardown();
        }
        status
    }

    pub fn scoreboard(&self) -> SharedScoreboard {
        self.scoreboard.clone()
    }

    pub fn camera(&self) -> Option<SharedCamera> {
        self.camera.clone()
    }

    pub fn is_live(&self) -> bool {
        self.sync.as_ref().is_some_and(LiveSync::is_live)
    }

    /// Stops receiving pushes and stops the camera. In-flight commits are
    /// left to finish.
    pub async fn unmount(self) {
        if let Some(camera) = &self.camera {
            camera.lock().await.teardown();
        }
        info!("Unmounted overlay");
    }
}

impl Drop for OverlaySession {
    fn drop(&mut self) {
        let Some(camera) = &self.camera else {
            return;
        };
        match camera.try_lock() {
            Ok(mut camera) => camera.teardown(),
            Err(_) => warn!("Camera busy while dropping overlay, tracks stop with the feed"),
        }
    }
}
