use crate::adapters::media_devices::{MediaDeviceError, MediaDevices, MediaStream, VideoSurface};
use crate::common::error::{AppError, ServiceResult};
use crate::models::matches::{Match, MatchCommit};
use crate::models::media::VideoConstraints;
use crate::usecases::match_store::MatchStore;
use crate::usecases::matches::MatchUpdates;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

/// Match store held in memory, pushing through a broadcast channel.
pub struct InMemoryMatchStore {
    matches: Mutex<HashMap<Uuid, Match>>,
    commits: Mutex<Vec<MatchCommit>>,
    updates: Mutex<broadcast::Sender<Match>>,
    fail_updates: AtomicBool,
    fail_subscribes: AtomicBool,
    update_delay: Mutex<Option<Duration>>,
}

impl InMemoryMatchStore {
    pub fn new() -> Arc<Self> {
        let (updates, _) = broadcast::channel(64);
        Arc::new(Self {
            matches: Mutex::new(HashMap::new()),
            commits: Mutex::new(Vec::new()),
            updates: Mutex::new(updates),
            fail_updates: AtomicBool::new(false),
            fail_subscribes: AtomicBool::new(false),
            update_delay: Mutex::new(None),
        })
    }

    /// Stores a default match and returns it.
    pub fn seed(&self) -> Match {
        let m = Match::with_defaults(Uuid::new_v4());
        self.matches.lock().unwrap().insert(m.id, m.clone());
        m
    }

    pub fn get(&self, match_id: Uuid) -> Option<Match> {
        self.matches.lock().unwrap().get(&match_id).cloned()
    }

    /// Simulates a write made by another viewer.
    pub fn push(&self, snapshot: Match) {
        self.matches
            .lock()
            .unwrap()
            .insert(snapshot.id, snapshot.clone());
        let _ = self.updates.lock().unwrap().send(snapshot);
    }

    pub fn commits(&self) -> Vec<MatchCommit> {
        self.commits.lock().unwrap().clone()
    }

    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    pub fn fail_subscribes(&self, fail: bool) {
        self.fail_subscribes.store(fail, Ordering::SeqCst);
    }

    /// The next `update_match` sleeps for `delay` before writing.
    pub fn delay_next_update(&self, delay: Duration) {
        *self.update_delay.lock().unwrap() = Some(delay);
    }

    /// Ends every open subscription, like a dropped pub/sub connection.
    pub fn disconnect_subscribers(&self) {
        let (updates, _) = broadcast::channel(64);
        *self.updates.lock().unwrap() = updates;
    }

    pub fn subscriber_count(&self) -> usize {
        self.updates.lock().unwrap().receiver_count()
    }
}

#[async_trait]
impl MatchStore for InMemoryMatchStore {
    async fn create_match(&self) -> ServiceResult<Match> {
        Ok(self.seed())
    }

    async fn fetch_match(&self, match_id: Uuid) -> ServiceResult<Match> {
        self.get(match_id).ok_or(AppError::MatchesNotFound)
    }

    async fn update_match(&self, match_id: Uuid, commit: &MatchCommit) -> ServiceResult<()> {
        let delay = self.update_delay.lock().unwrap().take();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(AppError::Unexpected);
        }
        let snapshot = {
            let mut matches = self.matches.lock().unwrap();
            let stored = matches
                .get_mut(&match_id)
                .ok_or(AppError::MatchesNotFound)?;
            commit.apply_to(stored);
            stored.updated_at = Utc::now();
            stored.clone()
        };
        self.commits.lock().unwrap().push(commit.clone());
        let _ = self.updates.lock().unwrap().send(snapshot);
        Ok(())
    }

    async fn subscribe(&self, match_id: Uuid) -> ServiceResult<MatchUpdates> {
        if self.fail_subscribes.load(Ordering::SeqCst) {
            return Err(AppError::Unexpected);
        }
        let mut source = self.updates.lock().unwrap().subscribe();
        let (sender, receiver) = mpsc::channel(64);
        let listener = tokio::spawn(async move {
            while let Ok(snapshot) = source.recv().await {
                if snapshot.id != match_id {
                    continue;
                }
                if sender.send(snapshot).await.is_err() {
                    break;
                }
            }
        });
        Ok(MatchUpdates::new(receiver, listener))
    }
}

/// Media devices answering from a queue of scripted outcomes.
///
/// `Ok(n)` yields a stream with `n` tracks.
#[derive(Clone, Default)]
pub struct FakeMediaDevices {
    outcomes: Arc<Mutex<VecDeque<Result<usize, MediaDeviceError>>>>,
    requests: Arc<Mutex<Vec<VideoConstraints>>>,
    stopped_tracks: Arc<AtomicUsize>,
}

impl FakeMediaDevices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue(&self, outcome: Result<usize, MediaDeviceError>) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    pub fn requests(&self) -> Vec<VideoConstraints> {
        self.requests.lock().unwrap().clone()
    }

    pub fn stopped_tracks(&self) -> usize {
        self.stopped_tracks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaDevices for FakeMediaDevices {
    async fn request_video(
        &self,
        constraints: &VideoConstraints,
    ) -> Result<Box<dyn MediaStream>, MediaDeviceError> {
        self.requests.lock().unwrap().push(*constraints);
        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(MediaDeviceError::new("NotFoundError", "no device")));
        let tracks = outcome?;
        Ok(Box::new(FakeStream {
            tracks,
            stopped: false,
            stopped_tracks: self.stopped_tracks.clone(),
        }))
    }
}

struct FakeStream {
    tracks: usize,
    stopped: bool,
    stopped_tracks: Arc<AtomicUsize>,
}

impl MediaStream for FakeStream {
    fn track_count(&self) -> usize {
        self.tracks
    }

    fn stop_tracks(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.stopped_tracks.fetch_add(self.tracks, Ordering::SeqCst);
        }
    }
}

#[derive(Default)]
pub struct FakeSurface {
    pub attached: Option<usize>,
}

impl VideoSurface for FakeSurface {
    fn attach(&mut self, stream: &dyn MediaStream) {
        self.attached = Some(stream.track_count());
    }

    fn detach(&mut self) {
        self.attached = None;
    }
}
