use crate::common::context::Context;
use crate::common::error::ServiceResult;
use crate::models::matches::{Match, MatchCommit};
use crate::usecases::matches::{self, MatchUpdates};
use async_trait::async_trait;
use uuid::Uuid;

/// Durable match records plus a per-match push channel.
#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn create_match(&self) -> ServiceResult<Match>;
    async fn fetch_match(&self, match_id: Uuid) -> ServiceResult<Match>;
    async fn update_match(&self, match_id: Uuid, commit: &MatchCommit) -> ServiceResult<()>;
    async fn subscribe(&self, match_id: Uuid) -> ServiceResult<MatchUpdates>;
}

/// [`MatchStore`] backed by the database and redis pub/sub.
pub struct RemoteMatchStore<C> {
    ctx: C,
}

impl<C: Context> RemoteMatchStore<C> {
    pub fn new(ctx: C) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl<C: Context> MatchStore for RemoteMatchStore<C> {
    async fn create_match(&self) -> ServiceResult<Match> {
        matches::create(&self.ctx).await
    }

    async fn fetch_match(&self, match_id: Uuid) -> ServiceResult<Match> {
        matches::fetch_one(&self.ctx, match_id).await
    }

    async fn update_match(&self, match_id: Uuid, commit: &MatchCommit) -> ServiceResult<()> {
        matches::update(&self.ctx, match_id, commit).await
    }

    async fn subscribe(&self, match_id: Uuid) -> ServiceResult<MatchUpdates> {
        matches::subscribe(&self.ctx, match_id).await
    }
}
