use crate::common::init;
use crate::settings::AppSettings;
use crate::usecases::match_store::{MatchStore, RemoteMatchStore};
use crate::usecases::scoreboard::{OverlaySession, SharedCamera, SharedScoreboard};
use anyhow::anyhow;
use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

pub mod v1;

#[derive(Clone)]
pub struct ApiState {
    pub scoreboard: SharedScoreboard,
    pub store: Option<Arc<dyn MatchStore>>,
    pub camera: Option<SharedCamera>,
}

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/", get(index))
        .nest("/api/v1", v1::router())
}

pub async fn index() -> &'static str {
    "Running scoreboard-service v0.1"
}

pub async fn serve(settings: &AppSettings) -> anyhow::Result<()> {
    let store: Option<Arc<dyn MatchStore>> = if settings.backend_enabled() {
        let state = init::initialize_state(settings).await?;
        Some(Arc::new(RemoteMatchStore::new(state)))
    } else {
        warn!("DATABASE_URL or REDIS_URL is not set, scores will not be persisted");
        None
    };

    let session = OverlaySession::mount(store.clone(), settings.match_id)
        .await
        .map_err(|e| anyhow!("Failed to mount overlay: {}", e.message()))?;
    // no capture backend in a headless process; embedders attach one to the session
    let state = ApiState {
        scoreboard: session.scoreboard(),
        store,
        camera: session.camera(),
    };

    let listener = TcpListener::bind((settings.app_host, settings.app_port)).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, router().with_state(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    session.unmount().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeMediaDevices, FakeSurface, InMemoryMatchStore};
    use crate::usecases::camera_feed::CameraFeed;
    use crate::adapters::media_devices::MediaDeviceError;
    use reqwest::StatusCode;
    use serde_json::{Value, json};

    /// Serves `session` on an ephemeral port and returns its base url.
    async fn spawn_app(session: &OverlaySession, store: Option<Arc<dyn MatchStore>>) -> String {
        let state = ApiState {
            scoreboard: session.scoreboard(),
            store,
            camera: session.camera(),
        };
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router().with_state(state)).await.unwrap();
        });
        format!("http://{addr}/api/v1")
    }

    #[tokio::test]
    async fn draft_for_region_not_under_edit_is_conflict() {
        let session = OverlaySession::mount(None, None).await.unwrap();
        let base = spawn_app(&session, None).await;

        let response = reqwest::Client::new()
            .put(format!("{base}/overlay/regions/match_type/draft"))
            .json(&json!({"kind": "match_type", "match_type": "9-Ball"}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body: Value = response.json().await.unwrap();
        assert_eq!(
            body,
            json!({
                "code": "overlay.region_not_editing",
                "message": "This region is not being edited.",
            })
        );
    }

    #[tokio::test]
    async fn edit_and_save_round_trip() {
        let store = InMemoryMatchStore::new();
        let seeded = store.seed();
        let session = OverlaySession::mount(Some(store.clone()), Some(seeded.id))
            .await
            .unwrap();
        let base = spawn_app(&session, Some(store.clone())).await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{base}/overlay/regions/player_b/edit"))
            .send()
            .await
            .unwrap();
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["player_b"]["editing"], json!(true));

        let response = client
            .put(format!("{base}/overlay/regions/player_b/draft"))
            .json(&json!({"kind": "player", "name": "Fargo", "team": "", "skill": "SL5"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = client
            .post(format!("{base}/overlay/regions/player_b/save"))
            .send()
            .await
            .unwrap();
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["outcome"], json!("persisted"));
        assert_eq!(body["overlay"]["player_b"]["name"], json!("Fargo"));
        assert_eq!(body["overlay"]["player_b"]["team"], json!(seeded.player_b.team));
        assert_eq!(body["overlay"]["camera"], Value::Null);
        assert_eq!(store.get(seeded.id).unwrap().player_b.name, "Fargo");
    }

    #[tokio::test]
    async fn malformed_body_and_missing_backend() {
        let session = OverlaySession::mount(None, None).await.unwrap();
        let base = spawn_app(&session, None).await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{base}/overlay/players/a/score"))
            .json(&json!({"delta": "one"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["code"], json!("decoding_request_failed"));

        let response = client.post(format!("{base}/matches")).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["code"], json!("matches.backend_disabled"));
    }

    #[tokio::test]
    async fn camera_failure_and_retry() {
        let devices = FakeMediaDevices::new();
        devices.queue(Err(MediaDeviceError::new("NotAllowedError", "denied")));
        devices.queue(Ok(1));
        let mut session = OverlaySession::mount(None, None).await.unwrap();
        session
            .attach_camera(Box::new(CameraFeed::new(devices.clone(), FakeSurface::default())))
            .await;
        let base = spawn_app(&session, None).await;
        let client = reqwest::Client::new();

        let body: Value = client
            .get(format!("{base}/overlay"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["camera"]["status"], json!("failed"));
        assert_eq!(body["camera"]["failure"], json!("permission_denied"));
        assert_eq!(body["camera"]["remediation"].as_array().unwrap().len(), 4);

        let body: Value = client
            .post(format!("{base}/overlay/camera/retry"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["camera"]["status"], json!("live"));
        assert_eq!(devices.requests().len(), 2);
    }

    #[tokio::test]
    async fn camera_retry_without_camera_is_not_found() {
        let session = OverlaySession::mount(None, None).await.unwrap();
        let base = spawn_app(&session, None).await;

        let response = reqwest::Client::new()
            .post(format!("{base}/overlay/camera/retry"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
