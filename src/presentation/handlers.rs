// HTTP request handlers
use crate::application::board_view::BoardView;
use crate::application::location_source::FetchError;
use crate::domain::driver::DriverId;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::stream::Stream;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::wrappers::WatchStream;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current board: list rows, map scene, selection and lifecycle phase
pub async fn get_board(State(state): State<Arc<AppState>>) -> Json<BoardView> {
    Json(state.board_service.view().await)
}

/// Start a re-fetch; the new fix set lands asynchronously
pub async fn refresh_board(State(state): State<Arc<AppState>>) -> (StatusCode, Json<BoardView>) {
    (StatusCode::ACCEPTED, Json(state.board_service.refresh().await))
}

/// Select a driver from the list or a map marker. Unknown drivers are ignored.
pub async fn select_driver(
    Path(driver_id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Json<BoardView> {
    Json(state.board_service.select(DriverId(driver_id)).await)
}

pub async fn clear_selection(State(state): State<Arc<AppState>>) -> Json<BoardView> {
    Json(state.board_service.clear_selection().await)
}

/// Stream the board as server-sent events, one per change. The stream ends
/// once the board is unmounted.
pub async fn board_events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut views = WatchStream::new(state.board_service.subscribe());

    let stream = async_stream::stream! {
        while let Some(view) = views.next().await {
            match Event::default().event("board").json_data(&view) {
                Ok(event) => yield Ok(event),
                Err(e) => tracing::error!("Failed to encode board event: {}", e),
            }
            if !view.mounted {
                break;
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Single-driver location detail, independent of the board
pub async fn driver_location(
    Path(driver_id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state.detail_service.detail(DriverId(driver_id)).await {
        Ok(view) => Json(view).into_response(),
        Err(FetchError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Location not found." })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Error fetching location of driver {}: {}", driver_id, e);
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({
                    "message": "Failed to load driver location",
                    "error": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub token: String,
}

/// Install the bearer token issued by the login flow
pub async fn set_session_token(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TokenRequest>,
) -> Response {
    if request.token.trim().is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "message": "Token must not be blank" })),
        )
            .into_response();
    }

    state.session.set_token(request.token.trim());
    tracing::info!("Session token replaced");
    StatusCode::NO_CONTENT.into_response()
}

pub async fn clear_session_token(State(state): State<Arc<AppState>>) -> StatusCode {
    state.session.clear_token();
    tracing::info!("Session token cleared");
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::board_service::BoardService;
    use crate::application::driver_detail::DriverDetailService;
    use crate::application::location_board::BoardPhase;
    use crate::application::location_source::LocationSource;
    use crate::domain::driver::DriverSummary;
    use crate::domain::location::{Coordinate, DriverLocationFix, Position};
    use crate::domain::viewport::ViewportController;
    use crate::infrastructure::session::Session;
    use async_trait::async_trait;

    struct FixedSource;

    #[async_trait]
    impl LocationSource for FixedSource {
        async fn fetch_all(&self) -> Result<Vec<DriverLocationFix>, FetchError> {
            Ok(vec![DriverLocationFix {
                id: 1,
                driver_id: DriverId(7),
                position: Position::Known(Coordinate {
                    latitude: 9.0,
                    longitude: 7.0,
                }),
                captured_at: None,
                driver: DriverSummary::default(),
            }])
        }

        async fn fetch_one(&self, driver_id: DriverId) -> Result<DriverLocationFix, FetchError> {
            match driver_id.0 {
                7 => Ok(self.fetch_all().await?.remove(0)),
                13 => Err(FetchError::Network("backend down".into())),
                _ => Err(FetchError::NotFound(driver_id)),
            }
        }
    }

    async fn ready_state() -> Arc<AppState> {
        let source: Arc<dyn LocationSource> = Arc::new(FixedSource);
        let controller = ViewportController::default();
        let state = Arc::new(AppState {
            board_service: BoardService::new(source.clone(), controller),
            detail_service: DriverDetailService::new(source, controller),
            session: Arc::new(Session::new(None)),
        });

        let mut views = state.board_service.subscribe();
        state.board_service.mount().await;
        views
            .wait_for(|v| v.phase == BoardPhase::Ready)
            .await
            .unwrap();
        state
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_select_then_clear() {
        let state = ready_state().await;

        let Json(view) = select_driver(Path(7), State(state.clone())).await;
        assert_eq!(view.selected.map(|s| s.driver_id), Some(DriverId(7)));

        let Json(view) = select_driver(Path(99), State(state.clone())).await;
        assert!(view.selected.is_some());

        let Json(view) = clear_selection(State(state.clone())).await;
        assert!(view.selected.is_none());

        let Json(view) = get_board(State(state)).await;
        assert_eq!(view.rows.len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_is_accepted() {
        let state = ready_state().await;
        let (status, Json(view)) = refresh_board(State(state)).await;

        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(view.phase, BoardPhase::Refreshing);
        assert_eq!(view.rows.len(), 1);
    }

    #[tokio::test]
    async fn test_event_stream_ends_after_unmount() {
        let state = ready_state().await;
        let sse = board_events(State(state.clone())).await;
        state.board_service.unmount().await;

        let bytes = axum::body::to_bytes(sse.into_response().into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.starts_with("event: board"));
        assert!(text.contains(r#""mounted":false"#));
    }

    #[tokio::test]
    async fn test_driver_location_statuses() {
        let state = ready_state().await;

        let found = driver_location(Path(7), State(state.clone())).await;
        assert_eq!(found.status(), StatusCode::OK);
        assert_eq!(body_json(found).await["coordinates"], "9.0000, 7.0000");

        let missing = driver_location(Path(8), State(state.clone())).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(missing).await["message"], "Location not found.");

        let failed = driver_location(Path(13), State(state)).await;
        assert_eq!(failed.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_session_token_rotation() {
        let state = ready_state().await;

        let request = TokenRequest {
            token: " t0k ".to_string(),
        };
        let response = set_session_token(State(state.clone()), Json(request)).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(state.session.authorization().as_deref(), Some("Bearer t0k"));

        let blank = TokenRequest {
            token: "   ".to_string(),
        };
        let response = set_session_token(State(state.clone()), Json(blank)).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(state.session.token().as_deref(), Some("t0k"));

        let status = clear_session_token(State(state.clone())).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(state.session.token(), None);
    }
}
