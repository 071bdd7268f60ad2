// HTTP location source backed by the fleet REST API
use crate::application::location_source::{FetchError, LocationSource};
use crate::domain::driver::DriverId;
use crate::domain::location::DriverLocationFix;
use crate::infrastructure::session::Session;
use crate::infrastructure::wire::{decode_fix_list, decode_single_fix};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;

const LOCATIONS_PATH: &str = "/transporters/driver-locations";

#[derive(Debug, Clone)]
pub struct HttpLocationSource {
    client: reqwest::Client,
    base_url: String,
    session: Arc<Session>,
}

impl HttpLocationSource {
    pub fn new(
        base_url: String,
        session: Arc<Session>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    fn url(&self, suffix: &str) -> String {
        format!("{}{}{}", self.base_url, LOCATIONS_PATH, suffix)
    }

    /// GET a path, returning the status and raw body. Transport failures and
    /// unreadable bodies are network errors.
    async fn get(&self, url: &str) -> Result<(StatusCode, Vec<u8>), FetchError> {
        let mut request = self.client.get(url).header("Accept", "application/json");
        if let Some(auth) = self.session.authorization() {
            request = request.header("Authorization", auth);
        }

        tracing::debug!("GET {}", url);
        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Network(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            FetchError::Network(format!("reading response from {} failed: {}", url, e))
        })?;

        Ok((status, body.to_vec()))
    }
}

fn status_error(status: StatusCode, body: &[u8]) -> FetchError {
    FetchError::Network(format!(
        "backend returned status {}: {}",
        status,
        String::from_utf8_lossy(body)
    ))
}

#[async_trait]
impl LocationSource for HttpLocationSource {
    async fn fetch_all(&self) -> Result<Vec<DriverLocationFix>, FetchError> {
        let (status, body) = self.get(&self.url("")).await?;
        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        let fixes = decode_fix_list(&body)?;
        tracing::debug!("Fetched {} driver locations", fixes.len());
        Ok(fixes)
    }

    async fn fetch_one(&self, driver_id: DriverId) -> Result<DriverLocationFix, FetchError> {
        let (status, body) = self.get(&self.url(&format!("/{}", driver_id))).await?;
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(driver_id));
        }
        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        decode_single_fix(&body, driver_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::{HeaderMap, StatusCode as AxumStatus};
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::Router;

    const LIST: &str = r#"{
        "success": true, "message": "ok",
        "data": [
            { "id": 1, "driver_id": 10, "latitude": "9.05", "longitude": "7.49" },
            { "id": 2, "driver_id": 20, "latitude": "string", "longitude": "string" }
        ],
        "metadata": { "page": 1 }
    }"#;

    async fn list(headers: HeaderMap) -> impl IntoResponse {
        match headers.get("authorization").and_then(|v| v.to_str().ok()) {
            Some("Bearer secret") => (AxumStatus::OK, LIST.to_string()),
            _ => (AxumStatus::UNAUTHORIZED, "denied".to_string()),
        }
    }

    async fn one(Path(id): Path<i64>) -> impl IntoResponse {
        match id {
            10 => (
                AxumStatus::OK,
                r#"{ "success": true, "message": "ok", "metadata": null,
                     "data": { "id": 1, "driver_id": 10, "latitude": 9.05, "longitude": 7.49 } }"#,
            ),
            20 => (AxumStatus::OK, r#"{ "message": "no flag" }"#),
            _ => (AxumStatus::NOT_FOUND, r#"{ "success": false }"#),
        }
    }

    /// Serve a fake backend on an ephemeral port and return its base URL
    async fn backend() -> String {
        let router = Router::new()
            .route("/api/transporters/driver-locations", get(list))
            .route("/api/transporters/driver-locations/:id", get(one));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/api/", addr)
    }

    fn source(base_url: String, token: Option<&str>) -> HttpLocationSource {
        let session = Arc::new(Session::new(token.map(str::to_string)));
        HttpLocationSource::new(base_url, session, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_all_sends_session_token() {
        let base = backend().await;

        let fixes = source(base.clone(), Some("secret")).fetch_all().await.unwrap();
        assert_eq!(fixes.len(), 2);
        assert!(fixes[0].coordinate().is_some());
        assert!(fixes[1].coordinate().is_none());

        let err = source(base, None).fetch_all().await.unwrap_err();
        assert!(matches!(err, FetchError::Network(msg) if msg.contains("401")));
    }

    #[tokio::test]
    async fn test_token_change_applies_to_next_request() {
        let base = backend().await;
        let session = Arc::new(Session::new(None));
        let source =
            HttpLocationSource::new(base, session.clone(), Duration::from_secs(5)).unwrap();

        assert!(source.fetch_all().await.is_err());
        session.set_token("secret");
        assert!(source.fetch_all().await.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_one_outcomes() {
        let source = source(backend().await, None);

        let fix = source.fetch_one(DriverId(10)).await.unwrap();
        assert_eq!(fix.coordinate().unwrap().latitude, 9.05);

        assert!(matches!(
            source.fetch_one(DriverId(20)).await,
            Err(FetchError::MalformedResponse(_))
        ));
        assert_eq!(
            source.fetch_one(DriverId(30)).await,
            Err(FetchError::NotFound(DriverId(30)))
        );
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = source(format!("http://{}", addr), None)
            .fetch_all()
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
    }
}
