//! HTTP entry transport
//!
//! `EntryTransport` implementation over the journal REST API.

use async_trait::async_trait;
use reqwest::Method;

use super::{ApiClient, EntryTransport, TransportResult};
use crate::collection::ListQuery;
use crate::entry::{Entry, EntryId, EntryPayload, Page};

const ENTRIES_PATH: &str = "/api/smers";

/// Journal entries over HTTP + JSON
#[derive(Debug, Clone)]
pub struct HttpEntryTransport {
    client: ApiClient,
}

impl HttpEntryTransport {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    fn entry_path(id: EntryId) -> String {
        format!("{}/{}", ENTRIES_PATH, id)
    }
}

#[async_trait]
impl EntryTransport for HttpEntryTransport {
    async fn list(&self, query: &ListQuery) -> TransportResult<Page<Entry>> {
        let request = self
            .client
            .request(Method::GET, ENTRIES_PATH)
            .query(&query.to_query_pairs());
        let page: Page<Entry> = self.client.send_json(request).await?;

        tracing::debug!(
            rows = page.data.len(),
            total = page.meta.total,
            page = page.meta.page,
            "fetched entries page"
        );
        Ok(page)
    }

    async fn view(&self, id: EntryId) -> TransportResult<Entry> {
        let request = self.client.request(Method::GET, &Self::entry_path(id));
        self.client.send_json(request).await
    }

    async fn create(&self, payload: &EntryPayload) -> TransportResult<EntryId> {
        let request = self.client.request(Method::POST, ENTRIES_PATH).json(payload);
        let id: EntryId = self.client.send_json(request).await?;
        tracing::info!(entry_id = id, "entry created");
        Ok(id)
    }

    async fn update(&self, id: EntryId, payload: &EntryPayload) -> TransportResult<()> {
        let request = self
            .client
            .request(Method::PATCH, &Self::entry_path(id))
            .json(payload);
        self.client.send(request).await?;
        tracing::info!(entry_id = id, "entry updated");
        Ok(())
    }

    async fn remove(&self, id: EntryId) -> TransportResult<()> {
        let request = self.client.request(Method::DELETE, &Self::entry_path(id));
        self.client.send(request).await?;
        tracing::info!(entry_id = id, "entry removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::{Pagination, SortSpec};
    use crate::config::ApiConfig;
    use crate::transport::{Session, SessionHandle, TransportError};
    use axum::extract::{Path, RawQuery, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recorded {
        queries: Arc<Mutex<Vec<String>>>,
        bodies: Arc<Mutex<Vec<serde_json::Value>>>,
        auth: Arc<Mutex<Vec<Option<String>>>>,
    }

    fn entry_json(id: u64) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "situation": "commute",
            "thoughts": ["late"],
            "emotions": ["stress"],
            "reactions": ["ran"],
            "createdAt": "2024-05-01T08:30:00Z"
        })
    }

    async fn list_entries(
        State(rec): State<Recorded>,
        headers: HeaderMap,
        RawQuery(query): RawQuery,
    ) -> Json<serde_json::Value> {
        rec.queries.lock().unwrap().push(query.unwrap_or_default());
        rec.auth.lock().unwrap().push(
            headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        );
        Json(serde_json::json!({
            "data": [entry_json(1), entry_json(2)],
            "meta": { "total": 12, "page": 2, "limit": 2 }
        }))
    }

    async fn create_entry(
        State(rec): State<Recorded>,
        Json(body): Json<serde_json::Value>,
    ) -> Json<u64> {
        rec.bodies.lock().unwrap().push(body);
        Json(42)
    }

    async fn view_entry(Path(id): Path<u64>) -> Result<Json<serde_json::Value>, StatusCode> {
        if id == 404 {
            Err(StatusCode::NOT_FOUND)
        } else {
            Ok(Json(entry_json(id)))
        }
    }

    async fn update_entry(
        State(rec): State<Recorded>,
        Path(_id): Path<u64>,
        Json(body): Json<serde_json::Value>,
    ) -> StatusCode {
        rec.bodies.lock().unwrap().push(body);
        StatusCode::OK
    }

    async fn delete_entry(headers: HeaderMap) -> (StatusCode, Json<serde_json::Value>) {
        if headers.contains_key("authorization") {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "database down" })),
            )
        } else {
            (StatusCode::UNAUTHORIZED, Json(serde_json::json!({})))
        }
    }

    async fn spawn_stub() -> (String, Recorded) {
        let rec = Recorded::default();
        let app = Router::new()
            .route("/api/smers", get(list_entries).post(create_entry))
            .route(
                "/api/smers/:id",
                get(view_entry).patch(update_entry).delete(delete_entry),
            )
            .with_state(rec.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), rec)
    }

    fn transport(base_url: &str, session: SessionHandle) -> HttpEntryTransport {
        let config = ApiConfig {
            base_url: base_url.to_string(),
            request_timeout_secs: 5,
        };
        HttpEntryTransport::new(ApiClient::new(&config, session).unwrap())
    }

    #[tokio::test]
    async fn test_list_sends_query_and_token() {
        let (url, rec) = spawn_stub().await;
        let session = SessionHandle::with_session(Session::new("abc", "def"));
        let transport = transport(&url, session);

        let query = ListQuery::new(Pagination { page: 2, limit: 2 })
            .sorted_by(vec![SortSpec::desc("createdAt")])
            .filter("emotions", "anger");
        let page = transport.list(&query).await.unwrap();

        assert_eq!(page.data.len(), 2);
        assert_eq!(page.meta.total, 12);
        assert_eq!(
            rec.queries.lock().unwrap()[0],
            "page=2&limit=2&sort=createdAt%3ADESC&filter%5Bemotions%5D=anger"
        );
        assert_eq!(rec.auth.lock().unwrap()[0].as_deref(), Some("Bearer abc"));
    }

    #[tokio::test]
    async fn test_create_and_update_send_payload() {
        let (url, rec) = spawn_stub().await;
        let transport = transport(&url, SessionHandle::new());

        let payload = EntryPayload {
            situation: "felt anxious".to_string(),
            thoughts: vec!["I will fail".to_string()],
            emotions: vec!["anxiety".to_string()],
            reactions: vec!["left the room".to_string()],
        };
        let id = transport.create(&payload).await.unwrap();
        assert_eq!(id, 42);

        transport.update(42, &payload).await.unwrap();

        let bodies = rec.bodies.lock().unwrap();
        assert_eq!(bodies.len(), 2);
        assert_eq!(bodies[0], serde_json::to_value(&payload).unwrap());
        assert!(bodies[0].get("id").is_none());
    }

    #[tokio::test]
    async fn test_view_maps_not_found() {
        let (url, _rec) = spawn_stub().await;
        let transport = transport(&url, SessionHandle::new());

        let entry = transport.view(5).await.unwrap();
        assert_eq!(entry.id, 5);

        let err = transport.view(404).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_remove_maps_error_statuses() {
        let (url, _rec) = spawn_stub().await;

        let anonymous = transport(&url, SessionHandle::new());
        let err = anonymous.remove(1).await.unwrap_err();
        assert!(matches!(err, TransportError::Unauthorized));

        let signed_in = transport(&url, SessionHandle::with_session(Session::from_access_token("t")));
        let err = signed_in.remove(1).await.unwrap_err();
        match err {
            TransportError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "database down");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        // nothing listens on port 9 locally
        let transport = transport("http://127.0.0.1:9", SessionHandle::new());
        let err = transport.view(1).await.unwrap_err();
        assert!(matches!(
            err,
            TransportError::Unavailable | TransportError::Request(_)
        ));
    }
}
