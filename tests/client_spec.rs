use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio_test::{assert_err, assert_ok};

use windwalker::models::{Certainty, TreatyStatus, View};
use windwalker::{
    ClientError, DataService, HeadlessMap, HttpDataService, MapSurface, MemoryHistory, Windwalker,
};

fn rows() -> Vec<Value> {
    vec![
        json!({
            "id": "1",
            "name": "Treaty with the Delawares",
            "signed_date": "1778-09-17",
            "status": "Active",
            "certainty": "Verified",
            "tribes": [{ "id": "del", "name": "Delaware" }]
        }),
        json!({
            "id": "2",
            "name": "Treaty of Fort Harmar",
            "signed_date": "1789-01-09T00:00:00Z",
            "status": "Broken",
            "certainty": "reported",
            "tribes": [{ "id": "wya", "name": "Wyandot" }, { "id": "sen", "name": "Seneca" }]
        }),
        json!({
            "id": "3",
            "name": "Treaty of Fort Laramie",
            "signed_date": "1851-09-17",
            "status": "Violated",
            "certainty": "Verified",
            "tribes": []
        }),
        json!({
            "id": "4",
            "name": "Undated Agreement",
            "signed_date": "n.d.",
            "tribes": []
        }),
    ]
}

fn signed_year(row: &Value) -> Option<i32> {
    row["signed_date"].as_str()?.get(..4)?.parse().ok()
}

async fn list_treaties(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let year_end = params.get("year_end").and_then(|y| y.parse::<i32>().ok());
    let treaties: Vec<Value> = rows()
        .into_iter()
        .filter(|row| match year_end {
            Some(year) => signed_year(row).is_some_and(|signed| signed <= year),
            None => true,
        })
        .collect();
    Json(json!({ "total": treaties.len(), "treaties": treaties }))
}

async fn get_treaty(Path(id): Path<String>) -> Result<Json<Value>, (StatusCode, String)> {
    let mut row = rows()
        .into_iter()
        .find(|row| row["id"] == id.as_str())
        .ok_or((StatusCode::NOT_FOUND, format!("Treaty {} not found", id)))?;
    row["articles"] = json!([{ "number": 1, "text": "Peace and friendship." }]);
    row["sources"] = json!([{ "name": "Kappler", "source_type": "primary", "reliability": 0.95 }]);
    row["kappler_citation"] = json!("2 Kappler 3");
    Ok(Json(row))
}

async fn search(
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let q = params
        .get("q")
        .filter(|q| q.chars().count() >= 2)
        .ok_or((StatusCode::BAD_REQUEST, "Query must be at least 2 characters".to_string()))?;
    let results: Vec<Value> = rows()
        .into_iter()
        .filter(|row| {
            row["name"]
                .as_str()
                .is_some_and(|name| name.to_lowercase().contains(&q.to_lowercase()))
        })
        .map(|row| json!({ "entity_type": "treaty", "id": row["id"], "title": row["name"], "score": 0.5 }))
        .collect();
    Ok(Json(json!({ "query": q, "total": results.len(), "results": results })))
}

async fn boundaries() -> Json<Value> {
    Json(json!({
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "Name": "Fort Harmar 1789", "color": "#aa0000", "description": "https://native-land.ca/harmar" },
                "geometry": { "type": "Polygon", "coordinates": [[[-81.0, 39.0], [-80.0, 39.0], [-80.0, 40.0], [-81.0, 39.0]]] }
            },
            {
                "type": "Feature",
                "properties": { "Name": "Ancestral Lands", "color": "#555555" },
                "geometry": null
            }
        ]
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "database": "connected" }))
}

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to read address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });
    format!("http://{}", addr)
}

async fn setup() -> HttpDataService {
    let app = Router::new()
        .route("/api/v1/treaties", get(list_treaties))
        .route("/api/v1/treaties/{id}", get(get_treaty))
        .route("/api/v1/search", get(search))
        .route("/api/v1/boundaries", get(boundaries))
        .route("/health", get(health));
    HttpDataService::new(spawn(app).await)
}

mod list_treaties {
    use super::*;

    #[tokio::test]
    async fn unscoped_returns_every_row() {
        let client = setup().await;
        let list = assert_ok!(client.list_treaties(None).await);
        assert_eq!(list.total, 4);
        assert_eq!(list.treaties.len(), 4);
    }

    #[tokio::test]
    async fn year_end_scopes_the_list() {
        let client = setup().await;
        let list = assert_ok!(client.list_treaties(Some(1790)).await);
        let ids: Vec<_> = list.treaties.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["1", "2"]);
    }

    #[tokio::test]
    async fn lenient_fields_parse() {
        let client = setup().await;
        let list = assert_ok!(client.list_treaties(None).await);

        let harmar = &list.treaties[1];
        assert_eq!(harmar.status, TreatyStatus::Unknown);
        assert_eq!(harmar.certainty, Certainty::Reported);
        assert_eq!(harmar.signed_year(), Some(1789));

        let undated = &list.treaties[3];
        assert!(undated.signed_date.is_none());
        assert_eq!(undated.status, TreatyStatus::Unknown);
    }
}

mod get_treaty {
    use super::*;

    #[tokio::test]
    async fn returns_full_record() {
        let client = setup().await;
        let treaty = assert_ok!(client.get_treaty("1").await);
        assert_eq!(treaty.name, "Treaty with the Delawares");
        assert_eq!(treaty.articles.len(), 1);
        assert_eq!(treaty.sources[0].reliability_percent(), 95);
        assert_eq!(treaty.kappler_citation.as_deref(), Some("2 Kappler 3"));
    }

    #[tokio::test]
    async fn maps_404_to_not_found() {
        let client = setup().await;
        let err = assert_err!(client.get_treaty("99").await);
        assert!(matches!(err, ClientError::NotFound(body) if body.contains("99")));
    }
}

mod search {
    use super::*;

    #[tokio::test]
    async fn returns_hits() {
        let client = setup().await;
        let response = assert_ok!(client.search("fort").await);
        assert_eq!(response.total, 2);
        assert_eq!(response.results[0].title, "Treaty of Fort Harmar");
    }

    #[tokio::test]
    async fn maps_400_to_bad_request() {
        let client = setup().await;
        let err = assert_err!(client.search("f").await);
        assert!(matches!(err, ClientError::BadRequest(_)));
    }
}

mod boundaries {
    use super::*;

    #[tokio::test]
    async fn parses_feature_collection() {
        let client = setup().await;
        let collection = assert_ok!(client.boundaries().await);
        assert_eq!(collection.names(), ["Fort Harmar 1789", "Ancestral Lands"]);
        assert_eq!(collection.features[0].year(), Some(1789));
        assert_eq!(
            collection.features[0].properties.description.as_deref(),
            Some("https://native-land.ca/harmar")
        );
    }

    #[tokio::test]
    async fn error_body_is_malformed() {
        let app = Router::new().route(
            "/api/v1/boundaries",
            get(|| async { Json(json!({ "error": "upstream unavailable" })) }),
        );
        let client = HttpDataService::new(spawn(app).await);

        let err = assert_err!(client.boundaries().await);
        assert!(matches!(err, ClientError::Malformed(message) if message == "upstream unavailable"));
    }

    #[tokio::test]
    async fn server_error_is_reported() {
        let app = Router::new().route(
            "/api/v1/treaties",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "database down") }),
        );
        let client = HttpDataService::new(spawn(app).await);

        let err = assert_err!(client.list_treaties(None).await);
        assert!(matches!(err, ClientError::Server(message) if message.contains("database down")));
    }
}

mod health {
    use super::*;

    #[tokio::test]
    async fn reports_healthy() {
        let client = setup().await;
        let health = assert_ok!(client.health().await);
        assert!(health.is_healthy());
        assert_eq!(health.database.as_deref(), Some("connected"));
    }

    #[tokio::test]
    async fn unreachable_service_is_http_error() {
        let client = HttpDataService::new("http://127.0.0.1:1");
        let err = assert_err!(client.health().await);
        assert!(matches!(err, ClientError::Http(_)));
    }
}

mod end_to_end {
    use super::*;

    #[tokio::test]
    async fn engine_over_http() {
        let client = setup().await;
        let map = Arc::new(HeadlessMap::new());
        let surface: Arc<dyn MapSurface> = map.clone();
        let app = Windwalker::new(
            client,
            Arc::new(MemoryHistory::new("/")),
            surface,
            Default::default(),
        );

        assert_eq!(app.start().await.applied(), Some(4));
        assert!(app.snapshot().boundaries_loaded);
        assert_eq!(app.snapshot().visible_boundaries, 2);

        assert_eq!(app.temporal().set_year(1780).await.applied(), Some(1));
        assert_eq!(app.snapshot().visible_boundaries, 0);

        app.navigate("/tribes");
        let screen = app.render();
        assert_eq!(app.snapshot().current_view, View::Tribes);
        assert!(screen.contains("Delaware (1 treaty)"));
        assert!(screen.contains("1780\n"));
    }
}
