//! An in-process mock vector-search backend, standing in for the untrusted
//! upstream the proxy forwards to. It stores whatever cipher-space vectors
//! it's given and answers `/query` with a brute-force nearest-neighbor scan
//! in that same cipher space — exactly the "search over garbled coordinates"
//! behavior a real backend would exhibit.

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use axum::{extract::State, routing::post, Json, Router};
use sap_core::Record;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpListener;

#[derive(Default)]
struct Db {
    records: HashMap<String, Record>,
}

type SharedDb = Arc<Mutex<Db>>;

#[derive(Deserialize)]
struct UpsertRequest {
    vectors: Vec<Record>,
}

#[derive(Serialize)]
struct UpsertResponse {
    upserted_count: usize,
}

async fn upsert(State(db): State<SharedDb>, Json(req): Json<UpsertRequest>) -> Json<UpsertResponse> {
    let mut db = db.lock().unwrap();
    let count = req.vectors.len();
    for record in req.vectors {
        let id = record.id.clone().expect("test records always have an id");
        db.records.insert(id, record);
    }
    Json(UpsertResponse {
        upserted_count: count,
    })
}

#[derive(Serialize)]
struct QueryResponse {
    matches: Vec<Record>,
}

async fn query(State(db): State<SharedDb>, Json(body): Json<Value>) -> Json<QueryResponse> {
    let db = db.lock().unwrap();

    // id-only lookup: return the stored record for that id, unchanged.
    if let Some(id) = body.get("id").and_then(Value::as_str) {
        let matches = db.records.get(id).cloned().into_iter().collect();
        return Json(QueryResponse { matches });
    }

    let query_vector: Vec<f32> = body
        .get("vector")
        .cloned()
        .map(|v| serde_json::from_value(v).expect("test query vector is well-formed"))
        .expect("test queries always carry a cipher-space vector");
    let top_k = body.get("topK").and_then(Value::as_u64).unwrap_or(10) as usize;

    let mut scored: Vec<(f32, Record)> = db
        .records
        .values()
        .filter_map(|record| {
            let values = record.values.as_deref()?;
            let dist = sap_crypto::transform::euclidean_distance(values, &query_vector);
            Some((dist, record.clone()))
        })
        .collect();
    scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
    scored.truncate(top_k);

    let matches = scored.into_iter().map(|(_, record)| record).collect();
    Json(QueryResponse { matches })
}

/// Spawn the mock backend on an ephemeral port, returning its base URL.
pub async fn spawn_mock_upstream() -> String {
    let db: SharedDb = Arc::new(Mutex::new(Db::default()));
    let router = Router::new()
        .route("/vectors/upsert", post(upsert))
        .route("/query", post(query))
        .with_state(db);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{addr}")
}

/// Spawn the proxy itself against `upstream_url`, returning its base URL.
pub async fn spawn_proxy(upstream_url: String, beta: f32) -> String {
    let config = sap_core::ConfigHandle::new(sap_core::SharedConfig {
        upstream_url,
        control_plane_url: String::new(),
        beta,
    });
    let state = Arc::new(sap_proxy::server::ProxyState::new(config));
    let router = sap_proxy::server::router(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{addr}")
}
