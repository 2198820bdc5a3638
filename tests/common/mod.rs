#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

pub const TOKEN: &str = "test-token";
pub const ACCOUNT: &str = "12";

/// One call as the mock saw it
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub body: Option<Value>,
}

#[derive(Default)]
struct MockState {
    students: Mutex<Vec<Value>>,
    recorded: Mutex<Vec<Recorded>>,
    page_delays: Mutex<HashMap<u64, Duration>>,
    fail_deletes: Mutex<bool>,
}

/// In-process stand-in for the school API, serving the users endpoints
pub struct MockApi {
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockApi {
    pub async fn start(students: usize) -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let addr = SocketAddr::from(([127, 0, 0, 1], port));

        let state = Arc::new(MockState::default());
        *state.students.lock().unwrap() = (1..=students)
            .map(|i| json!({"id": i, "name": format!("Student {i}"), "rollno": i, "classId": (i % 3) + 1}))
            .collect();

        let app = Router::new()
            .route("/api/users/getAll/:account", post(list_post).get(list_get))
            .route("/api/users/delete", delete(delete_user))
            .route("/api/users/getById", get(get_user))
            .route("/api/users/save", post(save_user))
            .route("/api/users/update", put(save_user))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind(addr).await.context("failed to bind mock api")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { base_url: format!("http://{}", addr), state })
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.state.recorded.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> Vec<Recorded> {
        self.recorded().into_iter().filter(|r| r.path.contains("/getAll/")).collect()
    }

    pub fn delay_page(&self, page: u64, delay: Duration) {
        self.state.page_delays.lock().unwrap().insert(page, delay);
    }

    pub fn fail_deletes(&self) {
        *self.state.fail_deletes.lock().unwrap() = true;
    }

    pub fn student_count(&self) -> usize {
        self.state.students.lock().unwrap().len()
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"message": "Full authentication is required"}))).into_response()
}

fn record(state: &MockState, method: Method, path: String, query: HashMap<String, String>, body: Option<Value>) {
    state.recorded.lock().unwrap().push(Recorded { method, path, query, body });
}

async fn page_of(state: &MockState, page: u64, size: u64, class_id: Option<i64>) -> Value {
    let delay = state.page_delays.lock().unwrap().get(&page).copied();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let students: Vec<Value> = state
        .students
        .lock()
        .unwrap()
        .iter()
        .filter(|s| class_id.map_or(true, |c| s["classId"] == c))
        .cloned()
        .collect();
    let content: Vec<Value> = students
        .iter()
        .skip((page * size) as usize)
        .take(size as usize)
        .map(|s| {
            let mut row = s.clone();
            row["page"] = json!(page);
            row
        })
        .collect();
    json!({"content": content, "totalElements": students.len()})
}

async fn list_post(
    State(state): State<Arc<MockState>>,
    Path(account): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record(&state, Method::POST, format!("/api/users/getAll/{account}"), query, Some(body.clone()));
    if !authorized(&headers) {
        return unauthorized();
    }

    let page = body["page"].as_u64().unwrap_or(0);
    let size = body["size"].as_u64().unwrap_or(5).max(1);
    Json(page_of(&state, page, size, body["classId"].as_i64()).await).into_response()
}

async fn list_get(
    State(state): State<Arc<MockState>>,
    Path(account): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    record(&state, Method::GET, format!("/api/users/getAll/{account}"), query.clone(), None);
    if !authorized(&headers) {
        return unauthorized();
    }

    let num = |k: &str, d: u64| query.get(k).and_then(|v| v.parse().ok()).unwrap_or(d);
    let class_id = query.get("classId").and_then(|v| v.parse().ok());
    Json(page_of(&state, num("page", 0), num("size", 5).max(1), class_id).await).into_response()
}

async fn delete_user(
    State(state): State<Arc<MockState>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    record(&state, Method::DELETE, "/api/users/delete".into(), query.clone(), None);
    if !authorized(&headers) {
        return unauthorized();
    }
    if *state.fail_deletes.lock().unwrap() {
        return (StatusCode::CONFLICT, Json(json!({"message": "Student has attendance records"}))).into_response();
    }

    let Some(id) = query.get("id").and_then(|v| v.parse::<i64>().ok()) else {
        return (StatusCode::BAD_REQUEST, Json(json!({"message": "id is required"}))).into_response();
    };
    let mut students = state.students.lock().unwrap();
    let before = students.len();
    students.retain(|s| s["id"] != id);
    if students.len() == before {
        return (StatusCode::NOT_FOUND, Json(json!({"message": "No such user"}))).into_response();
    }
    StatusCode::OK.into_response()
}

async fn get_user(
    State(state): State<Arc<MockState>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    record(&state, Method::GET, "/api/users/getById".into(), query.clone(), None);
    if !authorized(&headers) {
        return unauthorized();
    }
    let id = query.get("id").and_then(|v| v.parse::<i64>().ok());
    let found = state.students.lock().unwrap().iter().find(|s| id.is_some() && s["id"].as_i64() == id).cloned();
    match found {
        Some(student) => Json(student).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"message": "No such user"}))).into_response(),
    }
}

async fn save_user(
    State(state): State<Arc<MockState>>,
    method: Method,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let path = if method == Method::PUT { "/api/users/update" } else { "/api/users/save" };
    record(&state, method.clone(), path.into(), HashMap::new(), Some(body.clone()));
    if !authorized(&headers) {
        return unauthorized();
    }
    if body.get("name").and_then(Value::as_str).map_or(true, str::is_empty) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"message": "Validation failed", "errors": {"name": "must not be blank"}})),
        )
            .into_response();
    }

    if method == Method::PUT {
        return (StatusCode::OK, "updated").into_response();
    }
    let mut students = state.students.lock().unwrap();
    let id = students.iter().filter_map(|s| s["id"].as_i64()).max().unwrap_or(0) + 1;
    let mut created = body;
    created["id"] = json!(id);
    students.push(created.clone());
    (StatusCode::CREATED, Json(created)).into_response()
}
