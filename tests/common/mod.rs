// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process fake of the garage REST API, plus a client wired against it.

#![allow(dead_code)]

use axum::{
    extract::{Path, Request, State},
    http::{header::AUTHORIZATION, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use garage_desk::config::Config;
use garage_desk::storage::MemoryStore;
use garage_desk::AppContext;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Password accepted by the fake login endpoint.
pub const PASSWORD: &str = "secret123";

pub const ADMIN_EMAIL: &str = "admin@garage-one.test";
pub const OTHER_COMPANY_EMAIL: &str = "boss@garage-two.test";
pub const SERVICE_EMAIL: &str = "workshop@garage-one.test";
/// Platform operator with no company
pub const PLATFORM_EMAIL: &str = "ops@garage-desk.test";

/// Server-side state of the fake API.
pub struct Backend {
    calls: Mutex<Vec<String>>,
    access_token: Mutex<String>,
    refresh_token: Mutex<String>,
    issued: AtomicUsize,
    next_id: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    /// When false, `/auth/refresh` answers 401
    pub refresh_enabled: AtomicBool,
    /// When true, every bearer-authenticated request answers 401
    pub reject_all: AtomicBool,
    /// When true, authenticated GETs answer 500
    pub fail_reads: AtomicBool,
    /// Record whose stop answers 500
    failing_stop: Mutex<Option<String>>,
    garages: Mutex<Vec<Value>>,
    users: Mutex<Vec<Value>>,
    tasks: Mutex<Vec<Value>>,
}

impl Backend {
    fn seeded() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            access_token: Mutex::new(String::new()),
            refresh_token: Mutex::new(String::new()),
            issued: AtomicUsize::new(0),
            next_id: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            refresh_enabled: AtomicBool::new(true),
            reject_all: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
            failing_stop: Mutex::new(None),
            garages: Mutex::new(vec![
                garage("G1", "Atelier Nord", "C1"),
                garage("G2", "Atelier Sud", "C1"),
                garage("G3", "Garage Two", "C2"),
            ]),
            users: Mutex::new(vec![
                json!({
                    "id": "U1", "email": ADMIN_EMAIL, "role": 2,
                    "first_name": "Alice", "last_name": "Martin",
                    "company_id": "C1", "card_uid": "CARD-1"
                }),
                json!({
                    "id": "U2", "email": OTHER_COMPANY_EMAIL, "role": 2,
                    "first_name": "Bruno", "last_name": "Petit",
                    "company_id": "C2"
                }),
                json!({
                    "id": "U3", "email": SERVICE_EMAIL, "role": 1,
                    "first_name": "Atelier", "last_name": "Nord",
                    "company_id": "C1", "garage_id": "G1", "is_service_account": true
                }),
                // Legacy camelCase spelling
                json!({
                    "id": "U4", "email": "chloe@garage-one.test", "role": 0,
                    "firstName": "Chloe", "lastName": "Bernard",
                    "companyId": "C1", "garageId": "G1"
                }),
                json!({
                    "id": "U5", "email": "root@garage-one.test", "role": 3,
                    "first_name": "Root", "last_name": "",
                    "company_id": "C1", "card_uid": "CARD-5"
                }),
                json!({
                    "id": "U6", "email": PLATFORM_EMAIL, "role": 3,
                    "first_name": "Ops", "last_name": "",
                    "company_id": null
                }),
            ]),
            tasks: Mutex::new(vec![
                task("T1", "Vidange", "C1", "G1", 0, vec![]),
                task(
                    "T2",
                    "Embrayage",
                    "C1",
                    "G1",
                    0,
                    vec![
                        record("R-a", "T2", "U1", None),
                        record("R-b", "T2", "U4", None),
                        record("R-c", "T2", "U4", Some("2026-10-01T10:00:00Z")),
                    ],
                ),
                task("T3", "Pneus", "C1", "G2", 1, vec![]),
                task("T4", "Freins", "C2", "G3", 0, vec![]),
            ]),
        }
    }

    /// Every request seen, as `"METHOD /path"`, in arrival order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Invalidate the current access token; the refresh token stays valid.
    pub fn expire_access_token(&self) {
        *self.access_token.lock().unwrap() = "expired".to_string();
    }

    /// Make the stop of `record_id` fail with a server error.
    pub fn fail_stop(&self, record_id: &str) {
        *self.failing_stop.lock().unwrap() = Some(record_id.to_string());
    }

    /// Open a work interval directly on the server, as another workstation would.
    pub fn open_record(&self, task_id: &str, record_id: &str, user_id: &str) {
        let mut tasks = self.tasks.lock().unwrap();
        if let Some(records) = tasks
            .iter_mut()
            .find(|t| t["id"] == task_id)
            .and_then(|t| t["task_records"].as_array_mut())
        {
            records.push(record(record_id, task_id, user_id, None));
        }
    }

    pub fn task(&self, id: &str) -> Option<Value> {
        self.tasks.lock().unwrap().iter().find(|t| t["id"] == id).cloned()
    }

    pub fn user(&self, id: &str) -> Option<Value> {
        self.users.lock().unwrap().iter().find(|u| u["id"] == id).cloned()
    }

    fn issue_tokens(&self) -> (String, String) {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let access = format!("access-{}", n);
        let refresh = format!("refresh-{}", n);
        *self.access_token.lock().unwrap() = access.clone();
        *self.refresh_token.lock().unwrap() = refresh.clone();
        (access, refresh)
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

fn garage(id: &str, name: &str, company_id: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "company_id": company_id,
        "address": {
            "street": "1 rue du Port",
            "city": "Nantes",
            "postal_code": "44000",
            "country": "France"
        }
    })
}

fn task(
    id: &str,
    name: &str,
    company_id: &str,
    garage_id: &str,
    status: i64,
    records: Vec<Value>,
) -> Value {
    json!({
        "id": id,
        "name": name,
        "immatriculation": "AB-123-CD",
        "vehicle_model": "Clio",
        "hours": 2.0,
        "price": 180.0,
        "status": status,
        "company_id": company_id,
        "garage_id": garage_id,
        "task_records": records
    })
}

fn record(id: &str, task_id: &str, user_id: &str, end: Option<&str>) -> Value {
    json!({
        "id": id,
        "task_id": task_id,
        "user_id": user_id,
        "start_date": "2026-10-01T08:00:00Z",
        "end_date": end
    })
}

/// Copy every field of `patch` onto `target`.
fn merge(target: &mut Value, patch: &Value) {
    if let (Some(target), Some(patch)) = (target.as_object_mut(), patch.as_object()) {
        for (key, value) in patch {
            target.insert(key.clone(), value.clone());
        }
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

type Shared = State<Arc<Backend>>;

// ─── Middleware ─────────────────────────────────────────────────────────────

async fn guard(State(backend): Shared, req: Request, next: Next) -> Response {
    let call = format!("{} {}", req.method(), req.uri().path());
    backend.calls.lock().unwrap().push(call);

    if req.uri().path().starts_with("/auth/") {
        return next.run(req).await;
    }

    let expected = format!("Bearer {}", backend.access_token.lock().unwrap());
    let presented = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if backend.reject_all.load(Ordering::SeqCst) || presented != Some(expected.as_str()) {
        return error(StatusCode::UNAUTHORIZED, "Invalid or expired token");
    }
    if backend.fail_reads.load(Ordering::SeqCst) && req.method() == Method::GET {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Database unavailable");
    }

    next.run(req).await
}

// ─── Auth ───────────────────────────────────────────────────────────────────

async fn login(State(backend): Shared, Json(body): Json<Value>) -> Response {
    if body["password"] != PASSWORD {
        return error(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }
    let Some(user) = backend
        .users
        .lock()
        .unwrap()
        .iter()
        .find(|u| u["email"] == body["email"])
        .cloned()
    else {
        return error(StatusCode::UNAUTHORIZED, "Invalid credentials");
    };

    let (access, refresh) = backend.issue_tokens();
    Json(json!({ "access_token": access, "refresh_token": refresh, "user": user }))
        .into_response()
}

async fn refresh(State(backend): Shared, Json(body): Json<Value>) -> Response {
    backend.refresh_calls.fetch_add(1, Ordering::SeqCst);

    let current = backend.refresh_token.lock().unwrap().clone();
    if !backend.refresh_enabled.load(Ordering::SeqCst) || body["refresh_token"] != current {
        return error(StatusCode::UNAUTHORIZED, "Refresh token revoked");
    }

    let (access, refresh) = backend.issue_tokens();
    Json(json!({ "access_token": access, "refresh_token": refresh })).into_response()
}

// ─── Garages ────────────────────────────────────────────────────────────────

async fn company_garages(State(backend): Shared, Path(company_id): Path<String>) -> Response {
    let garages: Vec<Value> = backend
        .garages
        .lock()
        .unwrap()
        .iter()
        .filter(|g| g["company_id"] == company_id)
        .cloned()
        .collect();
    Json(json!({ "garages": garages })).into_response()
}

async fn create_garage(State(backend): Shared, Json(body): Json<Value>) -> Response {
    let id = backend.next_id("G-new-");
    let created = json!({
        "id": id,
        "name": body["name"],
        "address": body["address"],
        "company_id": body["company_id"]
    });
    backend.garages.lock().unwrap().push(created.clone());

    (
        StatusCode::CREATED,
        Json(json!({
            "message": "Garage created",
            "garage": created,
            "service_account": { "email": format!("{}@service.test", id) }
        })),
    )
        .into_response()
}

async fn update_garage(
    State(backend): Shared,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut garages = backend.garages.lock().unwrap();
    let Some(garage) = garages.iter_mut().find(|g| g["id"] == id) else {
        return error(StatusCode::NOT_FOUND, "Garage not found");
    };
    if let Some(name) = body.get("name") {
        garage["name"] = name.clone();
    }
    if let Some(address) = body.get("address") {
        garage["address"] = address.clone();
    }
    Json(json!({ "garage": garage })).into_response()
}

async fn delete_garage(State(backend): Shared, Path(id): Path<String>) -> Response {
    backend.garages.lock().unwrap().retain(|g| g["id"] != id);
    StatusCode::NO_CONTENT.into_response()
}

// ─── Users ──────────────────────────────────────────────────────────────────

async fn company_users(State(backend): Shared, Path(company_id): Path<String>) -> Response {
    let users: Vec<Value> = backend
        .users
        .lock()
        .unwrap()
        .iter()
        .filter(|u| u["company_id"] == company_id || u["companyId"] == company_id)
        .cloned()
        .collect();
    // Bare array on this endpoint
    Json(users).into_response()
}

async fn associate_card(
    State(backend): Shared,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut users = backend.users.lock().unwrap();
    let Some(user) = users.iter_mut().find(|u| u["id"] == id) else {
        return error(StatusCode::NOT_FOUND, "User not found");
    };
    user["card_uid"] = body["card_uid"].clone();
    Json(json!({ "user": user })).into_response()
}

async fn dissociate_card(State(backend): Shared, Path(id): Path<String>) -> Response {
    let mut users = backend.users.lock().unwrap();
    let Some(user) = users.iter_mut().find(|u| u["id"] == id) else {
        return error(StatusCode::NOT_FOUND, "User not found");
    };
    user["card_uid"] = Value::Null;
    Json(json!({ "user": user })).into_response()
}

async fn create_user(State(backend): Shared, Json(body): Json<Value>) -> Response {
    let created = json!({
        "id": backend.next_id("U-new-"),
        "email": body["email"],
        "role": body["role"],
        "first_name": body["first_name"],
        "last_name": body["last_name"],
        "company_id": body["company_id"],
        "garage_id": body["garage_id"]
    });
    backend.users.lock().unwrap().push(created.clone());
    (StatusCode::CREATED, Json(json!({ "user": created }))).into_response()
}

async fn update_user(
    State(backend): Shared,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut users = backend.users.lock().unwrap();
    let Some(user) = users.iter_mut().find(|u| u["id"] == id) else {
        return error(StatusCode::NOT_FOUND, "User not found");
    };
    merge(user, &body);
    Json(json!({ "user": user })).into_response()
}

async fn delete_user(State(backend): Shared, Path(id): Path<String>) -> Response {
    backend.users.lock().unwrap().retain(|u| u["id"] != id);
    StatusCode::NO_CONTENT.into_response()
}

// ─── Tasks ──────────────────────────────────────────────────────────────────

async fn company_tasks(State(backend): Shared, Path(company_id): Path<String>) -> Response {
    // Includes finished tasks; the client filters them out.
    let tasks: Vec<Value> = backend
        .tasks
        .lock()
        .unwrap()
        .iter()
        .filter(|t| t["company_id"] == company_id)
        .cloned()
        .collect();
    Json(json!({ "tasks": tasks })).into_response()
}

async fn garage_tasks(State(backend): Shared, Path(garage_id): Path<String>) -> Response {
    let tasks: Vec<Value> = backend
        .tasks
        .lock()
        .unwrap()
        .iter()
        .filter(|t| t["garage_id"] == garage_id && t["status"] == 0)
        .cloned()
        .collect();
    Json(tasks).into_response()
}

async fn start_task(
    State(backend): Shared,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let record_id = backend.next_id("R");
    let mut tasks = backend.tasks.lock().unwrap();
    let Some(task) = tasks.iter_mut().find(|t| t["id"] == id) else {
        return error(StatusCode::NOT_FOUND, "Task not found");
    };
    let Some(records) = task["task_records"].as_array_mut() else {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Corrupt task");
    };
    if records
        .iter()
        .any(|r| r["user_id"] == body["user_id"] && r["end_date"].is_null())
    {
        return error(StatusCode::CONFLICT, "User already working on this task");
    }

    let created = json!({
        "id": record_id,
        "task_id": id,
        "user_id": body["user_id"],
        "start_date": now(),
        "end_date": null
    });
    records.push(created.clone());
    (StatusCode::CREATED, Json(json!({ "record": created }))).into_response()
}

async fn stop_record(
    State(backend): Shared,
    Path((task_id, record_id)): Path<(String, String)>,
) -> Response {
    if backend.failing_stop.lock().unwrap().as_deref() == Some(record_id.as_str()) {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Clock service unavailable");
    }
    let mut tasks = backend.tasks.lock().unwrap();
    let record = tasks
        .iter_mut()
        .find(|t| t["id"] == task_id)
        .and_then(|t| t["task_records"].as_array_mut())
        .and_then(|records| records.iter_mut().find(|r| r["id"] == record_id));
    let Some(record) = record else {
        return error(StatusCode::NOT_FOUND, "Record not found");
    };
    if record["end_date"].is_null() {
        record["end_date"] = json!(now());
    }
    // Bare record on this endpoint
    Json(record.clone()).into_response()
}

async fn set_task_status(
    State(backend): Shared,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut tasks = backend.tasks.lock().unwrap();
    let Some(task) = tasks.iter_mut().find(|t| t["id"] == id) else {
        return error(StatusCode::NOT_FOUND, "Task not found");
    };
    task["status"] = body["status"].clone();
    Json(json!({ "task": task })).into_response()
}

async fn create_task(State(backend): Shared, Json(body): Json<Value>) -> Response {
    let Some(company_id) = backend
        .garages
        .lock()
        .unwrap()
        .iter()
        .find(|g| g["id"] == body["garage_id"])
        .map(|g| g["company_id"].clone())
    else {
        return error(StatusCode::NOT_FOUND, "Garage not found");
    };

    let mut created = json!({
        "id": backend.next_id("T-new-"),
        "status": 0,
        "company_id": company_id,
        "task_records": []
    });
    merge(&mut created, &body);
    backend.tasks.lock().unwrap().push(created.clone());
    (StatusCode::CREATED, Json(json!({ "task": created }))).into_response()
}

async fn update_task(
    State(backend): Shared,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut tasks = backend.tasks.lock().unwrap();
    let Some(task) = tasks.iter_mut().find(|t| t["id"] == id) else {
        return error(StatusCode::NOT_FOUND, "Task not found");
    };
    merge(task, &body);
    Json(json!({ "task": task })).into_response()
}

async fn delete_task(State(backend): Shared, Path(id): Path<String>) -> Response {
    backend.tasks.lock().unwrap().retain(|t| t["id"] != id);
    StatusCode::NO_CONTENT.into_response()
}

// ─── Reporting ──────────────────────────────────────────────────────────────

async fn company_analytics(Path(company_id): Path<String>) -> Response {
    if company_id != "C1" {
        return Json(json!([])).into_response();
    }
    Json(json!({
        "analytics": [{
            "id": "A1",
            "garage_id": "G1",
            "monthly_analytics": [{
                "date": "2026-09",
                "chiffre_affaires_total": 5400.0,
                "rentabilite": 0.32,
                "taux_retard": 0.08,
                "taux_annulation": 0.02,
                "perte_estimee": 110.0,
                "revenu_moyen_par_tache": 180.0
            }]
        }]
    }))
    .into_response()
}

async fn company(Path(id): Path<String>) -> Response {
    Json(json!({
        "company": {
            "id": id,
            "name": format!("Company {}", id),
            "address": {
                "street": "12 quai de la Fosse",
                "city": "Nantes",
                "postal_code": "44000",
                "country": "France"
            },
            "siret": "12345678900011"
        }
    }))
    .into_response()
}

fn router(backend: Arc<Backend>) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/garages", post(create_garage))
        .route("/garages/company/{id}", get(company_garages))
        .route("/garages/{id}", patch(update_garage).delete(delete_garage))
        .route("/users", post(create_user))
        .route("/users/company/{id}", get(company_users))
        .route("/users/{id}", patch(update_user).delete(delete_user))
        .route("/users/{id}/associate-card", patch(associate_card))
        .route("/users/{id}/dissociate-card", patch(dissociate_card))
        .route("/tasks", post(create_task))
        .route("/tasks/{id}", patch(update_task).delete(delete_task))
        .route("/tasks/company/{id}/active", get(company_tasks))
        .route("/tasks/garage/{id}/active", get(garage_tasks))
        .route("/tasks/{id}/start", post(start_task))
        .route("/tasks/{id}/records/{rid}/stop", patch(stop_record))
        .route("/tasks/{id}/status", patch(set_task_status))
        .route("/analytics/company/{id}", get(company_analytics))
        .route("/companies/{id}", get(company))
        .layer(middleware::from_fn_with_state(backend.clone(), guard))
        .with_state(backend)
}

/// A client context talking to a freshly seeded fake API.
pub struct TestApp {
    pub ctx: AppContext,
    pub backend: Arc<Backend>,
    /// Backing store of every domain cache
    pub caches: MemoryStore,
    pub session: MemoryStore,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let backend = Arc::new(Backend::seeded());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("No local address");

        let app = router(backend.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server failed");
        });

        let config = Config {
            api_base_url: format!("http://{}", addr),
            ..Config::default()
        };
        let session = MemoryStore::new();
        let caches = MemoryStore::new();
        let ctx = AppContext::with_stores(
            config,
            Arc::new(session.clone()),
            Arc::new(caches.clone()),
        )
        .expect("Failed to build client context");

        Self {
            ctx,
            backend,
            caches,
            session,
        }
    }

    /// Spawn and log in as `email`.
    pub async fn logged_in(email: &str) -> Self {
        let app = Self::spawn().await;
        app.ctx
            .auth
            .login(email, PASSWORD)
            .await
            .expect("Login should succeed");
        app.backend.reset_calls();
        app
    }
}
