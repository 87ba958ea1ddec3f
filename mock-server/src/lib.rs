use std::{
    collections::BTreeMap,
    sync::{Arc, LazyLock},
};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email pattern")
});

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub artist_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    #[default]
    Draft,
    Active,
    Paused,
    Completed,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Campaign {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub status: CampaignStatus,
    pub campaign_data: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct Store {
    users: BTreeMap<i64, User>,
    campaigns: BTreeMap<i64, Campaign>,
    next_user_id: i64,
    next_campaign_id: i64,
}

pub type Db = Arc<RwLock<Store>>;

/// Error answer: `{"error": message}` with the given status.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

type ApiResult = Result<(StatusCode, Json<Value>), AppError>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    // The production backend only answers `/health` and `/api/users/health`.
    // `/api/health` is served here so `health_check` works with a base URL
    // ending in `/api`; against production that call gets a 404.
    let api: Router<Db> = Router::new()
        .route("/health", get(health))
        .route("/users/health", get(health))
        .route("/users/", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user))
        .route("/campaigns/", post(create_campaign))
        .route("/campaigns/{id}", get(get_campaign))
        .route("/campaigns/{id}/progress", patch(update_campaign_progress));
    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// A non-empty JSON object, or the "No data provided" rejection.
fn payload(body: &Bytes) -> Result<Map<String, Value>, AppError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) if !map.is_empty() => Ok(map),
        _ => Err(AppError::bad_request("No data provided")),
    }
}

fn parse_status(value: &Value) -> Result<CampaignStatus, AppError> {
    serde_json::from_value(value.clone())
        .map_err(|_| AppError::bad_request("Invalid campaign status"))
}

async fn list_users(State(db): State<Db>) -> Json<Value> {
    let store = db.read().await;
    let users: Vec<&User> = store.users.values().collect();
    Json(json!({ "users": users }))
}

async fn create_user(State(db): State<Db>, body: Bytes) -> ApiResult {
    let data = payload(&body)?;
    let email = data
        .get("email")
        .and_then(Value::as_str)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::bad_request("Email is required"))?;
    if !EMAIL.is_match(email) {
        return Err(AppError::bad_request("Invalid email format"));
    }
    let email = email.trim().to_lowercase();
    let artist_name = data
        .get("artist_name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .map(|name| name.trim().to_string());

    let mut store = db.write().await;
    if store.users.values().any(|u| u.email == email) {
        return Err(AppError::new(
            StatusCode::CONFLICT,
            "User with this email already exists",
        ));
    }
    store.next_user_id += 1;
    let now = Utc::now();
    let user = User {
        id: store.next_user_id,
        email,
        artist_name,
        created_at: now,
        updated_at: now,
        is_active: true,
    };
    store.users.insert(user.id, user.clone());
    tracing::info!(user_id = user.id, "user created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "user": user, "message": "User created successfully" })),
    ))
}

async fn get_user(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult {
    let store = db.read().await;
    let user = store
        .users
        .get(&id)
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok((StatusCode::OK, Json(json!({ "user": user }))))
}

async fn create_campaign(State(db): State<Db>, body: Bytes) -> ApiResult {
    let data = payload(&body)?;
    let user_id = data
        .get("user_id")
        .and_then(Value::as_i64)
        .filter(|id| *id != 0);
    let name = data
        .get("name")
        .and_then(Value::as_str)
        .filter(|n| !n.is_empty());
    let (Some(user_id), Some(name)) = (user_id, name) else {
        return Err(AppError::bad_request("User ID and name are required"));
    };
    let status = match data.get("status") {
        Some(Value::Null) | None => CampaignStatus::default(),
        Some(value) => parse_status(value)?,
    };

    let mut store = db.write().await;
    store.next_campaign_id += 1;
    let now = Utc::now();
    let campaign = Campaign {
        id: store.next_campaign_id,
        user_id,
        name: name.to_string(),
        status,
        campaign_data: None,
        created_at: now,
        updated_at: now,
    };
    store.campaigns.insert(campaign.id, campaign.clone());
    tracing::info!(campaign_id = campaign.id, user_id, "campaign created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "campaign": campaign, "message": "Campaign created successfully" })),
    ))
}

async fn get_campaign(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult {
    let store = db.read().await;
    let campaign = store
        .campaigns
        .get(&id)
        .ok_or_else(|| AppError::not_found("Campaign not found"))?;
    Ok((StatusCode::OK, Json(json!({ "campaign": campaign }))))
}

/// Applies `name`, `status` and `campaign_data` when present; other keys are
/// ignored.
async fn update_campaign_progress(
    State(db): State<Db>,
    Path(id): Path<i64>,
    body: Bytes,
) -> ApiResult {
    let data = payload(&body)?;
    let mut store = db.write().await;
    let campaign = store
        .campaigns
        .get_mut(&id)
        .ok_or_else(|| AppError::not_found("Campaign not found"))?;

    let status = data.get("status").map(parse_status).transpose()?;
    if let Some(status) = status {
        campaign.status = status;
    }
    if let Some(name) = data.get("name").and_then(Value::as_str) {
        campaign.name = name.to_string();
    }
    if let Some(campaign_data) = data.get("campaign_data") {
        campaign.campaign_data = Some(campaign_data.clone());
    }
    campaign.updated_at = Utc::now();

    Ok((
        StatusCode::OK,
        Json(json!({ "campaign": campaign, "message": "Campaign updated successfully" })),
    ))
}
