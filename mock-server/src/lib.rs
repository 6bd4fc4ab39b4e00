use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
}

#[derive(Default)]
pub struct Db {
    users: RwLock<BTreeMap<u64, User>>,
    next_id: AtomicU64,
}

pub type SharedDb = Arc<Db>;

pub fn app() -> Router {
    let db: SharedDb = Arc::new(Db::default());
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/status/{code}", get(fixed_status))
        .route("/garbage", get(garbage))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_users(State(db): State<SharedDb>) -> Json<Vec<User>> {
    let users = db.users.read().await;
    Json(users.values().cloned().collect())
}

/// Stores the user under a fresh id when `id` is 0, otherwise under the
/// given id. Fresh ids always lie above every id stored so far. Answers 200
/// rather than 201.
async fn create_user(State(db): State<SharedDb>, Json(mut input): Json<User>) -> Json<User> {
    if input.id == 0 {
        input.id = db.next_id.fetch_add(1, Ordering::Relaxed) + 1;
    } else {
        db.next_id.fetch_max(input.id, Ordering::Relaxed);
    }
    debug!(id = input.id, "created user");
    db.users.write().await.insert(input.id, input.clone());
    Json(input)
}

async fn get_user(
    State(db): State<SharedDb>,
    Path(id): Path<u64>,
) -> Result<Json<User>, StatusCode> {
    let users = db.users.read().await;
    users.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_user(
    State(db): State<SharedDb>,
    Path(id): Path<u64>,
    Json(input): Json<User>,
) -> Result<Json<User>, StatusCode> {
    let mut users = db.users.write().await;
    let user = users.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    user.name = input.name;
    Ok(Json(user.clone()))
}

/// Answers with the removed user so clients always get a body back.
async fn delete_user(
    State(db): State<SharedDb>,
    Path(id): Path<u64>,
) -> Result<Json<User>, StatusCode> {
    let mut users = db.users.write().await;
    let removed = users.remove(&id).ok_or(StatusCode::NOT_FOUND)?;
    debug!(id, "deleted user");
    Ok(Json(removed))
}

async fn fixed_status(Path(code): Path<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}

async fn garbage() -> (StatusCode, &'static str) {
    (StatusCode::OK, "<html>this is not json</html>")
}
