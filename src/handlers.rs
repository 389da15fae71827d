use crate::errors::AppError;
use crate::models::{SelectQuery, StatsResponse, Urge, UrgeNameRequest};
use crate::state::AppState;
use crate::stats::build_stats;
use crate::storage::persist_data;
use crate::store::UrgeStore;
use crate::ui::{render_stats, render_track};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, Redirect},
    Form, Json,
};
use uuid::Uuid;

pub async fn index(State(state): State<AppState>, Query(query): Query<SelectQuery>) -> Html<String> {
    let store = state.store.lock().await;
    Html(render_track(store.urges(), store.main_urge(query.selected())))
}

pub async fn stats_page(
    State(state): State<AppState>,
    Query(query): Query<SelectQuery>,
) -> Html<String> {
    let store = state.store.lock().await;
    let main = store.main_urge(query.selected());
    let stats = main.map(build_stats);
    Html(render_stats(store.urges(), main, stats.as_ref()))
}

pub async fn list_urges(State(state): State<AppState>) -> Json<Vec<Urge>> {
    let store = state.store.lock().await;
    Json(store.urges().to_vec())
}

pub async fn get_urge(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Urge>, AppError> {
    let store = state.store.lock().await;
    let urge = store.get(id).cloned().ok_or_else(|| AppError::unknown_urge(id))?;
    Ok(Json(urge))
}

pub async fn create_urge(
    State(state): State<AppState>,
    Json(payload): Json<UrgeNameRequest>,
) -> Result<(StatusCode, Json<Urge>), AppError> {
    let urge = apply_add(&state, &payload.name).await?;
    Ok((StatusCode::CREATED, Json(urge)))
}

pub async fn rename_urge(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UrgeNameRequest>,
) -> Result<Json<Urge>, AppError> {
    let name = validated_name(&payload.name)?;
    let urge = apply(&state, id, |store| store.rename(id, name)).await?;
    Ok(Json(urge))
}

pub async fn delete_urge(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    apply(&state, id, |store| store.remove(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn tap_urge(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Urge>, AppError> {
    let urge = apply(&state, id, |store| store.record_tap(id)).await?;
    Ok(Json(urge))
}

pub async fn reset_urge(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Urge>, AppError> {
    let urge = apply(&state, id, |store| store.reset(id)).await?;
    Ok(Json(urge))
}

pub async fn urge_stats(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StatsResponse>, AppError> {
    let store = state.store.lock().await;
    let urge = store.get(id).ok_or_else(|| AppError::unknown_urge(id))?;
    Ok(Json(build_stats(urge)))
}

pub async fn main_stats(
    State(state): State<AppState>,
    Query(query): Query<SelectQuery>,
) -> Result<Json<StatsResponse>, AppError> {
    let store = state.store.lock().await;
    let urge = store
        .main_urge(query.selected())
        .ok_or_else(|| AppError::not_found("no urges yet"))?;
    Ok(Json(build_stats(urge)))
}

pub async fn form_add(
    State(state): State<AppState>,
    Form(payload): Form<UrgeNameRequest>,
) -> Result<Redirect, AppError> {
    let urge = apply_add(&state, &payload.name).await?;
    Ok(track_redirect(urge.id))
}

pub async fn form_tap(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Redirect, AppError> {
    apply(&state, id, |store| store.record_tap(id)).await?;
    Ok(track_redirect(id))
}

pub async fn form_reset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Redirect, AppError> {
    apply(&state, id, |store| store.reset(id)).await?;
    Ok(track_redirect(id))
}

pub async fn form_rename(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(payload): Form<UrgeNameRequest>,
) -> Result<Redirect, AppError> {
    let name = validated_name(&payload.name)?;
    apply(&state, id, |store| store.rename(id, name)).await?;
    Ok(track_redirect(id))
}

pub async fn form_delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Redirect, AppError> {
    apply(&state, id, |store| store.remove(id)).await?;
    Ok(Redirect::to("/"))
}

async fn apply_add(state: &AppState, raw_name: &str) -> Result<Urge, AppError> {
    let name = validated_name(raw_name)?;
    let mut store = state.store.lock().await;
    let mut next = store.clone();
    let urge = next.add(name);
    persist_data(&state.data_path, &next).await?;
    *store = next;
    Ok(urge)
}

// Mutates a copy and only swaps it in once the copy is on disk, so a failed
// write leaves the in-memory store as it was.
async fn apply<F>(state: &AppState, id: Uuid, mutation: F) -> Result<Urge, AppError>
where
    F: FnOnce(&mut UrgeStore) -> Option<Urge>,
{
    let mut store = state.store.lock().await;
    let mut next = store.clone();
    let urge = mutation(&mut next).ok_or_else(|| AppError::unknown_urge(id))?;
    persist_data(&state.data_path, &next).await?;
    *store = next;
    Ok(urge)
}

fn validated_name(raw: &str) -> Result<&str, AppError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("name must not be empty"));
    }
    Ok(name)
}

fn track_redirect(id: Uuid) -> Redirect {
    Redirect::to(&format!("/?urge={id}"))
}
