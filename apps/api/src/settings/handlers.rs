//! Axum route handlers for the Settings API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::settings::store::is_valid_name;
use crate::settings::{suggest, LayoutSettings, SettingsStore};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PresetListResponse {
    pub presets: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestRequest {
    pub image_width: u32,
    pub image_height: u32,
    pub columns: u32,
    pub rows: u32,
}

/// GET /api/v1/settings
pub async fn handle_list_presets(
    State(state): State<AppState>,
) -> Result<Json<PresetListResponse>, AppError> {
    let presets = with_store(&state, |store| store.list()).await?;
    Ok(Json(PresetListResponse { presets }))
}

/// GET /api/v1/settings/default
///
/// Never fails: a missing or broken default preset degrades to defaults.
pub async fn handle_get_default(
    State(state): State<AppState>,
) -> Result<Json<LayoutSettings>, AppError> {
    let settings = with_store(&state, |store| Ok(store.load_default())).await?;
    Ok(Json(settings))
}

/// GET /api/v1/settings/:name
pub async fn handle_get_preset(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<LayoutSettings>, AppError> {
    check_name(&name)?;
    let lookup = name.clone();
    with_store(&state, move |store| store.load(&lookup))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Settings preset {name} not found")))
}

/// PUT /api/v1/settings/:name
///
/// Positional fields are normalized to one decimal place before writing; the
/// stored record is returned.
pub async fn handle_put_preset(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(settings): Json<LayoutSettings>,
) -> Result<Json<LayoutSettings>, AppError> {
    check_name(&name)?;
    let normalized = settings.normalized()?;
    let to_save = normalized.clone();
    with_store(&state, move |store| store.save(&name, &to_save)).await?;
    Ok(Json(normalized))
}

/// POST /api/v1/settings/suggest
///
/// Suggested preset for a sheet image of the given pixel size.
pub async fn handle_suggest(
    Json(request): Json<SuggestRequest>,
) -> Result<Json<LayoutSettings>, AppError> {
    let settings = suggest(
        request.image_width,
        request.image_height,
        request.columns,
        request.rows,
    )?;
    Ok(Json(settings))
}

fn check_name(name: &str) -> Result<(), AppError> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "preset name {name:?} may only contain letters, digits, '_' and '-'"
        )))
    }
}

/// Runs blocking filesystem work against the store off the async executor.
async fn with_store<T, F>(state: &AppState, f: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce(&SettingsStore) -> anyhow::Result<T> + Send + 'static,
{
    let store = state.settings.clone();
    tokio::task::spawn_blocking(move || f(store.as_ref()))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in settings: {e}")))?
        .map_err(|e| AppError::Settings(format!("{e:#}")))
}
