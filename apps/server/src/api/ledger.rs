use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, put},
    Extension, Json, Router,
};
use networth_core::session::UserId;
use networth_core::{
    AssetCategory, BreakdownItem, GoalProgress, LedgerServiceTrait, LedgerSummary,
    NetWorthPoint, Snapshot, SnapshotForm,
};

use crate::{
    error::ApiResult,
    main_lib::AppState,
    models::{ChangeResponse, GoalRequest, GoalResponse, NewSnapshotRequest},
};

async fn get_summary(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserId>,
) -> ApiResult<Json<LedgerSummary>> {
    let ledger = state.ledger_for(&user)?;
    Ok(Json(ledger.summary()?))
}

async fn list_snapshots(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserId>,
) -> ApiResult<Json<Vec<Snapshot>>> {
    let ledger = state.ledger_for(&user)?;
    Ok(Json(ledger.snapshots()?))
}

async fn create_snapshot(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserId>,
    Json(request): Json<NewSnapshotRequest>,
) -> ApiResult<Json<Snapshot>> {
    let mut form = SnapshotForm::new();
    for (key, raw) in &request.values {
        let category = AssetCategory::from_str(key)?;
        // Field errors stay on the form and fail the commit as a whole.
        let _ = form.set_field(category, raw);
    }

    let ledger = state.ledger_for(&user)?;
    let snapshot = ledger.commit_snapshot(&form, request.mode).await?;
    Ok(Json(snapshot))
}

async fn get_latest(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserId>,
) -> ApiResult<Json<Option<Snapshot>>> {
    let ledger = state.ledger_for(&user)?;
    Ok(Json(ledger.latest_snapshot()?))
}

async fn get_breakdown(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserId>,
) -> ApiResult<Json<Vec<BreakdownItem>>> {
    let ledger = state.ledger_for(&user)?;
    Ok(Json(ledger.category_breakdown()?))
}

async fn get_series(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserId>,
) -> ApiResult<Json<Vec<NetWorthPoint>>> {
    let ledger = state.ledger_for(&user)?;
    Ok(Json(ledger.net_worth_series()?))
}

async fn get_change(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserId>,
) -> ApiResult<Json<ChangeResponse>> {
    let ledger = state.ledger_for(&user)?;
    Ok(Json(ChangeResponse {
        change_percent: ledger.latest_change()?,
    }))
}

async fn get_goal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserId>,
) -> ApiResult<Json<GoalResponse>> {
    let ledger = state.ledger_for(&user)?;
    Ok(Json(GoalResponse {
        goal: ledger.goal()?,
    }))
}

async fn set_goal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserId>,
    Json(request): Json<GoalRequest>,
) -> ApiResult<Json<GoalResponse>> {
    let ledger = state.ledger_for(&user)?;
    let goal = ledger.set_goal(&request.goal).await?;
    Ok(Json(GoalResponse { goal: Some(goal) }))
}

async fn get_goal_progress(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserId>,
) -> ApiResult<Json<GoalProgress>> {
    let ledger = state.ledger_for(&user)?;
    Ok(Json(ledger.goal_progress()?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ledger", get(get_summary))
        .route("/ledger/snapshots", get(list_snapshots).post(create_snapshot))
        .route("/ledger/latest", get(get_latest))
        .route("/ledger/breakdown", get(get_breakdown))
        .route("/ledger/series", get(get_series))
        .route("/ledger/change", get(get_change))
        .route("/ledger/goal", put(set_goal).get(get_goal))
        .route("/ledger/goal/progress", get(get_goal_progress))
}
