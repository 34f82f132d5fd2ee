use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use time::{macros::format_description, Date, Duration, OffsetDateTime};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{description_of, AnalyzeMealRequest, CreateMealRequest, DailyTotals, ListQuery, SummaryQuery},
    repo_types::{MealEntry, MealEntryPatch, NewMealEntry},
    services::{analyze_meal, daily_totals, AnalyzeInput},
};
use crate::{
    auth::extractors::AuthUser,
    nutrition::{errors::AnalysisError, sanitize::MealAnalysis},
    state::AppState,
};

const MAX_SUMMARY_DAYS: i64 = 366;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals))
        .route("/meals/summary", get(summary))
        .route("/meals/:id", get(get_meal))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", post(create_meal))
        .route("/meals/analyze", post(analyze))
        .route("/meals/:id", axum::routing::patch(update_meal).delete(delete_meal))
}

fn bad_request(msg: impl Into<String>) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, msg.into())
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    error!(error = %e, "storage error");
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".into())
}

fn analysis_failed(e: AnalysisError) -> (StatusCode, String) {
    let status = e.status_code();
    error!(error = %e, %status, "meal analysis failed");
    (status, e.client_message().to_string())
}

fn parse_date(raw: &str) -> Result<Date, (StatusCode, String)> {
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .map_err(|_| bad_request(format!("invalid date '{raw}', expected YYYY-MM-DD")))
}

fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

#[instrument(skip(state, payload))]
pub async fn analyze(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<AnalyzeMealRequest>, JsonRejection>,
) -> Result<Json<MealAnalysis>, (StatusCode, String)> {
    let Json(body) = payload.map_err(|e| {
        warn!(error = %e, "rejected analyze body");
        bad_request(e.body_text())
    })?;
    let description = description_of(body.meal_description.as_ref()).map_err(bad_request)?;

    let analysis = analyze_meal(
        &state,
        user_id,
        AnalyzeInput {
            description,
            is_recalculation: body.is_recalculation,
            previous: body.previous_result.as_ref(),
        },
    )
    .await
    .map_err(analysis_failed)?;

    info!(
        %user_id,
        calories = analysis.macros.calories,
        reused = analysis.reused_from.is_some(),
        warnings = analysis.warnings.len(),
        "meal analyzed"
    );
    Ok(Json(analysis))
}

/// POST /meals { mealDescription, date? }: analyze and store.
#[instrument(skip(state, payload))]
pub async fn create_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<CreateMealRequest>, JsonRejection>,
) -> Result<(StatusCode, HeaderMap, Json<MealEntry>), (StatusCode, String)> {
    let Json(body) = payload.map_err(|e| bad_request(e.body_text()))?;
    let description = description_of(body.meal_description.as_ref()).map_err(bad_request)?;

    let analysis = analyze_meal(
        &state,
        user_id,
        AnalyzeInput {
            description,
            is_recalculation: false,
            previous: None,
        },
    )
    .await
    .map_err(analysis_failed)?;

    let entry = state
        .meals
        .insert(
            user_id,
            NewMealEntry {
                date: body.date.unwrap_or_else(today),
                original_text: description.to_string(),
                macros: analysis.macros,
                breakdown: analysis.breakdown,
                reasoning: analysis.reasoning,
                validation: analysis.validation,
            },
        )
        .await
        .map_err(internal)?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("/api/v1/meals/{}", entry.id)) {
        headers.insert(header::LOCATION, location);
    }
    info!(%user_id, meal_id = %entry.id, "meal recorded");
    Ok((StatusCode::CREATED, headers, Json(entry)))
}

#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<MealEntry>>, (StatusCode, String)> {
    let entries = match q.date.as_deref() {
        Some(raw) => {
            let day = parse_date(raw)?;
            state.meals.list_in_range(user_id, day, day).await
        }
        None => state.meals.list_for_user(user_id).await,
    }
    .map_err(internal)?;
    Ok(Json(entries))
}

#[instrument(skip(state))]
pub async fn get_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MealEntry>, (StatusCode, String)> {
    state
        .meals
        .get(user_id, id)
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Meal not found".into()))
}

#[instrument(skip(state, payload))]
pub async fn update_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    payload: Result<Json<MealEntryPatch>, JsonRejection>,
) -> Result<Json<MealEntry>, (StatusCode, String)> {
    let Json(patch) = payload.map_err(|e| bad_request(e.body_text()))?;
    if patch.is_empty() {
        return Err(bad_request("nothing to update: send macros and/or breakdown"));
    }
    patch.validate().map_err(bad_request)?;
    let updated = state
        .meals
        .update(user_id, id, patch)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Meal not found".to_string()))?;
    info!(%user_id, meal_id = %id, "meal edited");
    Ok(Json(updated))
}

#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    if state.meals.delete(user_id, id).await.map_err(internal)? {
        info!(%user_id, meal_id = %id, "meal deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, "Meal not found".into()))
    }
}

/// GET /meals/summary?from&to, defaulting to the last 7 days.
#[instrument(skip(state))]
pub async fn summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<SummaryQuery>,
) -> Result<Json<Vec<DailyTotals>>, (StatusCode, String)> {
    let to = q.to.as_deref().map(parse_date).transpose()?.unwrap_or_else(today);
    let from = match q.from.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => to.checked_sub(Duration::days(6)).unwrap_or(Date::MIN),
    };
    if from > to {
        return Err(bad_request("from must not be after to"));
    }
    if (to - from).whole_days() >= MAX_SUMMARY_DAYS {
        return Err(bad_request(format!("range is limited to {MAX_SUMMARY_DAYS} days")));
    }

    let entries = state
        .meals
        .list_in_range(user_id, from, to)
        .await
        .map_err(internal)?;
    Ok(Json(daily_totals(&entries, from, to)))
}
