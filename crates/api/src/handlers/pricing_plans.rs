//! Pricing catalogue: public listing and admin management.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serene_core::error::CoreError;
use serene_core::plans::{validate_plan, validate_plan_slug, validate_pricing};
use serene_core::types::DbId;
use serene_db::models::pricing_plan::{CreatePricingPlan, PricingPlan, UpdatePricingPlan};
use serene_db::repositories::PricingPlanRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::query::IncludeInactiveParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Default billing interval for new plans.
const DEFAULT_INTERVAL: &str = "month";

/// GET /api/pricing-plans
///
/// Active plans in display order. No authentication required.
pub async fn list_active(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<PricingPlan>>>> {
    let plans = PricingPlanRepo::list(&state.pool, false).await?;
    Ok(Json(DataResponse { data: plans }))
}

/// GET /api/admin/pricing-plans?include_inactive=
pub async fn list_all(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<Json<DataResponse<Vec<PricingPlan>>>> {
    let plans = PricingPlanRepo::list(&state.pool, params.include_inactive).await?;
    Ok(Json(DataResponse { data: plans }))
}

/// POST /api/admin/pricing-plans
pub async fn create_plan(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreatePricingPlan>,
) -> AppResult<(StatusCode, Json<DataResponse<PricingPlan>>)> {
    validate_plan_slug(&input.slug)?;
    validate_plan(&input.tier)?;
    validate_pricing(
        input.price_cents,
        input.billing_interval.as_deref().unwrap_or(DEFAULT_INTERVAL),
    )?;
    validate_quota(input.max_diary_pages)?;
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Plan name must not be empty".into(),
        )));
    }

    let plan = PricingPlanRepo::create(&state.pool, &input).await?;
    tracing::info!(plan_id = plan.id, slug = %plan.slug, admin_id = admin.user_id, "Pricing plan created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: plan })))
}

/// PUT /api/admin/pricing-plans/{id}
pub async fn update_plan(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePricingPlan>,
) -> AppResult<Json<DataResponse<PricingPlan>>> {
    let existing = PricingPlanRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "PricingPlan",
            id,
        }))?;
    validate_pricing(
        input.price_cents.unwrap_or(existing.price_cents),
        input
            .billing_interval
            .as_deref()
            .unwrap_or(&existing.billing_interval),
    )?;
    validate_quota(input.max_diary_pages)?;

    let plan = PricingPlanRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "PricingPlan",
            id,
        }))?;
    tracing::info!(plan_id = id, admin_id = admin.user_id, "Pricing plan updated");
    Ok(Json(DataResponse { data: plan }))
}

/// DELETE /api/admin/pricing-plans/{id}
///
/// Plans are deactivated, never removed.
pub async fn delete_plan(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !PricingPlanRepo::deactivate(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "PricingPlan",
            id,
        }));
    }
    tracing::info!(plan_id = id, admin_id = admin.user_id, "Pricing plan deactivated");
    Ok(StatusCode::NO_CONTENT)
}

fn validate_quota(max_diary_pages: Option<i32>) -> AppResult<()> {
    if max_diary_pages.is_some_and(|m| m < 0) {
        return Err(AppError::Core(CoreError::Validation(
            "Diary page quota must not be negative".into(),
        )));
    }
    Ok(())
}
