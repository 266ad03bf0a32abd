use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    models::round_money,
    repository::{expenses::totals_by_category, payments::collected_between},
    schemas::RevenueQuery,
    services::local_time::{local_day_bounds, parse_date},
    state::AppState,
};

pub fn router() -> axum::Router<AppState> {
    axum::Router::new().route("/reports/revenue", axum::routing::get(revenue_report))
}

/// Money collected against money spent over an inclusive range of local days.
async fn revenue_report(
    State(state): State<AppState>,
    Query(query): Query<RevenueQuery>,
) -> AppResult<Json<Value>> {
    let from = parse_date(query.from.as_deref(), "from")?;
    let to = parse_date(query.to.as_deref(), "to")?;
    if to < from {
        return Err(AppError::BadRequest(
            "to must be on or after from.".to_string(),
        ));
    }

    let timezone = state.config.property_timezone;
    let (start, _) = local_day_bounds(from, timezone);
    let (_, end) = local_day_bounds(to, timezone);

    let pool = state.db_pool()?;
    let collected = collected_between(pool, start, end).await?;
    let by_category = totals_by_category(pool, from, to).await?;

    let expenses_total = round_money(by_category.iter().map(|(_, amount)| amount).sum());
    let net_collected = round_money(collected.collected - collected.refunded);

    Ok(Json(json!({
        "from": from,
        "to": to,
        "collected": round_money(collected.collected),
        "refunded": round_money(collected.refunded),
        "netCollected": net_collected,
        "expenses": expenses_total,
        "expensesByCategory": by_category
            .iter()
            .map(|(category, amount)| json!({ "category": category, "amount": round_money(*amount) }))
            .collect::<Vec<_>>(),
        "net": round_money(net_collected - expenses_total),
    })))
}
