use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    models::PaymentMethod,
    repository::{
        clamp_limit,
        expenses::{create_expense, list_expenses, NewExpense},
    },
    schemas::{validate_input, CreateExpenseInput, ExpensesQuery},
    services::local_time::parse_date,
    state::AppState,
};

pub fn router() -> axum::Router<AppState> {
    axum::Router::new().route(
        "/expenses",
        axum::routing::get(list_expenses_handler).post(create_expense_handler),
    )
}

async fn list_expenses_handler(
    State(state): State<AppState>,
    Query(query): Query<ExpensesQuery>,
) -> AppResult<Json<Value>> {
    let from = query
        .from
        .as_deref()
        .map(|raw| parse_date(Some(raw), "from"))
        .transpose()?;
    let to = query
        .to
        .as_deref()
        .map(|raw| parse_date(Some(raw), "to"))
        .transpose()?;

    let rows = list_expenses(
        state.db_pool()?,
        from,
        to,
        query.category.as_deref(),
        clamp_limit(Some(query.limit), 100),
    )
    .await?;
    let total = crate::models::round_money(rows.iter().map(|row| row.amount).sum());
    Ok(Json(json!({ "data": rows, "total": total })))
}

async fn create_expense_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateExpenseInput>,
) -> AppResult<impl IntoResponse> {
    validate_input(&payload)?;
    let expense_date = parse_date(Some(&payload.expense_date), "expenseDate")?;
    let payment_method = payload
        .payment_method
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(PaymentMethod::parse)
        .transpose()?;

    let created = create_expense(
        state.db_pool()?,
        &NewExpense {
            category: payload.category,
            amount: payload.amount,
            expense_date,
            payment_method: payment_method.map(|method| method.as_str().to_string()),
            note: payload.note,
        },
    )
    .await?;
    tracing::info!(expense_id = created.id, amount = created.amount, "Expense recorded");
    Ok((StatusCode::CREATED, Json(created)))
}
