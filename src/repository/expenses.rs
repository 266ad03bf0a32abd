use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{error::AppError, models::Expense, repository::map_db_error};

const EXPENSE_COLUMNS: &str = "id, category, amount, expense_date, payment_method, note, created_at";

#[derive(Debug, Clone)]
pub struct NewExpense {
    pub category: String,
    pub amount: f64,
    pub expense_date: NaiveDate,
    pub payment_method: Option<String>,
    pub note: Option<String>,
}

pub async fn list_expenses(
    pool: &PgPool,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    category: Option<&str>,
    limit: i64,
) -> Result<Vec<Expense>, AppError> {
    let mut query = QueryBuilder::<Postgres>::new(format!(
        "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE 1=1"
    ));
    if let Some(from) = from {
        query.push(" AND expense_date >= ").push_bind(from);
    }
    if let Some(to) = to {
        query.push(" AND expense_date <= ").push_bind(to);
    }
    if let Some(category) = category.map(str::trim).filter(|value| !value.is_empty()) {
        query.push(" AND category = ").push_bind(category.to_string());
    }
    query
        .push(" ORDER BY expense_date DESC, id DESC LIMIT ")
        .push_bind(limit);

    query
        .build_query_as::<Expense>()
        .fetch_all(pool)
        .await
        .map_err(map_db_error)
}

pub async fn create_expense(pool: &PgPool, expense: &NewExpense) -> Result<Expense, AppError> {
    sqlx::query_as::<_, Expense>(&format!(
        "INSERT INTO expenses (category, amount, expense_date, payment_method, note)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {EXPENSE_COLUMNS}"
    ))
    .bind(expense.category.trim())
    .bind(expense.amount)
    .bind(expense.expense_date)
    .bind(expense.payment_method.as_deref())
    .bind(expense.note.as_deref())
    .fetch_one(pool)
    .await
    .map_err(map_db_error)
}

/// Total spend per category within the inclusive date range.
pub async fn totals_by_category(
    pool: &PgPool,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<(String, f64)>, AppError> {
    sqlx::query_as::<_, (String, f64)>(
        "SELECT category, COALESCE(SUM(amount), 0)::float8
         FROM expenses
         WHERE expense_date >= $1 AND expense_date <= $2
         GROUP BY category
         ORDER BY category",
    )
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await
    .map_err(map_db_error)
}
