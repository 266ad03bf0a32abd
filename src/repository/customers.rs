use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::{error::AppError, models::Customer, repository::map_db_error};

const CUSTOMER_COLUMNS: &str = "id, name, phone, email, address, id_number, created_at";

#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub id_number: Option<String>,
}

/// Customers whose name or phone contains `search`, newest first.
pub async fn search_customers(
    pool: &PgPool,
    search: Option<&str>,
    limit: i64,
) -> Result<Vec<Customer>, AppError> {
    let mut query =
        QueryBuilder::<Postgres>::new(format!("SELECT {CUSTOMER_COLUMNS} FROM customers"));
    if let Some(term) = search.map(str::trim).filter(|term| !term.is_empty()) {
        let pattern = format!("%{}%", term.replace('%', "\\%").replace('_', "\\_"));
        query
            .push(" WHERE name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR phone ILIKE ")
            .push_bind(pattern);
    }
    query.push(" ORDER BY id DESC LIMIT ").push_bind(limit);

    query
        .build_query_as::<Customer>()
        .fetch_all(pool)
        .await
        .map_err(map_db_error)
}

pub async fn get_customer(conn: &mut PgConnection, customer_id: i64) -> Result<Customer, AppError> {
    sqlx::query_as::<_, Customer>(&format!(
        "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1"
    ))
    .bind(customer_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(map_db_error)?
    .ok_or_else(|| AppError::NotFound(format!("Customer {customer_id} not found.")))
}

pub async fn create_customer(
    conn: &mut PgConnection,
    customer: &NewCustomer,
) -> Result<Customer, AppError> {
    sqlx::query_as::<_, Customer>(&format!(
        "INSERT INTO customers (name, phone, email, address, id_number)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {CUSTOMER_COLUMNS}"
    ))
    .bind(customer.name.trim())
    .bind(customer.phone.trim())
    .bind(customer.email.as_deref())
    .bind(customer.address.as_deref())
    .bind(customer.id_number.as_deref())
    .fetch_one(&mut *conn)
    .await
    .map_err(map_db_error)
}
