use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    repository::{
        bookings::{list_bookings, BookingFilter},
        clamp_limit,
        customers::{create_customer, get_customer, search_customers, NewCustomer},
        map_db_error,
    },
    schemas::{validate_input, CreateCustomerInput, CustomerPath, CustomersQuery},
    state::AppState,
};

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route(
            "/customers",
            axum::routing::get(list_customers).post(create_customer_handler),
        )
        .route("/customers/{customer_id}", axum::routing::get(get_customer_handler))
}

async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<CustomersQuery>,
) -> AppResult<Json<Value>> {
    let pool = state.db_pool()?;
    let customers = search_customers(
        pool,
        query.search.as_deref(),
        clamp_limit(Some(query.limit), 50),
    )
    .await?;
    Ok(Json(json!({ "data": customers })))
}

async fn create_customer_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateCustomerInput>,
) -> AppResult<impl IntoResponse> {
    validate_input(&payload)?;
    let mut conn = state.db_pool()?.acquire().await.map_err(map_db_error)?;
    let customer = create_customer(
        &mut conn,
        &NewCustomer {
            name: payload.name,
            phone: payload.phone,
            email: non_empty(payload.email),
            address: non_empty(payload.address),
            id_number: non_empty(payload.id_number),
        },
    )
    .await?;
    tracing::info!(customer_id = customer.id, "Customer created");
    Ok((StatusCode::CREATED, Json(customer)))
}

async fn get_customer_handler(
    State(state): State<AppState>,
    Path(path): Path<CustomerPath>,
) -> AppResult<Json<Value>> {
    let pool = state.db_pool()?;
    let mut conn = pool.acquire().await.map_err(map_db_error)?;
    let customer = get_customer(&mut conn, path.customer_id).await?;
    drop(conn);

    let filter = BookingFilter {
        customer_id: Some(customer.id),
        ..BookingFilter::default()
    };
    let bookings = list_bookings(pool, &filter, 50, 0).await?;
    Ok(Json(json!({ "customer": customer, "bookings": bookings })))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|inner| inner.trim().to_string())
        .filter(|inner| !inner.is_empty())
}
