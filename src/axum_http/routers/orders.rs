use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    auth::{AdminUser, AuthUser},
    axum_http::error_responses::ApiResponse,
    domain::{
        repositories::orders::OrderRepository,
        value_objects::{
            enums::order_statuses::OrderStatus,
            orders::{CreateOrderModel, OrderListFilter},
        },
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolHandle, repositories::orders::OrderPostgres,
    },
    usecases::orders::{OrderError, OrderUseCase},
};

const MAX_PAGE_SIZE: i64 = 100;

pub fn routes(db_pool: Arc<PgPoolHandle>) -> Router {
    let order_repository = OrderPostgres::new(Arc::clone(&db_pool));
    let order_usecase = OrderUseCase::new(Arc::new(order_repository));

    Router::new()
        .route("/create", post(create_order))
        .route("/", get(list_orders))
        .route("/expiry-check", get(expiry_check))
        .route("/:order_id", get(get_order))
        .route("/:order_id/status", put(update_status))
        .with_state(Arc::new(order_usecase))
}

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusBody {
    pub status: String,
}

pub async fn create_order<O>(
    State(order_usecase): State<Arc<OrderUseCase<O>>>,
    auth: AuthUser,
    Json(create_order_model): Json<CreateOrderModel>,
) -> impl IntoResponse
where
    O: OrderRepository + Send + Sync + 'static,
{
    match order_usecase
        .create_order(auth.user_id, create_order_model)
        .await
    {
        Ok(order) => (
            StatusCode::CREATED,
            ApiResponse::ok_with_message("Order created", order),
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn list_orders<O>(
    State(order_usecase): State<Arc<OrderUseCase<O>>>,
    _admin: AdminUser,
    Query(query): Query<ListOrdersQuery>,
) -> impl IntoResponse
where
    O: OrderRepository + Send + Sync + 'static,
{
    let page = query.page.unwrap_or(1);
    if page < 1 {
        return OrderError::Validation("page must be at least 1".to_string()).into_response();
    }

    let limit = query.limit.unwrap_or(20);
    if !(1..=MAX_PAGE_SIZE).contains(&limit) {
        return OrderError::Validation(format!("limit must be between 1 and {}", MAX_PAGE_SIZE))
            .into_response();
    }

    let status = match query.status.as_deref() {
        None => None,
        Some(raw) => match OrderStatus::from_str(raw) {
            Some(status) => Some(status),
            None => {
                return OrderError::Validation(format!("unknown order status: {}", raw))
                    .into_response();
            }
        },
    };

    let filter = OrderListFilter {
        status,
        user_id: query.user_id,
        page,
        limit,
    };

    match order_usecase.list_orders(filter).await {
        Ok(list) => ApiResponse::ok(list).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn get_order<O>(
    State(order_usecase): State<Arc<OrderUseCase<O>>>,
    _auth: AuthUser,
    Path(order_id): Path<String>,
) -> impl IntoResponse
where
    O: OrderRepository + Send + Sync + 'static,
{
    let order_id = match parse_order_id(&order_id) {
        Ok(order_id) => order_id,
        Err(err) => return err.into_response(),
    };

    match order_usecase.get_order(order_id).await {
        Ok(order) => ApiResponse::ok(order).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn update_status<O>(
    State(order_usecase): State<Arc<OrderUseCase<O>>>,
    _admin: AdminUser,
    Path(order_id): Path<String>,
    Json(body): Json<UpdateStatusBody>,
) -> impl IntoResponse
where
    O: OrderRepository + Send + Sync + 'static,
{
    let order_id = match parse_order_id(&order_id) {
        Ok(order_id) => order_id,
        Err(err) => return err.into_response(),
    };

    let new_status = match OrderStatus::from_str(&body.status) {
        Some(status) => status,
        None => {
            return OrderError::Validation(format!("unknown order status: {}", body.status))
                .into_response();
        }
    };

    match order_usecase.update_status(order_id, new_status).await {
        Ok(order) => ApiResponse::ok_with_message("Order status updated", order).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn expiry_check<O>(
    State(order_usecase): State<Arc<OrderUseCase<O>>>,
    _admin: AdminUser,
) -> impl IntoResponse
where
    O: OrderRepository + Send + Sync + 'static,
{
    match order_usecase.expire_lapsed_orders().await {
        Ok(swept) => ApiResponse::ok(json!({ "expired": swept })).into_response(),
        Err(err) => err.into_response(),
    }
}

fn parse_order_id(raw: &str) -> Result<Uuid, OrderError> {
    Uuid::parse_str(raw)
        .map_err(|_| OrderError::Validation("orderId must be a valid UUID".to_string()))
}
