//! Order and payment API endpoints.
//!
//! Orders wrap a pending booking; payment transitions cascade into the
//! booking lifecycle (completion confirms, refund cancels). The expiry
//! sweep is exposed for an external scheduler to invoke periodically.

use crate::server::{AppError, AppState};
use crate::types::{BookingId, Order, OrderId, PaymentMethod, PaymentStatus, UserId};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to create an order from a booking.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    /// Pending booking to wrap
    pub booking_id: Uuid,
    /// Optional payment method chosen up front (case-insensitive)
    pub payment_method: Option<String>,
}

/// Request to set the payment status directly.
#[derive(Debug, Deserialize)]
pub struct UpdatePaymentStatusRequest {
    /// Target status (case-insensitive)
    pub payment_status: String,
}

/// Request to start payment processing.
#[derive(Debug, Deserialize)]
pub struct ProcessPaymentRequest {
    /// Payment method (case-insensitive, allow-listed)
    pub payment_method: String,
    /// External transaction identifier
    pub transaction_id: String,
}

/// Request to confirm a successful payment.
#[derive(Debug, Deserialize)]
pub struct ConfirmPaymentRequest {
    /// External transaction identifier
    pub transaction_id: String,
}

/// Request carrying a reason (failure, refund).
#[derive(Debug, Default, Deserialize)]
pub struct ReasonRequest {
    /// Free-form reason, logged with the transition
    #[serde(default)]
    pub reason: Option<String>,
}

/// Request to sweep expired pending orders.
#[derive(Debug, Default, Deserialize)]
pub struct ExpireOrdersRequest {
    /// Age in minutes; defaults to the server configuration
    pub expiry_minutes: Option<i64>,
}

/// Filters for listing orders.
#[derive(Debug, Default, Deserialize)]
pub struct ListOrdersQuery {
    /// Filter by user
    pub user_id: Option<Uuid>,
    /// Filter by payment status (case-insensitive)
    pub status: Option<String>,
    /// Interval start (paired with `end`)
    pub start: Option<DateTime<Utc>>,
    /// Interval end (paired with `start`)
    pub end: Option<DateTime<Utc>>,
}

/// Order details.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    /// Order ID
    pub id: Uuid,
    /// Booking ID
    pub booking_id: Uuid,
    /// User ID
    pub user_id: Uuid,
    /// Unique order number
    pub order_number: String,
    /// Amount to pay in cents
    pub total_amount_cents: u64,
    /// Current payment status
    pub payment_status: PaymentStatus,
    /// Payment method, once chosen
    pub payment_method: Option<PaymentMethod>,
    /// External transaction identifier
    pub transaction_id: Option<String>,
    /// Set only when the payment completes
    pub payment_date: Option<DateTime<Utc>>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: *order.id.as_uuid(),
            booking_id: *order.booking_id.as_uuid(),
            user_id: *order.user_id.as_uuid(),
            order_number: order.order_number,
            total_amount_cents: order.total_amount.cents(),
            payment_status: order.payment_status,
            payment_method: order.payment_method,
            transaction_id: order.transaction_id,
            payment_date: order.payment_date,
            created_at: order.created_at,
        }
    }
}

/// Result of an expiry sweep.
#[derive(Debug, Serialize)]
pub struct ExpireOrdersResponse {
    /// How many orders were expired
    pub expired: u32,
}

/// User revenue summary.
#[derive(Debug, Serialize)]
pub struct UserRevenueResponse {
    /// Summed amount in cents
    pub revenue_cents: u64,
}

fn parse_payment_status(status: &str) -> Result<PaymentStatus, AppError> {
    PaymentStatus::parse(status).ok_or_else(|| {
        AppError::bad_request(format!(
            "Invalid payment status. Valid statuses are: {}",
            PaymentStatus::VALID.join(", ")
        ))
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// Create an order from a pending booking (no inventory change).
pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), AppError> {
    let payment_method = request
        .payment_method
        .as_deref()
        .map(|m| {
            PaymentMethod::parse(m).ok_or_else(|| {
                AppError::bad_request(format!(
                    "Invalid payment method. Valid methods are: {}",
                    PaymentMethod::VALID.join(", ")
                ))
            })
        })
        .transpose()?;

    let order = state
        .orders
        .create_from_booking(BookingId::from_uuid(request.booking_id), payment_method)
        .await?;
    Ok((StatusCode::CREATED, Json(order.into())))
}

/// Get order details by ID.
pub async fn get_order(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state.orders.get(OrderId::from_uuid(id)).await?;
    Ok(Json(order.into()))
}

/// Get order details by order number.
pub async fn get_order_by_number(
    Path(order_number): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state.orders.get_by_number(&order_number).await?;
    Ok(Json(order.into()))
}

/// List orders by user, payment status, or creation interval.
pub async fn list_orders(
    Query(query): Query<ListOrdersQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderResponse>>, AppError> {
    let status = query
        .status
        .as_deref()
        .map(parse_payment_status)
        .transpose()?;

    let orders = if let Some(user_id) = query.user_id {
        state
            .orders
            .list_for_user(UserId::from_uuid(user_id), status)
            .await?
    } else if let Some(status) = status {
        state.orders.list_by_status(status).await?
    } else if let (Some(start), Some(end)) = (query.start, query.end) {
        state.orders.orders_between(start, end).await?
    } else {
        return Err(AppError::bad_request(
            "Provide user_id, status, or a start/end interval",
        ));
    };

    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// A user's order history, newest first.
pub async fn get_order_history(
    Path(user_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderResponse>>, AppError> {
    let orders = state
        .orders
        .order_history(UserId::from_uuid(user_id))
        .await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// Set the payment status directly. COMPLETED stamps the payment date and
/// confirms the booking.
pub async fn update_payment_status(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<UpdatePaymentStatusRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state
        .orders
        .update_payment_status(OrderId::from_uuid(id), &request.payment_status)
        .await?;
    Ok(Json(order.into()))
}

/// Start payment processing for a pending order.
pub async fn process_payment(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<ProcessPaymentRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state
        .orders
        .process_payment(
            OrderId::from_uuid(id),
            &request.payment_method,
            request.transaction_id,
        )
        .await?;
    Ok(Json(order.into()))
}

/// Confirm a successful payment (confirms the booking).
pub async fn confirm_payment(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<ConfirmPaymentRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state
        .orders
        .confirm_payment(OrderId::from_uuid(id), request.transaction_id)
        .await?;
    Ok(Json(order.into()))
}

/// Mark a payment as failed.
pub async fn fail_payment(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<ReasonRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state
        .orders
        .mark_failed(
            OrderId::from_uuid(id),
            request.reason.as_deref().unwrap_or("unspecified"),
        )
        .await?;
    Ok(Json(order.into()))
}

/// Refund a completed payment (cancels the booking, releasing tickets).
pub async fn refund_order(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<ReasonRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state
        .orders
        .refund(
            OrderId::from_uuid(id),
            request.reason.as_deref().unwrap_or("unspecified"),
        )
        .await?;
    Ok(Json(order.into()))
}

/// Retry a failed payment (resets to PENDING).
pub async fn retry_payment(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state.orders.retry_payment(OrderId::from_uuid(id)).await?;
    Ok(Json(order.into()))
}

/// Sweep expired pending orders (invoked by an external scheduler).
pub async fn expire_orders(
    State(state): State<AppState>,
    Json(request): Json<ExpireOrdersRequest>,
) -> Result<Json<ExpireOrdersResponse>, AppError> {
    let minutes = request
        .expiry_minutes
        .unwrap_or(state.order_expiry_minutes);
    if minutes <= 0 {
        return Err(AppError::bad_request(
            "expiry_minutes must be greater than 0",
        ));
    }
    let expired = state.orders.cancel_expired(minutes).await?;
    Ok(Json(ExpireOrdersResponse { expired }))
}

/// Total revenue from a user's completed orders.
pub async fn get_user_revenue(
    Path(user_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<UserRevenueResponse>, AppError> {
    let revenue = state
        .orders
        .user_revenue(UserId::from_uuid(user_id))
        .await?;
    Ok(Json(UserRevenueResponse {
        revenue_cents: revenue.cents(),
    }))
}
