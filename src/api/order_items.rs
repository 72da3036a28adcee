//! Order line-item API endpoints (the cart-style flow).

use crate::server::{AppError, AppState};
use crate::services::OrderItemService;
use crate::types::{Money, OrderId, OrderItem, OrderItemId, TicketTypeId};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to add an item to an order.
#[derive(Debug, Deserialize)]
pub struct AddOrderItemRequest {
    /// Ticket type being purchased
    pub ticket_type_id: Uuid,
    /// Number of tickets (> 0)
    pub quantity: u32,
}

/// Request to change an item's quantity.
#[derive(Debug, Deserialize)]
pub struct UpdateOrderItemRequest {
    /// New quantity (> 0)
    pub quantity: u32,
}

/// Request for the subtotal calculator.
#[derive(Debug, Deserialize)]
pub struct SubtotalRequest {
    /// Unit price in cents
    pub unit_price_cents: u64,
    /// Quantity (> 0)
    pub quantity: u32,
}

/// Order item details.
#[derive(Debug, Serialize)]
pub struct OrderItemResponse {
    /// Order item ID
    pub id: Uuid,
    /// Order ID
    pub order_id: Uuid,
    /// Ticket type ID
    pub ticket_type_id: Uuid,
    /// Number of tickets
    pub quantity: u32,
    /// Snapshotted unit price in cents
    pub unit_price_cents: u64,
    /// Subtotal in cents
    pub subtotal_cents: u64,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        Self {
            id: *item.id.as_uuid(),
            order_id: *item.order_id.as_uuid(),
            ticket_type_id: *item.ticket_type_id.as_uuid(),
            quantity: item.quantity,
            unit_price_cents: item.unit_price.cents(),
            subtotal_cents: item.subtotal.cents(),
        }
    }
}

/// Subtotal calculation result.
#[derive(Debug, Serialize)]
pub struct SubtotalResponse {
    /// Subtotal in cents
    pub subtotal_cents: u64,
}

// ============================================================================
// Handlers
// ============================================================================

/// Add a line item to an order (reserves inventory, recomputes the total).
pub async fn add_order_item(
    Path(order_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<AddOrderItemRequest>,
) -> Result<(StatusCode, Json<OrderItemResponse>), AppError> {
    let item = state
        .order_items
        .add_item(
            OrderId::from_uuid(order_id),
            TicketTypeId::from_uuid(request.ticket_type_id),
            request.quantity,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(item.into())))
}

/// Get order item details.
pub async fn get_order_item(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<OrderItemResponse>, AppError> {
    let item = state.order_items.get(OrderItemId::from_uuid(id)).await?;
    Ok(Json(item.into()))
}

/// List all items in an order.
pub async fn list_order_items(
    Path(order_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderItemResponse>>, AppError> {
    let items = state
        .order_items
        .list_for_order(OrderId::from_uuid(order_id))
        .await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

/// Change an item's quantity (reserves/releases the delta).
pub async fn update_order_item(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<UpdateOrderItemRequest>,
) -> Result<Json<OrderItemResponse>, AppError> {
    let item = state
        .order_items
        .update_item(OrderItemId::from_uuid(id), request.quantity)
        .await?;
    Ok(Json(item.into()))
}

/// Delete an item (releases its full quantity).
pub async fn delete_order_item(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state
        .order_items
        .delete_item(OrderItemId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Pure subtotal calculator.
pub async fn calculate_subtotal(
    Json(request): Json<SubtotalRequest>,
) -> Result<Json<SubtotalResponse>, AppError> {
    let subtotal = OrderItemService::subtotal(
        Money::from_cents(request.unit_price_cents),
        request.quantity,
    )?;
    Ok(Json(SubtotalResponse {
        subtotal_cents: subtotal.cents(),
    }))
}
