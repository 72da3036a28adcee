//! Ticket type and inventory API endpoints.
//!
//! Ticket type CRUD plus the inventory surface: remaining counts,
//! availability checks, capacity updates, and the active gate.

use crate::server::{AppError, AppState};
use crate::services::{NewTicketType, TicketTypeUpdate};
use crate::types::{EventId, Money, TicketType, TicketTypeId};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to create a ticket type.
#[derive(Debug, Deserialize)]
pub struct CreateTicketTypeRequest {
    /// Event the ticket type belongs to
    pub event_id: Uuid,
    /// Display name (e.g., "VIP")
    pub name: String,
    /// Unit price in cents
    pub price_cents: u64,
    /// Capacity ceiling (> 0)
    pub quantity_available: u32,
}

/// Request to partially update a ticket type.
#[derive(Debug, Deserialize)]
pub struct UpdateTicketTypeRequest {
    /// New display name
    pub name: Option<String>,
    /// New unit price in cents
    pub price_cents: Option<u64>,
    /// New capacity ceiling
    pub quantity_available: Option<u32>,
}

/// Request to set the capacity ceiling.
#[derive(Debug, Deserialize)]
pub struct UpdateAvailabilityRequest {
    /// New capacity ceiling; must not drop below the sold count
    pub quantity_available: u32,
}

/// Query parameters for the availability check.
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    /// Requested quantity
    pub quantity: u32,
}

/// Query parameters for listing an event's ticket types.
#[derive(Debug, Default, Deserialize)]
pub struct ListTicketTypesQuery {
    /// Only return active ticket types
    #[serde(default)]
    pub active_only: bool,
}

/// Ticket type details.
#[derive(Debug, Serialize)]
pub struct TicketTypeResponse {
    /// Ticket type ID
    pub id: Uuid,
    /// Event ID
    pub event_id: Uuid,
    /// Display name
    pub name: String,
    /// Unit price in cents
    pub price_cents: u64,
    /// Capacity ceiling
    pub quantity_available: u32,
    /// Sold counter
    pub quantity_sold: u32,
    /// Tickets still available
    pub remaining: u32,
    /// Whether new reservations are accepted
    pub is_active: bool,
}

impl From<TicketType> for TicketTypeResponse {
    fn from(ticket_type: TicketType) -> Self {
        Self {
            id: *ticket_type.id.as_uuid(),
            event_id: *ticket_type.event_id.as_uuid(),
            remaining: ticket_type.remaining(),
            name: ticket_type.name,
            price_cents: ticket_type.price.cents(),
            quantity_available: ticket_type.quantity_available,
            quantity_sold: ticket_type.quantity_sold,
            is_active: ticket_type.is_active,
        }
    }
}

/// Remaining ticket count.
#[derive(Debug, Serialize)]
pub struct RemainingResponse {
    /// Tickets still available
    pub remaining: u32,
}

/// Availability check result.
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    /// True if the requested quantity can currently be reserved
    pub available: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a ticket type for an event.
pub async fn create_ticket_type(
    State(state): State<AppState>,
    Json(request): Json<CreateTicketTypeRequest>,
) -> Result<(StatusCode, Json<TicketTypeResponse>), AppError> {
    let ticket_type = state
        .inventory
        .create_ticket_type(NewTicketType {
            event_id: EventId::from_uuid(request.event_id),
            name: request.name,
            price: Money::from_cents(request.price_cents),
            quantity_available: request.quantity_available,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(ticket_type.into())))
}

/// Get ticket type details.
pub async fn get_ticket_type(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<TicketTypeResponse>, AppError> {
    let ticket_type = state.inventory.get(TicketTypeId::from_uuid(id)).await?;
    Ok(Json(ticket_type.into()))
}

/// Partially update a ticket type.
pub async fn update_ticket_type(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<UpdateTicketTypeRequest>,
) -> Result<Json<TicketTypeResponse>, AppError> {
    let ticket_type = state
        .inventory
        .update_ticket_type(
            TicketTypeId::from_uuid(id),
            TicketTypeUpdate {
                name: request.name,
                price: request.price_cents.map(Money::from_cents),
                quantity_available: request.quantity_available,
            },
        )
        .await?;
    Ok(Json(ticket_type.into()))
}

/// Delete a ticket type with no sales and no bookings.
pub async fn delete_ticket_type(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state
        .inventory
        .delete_ticket_type(TicketTypeId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List an event's ticket types.
pub async fn list_event_ticket_types(
    Path(event_id): Path<Uuid>,
    Query(query): Query<ListTicketTypesQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<TicketTypeResponse>>, AppError> {
    let types = state
        .inventory
        .list_by_event(EventId::from_uuid(event_id), query.active_only)
        .await?;
    Ok(Json(types.into_iter().map(Into::into).collect()))
}

/// Set the capacity ceiling.
pub async fn update_availability(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<UpdateAvailabilityRequest>,
) -> Result<Json<TicketTypeResponse>, AppError> {
    let ticket_type = state
        .inventory
        .set_available_quantity(TicketTypeId::from_uuid(id), request.quantity_available)
        .await?;
    Ok(Json(ticket_type.into()))
}

/// Remaining ticket count.
pub async fn get_remaining(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<RemainingResponse>, AppError> {
    let remaining = state.inventory.remaining(TicketTypeId::from_uuid(id)).await?;
    Ok(Json(RemainingResponse { remaining }))
}

/// Advisory availability check for a quantity.
pub async fn check_availability(
    Path(id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
    State(state): State<AppState>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let available = state
        .inventory
        .check_availability(TicketTypeId::from_uuid(id), query.quantity)
        .await?;
    Ok(Json(AvailabilityResponse { available }))
}

/// Open the ticket type for new reservations.
pub async fn activate_ticket_type(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<TicketTypeResponse>, AppError> {
    let ticket_type = state.inventory.activate(TicketTypeId::from_uuid(id)).await?;
    Ok(Json(ticket_type.into()))
}

/// Close the ticket type for new reservations.
pub async fn deactivate_ticket_type(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<TicketTypeResponse>, AppError> {
    let ticket_type = state
        .inventory
        .deactivate(TicketTypeId::from_uuid(id))
        .await?;
    Ok(Json(ticket_type.into()))
}
