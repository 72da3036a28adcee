//! Booking API endpoints.
//!
//! Creating a booking reserves inventory; cancelling releases it. Status
//! updates route through the lifecycle operations so the allowed edges are
//! never bypassed.

use crate::server::{AppError, AppState};
use crate::services::NewBooking;
use crate::types::{Booking, BookingId, BookingStatus, EventId, TicketTypeId, UserId};
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

/// Request to create a booking.
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    /// User making the booking
    pub user_id: Uuid,
    /// Event being booked
    pub event_id: Uuid,
    /// Ticket type to reserve
    pub ticket_type_id: Uuid,
    /// Number of tickets (> 0)
    pub quantity: u32,
}

/// Request to change a booking's status.
#[derive(Debug, Deserialize)]
pub struct UpdateBookingStatusRequest {
    /// Target status (case-insensitive)
    pub status: String,
}

/// Filters for listing bookings. At least one of `user_id`, `event_id`,
/// or `status` must be present.
#[derive(Debug, Default, Deserialize)]
pub struct ListBookingsQuery {
    /// Filter by user
    pub user_id: Option<Uuid>,
    /// Filter by event
    pub event_id: Option<Uuid>,
    /// Filter by status (case-insensitive)
    pub status: Option<String>,
}

/// Booking details.
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    /// Booking ID
    pub id: Uuid,
    /// User ID
    pub user_id: Uuid,
    /// Event ID
    pub event_id: Uuid,
    /// Ticket type ID
    pub ticket_type_id: Uuid,
    /// Number of tickets
    pub quantity: u32,
    /// Total amount in cents, frozen at creation
    pub total_amount_cents: u64,
    /// Unique human-readable reference
    pub reference: String,
    /// Current status
    pub status: BookingStatus,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: *booking.id.as_uuid(),
            user_id: *booking.user_id.as_uuid(),
            event_id: *booking.event_id.as_uuid(),
            ticket_type_id: *booking.ticket_type_id.as_uuid(),
            quantity: booking.quantity,
            total_amount_cents: booking.total_amount.cents(),
            reference: booking.reference,
            status: booking.status,
            created_at: booking.created_at,
        }
    }
}

/// Validity check result.
#[derive(Debug, Serialize)]
pub struct BookingValidityResponse {
    /// True if the booking can still be confirmed
    pub valid: bool,
}

/// Event revenue summary.
#[derive(Debug, Serialize)]
pub struct RevenueResponse {
    /// Summed amount in cents
    pub revenue_cents: u64,
}

fn parse_status(status: &str) -> Result<BookingStatus, AppError> {
    BookingStatus::parse(status).ok_or_else(|| {
        AppError::bad_request(format!(
            "Invalid status. Valid statuses are: {}",
            BookingStatus::VALID.join(", ")
        ))
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a booking (reserves inventory).
pub async fn create_booking(
    State(state): State<AppState>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    let booking = state
        .bookings
        .create(NewBooking {
            user_id: UserId::from_uuid(request.user_id),
            event_id: EventId::from_uuid(request.event_id),
            ticket_type_id: TicketTypeId::from_uuid(request.ticket_type_id),
            quantity: request.quantity,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(booking.into())))
}

/// Get booking details by ID.
pub async fn get_booking(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state.bookings.get(BookingId::from_uuid(id)).await?;
    Ok(Json(booking.into()))
}

/// Get booking details by reference.
pub async fn get_booking_by_reference(
    Path(reference): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state.bookings.get_by_reference(&reference).await?;
    Ok(Json(booking.into()))
}

/// List bookings by user, event, or status.
pub async fn list_bookings(
    Query(query): Query<ListBookingsQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let status = query.status.as_deref().map(parse_status).transpose()?;

    let bookings = if let Some(user_id) = query.user_id {
        state
            .bookings
            .list_for_user(UserId::from_uuid(user_id), status)
            .await?
    } else if let Some(event_id) = query.event_id {
        state
            .bookings
            .list_for_event(EventId::from_uuid(event_id), status)
            .await?
    } else if let Some(status) = status {
        state.bookings.list_by_status(status).await?
    } else {
        return Err(AppError::bad_request(
            "Provide at least one of user_id, event_id, or status",
        ));
    };

    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}

/// Change a booking's status (routed through the lifecycle operations).
pub async fn update_booking_status(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<UpdateBookingStatusRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state
        .bookings
        .update_status(BookingId::from_uuid(id), &request.status)
        .await?;
    Ok(Json(booking.into()))
}

/// Confirm a pending booking.
pub async fn confirm_booking(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state.bookings.confirm(BookingId::from_uuid(id)).await?;
    Ok(Json(booking.into()))
}

/// Cancel a booking (releases inventory).
pub async fn cancel_booking(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state.bookings.cancel(BookingId::from_uuid(id)).await?;
    Ok(Json(booking.into()))
}

/// Mark a confirmed booking as completed.
pub async fn complete_booking(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state.bookings.complete(BookingId::from_uuid(id)).await?;
    Ok(Json(booking.into()))
}

/// Check whether a booking can still be confirmed.
pub async fn check_booking_validity(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<BookingValidityResponse>, AppError> {
    let valid = state.bookings.validate(BookingId::from_uuid(id)).await?;
    Ok(Json(BookingValidityResponse { valid }))
}

/// Total revenue from an event's confirmed bookings.
pub async fn get_event_revenue(
    Path(event_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<RevenueResponse>, AppError> {
    let revenue = state
        .bookings
        .event_revenue(EventId::from_uuid(event_id))
        .await?;
    Ok(Json(RevenueResponse {
        revenue_cents: revenue.cents(),
    }))
}
