//! Router configuration.
//!
//! Builds the complete Axum router with all endpoints.

use super::health::{health_check, readiness_check};
use super::state::AppState;
use crate::api::{bookings, order_items, orders, ticket_types};
use axum::{
    routing::{delete, get, post, put},
    Router,
};

/// Build the complete Axum router.
///
/// Configures health checks plus the booking, order, order-item, and
/// ticket-type endpoints under `/api`.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Bookings
        .route("/bookings", post(bookings::create_booking))
        .route("/bookings", get(bookings::list_bookings))
        .route("/bookings/:id", get(bookings::get_booking))
        .route(
            "/bookings/reference/:reference",
            get(bookings::get_booking_by_reference),
        )
        .route("/bookings/:id/status", put(bookings::update_booking_status))
        .route("/bookings/:id/confirm", post(bookings::confirm_booking))
        .route("/bookings/:id/cancel", post(bookings::cancel_booking))
        .route("/bookings/:id/complete", post(bookings::complete_booking))
        .route("/bookings/:id/valid", get(bookings::check_booking_validity))
        // Orders
        .route("/orders", post(orders::create_order))
        .route("/orders", get(orders::list_orders))
        .route("/orders/expire", post(orders::expire_orders))
        .route("/orders/number/:order_number", get(orders::get_order_by_number))
        .route("/orders/:id", get(orders::get_order))
        .route(
            "/orders/:id/payment-status",
            put(orders::update_payment_status),
        )
        .route("/orders/:id/process", post(orders::process_payment))
        .route("/orders/:id/confirm", post(orders::confirm_payment))
        .route("/orders/:id/fail", post(orders::fail_payment))
        .route("/orders/:id/refund", post(orders::refund_order))
        .route("/orders/:id/retry", post(orders::retry_payment))
        // Order items
        .route("/orders/:id/items", post(order_items::add_order_item))
        .route("/orders/:id/items", get(order_items::list_order_items))
        .route("/order-items/subtotal", post(order_items::calculate_subtotal))
        .route("/order-items/:id", get(order_items::get_order_item))
        .route("/order-items/:id", put(order_items::update_order_item))
        .route("/order-items/:id", delete(order_items::delete_order_item))
        // Ticket types / inventory
        .route("/ticket-types", post(ticket_types::create_ticket_type))
        .route("/ticket-types/:id", get(ticket_types::get_ticket_type))
        .route("/ticket-types/:id", put(ticket_types::update_ticket_type))
        .route("/ticket-types/:id", delete(ticket_types::delete_ticket_type))
        .route(
            "/ticket-types/:id/availability",
            put(ticket_types::update_availability),
        )
        .route(
            "/ticket-types/:id/availability",
            get(ticket_types::check_availability),
        )
        .route("/ticket-types/:id/remaining", get(ticket_types::get_remaining))
        .route(
            "/ticket-types/:id/activate",
            post(ticket_types::activate_ticket_type),
        )
        .route(
            "/ticket-types/:id/deactivate",
            post(ticket_types::deactivate_ticket_type),
        )
        // Event / user scoped queries
        .route(
            "/events/:id/ticket-types",
            get(ticket_types::list_event_ticket_types),
        )
        .route("/events/:id/revenue", get(bookings::get_event_revenue))
        .route("/users/:id/orders", get(orders::get_order_history))
        .route("/users/:id/revenue", get(orders::get_user_revenue));

    Router::new()
        // Health checks
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        // API routes under /api prefix
        .nest("/api", api_routes)
        .with_state(state)
}
