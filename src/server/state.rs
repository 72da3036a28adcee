//! Application state for the HTTP server.

use crate::clock::Clock;
use crate::config::Config;
use crate::services::{BookingService, InventoryService, OrderItemService, OrderService};
use crate::store::Stores;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cloned (cheaply via `Arc`) for each request. The services are wired once
/// here: the inventory service is handed to both the booking and the
/// line-item services so all counter mutations go through a single path.
#[derive(Clone)]
pub struct AppState {
    /// Ticket inventory accounting
    pub inventory: Arc<InventoryService>,
    /// Booking lifecycle
    pub bookings: Arc<BookingService>,
    /// Order/payment lifecycle
    pub orders: Arc<OrderService>,
    /// Order line-item accounting
    pub order_items: Arc<OrderItemService>,
    /// Default age for the expiry sweep when a request does not override it
    pub order_expiry_minutes: i64,
}

impl AppState {
    /// Builds the full service graph over the given stores and clock.
    #[must_use]
    pub fn new(stores: &Stores, clock: Arc<dyn Clock>, config: &Config) -> Self {
        let inventory = Arc::new(InventoryService::new(
            stores.ticket_types.clone(),
            stores.events.clone(),
            stores.bookings.clone(),
        ));
        let bookings = Arc::new(BookingService::new(
            stores.bookings.clone(),
            stores.users.clone(),
            stores.events.clone(),
            stores.ticket_types.clone(),
            inventory.clone(),
            clock.clone(),
        ));
        let orders = Arc::new(OrderService::new(
            stores.orders.clone(),
            stores.bookings.clone(),
            stores.users.clone(),
            bookings.clone(),
            clock,
        ));
        let order_items = Arc::new(OrderItemService::new(
            stores.order_items.clone(),
            stores.orders.clone(),
            stores.ticket_types.clone(),
            inventory.clone(),
        ));

        Self {
            inventory,
            bookings,
            orders,
            order_items,
            order_expiry_minutes: config.orders.expiry_minutes,
        }
    }
}
