//! HTTP API handlers, one module per resource.

pub mod bookings;
pub mod order_items;
pub mod orders;
pub mod ticket_types;
