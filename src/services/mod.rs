//! Lifecycle services: the core of the system.
//!
//! Four components, leaves first: ticket inventory accounting, the booking
//! lifecycle, the order/payment lifecycle, and order line-item accounting.
//! Consistency across them relies on the inventory service being the only
//! path that mutates the ticket counters.

pub mod booking;
pub mod inventory;
pub mod order;
pub mod order_item;

pub use booking::{BookingService, NewBooking};
pub use inventory::{InventoryService, NewTicketType, TicketTypeUpdate};
pub use order::OrderService;
pub use order_item::OrderItemService;
