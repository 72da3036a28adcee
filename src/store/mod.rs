//! Persistence contracts for the ticketing backend.
//!
//! The lifecycle services talk to these repository traits only; the
//! concrete backends are [`memory::MemoryStore`] (tests and no-database
//! mode) and [`postgres::PgStore`].
//!
//! The ticket counter operations ([`TicketTypeStore::reserve`] and
//! [`TicketTypeStore::release`]) are the single mutation path for
//! `quantity_sold` and MUST be atomic conditional updates in every
//! implementation: the capacity check and the increment happen as one
//! operation, so concurrent reservations cannot race past the check.

pub mod memory;
pub mod postgres;

use crate::error::Result;
use crate::types::{
    Booking, BookingId, BookingStatus, Event, EventId, Order, OrderId, OrderItem, OrderItemId,
    PaymentStatus, TicketType, TicketTypeId, User, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Repository for ticket types and their inventory counters.
#[async_trait]
pub trait TicketTypeStore: Send + Sync {
    /// Looks up a ticket type by id.
    async fn find(&self, id: TicketTypeId) -> Result<Option<TicketType>>;

    /// Upserts a ticket type.
    async fn save(&self, ticket_type: TicketType) -> Result<TicketType>;

    /// Deletes a ticket type. Fails `NotFound` if absent.
    async fn delete(&self, id: TicketTypeId) -> Result<()>;

    /// Lists ticket types for an event, optionally only active ones.
    async fn list_by_event(&self, event_id: EventId, active_only: bool) -> Result<Vec<TicketType>>;

    /// Atomically claims `quantity` tickets: increments `quantity_sold`
    /// if and only if the ticket type exists, is active, and has enough
    /// remaining capacity.
    ///
    /// # Errors
    ///
    /// `NotFound` if the ticket type is absent, `InvalidState` if it is
    /// inactive, `Conflict` if fewer than `quantity` tickets remain.
    async fn reserve(&self, id: TicketTypeId, quantity: u32) -> Result<TicketType>;

    /// Atomically returns `quantity` tickets: decrements `quantity_sold`
    /// if and only if the result stays non-negative.
    ///
    /// # Errors
    ///
    /// `NotFound` if the ticket type is absent, `InvalidState` if the
    /// decrement would take `quantity_sold` below zero.
    async fn release(&self, id: TicketTypeId, quantity: u32) -> Result<TicketType>;
}

/// Repository for bookings.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Looks up a booking by id.
    async fn find(&self, id: BookingId) -> Result<Option<Booking>>;

    /// Looks up a booking by its unique reference.
    async fn find_by_reference(&self, reference: &str) -> Result<Option<Booking>>;

    /// Inserts a new booking. Fails `Conflict` if the reference is taken.
    async fn insert(&self, booking: Booking) -> Result<Booking>;

    /// Updates an existing booking. Fails `NotFound` if absent.
    async fn update(&self, booking: Booking) -> Result<Booking>;

    /// Bookings made by a user, optionally filtered by status.
    async fn list_for_user(
        &self,
        user_id: UserId,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>>;

    /// Bookings against an event, optionally filtered by status.
    async fn list_for_event(
        &self,
        event_id: EventId,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>>;

    /// All bookings in the given status.
    async fn list_by_status(&self, status: BookingStatus) -> Result<Vec<Booking>>;

    /// True if any booking references the ticket type (delete guard).
    async fn exists_for_ticket_type(&self, ticket_type_id: TicketTypeId) -> Result<bool>;
}

/// Repository for orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Looks up an order by id.
    async fn find(&self, id: OrderId) -> Result<Option<Order>>;

    /// Looks up an order by its unique order number.
    async fn find_by_number(&self, order_number: &str) -> Result<Option<Order>>;

    /// The order attached to a booking, if any (at most one).
    async fn find_by_booking(&self, booking_id: BookingId) -> Result<Option<Order>>;

    /// Inserts a new order. Fails `Conflict` if the order number is taken
    /// or the booking already has an order.
    async fn insert(&self, order: Order) -> Result<Order>;

    /// Updates an existing order. Fails `NotFound` if absent.
    async fn update(&self, order: Order) -> Result<Order>;

    /// Orders placed by a user, optionally filtered by payment status.
    async fn list_for_user(
        &self,
        user_id: UserId,
        status: Option<PaymentStatus>,
    ) -> Result<Vec<Order>>;

    /// All orders in the given payment status.
    async fn list_by_status(&self, status: PaymentStatus) -> Result<Vec<Order>>;

    /// PENDING orders created strictly before the cutoff (expiry sweep).
    async fn list_pending_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Order>>;

    /// Orders created in the given closed interval.
    async fn list_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Order>>;
}

/// Repository for order line items.
#[async_trait]
pub trait OrderItemStore: Send + Sync {
    /// Looks up an order item by id.
    async fn find(&self, id: OrderItemId) -> Result<Option<OrderItem>>;

    /// Inserts a new order item.
    async fn insert(&self, item: OrderItem) -> Result<OrderItem>;

    /// Updates an existing order item. Fails `NotFound` if absent.
    async fn update(&self, item: OrderItem) -> Result<OrderItem>;

    /// Deletes an order item. Fails `NotFound` if absent.
    async fn delete(&self, id: OrderItemId) -> Result<()>;

    /// All items belonging to an order.
    async fn list_for_order(&self, order_id: OrderId) -> Result<Vec<OrderItem>>;
}

/// Lookup store for events (event CRUD is out of scope for the core).
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Looks up an event by id.
    async fn find(&self, id: EventId) -> Result<Option<Event>>;

    /// Upserts an event (seeding / external CRUD surface).
    async fn save(&self, event: Event) -> Result<Event>;
}

/// Lookup store for users (registration is out of scope for the core).
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Looks up a user by id.
    async fn find(&self, id: UserId) -> Result<Option<User>>;

    /// Upserts a user (seeding / external CRUD surface).
    async fn save(&self, user: User) -> Result<User>;
}

/// The full set of repositories the services are wired with.
#[derive(Clone)]
pub struct Stores {
    /// Ticket types and inventory counters
    pub ticket_types: Arc<dyn TicketTypeStore>,
    /// Bookings
    pub bookings: Arc<dyn BookingStore>,
    /// Orders
    pub orders: Arc<dyn OrderStore>,
    /// Order line items
    pub order_items: Arc<dyn OrderItemStore>,
    /// Event lookups
    pub events: Arc<dyn EventStore>,
    /// User lookups
    pub users: Arc<dyn UserStore>,
}

impl Stores {
    /// Builds the in-memory backend (used by tests and no-database mode).
    #[must_use]
    pub fn in_memory() -> Self {
        let store = Arc::new(memory::MemoryStore::new());
        Self {
            ticket_types: store.clone(),
            bookings: store.clone(),
            orders: store.clone(),
            order_items: store.clone(),
            events: store.clone(),
            users: store,
        }
    }

    /// Wraps a connected PostgreSQL backend.
    #[must_use]
    pub fn postgres(store: Arc<postgres::PgStore>) -> Self {
        Self {
            ticket_types: store.clone(),
            bookings: store.clone(),
            orders: store.clone(),
            order_items: store.clone(),
            events: store.clone(),
            users: store,
        }
    }
}
