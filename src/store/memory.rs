//! In-memory store backend.
//!
//! Backs the integration tests and the server's no-database mode. All maps
//! live behind `RwLock`s; the counter operations take the write lock for
//! the whole check-and-mutate, which makes them atomic with respect to
//! concurrent reservations.

use super::{
    BookingStore, EventStore, OrderItemStore, OrderStore, TicketTypeStore, UserStore,
};
use crate::error::{Error, Result};
use crate::types::{
    Booking, BookingId, BookingStatus, Event, EventId, Order, OrderId, OrderItem, OrderItemId,
    PaymentStatus, TicketType, TicketTypeId, User, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// All entity maps in one struct so a single `Arc` can serve every
/// repository trait.
#[derive(Debug, Default)]
pub struct MemoryStore {
    ticket_types: RwLock<HashMap<TicketTypeId, TicketType>>,
    bookings: RwLock<HashMap<BookingId, Booking>>,
    orders: RwLock<HashMap<OrderId, Order>>,
    order_items: RwLock<HashMap<OrderItemId, OrderItem>>,
    events: RwLock<HashMap<EventId, Event>>,
    users: RwLock<HashMap<UserId, User>>,
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| Error::Internal("store lock poisoned".to_string()))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| Error::Internal("store lock poisoned".to_string()))
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TicketTypeStore for MemoryStore {
    async fn find(&self, id: TicketTypeId) -> Result<Option<TicketType>> {
        Ok(read(&self.ticket_types)?.get(&id).cloned())
    }

    async fn save(&self, ticket_type: TicketType) -> Result<TicketType> {
        write(&self.ticket_types)?.insert(ticket_type.id, ticket_type.clone());
        Ok(ticket_type)
    }

    async fn delete(&self, id: TicketTypeId) -> Result<()> {
        write(&self.ticket_types)?
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found("Ticket type", id))
    }

    async fn list_by_event(&self, event_id: EventId, active_only: bool) -> Result<Vec<TicketType>> {
        let guard = read(&self.ticket_types)?;
        let mut types: Vec<TicketType> = guard
            .values()
            .filter(|t| t.event_id == event_id && (!active_only || t.is_active))
            .cloned()
            .collect();
        types.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(types)
    }

    async fn reserve(&self, id: TicketTypeId, quantity: u32) -> Result<TicketType> {
        let mut guard = write(&self.ticket_types)?;
        let ticket_type = guard
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("Ticket type", id))?;
        if !ticket_type.is_active {
            return Err(Error::InvalidState("Ticket type is not active".to_string()));
        }
        if ticket_type.remaining() < quantity {
            return Err(Error::Conflict(format!(
                "Not enough tickets available. Available: {}",
                ticket_type.remaining()
            )));
        }
        ticket_type.quantity_sold += quantity;
        Ok(ticket_type.clone())
    }

    async fn release(&self, id: TicketTypeId, quantity: u32) -> Result<TicketType> {
        let mut guard = write(&self.ticket_types)?;
        let ticket_type = guard
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("Ticket type", id))?;
        let Some(new_sold) = ticket_type.quantity_sold.checked_sub(quantity) else {
            return Err(Error::InvalidState(
                "Cannot decrement tickets below zero".to_string(),
            ));
        };
        ticket_type.quantity_sold = new_sold;
        Ok(ticket_type.clone())
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn find(&self, id: BookingId) -> Result<Option<Booking>> {
        Ok(read(&self.bookings)?.get(&id).cloned())
    }

    async fn find_by_reference(&self, reference: &str) -> Result<Option<Booking>> {
        Ok(read(&self.bookings)?
            .values()
            .find(|b| b.reference == reference)
            .cloned())
    }

    async fn insert(&self, booking: Booking) -> Result<Booking> {
        let mut guard = write(&self.bookings)?;
        if guard.values().any(|b| b.reference == booking.reference) {
            return Err(Error::Conflict(format!(
                "Booking reference {} already exists",
                booking.reference
            )));
        }
        guard.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn update(&self, booking: Booking) -> Result<Booking> {
        let mut guard = write(&self.bookings)?;
        if !guard.contains_key(&booking.id) {
            return Err(Error::not_found("Booking", booking.id));
        }
        guard.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>> {
        let guard = read(&self.bookings)?;
        let mut bookings: Vec<Booking> = guard
            .values()
            .filter(|b| b.user_id == user_id && status.is_none_or(|s| b.status == s))
            .cloned()
            .collect();
        bookings.sort_by_key(|b| b.created_at);
        Ok(bookings)
    }

    async fn list_for_event(
        &self,
        event_id: EventId,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>> {
        let guard = read(&self.bookings)?;
        let mut bookings: Vec<Booking> = guard
            .values()
            .filter(|b| b.event_id == event_id && status.is_none_or(|s| b.status == s))
            .cloned()
            .collect();
        bookings.sort_by_key(|b| b.created_at);
        Ok(bookings)
    }

    async fn list_by_status(&self, status: BookingStatus) -> Result<Vec<Booking>> {
        let guard = read(&self.bookings)?;
        let mut bookings: Vec<Booking> = guard
            .values()
            .filter(|b| b.status == status)
            .cloned()
            .collect();
        bookings.sort_by_key(|b| b.created_at);
        Ok(bookings)
    }

    async fn exists_for_ticket_type(&self, ticket_type_id: TicketTypeId) -> Result<bool> {
        Ok(read(&self.bookings)?
            .values()
            .any(|b| b.ticket_type_id == ticket_type_id))
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn find(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(read(&self.orders)?.get(&id).cloned())
    }

    async fn find_by_number(&self, order_number: &str) -> Result<Option<Order>> {
        Ok(read(&self.orders)?
            .values()
            .find(|o| o.order_number == order_number)
            .cloned())
    }

    async fn find_by_booking(&self, booking_id: BookingId) -> Result<Option<Order>> {
        Ok(read(&self.orders)?
            .values()
            .find(|o| o.booking_id == booking_id)
            .cloned())
    }

    async fn insert(&self, order: Order) -> Result<Order> {
        let mut guard = write(&self.orders)?;
        if guard.values().any(|o| o.order_number == order.order_number) {
            return Err(Error::Conflict(format!(
                "Order number {} already exists",
                order.order_number
            )));
        }
        if guard.values().any(|o| o.booking_id == order.booking_id) {
            return Err(Error::Conflict(
                "Order already exists for this booking".to_string(),
            ));
        }
        guard.insert(order.id, order.clone());
        Ok(order)
    }

    async fn update(&self, order: Order) -> Result<Order> {
        let mut guard = write(&self.orders)?;
        if !guard.contains_key(&order.id) {
            return Err(Error::not_found("Order", order.id));
        }
        guard.insert(order.id, order.clone());
        Ok(order)
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
        status: Option<PaymentStatus>,
    ) -> Result<Vec<Order>> {
        let guard = read(&self.orders)?;
        let mut orders: Vec<Order> = guard
            .values()
            .filter(|o| o.user_id == user_id && status.is_none_or(|s| o.payment_status == s))
            .cloned()
            .collect();
        orders.sort_by_key(|o| o.created_at);
        Ok(orders)
    }

    async fn list_by_status(&self, status: PaymentStatus) -> Result<Vec<Order>> {
        let guard = read(&self.orders)?;
        let mut orders: Vec<Order> = guard
            .values()
            .filter(|o| o.payment_status == status)
            .cloned()
            .collect();
        orders.sort_by_key(|o| o.created_at);
        Ok(orders)
    }

    async fn list_pending_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Order>> {
        let guard = read(&self.orders)?;
        let mut orders: Vec<Order> = guard
            .values()
            .filter(|o| o.payment_status == PaymentStatus::Pending && o.created_at < cutoff)
            .cloned()
            .collect();
        orders.sort_by_key(|o| o.created_at);
        Ok(orders)
    }

    async fn list_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Order>> {
        let guard = read(&self.orders)?;
        let mut orders: Vec<Order> = guard
            .values()
            .filter(|o| o.created_at >= start && o.created_at <= end)
            .cloned()
            .collect();
        orders.sort_by_key(|o| o.created_at);
        Ok(orders)
    }
}

#[async_trait]
impl OrderItemStore for MemoryStore {
    async fn find(&self, id: OrderItemId) -> Result<Option<OrderItem>> {
        Ok(read(&self.order_items)?.get(&id).cloned())
    }

    async fn insert(&self, item: OrderItem) -> Result<OrderItem> {
        write(&self.order_items)?.insert(item.id, item.clone());
        Ok(item)
    }

    async fn update(&self, item: OrderItem) -> Result<OrderItem> {
        let mut guard = write(&self.order_items)?;
        if !guard.contains_key(&item.id) {
            return Err(Error::not_found("Order item", item.id));
        }
        guard.insert(item.id, item.clone());
        Ok(item)
    }

    async fn delete(&self, id: OrderItemId) -> Result<()> {
        write(&self.order_items)?
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found("Order item", id))
    }

    async fn list_for_order(&self, order_id: OrderId) -> Result<Vec<OrderItem>> {
        let guard = read(&self.order_items)?;
        let mut items: Vec<OrderItem> = guard
            .values()
            .filter(|i| i.order_id == order_id)
            .cloned()
            .collect();
        items.sort_by_key(|i| *i.id.as_uuid());
        Ok(items)
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn find(&self, id: EventId) -> Result<Option<Event>> {
        Ok(read(&self.events)?.get(&id).cloned())
    }

    async fn save(&self, event: Event) -> Result<Event> {
        write(&self.events)?.insert(event.id, event.clone());
        Ok(event)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find(&self, id: UserId) -> Result<Option<User>> {
        Ok(read(&self.users)?.get(&id).cloned())
    }

    async fn save(&self, user: User) -> Result<User> {
        write(&self.users)?.insert(user.id, user.clone());
        Ok(user)
    }
}
