//! Ticket inventory accounting.
//!
//! Owns the `quantity_available` / `quantity_sold` counters. This service is
//! the single entry point for reservation accounting: the booking flow and
//! the order line-item flow both delegate here and never mutate the counters
//! themselves. The store-level reserve/release operations are atomic
//! conditional updates, so a capacity check can never be raced past.

use crate::error::{Error, Result};
use crate::store::{BookingStore, EventStore, TicketTypeStore};
use crate::types::{EventId, Money, TicketType, TicketTypeId};
use std::sync::Arc;
use tracing::info;

/// Input for creating a ticket type.
#[derive(Clone, Debug)]
pub struct NewTicketType {
    /// Event the ticket type belongs to
    pub event_id: EventId,
    /// Display name
    pub name: String,
    /// Unit price
    pub price: Money,
    /// Capacity ceiling (> 0)
    pub quantity_available: u32,
}

/// Partial update for a ticket type. `None` fields are left unchanged.
#[derive(Clone, Debug, Default)]
pub struct TicketTypeUpdate {
    /// New display name
    pub name: Option<String>,
    /// New unit price
    pub price: Option<Money>,
    /// New capacity ceiling; must not drop below `quantity_sold`
    pub quantity_available: Option<u32>,
}

/// Ticket inventory accounting service.
pub struct InventoryService {
    ticket_types: Arc<dyn TicketTypeStore>,
    events: Arc<dyn EventStore>,
    bookings: Arc<dyn BookingStore>,
}

impl InventoryService {
    /// Wires the service with its repositories.
    #[must_use]
    pub fn new(
        ticket_types: Arc<dyn TicketTypeStore>,
        events: Arc<dyn EventStore>,
        bookings: Arc<dyn BookingStore>,
    ) -> Self {
        Self {
            ticket_types,
            events,
            bookings,
        }
    }

    /// Adds a ticket type to an event.
    ///
    /// # Errors
    ///
    /// `NotFound` if the event is absent, `InvalidArgument` if the capacity
    /// is zero.
    pub async fn create_ticket_type(&self, new_ticket_type: NewTicketType) -> Result<TicketType> {
        self.events
            .find(new_ticket_type.event_id)
            .await?
            .ok_or_else(|| Error::not_found("Event", new_ticket_type.event_id))?;

        if new_ticket_type.quantity_available == 0 {
            return Err(Error::InvalidArgument(
                "Quantity available must be greater than 0".to_string(),
            ));
        }

        let ticket_type = TicketType::new(
            new_ticket_type.event_id,
            new_ticket_type.name,
            new_ticket_type.price,
            new_ticket_type.quantity_available,
        );
        let saved = self.ticket_types.save(ticket_type).await?;
        info!(ticket_type_id = %saved.id, event_id = %saved.event_id, "ticket type created");
        Ok(saved)
    }

    /// Modifies ticket type details.
    ///
    /// # Errors
    ///
    /// `NotFound` if the ticket type is absent, `InvalidArgument` if the new
    /// capacity would drop below the sold count.
    pub async fn update_ticket_type(
        &self,
        id: TicketTypeId,
        update: TicketTypeUpdate,
    ) -> Result<TicketType> {
        let mut ticket_type = self.get(id).await?;

        if let Some(name) = update.name {
            ticket_type.name = name;
        }
        if let Some(price) = update.price {
            ticket_type.price = price;
        }
        if let Some(quantity_available) = update.quantity_available {
            if quantity_available < ticket_type.quantity_sold {
                return Err(Error::InvalidArgument(
                    "Quantity available cannot be less than quantity already sold".to_string(),
                ));
            }
            ticket_type.quantity_available = quantity_available;
        }

        self.ticket_types.save(ticket_type).await
    }

    /// Removes a ticket type that has never sold and has no bookings.
    ///
    /// # Errors
    ///
    /// `NotFound` if absent, `InvalidState` if tickets were sold or bookings
    /// reference it.
    pub async fn delete_ticket_type(&self, id: TicketTypeId) -> Result<()> {
        let ticket_type = self.get(id).await?;

        if ticket_type.quantity_sold > 0 {
            return Err(Error::InvalidState(
                "Cannot delete ticket type with sold tickets".to_string(),
            ));
        }
        if self.bookings.exists_for_ticket_type(id).await? {
            return Err(Error::InvalidState(
                "Cannot delete ticket type with existing bookings".to_string(),
            ));
        }

        self.ticket_types.delete(id).await
    }

    /// Looks up a ticket type, failing `NotFound` when absent.
    pub async fn get(&self, id: TicketTypeId) -> Result<TicketType> {
        self.ticket_types
            .find(id)
            .await?
            .ok_or_else(|| Error::not_found("Ticket type", id))
    }

    /// Ticket types for an event, optionally only active ones.
    ///
    /// # Errors
    ///
    /// `NotFound` if the event is absent.
    pub async fn list_by_event(
        &self,
        event_id: EventId,
        active_only: bool,
    ) -> Result<Vec<TicketType>> {
        self.events
            .find(event_id)
            .await?
            .ok_or_else(|| Error::not_found("Event", event_id))?;
        self.ticket_types.list_by_event(event_id, active_only).await
    }

    /// Claims `quantity` tickets (increments the sold counter).
    ///
    /// # Errors
    ///
    /// `NotFound` if the ticket type is absent, `InvalidState` if it is
    /// inactive, `Conflict` if fewer than `quantity` tickets remain.
    pub async fn reserve(&self, id: TicketTypeId, quantity: u32) -> Result<TicketType> {
        let ticket_type = self.ticket_types.reserve(id, quantity).await?;
        info!(
            ticket_type_id = %id,
            quantity,
            sold = ticket_type.quantity_sold,
            "tickets reserved"
        );
        Ok(ticket_type)
    }

    /// Returns `quantity` tickets (decrements the sold counter).
    ///
    /// # Errors
    ///
    /// `NotFound` if the ticket type is absent, `InvalidState` if the
    /// counter would go below zero.
    pub async fn release(&self, id: TicketTypeId, quantity: u32) -> Result<TicketType> {
        let ticket_type = self.ticket_types.release(id, quantity).await?;
        info!(
            ticket_type_id = %id,
            quantity,
            sold = ticket_type.quantity_sold,
            "tickets released"
        );
        Ok(ticket_type)
    }

    /// Advisory availability check. Pure read; not atomic with a later
    /// reserve, which re-checks under the store's conditional update.
    pub async fn check_availability(&self, id: TicketTypeId, quantity: u32) -> Result<bool> {
        let ticket_type = self.get(id).await?;
        Ok(ticket_type.has_availability(quantity))
    }

    /// Tickets still available for reservation.
    pub async fn remaining(&self, id: TicketTypeId) -> Result<u32> {
        let ticket_type = self.get(id).await?;
        Ok(ticket_type.remaining())
    }

    /// Updates the capacity ceiling.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the new quantity is below the sold count.
    pub async fn set_available_quantity(
        &self,
        id: TicketTypeId,
        new_quantity: u32,
    ) -> Result<TicketType> {
        let mut ticket_type = self.get(id).await?;
        if new_quantity < ticket_type.quantity_sold {
            return Err(Error::InvalidArgument(format!(
                "New quantity cannot be less than quantity already sold ({})",
                ticket_type.quantity_sold
            )));
        }
        ticket_type.quantity_available = new_quantity;
        self.ticket_types.save(ticket_type).await
    }

    /// Opens the ticket type for new reservations.
    pub async fn activate(&self, id: TicketTypeId) -> Result<TicketType> {
        let mut ticket_type = self.get(id).await?;
        ticket_type.is_active = true;
        self.ticket_types.save(ticket_type).await
    }

    /// Closes the ticket type for new reservations. Existing reservations
    /// are unaffected.
    pub async fn deactivate(&self, id: TicketTypeId) -> Result<TicketType> {
        let mut ticket_type = self.get(id).await?;
        ticket_type.is_active = false;
        self.ticket_types.save(ticket_type).await
    }
}
