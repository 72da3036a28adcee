//! Booking lifecycle.
//!
//! State machine: PENDING → CONFIRMED → COMPLETED, with PENDING or
//! CONFIRMED → CANCELLED. CANCELLED and COMPLETED are terminal. Creating a
//! booking reserves inventory; cancelling releases it. Confirmation is
//! driven by the order/payment lifecycle, never directly by payment
//! callers.

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::reference::{self, BOOKING_PREFIX, MAX_ATTEMPTS};
use crate::services::inventory::InventoryService;
use crate::store::{BookingStore, EventStore, TicketTypeStore, UserStore};
use crate::types::{
    Booking, BookingId, BookingStatus, EventId, EventStatus, Money, TicketTypeId, UserId,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Input for creating a booking.
#[derive(Clone, Copy, Debug)]
pub struct NewBooking {
    /// User making the booking
    pub user_id: UserId,
    /// Event being booked
    pub event_id: EventId,
    /// Ticket type to reserve
    pub ticket_type_id: TicketTypeId,
    /// Number of tickets (> 0)
    pub quantity: u32,
}

/// Booking lifecycle service.
pub struct BookingService {
    bookings: Arc<dyn BookingStore>,
    users: Arc<dyn UserStore>,
    events: Arc<dyn EventStore>,
    ticket_types: Arc<dyn TicketTypeStore>,
    inventory: Arc<InventoryService>,
    clock: Arc<dyn Clock>,
}

impl BookingService {
    /// Wires the service with its repositories and collaborators.
    #[must_use]
    pub fn new(
        bookings: Arc<dyn BookingStore>,
        users: Arc<dyn UserStore>,
        events: Arc<dyn EventStore>,
        ticket_types: Arc<dyn TicketTypeStore>,
        inventory: Arc<InventoryService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            bookings,
            users,
            events,
            ticket_types,
            inventory,
            clock,
        }
    }

    /// Creates a booking: resolves the references, reserves inventory,
    /// freezes the total amount, and persists with a fresh unique
    /// reference.
    ///
    /// # Errors
    ///
    /// `NotFound` if the user, event, or ticket type is absent;
    /// `InvalidArgument` if the quantity is zero; `InvalidState` if the
    /// ticket type is inactive; `Conflict` if not enough tickets remain.
    pub async fn create(&self, new_booking: NewBooking) -> Result<Booking> {
        self.users
            .find(new_booking.user_id)
            .await?
            .ok_or_else(|| Error::not_found("User", new_booking.user_id))?;
        self.events
            .find(new_booking.event_id)
            .await?
            .ok_or_else(|| Error::not_found("Event", new_booking.event_id))?;
        let ticket_type = self
            .ticket_types
            .find(new_booking.ticket_type_id)
            .await?
            .ok_or_else(|| Error::not_found("Ticket type", new_booking.ticket_type_id))?;

        if new_booking.quantity == 0 {
            return Err(Error::InvalidArgument(
                "Quantity must be greater than 0".to_string(),
            ));
        }

        let total_amount = ticket_type
            .price
            .checked_multiply(new_booking.quantity)
            .ok_or_else(|| Error::InvalidArgument("Total amount overflows".to_string()))?;

        // The reserve is the atomic claim; the status and counters commit
        // together or not at all. If persisting the booking fails below,
        // the claim is handed back.
        self.inventory
            .reserve(new_booking.ticket_type_id, new_booking.quantity)
            .await?;

        match self.persist_new(new_booking, total_amount).await {
            Ok(booking) => {
                info!(
                    booking_id = %booking.id,
                    reference = %booking.reference,
                    quantity = booking.quantity,
                    "booking created"
                );
                Ok(booking)
            }
            Err(err) => {
                if let Err(release_err) = self
                    .inventory
                    .release(new_booking.ticket_type_id, new_booking.quantity)
                    .await
                {
                    warn!(
                        ticket_type_id = %new_booking.ticket_type_id,
                        error = %release_err,
                        "failed to release reservation after booking persist failure"
                    );
                }
                Err(err)
            }
        }
    }

    /// Inserts the booking under a freshly generated reference, retrying a
    /// bounded number of times on collision.
    async fn persist_new(&self, new_booking: NewBooking, total_amount: Money) -> Result<Booking> {
        let now = self.clock.now();
        for _ in 0..MAX_ATTEMPTS {
            let candidate = reference::generate(BOOKING_PREFIX, now);
            if self.bookings.find_by_reference(&candidate).await?.is_some() {
                continue;
            }
            let booking = Booking {
                id: BookingId::new(),
                user_id: new_booking.user_id,
                event_id: new_booking.event_id,
                ticket_type_id: new_booking.ticket_type_id,
                quantity: new_booking.quantity,
                total_amount,
                reference: candidate,
                status: BookingStatus::Pending,
                created_at: now,
            };
            match self.bookings.insert(booking).await {
                Ok(booking) => return Ok(booking),
                // Lost a race on the reference; generate a new one.
                Err(Error::Conflict(_)) => continue,
                Err(err) => return Err(err),
            }
        }
        Err(Error::Internal(
            "could not allocate a unique booking reference".to_string(),
        ))
    }

    /// Looks up a booking, failing `NotFound` when absent.
    pub async fn get(&self, id: BookingId) -> Result<Booking> {
        self.bookings
            .find(id)
            .await?
            .ok_or_else(|| Error::not_found("Booking", id))
    }

    /// Looks up a booking by its unique reference.
    pub async fn get_by_reference(&self, reference: &str) -> Result<Booking> {
        self.bookings
            .find_by_reference(reference)
            .await?
            .ok_or_else(|| Error::NotFound {
                resource: "Booking",
                id: reference.to_string(),
            })
    }

    /// Confirms a pending booking after payment completes.
    ///
    /// # Errors
    ///
    /// `InvalidState` unless the booking is PENDING and still valid.
    pub async fn confirm(&self, id: BookingId) -> Result<Booking> {
        let mut booking = self.get(id).await?;

        if booking.status != BookingStatus::Pending {
            return Err(Error::InvalidState(
                "Only pending bookings can be confirmed".to_string(),
            ));
        }
        if !self.validate(id).await? {
            return Err(Error::InvalidState(
                "Booking is no longer valid".to_string(),
            ));
        }

        booking.status = BookingStatus::Confirmed;
        let booking = self.bookings.update(booking).await?;
        info!(booking_id = %id, "booking confirmed");
        Ok(booking)
    }

    /// Cancels a booking and releases its reserved tickets.
    ///
    /// # Errors
    ///
    /// `InvalidState` if the booking is already CANCELLED or COMPLETED.
    pub async fn cancel(&self, id: BookingId) -> Result<Booking> {
        let mut booking = self.get(id).await?;

        if booking.status == BookingStatus::Cancelled {
            return Err(Error::InvalidState(
                "Booking is already cancelled".to_string(),
            ));
        }
        if booking.status == BookingStatus::Completed {
            return Err(Error::InvalidState(
                "Cannot cancel a completed booking".to_string(),
            ));
        }

        self.inventory
            .release(booking.ticket_type_id, booking.quantity)
            .await?;

        booking.status = BookingStatus::Cancelled;
        let booking = self.bookings.update(booking).await?;
        info!(booking_id = %id, "booking cancelled");
        Ok(booking)
    }

    /// Marks a confirmed booking as completed (after the event).
    ///
    /// # Errors
    ///
    /// `InvalidState` unless the booking is CONFIRMED.
    pub async fn complete(&self, id: BookingId) -> Result<Booking> {
        let mut booking = self.get(id).await?;

        if booking.status != BookingStatus::Confirmed {
            return Err(Error::InvalidState(
                "Only confirmed bookings can be completed".to_string(),
            ));
        }

        booking.status = BookingStatus::Completed;
        self.bookings.update(booking).await
    }

    /// Read-only validity predicate: the event is upcoming and not
    /// cancelled, the ticket type is active, and the booking is not
    /// cancelled.
    ///
    /// # Errors
    ///
    /// `NotFound` if the booking is absent. A dangling event or ticket
    /// type reference makes the booking invalid rather than erroring.
    pub async fn validate(&self, id: BookingId) -> Result<bool> {
        let booking = self.get(id).await?;

        let Some(event) = self.events.find(booking.event_id).await? else {
            warn!(booking_id = %id, event_id = %booking.event_id, "booking references missing event");
            return Ok(false);
        };
        if event.event_date <= self.clock.now() {
            return Ok(false);
        }
        if event.status == EventStatus::Cancelled {
            return Ok(false);
        }

        let Some(ticket_type) = self.ticket_types.find(booking.ticket_type_id).await? else {
            warn!(booking_id = %id, ticket_type_id = %booking.ticket_type_id, "booking references missing ticket type");
            return Ok(false);
        };
        if !ticket_type.is_active {
            return Ok(false);
        }

        Ok(booking.status != BookingStatus::Cancelled)
    }

    /// Parses a status string and routes it through the lifecycle
    /// operations, so the allowed edges are never bypassed.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an unknown status; otherwise whatever the
    /// targeted transition returns.
    pub async fn update_status(&self, id: BookingId, status: &str) -> Result<Booking> {
        let Some(target) = BookingStatus::parse(status) else {
            return Err(Error::InvalidArgument(format!(
                "Invalid status. Valid statuses are: {}",
                BookingStatus::VALID.join(", ")
            )));
        };

        match target {
            BookingStatus::Pending => {
                let booking = self.get(id).await?;
                if booking.status == BookingStatus::Pending {
                    Ok(booking)
                } else {
                    Err(Error::InvalidState(
                        "Cannot move a booking back to pending".to_string(),
                    ))
                }
            }
            BookingStatus::Confirmed => self.confirm(id).await,
            BookingStatus::Cancelled => self.cancel(id).await,
            BookingStatus::Completed => self.complete(id).await,
        }
    }

    /// Bookings made by a user, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// `NotFound` if the user is absent.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>> {
        self.users
            .find(user_id)
            .await?
            .ok_or_else(|| Error::not_found("User", user_id))?;
        self.bookings.list_for_user(user_id, status).await
    }

    /// Bookings against an event, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// `NotFound` if the event is absent.
    pub async fn list_for_event(
        &self,
        event_id: EventId,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>> {
        self.events
            .find(event_id)
            .await?
            .ok_or_else(|| Error::not_found("Event", event_id))?;
        self.bookings.list_for_event(event_id, status).await
    }

    /// All bookings in the given status.
    pub async fn list_by_status(&self, status: BookingStatus) -> Result<Vec<Booking>> {
        self.bookings.list_by_status(status).await
    }

    /// Total revenue from CONFIRMED bookings for an event.
    ///
    /// # Errors
    ///
    /// `NotFound` if the event is absent.
    pub async fn event_revenue(&self, event_id: EventId) -> Result<Money> {
        let confirmed = self
            .list_for_event(event_id, Some(BookingStatus::Confirmed))
            .await?;
        confirmed
            .iter()
            .try_fold(Money::ZERO, |acc, b| acc.checked_add(b.total_amount))
            .ok_or_else(|| Error::Internal("revenue sum overflows".to_string()))
    }
}
