//! Domain types for the ticketing backend.
//!
//! Value objects, entities, and status enums shared by the store, the
//! lifecycle services, and the HTTP layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing `Uuid`
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Get the inner UUID
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Unique identifier for a ticket type
    TicketTypeId
);
id_type!(
    /// Unique identifier for a booking
    BookingId
);
id_type!(
    /// Unique identifier for an order
    OrderId
);
id_type!(
    /// Unique identifier for an order line item
    OrderItemId
);
id_type!(
    /// Unique identifier for an event
    EventId
);
id_type!(
    /// Unique identifier for a user
    UserId
);

// ============================================================================
// Money Value Object (cents-based to avoid floating point errors)
// ============================================================================

/// Represents money in cents to avoid floating-point arithmetic errors
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Money(u64);

impl Money {
    /// The zero amount
    pub const ZERO: Self = Self(0);

    /// Creates a `Money` value from cents
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Creates a `Money` value from whole dollars with overflow checking
    #[must_use]
    pub const fn checked_from_dollars(dollars: u64) -> Option<Self> {
        match dollars.checked_mul(100) {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }

    /// Returns the amount in cents
    #[must_use]
    pub const fn cents(&self) -> u64 {
        self.0
    }

    /// Checks if the amount is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Adds two money amounts with overflow checking
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }

    /// Multiplies money by a quantity with overflow checking
    #[must_use]
    pub const fn checked_multiply(self, quantity: u32) -> Option<Self> {
        match self.0.checked_mul(quantity as u64) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

// ============================================================================
// Status Enums
// ============================================================================

/// Booking lifecycle status.
///
/// Allowed transitions: PENDING → CONFIRMED → COMPLETED, and
/// PENDING/CONFIRMED → CANCELLED. CANCELLED and COMPLETED are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    /// Created, awaiting payment
    Pending,
    /// Payment completed
    Confirmed,
    /// Cancelled by the user or by a refund (terminal)
    Cancelled,
    /// Event attended / fulfilled (terminal)
    Completed,
}

impl BookingStatus {
    /// All valid statuses, in wire form
    pub const VALID: [&'static str; 4] = ["PENDING", "CONFIRMED", "CANCELLED", "COMPLETED"];

    /// Parses a status string case-insensitively
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "CONFIRMED" => Some(Self::Confirmed),
            "CANCELLED" => Some(Self::Cancelled),
            "COMPLETED" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Wire representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Cancelled => "CANCELLED",
            Self::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment status of an order.
///
/// Allowed transitions: PENDING → PROCESSING → COMPLETED, any non-COMPLETED
/// state → FAILED, COMPLETED → REFUNDED, FAILED → PENDING (retry).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Order created, payment not started
    Pending,
    /// Payment handed to the payment method
    Processing,
    /// Payment succeeded
    Completed,
    /// Payment failed (retryable)
    Failed,
    /// Completed payment was refunded (terminal)
    Refunded,
}

impl PaymentStatus {
    /// All valid statuses, in wire form
    pub const VALID: [&'static str; 5] =
        ["PENDING", "PROCESSING", "COMPLETED", "FAILED", "REFUNDED"];

    /// Parses a status string case-insensitively
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "PROCESSING" => Some(Self::Processing),
            "COMPLETED" => Some(Self::Completed),
            "FAILED" => Some(Self::Failed),
            "REFUNDED" => Some(Self::Refunded),
            _ => None,
        }
    }

    /// Wire representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Processing => "PROCESSING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Refunded => "REFUNDED",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment methods accepted by the order lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Credit card
    CreditCard,
    /// Debit card
    DebitCard,
    /// Unified Payments Interface
    Upi,
    /// Net banking
    NetBanking,
    /// Digital wallet
    Wallet,
}

impl PaymentMethod {
    /// All accepted methods, in wire form
    pub const VALID: [&'static str; 5] =
        ["CREDIT_CARD", "DEBIT_CARD", "UPI", "NET_BANKING", "WALLET"];

    /// Parses a payment method string case-insensitively
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "CREDIT_CARD" => Some(Self::CreditCard),
            "DEBIT_CARD" => Some(Self::DebitCard),
            "UPI" => Some(Self::Upi),
            "NET_BANKING" => Some(Self::NetBanking),
            "WALLET" => Some(Self::Wallet),
            _ => None,
        }
    }

    /// Wire representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CreditCard => "CREDIT_CARD",
            Self::DebitCard => "DEBIT_CARD",
            Self::Upi => "UPI",
            Self::NetBanking => "NET_BANKING",
            Self::Wallet => "WALLET",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event lifecycle status (events are lookup collaborators here)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    /// Event has not started yet
    Upcoming,
    /// Event is in progress
    Ongoing,
    /// Event has finished
    Completed,
    /// Event was cancelled
    Cancelled,
}

// ============================================================================
// Domain Entities
// ============================================================================

/// A priced category of tickets for an event, with a capacity ceiling and a
/// running sold counter.
///
/// Invariant: `0 <= quantity_sold <= quantity_available` after every
/// mutation. The counters are only ever mutated through the inventory
/// service's reserve/release operations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketType {
    /// Unique ticket type identifier
    pub id: TicketTypeId,
    /// Event this ticket type belongs to
    pub event_id: EventId,
    /// Display name (e.g., "VIP", "General Admission")
    pub name: String,
    /// Unit price
    pub price: Money,
    /// Capacity ceiling; never reducible below `quantity_sold`
    pub quantity_available: u32,
    /// Running reservation counter
    pub quantity_sold: u32,
    /// Gate on new reservations
    pub is_active: bool,
}

impl TicketType {
    /// Creates a new active ticket type with nothing sold
    #[must_use]
    pub fn new(event_id: EventId, name: String, price: Money, quantity_available: u32) -> Self {
        Self {
            id: TicketTypeId::new(),
            event_id,
            name,
            price,
            quantity_available,
            quantity_sold: 0,
            is_active: true,
        }
    }

    /// Tickets still available for reservation
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.quantity_available - self.quantity_sold
    }

    /// Checks if the requested quantity can still be reserved
    #[must_use]
    pub const fn has_availability(&self, quantity: u32) -> bool {
        self.is_active && self.remaining() >= quantity
    }
}

/// A user's reservation of N tickets of one type for one event, prior to
/// payment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Unique booking identifier
    pub id: BookingId,
    /// User who made the booking
    pub user_id: UserId,
    /// Event being booked
    pub event_id: EventId,
    /// Ticket type reserved
    pub ticket_type_id: TicketTypeId,
    /// Number of tickets (> 0)
    pub quantity: u32,
    /// Price × quantity, frozen at creation time
    pub total_amount: Money,
    /// Unique human-readable reference (`BKG-YYYYMMDD-NNNNNN`)
    pub reference: String,
    /// Current lifecycle status
    pub status: BookingStatus,
    /// When the booking was created
    pub created_at: DateTime<Utc>,
}

/// The payable wrapper around a booking, tracking payment status and method.
///
/// At most one order exists per booking. In the line-item flow the order's
/// total is instead the sum of its items' subtotals.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier
    pub id: OrderId,
    /// Booking this order pays for
    pub booking_id: BookingId,
    /// User who owns the order
    pub user_id: UserId,
    /// Unique order number (`ORD-YYYYMMDD-NNNNNN`)
    pub order_number: String,
    /// Amount to pay
    pub total_amount: Money,
    /// Current payment status
    pub payment_status: PaymentStatus,
    /// Payment method, once chosen
    pub payment_method: Option<PaymentMethod>,
    /// External transaction identifier, once processing starts
    pub transaction_id: Option<String>,
    /// Set only when the payment completes
    pub payment_date: Option<DateTime<Utc>>,
    /// When the order was created
    pub created_at: DateTime<Utc>,
}

/// A line item directly linking an order to a ticket type and quantity
/// (the cart-style flow that bypasses bookings).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Unique order item identifier
    pub id: OrderItemId,
    /// Order this item belongs to
    pub order_id: OrderId,
    /// Ticket type being purchased
    pub ticket_type_id: TicketTypeId,
    /// Number of tickets (> 0)
    pub quantity: u32,
    /// Unit price snapshotted from the ticket type at add time
    pub unit_price: Money,
    /// `unit_price × quantity`
    pub subtotal: Money,
}

// ============================================================================
// Lookup Collaborators
// ============================================================================

/// Event data consumed by the lifecycle services.
///
/// Event CRUD lives elsewhere; the core only reads the date and status for
/// booking validity checks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Unique event identifier
    pub id: EventId,
    /// Event name
    pub name: String,
    /// Venue name
    pub venue_name: String,
    /// Organizing user
    pub organizer_id: UserId,
    /// When the event takes place
    pub event_date: DateTime<Utc>,
    /// Current event status
    pub status: EventStatus,
}

/// User data consumed by the lifecycle services (lookup only)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: UserId,
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use proptest::prelude::*;

    #[test]
    fn money_display() {
        assert_eq!(Money::from_cents(5000).to_string(), "$50.00");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05");
    }

    #[test]
    fn money_checked_multiply_overflow() {
        assert_eq!(Money::from_cents(u64::MAX).checked_multiply(2), None);
        assert_eq!(
            Money::from_cents(5000).checked_multiply(10),
            Some(Money::from_cents(50_000))
        );
    }

    #[test]
    fn booking_status_parses_case_insensitively() {
        assert_eq!(BookingStatus::parse("confirmed"), Some(BookingStatus::Confirmed));
        assert_eq!(BookingStatus::parse("PENDING"), Some(BookingStatus::Pending));
        assert_eq!(BookingStatus::parse("bogus"), None);
    }

    #[test]
    fn payment_method_allow_list() {
        for m in PaymentMethod::VALID {
            assert!(PaymentMethod::parse(m).is_some());
        }
        assert_eq!(PaymentMethod::parse("CASH"), None);
    }

    #[test]
    fn ticket_type_remaining() {
        let mut tt = TicketType::new(EventId::new(), "VIP".into(), Money::from_cents(5000), 100);
        assert_eq!(tt.remaining(), 100);
        tt.quantity_sold = 40;
        assert_eq!(tt.remaining(), 60);
        assert!(tt.has_availability(60));
        assert!(!tt.has_availability(61));
    }

    proptest! {
        #[test]
        fn money_multiply_matches_cents(cents in 0u64..1_000_000, qty in 0u32..10_000) {
            let product = Money::from_cents(cents).checked_multiply(qty).unwrap();
            prop_assert_eq!(product.cents(), cents * u64::from(qty));
        }

        #[test]
        fn money_add_commutes(a in 0u64..1_000_000_000, b in 0u64..1_000_000_000) {
            let x = Money::from_cents(a).checked_add(Money::from_cents(b)).unwrap();
            let y = Money::from_cents(b).checked_add(Money::from_cents(a)).unwrap();
            prop_assert_eq!(x, y);
        }
    }
}
