//! Event ticketing backend.
//!
//! Users browse venues and events, purchase ticket types, create bookings,
//! and convert bookings into paid orders. The core of the system is the
//! booking/order/ticket-inventory lifecycle: three linked state machines
//! that must stay consistent while being driven by independent HTTP calls.
//!
//! # Architecture
//!
//! ```text
//! HTTP (axum)          Services                     Store
//! ┌────────────┐  ┌─────────────────────┐  ┌──────────────────────┐
//! │  api/*     │→ │ BookingService      │→ │ repository traits    │
//! │  server/*  │  │ OrderService        │  │  ├─ MemoryStore      │
//! └────────────┘  │ OrderItemService    │  │  └─ PgStore (sqlx)   │
//!                 │        │            │  └──────────────────────┘
//!                 │        ▼            │
//!                 │ InventoryService ───┼── single path to the
//!                 └─────────────────────┘   quantity_sold counter
//! ```
//!
//! # Key invariants
//!
//! - `0 <= quantity_sold <= quantity_available` for every ticket type,
//!   enforced by atomic conditional updates in the store.
//! - Booking transitions follow PENDING → CONFIRMED → COMPLETED with
//!   PENDING/CONFIRMED → CANCELLED; nothing leaves a terminal state.
//! - At most one order per booking. Payment completion confirms the
//!   booking; a refund cancels it and releases the reserved tickets.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod reference;
pub mod server;
pub mod services;
pub mod store;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use error::{Error, Result};
pub use server::{build_router, AppState};
pub use store::Stores;
