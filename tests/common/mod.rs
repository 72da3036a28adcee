//! Shared test harness: in-memory stores, a fixed clock, and seed helpers.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]

use boxoffice::clock::FixedClock;
use boxoffice::config::{Config, DatabaseConfig, OrderConfig, ServerConfig};
use boxoffice::server::AppState;
use boxoffice::store::Stores;
use boxoffice::types::{
    Event, EventId, EventStatus, Money, TicketType, TicketTypeId, User, UserId,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;

/// A fully wired application over the in-memory store and a fixed clock.
pub struct TestApp {
    pub stores: Stores,
    pub clock: Arc<FixedClock>,
    pub state: AppState,
}

/// The instant every test starts at.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

pub fn test_config() -> Config {
    Config {
        database: DatabaseConfig {
            url: None,
            max_connections: 5,
            connect_timeout: 5,
        },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        orders: OrderConfig { expiry_minutes: 30 },
    }
}

impl TestApp {
    pub fn new() -> Self {
        let stores = Stores::in_memory();
        let clock = Arc::new(FixedClock::new(base_time()));
        let state = AppState::new(&stores, clock.clone(), &test_config());
        Self {
            stores,
            clock,
            state,
        }
    }

    pub async fn seed_user(&self) -> User {
        let user = User {
            id: UserId::new(),
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
        };
        self.stores.users.save(user.clone()).await.unwrap()
    }

    /// Seeds an upcoming event 30 days out.
    pub async fn seed_event(&self, organizer_id: UserId) -> Event {
        self.seed_event_with(organizer_id, base_time() + Duration::days(30), EventStatus::Upcoming)
            .await
    }

    pub async fn seed_event_with(
        &self,
        organizer_id: UserId,
        event_date: DateTime<Utc>,
        status: EventStatus,
    ) -> Event {
        let event = Event {
            id: EventId::new(),
            name: "Summer Concert".to_string(),
            venue_name: "City Arena".to_string(),
            organizer_id,
            event_date,
            status,
        };
        self.stores.events.save(event.clone()).await.unwrap()
    }

    /// Seeds an active ticket type with nothing sold.
    pub async fn seed_ticket_type(
        &self,
        event_id: EventId,
        price_cents: u64,
        quantity_available: u32,
    ) -> TicketType {
        let ticket_type = TicketType::new(
            event_id,
            "General Admission".to_string(),
            Money::from_cents(price_cents),
            quantity_available,
        );
        self.stores
            .ticket_types
            .save(ticket_type.clone())
            .await
            .unwrap()
    }

    /// Current sold counter for a ticket type.
    pub async fn sold(&self, ticket_type_id: TicketTypeId) -> u32 {
        self.stores
            .ticket_types
            .find(ticket_type_id)
            .await
            .unwrap()
            .unwrap()
            .quantity_sold
    }
}
