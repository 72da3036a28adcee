//! `PostgreSQL` store backend.
//!
//! Queries are runtime-bound (`sqlx::query_as` + `bind`). The counter
//! operations are single conditional `UPDATE` statements, so the capacity
//! check and the increment commit together and concurrent reservations
//! cannot race past the check. Booking references and order numbers are
//! additionally guarded by unique indexes (see `migrations/`).

use super::{
    BookingStore, EventStore, OrderItemStore, OrderStore, TicketTypeStore, UserStore,
};
use crate::error::{Error, Result};
use crate::types::{
    Booking, BookingId, BookingStatus, Event, EventId, EventStatus, Money, Order, OrderId,
    OrderItem, OrderItemId, PaymentMethod, PaymentStatus, TicketType, TicketTypeId, User, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

/// `PostgreSQL`-backed implementation of all repository traits.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connects a pool to the given database URL.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the pool cannot be established.
    pub async fn connect(url: &str, max_connections: u32, connect_timeout: u64) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(connect_timeout))
            .connect(url)
            .await
            .map_err(|e| Error::Internal(format!("failed to connect to database: {e}")))?;
        Ok(Self { pool })
    }

    /// Wraps an existing pool (tests, migrations tooling).
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Access the underlying connection pool (health checks).
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// ============================================================================
// Row mapping
// ============================================================================

fn to_quantity(value: i32, field: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::Internal(format!("negative {field} in database")))
}

fn to_money(value: i64, field: &str) -> Result<Money> {
    u64::try_from(value)
        .map(Money::from_cents)
        .map_err(|_| Error::Internal(format!("negative {field} in database")))
}

fn money_param(value: Money) -> Result<i64> {
    i64::try_from(value.cents())
        .map_err(|_| Error::InvalidArgument("amount exceeds storable range".to_string()))
}

fn quantity_param(value: u32) -> Result<i32> {
    i32::try_from(value)
        .map_err(|_| Error::InvalidArgument("quantity exceeds storable range".to_string()))
}

fn conflict_on_unique(err: sqlx::Error, message: &str) -> Error {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            Error::Conflict(message.to_string())
        }
        _ => Error::from(err),
    }
}

#[derive(sqlx::FromRow)]
struct TicketTypeRow {
    id: Uuid,
    event_id: Uuid,
    name: String,
    price_cents: i64,
    quantity_available: i32,
    quantity_sold: i32,
    is_active: bool,
}

impl TicketTypeRow {
    fn into_domain(self) -> Result<TicketType> {
        Ok(TicketType {
            id: TicketTypeId::from_uuid(self.id),
            event_id: EventId::from_uuid(self.event_id),
            name: self.name,
            price: to_money(self.price_cents, "price")?,
            quantity_available: to_quantity(self.quantity_available, "quantity_available")?,
            quantity_sold: to_quantity(self.quantity_sold, "quantity_sold")?,
            is_active: self.is_active,
        })
    }
}

const TICKET_TYPE_COLUMNS: &str =
    "id, event_id, name, price_cents, quantity_available, quantity_sold, is_active";

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    user_id: Uuid,
    event_id: Uuid,
    ticket_type_id: Uuid,
    quantity: i32,
    total_amount_cents: i64,
    reference: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl BookingRow {
    fn into_domain(self) -> Result<Booking> {
        let status = BookingStatus::parse(&self.status)
            .ok_or_else(|| Error::Internal(format!("unknown booking status: {}", self.status)))?;
        Ok(Booking {
            id: BookingId::from_uuid(self.id),
            user_id: UserId::from_uuid(self.user_id),
            event_id: EventId::from_uuid(self.event_id),
            ticket_type_id: TicketTypeId::from_uuid(self.ticket_type_id),
            quantity: to_quantity(self.quantity, "quantity")?,
            total_amount: to_money(self.total_amount_cents, "total_amount")?,
            reference: self.reference,
            status,
            created_at: self.created_at,
        })
    }
}

const BOOKING_COLUMNS: &str =
    "id, user_id, event_id, ticket_type_id, quantity, total_amount_cents, reference, status, created_at";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    booking_id: Uuid,
    user_id: Uuid,
    order_number: String,
    total_amount_cents: i64,
    payment_status: String,
    payment_method: Option<String>,
    transaction_id: Option<String>,
    payment_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_domain(self) -> Result<Order> {
        let payment_status = PaymentStatus::parse(&self.payment_status).ok_or_else(|| {
            Error::Internal(format!("unknown payment status: {}", self.payment_status))
        })?;
        let payment_method = self
            .payment_method
            .as_deref()
            .map(|m| {
                PaymentMethod::parse(m)
                    .ok_or_else(|| Error::Internal(format!("unknown payment method: {m}")))
            })
            .transpose()?;
        Ok(Order {
            id: OrderId::from_uuid(self.id),
            booking_id: BookingId::from_uuid(self.booking_id),
            user_id: UserId::from_uuid(self.user_id),
            order_number: self.order_number,
            total_amount: to_money(self.total_amount_cents, "total_amount")?,
            payment_status,
            payment_method,
            transaction_id: self.transaction_id,
            payment_date: self.payment_date,
            created_at: self.created_at,
        })
    }
}

const ORDER_COLUMNS: &str = "id, booking_id, user_id, order_number, total_amount_cents, \
     payment_status, payment_method, transaction_id, payment_date, created_at";

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: Uuid,
    order_id: Uuid,
    ticket_type_id: Uuid,
    quantity: i32,
    unit_price_cents: i64,
    subtotal_cents: i64,
}

impl OrderItemRow {
    fn into_domain(self) -> Result<OrderItem> {
        Ok(OrderItem {
            id: OrderItemId::from_uuid(self.id),
            order_id: OrderId::from_uuid(self.order_id),
            ticket_type_id: TicketTypeId::from_uuid(self.ticket_type_id),
            quantity: to_quantity(self.quantity, "quantity")?,
            unit_price: to_money(self.unit_price_cents, "unit_price")?,
            subtotal: to_money(self.subtotal_cents, "subtotal")?,
        })
    }
}

const ORDER_ITEM_COLUMNS: &str =
    "id, order_id, ticket_type_id, quantity, unit_price_cents, subtotal_cents";

#[derive(sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    name: String,
    venue_name: String,
    organizer_id: Uuid,
    event_date: DateTime<Utc>,
    status: String,
}

impl EventRow {
    fn into_domain(self) -> Result<Event> {
        let status = match self.status.as_str() {
            "UPCOMING" => EventStatus::Upcoming,
            "ONGOING" => EventStatus::Ongoing,
            "COMPLETED" => EventStatus::Completed,
            "CANCELLED" => EventStatus::Cancelled,
            other => return Err(Error::Internal(format!("unknown event status: {other}"))),
        };
        Ok(Event {
            id: EventId::from_uuid(self.id),
            name: self.name,
            venue_name: self.venue_name,
            organizer_id: UserId::from_uuid(self.organizer_id),
            event_date: self.event_date,
            status,
        })
    }
}

fn event_status_str(status: EventStatus) -> &'static str {
    match status {
        EventStatus::Upcoming => "UPCOMING",
        EventStatus::Ongoing => "ONGOING",
        EventStatus::Completed => "COMPLETED",
        EventStatus::Cancelled => "CANCELLED",
    }
}

// ============================================================================
// TicketTypeStore
// ============================================================================

#[async_trait]
impl TicketTypeStore for PgStore {
    async fn find(&self, id: TicketTypeId) -> Result<Option<TicketType>> {
        let row: Option<TicketTypeRow> = sqlx::query_as(&format!(
            "SELECT {TICKET_TYPE_COLUMNS} FROM ticket_types WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        row.map(TicketTypeRow::into_domain).transpose()
    }

    async fn save(&self, ticket_type: TicketType) -> Result<TicketType> {
        sqlx::query(
            "INSERT INTO ticket_types \
                 (id, event_id, name, price_cents, quantity_available, quantity_sold, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (id) DO UPDATE SET \
                 name = EXCLUDED.name, \
                 price_cents = EXCLUDED.price_cents, \
                 quantity_available = EXCLUDED.quantity_available, \
                 quantity_sold = EXCLUDED.quantity_sold, \
                 is_active = EXCLUDED.is_active",
        )
        .bind(ticket_type.id.as_uuid())
        .bind(ticket_type.event_id.as_uuid())
        .bind(&ticket_type.name)
        .bind(money_param(ticket_type.price)?)
        .bind(quantity_param(ticket_type.quantity_available)?)
        .bind(quantity_param(ticket_type.quantity_sold)?)
        .bind(ticket_type.is_active)
        .execute(&self.pool)
        .await?;
        Ok(ticket_type)
    }

    async fn delete(&self, id: TicketTypeId) -> Result<()> {
        let result = sqlx::query("DELETE FROM ticket_types WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found("Ticket type", id));
        }
        Ok(())
    }

    async fn list_by_event(&self, event_id: EventId, active_only: bool) -> Result<Vec<TicketType>> {
        let rows: Vec<TicketTypeRow> = sqlx::query_as(&format!(
            "SELECT {TICKET_TYPE_COLUMNS} FROM ticket_types \
             WHERE event_id = $1 AND ($2 = false OR is_active) \
             ORDER BY name"
        ))
        .bind(event_id.as_uuid())
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TicketTypeRow::into_domain).collect()
    }

    async fn reserve(&self, id: TicketTypeId, quantity: u32) -> Result<TicketType> {
        // The availability check and the increment commit as one statement.
        let row: Option<TicketTypeRow> = sqlx::query_as(&format!(
            "UPDATE ticket_types \
                SET quantity_sold = quantity_sold + $2 \
              WHERE id = $1 \
                AND is_active \
                AND quantity_sold + $2 <= quantity_available \
             RETURNING {TICKET_TYPE_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .bind(quantity_param(quantity)?)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row.into_domain(),
            None => {
                let current = TicketTypeStore::find(self, id)
                    .await?
                    .ok_or_else(|| Error::not_found("Ticket type", id))?;
                if current.is_active {
                    Err(Error::Conflict(format!(
                        "Not enough tickets available. Available: {}",
                        current.remaining()
                    )))
                } else {
                    Err(Error::InvalidState("Ticket type is not active".to_string()))
                }
            }
        }
    }

    async fn release(&self, id: TicketTypeId, quantity: u32) -> Result<TicketType> {
        let row: Option<TicketTypeRow> = sqlx::query_as(&format!(
            "UPDATE ticket_types \
                SET quantity_sold = quantity_sold - $2 \
              WHERE id = $1 \
                AND quantity_sold >= $2 \
             RETURNING {TICKET_TYPE_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .bind(quantity_param(quantity)?)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row.into_domain(),
            None => {
                TicketTypeStore::find(self, id)
                    .await?
                    .ok_or_else(|| Error::not_found("Ticket type", id))?;
                Err(Error::InvalidState(
                    "Cannot decrement tickets below zero".to_string(),
                ))
            }
        }
    }
}

// ============================================================================
// BookingStore
// ============================================================================

#[async_trait]
impl BookingStore for PgStore {
    async fn find(&self, id: BookingId) -> Result<Option<Booking>> {
        let row: Option<BookingRow> = sqlx::query_as(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        row.map(BookingRow::into_domain).transpose()
    }

    async fn find_by_reference(&self, reference: &str) -> Result<Option<Booking>> {
        let row: Option<BookingRow> = sqlx::query_as(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE reference = $1"
        ))
        .bind(reference)
        .fetch_optional(&self.pool)
        .await?;
        row.map(BookingRow::into_domain).transpose()
    }

    async fn insert(&self, booking: Booking) -> Result<Booking> {
        sqlx::query(
            "INSERT INTO bookings \
                 (id, user_id, event_id, ticket_type_id, quantity, total_amount_cents, \
                  reference, status, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(booking.id.as_uuid())
        .bind(booking.user_id.as_uuid())
        .bind(booking.event_id.as_uuid())
        .bind(booking.ticket_type_id.as_uuid())
        .bind(quantity_param(booking.quantity)?)
        .bind(money_param(booking.total_amount)?)
        .bind(&booking.reference)
        .bind(booking.status.as_str())
        .bind(booking.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            conflict_on_unique(
                e,
                &format!("Booking reference {} already exists", booking.reference),
            )
        })?;
        Ok(booking)
    }

    async fn update(&self, booking: Booking) -> Result<Booking> {
        let result = sqlx::query(
            "UPDATE bookings SET status = $2, total_amount_cents = $3 WHERE id = $1",
        )
        .bind(booking.id.as_uuid())
        .bind(booking.status.as_str())
        .bind(money_param(booking.total_amount)?)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found("Booking", booking.id));
        }
        Ok(booking)
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE user_id = $1 AND ($2::text IS NULL OR status = $2) \
             ORDER BY created_at"
        ))
        .bind(user_id.as_uuid())
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(BookingRow::into_domain).collect()
    }

    async fn list_for_event(
        &self,
        event_id: EventId,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE event_id = $1 AND ($2::text IS NULL OR status = $2) \
             ORDER BY created_at"
        ))
        .bind(event_id.as_uuid())
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(BookingRow::into_domain).collect()
    }

    async fn list_by_status(&self, status: BookingStatus) -> Result<Vec<Booking>> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE status = $1 ORDER BY created_at"
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(BookingRow::into_domain).collect()
    }

    async fn exists_for_ticket_type(&self, ticket_type_id: TicketTypeId) -> Result<bool> {
        let row: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM bookings WHERE ticket_type_id = $1)")
                .bind(ticket_type_id.as_uuid())
                .fetch_one(&self.pool)
                .await?;
        Ok(row.0)
    }
}

// ============================================================================
// OrderStore
// ============================================================================

#[async_trait]
impl OrderStore for PgStore {
    async fn find(&self, id: OrderId) -> Result<Option<Order>> {
        let row: Option<OrderRow> =
            sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;
        row.map(OrderRow::into_domain).transpose()
    }

    async fn find_by_number(&self, order_number: &str) -> Result<Option<Order>> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE order_number = $1"
        ))
        .bind(order_number)
        .fetch_optional(&self.pool)
        .await?;
        row.map(OrderRow::into_domain).transpose()
    }

    async fn find_by_booking(&self, booking_id: BookingId) -> Result<Option<Order>> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE booking_id = $1"
        ))
        .bind(booking_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        row.map(OrderRow::into_domain).transpose()
    }

    async fn insert(&self, order: Order) -> Result<Order> {
        sqlx::query(
            "INSERT INTO orders \
                 (id, booking_id, user_id, order_number, total_amount_cents, payment_status, \
                  payment_method, transaction_id, payment_date, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(order.id.as_uuid())
        .bind(order.booking_id.as_uuid())
        .bind(order.user_id.as_uuid())
        .bind(&order.order_number)
        .bind(money_param(order.total_amount)?)
        .bind(order.payment_status.as_str())
        .bind(order.payment_method.map(|m| m.as_str()))
        .bind(order.transaction_id.as_deref())
        .bind(order.payment_date)
        .bind(order.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db)
                if db.is_unique_violation()
                    && db.constraint() == Some("orders_booking_id_key") =>
            {
                Error::Conflict("Order already exists for this booking".to_string())
            }
            _ => conflict_on_unique(
                e,
                &format!("Order number {} already exists", order.order_number),
            ),
        })?;
        Ok(order)
    }

    async fn update(&self, order: Order) -> Result<Order> {
        let result = sqlx::query(
            "UPDATE orders \
                SET total_amount_cents = $2, payment_status = $3, payment_method = $4, \
                    transaction_id = $5, payment_date = $6 \
              WHERE id = $1",
        )
        .bind(order.id.as_uuid())
        .bind(money_param(order.total_amount)?)
        .bind(order.payment_status.as_str())
        .bind(order.payment_method.map(|m| m.as_str()))
        .bind(order.transaction_id.as_deref())
        .bind(order.payment_date)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found("Order", order.id));
        }
        Ok(order)
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
        status: Option<PaymentStatus>,
    ) -> Result<Vec<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE user_id = $1 AND ($2::text IS NULL OR payment_status = $2) \
             ORDER BY created_at"
        ))
        .bind(user_id.as_uuid())
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(OrderRow::into_domain).collect()
    }

    async fn list_by_status(&self, status: PaymentStatus) -> Result<Vec<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE payment_status = $1 ORDER BY created_at"
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(OrderRow::into_domain).collect()
    }

    async fn list_pending_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE payment_status = 'PENDING' AND created_at < $1 \
             ORDER BY created_at"
        ))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(OrderRow::into_domain).collect()
    }

    async fn list_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE created_at >= $1 AND created_at <= $2 \
             ORDER BY created_at"
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(OrderRow::into_domain).collect()
    }
}

// ============================================================================
// OrderItemStore
// ============================================================================

#[async_trait]
impl OrderItemStore for PgStore {
    async fn find(&self, id: OrderItemId) -> Result<Option<OrderItem>> {
        let row: Option<OrderItemRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_ITEM_COLUMNS} FROM order_items WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        row.map(OrderItemRow::into_domain).transpose()
    }

    async fn insert(&self, item: OrderItem) -> Result<OrderItem> {
        sqlx::query(
            "INSERT INTO order_items \
                 (id, order_id, ticket_type_id, quantity, unit_price_cents, subtotal_cents) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(item.id.as_uuid())
        .bind(item.order_id.as_uuid())
        .bind(item.ticket_type_id.as_uuid())
        .bind(quantity_param(item.quantity)?)
        .bind(money_param(item.unit_price)?)
        .bind(money_param(item.subtotal)?)
        .execute(&self.pool)
        .await?;
        Ok(item)
    }

    async fn update(&self, item: OrderItem) -> Result<OrderItem> {
        let result = sqlx::query(
            "UPDATE order_items SET quantity = $2, subtotal_cents = $3 WHERE id = $1",
        )
        .bind(item.id.as_uuid())
        .bind(quantity_param(item.quantity)?)
        .bind(money_param(item.subtotal)?)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found("Order item", item.id));
        }
        Ok(item)
    }

    async fn delete(&self, id: OrderItemId) -> Result<()> {
        let result = sqlx::query("DELETE FROM order_items WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found("Order item", id));
        }
        Ok(())
    }

    async fn list_for_order(&self, order_id: OrderId) -> Result<Vec<OrderItem>> {
        let rows: Vec<OrderItemRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY id"
        ))
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(OrderItemRow::into_domain).collect()
    }
}

// ============================================================================
// Lookup stores
// ============================================================================

#[async_trait]
impl EventStore for PgStore {
    async fn find(&self, id: EventId) -> Result<Option<Event>> {
        let row: Option<EventRow> = sqlx::query_as(
            "SELECT id, name, venue_name, organizer_id, event_date, status \
             FROM events WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        row.map(EventRow::into_domain).transpose()
    }

    async fn save(&self, event: Event) -> Result<Event> {
        sqlx::query(
            "INSERT INTO events (id, name, venue_name, organizer_id, event_date, status) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (id) DO UPDATE SET \
                 name = EXCLUDED.name, \
                 venue_name = EXCLUDED.venue_name, \
                 organizer_id = EXCLUDED.organizer_id, \
                 event_date = EXCLUDED.event_date, \
                 status = EXCLUDED.status",
        )
        .bind(event.id.as_uuid())
        .bind(&event.name)
        .bind(&event.venue_name)
        .bind(event.organizer_id.as_uuid())
        .bind(event.event_date)
        .bind(event_status_str(event.status))
        .execute(&self.pool)
        .await?;
        Ok(event)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find(&self, id: UserId) -> Result<Option<User>> {
        let row: Option<(Uuid, String, String)> =
            sqlx::query_as("SELECT id, name, email FROM users WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(id, name, email)| User {
            id: UserId::from_uuid(id),
            name,
            email,
        }))
    }

    async fn save(&self, user: User) -> Result<User> {
        sqlx::query(
            "INSERT INTO users (id, name, email) VALUES ($1, $2, $3) \
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, email = EXCLUDED.email",
        )
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .execute(&self.pool)
        .await?;
        Ok(user)
    }
}
