//! Order and payment lifecycle.
//!
//! State machine over `payment_status`: PENDING → PROCESSING → COMPLETED,
//! any non-COMPLETED state → FAILED, COMPLETED → REFUNDED, FAILED → PENDING
//! via retry. Completing a payment confirms the underlying booking;
//! refunding cancels it (which releases the reserved tickets). Creating an
//! order never changes inventory.

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::reference::{self, MAX_ATTEMPTS, ORDER_PREFIX};
use crate::services::booking::BookingService;
use crate::store::{BookingStore, OrderStore, UserStore};
use crate::types::{
    Booking, BookingId, BookingStatus, Money, Order, OrderId, PaymentMethod, PaymentStatus, UserId,
};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{info, warn};

/// Order/payment lifecycle service.
pub struct OrderService {
    orders: Arc<dyn OrderStore>,
    bookings: Arc<dyn BookingStore>,
    users: Arc<dyn UserStore>,
    booking_service: Arc<BookingService>,
    clock: Arc<dyn Clock>,
}

impl OrderService {
    /// Wires the service with its repositories and the booking lifecycle.
    #[must_use]
    pub fn new(
        orders: Arc<dyn OrderStore>,
        bookings: Arc<dyn BookingStore>,
        users: Arc<dyn UserStore>,
        booking_service: Arc<BookingService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            orders,
            bookings,
            users,
            booking_service,
            clock,
        }
    }

    /// Creates an order from a pending booking. The total amount is copied
    /// from the booking; the booking stays PENDING until payment completes.
    ///
    /// # Errors
    ///
    /// `NotFound` if the booking is absent; `Conflict` if the booking
    /// already has an order or is not PENDING; `InvalidState` if the
    /// booking is no longer valid.
    pub async fn create_from_booking(
        &self,
        booking_id: BookingId,
        payment_method: Option<PaymentMethod>,
    ) -> Result<Order> {
        let booking = self
            .bookings
            .find(booking_id)
            .await?
            .ok_or_else(|| Error::not_found("Booking", booking_id))?;

        if self.orders.find_by_booking(booking_id).await?.is_some() {
            return Err(Error::Conflict(
                "Order already exists for this booking".to_string(),
            ));
        }
        if booking.status != BookingStatus::Pending {
            return Err(Error::Conflict(
                "Can only create an order for pending bookings".to_string(),
            ));
        }
        if !self.booking_service.validate(booking_id).await? {
            return Err(Error::InvalidState(
                "Booking is no longer valid".to_string(),
            ));
        }

        let order = self.persist_new(&booking, payment_method).await?;
        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            booking_id = %booking_id,
            "order created"
        );
        Ok(order)
    }

    /// Inserts the order under a freshly generated number, retrying a
    /// bounded number of times on collision.
    async fn persist_new(
        &self,
        booking: &Booking,
        payment_method: Option<PaymentMethod>,
    ) -> Result<Order> {
        let now = self.clock.now();
        for _ in 0..MAX_ATTEMPTS {
            let candidate = reference::generate(ORDER_PREFIX, now);
            if self.orders.find_by_number(&candidate).await?.is_some() {
                continue;
            }
            let order = Order {
                id: OrderId::new(),
                booking_id: booking.id,
                user_id: booking.user_id,
                order_number: candidate,
                total_amount: booking.total_amount,
                payment_status: PaymentStatus::Pending,
                payment_method,
                transaction_id: None,
                payment_date: None,
                created_at: now,
            };
            match self.orders.insert(order).await {
                Ok(order) => return Ok(order),
                // Lost a race on the order number; generate a new one.
                Err(Error::Conflict(msg)) if msg.contains("Order number") => continue,
                Err(err) => return Err(err),
            }
        }
        Err(Error::Internal(
            "could not allocate a unique order number".to_string(),
        ))
    }

    /// Looks up an order, failing `NotFound` when absent.
    pub async fn get(&self, id: OrderId) -> Result<Order> {
        self.orders
            .find(id)
            .await?
            .ok_or_else(|| Error::not_found("Order", id))
    }

    /// Looks up an order by its unique number.
    pub async fn get_by_number(&self, order_number: &str) -> Result<Order> {
        self.orders
            .find_by_number(order_number)
            .await?
            .ok_or_else(|| Error::NotFound {
                resource: "Order",
                id: order_number.to_string(),
            })
    }

    /// Sets the payment status directly from its wire form (parsed
    /// case-insensitively). On COMPLETED, stamps the payment date and
    /// confirms the booking.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an unknown status; `InvalidState` from the
    /// booking confirmation when completing twice.
    pub async fn update_payment_status(&self, id: OrderId, status: &str) -> Result<Order> {
        let mut order = self.get(id).await?;

        let Some(target) = PaymentStatus::parse(status) else {
            return Err(Error::InvalidArgument(format!(
                "Invalid payment status. Valid statuses are: {}",
                PaymentStatus::VALID.join(", ")
            )));
        };

        order.payment_status = target;
        if target == PaymentStatus::Completed {
            order.payment_date = Some(self.clock.now());
            self.booking_service.confirm(order.booking_id).await?;
        }

        self.orders.update(order).await
    }

    /// Hands a pending order to a payment method and stores the
    /// transaction id.
    ///
    /// # Errors
    ///
    /// `InvalidState` unless the order is PENDING; `InvalidArgument` for a
    /// method outside the allow-list.
    pub async fn process_payment(
        &self,
        id: OrderId,
        payment_method: &str,
        transaction_id: String,
    ) -> Result<Order> {
        let mut order = self.get(id).await?;

        if order.payment_status != PaymentStatus::Pending {
            return Err(Error::InvalidState(
                "Can only process payment for pending orders".to_string(),
            ));
        }
        let Some(method) = PaymentMethod::parse(payment_method) else {
            return Err(Error::InvalidArgument(format!(
                "Invalid payment method. Valid methods are: {}",
                PaymentMethod::VALID.join(", ")
            )));
        };

        order.payment_method = Some(method);
        order.transaction_id = Some(transaction_id);
        order.payment_status = PaymentStatus::Processing;
        self.orders.update(order).await
    }

    /// Records a successful payment: COMPLETED, payment date stamped, and
    /// the booking confirmed.
    ///
    /// # Errors
    ///
    /// `InvalidState` unless the order is PROCESSING or PENDING.
    pub async fn confirm_payment(&self, id: OrderId, transaction_id: String) -> Result<Order> {
        let mut order = self.get(id).await?;

        if order.payment_status != PaymentStatus::Processing
            && order.payment_status != PaymentStatus::Pending
        {
            return Err(Error::InvalidState(
                "Can only confirm payment for processing or pending orders".to_string(),
            ));
        }

        order.transaction_id = Some(transaction_id);
        order.payment_status = PaymentStatus::Completed;
        order.payment_date = Some(self.clock.now());

        // Confirm the booking first; a failed confirmation leaves the
        // order untouched in the store.
        self.booking_service.confirm(order.booking_id).await?;

        let order = self.orders.update(order).await?;
        info!(order_id = %id, "payment completed");
        Ok(order)
    }

    /// Marks a payment as failed.
    ///
    /// # Errors
    ///
    /// `InvalidState` if the payment already completed.
    pub async fn mark_failed(&self, id: OrderId, reason: &str) -> Result<Order> {
        let mut order = self.get(id).await?;

        if order.payment_status == PaymentStatus::Completed {
            return Err(Error::InvalidState(
                "Cannot mark completed payment as failed".to_string(),
            ));
        }

        order.payment_status = PaymentStatus::Failed;
        let order = self.orders.update(order).await?;
        info!(order_id = %id, reason, "payment failed");
        Ok(order)
    }

    /// Refunds a completed payment and cancels the booking, releasing the
    /// originally reserved tickets.
    ///
    /// # Errors
    ///
    /// `InvalidState` unless the payment is COMPLETED (a REFUNDED order
    /// cannot be refunded again).
    pub async fn refund(&self, id: OrderId, reason: &str) -> Result<Order> {
        let mut order = self.get(id).await?;

        if order.payment_status != PaymentStatus::Completed {
            return Err(Error::InvalidState(
                "Can only refund completed payments".to_string(),
            ));
        }

        self.booking_service.cancel(order.booking_id).await?;

        order.payment_status = PaymentStatus::Refunded;
        let order = self.orders.update(order).await?;
        info!(order_id = %id, reason, "order refunded");
        Ok(order)
    }

    /// Resets a failed payment to PENDING for another attempt.
    ///
    /// # Errors
    ///
    /// `InvalidState` unless the payment is FAILED, or if the booking is
    /// no longer valid.
    pub async fn retry_payment(&self, id: OrderId) -> Result<Order> {
        let mut order = self.get(id).await?;

        if order.payment_status != PaymentStatus::Failed {
            return Err(Error::InvalidState(
                "Can only retry failed payments".to_string(),
            ));
        }
        if !self.booking_service.validate(order.booking_id).await? {
            return Err(Error::InvalidState(
                "Booking is no longer valid".to_string(),
            ));
        }

        order.payment_status = PaymentStatus::Pending;
        order.transaction_id = None;
        self.orders.update(order).await
    }

    /// Sweeps PENDING orders older than `expiry_minutes`: each is marked
    /// FAILED and its booking cancelled. Individual failures are logged
    /// and skipped; the sweep never aborts. Returns how many orders were
    /// expired.
    pub async fn cancel_expired(&self, expiry_minutes: i64) -> Result<u32> {
        let cutoff = self.clock.now() - Duration::minutes(expiry_minutes);
        let expired = self.orders.list_pending_before(cutoff).await?;

        let mut swept = 0;
        for order in expired {
            match self.expire_one(&order).await {
                Ok(()) => swept += 1,
                Err(err) => {
                    warn!(
                        order_number = %order.order_number,
                        error = %err,
                        "failed to cancel expired order"
                    );
                }
            }
        }
        if swept > 0 {
            info!(swept, expiry_minutes, "expired pending orders");
        }
        Ok(swept)
    }

    async fn expire_one(&self, order: &Order) -> Result<()> {
        let mut order = order.clone();
        order.payment_status = PaymentStatus::Failed;
        self.orders.update(order.clone()).await?;
        self.booking_service.cancel(order.booking_id).await?;
        Ok(())
    }

    /// Orders placed by a user, optionally filtered by payment status.
    ///
    /// # Errors
    ///
    /// `NotFound` if the user is absent.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
        status: Option<PaymentStatus>,
    ) -> Result<Vec<Order>> {
        self.users
            .find(user_id)
            .await?
            .ok_or_else(|| Error::not_found("User", user_id))?;
        self.orders.list_for_user(user_id, status).await
    }

    /// A user's order history, newest first.
    ///
    /// # Errors
    ///
    /// `NotFound` if the user is absent.
    pub async fn order_history(&self, user_id: UserId) -> Result<Vec<Order>> {
        let mut orders = self.list_for_user(user_id, None).await?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// All orders in the given payment status.
    pub async fn list_by_status(&self, status: PaymentStatus) -> Result<Vec<Order>> {
        self.orders.list_by_status(status).await
    }

    /// All PENDING orders (cleanup/expiry tooling).
    pub async fn pending_orders(&self) -> Result<Vec<Order>> {
        self.orders.list_by_status(PaymentStatus::Pending).await
    }

    /// Orders created in the given closed interval.
    pub async fn orders_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Order>> {
        self.orders.list_created_between(start, end).await
    }

    /// Total revenue from a user's COMPLETED orders.
    ///
    /// # Errors
    ///
    /// `NotFound` if the user is absent.
    pub async fn user_revenue(&self, user_id: UserId) -> Result<Money> {
        let completed = self
            .list_for_user(user_id, Some(PaymentStatus::Completed))
            .await?;
        completed
            .iter()
            .try_fold(Money::ZERO, |acc, o| acc.checked_add(o.total_amount))
            .ok_or_else(|| Error::Internal("revenue sum overflows".to_string()))
    }
}
