//! Order/payment lifecycle tests.
//!
//! Covers order creation from bookings, the payment state machine and its
//! cascade into the booking lifecycle, and the expiry sweep.
//!
//! Run with: `cargo test --test order_payment_test`

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;

use boxoffice::error::Error;
use boxoffice::services::NewBooking;
use boxoffice::Clock;
use boxoffice::types::{Booking, BookingStatus, PaymentMethod, PaymentStatus, TicketType};
use chrono::Duration;
use common::TestApp;

/// Seeds user/event/ticket type and creates one pending booking.
async fn booking_fixture(app: &TestApp, price_cents: u64, capacity: u32, quantity: u32) -> (Booking, TicketType) {
    let user = app.seed_user().await;
    let event = app.seed_event(user.id).await;
    let ticket_type = app.seed_ticket_type(event.id, price_cents, capacity).await;
    let booking = app
        .state
        .bookings
        .create(NewBooking {
            user_id: user.id,
            event_id: event.id,
            ticket_type_id: ticket_type.id,
            quantity,
        })
        .await
        .unwrap();
    (booking, ticket_type)
}

#[tokio::test]
async fn full_purchase_and_refund_scenario() {
    let app = TestApp::new();
    // TicketType: 100 available, none sold, active, $50.00
    let (booking, ticket_type) = booking_fixture(&app, 5000, 100, 10).await;

    // Book 10 → PENDING, sold = 10, total = $500.00
    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(app.sold(ticket_type.id).await, 10);
    assert_eq!(booking.total_amount.cents(), 50_000);

    // Create order → PENDING, total copied, no inventory change
    let order = app
        .state
        .orders
        .create_from_booking(booking.id, None)
        .await
        .unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(order.total_amount.cents(), 50_000);
    assert!(order.order_number.starts_with("ORD-20250601-"));
    assert_eq!(app.sold(ticket_type.id).await, 10);

    // Confirm payment → order COMPLETED with payment date, booking CONFIRMED
    let order = app
        .state
        .orders
        .confirm_payment(order.id, "txn-1".to_string())
        .await
        .unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Completed);
    assert_eq!(order.payment_date, Some(app.clock.now()));
    let booking = app.state.bookings.get(booking.id).await.unwrap();
    assert_eq!(booking.status, BookingStatus::Confirmed);

    // Refund → order REFUNDED, booking CANCELLED, inventory restored
    let order = app
        .state
        .orders
        .refund(order.id, "customer request")
        .await
        .unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Refunded);
    let booking = app.state.bookings.get(booking.id).await.unwrap();
    assert_eq!(booking.status, BookingStatus::Cancelled);
    assert_eq!(app.sold(ticket_type.id).await, 0);
}

#[tokio::test]
async fn a_booking_never_gets_a_second_order() {
    let app = TestApp::new();
    let (booking, _) = booking_fixture(&app, 5000, 100, 1).await;

    app.state
        .orders
        .create_from_booking(booking.id, None)
        .await
        .unwrap();
    let err = app
        .state
        .orders
        .create_from_booking(booking.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn order_creation_requires_a_pending_booking() {
    let app = TestApp::new();
    let (booking, _) = booking_fixture(&app, 5000, 100, 1).await;

    app.state.bookings.confirm(booking.id).await.unwrap();
    let err = app
        .state
        .orders
        .create_from_booking(booking.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn order_creation_rejects_an_invalid_booking() {
    let app = TestApp::new();
    let (booking, ticket_type) = booking_fixture(&app, 5000, 100, 1).await;

    app.state.inventory.deactivate(ticket_type.id).await.unwrap();
    let err = app
        .state
        .orders
        .create_from_booking(booking.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
}

#[tokio::test]
async fn process_then_confirm_flow() {
    let app = TestApp::new();
    let (booking, _) = booking_fixture(&app, 5000, 100, 2).await;
    let order = app
        .state
        .orders
        .create_from_booking(booking.id, None)
        .await
        .unwrap();

    // Unknown method is rejected against the allow-list
    let err = app
        .state
        .orders
        .process_payment(order.id, "CASH", "txn-9".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));

    let order = app
        .state
        .orders
        .process_payment(order.id, "upi", "txn-9".to_string())
        .await
        .unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Processing);
    assert_eq!(order.payment_method, Some(PaymentMethod::Upi));
    assert_eq!(order.transaction_id.as_deref(), Some("txn-9"));

    // Processing orders cannot be processed again
    let err = app
        .state
        .orders
        .process_payment(order.id, "UPI", "txn-10".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));

    let order = app
        .state
        .orders
        .confirm_payment(order.id, "txn-9".to_string())
        .await
        .unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Completed);
}

#[tokio::test]
async fn confirm_payment_confirms_the_booking_exactly_once() {
    let app = TestApp::new();
    let (booking, _) = booking_fixture(&app, 5000, 100, 1).await;
    let order = app
        .state
        .orders
        .create_from_booking(booking.id, None)
        .await
        .unwrap();

    app.state
        .orders
        .confirm_payment(order.id, "txn-1".to_string())
        .await
        .unwrap();

    // A second confirmation is not an allowed edge
    let err = app
        .state
        .orders
        .confirm_payment(order.id, "txn-2".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
    let booking = app.state.bookings.get(booking.id).await.unwrap();
    assert_eq!(booking.status, BookingStatus::Confirmed);
}

#[tokio::test]
async fn update_payment_status_validates_and_cascades() {
    let app = TestApp::new();
    let (booking, _) = booking_fixture(&app, 5000, 100, 1).await;
    let order = app
        .state
        .orders
        .create_from_booking(booking.id, None)
        .await
        .unwrap();

    let err = app
        .state
        .orders
        .update_payment_status(order.id, "PAID")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));

    // Case-insensitive; COMPLETED stamps the date and confirms the booking
    let order = app
        .state
        .orders
        .update_payment_status(order.id, "completed")
        .await
        .unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Completed);
    assert!(order.payment_date.is_some());
    let booking = app.state.bookings.get(booking.id).await.unwrap();
    assert_eq!(booking.status, BookingStatus::Confirmed);
}

#[tokio::test]
async fn failed_payments_can_be_retried() {
    let app = TestApp::new();
    let (booking, _) = booking_fixture(&app, 5000, 100, 1).await;
    let order = app
        .state
        .orders
        .create_from_booking(booking.id, None)
        .await
        .unwrap();

    let order = app
        .state
        .orders
        .process_payment(order.id, "CREDIT_CARD", "txn-1".to_string())
        .await
        .unwrap();
    let order = app
        .state
        .orders
        .mark_failed(order.id, "card declined")
        .await
        .unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Failed);

    // Retry resets to PENDING and clears the transaction id
    let order = app.state.orders.retry_payment(order.id).await.unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(order.transaction_id, None);

    // Only failed payments can be retried
    let err = app.state.orders.retry_payment(order.id).await.unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
}

#[tokio::test]
async fn completed_payments_cannot_be_marked_failed() {
    let app = TestApp::new();
    let (booking, _) = booking_fixture(&app, 5000, 100, 1).await;
    let order = app
        .state
        .orders
        .create_from_booking(booking.id, None)
        .await
        .unwrap();
    app.state
        .orders
        .confirm_payment(order.id, "txn-1".to_string())
        .await
        .unwrap();

    let err = app
        .state
        .orders
        .mark_failed(order.id, "too late")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
}

#[tokio::test]
async fn refund_requires_a_completed_payment() {
    let app = TestApp::new();
    let (booking, _) = booking_fixture(&app, 5000, 100, 1).await;
    let order = app
        .state
        .orders
        .create_from_booking(booking.id, None)
        .await
        .unwrap();

    let err = app
        .state
        .orders
        .refund(order.id, "not yet paid")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));

    app.state
        .orders
        .confirm_payment(order.id, "txn-1".to_string())
        .await
        .unwrap();
    app.state.orders.refund(order.id, "ok").await.unwrap();

    // REFUNDED is terminal
    let err = app.state.orders.refund(order.id, "again").await.unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
}

#[tokio::test]
async fn expiry_sweep_only_touches_old_pending_orders() {
    let app = TestApp::new();
    let user = app.seed_user().await;
    let event = app.seed_event(user.id).await;
    let ticket_type = app.seed_ticket_type(event.id, 5000, 100).await;
    let new_booking = NewBooking {
        user_id: user.id,
        event_id: event.id,
        ticket_type_id: ticket_type.id,
        quantity: 2,
    };

    // One order created now (will be 40 minutes old at sweep time)
    let old_booking = app.state.bookings.create(new_booking).await.unwrap();
    let old_order = app
        .state
        .orders
        .create_from_booking(old_booking.id, None)
        .await
        .unwrap();

    // A second order created 30 minutes later (10 minutes old at sweep time)
    app.clock.advance(Duration::minutes(30));
    let fresh_booking = app.state.bookings.create(new_booking).await.unwrap();
    let fresh_order = app
        .state
        .orders
        .create_from_booking(fresh_booking.id, None)
        .await
        .unwrap();

    app.clock.advance(Duration::minutes(10));
    let expired = app.state.orders.cancel_expired(30).await.unwrap();
    assert_eq!(expired, 1);

    // The 40-minute-old order failed and its booking was cancelled
    let old_order = app.state.orders.get(old_order.id).await.unwrap();
    assert_eq!(old_order.payment_status, PaymentStatus::Failed);
    let old_booking = app.state.bookings.get(old_booking.id).await.unwrap();
    assert_eq!(old_booking.status, BookingStatus::Cancelled);

    // The 10-minute-old order is untouched
    let fresh_order = app.state.orders.get(fresh_order.id).await.unwrap();
    assert_eq!(fresh_order.payment_status, PaymentStatus::Pending);
    let fresh_booking = app.state.bookings.get(fresh_booking.id).await.unwrap();
    assert_eq!(fresh_booking.status, BookingStatus::Pending);

    // Only the expired booking's tickets went back
    assert_eq!(app.sold(ticket_type.id).await, 2);
}

#[tokio::test]
async fn expiry_sweep_survives_a_poisoned_order() {
    let app = TestApp::new();
    let user = app.seed_user().await;
    let event = app.seed_event(user.id).await;
    let ticket_type = app.seed_ticket_type(event.id, 5000, 100).await;
    let new_booking = NewBooking {
        user_id: user.id,
        event_id: event.id,
        ticket_type_id: ticket_type.id,
        quantity: 1,
    };

    let first_booking = app.state.bookings.create(new_booking).await.unwrap();
    app.state
        .orders
        .create_from_booking(first_booking.id, None)
        .await
        .unwrap();
    let second_booking = app.state.bookings.create(new_booking).await.unwrap();
    app.state
        .orders
        .create_from_booking(second_booking.id, None)
        .await
        .unwrap();

    // Cancel the first booking out-of-band: its order's sweep step will
    // fail on the already-cancelled booking, but the sweep must go on.
    app.state.bookings.cancel(first_booking.id).await.unwrap();

    app.clock.advance(Duration::minutes(40));
    let expired = app.state.orders.cancel_expired(30).await.unwrap();
    assert_eq!(expired, 1);

    let second_booking = app.state.bookings.get(second_booking.id).await.unwrap();
    assert_eq!(second_booking.status, BookingStatus::Cancelled);
}

#[tokio::test]
async fn history_and_revenue_queries() {
    let app = TestApp::new();
    let user = app.seed_user().await;
    let event = app.seed_event(user.id).await;
    let ticket_type = app.seed_ticket_type(event.id, 2500, 100).await;
    let new_booking = NewBooking {
        user_id: user.id,
        event_id: event.id,
        ticket_type_id: ticket_type.id,
        quantity: 2,
    };

    let first_booking = app.state.bookings.create(new_booking).await.unwrap();
    let first = app
        .state
        .orders
        .create_from_booking(first_booking.id, None)
        .await
        .unwrap();
    app.clock.advance(Duration::minutes(5));
    let second_booking = app.state.bookings.create(new_booking).await.unwrap();
    let second = app
        .state
        .orders
        .create_from_booking(second_booking.id, None)
        .await
        .unwrap();

    // History is newest first
    let history = app.state.orders.order_history(user.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, second.id);
    assert_eq!(history[1].id, first.id);

    // Revenue counts only completed payments: 2 × $25.00
    app.state
        .orders
        .confirm_payment(first.id, "txn-1".to_string())
        .await
        .unwrap();
    let revenue = app.state.orders.user_revenue(user.id).await.unwrap();
    assert_eq!(revenue.cents(), 5_000);

    // Lookup by number round-trips
    let by_number = app
        .state
        .orders
        .get_by_number(&second.order_number)
        .await
        .unwrap();
    assert_eq!(by_number.id, second.id);
}
