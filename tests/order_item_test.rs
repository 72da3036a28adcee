//! Order line-item accounting tests.
//!
//! Covers the cart-style flow: items reserve inventory on add, move the
//! delta on update, release on delete, and the order total always equals
//! the sum of the items' subtotals.
//!
//! Run with: `cargo test --test order_item_test`

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;

use boxoffice::error::Error;
use boxoffice::services::{NewBooking, OrderItemService};
use boxoffice::types::{Money, Order, TicketType};
use common::TestApp;

/// Seeds an order (via a booking) plus a second ticket type for items.
///
/// The booking uses its own ticket type so the line items exercise a
/// separate counter.
async fn order_fixture(app: &TestApp) -> (Order, TicketType) {
    let user = app.seed_user().await;
    let event = app.seed_event(user.id).await;
    let booking_tickets = app.seed_ticket_type(event.id, 1000, 10).await;
    let item_tickets = app.seed_ticket_type(event.id, 2000, 20).await;

    let booking = app
        .state
        .bookings
        .create(NewBooking {
            user_id: user.id,
            event_id: event.id,
            ticket_type_id: booking_tickets.id,
            quantity: 1,
        })
        .await
        .unwrap();
    let order = app
        .state
        .orders
        .create_from_booking(booking.id, None)
        .await
        .unwrap();
    (order, item_tickets)
}

async fn order_total(app: &TestApp, order: &Order) -> u64 {
    app.state
        .orders
        .get(order.id)
        .await
        .unwrap()
        .total_amount
        .cents()
}

#[tokio::test]
async fn add_item_reserves_and_recomputes_the_total() {
    let app = TestApp::new();
    let (order, tickets) = order_fixture(&app).await;

    let item = app
        .state
        .order_items
        .add_item(order.id, tickets.id, 3)
        .await
        .unwrap();

    // $20.00 unit price snapshotted, subtotal 3 × $20.00
    assert_eq!(item.unit_price.cents(), 2000);
    assert_eq!(item.subtotal.cents(), 6000);
    assert_eq!(app.sold(tickets.id).await, 3);
    assert_eq!(order_total(&app, &order).await, 6000);

    // A second item accumulates into the total
    app.state
        .order_items
        .add_item(order.id, tickets.id, 2)
        .await
        .unwrap();
    assert_eq!(app.sold(tickets.id).await, 5);
    assert_eq!(order_total(&app, &order).await, 10_000);
}

#[tokio::test]
async fn add_item_rejects_inactive_zero_and_overdraw() {
    let app = TestApp::new();
    let (order, tickets) = order_fixture(&app).await;
    let total_before = order_total(&app, &order).await;

    // Zero quantity
    let err = app
        .state
        .order_items
        .add_item(order.id, tickets.id, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));

    // Over capacity: counters and order total stay untouched
    let err = app
        .state
        .order_items
        .add_item(order.id, tickets.id, 21)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
    assert_eq!(app.sold(tickets.id).await, 0);
    assert_eq!(order_total(&app, &order).await, total_before);

    // Inactive ticket type
    app.state.inventory.deactivate(tickets.id).await.unwrap();
    let err = app
        .state
        .order_items
        .add_item(order.id, tickets.id, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
    assert_eq!(app.sold(tickets.id).await, 0);
}

#[tokio::test]
async fn update_item_moves_the_delta_against_inventory() {
    let app = TestApp::new();
    let (order, tickets) = order_fixture(&app).await;
    let item = app
        .state
        .order_items
        .add_item(order.id, tickets.id, 5)
        .await
        .unwrap();

    // Grow: reserves the difference
    let item = app.state.order_items.update_item(item.id, 8).await.unwrap();
    assert_eq!(item.subtotal.cents(), 16_000);
    assert_eq!(app.sold(tickets.id).await, 8);
    assert_eq!(order_total(&app, &order).await, 16_000);

    // Shrink: releases the difference
    let item = app.state.order_items.update_item(item.id, 2).await.unwrap();
    assert_eq!(item.subtotal.cents(), 4000);
    assert_eq!(app.sold(tickets.id).await, 2);
    assert_eq!(order_total(&app, &order).await, 4000);

    // Growing past the remaining capacity conflicts and changes nothing
    let err = app
        .state
        .order_items
        .update_item(item.id, 23)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
    assert_eq!(app.sold(tickets.id).await, 2);
    assert_eq!(order_total(&app, &order).await, 4000);

    // Zero is rejected before anything moves
    let err = app
        .state
        .order_items
        .update_item(item.id, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[tokio::test]
async fn delete_item_releases_everything_and_recomputes() {
    let app = TestApp::new();
    let (order, tickets) = order_fixture(&app).await;
    let kept = app
        .state
        .order_items
        .add_item(order.id, tickets.id, 2)
        .await
        .unwrap();
    let dropped = app
        .state
        .order_items
        .add_item(order.id, tickets.id, 4)
        .await
        .unwrap();
    assert_eq!(app.sold(tickets.id).await, 6);

    app.state.order_items.delete_item(dropped.id).await.unwrap();
    assert_eq!(app.sold(tickets.id).await, 2);
    assert_eq!(order_total(&app, &order).await, kept.subtotal.cents());

    let items = app
        .state
        .order_items
        .list_for_order(order.id)
        .await
        .unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, kept.id);

    // Deleting again is NotFound
    let err = app
        .state
        .order_items
        .delete_item(dropped.id)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn unit_price_is_snapshotted_at_add_time() {
    let app = TestApp::new();
    let (order, tickets) = order_fixture(&app).await;
    let item = app
        .state
        .order_items
        .add_item(order.id, tickets.id, 2)
        .await
        .unwrap();

    // Repricing the ticket type later never touches the stored item
    app.state
        .inventory
        .update_ticket_type(
            tickets.id,
            boxoffice::services::TicketTypeUpdate {
                price: Some(Money::from_cents(9999)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let item = app.state.order_items.update_item(item.id, 3).await.unwrap();
    assert_eq!(item.unit_price.cents(), 2000);
    assert_eq!(item.subtotal.cents(), 6000);
}

#[test]
fn subtotal_is_a_checked_pure_function() {
    let subtotal = OrderItemService::subtotal(Money::from_cents(2500), 4).unwrap();
    assert_eq!(subtotal.cents(), 10_000);

    let err = OrderItemService::subtotal(Money::from_cents(2500), 0).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));

    let err = OrderItemService::subtotal(Money::from_cents(u64::MAX), 2).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}
