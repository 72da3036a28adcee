//! Inventory accounting edge case tests.
//!
//! Verifies the sold-within-available invariant at the boundaries, the
//! capacity-update guard, the active gate, and ticket type CRUD rules.
//!
//! Run with: `cargo test --test inventory_test`

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use boxoffice::error::Error;
use boxoffice::services::{NewBooking, NewTicketType, TicketTypeUpdate};
use boxoffice::types::{EventId, Money};
use common::TestApp;

#[tokio::test]
async fn reserve_and_release_hold_the_invariant_at_the_boundary() {
    let app = TestApp::new();
    let user = app.seed_user().await;
    let event = app.seed_event(user.id).await;
    let tickets = app.seed_ticket_type(event.id, 1000, 4).await;

    // Fill to the ceiling in two steps
    app.state.inventory.reserve(tickets.id, 3).await.unwrap();
    let full = app.state.inventory.reserve(tickets.id, 1).await.unwrap();
    assert_eq!(full.quantity_sold, full.quantity_available);
    assert_eq!(app.state.inventory.remaining(tickets.id).await.unwrap(), 0);

    // sold == available rejects further reserves
    let err = app.state.inventory.reserve(tickets.id, 1).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));

    // Releasing brings the counter back down, never below zero
    app.state.inventory.release(tickets.id, 4).await.unwrap();
    assert_eq!(app.sold(tickets.id).await, 0);
    let err = app.state.inventory.release(tickets.id, 1).await.unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
}

#[tokio::test]
async fn reserve_round_trip_restores_the_prior_count() {
    let app = TestApp::new();
    let user = app.seed_user().await;
    let event = app.seed_event(user.id).await;
    let tickets = app.seed_ticket_type(event.id, 1000, 50).await;

    app.state.inventory.reserve(tickets.id, 12).await.unwrap();
    let before = app.sold(tickets.id).await;
    app.state.inventory.reserve(tickets.id, 7).await.unwrap();
    app.state.inventory.release(tickets.id, 7).await.unwrap();
    assert_eq!(app.sold(tickets.id).await, before);
}

#[tokio::test]
async fn availability_check_respects_the_active_gate() {
    let app = TestApp::new();
    let user = app.seed_user().await;
    let event = app.seed_event(user.id).await;
    let tickets = app.seed_ticket_type(event.id, 1000, 10).await;

    assert!(app
        .state
        .inventory
        .check_availability(tickets.id, 10)
        .await
        .unwrap());
    assert!(!app
        .state
        .inventory
        .check_availability(tickets.id, 11)
        .await
        .unwrap());

    app.state.inventory.deactivate(tickets.id).await.unwrap();
    assert!(!app
        .state
        .inventory
        .check_availability(tickets.id, 1)
        .await
        .unwrap());
    let err = app.state.inventory.reserve(tickets.id, 1).await.unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));

    // Reactivating does not disturb existing counters
    let reactivated = app.state.inventory.activate(tickets.id).await.unwrap();
    assert_eq!(reactivated.quantity_sold, 0);
    assert!(app
        .state
        .inventory
        .check_availability(tickets.id, 1)
        .await
        .unwrap());
}

#[tokio::test]
async fn capacity_can_never_drop_below_sold() {
    let app = TestApp::new();
    let user = app.seed_user().await;
    let event = app.seed_event(user.id).await;
    let tickets = app.seed_ticket_type(event.id, 1000, 100).await;
    app.state.inventory.reserve(tickets.id, 10).await.unwrap();

    let err = app
        .state
        .inventory
        .set_available_quantity(tickets.id, 5)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));

    // Shrinking down to exactly the sold count is allowed
    let updated = app
        .state
        .inventory
        .set_available_quantity(tickets.id, 10)
        .await
        .unwrap();
    assert_eq!(updated.quantity_available, 10);
    assert_eq!(updated.remaining(), 0);
}

#[tokio::test]
async fn create_ticket_type_validates_event_and_capacity() {
    let app = TestApp::new();
    let user = app.seed_user().await;
    let event = app.seed_event(user.id).await;

    let err = app
        .state
        .inventory
        .create_ticket_type(NewTicketType {
            event_id: EventId::new(),
            name: "VIP".to_string(),
            price: Money::from_cents(10_000),
            quantity_available: 10,
        })
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = app
        .state
        .inventory
        .create_ticket_type(NewTicketType {
            event_id: event.id,
            name: "VIP".to_string(),
            price: Money::from_cents(10_000),
            quantity_available: 0,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));

    let created = app
        .state
        .inventory
        .create_ticket_type(NewTicketType {
            event_id: event.id,
            name: "VIP".to_string(),
            price: Money::from_cents(10_000),
            quantity_available: 10,
        })
        .await
        .unwrap();
    assert_eq!(created.quantity_sold, 0);
    assert!(created.is_active);
}

#[tokio::test]
async fn update_ticket_type_guards_the_capacity_floor() {
    let app = TestApp::new();
    let user = app.seed_user().await;
    let event = app.seed_event(user.id).await;
    let tickets = app.seed_ticket_type(event.id, 1000, 20).await;
    app.state.inventory.reserve(tickets.id, 8).await.unwrap();

    let err = app
        .state
        .inventory
        .update_ticket_type(
            tickets.id,
            TicketTypeUpdate {
                quantity_available: Some(7),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));

    let updated = app
        .state
        .inventory
        .update_ticket_type(
            tickets.id,
            TicketTypeUpdate {
                name: Some("Balcony".to_string()),
                price: Some(Money::from_cents(1500)),
                quantity_available: Some(30),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Balcony");
    assert_eq!(updated.price.cents(), 1500);
    assert_eq!(updated.quantity_available, 30);
    assert_eq!(updated.quantity_sold, 8);
}

#[tokio::test]
async fn delete_is_blocked_by_sales_and_bookings() {
    let app = TestApp::new();
    let user = app.seed_user().await;
    let event = app.seed_event(user.id).await;

    // Sold tickets block deletion
    let sold_out = app.seed_ticket_type(event.id, 1000, 10).await;
    app.state.inventory.reserve(sold_out.id, 1).await.unwrap();
    let err = app
        .state
        .inventory
        .delete_ticket_type(sold_out.id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));

    // A cancelled booking still blocks deletion (history is kept)
    let booked = app.seed_ticket_type(event.id, 1000, 10).await;
    let booking = app
        .state
        .bookings
        .create(NewBooking {
            user_id: user.id,
            event_id: event.id,
            ticket_type_id: booked.id,
            quantity: 1,
        })
        .await
        .unwrap();
    app.state.bookings.cancel(booking.id).await.unwrap();
    let err = app
        .state
        .inventory
        .delete_ticket_type(booked.id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));

    // Untouched ticket types can be deleted
    let fresh = app.seed_ticket_type(event.id, 1000, 10).await;
    app.state.inventory.delete_ticket_type(fresh.id).await.unwrap();
    let err = app.state.inventory.get(fresh.id).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn concurrent_reserves_cannot_oversell() {
    let app = TestApp::new();
    let user = app.seed_user().await;
    let event = app.seed_event(user.id).await;
    let tickets = app.seed_ticket_type(event.id, 1000, 10).await;

    // 20 tasks race for 1 ticket each; exactly 10 can win.
    let mut handles = Vec::new();
    for _ in 0..20 {
        let inventory = app.state.inventory.clone();
        let id = tickets.id;
        handles.push(tokio::spawn(async move { inventory.reserve(id, 1).await }));
    }

    let mut won = 0;
    let mut lost = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => won += 1,
            Err(Error::Conflict(_)) => lost += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(won, 10);
    assert_eq!(lost, 10);
    assert_eq!(app.sold(tickets.id).await, 10);
}
