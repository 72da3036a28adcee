//! Order line-item accounting (the cart-style flow).
//!
//! An order accumulates priced line items directly against ticket types,
//! independent of the booking flow. Every item mutation reserves or
//! releases inventory through the inventory service and recomputes the
//! order total as the sum of its items' subtotals.

use crate::error::{Error, Result};
use crate::services::inventory::InventoryService;
use crate::store::{OrderItemStore, OrderStore, TicketTypeStore};
use crate::types::{Money, Order, OrderId, OrderItem, OrderItemId, TicketTypeId};
use std::sync::Arc;
use tracing::{info, warn};

/// Order line-item accounting service.
pub struct OrderItemService {
    order_items: Arc<dyn OrderItemStore>,
    orders: Arc<dyn OrderStore>,
    ticket_types: Arc<dyn TicketTypeStore>,
    inventory: Arc<InventoryService>,
}

impl OrderItemService {
    /// Wires the service with its repositories and the inventory service.
    #[must_use]
    pub fn new(
        order_items: Arc<dyn OrderItemStore>,
        orders: Arc<dyn OrderStore>,
        ticket_types: Arc<dyn TicketTypeStore>,
        inventory: Arc<InventoryService>,
    ) -> Self {
        Self {
            order_items,
            orders,
            ticket_types,
            inventory,
        }
    }

    /// Adds a line item to an order: reserves inventory, snapshots the
    /// unit price, and recomputes the order total.
    ///
    /// # Errors
    ///
    /// `NotFound` if the order or ticket type is absent; `InvalidState` if
    /// the ticket type is inactive; `InvalidArgument` if the quantity is
    /// zero; `Conflict` if fewer tickets remain than requested.
    pub async fn add_item(
        &self,
        order_id: OrderId,
        ticket_type_id: TicketTypeId,
        quantity: u32,
    ) -> Result<OrderItem> {
        let order = self
            .orders
            .find(order_id)
            .await?
            .ok_or_else(|| Error::not_found("Order", order_id))?;
        let ticket_type = self
            .ticket_types
            .find(ticket_type_id)
            .await?
            .ok_or_else(|| Error::not_found("Ticket type", ticket_type_id))?;

        if !ticket_type.is_active {
            return Err(Error::InvalidState("Ticket type is not active".to_string()));
        }
        if quantity == 0 {
            return Err(Error::InvalidArgument(
                "Quantity must be greater than 0".to_string(),
            ));
        }

        let subtotal = Self::subtotal(ticket_type.price, quantity)?;

        self.inventory.reserve(ticket_type_id, quantity).await?;

        let item = OrderItem {
            id: OrderItemId::new(),
            order_id,
            ticket_type_id,
            quantity,
            unit_price: ticket_type.price,
            subtotal,
        };
        let item = match self.order_items.insert(item).await {
            Ok(item) => item,
            Err(err) => {
                self.release_quietly(ticket_type_id, quantity).await;
                return Err(err);
            }
        };

        self.recompute_total(&order).await?;
        info!(
            order_item_id = %item.id,
            order_id = %order_id,
            quantity,
            "order item added"
        );
        Ok(item)
    }

    /// Looks up an order item, failing `NotFound` when absent.
    pub async fn get(&self, id: OrderItemId) -> Result<OrderItem> {
        self.order_items
            .find(id)
            .await?
            .ok_or_else(|| Error::not_found("Order item", id))
    }

    /// All items in an order.
    ///
    /// # Errors
    ///
    /// `NotFound` if the order is absent.
    pub async fn list_for_order(&self, order_id: OrderId) -> Result<Vec<OrderItem>> {
        self.orders
            .find(order_id)
            .await?
            .ok_or_else(|| Error::not_found("Order", order_id))?;
        self.order_items.list_for_order(order_id).await
    }

    /// Changes an item's quantity, reserving or releasing the delta
    /// against inventory, and recomputes subtotal and order total. The
    /// snapshotted unit price is never refreshed.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the new quantity is zero; `NotFound` if the
    /// item is absent; `Conflict` if an increase exceeds the remaining
    /// availability.
    pub async fn update_item(&self, id: OrderItemId, new_quantity: u32) -> Result<OrderItem> {
        if new_quantity == 0 {
            return Err(Error::InvalidArgument(
                "Quantity must be greater than 0".to_string(),
            ));
        }

        let mut item = self.get(id).await?;
        let ticket_type_id = item.ticket_type_id;
        let old_quantity = item.quantity;
        let new_subtotal = Self::subtotal(item.unit_price, new_quantity)?;

        if new_quantity > old_quantity {
            self.inventory
                .reserve(ticket_type_id, new_quantity - old_quantity)
                .await?;
        } else if new_quantity < old_quantity {
            self.inventory
                .release(ticket_type_id, old_quantity - new_quantity)
                .await?;
        }

        item.quantity = new_quantity;
        item.subtotal = new_subtotal;
        let item = match self.order_items.update(item).await {
            Ok(item) => item,
            Err(err) => {
                // Hand back the delta so the counters match the stored item.
                if new_quantity > old_quantity {
                    self.release_quietly(ticket_type_id, new_quantity - old_quantity)
                        .await;
                }
                return Err(err);
            }
        };

        let order = self
            .orders
            .find(item.order_id)
            .await?
            .ok_or_else(|| Error::not_found("Order", item.order_id))?;
        self.recompute_total(&order).await?;
        Ok(item)
    }

    /// Removes an item, releasing its full quantity back to inventory and
    /// recomputing the order total.
    ///
    /// # Errors
    ///
    /// `NotFound` if the item is absent.
    pub async fn delete_item(&self, id: OrderItemId) -> Result<()> {
        let item = self.get(id).await?;

        self.inventory
            .release(item.ticket_type_id, item.quantity)
            .await?;
        self.order_items.delete(id).await?;

        let order = self
            .orders
            .find(item.order_id)
            .await?
            .ok_or_else(|| Error::not_found("Order", item.order_id))?;
        self.recompute_total(&order).await?;
        info!(order_item_id = %id, order_id = %item.order_id, "order item deleted");
        Ok(())
    }

    /// Pure subtotal calculation: `unit_price × quantity`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the quantity is zero or the product overflows.
    pub fn subtotal(unit_price: Money, quantity: u32) -> Result<Money> {
        if quantity == 0 {
            return Err(Error::InvalidArgument(
                "Invalid parameters for subtotal calculation".to_string(),
            ));
        }
        unit_price
            .checked_multiply(quantity)
            .ok_or_else(|| Error::InvalidArgument("Subtotal overflows".to_string()))
    }

    /// Recomputes the order's total as the sum of its items' subtotals.
    async fn recompute_total(&self, order: &Order) -> Result<()> {
        let items = self.order_items.list_for_order(order.id).await?;
        let total = items
            .iter()
            .try_fold(Money::ZERO, |acc, i| acc.checked_add(i.subtotal))
            .ok_or_else(|| Error::Internal("order total overflows".to_string()))?;

        let mut order = order.clone();
        order.total_amount = total;
        self.orders.update(order).await?;
        Ok(())
    }

    async fn release_quietly(&self, ticket_type_id: TicketTypeId, quantity: u32) {
        if let Err(err) = self.inventory.release(ticket_type_id, quantity).await {
            warn!(
                ticket_type_id = %ticket_type_id,
                quantity,
                error = %err,
                "failed to release reservation after item persist failure"
            );
        }
    }
}
