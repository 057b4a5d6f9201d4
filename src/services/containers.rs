//! Container lifecycle: creation, loading, sealing and transit.
//!
//! Every mutation runs in its own transaction. The `*_in` helpers take any
//! [`ConnectionTrait`] so the loading optimizer can compose them inside a
//! larger transaction.

use metrics::counter;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::common::{round2, round4};
use crate::context::OperationContext;
use crate::db::transaction_scope;
use crate::entities::shipment_container::{self, ContainerStatus};
use crate::entities::{container_type, shipment, shipment_container_item, shipment_item};
use crate::errors::ServiceError;
use crate::services::capacity::{
    self, BalanceReport, CargoLine, FitReport, OptimizationSuggestion, SafetyReport,
};
use crate::services::shipments::{load_item, load_shipment};

/// Snapshot of one container's load for reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerSummary {
    pub container_id: Uuid,
    pub container_number: String,
    pub container_type: String,
    pub status: ContainerStatus,
    pub item_count: usize,
    pub total_quantity: i64,
    pub current_weight: f64,
    pub current_volume: f64,
    pub max_weight: f64,
    pub max_volume: f64,
    pub weight_utilization: f64,
    pub volume_utilization: f64,
    pub remaining_weight: f64,
    pub remaining_volume: f64,
    pub seal_number: Option<String>,
    pub is_sealed: bool,
}

pub(crate) async fn load_container<C: ConnectionTrait>(
    db: &C,
    container_id: Uuid,
) -> Result<shipment_container::Model, ServiceError> {
    shipment_container::Entity::find_by_id(container_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Container {} not found", container_id)))
}

pub(crate) async fn load_container_type<C: ConnectionTrait>(
    db: &C,
    container_type_id: Uuid,
) -> Result<container_type::Model, ServiceError> {
    container_type::Entity::find_by_id(container_type_id)
        .one(db)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("Container type {} not found", container_type_id))
        })
}

pub(crate) async fn container_items_in<C: ConnectionTrait>(
    db: &C,
    container_id: Uuid,
) -> Result<Vec<shipment_container_item::Model>, ServiceError> {
    Ok(shipment_container_item::Entity::find()
        .filter(shipment_container_item::Column::ShipmentContainerId.eq(container_id))
        .order_by_asc(shipment_container_item::Column::CreatedAt)
        .all(db)
        .await?)
}

/// Containers of a shipment in creation order.
pub(crate) async fn shipment_containers_in<C: ConnectionTrait>(
    db: &C,
    shipment_id: Uuid,
) -> Result<Vec<shipment_container::Model>, ServiceError> {
    let mut containers = shipment_container::Entity::find()
        .filter(shipment_container::Column::ShipmentId.eq(shipment_id))
        .order_by_asc(shipment_container::Column::CreatedAt)
        .order_by_asc(shipment_container::Column::Id)
        .all(db)
        .await?;
    sort_in_creation_order(&mut containers);
    Ok(containers)
}

/// Creation time first, then the numeric container sequence. Containers made
/// in one transaction share a timestamp.
fn sort_in_creation_order(containers: &mut [shipment_container::Model]) {
    containers.sort_by_key(|c| (c.created_at, container_sequence(&c.container_number)));
}

/// `SHP-0001-CNT001`, `SHP-0001-CNT002`, ...
pub fn container_number(shipment_number: &str, sequence: u64) -> String {
    format!("{}-CNT{:03}", shipment_number, sequence)
}

/// Sequence part of a number built by [`container_number`].
pub fn container_sequence(number: &str) -> Option<u64> {
    number.rsplit_once("-CNT")?.1.parse().ok()
}

/// Insert an empty draft container, snapshotting the type's limits.
pub(crate) async fn create_container_in<C: ConnectionTrait>(
    db: &C,
    shipment: &shipment::Model,
    container_type: &container_type::Model,
    ctx: &OperationContext,
) -> Result<shipment_container::Model, ServiceError> {
    let existing = shipment_container::Entity::find()
        .filter(shipment_container::Column::ShipmentId.eq(shipment.id))
        .count(db)
        .await?;

    let container = shipment_container::ActiveModel {
        shipment_id: Set(shipment.id),
        container_type_id: Set(container_type.id),
        container_number: Set(container_number(&shipment.shipment_number, existing + 1)),
        max_weight: Set(container_type.max_weight),
        max_volume: Set(container_type.max_volume()),
        current_weight: Set(0.0),
        current_volume: Set(0.0),
        status: Set(ContainerStatus::Draft),
        seal_number: Set(None),
        sealed_at: Set(None),
        sealed_by: Set(None),
        created_by: Set(ctx.actor_id),
        created_at: Set(ctx.now()),
        updated_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await?;

    counter!("capacity.containers.created", 1, "type" => container_type.type_code.clone());
    info!(
        shipment_id = %shipment.id,
        container_id = %container.id,
        container_number = %container.container_number,
        container_type = %container_type.type_code,
        "Container created"
    );

    Ok(container)
}

/// Record `quantity` units of `item` in `container` without any checks.
///
/// Merges into the existing (container, item) row and bumps the running totals.
pub(crate) async fn load_into_container_in<C: ConnectionTrait>(
    db: &C,
    container: &shipment_container::Model,
    item: &shipment_item::Model,
    quantity: i32,
    ctx: &OperationContext,
) -> Result<shipment_container::Model, ServiceError> {
    let line = CargoLine::of_units(item.unit_weight, item.unit_volume, quantity);
    let now = ctx.now();

    let existing = shipment_container_item::Entity::find()
        .filter(shipment_container_item::Column::ShipmentContainerId.eq(container.id))
        .filter(shipment_container_item::Column::ShipmentItemId.eq(item.id))
        .one(db)
        .await?;

    match existing {
        Some(row) => {
            let merged = row.quantity + quantity;
            let mut active: shipment_container_item::ActiveModel = row.into();
            active.quantity = Set(merged);
            active.total_weight = Set(item.unit_weight * f64::from(merged));
            active.total_volume = Set(item.unit_volume * f64::from(merged));
            active.update(db).await?;
        }
        None => {
            shipment_container_item::ActiveModel {
                shipment_container_id: Set(container.id),
                shipment_item_id: Set(item.id),
                quantity: Set(quantity),
                unit_weight: Set(item.unit_weight),
                total_weight: Set(line.total_weight),
                unit_volume: Set(item.unit_volume),
                total_volume: Set(line.total_volume),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }
    }

    let mut active: shipment_container::ActiveModel = container.clone().into();
    active.current_weight = Set(container.current_weight + line.total_weight);
    active.current_volume = Set(container.current_volume + line.total_volume);
    active.updated_at = Set(Some(now));
    Ok(active.update(db).await?)
}

/// Quantity of `shipment_item_id` already loaded across all containers.
async fn loaded_quantity_in<C: ConnectionTrait>(
    db: &C,
    shipment_item_id: Uuid,
) -> Result<i64, ServiceError> {
    let rows = shipment_container_item::Entity::find()
        .filter(shipment_container_item::Column::ShipmentItemId.eq(shipment_item_id))
        .all(db)
        .await?;
    Ok(rows.iter().map(|row| i64::from(row.quantity)).sum())
}

/// Rebuild `current_weight`/`current_volume` from the container's rows.
pub(crate) async fn recalculate_totals_in<C: ConnectionTrait>(
    db: &C,
    container: shipment_container::Model,
    ctx: &OperationContext,
) -> Result<shipment_container::Model, ServiceError> {
    let rows = container_items_in(db, container.id).await?;
    let weight = rows.iter().fold(0.0_f64, |total, row| total + row.total_weight);
    let volume = rows.iter().fold(0.0_f64, |total, row| total + row.total_volume);

    let mut active: shipment_container::ActiveModel = container.into();
    active.current_weight = Set(weight);
    active.current_volume = Set(volume);
    active.updated_at = Set(Some(ctx.now()));
    Ok(active.update(db).await?)
}

fn ensure_accepts_changes(
    shipment: &shipment::Model,
    container: &shipment_container::Model,
) -> Result<(), ServiceError> {
    if !shipment.status.accepts_container_changes() {
        return Err(ServiceError::InvalidOperation(format!(
            "Shipment {} does not allow additions (status: {})",
            shipment.shipment_number, shipment.status
        )));
    }
    if !container.status.is_open() {
        return Err(ServiceError::InvalidOperation(format!(
            "Container {} does not allow additions (status: {})",
            container.container_number, container.status
        )));
    }
    Ok(())
}

async fn add_item_in<C: ConnectionTrait>(
    db: &C,
    container_id: Uuid,
    shipment_item_id: Uuid,
    quantity: i32,
    ctx: &OperationContext,
) -> Result<shipment_container::Model, ServiceError> {
    if quantity <= 0 {
        return Err(ServiceError::ValidationError(
            "Quantity must be greater than 0".to_string(),
        ));
    }

    let container = load_container(db, container_id).await?;
    let shipment = load_shipment(db, container.shipment_id).await?;
    ensure_accepts_changes(&shipment, &container)?;

    let item = load_item(db, shipment_item_id).await?;
    if item.shipment_id != shipment.id {
        return Err(ServiceError::ValidationError(format!(
            "Item {} does not belong to shipment {}",
            item.product_name, shipment.shipment_number
        )));
    }

    let loaded = loaded_quantity_in(db, item.id).await?;
    let remaining = i64::from(item.quantity_to_ship) - loaded;
    if i64::from(quantity) > remaining {
        return Err(ServiceError::ValidationError(format!(
            "Insufficient quantity for {}. Remaining: {}, Requested: {}",
            item.product_name, remaining, quantity
        )));
    }

    let line = CargoLine::of_units(item.unit_weight, item.unit_volume, quantity);
    if !container.can_fit(line.total_weight, line.total_volume) {
        return Err(ServiceError::InvalidOperation(format!(
            "Container {} has insufficient capacity. Weight: {}kg / {}kg, Volume: {}m³ / {}m³",
            container.container_number,
            round2(line.total_weight),
            round2(container.remaining_weight()),
            round4(line.total_volume),
            round4(container.remaining_volume()),
        )));
    }

    let container = load_into_container_in(db, &container, &item, quantity, ctx).await?;
    info!(
        container_id = %container.id,
        shipment_item_id = %item.id,
        quantity,
        current_weight = container.current_weight,
        "Item added to container"
    );
    Ok(container)
}

async fn remove_item_in<C: ConnectionTrait>(
    db: &C,
    container_item_id: Uuid,
    ctx: &OperationContext,
) -> Result<shipment_container::Model, ServiceError> {
    let row = shipment_container_item::Entity::find_by_id(container_item_id)
        .one(db)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("Container item {} not found", container_item_id))
        })?;
    let container = load_container(db, row.shipment_container_id).await?;
    let shipment = load_shipment(db, container.shipment_id).await?;

    if !shipment.status.accepts_container_changes() {
        return Err(ServiceError::InvalidOperation(format!(
            "Cannot remove items from shipment with status {}",
            shipment.status
        )));
    }
    if !container.status.is_open() {
        return Err(ServiceError::InvalidOperation(format!(
            "Cannot remove items from container with status {}",
            container.status
        )));
    }

    shipment_container_item::Entity::delete_by_id(row.id)
        .exec(db)
        .await?;
    let container = recalculate_totals_in(db, container, ctx).await?;

    info!(
        container_id = %container.id,
        shipment_item_id = %row.shipment_item_id,
        quantity = row.quantity,
        "Item removed from container"
    );
    Ok(container)
}

async fn seal_in<C: ConnectionTrait>(
    db: &C,
    container_id: Uuid,
    seal_number: String,
    ctx: &OperationContext,
) -> Result<shipment_container::Model, ServiceError> {
    let container = load_container(db, container_id).await?;
    if container.status == ContainerStatus::Sealed {
        return Err(ServiceError::InvalidOperation(
            "Container is already sealed".to_string(),
        ));
    }
    if !container.status.is_open() {
        return Err(ServiceError::InvalidStatus(format!(
            "Container {} cannot be sealed (status: {})",
            container.container_number, container.status
        )));
    }

    let seal_number = seal_number.trim().to_string();
    if seal_number.is_empty() {
        return Err(ServiceError::ValidationError(
            "Seal number is required".to_string(),
        ));
    }

    let item_count = shipment_container_item::Entity::find()
        .filter(shipment_container_item::Column::ShipmentContainerId.eq(container.id))
        .count(db)
        .await?;
    if item_count == 0 {
        return Err(ServiceError::InvalidOperation(
            "Container cannot be empty".to_string(),
        ));
    }

    let duplicate = shipment_container::Entity::find()
        .filter(shipment_container::Column::SealNumber.eq(seal_number.clone()))
        .filter(shipment_container::Column::Id.ne(container.id))
        .one(db)
        .await?;
    if duplicate.is_some() {
        return Err(ServiceError::Conflict(format!(
            "Seal number {} is already in use",
            seal_number
        )));
    }

    let now = ctx.now();
    let mut active: shipment_container::ActiveModel = container.into();
    active.status = Set(ContainerStatus::Sealed);
    active.seal_number = Set(Some(seal_number));
    active.sealed_at = Set(Some(now));
    active.sealed_by = Set(ctx.actor_id);
    active.updated_at = Set(Some(now));
    let container = active.update(db).await?;

    counter!("capacity.containers.sealed", 1);
    info!(
        container_id = %container.id,
        seal_number = ?container.seal_number,
        "Container sealed"
    );
    Ok(container)
}

async fn unseal_in<C: ConnectionTrait>(
    db: &C,
    container_id: Uuid,
    ctx: &OperationContext,
) -> Result<shipment_container::Model, ServiceError> {
    let container = load_container(db, container_id).await?;
    if container.status != ContainerStatus::Sealed {
        return Err(ServiceError::InvalidOperation(
            "Container is not sealed".to_string(),
        ));
    }
    let shipment = load_shipment(db, container.shipment_id).await?;
    if !shipment.status.accepts_container_changes() {
        return Err(ServiceError::InvalidOperation(format!(
            "Cannot unseal containers of shipment with status {}",
            shipment.status
        )));
    }

    let mut active: shipment_container::ActiveModel = container.into();
    active.status = Set(ContainerStatus::Packed);
    active.seal_number = Set(None);
    active.sealed_at = Set(None);
    active.sealed_by = Set(None);
    active.updated_at = Set(Some(ctx.now()));
    let container = active.update(db).await?;

    info!(container_id = %container.id, "Container unsealed");
    Ok(container)
}

async fn transition_in<C: ConnectionTrait>(
    db: &C,
    container_id: Uuid,
    from: ContainerStatus,
    to: ContainerStatus,
    ctx: &OperationContext,
) -> Result<shipment_container::Model, ServiceError> {
    let container = load_container(db, container_id).await?;
    if container.status != from {
        return Err(ServiceError::InvalidStatus(format!(
            "Container {} must be {} to become {} (status: {})",
            container.container_number, from, to, container.status
        )));
    }

    let mut active: shipment_container::ActiveModel = container.into();
    active.status = Set(to);
    active.updated_at = Set(Some(ctx.now()));
    let container = active.update(db).await?;

    info!(container_id = %container.id, status = %to, "Container status changed");
    Ok(container)
}

pub(crate) fn summarize(
    container: &shipment_container::Model,
    container_type: &container_type::Model,
    items: &[shipment_container_item::Model],
) -> ContainerSummary {
    ContainerSummary {
        container_id: container.id,
        container_number: container.container_number.clone(),
        container_type: container_type.type_code.clone(),
        status: container.status,
        item_count: items.len(),
        total_quantity: items.iter().map(|row| i64::from(row.quantity)).sum(),
        current_weight: round2(container.current_weight),
        current_volume: round4(container.current_volume),
        max_weight: container.max_weight,
        max_volume: round4(container.max_volume),
        weight_utilization: round2(container.weight_utilization()),
        volume_utilization: round2(container.volume_utilization()),
        remaining_weight: round2(container.remaining_weight()),
        remaining_volume: round4(container.remaining_volume()),
        seal_number: container.seal_number.clone(),
        is_sealed: container.status == ContainerStatus::Sealed,
    }
}

/// Service for managing shipment containers.
#[derive(Clone)]
pub struct ContainerService {
    db_pool: Arc<DatabaseConnection>,
}

impl ContainerService {
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self { db_pool }
    }

    /// Creates an empty draft container of the given type on a shipment.
    #[instrument(skip(self, ctx))]
    pub async fn create_container(
        &self,
        shipment_id: Uuid,
        container_type_id: Uuid,
        ctx: &OperationContext,
    ) -> Result<shipment_container::Model, ServiceError> {
        let ctx = ctx.clone();
        transaction_scope(&self.db_pool, "create_container", move |txn| {
            Box::pin(async move {
                let shipment = load_shipment(txn, shipment_id).await?;
                let container_type = load_container_type(txn, container_type_id).await?;
                create_container_in(txn, &shipment, &container_type, &ctx).await
            })
        })
        .await
    }

    /// Loads `quantity` units of a shipment line into a container.
    ///
    /// # Errors
    /// `ValidationError` for a non-positive or over-allocated quantity,
    /// `InvalidOperation` when the load does not fit or the shipment or
    /// container no longer accepts changes.
    #[instrument(skip(self, ctx))]
    pub async fn add_item_to_container(
        &self,
        container_id: Uuid,
        shipment_item_id: Uuid,
        quantity: i32,
        ctx: &OperationContext,
    ) -> Result<shipment_container::Model, ServiceError> {
        let ctx = ctx.clone();
        transaction_scope(&self.db_pool, "add_item_to_container", move |txn| {
            Box::pin(async move {
                add_item_in(txn, container_id, shipment_item_id, quantity, &ctx).await
            })
        })
        .await
    }

    #[instrument(skip(self, ctx))]
    pub async fn remove_item_from_container(
        &self,
        container_item_id: Uuid,
        ctx: &OperationContext,
    ) -> Result<shipment_container::Model, ServiceError> {
        let ctx = ctx.clone();
        transaction_scope(&self.db_pool, "remove_item_from_container", move |txn| {
            Box::pin(async move { remove_item_in(txn, container_item_id, &ctx).await })
        })
        .await
    }

    /// Seals a non-empty open container under a unique seal number.
    #[instrument(skip(self, ctx))]
    pub async fn seal_container(
        &self,
        container_id: Uuid,
        seal_number: &str,
        ctx: &OperationContext,
    ) -> Result<shipment_container::Model, ServiceError> {
        let ctx = ctx.clone();
        let seal_number = seal_number.to_string();
        transaction_scope(&self.db_pool, "seal_container", move |txn| {
            Box::pin(async move { seal_in(txn, container_id, seal_number, &ctx).await })
        })
        .await
    }

    /// Reopens a sealed container as `packed` and clears the seal.
    #[instrument(skip(self, ctx))]
    pub async fn unseal_container(
        &self,
        container_id: Uuid,
        ctx: &OperationContext,
    ) -> Result<shipment_container::Model, ServiceError> {
        let ctx = ctx.clone();
        transaction_scope(&self.db_pool, "unseal_container", move |txn| {
            Box::pin(async move { unseal_in(txn, container_id, &ctx).await })
        })
        .await
    }

    #[instrument(skip(self, ctx))]
    pub async fn mark_in_transit(
        &self,
        container_id: Uuid,
        ctx: &OperationContext,
    ) -> Result<shipment_container::Model, ServiceError> {
        let ctx = ctx.clone();
        transaction_scope(&self.db_pool, "mark_container_in_transit", move |txn| {
            Box::pin(async move {
                transition_in(
                    txn,
                    container_id,
                    ContainerStatus::Sealed,
                    ContainerStatus::InTransit,
                    &ctx,
                )
                .await
            })
        })
        .await
    }

    #[instrument(skip(self, ctx))]
    pub async fn mark_delivered(
        &self,
        container_id: Uuid,
        ctx: &OperationContext,
    ) -> Result<shipment_container::Model, ServiceError> {
        let ctx = ctx.clone();
        transaction_scope(&self.db_pool, "mark_container_delivered", move |txn| {
            Box::pin(async move {
                transition_in(
                    txn,
                    container_id,
                    ContainerStatus::InTransit,
                    ContainerStatus::Delivered,
                    &ctx,
                )
                .await
            })
        })
        .await
    }

    /// Rebuilds the running totals from the container's item rows.
    #[instrument(skip(self, ctx))]
    pub async fn recalculate_totals(
        &self,
        container_id: Uuid,
        ctx: &OperationContext,
    ) -> Result<shipment_container::Model, ServiceError> {
        let ctx = ctx.clone();
        transaction_scope(&self.db_pool, "recalculate_container_totals", move |txn| {
            Box::pin(async move {
                let container = load_container(txn, container_id).await?;
                recalculate_totals_in(txn, container, &ctx).await
            })
        })
        .await
    }

    pub async fn get_container(
        &self,
        container_id: Uuid,
    ) -> Result<shipment_container::Model, ServiceError> {
        load_container(&*self.db_pool, container_id).await
    }

    pub async fn container_items(
        &self,
        container_id: Uuid,
    ) -> Result<Vec<shipment_container_item::Model>, ServiceError> {
        container_items_in(&*self.db_pool, container_id).await
    }

    pub async fn list_containers(
        &self,
        shipment_id: Uuid,
    ) -> Result<Vec<shipment_container::Model>, ServiceError> {
        shipment_containers_in(&*self.db_pool, shipment_id).await
    }

    pub async fn container_summary(
        &self,
        container_id: Uuid,
    ) -> Result<ContainerSummary, ServiceError> {
        let db = &*self.db_pool;
        let container = load_container(db, container_id).await?;
        let container_type = load_container_type(db, container.container_type_id).await?;
        let items = container_items_in(db, container.id).await?;
        Ok(summarize(&container, &container_type, &items))
    }

    /// Would `lines` (shipment item id, quantity) fit on top of the current load?
    pub async fn check_items_fit(
        &self,
        container_id: Uuid,
        lines: &[(Uuid, i32)],
    ) -> Result<FitReport, ServiceError> {
        let db = &*self.db_pool;
        let container = load_container(db, container_id).await?;
        let container_type = load_container_type(db, container.container_type_id).await?;

        let mut cargo = Vec::with_capacity(lines.len());
        for &(shipment_item_id, quantity) in lines {
            let item = load_item(db, shipment_item_id).await?;
            cargo.push(CargoLine::of_units(
                item.unit_weight,
                item.unit_volume,
                quantity,
            ));
        }

        Ok(capacity::validate_items_fit(
            &container,
            &container_type,
            &cargo,
        ))
    }

    pub async fn check_balance(&self, container_id: Uuid) -> Result<BalanceReport, ServiceError> {
        let items = container_items_in(&*self.db_pool, container_id).await?;
        Ok(capacity::validate_balance(&items))
    }

    pub async fn check_safety(&self, container_id: Uuid) -> Result<SafetyReport, ServiceError> {
        let db = &*self.db_pool;
        let container = load_container(db, container_id).await?;
        let container_type = load_container_type(db, container.container_type_id).await?;
        let items = container_items_in(db, container.id).await?;
        Ok(capacity::validate_safety_limits(
            &container,
            &container_type,
            items.len(),
        ))
    }

    pub async fn suggestions(
        &self,
        container_id: Uuid,
    ) -> Result<Vec<OptimizationSuggestion>, ServiceError> {
        let db = &*self.db_pool;
        let container = load_container(db, container_id).await?;
        let container_type = load_container_type(db, container.container_type_id).await?;
        let items = container_items_in(db, container.id).await?;
        Ok(capacity::optimization_suggestions(
            &container,
            &container_type,
            &items,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::capacity::fixtures;

    #[test]
    fn numbers_are_zero_padded_per_shipment() {
        assert_eq!(container_number("SHP-0001", 1), "SHP-0001-CNT001");
        assert_eq!(container_number("SHP-0001", 12), "SHP-0001-CNT012");
    }

    #[test]
    fn sequence_parses_past_three_digits() {
        assert_eq!(container_sequence("SHP-0001-CNT007"), Some(7));
        assert_eq!(container_sequence("SHP-0001-CNT1000"), Some(1000));
        assert_eq!(container_sequence("manual"), None);
    }

    #[test]
    fn thousandth_container_sorts_after_the_999th() {
        let kind = fixtures::container_type(1000.0);
        let mut later = fixtures::container(&kind, 0.0, 0.0);
        later.container_number = container_number("SHP-0001", 1000);
        let mut earlier = fixtures::container(&kind, 0.0, 0.0);
        earlier.container_number = container_number("SHP-0001", 999);
        earlier.created_at = later.created_at;

        let mut containers = vec![later, earlier];
        sort_in_creation_order(&mut containers);
        assert_eq!(containers[0].container_number, "SHP-0001-CNT999");
        assert_eq!(containers[1].container_number, "SHP-0001-CNT1000");
    }
}
