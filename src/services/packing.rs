//! Packing box lifecycle and item placement.
//!
//! Box states: empty -> packing (first item) -> sealed -> shipped. Unsealing
//! returns a sealed box to packing. Sealed and shipped boxes reject every
//! content change.
//!
//! After each change the affected box totals and shipment item counters are
//! rebuilt from the `packing_box_items` rows, so `quantity_packed` is always
//! the sum of what the boxes hold.

use metrics::counter;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::config::CapacityConfig;
use crate::context::OperationContext;
use crate::db::transaction_scope;
use crate::entities::packing_box::{self, default_box_label, BoxKind, BoxStatus};
use crate::entities::shipment_item::{self, ItemPackingStatus};
use crate::entities::{packing_box_item, packing_box_type, shipment};
use crate::errors::ServiceError;
use crate::services::packaging::calculate_cbm;
use crate::services::shipments::{load_item, load_shipment, shipment_items_in};

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NewPackingBox {
    pub box_kind: Option<BoxKind>,
    #[validate(length(min = 1, max = 64))]
    pub box_label: Option<String>,
    /// Dimensions missing here are taken from the box type, when given
    pub packing_box_type_id: Option<Uuid>,
    pub shipment_container_id: Option<Uuid>,
    #[validate(range(min = 0.0))]
    pub length: Option<f64>,
    #[validate(range(min = 0.0))]
    pub width: Option<f64>,
    #[validate(range(min = 0.0))]
    pub height: Option<f64>,
    #[validate(range(min = 0.0))]
    pub gross_weight: Option<f64>,
    pub notes: Option<String>,
    pub contents_description: Option<String>,
}

/// Fields left as `None` keep their current value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePackingBox {
    pub box_kind: Option<BoxKind>,
    #[validate(length(min = 1, max = 64))]
    pub box_label: Option<String>,
    #[validate(range(min = 0.0))]
    pub length: Option<f64>,
    #[validate(range(min = 0.0))]
    pub width: Option<f64>,
    #[validate(range(min = 0.0))]
    pub height: Option<f64>,
    #[validate(range(min = 0.0))]
    pub gross_weight: Option<f64>,
    pub notes: Option<String>,
    pub contents_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnpackedItem {
    pub item_id: Uuid,
    pub product_name: String,
    pub quantity_to_ship: i32,
    pub quantity_packed: i32,
    pub quantity_remaining: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackingSummary {
    pub total_boxes: usize,
    pub sealed_boxes: usize,
    pub unsealed_boxes: usize,
    pub total_items: usize,
    pub fully_packed_items: usize,
    pub partially_packed_items: usize,
    pub unpacked_items: usize,
    pub total_quantity: i64,
    pub packed_quantity: i64,
    pub remaining_quantity: i64,
    pub packing_complete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutoPackResult {
    pub shipment_id: Uuid,
    pub boxes_used: usize,
    pub items_packed: usize,
    pub boxes: Vec<packing_box::Model>,
}

/// Units per box when `remaining` is spread over `boxes`, rounded up.
fn chunk_size(remaining: i32, boxes: i32) -> i32 {
    let boxes = i64::from(boxes.max(1));
    // never larger than `remaining`
    ((i64::from(remaining) + boxes - 1) / boxes) as i32
}

/// Cubic meters of a box, when all three dimensions are known.
fn box_volume(length: Option<f64>, width: Option<f64>, height: Option<f64>) -> Option<f64> {
    match (length, width, height) {
        (Some(l), Some(w), Some(h)) => Some(calculate_cbm(l, w, h)),
        _ => None,
    }
}

pub fn summarize_packing(
    boxes: &[packing_box::Model],
    items: &[shipment_item::Model],
) -> PackingSummary {
    let count_status = |status: ItemPackingStatus| {
        items
            .iter()
            .filter(|item| item.packing_status == status)
            .count()
    };
    let sealed_boxes = boxes.iter().filter(|b| b.is_sealed()).count();

    PackingSummary {
        total_boxes: boxes.len(),
        sealed_boxes,
        unsealed_boxes: boxes.len() - sealed_boxes,
        total_items: items.len(),
        fully_packed_items: count_status(ItemPackingStatus::FullyPacked),
        partially_packed_items: count_status(ItemPackingStatus::PartiallyPacked),
        unpacked_items: count_status(ItemPackingStatus::Unpacked),
        total_quantity: items.iter().map(|i| i64::from(i.quantity_to_ship)).sum(),
        packed_quantity: items.iter().map(|i| i64::from(i.quantity_packed)).sum(),
        remaining_quantity: items.iter().map(|i| i64::from(i.quantity_remaining)).sum(),
        packing_complete: items.iter().all(|item| item.is_fully_packed()),
    }
}

async fn load_box<C: ConnectionTrait>(
    db: &C,
    box_id: Uuid,
) -> Result<packing_box::Model, ServiceError> {
    packing_box::Entity::find_by_id(box_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Packing box {} not found", box_id)))
}

async fn load_box_item<C: ConnectionTrait>(
    db: &C,
    box_item_id: Uuid,
) -> Result<packing_box_item::Model, ServiceError> {
    packing_box_item::Entity::find_by_id(box_item_id)
        .one(db)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("Packing box item {} not found", box_item_id))
        })
}

async fn shipment_boxes_in<C: ConnectionTrait>(
    db: &C,
    shipment_id: Uuid,
) -> Result<Vec<packing_box::Model>, ServiceError> {
    Ok(packing_box::Entity::find()
        .filter(packing_box::Column::ShipmentId.eq(shipment_id))
        .order_by_asc(packing_box::Column::BoxNumber)
        .all(db)
        .await?)
}

/// Rejects a packing quantity the item cannot absorb.
fn ensure_packable(item: &shipment_item::Model, quantity: i32) -> Result<(), ServiceError> {
    if quantity <= 0 {
        return Err(ServiceError::ValidationError(
            "Quantity must be greater than 0".to_string(),
        ));
    }
    if i64::from(item.quantity_packed) + i64::from(quantity) > i64::from(item.quantity_to_ship) {
        return Err(ServiceError::ValidationError(format!(
            "Cannot pack {} units. Only {} remaining for {}",
            quantity,
            item.quantity_to_ship - item.quantity_packed,
            item.product_name
        )));
    }
    Ok(())
}

/// Rebuild `quantity_packed`, `quantity_remaining` and status from box rows.
async fn refresh_item_in<C: ConnectionTrait>(
    db: &C,
    shipment_item_id: Uuid,
    ctx: &OperationContext,
) -> Result<shipment_item::Model, ServiceError> {
    let item = load_item(db, shipment_item_id).await?;
    let rows = packing_box_item::Entity::find()
        .filter(packing_box_item::Column::ShipmentItemId.eq(item.id))
        .all(db)
        .await?;
    let packed: i32 = rows.iter().map(|row| row.quantity).sum();

    let to_ship = item.quantity_to_ship;
    let mut active: shipment_item::ActiveModel = item.into();
    active.quantity_packed = Set(packed);
    active.quantity_remaining = Set(to_ship - packed);
    active.packing_status = Set(ItemPackingStatus::for_quantities(packed, to_ship));
    active.updated_at = Set(Some(ctx.now()));
    Ok(active.update(db).await?)
}

/// Rebuild a box's totals from its rows. Open boxes also get their status
/// back in line: empty without rows, packing with them.
async fn refresh_box_in<C: ConnectionTrait>(
    db: &C,
    packing_box: packing_box::Model,
    ctx: &OperationContext,
) -> Result<packing_box::Model, ServiceError> {
    let rows = packing_box_item::Entity::find()
        .filter(packing_box_item::Column::PackingBoxId.eq(packing_box.id))
        .all(db)
        .await?;

    let item_ids: Vec<Uuid> = rows.iter().map(|row| row.shipment_item_id).collect();
    let items = if item_ids.is_empty() {
        Vec::new()
    } else {
        shipment_item::Entity::find()
            .filter(shipment_item::Column::Id.is_in(item_ids))
            .all(db)
            .await?
    };

    let mut net_weight = 0.0;
    for row in &rows {
        if let Some(item) = items.iter().find(|item| item.id == row.shipment_item_id) {
            net_weight += item.unit_weight * f64::from(row.quantity);
        }
    }
    let total_quantity: i32 = rows.iter().map(|row| row.quantity).sum();

    let status = match packing_box.packing_status {
        BoxStatus::Empty | BoxStatus::Packing if rows.is_empty() => BoxStatus::Empty,
        BoxStatus::Empty | BoxStatus::Packing => BoxStatus::Packing,
        locked => locked,
    };

    let mut active: packing_box::ActiveModel = packing_box.into();
    active.total_items = Set(rows.len() as i32);
    active.total_quantity = Set(total_quantity);
    active.net_weight = Set(net_weight);
    active.packing_status = Set(status);
    active.updated_at = Set(Some(ctx.now()));
    Ok(active.update(db).await?)
}

async fn create_box_in<C: ConnectionTrait>(
    db: &C,
    shipment: &shipment::Model,
    input: NewPackingBox,
    default_kind: BoxKind,
    ctx: &OperationContext,
) -> Result<packing_box::Model, ServiceError> {
    let last = packing_box::Entity::find()
        .filter(packing_box::Column::ShipmentId.eq(shipment.id))
        .order_by_desc(packing_box::Column::BoxNumber)
        .one(db)
        .await?;
    let box_number = last.map_or(1, |b| b.box_number + 1);

    let (mut length, mut width, mut height) = (input.length, input.width, input.height);
    if let Some(type_id) = input.packing_box_type_id {
        let box_type = packing_box_type::Entity::find_by_id(type_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Box type {} not found", type_id)))?;
        length = length.or(Some(box_type.length));
        width = width.or(Some(box_type.width));
        height = height.or(Some(box_type.height));
    }

    let packing_box = packing_box::ActiveModel {
        shipment_id: Set(shipment.id),
        shipment_container_id: Set(input.shipment_container_id),
        packing_box_type_id: Set(input.packing_box_type_id),
        box_number: Set(box_number),
        box_label: Set(input
            .box_label
            .unwrap_or_else(|| default_box_label(box_number))),
        box_kind: Set(input.box_kind.unwrap_or(default_kind)),
        length: Set(length),
        width: Set(width),
        height: Set(height),
        gross_weight: Set(input.gross_weight),
        net_weight: Set(0.0),
        volume: Set(box_volume(length, width, height)),
        total_items: Set(0),
        total_quantity: Set(0),
        packing_status: Set(BoxStatus::Empty),
        sealed_at: Set(None),
        sealed_by: Set(None),
        notes: Set(input.notes),
        contents_description: Set(input.contents_description),
        created_by: Set(ctx.actor_id),
        created_at: Set(ctx.now()),
        updated_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(
        shipment_id = %shipment.id,
        box_id = %packing_box.id,
        box_number = packing_box.box_number,
        "Packing box created"
    );
    Ok(packing_box)
}

async fn add_item_in<C: ConnectionTrait>(
    db: &C,
    box_id: Uuid,
    shipment_item_id: Uuid,
    quantity: i32,
    ctx: &OperationContext,
) -> Result<packing_box_item::Model, ServiceError> {
    let packing_box = load_box(db, box_id).await?;
    if packing_box.packing_status.is_locked() {
        return Err(ServiceError::InvalidOperation(
            "Cannot add items to a sealed box".to_string(),
        ));
    }

    let item = load_item(db, shipment_item_id).await?;
    if item.shipment_id != packing_box.shipment_id {
        return Err(ServiceError::ValidationError(format!(
            "{} does not belong to the shipment of box {}",
            item.product_name, packing_box.box_label
        )));
    }
    ensure_packable(&item, quantity)?;

    let now = ctx.now();
    let existing = packing_box_item::Entity::find()
        .filter(packing_box_item::Column::PackingBoxId.eq(packing_box.id))
        .filter(packing_box_item::Column::ShipmentItemId.eq(item.id))
        .one(db)
        .await?;

    let row = match existing {
        Some(row) => {
            let merged = row.quantity + quantity;
            let mut active: packing_box_item::ActiveModel = row.into();
            active.quantity = Set(merged);
            active.updated_at = Set(Some(now));
            active.update(db).await?
        }
        None => {
            packing_box_item::ActiveModel {
                packing_box_id: Set(packing_box.id),
                shipment_item_id: Set(item.id),
                quantity: Set(quantity),
                created_at: Set(now),
                updated_at: Set(None),
                ..Default::default()
            }
            .insert(db)
            .await?
        }
    };

    refresh_box_in(db, packing_box, ctx).await?;
    refresh_item_in(db, item.id, ctx).await?;

    info!(box_id = %box_id, item_id = %item.id, quantity, "Item added to packing box");
    Ok(row)
}

async fn update_item_quantity_in<C: ConnectionTrait>(
    db: &C,
    box_item_id: Uuid,
    new_quantity: i32,
    ctx: &OperationContext,
) -> Result<packing_box_item::Model, ServiceError> {
    let row = load_box_item(db, box_item_id).await?;
    let packing_box = load_box(db, row.packing_box_id).await?;
    if packing_box.packing_status.is_locked() {
        return Err(ServiceError::InvalidOperation(
            "Cannot update items in a sealed box".to_string(),
        ));
    }
    if new_quantity <= 0 {
        return Err(ServiceError::ValidationError(
            "Quantity must be greater than 0".to_string(),
        ));
    }

    let old_quantity = row.quantity;
    let difference = new_quantity - old_quantity;
    if difference > 0 {
        let item = load_item(db, row.shipment_item_id).await?;
        ensure_packable(&item, difference)?;
    }

    let item_id = row.shipment_item_id;
    let mut active: packing_box_item::ActiveModel = row.into();
    active.quantity = Set(new_quantity);
    active.updated_at = Set(Some(ctx.now()));
    let row = active.update(db).await?;

    refresh_box_in(db, packing_box, ctx).await?;
    refresh_item_in(db, item_id, ctx).await?;

    info!(
        box_item_id = %row.id,
        old_quantity,
        new_quantity,
        "Packing box item quantity updated"
    );
    Ok(row)
}

async fn remove_item_in<C: ConnectionTrait>(
    db: &C,
    box_item_id: Uuid,
    ctx: &OperationContext,
) -> Result<packing_box::Model, ServiceError> {
    let row = load_box_item(db, box_item_id).await?;
    let packing_box = load_box(db, row.packing_box_id).await?;
    if packing_box.packing_status.is_locked() {
        return Err(ServiceError::InvalidOperation(
            "Cannot remove items from a sealed box".to_string(),
        ));
    }

    packing_box_item::Entity::delete_by_id(row.id).exec(db).await?;
    let packing_box = refresh_box_in(db, packing_box, ctx).await?;
    refresh_item_in(db, row.shipment_item_id, ctx).await?;

    info!(box_id = %packing_box.id, box_item_id = %row.id, "Item removed from packing box");
    Ok(packing_box)
}

async fn auto_pack_in<C: ConnectionTrait>(
    db: &C,
    shipment_id: Uuid,
    number_of_boxes: usize,
    default_kind: BoxKind,
    ctx: &OperationContext,
) -> Result<AutoPackResult, ServiceError> {
    let shipment = load_shipment(db, shipment_id).await?;
    let items: Vec<shipment_item::Model> = shipment_items_in(db, shipment.id)
        .await?
        .into_iter()
        .filter(|item| !item.is_fully_packed())
        .collect();
    if items.is_empty() {
        return Err(ServiceError::NothingToProcess("No items to pack".to_string()));
    }

    let open_count = shipment_boxes_in(db, shipment.id)
        .await?
        .iter()
        .filter(|b| !b.packing_status.is_locked())
        .count();
    for _ in open_count..number_of_boxes {
        create_box_in(db, &shipment, NewPackingBox::default(), default_kind, ctx).await?;
    }

    let boxes: Vec<packing_box::Model> = shipment_boxes_in(db, shipment.id)
        .await?
        .into_iter()
        .filter(|b| !b.packing_status.is_locked())
        .take(number_of_boxes)
        .collect();

    let divisor = number_of_boxes as i32;
    let mut cursor = 0usize;
    for item in &items {
        let mut remaining = item.quantity_to_ship - item.quantity_packed;
        if remaining <= 0 {
            continue;
        }
        let chunk = chunk_size(remaining, divisor);

        while remaining > 0 {
            let quantity = chunk.min(remaining);
            add_item_in(db, boxes[cursor % boxes.len()].id, item.id, quantity, ctx).await?;
            remaining -= quantity;
            cursor += 1;
        }
    }

    let mut packed_boxes = Vec::with_capacity(boxes.len());
    for packing_box in &boxes {
        packed_boxes.push(load_box(db, packing_box.id).await?);
    }

    Ok(AutoPackResult {
        shipment_id: shipment.id,
        boxes_used: packed_boxes.len(),
        items_packed: items.len(),
        boxes: packed_boxes,
    })
}

async fn clear_all_in<C: ConnectionTrait>(
    db: &C,
    shipment_id: Uuid,
    ctx: &OperationContext,
) -> Result<(), ServiceError> {
    let shipment = load_shipment(db, shipment_id).await?;
    let boxes = shipment_boxes_in(db, shipment.id).await?;
    if let Some(shipped) = boxes.iter().find(|b| b.packing_status == BoxStatus::Shipped) {
        return Err(ServiceError::InvalidOperation(format!(
            "Cannot clear packing: box {} has already shipped",
            shipped.box_label
        )));
    }

    for packing_box in boxes {
        packing_box_item::Entity::delete_many()
            .filter(packing_box_item::Column::PackingBoxId.eq(packing_box.id))
            .exec(db)
            .await?;

        let mut active: packing_box::ActiveModel = packing_box.into();
        active.packing_status = Set(BoxStatus::Empty);
        active.sealed_at = Set(None);
        active.sealed_by = Set(None);
        active.total_items = Set(0);
        active.total_quantity = Set(0);
        active.net_weight = Set(0.0);
        active.updated_at = Set(Some(ctx.now()));
        active.update(db).await?;
    }

    for item in shipment_items_in(db, shipment.id).await? {
        refresh_item_in(db, item.id, ctx).await?;
    }

    info!(shipment_id = %shipment.id, "All packing cleared");
    Ok(())
}

/// Service for packing shipment items into boxes.
#[derive(Clone)]
pub struct PackingService {
    db_pool: Arc<DatabaseConnection>,
    config: CapacityConfig,
}

impl PackingService {
    pub fn new(db_pool: Arc<DatabaseConnection>, config: CapacityConfig) -> Self {
        Self { db_pool, config }
    }

    /// Creates the next numbered box on a shipment.
    #[instrument(skip(self, input, ctx))]
    pub async fn create_box(
        &self,
        shipment_id: Uuid,
        input: NewPackingBox,
        ctx: &OperationContext,
    ) -> Result<packing_box::Model, ServiceError> {
        input.validate()?;
        let default_kind = self.config.box_kind();
        let ctx = ctx.clone();
        transaction_scope(&self.db_pool, "create_box", move |txn| {
            Box::pin(async move {
                let shipment = load_shipment(txn, shipment_id).await?;
                create_box_in(txn, &shipment, input, default_kind, &ctx).await
            })
        })
        .await
    }

    #[instrument(skip(self, input, ctx))]
    pub async fn update_box(
        &self,
        box_id: Uuid,
        input: UpdatePackingBox,
        ctx: &OperationContext,
    ) -> Result<packing_box::Model, ServiceError> {
        input.validate()?;
        let ctx = ctx.clone();
        transaction_scope(&self.db_pool, "update_box", move |txn| {
            Box::pin(async move {
                let packing_box = load_box(txn, box_id).await?;
                if packing_box.packing_status.is_locked() {
                    return Err(ServiceError::InvalidOperation(
                        "Cannot update a sealed box".to_string(),
                    ));
                }

                let length = input.length.or(packing_box.length);
                let width = input.width.or(packing_box.width);
                let height = input.height.or(packing_box.height);

                let mut active: packing_box::ActiveModel = packing_box.clone().into();
                active.box_kind = Set(input.box_kind.unwrap_or(packing_box.box_kind));
                active.box_label = Set(input.box_label.unwrap_or(packing_box.box_label));
                active.length = Set(length);
                active.width = Set(width);
                active.height = Set(height);
                active.volume = Set(box_volume(length, width, height).or(packing_box.volume));
                active.gross_weight = Set(input.gross_weight.or(packing_box.gross_weight));
                active.notes = Set(input.notes.or(packing_box.notes));
                active.contents_description =
                    Set(input.contents_description.or(packing_box.contents_description));
                active.updated_at = Set(Some(ctx.now()));
                let packing_box = active.update(txn).await?;

                info!(box_id = %packing_box.id, "Packing box updated");
                Ok(packing_box)
            })
        })
        .await
    }

    /// Deletes an open box that holds nothing.
    #[instrument(skip(self))]
    pub async fn delete_box(&self, box_id: Uuid) -> Result<(), ServiceError> {
        transaction_scope(&self.db_pool, "delete_box", move |txn| {
            Box::pin(async move {
                let packing_box = load_box(txn, box_id).await?;
                if packing_box.packing_status.is_locked() {
                    return Err(ServiceError::InvalidOperation(
                        "Cannot delete a sealed box".to_string(),
                    ));
                }
                if packing_box.has_items() {
                    return Err(ServiceError::InvalidOperation(
                        "Cannot delete a box with items. Remove items first.".to_string(),
                    ));
                }

                packing_box::Entity::delete_by_id(packing_box.id)
                    .exec(txn)
                    .await?;
                info!(
                    shipment_id = %packing_box.shipment_id,
                    box_number = packing_box.box_number,
                    "Packing box deleted"
                );
                Ok(())
            })
        })
        .await
    }

    /// Packs `quantity` units of a shipment line into a box.
    ///
    /// # Errors
    /// `InvalidOperation` for sealed or shipped boxes, `ValidationError`
    /// when the quantity is not positive or exceeds what is left to pack.
    #[instrument(skip(self, ctx))]
    pub async fn add_item_to_box(
        &self,
        box_id: Uuid,
        shipment_item_id: Uuid,
        quantity: i32,
        ctx: &OperationContext,
    ) -> Result<packing_box_item::Model, ServiceError> {
        let ctx = ctx.clone();
        transaction_scope(&self.db_pool, "add_item_to_box", move |txn| {
            Box::pin(async move { add_item_in(txn, box_id, shipment_item_id, quantity, &ctx).await })
        })
        .await
    }

    #[instrument(skip(self, ctx))]
    pub async fn update_item_quantity(
        &self,
        box_item_id: Uuid,
        new_quantity: i32,
        ctx: &OperationContext,
    ) -> Result<packing_box_item::Model, ServiceError> {
        let ctx = ctx.clone();
        transaction_scope(&self.db_pool, "update_box_item_quantity", move |txn| {
            Box::pin(async move {
                update_item_quantity_in(txn, box_item_id, new_quantity, &ctx).await
            })
        })
        .await
    }

    #[instrument(skip(self, ctx))]
    pub async fn remove_item_from_box(
        &self,
        box_item_id: Uuid,
        ctx: &OperationContext,
    ) -> Result<packing_box::Model, ServiceError> {
        let ctx = ctx.clone();
        transaction_scope(&self.db_pool, "remove_item_from_box", move |txn| {
            Box::pin(async move { remove_item_in(txn, box_item_id, &ctx).await })
        })
        .await
    }

    /// Seals a box in `packing` that holds at least one unit.
    #[instrument(skip(self, ctx))]
    pub async fn seal_box(
        &self,
        box_id: Uuid,
        ctx: &OperationContext,
    ) -> Result<packing_box::Model, ServiceError> {
        let ctx = ctx.clone();
        transaction_scope(&self.db_pool, "seal_box", move |txn| {
            Box::pin(async move {
                let packing_box = load_box(txn, box_id).await?;
                if !packing_box.can_be_sealed() {
                    return Err(ServiceError::InvalidOperation(
                        "Box cannot be sealed. It must be in packing status and have items."
                            .to_string(),
                    ));
                }

                let now = ctx.now();
                let mut active: packing_box::ActiveModel = packing_box.into();
                active.packing_status = Set(BoxStatus::Sealed);
                active.sealed_at = Set(Some(now));
                active.sealed_by = Set(ctx.actor_id);
                active.updated_at = Set(Some(now));
                let packing_box = active.update(txn).await?;

                counter!("capacity.boxes.sealed", 1);
                info!(
                    box_id = %packing_box.id,
                    box_number = packing_box.box_number,
                    total_items = packing_box.total_items,
                    total_quantity = packing_box.total_quantity,
                    "Packing box sealed"
                );
                Ok(packing_box)
            })
        })
        .await
    }

    #[instrument(skip(self, ctx))]
    pub async fn unseal_box(
        &self,
        box_id: Uuid,
        ctx: &OperationContext,
    ) -> Result<packing_box::Model, ServiceError> {
        let ctx = ctx.clone();
        transaction_scope(&self.db_pool, "unseal_box", move |txn| {
            Box::pin(async move {
                let packing_box = load_box(txn, box_id).await?;
                if packing_box.packing_status != BoxStatus::Sealed {
                    return Err(ServiceError::InvalidOperation("Box is not sealed".to_string()));
                }

                let mut active: packing_box::ActiveModel = packing_box.into();
                active.packing_status = Set(BoxStatus::Packing);
                active.sealed_at = Set(None);
                active.sealed_by = Set(None);
                active.updated_at = Set(Some(ctx.now()));
                let packing_box = active.update(txn).await?;

                info!(box_id = %packing_box.id, "Packing box unsealed");
                Ok(packing_box)
            })
        })
        .await
    }

    #[instrument(skip(self, ctx))]
    pub async fn mark_shipped(
        &self,
        box_id: Uuid,
        ctx: &OperationContext,
    ) -> Result<packing_box::Model, ServiceError> {
        let ctx = ctx.clone();
        transaction_scope(&self.db_pool, "mark_box_shipped", move |txn| {
            Box::pin(async move {
                let packing_box = load_box(txn, box_id).await?;
                if packing_box.packing_status != BoxStatus::Sealed {
                    return Err(ServiceError::InvalidStatus(format!(
                        "Box {} must be sealed before it ships (status: {})",
                        packing_box.box_label, packing_box.packing_status
                    )));
                }

                let mut active: packing_box::ActiveModel = packing_box.into();
                active.packing_status = Set(BoxStatus::Shipped);
                active.updated_at = Set(Some(ctx.now()));
                let packing_box = active.update(txn).await?;

                info!(box_id = %packing_box.id, "Packing box shipped");
                Ok(packing_box)
            })
        })
        .await
    }

    /// Deals every unpacked unit round-robin over `number_of_boxes` open boxes.
    ///
    /// Missing boxes are created first. Each item is split into chunks of
    /// `ceil(remaining / number_of_boxes)`; the box cursor carries over from
    /// one item to the next.
    ///
    /// # Errors
    /// `ValidationError` when `number_of_boxes` is zero, `NothingToProcess`
    /// when every item is already fully packed.
    #[instrument(skip(self, ctx))]
    pub async fn auto_pack_items(
        &self,
        shipment_id: Uuid,
        number_of_boxes: usize,
        ctx: &OperationContext,
    ) -> Result<AutoPackResult, ServiceError> {
        if number_of_boxes == 0 {
            return Err(ServiceError::ValidationError(
                "Number of boxes must be greater than 0".to_string(),
            ));
        }
        if i32::try_from(number_of_boxes).is_err() {
            return Err(ServiceError::ValidationError(format!(
                "Number of boxes {} is too large",
                number_of_boxes
            )));
        }

        let default_kind = self.config.box_kind();
        let ctx = ctx.clone();
        let result = transaction_scope(&self.db_pool, "auto_pack_items", move |txn| {
            Box::pin(async move {
                auto_pack_in(txn, shipment_id, number_of_boxes, default_kind, &ctx).await
            })
        })
        .await?;

        counter!("capacity.auto_pack.runs", 1);
        info!(
            shipment_id = %shipment_id,
            boxes_used = result.boxes_used,
            items_packed = result.items_packed,
            "Auto-pack completed"
        );
        Ok(result)
    }

    pub async fn validate_all_items_packed(
        &self,
        shipment_id: Uuid,
    ) -> Result<Vec<UnpackedItem>, ServiceError> {
        let items = shipment_items_in(&*self.db_pool, shipment_id).await?;
        Ok(items
            .into_iter()
            .filter(|item| !item.is_fully_packed())
            .map(|item| UnpackedItem {
                item_id: item.id,
                product_name: item.product_name,
                quantity_to_ship: item.quantity_to_ship,
                quantity_packed: item.quantity_packed,
                quantity_remaining: item.quantity_remaining,
            })
            .collect())
    }

    pub async fn packing_summary(&self, shipment_id: Uuid) -> Result<PackingSummary, ServiceError> {
        let db = &*self.db_pool;
        let shipment = load_shipment(db, shipment_id).await?;
        let boxes = shipment_boxes_in(db, shipment.id).await?;
        let items = shipment_items_in(db, shipment.id).await?;
        Ok(summarize_packing(&boxes, &items))
    }

    /// Unseals every box, removes all box contents and resets item counters.
    #[instrument(skip(self, ctx))]
    pub async fn clear_all_packing(
        &self,
        shipment_id: Uuid,
        ctx: &OperationContext,
    ) -> Result<(), ServiceError> {
        let ctx = ctx.clone();
        transaction_scope(&self.db_pool, "clear_all_packing", move |txn| {
            Box::pin(async move { clear_all_in(txn, shipment_id, &ctx).await })
        })
        .await
    }

    pub async fn get_box(&self, box_id: Uuid) -> Result<packing_box::Model, ServiceError> {
        load_box(&*self.db_pool, box_id).await
    }

    pub async fn list_boxes(&self, shipment_id: Uuid) -> Result<Vec<packing_box::Model>, ServiceError> {
        shipment_boxes_in(&*self.db_pool, shipment_id).await
    }

    pub async fn box_items(
        &self,
        box_id: Uuid,
    ) -> Result<Vec<packing_box_item::Model>, ServiceError> {
        Ok(packing_box_item::Entity::find()
            .filter(packing_box_item::Column::PackingBoxId.eq(box_id))
            .order_by_asc(packing_box_item::Column::CreatedAt)
            .all(&*self.db_pool)
            .await?)
    }

    pub async fn count_boxes(&self, shipment_id: Uuid) -> Result<u64, ServiceError> {
        Ok(packing_box::Entity::find()
            .filter(packing_box::Column::ShipmentId.eq(shipment_id))
            .count(&*self.db_pool)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::quantity::fixtures::{item, packing_box};
    use assert_matches::assert_matches;

    #[test]
    fn chunks_round_up_without_overflowing() {
        assert_eq!(chunk_size(15, 3), 5);
        assert_eq!(chunk_size(16, 3), 6);
        assert_eq!(chunk_size(2, 5), 1);
        assert_eq!(chunk_size(i32::MAX, 2), i32::MAX / 2 + 1);
        assert_eq!(chunk_size(i32::MAX, 1), i32::MAX);
    }

    #[test]
    fn over_packing_names_the_remaining_quantity() {
        let mut line = item(100, 90);
        line.product_name = "Desk lamp".to_string();

        let err = ensure_packable(&line, 15).unwrap_err();
        assert_matches!(err, ServiceError::ValidationError(msg) => {
            assert_eq!(msg, "Cannot pack 15 units. Only 10 remaining for Desk lamp");
        });
        assert!(ensure_packable(&line, 10).is_ok());
    }

    #[test]
    fn zero_quantity_is_not_packable() {
        assert_matches!(
            ensure_packable(&item(5, 0), 0),
            Err(ServiceError::ValidationError(msg)) if msg == "Quantity must be greater than 0"
        );
    }

    #[test]
    fn volume_needs_all_three_dimensions() {
        assert_eq!(box_volume(Some(100.0), Some(50.0), Some(20.0)), Some(0.1));
        assert_eq!(box_volume(Some(100.0), None, Some(20.0)), None);
    }

    #[test]
    fn summary_counts_statuses() {
        let boxes = vec![
            packing_box(BoxStatus::Sealed, 5),
            packing_box(BoxStatus::Packing, 2),
        ];
        let items = vec![item(5, 5), item(4, 2), item(3, 0)];
        let summary = summarize_packing(&boxes, &items);

        assert_eq!(summary.sealed_boxes, 1);
        assert_eq!(summary.unsealed_boxes, 1);
        assert_eq!(summary.fully_packed_items, 1);
        assert_eq!(summary.partially_packed_items, 1);
        assert_eq!(summary.unpacked_items, 1);
        assert_eq!(summary.remaining_quantity, 5);
        assert!(!summary.packing_complete);
    }
}
