use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::context::OperationContext;
use crate::db::transaction_scope;
use crate::entities::shipment::{self, ShipmentStatus};
use crate::entities::shipment_item::{self, ItemPackingStatus};
use crate::entities::packing_box;
use crate::errors::ServiceError;
use crate::services::packaging::calculate_cbm;
use crate::services::quantity::{self, ShipmentValidationSummary};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewShipment {
    #[validate(length(min = 1, max = 64))]
    pub shipment_number: String,
    pub notes: Option<String>,
}

/// A shipment line with its product snapshot.
///
/// When `unit_volume` is omitted it is derived from the three unit
/// dimensions (cm); with neither present the line has no volume.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewShipmentItem {
    #[validate(length(min = 1, max = 255))]
    pub product_name: String,
    pub product_sku: Option<String>,
    #[validate(range(min = 0.0))]
    pub unit_weight: f64,
    #[validate(range(min = 0.0))]
    pub unit_volume: Option<f64>,
    #[validate(range(min = 0.0))]
    pub unit_length: Option<f64>,
    #[validate(range(min = 0.0))]
    pub unit_width: Option<f64>,
    #[validate(range(min = 0.0))]
    pub unit_height: Option<f64>,
    #[validate(range(min = 1))]
    pub quantity_to_ship: i32,
}

impl NewShipmentItem {
    fn resolved_unit_volume(&self) -> f64 {
        match (self.unit_volume, self.unit_length, self.unit_width, self.unit_height) {
            (Some(volume), _, _, _) => volume,
            (None, Some(length), Some(width), Some(height)) => calculate_cbm(length, width, height),
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ShipmentDetails {
    pub shipment: shipment::Model,
    pub items: Vec<shipment_item::Model>,
}

pub(crate) async fn load_shipment<C: ConnectionTrait>(
    db: &C,
    shipment_id: Uuid,
) -> Result<shipment::Model, ServiceError> {
    shipment::Entity::find_by_id(shipment_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Shipment {} not found", shipment_id)))
}

pub(crate) async fn load_item<C: ConnectionTrait>(
    db: &C,
    shipment_item_id: Uuid,
) -> Result<shipment_item::Model, ServiceError> {
    shipment_item::Entity::find_by_id(shipment_item_id)
        .one(db)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("Shipment item {} not found", shipment_item_id))
        })
}

/// Lines of a shipment in the order they were added.
pub(crate) async fn shipment_items_in<C: ConnectionTrait>(
    db: &C,
    shipment_id: Uuid,
) -> Result<Vec<shipment_item::Model>, ServiceError> {
    Ok(shipment_item::Entity::find()
        .filter(shipment_item::Column::ShipmentId.eq(shipment_id))
        .order_by_asc(shipment_item::Column::CreatedAt)
        .order_by_asc(shipment_item::Column::ProductName)
        .all(db)
        .await?)
}

/// Service for shipments and their lines.
#[derive(Clone)]
pub struct ShipmentService {
    db_pool: Arc<DatabaseConnection>,
}

impl ShipmentService {
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, ctx))]
    pub async fn create_shipment(
        &self,
        input: NewShipment,
        ctx: &OperationContext,
    ) -> Result<shipment::Model, ServiceError> {
        input.validate()?;
        let ctx = ctx.clone();

        transaction_scope(&self.db_pool, "create_shipment", move |txn| {
            Box::pin(async move {
                let taken = shipment::Entity::find()
                    .filter(shipment::Column::ShipmentNumber.eq(input.shipment_number.clone()))
                    .count(txn)
                    .await?;
                if taken > 0 {
                    return Err(ServiceError::Conflict(format!(
                        "Shipment number {} already exists",
                        input.shipment_number
                    )));
                }

                let shipment = shipment::ActiveModel {
                    shipment_number: Set(input.shipment_number),
                    status: Set(ShipmentStatus::Draft),
                    notes: Set(input.notes),
                    confirmed_at: Set(None),
                    created_by: Set(ctx.actor_id),
                    created_at: Set(ctx.now()),
                    updated_at: Set(None),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                info!(shipment_id = %shipment.id, shipment_number = %shipment.shipment_number, "Shipment created");
                Ok(shipment)
            })
        })
        .await
    }

    /// Adds a line to a shipment that is still being assembled.
    #[instrument(skip(self, input, ctx), fields(product = %input.product_name))]
    pub async fn add_item(
        &self,
        shipment_id: Uuid,
        input: NewShipmentItem,
        ctx: &OperationContext,
    ) -> Result<shipment_item::Model, ServiceError> {
        input.validate()?;
        let ctx = ctx.clone();

        transaction_scope(&self.db_pool, "add_shipment_item", move |txn| {
            Box::pin(async move {
                let shipment = load_shipment(txn, shipment_id).await?;
                if !shipment.status.accepts_container_changes() {
                    return Err(ServiceError::InvalidOperation(format!(
                        "Cannot add items to shipment with status {}",
                        shipment.status
                    )));
                }

                let unit_volume = input.resolved_unit_volume();
                let item = shipment_item::ActiveModel {
                    shipment_id: Set(shipment.id),
                    product_name: Set(input.product_name),
                    product_sku: Set(input.product_sku),
                    unit_weight: Set(input.unit_weight),
                    unit_volume: Set(unit_volume),
                    unit_length: Set(input.unit_length),
                    unit_width: Set(input.unit_width),
                    unit_height: Set(input.unit_height),
                    quantity_to_ship: Set(input.quantity_to_ship),
                    quantity_packed: Set(0),
                    quantity_remaining: Set(input.quantity_to_ship),
                    packing_status: Set(ItemPackingStatus::Unpacked),
                    created_at: Set(ctx.now()),
                    updated_at: Set(None),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                info!(shipment_id = %shipment.id, item_id = %item.id, quantity = item.quantity_to_ship, "Shipment item added");
                Ok(item)
            })
        })
        .await
    }

    pub async fn get_shipment(&self, shipment_id: Uuid) -> Result<ShipmentDetails, ServiceError> {
        let db = &*self.db_pool;
        let shipment = load_shipment(db, shipment_id).await?;
        let items = shipment_items_in(db, shipment.id).await?;
        Ok(ShipmentDetails { shipment, items })
    }

    pub async fn find_by_number(
        &self,
        shipment_number: &str,
    ) -> Result<shipment::Model, ServiceError> {
        shipment::Entity::find()
            .filter(shipment::Column::ShipmentNumber.eq(shipment_number))
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Shipment {} not found", shipment_number)))
    }

    /// Moves a shipment to `status`. Delivered and cancelled shipments are final.
    #[instrument(skip(self, ctx))]
    pub async fn update_status(
        &self,
        shipment_id: Uuid,
        status: ShipmentStatus,
        ctx: &OperationContext,
    ) -> Result<shipment::Model, ServiceError> {
        let ctx = ctx.clone();
        transaction_scope(&self.db_pool, "update_shipment_status", move |txn| {
            Box::pin(async move {
                let shipment = load_shipment(txn, shipment_id).await?;
                if matches!(
                    shipment.status,
                    ShipmentStatus::Delivered | ShipmentStatus::Cancelled
                ) {
                    return Err(ServiceError::InvalidStatus(format!(
                        "Shipment {} is {} and can no longer change status",
                        shipment.shipment_number, shipment.status
                    )));
                }

                let previous = shipment.status;
                let mut active: shipment::ActiveModel = shipment.into();
                active.status = Set(status);
                active.updated_at = Set(Some(ctx.now()));
                let shipment = active.update(txn).await?;

                info!(shipment_id = %shipment.id, from = %previous, to = %status, "Shipment status updated");
                Ok(shipment)
            })
        })
        .await
    }

    /// Confirms a shipment once every readiness check passes.
    ///
    /// # Errors
    /// `ValidationError` listing every failed check.
    #[instrument(skip(self, ctx))]
    pub async fn confirm_shipment(
        &self,
        shipment_id: Uuid,
        ctx: &OperationContext,
    ) -> Result<shipment::Model, ServiceError> {
        let ctx = ctx.clone();
        transaction_scope(&self.db_pool, "confirm_shipment", move |txn| {
            Box::pin(async move {
                let shipment = load_shipment(txn, shipment_id).await?;
                let items = shipment_items_in(txn, shipment.id).await?;
                let box_count = packing_box::Entity::find()
                    .filter(packing_box::Column::ShipmentId.eq(shipment.id))
                    .count(txn)
                    .await?;

                let check = quantity::validate_shipment_for_confirmation(
                    &shipment,
                    &items,
                    box_count as usize,
                );
                if !check.can_confirm {
                    return Err(ServiceError::ValidationError(check.errors.join("\n")));
                }

                let now = ctx.now();
                let mut active: shipment::ActiveModel = shipment.into();
                active.status = Set(ShipmentStatus::Confirmed);
                active.confirmed_at = Set(Some(now));
                active.updated_at = Set(Some(now));
                let shipment = active.update(txn).await?;

                info!(shipment_id = %shipment.id, "Shipment confirmed");
                Ok(shipment)
            })
        })
        .await
    }

    pub async fn validation_summary(
        &self,
        shipment_id: Uuid,
    ) -> Result<ShipmentValidationSummary, ServiceError> {
        let db = &*self.db_pool;
        let shipment = load_shipment(db, shipment_id).await?;
        let items = shipment_items_in(db, shipment.id).await?;
        let boxes = packing_box::Entity::find()
            .filter(packing_box::Column::ShipmentId.eq(shipment.id))
            .order_by_asc(packing_box::Column::BoxNumber)
            .all(db)
            .await?;
        Ok(quantity::shipment_validation_summary(
            &shipment, &items, &boxes,
        ))
    }
}
