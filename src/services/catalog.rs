//! Container and box type catalog.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

use crate::context::OperationContext;
use crate::db::transaction_scope;
use crate::entities::{container_type, packing_box_type};
use crate::errors::ServiceError;
use crate::services::packaging::calculate_cbm;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewContainerType {
    #[validate(length(min = 1, max = 16))]
    pub type_code: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(range(min = 1.0))]
    pub length: f64,
    #[validate(range(min = 1.0))]
    pub width: f64,
    #[validate(range(min = 1.0))]
    pub height: f64,
    #[validate(range(min = 1.0))]
    pub max_weight: f64,
    #[validate(range(min = 0.001))]
    pub internal_volume: f64,
    pub estimated_cost: Option<Decimal>,
}

/// A box type. `max_volume` defaults to the cubic volume of the dimensions.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewBoxType {
    #[validate(length(min = 1, max = 16))]
    pub code: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(range(min = 0.1))]
    pub length: f64,
    #[validate(range(min = 0.1))]
    pub width: f64,
    #[validate(range(min = 0.1))]
    pub height: f64,
    #[validate(range(min = 0.01))]
    pub max_weight: f64,
    #[validate(range(min = 0.0))]
    pub max_volume: Option<f64>,
    pub unit_cost: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub container_types_created: usize,
    pub box_types_created: usize,
}

fn standard_container_types() -> Vec<NewContainerType> {
    let entry = |code: &str,
                name: &str,
                dims: (f64, f64, f64),
                max_weight: f64,
                volume: f64,
                cost: i64| {
        NewContainerType {
            type_code: code.to_string(),
            name: name.to_string(),
            length: dims.0,
            width: dims.1,
            height: dims.2,
            max_weight,
            internal_volume: volume,
            estimated_cost: Some(Decimal::new(cost, 0)),
        }
    };
    vec![
        entry("20GP", "20ft General Purpose", (589.0, 235.0, 239.0), 28_200.0, 33.2, 1500),
        entry("40GP", "40ft General Purpose", (1203.0, 235.0, 239.0), 26_700.0, 67.7, 2500),
        entry("40HC", "40ft High Cube", (1203.0, 235.0, 269.0), 26_500.0, 76.3, 2800),
    ]
}

fn standard_box_types() -> Vec<NewBoxType> {
    let entry = |code: &str, name: &str, dims: (f64, f64, f64), max_weight: f64, cents: i64| NewBoxType {
        code: code.to_string(),
        name: name.to_string(),
        length: dims.0,
        width: dims.1,
        height: dims.2,
        max_weight,
        max_volume: None,
        unit_cost: Some(Decimal::new(cents, 2)),
    };
    vec![
        entry("SMALL", "Small carton", (30.0, 20.0, 20.0), 10.0, 120),
        entry("MEDIUM", "Medium carton", (40.0, 30.0, 30.0), 20.0, 180),
        entry("LARGE", "Large carton", (60.0, 40.0, 40.0), 30.0, 250),
    ]
}

pub(crate) async fn find_container_type_by_code_in<C: ConnectionTrait>(
    db: &C,
    type_code: &str,
) -> Result<Option<container_type::Model>, ServiceError> {
    Ok(container_type::Entity::find()
        .filter(container_type::Column::TypeCode.eq(type_code))
        .one(db)
        .await?)
}

async fn insert_container_type<C: ConnectionTrait>(
    db: &C,
    input: NewContainerType,
    ctx: &OperationContext,
) -> Result<container_type::Model, ServiceError> {
    if find_container_type_by_code_in(db, &input.type_code)
        .await?
        .is_some()
    {
        return Err(ServiceError::Conflict(format!(
            "Container type {} already exists",
            input.type_code
        )));
    }

    let model = container_type::ActiveModel {
        type_code: Set(input.type_code),
        name: Set(input.name),
        length: Set(input.length),
        width: Set(input.width),
        height: Set(input.height),
        max_weight: Set(input.max_weight),
        internal_volume: Set(input.internal_volume),
        estimated_cost: Set(input.estimated_cost),
        is_active: Set(true),
        created_at: Set(ctx.now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(model)
}

async fn insert_box_type<C: ConnectionTrait>(
    db: &C,
    input: NewBoxType,
    ctx: &OperationContext,
) -> Result<packing_box_type::Model, ServiceError> {
    let taken = packing_box_type::Entity::find()
        .filter(packing_box_type::Column::Code.eq(input.code.clone()))
        .count(db)
        .await?;
    if taken > 0 {
        return Err(ServiceError::Conflict(format!(
            "Box type {} already exists",
            input.code
        )));
    }

    let max_volume = input
        .max_volume
        .unwrap_or_else(|| calculate_cbm(input.length, input.width, input.height));
    let model = packing_box_type::ActiveModel {
        code: Set(input.code),
        name: Set(input.name),
        length: Set(input.length),
        width: Set(input.width),
        height: Set(input.height),
        max_weight: Set(input.max_weight),
        max_volume: Set(max_volume),
        unit_cost: Set(input.unit_cost),
        is_active: Set(true),
        created_at: Set(ctx.now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(model)
}

/// Service for the container and box type catalogs.
#[derive(Clone)]
pub struct CatalogService {
    db_pool: Arc<DatabaseConnection>,
}

impl CatalogService {
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, input, ctx), fields(type_code = %input.type_code))]
    pub async fn create_container_type(
        &self,
        input: NewContainerType,
        ctx: &OperationContext,
    ) -> Result<container_type::Model, ServiceError> {
        input.validate()?;
        let ctx = ctx.clone();
        let model = transaction_scope(&self.db_pool, "create_container_type", move |txn| {
            Box::pin(async move { insert_container_type(txn, input, &ctx).await })
        })
        .await?;
        info!(container_type_id = %model.id, "Container type created");
        Ok(model)
    }

    #[instrument(skip(self, input, ctx), fields(code = %input.code))]
    pub async fn create_box_type(
        &self,
        input: NewBoxType,
        ctx: &OperationContext,
    ) -> Result<packing_box_type::Model, ServiceError> {
        input.validate()?;
        let ctx = ctx.clone();
        let model = transaction_scope(&self.db_pool, "create_box_type", move |txn| {
            Box::pin(async move { insert_box_type(txn, input, &ctx).await })
        })
        .await?;
        info!(box_type_id = %model.id, "Box type created");
        Ok(model)
    }

    /// Active container types, smallest internal volume first.
    pub async fn active_container_types(&self) -> Result<Vec<container_type::Model>, ServiceError> {
        Ok(container_type::Entity::find()
            .filter(container_type::Column::IsActive.eq(true))
            .order_by_asc(container_type::Column::InternalVolume)
            .all(&*self.db_pool)
            .await?)
    }

    pub async fn find_container_type_by_code(
        &self,
        type_code: &str,
    ) -> Result<container_type::Model, ServiceError> {
        find_container_type_by_code_in(&*self.db_pool, type_code)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Container type {} not found", type_code)))
    }

    /// Inserts the standard 20GP/40GP/40HC containers and small/medium/large
    /// cartons. Codes that already exist are left untouched.
    #[instrument(skip(self, ctx))]
    pub async fn seed_standard_types(
        &self,
        ctx: &OperationContext,
    ) -> Result<SeedReport, ServiceError> {
        let ctx = ctx.clone();
        let report = transaction_scope(&self.db_pool, "seed_standard_types", move |txn| {
            Box::pin(async move {
                let mut report = SeedReport::default();
                for input in standard_container_types() {
                    if find_container_type_by_code_in(txn, &input.type_code)
                        .await?
                        .is_none()
                    {
                        insert_container_type(txn, input, &ctx).await?;
                        report.container_types_created += 1;
                    }
                }
                for input in standard_box_types() {
                    let exists = packing_box_type::Entity::find()
                        .filter(packing_box_type::Column::Code.eq(input.code.clone()))
                        .count(txn)
                        .await?
                        > 0;
                    if !exists {
                        insert_box_type(txn, input, &ctx).await?;
                        report.box_types_created += 1;
                    }
                }
                Ok(report)
            })
        })
        .await?;

        info!(
            container_types = report.container_types_created,
            box_types = report.box_types_created,
            "Standard catalog seeded"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_types_pass_validation() {
        for input in standard_container_types() {
            assert!(input.validate().is_ok(), "{}", input.type_code);
        }
        for input in standard_box_types() {
            assert!(input.validate().is_ok(), "{}", input.code);
        }
    }

    #[test]
    fn high_cube_is_taller_than_general_purpose() {
        let types = standard_container_types();
        let gp = types.iter().find(|t| t.type_code == "40GP").unwrap();
        let hc = types.iter().find(|t| t.type_code == "40HC").unwrap();
        assert!(hc.height > gp.height);
        assert!(hc.internal_volume > gp.internal_volume);
    }

    #[test]
    fn zero_length_box_type_is_rejected() {
        let mut input = standard_box_types().remove(0);
        input.length = 0.0;
        assert!(input.validate().is_err());
    }
}
