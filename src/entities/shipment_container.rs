use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

/// Container lifecycle: draft -> packed -> sealed -> in_transit -> delivered.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ContainerStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "packed")]
    Packed,
    #[sea_orm(string_value = "sealed")]
    Sealed,
    #[sea_orm(string_value = "in_transit")]
    InTransit,
    #[sea_orm(string_value = "delivered")]
    Delivered,
}

impl ContainerStatus {
    /// Draft and packed containers still accept cargo.
    pub fn is_open(&self) -> bool {
        matches!(self, ContainerStatus::Draft | ContainerStatus::Packed)
    }
}

/// A physical container instance attached to a shipment.
///
/// `max_weight` and `max_volume` are snapshotted from the container type at
/// creation; `current_*` are running totals of the loaded cargo.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shipment_containers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub shipment_id: Uuid,
    pub container_type_id: Uuid,
    #[sea_orm(unique)]
    pub container_number: String,
    pub max_weight: f64,
    pub max_volume: f64,
    pub current_weight: f64,
    pub current_volume: f64,
    pub status: ContainerStatus,
    pub seal_number: Option<String>,
    pub sealed_at: Option<DateTime<Utc>>,
    pub sealed_by: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::shipment::Entity",
        from = "Column::ShipmentId",
        to = "super::shipment::Column::Id",
        on_delete = "Cascade"
    )]
    Shipment,
    #[sea_orm(
        belongs_to = "super::container_type::Entity",
        from = "Column::ContainerTypeId",
        to = "super::container_type::Column::Id"
    )]
    ContainerType,
    #[sea_orm(has_many = "super::shipment_container_item::Entity")]
    Items,
}

impl Related<super::shipment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shipment.def()
    }
}

impl Related<super::container_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ContainerType.def()
    }
}

impl Related<super::shipment_container_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Model {
    pub fn remaining_weight(&self) -> f64 {
        (self.max_weight - self.current_weight).max(0.0)
    }

    pub fn remaining_volume(&self) -> f64 {
        (self.max_volume - self.current_volume).max(0.0)
    }

    /// Weight utilization in percent; 0 when the container has no weight limit.
    pub fn weight_utilization(&self) -> f64 {
        if self.max_weight > 0.0 {
            self.current_weight / self.max_weight * 100.0
        } else {
            0.0
        }
    }

    pub fn volume_utilization(&self) -> f64 {
        if self.max_volume > 0.0 {
            self.current_volume / self.max_volume * 100.0
        } else {
            0.0
        }
    }

    pub fn can_fit(&self, weight: f64, volume: f64) -> bool {
        weight <= self.remaining_weight() && volume <= self.remaining_volume()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        if insert {
            if let ActiveValue::NotSet = active_model.id {
                active_model.id = Set(Uuid::new_v4());
            }
        }
        Ok(active_model)
    }
}
