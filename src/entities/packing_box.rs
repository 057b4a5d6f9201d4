use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Physical kind of a packing unit.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BoxKind {
    #[sea_orm(string_value = "carton")]
    Carton,
    #[sea_orm(string_value = "pallet")]
    Pallet,
    #[sea_orm(string_value = "crate")]
    Crate,
    #[sea_orm(string_value = "bag")]
    Bag,
    #[sea_orm(string_value = "drum")]
    Drum,
    #[sea_orm(string_value = "other")]
    Other,
}

/// Box lifecycle: empty -> packing -> sealed -> shipped.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BoxStatus {
    #[sea_orm(string_value = "empty")]
    Empty,
    #[sea_orm(string_value = "packing")]
    Packing,
    #[sea_orm(string_value = "sealed")]
    Sealed,
    #[sea_orm(string_value = "shipped")]
    Shipped,
}

impl BoxStatus {
    /// Sealed and shipped boxes can no longer change contents.
    pub fn is_locked(&self) -> bool {
        matches!(self, BoxStatus::Sealed | BoxStatus::Shipped)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "packing_boxes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub shipment_id: Uuid,
    pub shipment_container_id: Option<Uuid>,
    pub packing_box_type_id: Option<Uuid>,
    pub box_number: i32,
    pub box_label: String,
    pub box_kind: BoxKind,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub gross_weight: Option<f64>,
    pub net_weight: f64,
    pub volume: Option<f64>,
    pub total_items: i32,
    pub total_quantity: i32,
    pub packing_status: BoxStatus,
    pub sealed_at: Option<DateTime<Utc>>,
    pub sealed_by: Option<Uuid>,
    pub notes: Option<String>,
    pub contents_description: Option<String>,
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
        belongs_to = "super::packing_box_type::Entity",
        from = "Column::PackingBoxTypeId",
        to = "super::packing_box_type::Column::Id",
        on_delete = "SetNull"
    )]
    BoxType,
    #[sea_orm(has_many = "super::packing_box_item::Entity")]
    Items,
}

impl Related<super::shipment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shipment.def()
    }
}

impl Related<super::packing_box_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BoxType.def()
    }
}

impl Related<super::packing_box_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Model {
    pub fn is_sealed(&self) -> bool {
        self.packing_status == BoxStatus::Sealed
    }

    pub fn has_items(&self) -> bool {
        self.total_quantity > 0
    }

    /// Sealing requires an open box in `packing` with at least one unit.
    pub fn can_be_sealed(&self) -> bool {
        self.packing_status == BoxStatus::Packing && self.has_items()
    }
}

/// Default label for a box: `BOX-001`, `BOX-002`, ...
pub fn default_box_label(box_number: i32) -> String {
    format!("BOX-{:03}", box_number)
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn labels_are_zero_padded() {
        assert_eq!(default_box_label(1), "BOX-001");
        assert_eq!(default_box_label(42), "BOX-042");
        assert_eq!(default_box_label(1234), "BOX-1234");
    }

    #[test]
    fn box_kind_parses_from_config_strings() {
        assert_eq!(BoxKind::from_str("pallet").unwrap(), BoxKind::Pallet);
        assert!(BoxKind::from_str("barrel").is_err());
    }

    #[test]
    fn sealed_and_shipped_are_locked() {
        assert!(BoxStatus::Sealed.is_locked());
        assert!(BoxStatus::Shipped.is_locked());
        assert!(!BoxStatus::Packing.is_locked());
        assert!(!BoxStatus::Empty.is_locked());
    }
}
