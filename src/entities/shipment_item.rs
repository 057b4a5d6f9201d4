use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

/// How much of a shipment line has been placed into packing boxes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ItemPackingStatus {
    #[sea_orm(string_value = "unpacked")]
    Unpacked,
    #[sea_orm(string_value = "partially_packed")]
    PartiallyPacked,
    #[sea_orm(string_value = "fully_packed")]
    FullyPacked,
}

impl ItemPackingStatus {
    /// Status implied by the packed quantity of a line.
    pub fn for_quantities(quantity_packed: i32, quantity_to_ship: i32) -> Self {
        if quantity_packed <= 0 {
            ItemPackingStatus::Unpacked
        } else if quantity_packed >= quantity_to_ship {
            ItemPackingStatus::FullyPacked
        } else {
            ItemPackingStatus::PartiallyPacked
        }
    }
}

/// A shipment line with the product's weight/dimension snapshot.
///
/// `unit_weight` is kg per unit and `unit_volume` m³ per unit. The
/// optional per-axis dimensions (cm) are only needed for box fit math.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shipment_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub shipment_id: Uuid,
    pub product_name: String,
    pub product_sku: Option<String>,
    pub unit_weight: f64,
    pub unit_volume: f64,
    pub unit_length: Option<f64>,
    pub unit_width: Option<f64>,
    pub unit_height: Option<f64>,
    pub quantity_to_ship: i32,
    pub quantity_packed: i32,
    pub quantity_remaining: i32,
    pub packing_status: ItemPackingStatus,
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
    #[sea_orm(has_many = "super::packing_box_item::Entity")]
    BoxItems,
    #[sea_orm(has_many = "super::shipment_container_item::Entity")]
    ContainerItems,
}

impl Related<super::shipment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shipment.def()
    }
}

impl Related<super::packing_box_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BoxItems.def()
    }
}

impl Related<super::shipment_container_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ContainerItems.def()
    }
}

impl Model {
    pub fn is_fully_packed(&self) -> bool {
        self.packing_status == ItemPackingStatus::FullyPacked
    }

    /// Weight of everything still to ship on this line.
    pub fn total_weight(&self) -> f64 {
        self.unit_weight * f64::from(self.quantity_to_ship)
    }

    pub fn total_volume(&self) -> f64 {
        self.unit_volume * f64::from(self.quantity_to_ship)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packing_status_follows_quantities() {
        assert_eq!(ItemPackingStatus::for_quantities(0, 10), ItemPackingStatus::Unpacked);
        assert_eq!(
            ItemPackingStatus::for_quantities(4, 10),
            ItemPackingStatus::PartiallyPacked
        );
        assert_eq!(ItemPackingStatus::for_quantities(10, 10), ItemPackingStatus::FullyPacked);
    }

    #[test]
    fn status_renders_snake_case() {
        assert_eq!(ItemPackingStatus::PartiallyPacked.to_string(), "partially_packed");
    }
}
