use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Quantity of a shipment line placed in a packing box. Unique per (box, item).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "packing_box_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub packing_box_id: Uuid,
    pub shipment_item_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::packing_box::Entity",
        from = "Column::PackingBoxId",
        to = "super::packing_box::Column::Id",
        on_delete = "Cascade"
    )]
    PackingBox,
    #[sea_orm(
        belongs_to = "super::shipment_item::Entity",
        from = "Column::ShipmentItemId",
        to = "super::shipment_item::Column::Id",
        on_delete = "Cascade"
    )]
    ShipmentItem,
}

impl Related<super::packing_box::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PackingBox.def()
    }
}

impl Related<super::shipment_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShipmentItem.def()
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
