#![allow(dead_code)]

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use sea_orm::EntityTrait;
use shipment_capacity::{
    config::CapacityConfig,
    context::FixedClock,
    db::{self, DbConfig, DbPool},
    entities::{container_type, shipment, shipment_item},
    services::{
        shipments::{NewShipment, NewShipmentItem},
        CapacityServices,
    },
    OperationContext,
};
use uuid::Uuid;

/// Services over a fresh, migrated and seeded in-memory SQLite database.
pub struct TestEnv {
    pub db: Arc<DbPool>,
    pub services: CapacityServices,
    pub ctx: OperationContext,
    pub actor: Uuid,
}

impl TestEnv {
    pub async fn new() -> Self {
        let pool = db::establish_connection_with_config(&DbConfig::in_memory())
            .await
            .expect("connect to in-memory sqlite");
        db::run_migrations(&pool).await.expect("run migrations");
        let db = Arc::new(pool);

        let actor = Uuid::new_v4();
        let instant = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let ctx = OperationContext::for_actor(actor).with_clock(Arc::new(FixedClock(instant)));

        let services = CapacityServices::new(db.clone(), CapacityConfig::default());
        services
            .catalog
            .seed_standard_types(&ctx)
            .await
            .expect("seed standard types");

        Self {
            db,
            services,
            ctx,
            actor,
        }
    }

    pub async fn shipment(&self, number: &str) -> shipment::Model {
        self.services
            .shipments
            .create_shipment(
                NewShipment {
                    shipment_number: number.to_string(),
                    notes: None,
                },
                &self.ctx,
            )
            .await
            .expect("create shipment")
    }

    pub async fn item(
        &self,
        shipment_id: Uuid,
        product_name: &str,
        unit_weight: f64,
        unit_volume: f64,
        quantity_to_ship: i32,
    ) -> shipment_item::Model {
        self.services
            .shipments
            .add_item(
                shipment_id,
                NewShipmentItem {
                    product_name: product_name.to_string(),
                    product_sku: None,
                    unit_weight,
                    unit_volume: Some(unit_volume),
                    unit_length: None,
                    unit_width: None,
                    unit_height: None,
                    quantity_to_ship,
                },
                &self.ctx,
            )
            .await
            .expect("add shipment item")
    }

    /// Current row of a shipment item.
    pub async fn item_state(&self, item_id: Uuid) -> shipment_item::Model {
        shipment_item::Entity::find_by_id(item_id)
            .one(&*self.db)
            .await
            .expect("query item")
            .expect("item exists")
    }

    pub async fn container_type(&self, code: &str) -> container_type::Model {
        self.services
            .catalog
            .find_container_type_by_code(code)
            .await
            .expect("seeded container type")
    }
}
