pub use sea_orm_migration::prelude::*;

mod m20240301_000001_create_container_types_table;
mod m20240301_000002_create_packing_box_types_table;
mod m20240301_000003_create_shipments_table;
mod m20240301_000004_create_shipment_items_table;
mod m20240301_000005_create_shipment_containers_table;
mod m20240301_000006_create_shipment_container_items_table;
mod m20240301_000007_create_packing_boxes_table;
mod m20240301_000008_create_packing_box_items_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_container_types_table::Migration),
            Box::new(m20240301_000002_create_packing_box_types_table::Migration),
            Box::new(m20240301_000003_create_shipments_table::Migration),
            Box::new(m20240301_000004_create_shipment_items_table::Migration),
            Box::new(m20240301_000005_create_shipment_containers_table::Migration),
            Box::new(m20240301_000006_create_shipment_container_items_table::Migration),
            Box::new(m20240301_000007_create_packing_boxes_table::Migration),
            Box::new(m20240301_000008_create_packing_box_items_table::Migration),
        ]
    }
}
