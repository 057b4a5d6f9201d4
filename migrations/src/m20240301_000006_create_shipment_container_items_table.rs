use sea_orm_migration::prelude::*;

use super::m20240301_000004_create_shipment_items_table::ShipmentItems;
use super::m20240301_000005_create_shipment_containers_table::ShipmentContainers;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ShipmentContainerItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ShipmentContainerItems::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShipmentContainerItems::ShipmentContainerId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShipmentContainerItems::ShipmentItemId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShipmentContainerItems::Quantity)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShipmentContainerItems::UnitWeight)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShipmentContainerItems::TotalWeight)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShipmentContainerItems::UnitVolume)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShipmentContainerItems::TotalVolume)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShipmentContainerItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_container_items_container_id")
                            .from(
                                ShipmentContainerItems::Table,
                                ShipmentContainerItems::ShipmentContainerId,
                            )
                            .to(ShipmentContainers::Table, ShipmentContainers::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_container_items_shipment_item_id")
                            .from(
                                ShipmentContainerItems::Table,
                                ShipmentContainerItems::ShipmentItemId,
                            )
                            .to(ShipmentItems::Table, ShipmentItems::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_container_items_container_item")
                    .table(ShipmentContainerItems::Table)
                    .col(ShipmentContainerItems::ShipmentContainerId)
                    .col(ShipmentContainerItems::ShipmentItemId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ShipmentContainerItems::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ShipmentContainerItems {
    Table,
    Id,
    ShipmentContainerId,
    ShipmentItemId,
    Quantity,
    UnitWeight,
    TotalWeight,
    UnitVolume,
    TotalVolume,
    CreatedAt,
}
