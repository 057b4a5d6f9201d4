use sea_orm_migration::prelude::*;

use super::m20240301_000004_create_shipment_items_table::ShipmentItems;
use super::m20240301_000007_create_packing_boxes_table::PackingBoxes;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PackingBoxItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PackingBoxItems::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PackingBoxItems::PackingBoxId).uuid().not_null())
                    .col(ColumnDef::new(PackingBoxItems::ShipmentItemId).uuid().not_null())
                    .col(ColumnDef::new(PackingBoxItems::Quantity).integer().not_null())
                    .col(
                        ColumnDef::new(PackingBoxItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PackingBoxItems::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_packing_box_items_box_id")
                            .from(PackingBoxItems::Table, PackingBoxItems::PackingBoxId)
                            .to(PackingBoxes::Table, PackingBoxes::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_packing_box_items_shipment_item_id")
                            .from(PackingBoxItems::Table, PackingBoxItems::ShipmentItemId)
                            .to(ShipmentItems::Table, ShipmentItems::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // one row per (box, shipment item); repeated adds merge into it
        manager
            .create_index(
                Index::create()
                    .name("idx_packing_box_items_box_item")
                    .table(PackingBoxItems::Table)
                    .col(PackingBoxItems::PackingBoxId)
                    .col(PackingBoxItems::ShipmentItemId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PackingBoxItems::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum PackingBoxItems {
    Table,
    Id,
    PackingBoxId,
    ShipmentItemId,
    Quantity,
    CreatedAt,
    UpdatedAt,
}
