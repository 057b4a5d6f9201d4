use sea_orm_migration::prelude::*;

use super::m20240301_000002_create_packing_box_types_table::PackingBoxTypes;
use super::m20240301_000003_create_shipments_table::Shipments;
use super::m20240301_000005_create_shipment_containers_table::ShipmentContainers;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PackingBoxes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PackingBoxes::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PackingBoxes::ShipmentId).uuid().not_null())
                    .col(ColumnDef::new(PackingBoxes::ShipmentContainerId).uuid().null())
                    .col(ColumnDef::new(PackingBoxes::PackingBoxTypeId).uuid().null())
                    .col(ColumnDef::new(PackingBoxes::BoxNumber).integer().not_null())
                    .col(ColumnDef::new(PackingBoxes::BoxLabel).string_len(64).not_null())
                    .col(
                        ColumnDef::new(PackingBoxes::BoxKind)
                            .string_len(32)
                            .not_null()
                            .default("carton"),
                    )
                    .col(ColumnDef::new(PackingBoxes::Length).double().null())
                    .col(ColumnDef::new(PackingBoxes::Width).double().null())
                    .col(ColumnDef::new(PackingBoxes::Height).double().null())
                    .col(ColumnDef::new(PackingBoxes::GrossWeight).double().null())
                    .col(
                        ColumnDef::new(PackingBoxes::NetWeight)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(PackingBoxes::Volume).double().null())
                    .col(
                        ColumnDef::new(PackingBoxes::TotalItems)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PackingBoxes::TotalQuantity)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PackingBoxes::PackingStatus)
                            .string_len(32)
                            .not_null()
                            .default("empty"),
                    )
                    .col(
                        ColumnDef::new(PackingBoxes::SealedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(PackingBoxes::SealedBy).uuid().null())
                    .col(ColumnDef::new(PackingBoxes::Notes).text().null())
                    .col(ColumnDef::new(PackingBoxes::ContentsDescription).text().null())
                    .col(ColumnDef::new(PackingBoxes::CreatedBy).uuid().null())
                    .col(
                        ColumnDef::new(PackingBoxes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PackingBoxes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_packing_boxes_shipment_id")
                            .from(PackingBoxes::Table, PackingBoxes::ShipmentId)
                            .to(Shipments::Table, Shipments::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_packing_boxes_container_id")
                            .from(PackingBoxes::Table, PackingBoxes::ShipmentContainerId)
                            .to(ShipmentContainers::Table, ShipmentContainers::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_packing_boxes_box_type_id")
                            .from(PackingBoxes::Table, PackingBoxes::PackingBoxTypeId)
                            .to(PackingBoxTypes::Table, PackingBoxTypes::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_packing_boxes_shipment_box_number")
                    .table(PackingBoxes::Table)
                    .col(PackingBoxes::ShipmentId)
                    .col(PackingBoxes::BoxNumber)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PackingBoxes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum PackingBoxes {
    Table,
    Id,
    ShipmentId,
    ShipmentContainerId,
    PackingBoxTypeId,
    BoxNumber,
    BoxLabel,
    BoxKind,
    Length,
    Width,
    Height,
    GrossWeight,
    NetWeight,
    Volume,
    TotalItems,
    TotalQuantity,
    PackingStatus,
    SealedAt,
    SealedBy,
    Notes,
    ContentsDescription,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}
