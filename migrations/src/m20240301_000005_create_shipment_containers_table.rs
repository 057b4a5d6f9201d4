use sea_orm_migration::prelude::*;

use super::m20240301_000001_create_container_types_table::ContainerTypes;
use super::m20240301_000003_create_shipments_table::Shipments;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ShipmentContainers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ShipmentContainers::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ShipmentContainers::ShipmentId).uuid().not_null())
                    .col(
                        ColumnDef::new(ShipmentContainers::ContainerTypeId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShipmentContainers::ContainerNumber)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ShipmentContainers::MaxWeight).double().not_null())
                    .col(ColumnDef::new(ShipmentContainers::MaxVolume).double().not_null())
                    .col(
                        ColumnDef::new(ShipmentContainers::CurrentWeight)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(ShipmentContainers::CurrentVolume)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(ShipmentContainers::Status)
                            .string_len(32)
                            .not_null()
                            .default("draft"),
                    )
                    .col(
                        ColumnDef::new(ShipmentContainers::SealNumber)
                            .string_len(64)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ShipmentContainers::SealedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(ShipmentContainers::SealedBy).uuid().null())
                    .col(ColumnDef::new(ShipmentContainers::CreatedBy).uuid().null())
                    .col(
                        ColumnDef::new(ShipmentContainers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShipmentContainers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shipment_containers_shipment_id")
                            .from(ShipmentContainers::Table, ShipmentContainers::ShipmentId)
                            .to(Shipments::Table, Shipments::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shipment_containers_container_type_id")
                            .from(ShipmentContainers::Table, ShipmentContainers::ContainerTypeId)
                            .to(ContainerTypes::Table, ContainerTypes::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_shipment_containers_seal_number")
                    .table(ShipmentContainers::Table)
                    .col(ShipmentContainers::SealNumber)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ShipmentContainers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ShipmentContainers {
    Table,
    Id,
    ShipmentId,
    ContainerTypeId,
    ContainerNumber,
    MaxWeight,
    MaxVolume,
    CurrentWeight,
    CurrentVolume,
    Status,
    SealNumber,
    SealedAt,
    SealedBy,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}
