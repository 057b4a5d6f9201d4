use sea_orm_migration::prelude::*;

use super::m20240301_000003_create_shipments_table::Shipments;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ShipmentItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ShipmentItems::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ShipmentItems::ShipmentId).uuid().not_null())
                    .col(ColumnDef::new(ShipmentItems::ProductName).string().not_null())
                    .col(ColumnDef::new(ShipmentItems::ProductSku).string_len(64).null())
                    .col(
                        ColumnDef::new(ShipmentItems::UnitWeight)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(ShipmentItems::UnitVolume)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(ShipmentItems::UnitLength).double().null())
                    .col(ColumnDef::new(ShipmentItems::UnitWidth).double().null())
                    .col(ColumnDef::new(ShipmentItems::UnitHeight).double().null())
                    .col(
                        ColumnDef::new(ShipmentItems::QuantityToShip)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShipmentItems::QuantityPacked)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ShipmentItems::QuantityRemaining)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShipmentItems::PackingStatus)
                            .string_len(32)
                            .not_null()
                            .default("unpacked"),
                    )
                    .col(
                        ColumnDef::new(ShipmentItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShipmentItems::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shipment_items_shipment_id")
                            .from(ShipmentItems::Table, ShipmentItems::ShipmentId)
                            .to(Shipments::Table, Shipments::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ShipmentItems::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ShipmentItems {
    Table,
    Id,
    ShipmentId,
    ProductName,
    ProductSku,
    UnitWeight,
    UnitVolume,
    UnitLength,
    UnitWidth,
    UnitHeight,
    QuantityToShip,
    QuantityPacked,
    QuantityRemaining,
    PackingStatus,
    CreatedAt,
    UpdatedAt,
}
