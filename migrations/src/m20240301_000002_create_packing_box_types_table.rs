use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PackingBoxTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PackingBoxTypes::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PackingBoxTypes::Code)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(PackingBoxTypes::Name).string().not_null())
                    .col(ColumnDef::new(PackingBoxTypes::Length).double().not_null())
                    .col(ColumnDef::new(PackingBoxTypes::Width).double().not_null())
                    .col(ColumnDef::new(PackingBoxTypes::Height).double().not_null())
                    .col(ColumnDef::new(PackingBoxTypes::MaxWeight).double().not_null())
                    .col(ColumnDef::new(PackingBoxTypes::MaxVolume).double().not_null())
                    .col(
                        ColumnDef::new(PackingBoxTypes::UnitCost)
                            .decimal_len(12, 2)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(PackingBoxTypes::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(PackingBoxTypes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PackingBoxTypes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum PackingBoxTypes {
    Table,
    Id,
    Code,
    Name,
    Length,
    Width,
    Height,
    MaxWeight,
    MaxVolume,
    UnitCost,
    IsActive,
    CreatedAt,
}
