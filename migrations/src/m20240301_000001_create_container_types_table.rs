use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ContainerTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ContainerTypes::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContainerTypes::TypeCode)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ContainerTypes::Name).string().not_null())
                    .col(ColumnDef::new(ContainerTypes::Length).double().not_null())
                    .col(ColumnDef::new(ContainerTypes::Width).double().not_null())
                    .col(ColumnDef::new(ContainerTypes::Height).double().not_null())
                    .col(ColumnDef::new(ContainerTypes::MaxWeight).double().not_null())
                    .col(
                        ColumnDef::new(ContainerTypes::InternalVolume)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContainerTypes::EstimatedCost)
                            .decimal_len(12, 2)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ContainerTypes::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ContainerTypes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ContainerTypes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ContainerTypes {
    Table,
    Id,
    TypeCode,
    Name,
    Length,
    Width,
    Height,
    MaxWeight,
    InternalVolume,
    EstimatedCost,
    IsActive,
    CreatedAt,
}
