use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Matches::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Matches::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Matches::UserId).string().not_null())
                    .col(ColumnDef::new(Matches::OtherUserId).string().not_null())
                    .col(ColumnDef::new(Matches::PairLow).string().not_null())
                    .col(ColumnDef::new(Matches::PairHigh).string().not_null())
                    .col(
                        ColumnDef::new(Matches::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // (A,B) and (B,A) normalize to the same key.
        manager
            .create_index(
                Index::create()
                    .name("ux_matches_pair")
                    .table(Matches::Table)
                    .col(Matches::PairLow)
                    .col(Matches::PairHigh)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_matches_user_id")
                    .table(Matches::Table)
                    .col(Matches::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_matches_other_user_id")
                    .table(Matches::Table)
                    .col(Matches::OtherUserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Matches::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Matches {
    Table,
    Id,
    UserId,
    OtherUserId,
    PairLow,
    PairHigh,
    CreatedAt,
}
