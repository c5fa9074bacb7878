//! Create friendships table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Friendship::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Friendship::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Friendship::SenderId).big_integer().not_null())
                    .col(ColumnDef::new(Friendship::ReceiverId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Friendship::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Friendship::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Friendship::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Friendship::Version).integer().not_null().default(1))
                    .check(Expr::col(Friendship::SenderId).ne(Expr::col(Friendship::ReceiverId)))
                    .check(Expr::col(Friendship::Status).is_in(["pending", "accepted", "blocked"]))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_friendships_sender")
                            .from(Friendship::Table, Friendship::SenderId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_friendships_receiver")
                            .from(Friendship::Table, Friendship::ReceiverId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // At most one row per unordered pair, whichever side sent it
        manager
            .get_connection()
            .execute_unprepared(
                r"
                CREATE UNIQUE INDEX IF NOT EXISTS idx_friendships_pair
                ON friendships (LEAST(sender_id, receiver_id), GREATEST(sender_id, receiver_id));
                ",
            )
            .await?;

        // Index: (receiver_id, status) for received pending requests
        manager
            .create_index(
                Index::create()
                    .name("idx_friendships_receiver_status")
                    .table(Friendship::Table)
                    .col(Friendship::ReceiverId)
                    .col(Friendship::Status)
                    .to_owned(),
            )
            .await?;

        // Index: (sender_id, status) for sent pending requests
        manager
            .create_index(
                Index::create()
                    .name("idx_friendships_sender_status")
                    .table(Friendship::Table)
                    .col(Friendship::SenderId)
                    .col(Friendship::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Friendship::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Friendship {
    #[iden = "friendships"]
    Table,
    Id,
    SenderId,
    ReceiverId,
    Status,
    CreatedAt,
    UpdatedAt,
    Version,
}

#[derive(Iden)]
enum User {
    #[iden = "users"]
    Table,
    Id,
}
