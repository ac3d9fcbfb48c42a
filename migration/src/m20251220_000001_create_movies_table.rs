use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Movies::Table)
                    .if_not_exists()
                    .col(pk_uuid(Movies::Id))
                    .col(string(Movies::ImdbId))
                    .col(string_len(Movies::Title, 500))
                    // Lowercased by the service on write; the title filter matches against it.
                    .col(text(Movies::TitleKey))
                    .col(integer(Movies::Year))
                    .col(string_null(Movies::Rated))
                    .col(string(Movies::Released))
                    .col(string_null(Movies::Runtime))
                    .col(string_null(Movies::Genre))
                    .col(text_null(Movies::Director))
                    .col(text_null(Movies::Writer))
                    .col(text_null(Movies::Actors))
                    .col(text(Movies::Plot))
                    .col(string_len(Movies::Poster, 1000))
                    .col(double_null(Movies::ImdbRating))
                    .col(string_null(Movies::BoxOffice))
                    .col(
                        timestamp_with_time_zone(Movies::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Movies::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Lookup only; duplicates are rejected by the import path, not the schema.
        manager
            .create_index(
                Index::create()
                    .name("idx_movies_imdb_id")
                    .table(Movies::Table)
                    .col(Movies::ImdbId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movies_created_at")
                    .table(Movies::Table)
                    .col(Movies::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Movies::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Movies {
    Table,
    Id,
    ImdbId,
    Title,
    TitleKey,
    Year,
    Rated,
    Released,
    Runtime,
    Genre,
    Director,
    Writer,
    Actors,
    Plot,
    Poster,
    ImdbRating,
    BoxOffice,
    CreatedAt,
    UpdatedAt,
}
