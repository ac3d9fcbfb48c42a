use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "movies")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub imdb_id: String,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    #[serde(skip)]
    pub title_key: String,
    pub year: i32,
    pub rated: Option<String>,
    pub released: String,
    pub runtime: Option<String>,
    pub genre: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub director: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub writer: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub actors: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub plot: String,
    pub poster: String,
    pub imdb_rating: Option<f64>,
    pub box_office: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
