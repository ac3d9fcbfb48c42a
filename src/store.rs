use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
    sea_query::{Expr, LikeExpr},
};
use uuid::Uuid;

use crate::{
    entities::movie,
    error::AppResult,
    models::{MovieDraft, MoviePatch, PageRequest},
};

/// Typed access to the `movies` table.
#[derive(Clone)]
pub struct MovieStore {
    db: DatabaseConnection,
}

impl MovieStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// One page of movies, newest first, plus the total matching count.
    pub async fn list(
        &self,
        page: PageRequest,
        title: Option<&str>,
    ) -> AppResult<(Vec<movie::Model>, u64)> {
        let mut query = movie::Entity::find();
        if let Some(needle) = title {
            let pattern = format!("%{}%", escape_like(&title_key(needle)));
            let pattern = LikeExpr::new(pattern).escape(LIKE_ESCAPE);
            query = query.filter(Expr::col(movie::Column::TitleKey).like(pattern));
        }

        let paginator = query
            .order_by_desc(movie::Column::CreatedAt)
            .order_by_desc(movie::Column::Id)
            .paginate(&self.db, page.size);

        let total = paginator.num_items().await?;
        let movies = match page.offset() {
            Some(offset) if offset < total => paginator.fetch_page(page.page - 1).await?,
            _ => Vec::new(),
        };
        Ok((movies, total))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Option<movie::Model>> {
        Ok(movie::Entity::find_by_id(id).one(&self.db).await?)
    }

    pub async fn find_by_imdb_id(&self, imdb_id: &str) -> AppResult<Option<movie::Model>> {
        let found = movie::Entity::find()
            .filter(movie::Column::ImdbId.eq(imdb_id))
            .one(&self.db)
            .await?;
        Ok(found)
    }

    pub async fn insert(&self, draft: MovieDraft) -> AppResult<movie::Model> {
        let now = Utc::now();
        let model = movie::ActiveModel {
            id: Set(Uuid::now_v7()),
            imdb_id: Set(draft.imdb_id),
            title_key: Set(title_key(&draft.title)),
            title: Set(draft.title),
            year: Set(draft.year),
            rated: Set(draft.rated),
            released: Set(draft.released),
            runtime: Set(draft.runtime),
            genre: Set(draft.genre),
            director: Set(draft.director),
            writer: Set(draft.writer),
            actors: Set(draft.actors),
            plot: Set(draft.plot),
            poster: Set(draft.poster),
            imdb_rating: Set(draft.imdb_rating),
            box_office: Set(draft.box_office),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(model.insert(&self.db).await?)
    }

    /// Applies `patch` to the movie with `id`. `None` when no such movie.
    pub async fn update(&self, id: Uuid, patch: MoviePatch) -> AppResult<Option<movie::Model>> {
        let Some(existing) = self.get(id).await? else {
            return Ok(None);
        };

        let mut model: movie::ActiveModel = existing.into();
        if let Some(v) = patch.imdb_id {
            model.imdb_id = Set(v);
        }
        if let Some(v) = patch.title {
            model.title_key = Set(title_key(&v));
            model.title = Set(v);
        }
        if let Some(v) = patch.year {
            model.year = Set(v);
        }
        if let Some(v) = patch.rated {
            model.rated = Set(v);
        }
        if let Some(v) = patch.released {
            model.released = Set(v);
        }
        if let Some(v) = patch.runtime {
            model.runtime = Set(v);
        }
        if let Some(v) = patch.genre {
            model.genre = Set(v);
        }
        if let Some(v) = patch.director {
            model.director = Set(v);
        }
        if let Some(v) = patch.writer {
            model.writer = Set(v);
        }
        if let Some(v) = patch.actors {
            model.actors = Set(v);
        }
        if let Some(v) = patch.plot {
            model.plot = Set(v);
        }
        if let Some(v) = patch.poster {
            model.poster = Set(v);
        }
        if let Some(v) = patch.imdb_rating {
            model.imdb_rating = Set(v);
        }
        if let Some(v) = patch.box_office {
            model.box_office = Set(v);
        }
        model.updated_at = Set(Utc::now());

        match model.update(&self.db).await {
            Ok(updated) => Ok(Some(updated)),
            // Deleted between the read and the write.
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Returns whether a row was removed.
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let res = movie::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }
}

const LIKE_ESCAPE: char = '!';

/// Case-folded title. SQLite's `LOWER()` only folds ASCII, so folding happens
/// here for both the stored key and the search needle.
fn title_key(title: &str) -> String {
    title.to_lowercase()
}

fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            out.push(LIKE_ESCAPE);
        }
        out.push(c);
    }
    out
}
