//! Generic owner-scoped data access.
//!
//! Every table the API exposes belongs to exactly one user through a scoping
//! column. [`Repository`] resolves that owner from an [`ActorContext`], runs
//! the query and maps missing rows to a labelled 404. Entity-specific inserts
//! and updates live next to each entity in `db::goals`, `db::daily_logs` and
//! `db::profiles`.

use std::marker::PhantomData;

use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::auth::actor::ActorContext;
use crate::error::{AppError, AppResult};

pub trait OwnedEntity: for<'r> FromRow<'r, PgRow> + Send + Unpin + 'static {
    const TABLE: &'static str;
    /// Column holding the owning user id.
    const SCOPE_COLUMN: &'static str;
    const ORDER_BY: &'static str;
    /// Singular name used in error messages ("Goal not found").
    const LABEL: &'static str;
}

pub struct Repository<E> {
    db: PgPool,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: OwnedEntity> Repository<E> {
    pub fn new(db: PgPool) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    pub fn db(&self) -> &PgPool {
        &self.db
    }

    pub(crate) fn list_sql() -> String {
        format!(
            "SELECT * FROM {} WHERE {} = $1 ORDER BY {} LIMIT $2",
            E::TABLE,
            E::SCOPE_COLUMN,
            E::ORDER_BY
        )
    }

    pub(crate) fn find_sql() -> String {
        format!(
            "SELECT * FROM {} WHERE id = $1 AND {} = $2",
            E::TABLE,
            E::SCOPE_COLUMN
        )
    }

    pub(crate) fn delete_sql() -> String {
        format!(
            "DELETE FROM {} WHERE id = $1 AND {} = $2",
            E::TABLE,
            E::SCOPE_COLUMN
        )
    }

    pub fn not_found() -> AppError {
        AppError::NotFound(format!("{} not found", E::LABEL))
    }

    /// All rows owned by the actor, in the entity's natural order.
    /// `None` means no limit.
    pub async fn list(&self, actor: &ActorContext, limit: Option<i64>) -> AppResult<Vec<E>> {
        let sql = Self::list_sql();
        let rows = sqlx::query_as::<_, E>(&sql)
            .bind(actor.owner_id())
            .bind(limit)
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }

    pub async fn find(&self, actor: &ActorContext, id: Uuid) -> AppResult<E> {
        let sql = Self::find_sql();
        sqlx::query_as::<_, E>(&sql)
            .bind(id)
            .bind(actor.owner_id())
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(Self::not_found)
    }

    /// Deletes one owned row. `action` names the refused operation for demo
    /// sessions.
    pub async fn delete(&self, actor: &ActorContext, id: Uuid, action: &str) -> AppResult<()> {
        let owner = actor.writable_owner(action)?;
        let sql = Self::delete_sql();
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(owner)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Self::not_found());
        }
        Ok(())
    }
}
