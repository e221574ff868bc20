use uuid::Uuid;

use crate::auth::actor::ActorContext;
use crate::db::repository::{OwnedEntity, Repository};
use crate::error::AppResult;
use crate::models::profile::{Profile, UpdateProfileRequest};

impl OwnedEntity for Profile {
    const TABLE: &'static str = "profiles";
    const SCOPE_COLUMN: &'static str = "id";
    const ORDER_BY: &'static str = "created_at DESC";
    const LABEL: &'static str = "Profile";
}

/// Creates the profile row that accompanies every account.
pub async fn insert_profile<'e, X>(
    executor: X,
    user_id: Uuid,
    email: &str,
    username: Option<&str>,
    is_demo: bool,
) -> Result<(), sqlx::Error>
where
    X: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO profiles (id, email, username, is_demo)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(email)
    .bind(username)
    .bind(is_demo)
    .execute(executor)
    .await?;
    Ok(())
}

impl Repository<Profile> {
    /// The actor's own profile. A profile's id is its owner's id.
    pub async fn get(&self, actor: &ActorContext) -> AppResult<Profile> {
        self.find(actor, actor.owner_id()).await
    }

    pub async fn update(
        &self,
        actor: &ActorContext,
        body: &UpdateProfileRequest,
    ) -> AppResult<Profile> {
        let owner = actor.writable_owner("update profile")?;

        sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles SET
                username = $2,
                birthday = $3,
                height_cm = $4,
                weight_kg = $5,
                gender = $6,
                fitness_level = $7,
                onboarding_complete = COALESCE($8, onboarding_complete),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(owner)
        .bind(&body.username)
        .bind(body.birthday)
        .bind(body.height_cm)
        .bind(body.weight_kg)
        .bind(body.gender)
        .bind(body.fitness_level)
        .bind(body.onboarding_complete)
        .fetch_optional(self.db())
        .await?
        .ok_or_else(Self::not_found)
    }

    pub async fn set_avatar_url(&self, actor: &ActorContext, url: &str) -> AppResult<Profile> {
        let owner = actor.writable_owner("upload avatar")?;

        sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles SET avatar_url = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(owner)
        .bind(url)
        .fetch_optional(self.db())
        .await?
        .ok_or_else(Self::not_found)
    }
}
