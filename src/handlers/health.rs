use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::AppState;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "healthpulse-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Check {
    Ok,
    Failed,
    Skipped,
}

impl Check {
    fn from_bool(ok: bool) -> Self {
        if ok {
            Check::Ok
        } else {
            Check::Failed
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Check::Ok => "ok",
            Check::Failed => "failed",
            Check::Skipped => "skipped",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Readiness {
    database: Check,
    migrations: Check,
    demo_seed: Check,
}

impl Readiness {
    fn is_ready(&self) -> bool {
        [self.database, self.migrations, self.demo_seed]
            .iter()
            .all(|c| *c != Check::Failed)
    }

    fn into_response(self) -> (StatusCode, Json<Value>) {
        let (status, label) = if self.is_ready() {
            (StatusCode::OK, "ready")
        } else {
            (StatusCode::SERVICE_UNAVAILABLE, "not_ready")
        };
        (
            status,
            Json(json!({
                "status": label,
                "checks": {
                    "database": self.database.as_str(),
                    "migrations": self.migrations.as_str(),
                    "demo_seed": self.demo_seed.as_str(),
                },
            })),
        )
    }
}

/// Every migration bundled with this binary has been applied successfully.
async fn migrations_applied(db: &PgPool) -> bool {
    let expected = sqlx::migrate!("./migrations").migrations.len() as i64;
    match sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success")
        .fetch_one(db)
        .await
    {
        Ok(applied) => applied >= expected,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness: migration check failed");
            false
        }
    }
}

async fn demo_seeded(db: &PgPool, demo_user_id: Uuid) -> bool {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM profiles WHERE id = $1 AND is_demo)")
        .bind(demo_user_id)
        .fetch_one(db)
        .await
        .unwrap_or(false)
}

pub async fn readyz(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let db_ok = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.db)
        .await
        .is_ok();

    // Later checks need the database; skip them rather than pile up timeouts.
    let readiness = if !db_ok {
        Readiness {
            database: Check::Failed,
            migrations: Check::Skipped,
            demo_seed: Check::Skipped,
        }
    } else {
        let demo_seed = if state.config.demo_enabled {
            Check::from_bool(demo_seeded(&state.db, state.config.demo_user_id).await)
        } else {
            Check::Skipped
        };
        Readiness {
            database: Check::Ok,
            migrations: Check::from_bool(migrations_applied(&state.db).await),
            demo_seed,
        }
    };

    readiness.into_response()
}
