use axum::{extract::State, Extension, Json};
use chrono::Local;

use crate::auth::middleware::AuthUser;
use crate::services::dashboard::{load_dashboard, Dashboard, PgDashboardSource};
use crate::AppState;

/// Always 200: a failed fetch renders as an empty dashboard.
pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Json<Dashboard> {
    let source = PgDashboardSource::new(state.db.clone());
    let now = Local::now().naive_local();
    Json(load_dashboard(&source, &auth_user.actor, now).await)
}
