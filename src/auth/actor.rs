use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Who a request acts as.
///
/// A demo session reads the shared sample identity and may not write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorContext {
    User(Uuid),
    Demo(Uuid),
}

impl ActorContext {
    /// Owner id used to scope reads.
    pub fn owner_id(&self) -> Uuid {
        match self {
            ActorContext::User(id) | ActorContext::Demo(id) => *id,
        }
    }

    /// Owner id for a write, or a 403 naming the refused `action` for demo
    /// sessions.
    pub fn writable_owner(&self, action: &str) -> AppResult<Uuid> {
        match self {
            ActorContext::User(id) => Ok(*id),
            ActorContext::Demo(_) => Err(AppError::demo_read_only(action)),
        }
    }

    pub fn is_demo(&self) -> bool {
        matches!(self, ActorContext::Demo(_))
    }
}
