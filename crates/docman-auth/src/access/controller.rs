//! Access checks consumed by the file services.

use uuid::Uuid;

use docman_core::config::Visibility;
use docman_core::error::AppError;
use docman_entity::file::{File, ListScope};

use crate::context::RequestContext;

/// Decides what an authenticated caller may see and change.
pub trait AccessController: Send + Sync + std::fmt::Debug + 'static {
    /// Whether `actor` may read `file` and its versions.
    fn can_read(&self, actor: &RequestContext, file: &File) -> bool;

    /// Whether `actor` may append versions to `file`.
    fn can_write(&self, actor: &RequestContext, file: &File) -> bool;

    /// Owner restriction for a listing in `scope`. `None` lists everything.
    fn listing_owner_filter(&self, actor: &RequestContext, scope: ListScope) -> Option<Uuid>;

    /// Fail with `Forbidden` unless `actor` may read `file`.
    fn require_read(&self, actor: &RequestContext, file: &File) -> Result<(), AppError> {
        if self.can_read(actor, file) {
            Ok(())
        } else {
            Err(AppError::forbidden(format!(
                "You do not have access to file {}",
                file.id
            )))
        }
    }

    /// Fail with `Forbidden` unless `actor` may append to `file`.
    fn require_write(&self, actor: &RequestContext, file: &File) -> Result<(), AppError> {
        if self.can_write(actor, file) {
            Ok(())
        } else {
            Err(AppError::forbidden(format!(
                "You cannot upload new versions of file {}",
                file.id
            )))
        }
    }
}

/// Owner-based policy driven by [`Visibility`].
///
/// `Shared` opens every file to every authenticated user. `Private` limits
/// members to files they own. Admins are never restricted.
#[derive(Debug, Clone, Copy)]
pub struct VisibilityPolicy {
    visibility: Visibility,
}

impl VisibilityPolicy {
    /// Create a policy for the configured visibility.
    pub fn new(visibility: Visibility) -> Self {
        Self { visibility }
    }

    fn owns_or_bypasses(&self, actor: &RequestContext, file: &File) -> bool {
        match self.visibility {
            Visibility::Shared => true,
            Visibility::Private => actor.is_admin() || file.owner_id == actor.user_id,
        }
    }
}

impl AccessController for VisibilityPolicy {
    fn can_read(&self, actor: &RequestContext, file: &File) -> bool {
        self.owns_or_bypasses(actor, file)
    }

    fn can_write(&self, actor: &RequestContext, file: &File) -> bool {
        self.owns_or_bypasses(actor, file)
    }

    fn listing_owner_filter(&self, actor: &RequestContext, scope: ListScope) -> Option<Uuid> {
        match (scope, self.visibility) {
            (ListScope::Mine, _) => Some(actor.user_id),
            (ListScope::All, Visibility::Shared) => None,
            (ListScope::All, Visibility::Private) if actor.is_admin() => None,
            (ListScope::All, Visibility::Private) => Some(actor.user_id),
        }
    }
}
