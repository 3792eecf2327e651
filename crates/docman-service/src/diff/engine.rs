//! Diffs between stored versions of a file.

use tracing::debug;
use uuid::Uuid;

use docman_core::config::DiffConfig;
use docman_core::error::AppError;
use docman_core::result::AppResult;
use docman_entity::file::{FileVersion, VersionSelector};

use super::delta::Delta;
use crate::context::RequestContext;
use crate::file::FileRegistry;

/// Computes deltas between two versions of the same file.
#[derive(Debug, Clone)]
pub struct DiffEngine {
    registry: FileRegistry,
    config: DiffConfig,
}

impl DiffEngine {
    /// Creates a diff engine reading versions through `registry`.
    pub fn new(registry: FileRegistry, config: DiffConfig) -> Self {
        Self { registry, config }
    }

    /// Delta from version `from` to version `to` of `file_id`.
    pub async fn diff(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        from: VersionSelector,
        to: VersionSelector,
    ) -> AppResult<Delta> {
        let old = self.registry.get_file_version(ctx, file_id, from).await?;
        let new = self.registry.get_file_version(ctx, file_id, to).await?;
        self.check_size(&old)?;
        self.check_size(&new)?;

        let versions = self.registry.versions();
        let old_bytes = versions.read_all(&old).await?;
        let new_bytes = versions.read_all(&new).await?;

        let delta = self.compute(&old_bytes, &new_bytes, old.version_number, new.version_number);
        let stats = delta.stats();
        debug!(
            user_id = %ctx.user_id,
            file_id = %file_id,
            from = old.version_number,
            to = new.version_number,
            insertions = stats.insertions,
            deletions = stats.deletions,
            binary = stats.binary,
            "Computed diff"
        );
        Ok(delta)
    }

    /// Delta between two in-memory payloads.
    pub fn compute(&self, old: &[u8], new: &[u8], from_version: i32, to_version: i32) -> Delta {
        Delta::compute(old, new, from_version, to_version, self.config.max_lcs_cells)
    }

    /// Reconstruct the target of `delta` from `base`.
    pub fn apply(&self, base: &[u8], delta: &Delta) -> AppResult<Vec<u8>> {
        delta.apply(base)
    }

    /// The delta going the other way.
    pub fn invert(&self, delta: &Delta) -> Delta {
        delta.invert()
    }

    fn check_size(&self, version: &FileVersion) -> AppResult<()> {
        let size = u64::try_from(version.size_bytes).unwrap_or(u64::MAX);
        if size > self.config.max_input_bytes {
            return Err(AppError::payload_too_large(format!(
                "Version {} is {size} bytes; diffs are limited to {} bytes",
                version.version_number, self.config.max_input_bytes
            )));
        }
        Ok(())
    }
}
