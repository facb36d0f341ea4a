//! Tagging errors

use akredo_core::ReviewStatus;
use thiserror::Error;

/// Errors from the criteria linker
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaggingError {
    #[error("Evidence files must be tagged with at least one criterion")]
    EmptyCriteriaSet,

    #[error("Tags are immutable while entity is {0}; only drafts may be untagged")]
    TagsImmutable(ReviewStatus),
}
