/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for synchronization operations
pub type SyncResult<T> = Result<T, SyncError>;

/// Synchronization primitive errors with serialization support
///
/// Every variant is a caller bug, not a runtime condition. Primitives
/// escalate these to a panic instead of handing them back for a retry.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SyncError {
    #[error("condition variable used after being copied (first used at {expected:#x}, now at {found:#x})")]
    #[diagnostic(
        code(sync::copied),
        help("A condition variable must stay at one address once used. Share it through Arc or a reference instead of duplicating it.")
    )]
    Misuse { expected: usize, found: usize },
}
