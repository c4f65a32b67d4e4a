use catpoint_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SecurityError {
    /// The repository accepted the change in memory but could not persist it.
    #[error("failed to persist security state")]
    Store(#[from] StoreError),
}
