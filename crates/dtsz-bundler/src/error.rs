//! Fatal bundling errors.
//!
//! Only precondition violations end up here. Everything recoverable is a
//! `Diagnostic` on the bundle output.

use dtsz_syntax::StoreError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BundleError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("entry module '{0}' is not part of the bundle")]
    UnknownEntry(String),
}
