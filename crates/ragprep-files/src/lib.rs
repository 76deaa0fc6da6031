//! Raw file classification and relocation.
//!
//! [`FileClassifier`] maps every file to exactly one [`Disposition`] from its
//! extension; [`sweep`] walks a raw tree, classifies everything it finds and
//! hands quarantine and pass-through files to a [`Relocator`].

pub mod classify;
pub mod error;
pub mod relocate;
pub mod sweep;

pub use classify::{Disposition, FileCategory, FileClassifier, FileEntry};
pub use error::FileError;
pub use relocate::{DryRunRelocator, FsRelocator, Relocator};
pub use sweep::{Destinations, SweepReport, sweep};
