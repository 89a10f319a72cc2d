//! Streaming writer for POSIX (USTAR) tar archives.
//!
//! This crate assembles a tar archive from filesystem entries: it walks a
//! directory tree (or an explicit list of pathnames) and, for each entry,
//! produces a correctly framed 512-byte archive header followed by the
//! entry's data, padded to the block size.
//!
//! The pieces fit together like this:
//!
//! - [`header`] holds the in-memory [`Header`] model and serializes it into
//!   a fixed-size [`HeaderBlock`], including the USTAR prefix/name split for
//!   pathnames longer than 100 bytes and the GNU long-name escape (a `'L'`
//!   pseudo-entry carrying the full pathname) for pathnames that cannot be
//!   split at all.
//! - [`walk`] is the traversal engine: depth-first, single-threaded, with a
//!   configurable follow-symlinks policy and a callback that can stop the
//!   walk at any entry.
//! - [`builder`] glues the two together: [`Builder`] frames blocks onto any
//!   [`std::io::Write`], streams regular-file contents, and writes the
//!   two-zero-block end-of-archive marker.
//! - [`line_reader`] reads null- or newline-terminated pathnames from a
//!   stream, for feeding explicit file lists into the same machinery.
//!
//! # Example
//!
//! ```no_run
//! use tar_builder::{Builder, WalkOptions};
//!
//! let output = std::fs::File::create("archive.tar").unwrap();
//! let mut builder = Builder::new(output);
//! builder
//!     .append_tree("some/dir".as_ref(), "some/dir".as_ref(), &WalkOptions::default())
//!     .unwrap();
//! builder.finish().unwrap();
//! ```

pub mod builder;
pub mod header;
pub mod line_reader;
pub mod walk;

use std::path::PathBuf;

use rustix::{fs::FileType, io::Errno};
use thiserror::Error;

pub use builder::{Builder, OwnerLookup};
pub use header::{EntryType, Header, HeaderBlock, BLOCK_SIZE};
pub use line_reader::{LineReader, Separator};
pub use walk::{walk, WalkControl, WalkOptions};

/// Errors that can occur while building an archive.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from the underlying writer or a content read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The filesystem entry kind has no tar representation.
    #[error("unsupported entry type {0:?}")]
    UnsupportedEntryType(FileType),

    /// A numeric value does not fit in its fixed-width octal header field.
    ///
    /// For the size field the ceiling is [`header::MAX_USTAR_SIZE`]
    /// (2^33 - 1); oversized values are rejected, never wrapped.
    #[error("value {0} does not fit in its octal header field")]
    SizeOverflow(u64),

    /// Could not stat or list an entry during traversal.
    ///
    /// The traversal engine hands this to the callback per entry; whether
    /// the walk aborts or skips the entry is the callback's decision.
    #[error("{path:?}: cannot read metadata: {errno}")]
    MetadataUnavailable {
        /// The path that could not be examined.
        path: PathBuf,
        /// The underlying OS error.
        errno: Errno,
    },

    /// The traversal callback requested a failure stop.
    ///
    /// Callbacks may also return any other [`Error`] (or convert their own
    /// errors into one); this variant exists for aborts with no underlying
    /// cause.
    #[error("traversal aborted by callback")]
    Aborted,
}

/// Result type for archive-building operations.
pub type Result<T> = std::result::Result<T, Error>;
