//! Depth-first filesystem traversal feeding the archive pipeline.
//!
//! [`walk`] visits a single path or a whole subtree, invoking a callback
//! once per entry with the entry's filesystem path, its logical member name,
//! and its stat metadata. The engine is single-threaded and synchronous;
//! directory reads and stat calls are ordinary blocking I/O.
//!
//! The callback steers the walk: [`WalkControl::Continue`] keeps going,
//! [`WalkControl::Stop`] ends it successfully, and returning an error aborts
//! it immediately, propagating the error to the caller. Output already
//! produced for earlier entries is not rolled back.
//!
//! Per-entry metadata failures (permission denied, dangling symlink, entry
//! removed mid-walk) are handed to the callback as an `Err` argument; the
//! callback decides between skipping the entry and aborting the walk. The
//! engine itself never swallows or decides on a failure.

use std::{
    ffi::OsStr,
    os::unix::ffi::OsStrExt,
    path::{Path, PathBuf},
};

use rustix::{
    fs::{openat, statat, AtFlags, Dir, FileType, Mode, OFlags, Stat, CWD},
    io::Errno,
};

use crate::{Error, Result};

/// Traversal policy knobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkOptions {
    /// Resolve symbolic links and record them as their target's type. When
    /// unset (the default), symlinks are recorded as symlink entries
    /// carrying their textual target.
    pub follow_symlinks: bool,
}

/// Callback verdict for one visited entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkControl {
    /// Keep walking.
    Continue,
    /// End the walk now, successfully.
    Stop,
}

/// The per-entry callback: `(path, member_name, metadata) -> control`.
///
/// Metadata arrives as `Err` when the entry could not be examined; return
/// `Ok(Continue)` to skip it or propagate the error to abort.
pub trait WalkCallback:
    FnMut(&Path, &Path, std::result::Result<&Stat, Error>) -> Result<WalkControl>
{
}

impl<F> WalkCallback for F where
    F: FnMut(&Path, &Path, std::result::Result<&Stat, Error>) -> Result<WalkControl>
{
}

fn metadata_unavailable(path: &Path, errno: Errno) -> Error {
    Error::MetadataUnavailable {
        path: path.to_owned(),
        errno,
    }
}

/// Walk `start`, calling `callback` once per entry.
///
/// A non-directory start yields exactly one invocation. A directory yields
/// its own entry first, then its contents in sorted name order, recursing
/// depth-first — the order is stable across runs on an unchanged tree.
/// `member_name` is the logical name recorded for `start`; children append
/// their file names to it.
///
/// # Errors
///
/// Whatever the callback returns as an error, unchanged. The engine itself
/// only fails through the callback.
pub fn walk<F: WalkCallback>(
    start: &Path,
    member_name: &Path,
    options: &WalkOptions,
    callback: &mut F,
) -> Result<()> {
    let flags = stat_flags(options);
    match statat(CWD, start, flags) {
        Ok(st) => visit(start, member_name, &st, options, callback)?,
        Err(errno) => callback(start, member_name, Err(metadata_unavailable(start, errno)))?,
    };
    Ok(())
}

fn stat_flags(options: &WalkOptions) -> AtFlags {
    if options.follow_symlinks {
        AtFlags::empty()
    } else {
        AtFlags::SYMLINK_NOFOLLOW
    }
}

fn visit<F: WalkCallback>(
    path: &Path,
    member_name: &Path,
    st: &Stat,
    options: &WalkOptions,
    callback: &mut F,
) -> Result<WalkControl> {
    log::debug!("visiting {path:?} as {member_name:?}");
    if callback(path, member_name, Ok(st))? == WalkControl::Stop {
        return Ok(WalkControl::Stop);
    }

    if FileType::from_raw_mode(st.st_mode) != FileType::Directory {
        return Ok(WalkControl::Continue);
    }

    walk_directory(path, member_name, options, callback)
}

fn walk_directory<F: WalkCallback>(
    path: &Path,
    member_name: &Path,
    options: &WalkOptions,
    callback: &mut F,
) -> Result<WalkControl> {
    let mut oflags = OFlags::RDONLY | OFlags::DIRECTORY | OFlags::CLOEXEC;
    if !options.follow_symlinks {
        oflags |= OFlags::NOFOLLOW;
    }
    let fd = match openat(CWD, path, oflags, Mode::empty()) {
        Ok(fd) => fd,
        Err(errno) => return callback(path, member_name, Err(metadata_unavailable(path, errno))),
    };

    let dir = match Dir::read_from(&fd) {
        Ok(dir) => dir,
        Err(errno) => return callback(path, member_name, Err(metadata_unavailable(path, errno))),
    };

    let mut names: Vec<PathBuf> = Vec::new();
    for item in dir {
        let entry = match item {
            Ok(entry) => entry,
            Err(errno) => {
                // The directory stream is unusable past this point; let the
                // callback choose between the partial listing and aborting.
                match callback(path, member_name, Err(metadata_unavailable(path, errno)))? {
                    WalkControl::Continue => break,
                    WalkControl::Stop => return Ok(WalkControl::Stop),
                }
            }
        };
        let name = OsStr::from_bytes(entry.file_name().to_bytes());
        if name == "." || name == ".." {
            continue;
        }
        names.push(name.into());
    }
    names.sort();

    let flags = stat_flags(options);
    for name in names {
        let child_path = path.join(&name);
        let child_member = member_name.join(&name);
        let control = match statat(&fd, name.as_os_str(), flags) {
            Ok(st) => visit(&child_path, &child_member, &st, options, callback)?,
            Err(errno) => callback(
                &child_path,
                &child_member,
                Err(metadata_unavailable(&child_path, errno)),
            )?,
        };
        if control == WalkControl::Stop {
            return Ok(WalkControl::Stop);
        }
    }

    Ok(WalkControl::Continue)
}
