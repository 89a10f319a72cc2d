//! Archive assembly: block framing, entry encoding, and content streaming.
//!
//! [`Builder`] owns the output stream and accepts work at three levels:
//!
//! - raw: [`Builder::write_block`] and [`Builder::write_data`] frame bytes
//!   into 512-byte blocks;
//! - per entry: [`Builder::append_entry`] turns one filesystem entry into
//!   its header block (preceded by a long-name pseudo-entry when the member
//!   name cannot be split) plus its file contents;
//! - whole trees and file lists: [`Builder::append_tree`] and
//!   [`Builder::append_path_list`] drive the traversal engine through
//!   `append_entry`.
//!
//! An encoding failure is local to the entry that caused it; blocks already
//! written for earlier entries stand as-is. Call [`Builder::finish`] to
//! write the two-zero-block end-of-archive marker.

use std::{
    fs::File,
    io::{Read, Write},
    os::unix::ffi::{OsStrExt, OsStringExt},
    path::{Path, PathBuf},
};

use rustix::fs::{readlink, FileType, Stat};
use zerocopy::IntoBytes;

use crate::{
    header::{Header, HeaderBlock, BLOCK_SIZE},
    line_reader::{LineReader, Separator},
    walk::{walk, WalkControl, WalkOptions},
    Result,
};

const ZERO_BLOCK: [u8; BLOCK_SIZE] = [0; BLOCK_SIZE];

/// Bytes of zero padding needed to round `len` up to a block multiple.
fn padding_for(len: u64) -> usize {
    (len.wrapping_neg() & (BLOCK_SIZE as u64 - 1)) as usize
}

/// Capability for attaching owner names to entries.
///
/// Name databases live outside this crate; implement this over whatever
/// resolves ids on the host and hand it to
/// [`Builder::with_owner_lookup`]. Entries are written with empty name
/// fields when no lookup is configured or a lookup returns `None`.
pub trait OwnerLookup {
    /// Resolve `(uid, gid)` to user and group names.
    fn lookup(&self, uid: u32, gid: u32) -> (Option<String>, Option<String>);
}

/// Streaming tar writer over any [`Write`] destination.
pub struct Builder<W: Write> {
    inner: W,
    owners: Option<Box<dyn OwnerLookup>>,
}

impl<W: Write> Builder<W> {
    /// Create a builder writing to `inner`.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            owners: None,
        }
    }

    /// Attach an owner-name lookup applied to every subsequent entry.
    #[must_use]
    pub fn with_owner_lookup(mut self, owners: impl OwnerLookup + 'static) -> Self {
        self.owners = Some(Box::new(owners));
        self
    }

    /// Write one header block.
    pub fn write_block(&mut self, block: &HeaderBlock) -> Result<()> {
        self.inner.write_all(block.as_bytes())?;
        Ok(())
    }

    /// Write a data payload, zero-padded to a multiple of the block size.
    pub fn write_data(&mut self, data: &[u8]) -> Result<()> {
        self.inner.write_all(data)?;
        let pad = padding_for(data.len() as u64);
        if pad > 0 {
            self.inner.write_all(&ZERO_BLOCK[..pad])?;
        }
        Ok(())
    }

    /// Append one filesystem entry: header block(s), then file contents for
    /// regular files.
    ///
    /// `st` must reflect the traversal's symlink policy (an lstat result for
    /// entries to be recorded as symlinks). Directory member names gain a
    /// trailing `/` before encoding. When the member name admits no USTAR
    /// prefix/suffix split, a long-name pseudo-entry carrying the full name
    /// is written immediately before the entry's own block.
    ///
    /// # Errors
    ///
    /// Encoding errors from [`Header`], or I/O errors reading the entry's
    /// contents or writing the archive.
    pub fn append_entry(&mut self, path: &Path, member_name: &Path, st: &Stat) -> Result<()> {
        let ifmt = FileType::from_raw_mode(st.st_mode);

        let linkdest = if ifmt == FileType::Symlink {
            let target = readlink(path, Vec::new()).map_err(std::io::Error::from)?;
            Some(target.into_bytes())
        } else {
            None
        };

        let mut name = member_name.as_os_str().as_bytes().to_vec();
        if ifmt == FileType::Directory && name.last() != Some(&b'/') {
            name.push(b'/');
        }

        let mut header = Header::from_metadata(&name, st, linkdest.as_deref())?;

        if let Some(owners) = &self.owners {
            let (user, group) = owners.lookup(st.st_uid, st.st_gid);
            header.set_owner(user.as_deref(), group.as_deref());
        }

        if let Some(full_name) = header.long_name() {
            let precursor = Header::long_link(full_name).encode()?;
            self.write_block(&precursor)?;
            // Payload of the pseudo-entry: the untruncated name.
            self.write_data(full_name)?;
        }

        self.write_block(&header.encode()?)?;

        if ifmt == FileType::RegularFile && header.size() > 0 {
            self.append_file_contents(path, header.size())?;
        }

        Ok(())
    }

    /// Stream exactly `size` bytes of `path` into the archive, padded to a
    /// block multiple. A file that shrank below its declared size since it
    /// was stat'ed fails with an unexpected-EOF error rather than producing
    /// a short entry.
    fn append_file_contents(&mut self, path: &Path, size: u64) -> Result<()> {
        let mut file = File::open(path)?;
        let mut buffer = vec![0u8; 64 * BLOCK_SIZE];
        let mut remaining = size;

        while remaining > 0 {
            let want = remaining.min(buffer.len() as u64) as usize;
            file.read_exact(&mut buffer[..want])?;
            self.inner.write_all(&buffer[..want])?;
            remaining -= want as u64;
        }

        let pad = padding_for(size);
        if pad > 0 {
            self.inner.write_all(&ZERO_BLOCK[..pad])?;
        }
        Ok(())
    }

    /// Walk `path` and append every entry under it.
    ///
    /// The first per-entry failure (metadata, encoding, or I/O) aborts the
    /// walk and is returned; blocks already written stand.
    pub fn append_tree(
        &mut self,
        path: &Path,
        member_name: &Path,
        options: &WalkOptions,
    ) -> Result<()> {
        walk(path, member_name, options, &mut |entry_path, member, st| {
            self.append_entry(entry_path, member, st?)?;
            Ok(WalkControl::Continue)
        })
    }

    /// Append every pathname yielded by a [`LineReader`] over `input`,
    /// walking each name like [`Builder::append_tree`].
    pub fn append_path_list<R: std::io::BufRead>(
        &mut self,
        input: R,
        separator: Separator,
        options: &WalkOptions,
    ) -> Result<()> {
        for name in LineReader::new(input, separator) {
            let name = name?;
            if name.is_empty() {
                continue;
            }
            let path = PathBuf::from(std::ffi::OsString::from_vec(name));
            self.append_tree(&path, &path, options)?;
        }
        Ok(())
    }

    /// Write the end-of-archive marker (two zero blocks) and flush.
    pub fn finish(&mut self) -> Result<()> {
        self.inner.write_all(&ZERO_BLOCK)?;
        self.inner.write_all(&ZERO_BLOCK)?;
        self.inner.flush()?;
        Ok(())
    }

    /// Consume the builder, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}
