//! Tar header model and 512-byte block encoding.
//!
//! A [`Header`] is the in-memory metadata for one archive entry, independent
//! of the on-wire byte layout. [`Header::encode`] serializes it into a
//! [`HeaderBlock`], the fixed 512-byte USTAR header:
//!
//! | Offset | Size | Field    | Encoding                                 |
//! |--------|------|----------|------------------------------------------|
//! | 0      | 100  | name     | path suffix, null-padded                 |
//! | 100    | 8    | mode     | 7-digit octal ASCII + NUL                |
//! | 108    | 8    | uid      | 7-digit octal ASCII + NUL                |
//! | 116    | 8    | gid      | 7-digit octal ASCII + NUL                |
//! | 124    | 12   | size     | 11-digit octal ASCII + NUL               |
//! | 136    | 12   | mtime    | 11-digit octal ASCII + NUL               |
//! | 148    | 8    | checksum | 6-digit octal + NUL + space              |
//! | 156    | 1    | typeflag | entry type tag (see [`EntryType`])       |
//! | 157    | 100  | linkname | symlink target, null-padded              |
//! | 257    | 8    | magic    | `"ustar\0" "00"`                         |
//! | 265    | 32   | uname    | owner user name                          |
//! | 297    | 32   | gname    | owner group name                         |
//! | 329    | 8    | devmajor | 7-digit octal (devices only)             |
//! | 337    | 8    | devminor | 7-digit octal (devices only)             |
//! | 345    | 155  | prefix   | path prefix, null-padded                 |
//! | 500    | 12   | pad      | zeros                                    |
//!
//! # Pathname overflow
//!
//! A member name of at most 100 bytes goes in `name` alone. A longer name is
//! split at the rightmost `/` such that the part before it fits in `prefix`
//! (155 bytes) and the part after fits in `name`; a conforming reader joins
//! them back with a `/`. When no such split exists, the entry carries the
//! reserved marker name `././@LongLink` instead and must be preceded by a
//! [`Header::long_link`] pseudo-entry whose payload is the full pathname.
//!
//! # Checksum
//!
//! The checksum is computed in two passes: the checksum field is filled with
//! eight ASCII spaces, all 512 bytes are summed as unsigned values, and the
//! sum is written back as six octal digits, a NUL, and a space. Computing it
//! any other way produces an archive conforming readers reject.

use rustix::fs::FileType;
use zerocopy::{FromBytes, FromZeros, Immutable, IntoBytes, KnownLayout};

use crate::{Error, Result};

/// Size of one tar block (headers and data framing) in bytes.
pub const BLOCK_SIZE: usize = 512;

/// Largest file size an 11-digit octal field can hold (2^33 - 1).
pub const MAX_USTAR_SIZE: u64 = 0o77777777777;

/// Magic + version identifying a USTAR header ("ustar\0" followed by "00").
pub const USTAR_MAGIC: &[u8; 8] = b"ustar\x0000";

/// Reserved member name carried by GNU long-name pseudo-entries.
pub const LONG_LINK_NAME: &[u8] = b"././@LongLink";

const NAME_SIZE: usize = 100;
const PREFIX_SIZE: usize = 155;
const LINKNAME_SIZE: usize = 100;
const OWNER_SIZE: usize = 32;

/// Byte range of the checksum field within the block.
const CHECKSUM_RANGE: std::ops::Range<usize> = 148..156;

/// Permission bits preserved in the mode field. File type and the
/// setuid/setgid/sticky bits are stripped.
const MODE_MASK: u32 = 0o777;

/// Tar entry type tag, stored as a single ASCII byte in the header.
///
/// Only the types this writer produces are represented here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryType {
    /// Regular file (type '0').
    Regular,
    /// Symbolic link (type '2').
    Symlink,
    /// Character device (type '3').
    CharDevice,
    /// Block device (type '4').
    BlockDevice,
    /// Directory (type '5').
    Directory,
    /// FIFO/named pipe (type '6').
    Fifo,
    /// GNU long name pseudo-entry (type 'L').
    LongName,
}

impl EntryType {
    /// The raw byte written into the typeflag field.
    #[must_use]
    pub fn to_byte(self) -> u8 {
        match self {
            EntryType::Regular => b'0',
            EntryType::Symlink => b'2',
            EntryType::CharDevice => b'3',
            EntryType::BlockDevice => b'4',
            EntryType::Directory => b'5',
            EntryType::Fifo => b'6',
            EntryType::LongName => b'L',
        }
    }

    fn from_file_type(ifmt: FileType) -> Result<Self> {
        match ifmt {
            FileType::RegularFile => Ok(EntryType::Regular),
            FileType::Directory => Ok(EntryType::Directory),
            FileType::Symlink => Ok(EntryType::Symlink),
            FileType::CharacterDevice => Ok(EntryType::CharDevice),
            FileType::BlockDevice => Ok(EntryType::BlockDevice),
            FileType::Fifo => Ok(EntryType::Fifo),
            other => Err(Error::UnsupportedEntryType(other)),
        }
    }
}

/// In-memory metadata for one archive entry.
///
/// Built per entry by [`Header::from_metadata`], consumed by
/// [`Header::encode`], and discarded; there is no persistent registry.
#[derive(Debug, Clone)]
pub struct Header {
    /// Final component(s) of the member name, at most 100 bytes.
    suffix: Vec<u8>,
    /// Leading component(s) of the member name, at most 155 bytes; empty
    /// when the suffix alone holds the whole name.
    prefix: Vec<u8>,
    /// The full member name when it admits no prefix/suffix split; drives
    /// emission of a long-name pseudo-entry before this header's block.
    long_name: Option<Box<[u8]>>,
    mode: u32,
    uid: u32,
    gid: u32,
    size: u64,
    mtime: i64,
    entry_type: EntryType,
    /// Symlink target, empty for other entry types.
    linkdest: Vec<u8>,
    user: Vec<u8>,
    group: Vec<u8>,
    major: u32,
    minor: u32,
    /// Set when a name field had to be cut to fit its slot. Advisory only:
    /// it flags information loss, never a malformed block.
    truncated: bool,
}

/// Outcome of fitting a member name into the prefix/name fields.
enum NameFields {
    Split { prefix: Vec<u8>, suffix: Vec<u8> },
    TooLong,
}

/// Fit `name` into the 155-byte prefix and 100-byte name fields.
///
/// Picks the rightmost `/` boundary satisfying both width limits, matching
/// the convention of common USTAR writers. Neither half may be empty: a
/// split at the first or last byte would change the reconstructed name.
fn split_member_name(name: &[u8]) -> NameFields {
    if name.len() <= NAME_SIZE {
        return NameFields::Split {
            prefix: Vec::new(),
            suffix: name.to_vec(),
        };
    }

    for i in (1..name.len() - 1).rev() {
        let suffix_len = name.len() - i - 1;
        if suffix_len > NAME_SIZE {
            // The suffix only grows as we move left.
            break;
        }
        if name[i] == b'/' && i <= PREFIX_SIZE {
            return NameFields::Split {
                prefix: name[..i].to_vec(),
                suffix: name[i + 1..].to_vec(),
            };
        }
    }

    NameFields::TooLong
}

impl Header {
    fn empty(entry_type: EntryType) -> Self {
        Self {
            suffix: Vec::new(),
            prefix: Vec::new(),
            long_name: None,
            mode: 0,
            uid: 0,
            gid: 0,
            size: 0,
            mtime: 0,
            entry_type,
            linkdest: Vec::new(),
            user: Vec::new(),
            group: Vec::new(),
            major: 0,
            minor: 0,
            truncated: false,
        }
    }

    /// Build a header from a logical member name and stat metadata.
    ///
    /// The metadata must already reflect the resolved entry type according
    /// to the traversal's follow-symlinks policy; this constructor does not
    /// decide symlink following. `linkdest` is the link's textual target and
    /// is only meaningful for symlink entries.
    ///
    /// Size is forced to zero for non-regular entries. A regular file larger
    /// than [`MAX_USTAR_SIZE`] is rejected with [`Error::SizeOverflow`]; a
    /// link target longer than 100 bytes is cut and flagged via
    /// [`Header::truncated`].
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedEntryType`] for entry kinds tar cannot encode
    /// (e.g. sockets), [`Error::SizeOverflow`] for oversized files.
    pub fn from_metadata(
        member_name: &[u8],
        st: &rustix::fs::Stat,
        linkdest: Option<&[u8]>,
    ) -> Result<Self> {
        let entry_type = EntryType::from_file_type(FileType::from_raw_mode(st.st_mode))?;

        let size = match entry_type {
            EntryType::Regular => st.st_size as u64,
            _ => 0,
        };
        if size > MAX_USTAR_SIZE {
            return Err(Error::SizeOverflow(size));
        }

        let mut header = Header::empty(entry_type);
        header.mode = st.st_mode & MODE_MASK;
        header.uid = st.st_uid;
        header.gid = st.st_gid;
        header.size = size;
        header.mtime = st.st_mtime as i64;

        match split_member_name(member_name) {
            NameFields::Split { prefix, suffix } => {
                header.prefix = prefix;
                header.suffix = suffix;
            }
            NameFields::TooLong => {
                header.suffix = LONG_LINK_NAME.to_vec();
                header.long_name = Some(Box::from(member_name));
            }
        }

        if let Some(target) = linkdest {
            if target.len() > LINKNAME_SIZE {
                log::warn!(
                    "symlink target truncated to {LINKNAME_SIZE} bytes ({} byte original)",
                    target.len()
                );
                header.linkdest = target[..LINKNAME_SIZE].to_vec();
                header.truncated = true;
            } else {
                header.linkdest = target.to_vec();
            }
        }

        if matches!(entry_type, EntryType::CharDevice | EntryType::BlockDevice) {
            header.major = rustix::fs::major(st.st_rdev);
            header.minor = rustix::fs::minor(st.st_rdev);
        }

        Ok(header)
    }

    /// Build the long-name pseudo-entry preceding a header whose member name
    /// admits no prefix/suffix split.
    ///
    /// The block's size field declares the payload length (the full pathname,
    /// written and padded by the caller immediately after this header).
    #[must_use]
    pub fn long_link(full_name: &[u8]) -> Self {
        let mut header = Header::empty(EntryType::LongName);
        header.suffix = LONG_LINK_NAME.to_vec();
        header.size = full_name.len() as u64;
        header
    }

    /// Attach resolved owner names. Names longer than 32 bytes are cut to
    /// fit and flagged via [`Header::truncated`]; this never fails.
    pub fn set_owner(&mut self, user: Option<&str>, group: Option<&str>) {
        for (field, name) in [(&mut self.user, user), (&mut self.group, group)] {
            let Some(name) = name else { continue };
            let bytes = name.as_bytes();
            if bytes.len() > OWNER_SIZE {
                log::warn!("owner name {name:?} truncated to {OWNER_SIZE} bytes");
                *field = bytes[..OWNER_SIZE].to_vec();
                self.truncated = true;
            } else {
                *field = bytes.to_vec();
            }
        }
    }

    /// The full member name, when it requires a long-name pseudo-entry.
    #[must_use]
    pub fn long_name(&self) -> Option<&[u8]> {
        self.long_name.as_deref()
    }

    /// The entry's declared data size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// The entry's type tag.
    #[must_use]
    pub fn entry_type(&self) -> EntryType {
        self.entry_type
    }

    /// Whether any name field was cut to fit its slot.
    #[must_use]
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Serialize into one 512-byte block.
    ///
    /// The model is not mutated and may be discarded afterwards. String
    /// fields are cut to their slot width here only as a last-resort safety
    /// net; in the designed path all cutting happened at construction.
    ///
    /// # Errors
    ///
    /// [`Error::SizeOverflow`] if a numeric value does not fit its octal
    /// field. For the size field this is a caller contract violation (the
    /// check belongs to [`Header::from_metadata`]) caught defensively.
    pub fn encode(&self) -> Result<HeaderBlock> {
        let mut block = HeaderBlock::default();

        copy_field(&mut block.name, &self.suffix);
        copy_field(&mut block.prefix, &self.prefix);
        copy_field(&mut block.linkname, &self.linkdest);
        copy_field(&mut block.uname, &self.user);
        copy_field(&mut block.gname, &self.group);

        write_octal(&mut block.mode, u64::from(self.mode))?;
        write_octal(&mut block.uid, u64::from(self.uid))?;
        write_octal(&mut block.gid, u64::from(self.gid))?;
        write_octal(&mut block.size, self.size)?;
        // Pre-epoch timestamps have no octal representation; clamp to zero.
        write_octal(&mut block.mtime, u64::try_from(self.mtime).unwrap_or(0))?;

        block.typeflag = self.entry_type.to_byte();

        if matches!(
            self.entry_type,
            EntryType::CharDevice | EntryType::BlockDevice
        ) {
            write_octal(&mut block.devmajor, u64::from(self.major))?;
            write_octal(&mut block.devminor, u64::from(self.minor))?;
        }

        block.fill_checksum();
        Ok(block)
    }
}

/// Copy `value` into a fixed-width field, cutting it to fit; the remainder
/// of the field stays null.
fn copy_field(field: &mut [u8], value: &[u8]) {
    let n = value.len().min(field.len());
    field[..n].copy_from_slice(&value[..n]);
}

/// Write `value` as zero-padded octal ASCII filling all but the last byte of
/// the field, which stays NUL.
fn write_octal(field: &mut [u8], value: u64) -> Result<()> {
    let digits = field.len() - 1;
    let text = format!("{value:0digits$o}");
    if text.len() > digits {
        return Err(Error::SizeOverflow(value));
    }
    field[..digits].copy_from_slice(text.as_bytes());
    Ok(())
}

/// The fixed 512-byte on-wire USTAR header.
///
/// A pure serialization target: produced transiently by [`Header::encode`]
/// and handed to the writer. See the module docs for the field layout.
#[derive(Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct HeaderBlock {
    /// Path suffix (final components), null-padded.
    pub name: [u8; 100],
    /// Permission bits in octal ASCII.
    pub mode: [u8; 8],
    /// Owner user ID in octal ASCII.
    pub uid: [u8; 8],
    /// Owner group ID in octal ASCII.
    pub gid: [u8; 8],
    /// Data size in octal ASCII.
    pub size: [u8; 12],
    /// Modification time (Unix epoch seconds) in octal ASCII.
    pub mtime: [u8; 12],
    /// Checksum: 6 octal digits, NUL, space.
    pub checksum: [u8; 8],
    /// Entry type tag byte.
    pub typeflag: u8,
    /// Symlink target, null-padded.
    pub linkname: [u8; 100],
    /// `"ustar\0" "00"`.
    pub magic: [u8; 8],
    /// Owner user name, null-padded.
    pub uname: [u8; 32],
    /// Owner group name, null-padded.
    pub gname: [u8; 32],
    /// Device major number in octal ASCII (devices only).
    pub devmajor: [u8; 8],
    /// Device minor number in octal ASCII (devices only).
    pub devminor: [u8; 8],
    /// Path prefix (leading components), null-padded.
    pub prefix: [u8; 155],
    /// Zeros.
    pub pad: [u8; 12],
}

impl Default for HeaderBlock {
    fn default() -> Self {
        let mut block = Self::new_zeroed();
        block.magic = *USTAR_MAGIC;
        block
    }
}

impl HeaderBlock {
    /// Compute the checksum of this block's current contents, with the
    /// checksum field treated as eight spaces.
    #[must_use]
    pub fn compute_checksum(&self) -> u64 {
        self.as_bytes()
            .iter()
            .enumerate()
            .map(|(i, &byte)| {
                if CHECKSUM_RANGE.contains(&i) {
                    u64::from(b' ')
                } else {
                    u64::from(byte)
                }
            })
            .sum()
    }

    /// Blank the checksum field, sum the block, and store the result.
    fn fill_checksum(&mut self) {
        self.checksum = *b"        ";
        let sum = self.compute_checksum();
        // The sum of 512 unsigned bytes is at most 130560: 6 octal digits
        // always suffice.
        self.checksum[..6].copy_from_slice(format!("{sum:06o}").as_bytes());
        self.checksum[6] = 0;
        self.checksum[7] = b' ';
    }
}

impl std::fmt::Debug for HeaderBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeaderBlock")
            .field("name", &String::from_utf8_lossy(truncate_null(&self.name)))
            .field(
                "prefix",
                &String::from_utf8_lossy(truncate_null(&self.prefix)),
            )
            .field("typeflag", &char::from(self.typeflag))
            .field("size", &String::from_utf8_lossy(truncate_null(&self.size)))
            .finish_non_exhaustive()
    }
}

/// Cut a byte slice at the first NUL, for reading null-padded fields back.
fn truncate_null(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|&b| b == 0) {
        Some(pos) => &bytes[..pos],
        None => bytes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_header(name: &[u8]) -> Header {
        let mut header = Header::empty(EntryType::Regular);
        match split_member_name(name) {
            NameFields::Split { prefix, suffix } => {
                header.prefix = prefix;
                header.suffix = suffix;
            }
            NameFields::TooLong => {
                header.suffix = LONG_LINK_NAME.to_vec();
                header.long_name = Some(Box::from(name));
            }
        }
        header
    }

    #[test]
    fn test_block_layout() {
        assert_eq!(size_of::<HeaderBlock>(), BLOCK_SIZE);

        // Spot-check absolute offsets against the wire format.
        let mut block = HeaderBlock::default();
        block.typeflag = b'5';
        block.devmajor = *b"0000007\0";
        let bytes = block.as_bytes();
        assert_eq!(bytes[156], b'5');
        assert_eq!(&bytes[257..265], USTAR_MAGIC);
        assert_eq!(&bytes[329..337], b"0000007\0");
    }

    #[test]
    fn test_short_name_goes_in_suffix_alone() {
        let header = fake_header(b"a");
        assert_eq!(header.suffix, b"a");
        assert!(header.prefix.is_empty());
        assert!(header.long_name().is_none());

        let name100 = [b'x'; 100];
        let header = fake_header(&name100);
        assert_eq!(header.suffix, name100);
        assert!(header.prefix.is_empty());
    }

    #[test]
    fn test_split_reconstructs_original_name() {
        // 101..=255 bytes with a workable boundary: prefix + '/' + suffix
        // must reproduce the name exactly.
        let mut name = vec![b'p'; 120];
        name[60] = b'/';
        let header = fake_header(&name);
        assert!(header.long_name().is_none());
        let mut rejoined = header.prefix.clone();
        rejoined.push(b'/');
        rejoined.extend_from_slice(&header.suffix);
        assert_eq!(rejoined, name);
        assert!(header.prefix.len() <= 155);
        assert!(header.suffix.len() <= 100);
    }

    #[test]
    fn test_split_picks_rightmost_boundary() {
        // dir/…/leaf with several candidate boundaries: the rightmost slash
        // satisfying both limits wins, so the suffix is as short as possible.
        let mut name = b"aa/bb/cc/dd/ee/".to_vec();
        name.extend_from_slice("0123456789".repeat(10).as_bytes());
        assert_eq!(name.len(), 115);
        let header = fake_header(&name);
        assert_eq!(header.prefix, b"aa/bb/cc/dd/ee");
        assert_eq!(header.suffix.len(), 100);
    }

    #[test]
    fn test_no_boundary_requires_long_name() {
        // 200 bytes, no '/' in the last 100: no valid split exists.
        let mut name = vec![b'q'; 200];
        name[20] = b'/';
        let header = fake_header(&name);
        assert_eq!(header.long_name(), Some(&name[..]));
        assert_eq!(header.suffix, LONG_LINK_NAME);
        assert!(header.prefix.is_empty());
    }

    #[test]
    fn test_over_255_requires_long_name() {
        let mut name = vec![b'q'; 300];
        // Slashes everywhere: still no split fits 155 + 100.
        for i in (0..300).step_by(10) {
            name[i] = b'/';
        }
        let header = fake_header(&name);
        assert!(header.long_name().is_some());
    }

    #[test]
    fn test_split_rejects_empty_halves() {
        // A name ending in '/' must not split there (empty suffix).
        let mut name = vec![b'd'; 104];
        name[103] = b'/';
        name[50] = b'/';
        let header = fake_header(&name);
        assert_eq!(header.prefix, &name[..50]);
        assert_eq!(header.suffix, &name[51..]);
    }

    #[test]
    fn test_long_link_precursor() {
        let name = vec![b'n'; 200];
        let precursor = Header::long_link(&name);
        assert_eq!(precursor.size(), 200);
        assert_eq!(precursor.entry_type(), EntryType::LongName);

        let block = precursor.encode().unwrap();
        assert_eq!(truncate_null(&block.name), LONG_LINK_NAME);
        assert_eq!(block.typeflag, b'L');
        assert_eq!(&block.size, b"00000000310\0"); // 200 = 0o310
    }

    #[test]
    fn test_octal_fields() {
        let mut header = Header::empty(EntryType::Regular);
        header.suffix = b"a".to_vec();
        header.mode = 0o644;
        header.size = 10;
        header.mtime = 1234567890;

        let block = header.encode().unwrap();
        assert_eq!(&block.mode, b"0000644\0");
        assert_eq!(&block.size, b"00000000012\0");
        assert_eq!(&block.mtime, b"11145401322\0");
        assert_eq!(truncate_null(&block.name), b"a");
        assert_eq!(block.typeflag, b'0');
    }

    #[test]
    fn test_checksum_round_trip() {
        let mut header = Header::empty(EntryType::Regular);
        header.suffix = b"some/file".to_vec();
        header.mode = 0o644;
        header.size = 42;
        header.mtime = 1700000000;
        header.set_owner(Some("user"), Some("group"));

        let block = header.encode().unwrap();
        let stored = std::str::from_utf8(&block.checksum[..6]).unwrap();
        let stored = u64::from_str_radix(stored, 8).unwrap();
        assert_eq!(stored, block.compute_checksum());
        assert_eq!(block.checksum[6], 0);
        assert_eq!(block.checksum[7], b' ');
    }

    #[test]
    fn test_size_boundary() {
        let mut header = Header::empty(EntryType::Regular);
        header.suffix = b"big".to_vec();

        header.size = MAX_USTAR_SIZE;
        let block = header.encode().unwrap();
        assert_eq!(&block.size, b"77777777777\0");

        header.size = MAX_USTAR_SIZE + 1;
        assert!(matches!(
            header.encode(),
            Err(Error::SizeOverflow(8_589_934_592))
        ));
    }

    #[test]
    fn test_owner_name_truncation() {
        let mut header = Header::empty(EntryType::Regular);
        header.set_owner(Some("short"), None);
        assert_eq!(header.user, b"short");
        assert!(header.group.is_empty());
        assert!(!header.truncated());

        let long = "u".repeat(40);
        header.set_owner(None, Some(&long));
        assert_eq!(header.group.len(), 32);
        assert!(header.truncated());
        // The earlier user name is untouched.
        assert_eq!(header.user, b"short");
    }

    #[test]
    fn test_device_fields() {
        let mut header = Header::empty(EntryType::CharDevice);
        header.suffix = b"dev/null".to_vec();
        header.major = 1;
        header.minor = 3;

        let block = header.encode().unwrap();
        assert_eq!(&block.devmajor, b"0000001\0");
        assert_eq!(&block.devminor, b"0000003\0");

        // Non-device entries leave the fields all-NUL.
        let mut header = Header::empty(EntryType::Regular);
        header.suffix = b"f".to_vec();
        header.major = 1;
        let block = header.encode().unwrap();
        assert_eq!(block.devmajor, [0u8; 8]);
    }

    #[test]
    fn test_negative_mtime_clamped() {
        let mut header = Header::empty(EntryType::Regular);
        header.suffix = b"old".to_vec();
        header.mtime = -1;
        let block = header.encode().unwrap();
        assert_eq!(&block.mtime, b"00000000000\0");
    }

    #[test]
    fn test_linkdest_truncation() {
        let target = vec![b't'; 140];
        let mut header = Header::empty(EntryType::Symlink);
        header.suffix = b"link".to_vec();
        header.linkdest = target;
        // Construction-time truncation is exercised via from_metadata in the
        // builder tests; encoding cuts as a safety net without flagging.
        let block = header.encode().unwrap();
        assert_eq!(block.linkname, [b't'; 100]);
    }

    #[test]
    fn test_from_metadata_truncates_long_link_target() {
        let td = tempfile::tempdir().unwrap();
        let link = td.path().join("link");
        let target = "t".repeat(140);
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let st = rustix::fs::lstat(&link).unwrap();
        let header = Header::from_metadata(b"link", &st, Some(target.as_bytes())).unwrap();
        assert_eq!(header.entry_type(), EntryType::Symlink);
        assert_eq!(header.linkdest.len(), 100);
        assert!(header.truncated());
        assert_eq!(header.size(), 0);
    }

    #[test]
    fn test_from_metadata_masks_mode_to_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let td = tempfile::tempdir().unwrap();
        let file = td.path().join("suid");
        std::fs::write(&file, b"x").unwrap();
        std::fs::set_permissions(&file, std::fs::Permissions::from_mode(0o4755)).unwrap();

        let st = rustix::fs::lstat(&file).unwrap();
        let header = Header::from_metadata(b"suid", &st, None).unwrap();
        assert_eq!(header.mode, 0o755);
    }

    #[test]
    fn test_write_octal_overflow() {
        let mut field = [0u8; 8];
        assert!(write_octal(&mut field, 0o7777777).is_ok());
        assert_eq!(&field, b"7777777\0");
        assert!(matches!(
            write_octal(&mut field, 0o7777777 + 1),
            Err(Error::SizeOverflow(_))
        ));
    }
}
