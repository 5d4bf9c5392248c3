//! Source file registry and compact source locations.
//!
//! Spans are packed into 64 bits so that tokens and AST nodes stay small:
//! 24 bits of byte offset, 16 bits of length and 24 bits of source id.

use hashbrown::HashMap;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

/// Identifies one registered source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(NonZeroU32);

impl SourceId {
    pub(crate) fn new(id: u32) -> Self {
        SourceId(NonZeroU32::new(id).expect("SourceId must be non-zero"))
    }

    fn to_u32(self) -> u32 {
        self.0.get()
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "source#{}", self.0)
    }
}

/// A source id plus a byte offset into its buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceLoc {
    pub source_id: SourceId,
    pub offset: u32,
}

impl SourceLoc {
    pub(crate) fn new(source_id: SourceId, offset: u32) -> Self {
        SourceLoc { source_id, offset }
    }

    /// Location inside the reserved built-in buffer (id 1, offset 0).
    pub(crate) fn builtin() -> Self {
        SourceLoc::new(SourceId::new(1), 0)
    }

    pub fn source_id(&self) -> SourceId {
        self.source_id
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }
}

/// A byte range in one source buffer, packed representation:
/// bits 0-23 offset, bits 24-39 length, bits 40-63 source id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceSpan(u64);

impl Default for SourceSpan {
    fn default() -> Self {
        Self::empty()
    }
}

impl SourceSpan {
    const OFFSET_BITS: u64 = 24;
    const LENGTH_BITS: u64 = 16;
    const SOURCE_ID_BITS: u64 = 24;

    const OFFSET_MASK: u64 = (1 << Self::OFFSET_BITS) - 1;
    const LENGTH_MASK: u64 = (1 << Self::LENGTH_BITS) - 1;
    const SOURCE_ID_MASK: u64 = (1 << Self::SOURCE_ID_BITS) - 1;

    const LENGTH_SHIFT: u64 = Self::OFFSET_BITS;
    const SOURCE_ID_SHIFT: u64 = Self::OFFSET_BITS + Self::LENGTH_BITS;

    pub fn new(start: SourceLoc, end: SourceLoc) -> Self {
        if start.source_id != end.source_id {
            // Cannot represent a cross-buffer range; degrade to a zero-length
            // span at the start location.
            return Self::new_with_length(start.source_id, start.offset, 0);
        }
        let length = end.offset.saturating_sub(start.offset);
        Self::new_with_length(start.source_id, start.offset, length)
    }

    pub fn new_with_length(source_id: SourceId, offset: u32, length: u32) -> Self {
        let id = source_id.to_u32() as u64;
        assert!(id <= Self::SOURCE_ID_MASK, "SourceId exceeds 24-bit limit: {}", id);
        assert!(
            (offset as u64) <= Self::OFFSET_MASK,
            "span offset exceeds 16 MiB limit: {}",
            offset
        );
        let len = (length as u64).min(Self::LENGTH_MASK);
        Self((offset as u64) | (len << Self::LENGTH_SHIFT) | (id << Self::SOURCE_ID_SHIFT))
    }

    pub fn empty() -> Self {
        Self::new(SourceLoc::builtin(), SourceLoc::builtin())
    }

    pub fn start(&self) -> SourceLoc {
        SourceLoc {
            source_id: self.source_id(),
            offset: (self.0 & Self::OFFSET_MASK) as u32,
        }
    }

    pub fn end(&self) -> SourceLoc {
        let offset = (self.0 & Self::OFFSET_MASK) as u32;
        let length = ((self.0 >> Self::LENGTH_SHIFT) & Self::LENGTH_MASK) as u32;
        SourceLoc {
            source_id: self.source_id(),
            offset: offset + length,
        }
    }

    pub fn source_id(&self) -> SourceId {
        let id = ((self.0 >> Self::SOURCE_ID_SHIFT) & Self::SOURCE_ID_MASK) as u32;
        SourceId::new(id)
    }

    /// Merge two spans into one covering both. Spans from different buffers
    /// keep the left-hand span unchanged.
    pub fn merge(self, other: SourceSpan) -> SourceSpan {
        if self.source_id() != other.source_id() {
            return self;
        }
        let start = self.start().offset.min(other.start().offset);
        let end = self.end().offset.max(other.end().offset);
        let id = self.source_id();
        Self::new(SourceLoc::new(id, start), SourceLoc::new(id, end))
    }
}

impl std::fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}..{}", self.source_id(), self.start().offset, self.end().offset)
    }
}

/// Information kept per registered source buffer.
#[derive(Debug)]
pub struct FileInfo {
    pub file_id: SourceId,
    pub path: PathBuf,
    pub buffer: String,
    /// Byte offsets of line starts, for line/column lookup.
    pub line_starts: Vec<u32>,
}

/// Registry of source buffers. Id 1 is reserved for built-ins, real buffers
/// start at 2.
pub struct SourceManager {
    file_infos: Vec<FileInfo>,
    path_to_id: HashMap<PathBuf, SourceId>,
    next_file_id: u32,
}

impl Default for SourceManager {
    fn default() -> Self {
        SourceManager {
            file_infos: Vec::new(),
            path_to_id: HashMap::new(),
            next_file_id: 2,
        }
    }
}

impl SourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a file from disk and register it.
    pub fn add_file_from_path(&mut self, path: &Path) -> Result<SourceId, std::io::Error> {
        let buffer = std::fs::read_to_string(path)?;
        Ok(self.add_buffer(buffer, &path.to_string_lossy()))
    }

    /// Register an in-memory buffer under the given name.
    pub fn add_buffer(&mut self, buffer: String, path: &str) -> SourceId {
        let file_id = SourceId::new(self.next_file_id);
        self.next_file_id += 1;

        let mut line_starts = vec![0];
        for (i, byte) in buffer.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push((i + 1) as u32);
            }
        }

        let path_buf = PathBuf::from(path);
        self.path_to_id.insert(path_buf.clone(), file_id);
        self.file_infos.push(FileInfo {
            file_id,
            path: path_buf,
            buffer,
            line_starts,
        });
        file_id
    }

    pub fn get_file_info(&self, source_id: SourceId) -> Option<&FileInfo> {
        let id = source_id.to_u32();
        if id < 2 {
            return None;
        }
        self.file_infos.get(id as usize - 2)
    }

    /// Full text of a registered buffer.
    pub fn get_buffer(&self, source_id: SourceId) -> &str {
        self.get_file_info(source_id)
            .map(|fi| fi.buffer.as_str())
            .unwrap_or("")
    }

    /// 1-based line and column for a location.
    pub fn get_line_column(&self, loc: SourceLoc) -> Option<(u32, u32)> {
        let file_info = self.get_file_info(loc.source_id())?;
        let offset = loc.offset();
        let line_starts = &file_info.line_starts;
        let idx = line_starts.partition_point(|&start| start <= offset);
        if idx == 0 {
            return Some((1, offset + 1));
        }
        let line_idx = idx - 1;
        let column = offset - line_starts[line_idx];
        Some((line_idx as u32 + 1, column + 1))
    }
}
