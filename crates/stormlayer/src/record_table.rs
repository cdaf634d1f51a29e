//! Client database (`.dbc`) record tables.
//!
//! A WDBC file is a 20-byte header, `record_count` fixed-size records and a
//! string block. String fields hold byte offsets into the string block.
//! This reader only slices the resolved bytes; it does not know any table
//! schema.

use crate::{ArchiveError, Result};
use binrw::{BinRead, BinWrite};
use bytes::Bytes;
use std::io::Cursor;

/// Magic bytes of a WDBC file
pub const WDBC_MAGIC: [u8; 4] = *b"WDBC";

/// Size of the WDBC header in bytes
pub const HEADER_SIZE: usize = 20;

/// WDBC header
///
/// All fields are little-endian.
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct RecordTableHeader {
    /// Magic signature, always "WDBC"
    #[br(assert(magic == WDBC_MAGIC, "Invalid record table magic: {:?}", magic))]
    pub magic: [u8; 4],

    /// Number of records
    pub record_count: u32,

    /// Number of 4-byte fields per record
    pub field_count: u32,

    /// Size of one record in bytes
    pub record_size: u32,

    /// Size of the string block in bytes
    pub string_block_size: u32,
}

impl RecordTableHeader {
    /// Create a header with the given layout
    pub const fn new(
        record_count: u32,
        field_count: u32,
        record_size: u32,
        string_block_size: u32,
    ) -> Self {
        Self {
            magic: WDBC_MAGIC,
            record_count,
            field_count,
            record_size,
            string_block_size,
        }
    }

    /// Total file size implied by the header
    pub const fn expected_len(&self) -> u64 {
        HEADER_SIZE as u64
            + self.record_count as u64 * self.record_size as u64
            + self.string_block_size as u64
    }
}

/// A parsed record table backed by the extracted bytes
#[derive(Debug, Clone)]
pub struct RecordTable {
    header: RecordTableHeader,
    data: Bytes,
}

impl RecordTable {
    /// Parse a record table from extracted archive bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::InvalidRecordTable`] if the header is invalid
    /// or the data is shorter than the header declares.
    pub fn parse(data: Bytes) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(ArchiveError::InvalidRecordTable(format!(
                "expected at least {HEADER_SIZE} bytes, got {}",
                data.len()
            )));
        }

        let header = RecordTableHeader::read(&mut Cursor::new(&data[..HEADER_SIZE]))
            .map_err(|e| ArchiveError::InvalidRecordTable(e.to_string()))?;

        if u64::from(header.field_count) * 4 > u64::from(header.record_size) {
            return Err(ArchiveError::InvalidRecordTable(format!(
                "{} fields do not fit in {}-byte records",
                header.field_count, header.record_size
            )));
        }

        if (data.len() as u64) < header.expected_len() {
            return Err(ArchiveError::InvalidRecordTable(format!(
                "header declares {} bytes, got {}",
                header.expected_len(),
                data.len()
            )));
        }

        Ok(Self { header, data })
    }

    /// Table header
    pub const fn header(&self) -> &RecordTableHeader {
        &self.header
    }

    /// Number of records
    pub const fn record_count(&self) -> u32 {
        self.header.record_count
    }

    /// Number of fields per record
    pub const fn field_count(&self) -> u32 {
        self.header.field_count
    }

    /// Size of one record in bytes
    pub const fn record_size(&self) -> u32 {
        self.header.record_size
    }

    /// Record at `index`
    pub fn record(&self, index: u32) -> Option<Record<'_>> {
        if index >= self.header.record_count {
            return None;
        }

        let size = self.header.record_size as usize;
        let start = HEADER_SIZE + index as usize * size;
        Some(Record {
            table: self,
            data: &self.data[start..start + size],
        })
    }

    /// All records in file order
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        (0..self.header.record_count).filter_map(|i| self.record(i))
    }

    fn string_block(&self) -> &[u8] {
        let start = HEADER_SIZE
            + self.header.record_count as usize * self.header.record_size as usize;
        &self.data[start..start + self.header.string_block_size as usize]
    }

    /// Null-terminated string at `offset` in the string block
    pub fn string_at(&self, offset: u32) -> Option<&str> {
        let block = self.string_block();
        let tail = block.get(offset as usize..)?;
        let end = tail.iter().position(|&b| b == 0)?;
        std::str::from_utf8(&tail[..end]).ok()
    }
}

/// One record of a [`RecordTable`]
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    table: &'a RecordTable,
    data: &'a [u8],
}

impl<'a> Record<'a> {
    /// Raw record bytes
    pub const fn bytes(&self) -> &'a [u8] {
        self.data
    }

    fn field_bytes(&self, field: u32) -> Option<[u8; 4]> {
        let start = field as usize * 4;
        self.data.get(start..start + 4)?.try_into().ok()
    }

    /// Field as unsigned 32-bit integer
    pub fn get_u32(&self, field: u32) -> Option<u32> {
        self.field_bytes(field).map(u32::from_le_bytes)
    }

    /// Field as signed 32-bit integer
    pub fn get_i32(&self, field: u32) -> Option<i32> {
        self.field_bytes(field).map(i32::from_le_bytes)
    }

    /// Field as 32-bit float
    pub fn get_f32(&self, field: u32) -> Option<f32> {
        self.field_bytes(field).map(f32::from_le_bytes)
    }

    /// Field as a string block reference
    pub fn get_string(&self, field: u32) -> Option<&'a str> {
        let offset = self.get_u32(field)?;
        self.table.string_at(offset)
    }
}
