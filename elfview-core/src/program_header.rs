use crate::error::{read_exact_or_truncated, ParseError};
use crate::ident::ElfData;
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use std::fmt;
use std::io::{Read, Seek, SeekFrom};

/// On-disk size of one ELF64 program header entry.
pub const PHDR_SIZE: usize = 56;

/// Segment type from `p_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentType {
    /// `PT_NULL` (0): unused entry.
    Null,
    /// `PT_LOAD` (1): loadable segment.
    Load,
    /// `PT_DYNAMIC` (2): dynamic linking information.
    Dynamic,
    /// `PT_INTERP` (3): interpreter path.
    Interp,
    /// `PT_NOTE` (4): auxiliary information.
    Note,
    /// `PT_SHLIB` (5): reserved.
    Shlib,
    /// `PT_PHDR` (6): the program header table itself.
    Phdr,
    /// `PT_TLS` (7): thread-local storage template.
    Tls,
    /// `PT_LOOS..=PT_HIOS` (0x60000000..=0x6fffffff).
    OsSpecific(u32),
    /// `PT_LOPROC..=PT_HIPROC` (0x70000000..=0x7fffffff).
    ProcessorSpecific(u32),
    Unknown(u32),
}

impl From<u32> for SegmentType {
    fn from(v: u32) -> Self {
        match v {
            0 => SegmentType::Null,
            1 => SegmentType::Load,
            2 => SegmentType::Dynamic,
            3 => SegmentType::Interp,
            4 => SegmentType::Note,
            5 => SegmentType::Shlib,
            6 => SegmentType::Phdr,
            7 => SegmentType::Tls,
            0x60000000..=0x6fffffff => SegmentType::OsSpecific(v),
            0x70000000..=0x7fffffff => SegmentType::ProcessorSpecific(v),
            other => SegmentType::Unknown(other),
        }
    }
}

impl fmt::Display for SegmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentType::Null => write!(f, "NULL"),
            SegmentType::Load => write!(f, "LOAD"),
            SegmentType::Dynamic => write!(f, "DYNAMIC"),
            SegmentType::Interp => write!(f, "INTERP"),
            SegmentType::Note => write!(f, "NOTE"),
            SegmentType::Shlib => write!(f, "SHLIB"),
            SegmentType::Phdr => write!(f, "PHDR"),
            SegmentType::Tls => write!(f, "TLS"),
            SegmentType::OsSpecific(v) => write!(f, "OS ({v:#010x})"),
            SegmentType::ProcessorSpecific(v) => write!(f, "PROC ({v:#010x})"),
            SegmentType::Unknown(v) => write!(f, "unknown ({v:#010x})"),
        }
    }
}

/// Decoded ELF64 program header entry (`Elf64_Phdr`).
///
/// `p_flags` is the raw R/W/X bitmask; it is carried, not decoded bit by bit.
#[derive(Debug, Clone, Copy)]
pub struct Elf64Phdr {
    pub p_type: SegmentType,
    pub p_flags: u32,
    /// Offset of the segment in the file.
    pub p_offset: u64,
    /// Virtual address of the segment in memory.
    pub p_vaddr: u64,
    /// Physical address, where relevant.
    pub p_paddr: u64,
    /// Size of the segment in the file.
    pub p_filesz: u64,
    /// Size of the segment in memory.
    pub p_memsz: u64,
    /// Required alignment.
    pub p_align: u64,
}

impl Elf64Phdr {
    fn decode<B: ByteOrder>(raw: &[u8]) -> Self {
        Elf64Phdr {
            p_type: SegmentType::from(B::read_u32(&raw[0..4])),
            p_flags: B::read_u32(&raw[4..8]),
            p_offset: B::read_u64(&raw[8..16]),
            p_vaddr: B::read_u64(&raw[16..24]),
            p_paddr: B::read_u64(&raw[24..32]),
            p_filesz: B::read_u64(&raw[32..40]),
            p_memsz: B::read_u64(&raw[40..48]),
            p_align: B::read_u64(&raw[48..56]),
        }
    }
}

/// Loads the program header table from `src`.
///
/// `offset`, `entry_size` and `count` come straight from the file header
/// ([`crate::header::Elf64Ehdr::program_header_table`]); `encoding` is the
/// header's declared data encoding. The source is repositioned to `offset`
/// before reading, since the table need not follow the header contiguously.
///
/// A declared `entry_size` below [`PHDR_SIZE`] is rejected with
/// [`ParseError::UnsupportedEntrySize`]; a larger one decodes the known
/// 56-byte layout and skips the trailing bytes of each entry. A short read
/// fails with [`ParseError::TruncatedInput`] rather than returning a partial
/// table.
pub fn load_program_headers<R: Read + Seek>(
    src: &mut R,
    offset: u64,
    entry_size: u16,
    count: u16,
    encoding: ElfData,
) -> Result<Vec<Elf64Phdr>, ParseError> {
    if count == 0 {
        return Ok(Vec::new());
    }
    if (entry_size as usize) < PHDR_SIZE {
        return Err(ParseError::UnsupportedEntrySize {
            declared: entry_size,
            expected: PHDR_SIZE as u16,
        });
    }

    src.seek(SeekFrom::Start(offset))?;

    let mut raw = vec![0u8; entry_size as usize];
    let mut table = Vec::with_capacity(count as usize);
    for _ in 0..count {
        read_exact_or_truncated(src, &mut raw, "program header entry")?;
        table.push(match encoding {
            ElfData::Msb => Elf64Phdr::decode::<BigEndian>(&raw),
            _ => Elf64Phdr::decode::<LittleEndian>(&raw),
        });
    }
    Ok(table)
}
