use crate::error::{read_exact_or_truncated, ParseError};
use crate::ident::{ElfData, ElfIdent, EI_NIDENT};
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use std::fmt;
use std::io::Read;

/// On-disk size of the ELF64 file header.
pub const EHDR_SIZE: usize = 64;

/// Object file type from `e_type`.
///
/// The two reserved ranges decode to range variants carrying the raw value;
/// anything else outside the defined set lands in `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    /// `ET_NONE` (0): no file type.
    None,
    /// `ET_REL` (1): relocatable file.
    Rel,
    /// `ET_EXEC` (2): executable file.
    Exec,
    /// `ET_DYN` (3): shared object.
    Dyn,
    /// `ET_CORE` (4): core dump.
    Core,
    /// `ET_LOOS..=ET_HIOS` (0xfe00..=0xfeff).
    OsSpecific(u16),
    /// `ET_LOPROC..=ET_HIPROC` (0xff00..=0xffff).
    ProcessorSpecific(u16),
    Unknown(u16),
}

impl From<u16> for ObjectType {
    fn from(v: u16) -> Self {
        match v {
            0 => ObjectType::None,
            1 => ObjectType::Rel,
            2 => ObjectType::Exec,
            3 => ObjectType::Dyn,
            4 => ObjectType::Core,
            0xfe00..=0xfeff => ObjectType::OsSpecific(v),
            0xff00..=0xffff => ObjectType::ProcessorSpecific(v),
            other => ObjectType::Unknown(other),
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectType::None => write!(f, "none"),
            ObjectType::Rel => write!(f, "relocatable file"),
            ObjectType::Exec => write!(f, "executable file"),
            ObjectType::Dyn => write!(f, "shared object file"),
            ObjectType::Core => write!(f, "core file"),
            ObjectType::OsSpecific(v) => write!(f, "OS-specific ({v:#x})"),
            ObjectType::ProcessorSpecific(v) => write!(f, "processor-specific ({v:#x})"),
            ObjectType::Unknown(v) => write!(f, "unknown ({v:#x})"),
        }
    }
}

/// Decoded ELF64 file header (`Elf64_Ehdr`).
///
/// Field names follow the ELF specification. Multi-byte fields are decoded
/// in the byte order declared by `ident.data`, not the host's.
///
/// Reference: [ELF Specification v1.2](https://refspecs.linuxfoundation.org/elf/elf.pdf)
#[derive(Debug, Clone, Copy)]
pub struct Elf64Ehdr {
    /// Decoded identification block (first 16 bytes).
    pub ident: ElfIdent,

    /// Object file type (relocatable, executable, shared, core, ...).
    pub e_type: ObjectType,

    /// Target architecture, raw. `EM_X86_64` is 62, `EM_AARCH64` is 183.
    // TODO: map e_machine values to symbolic architecture names.
    pub e_machine: u16,

    /// ELF version (`EV_CURRENT` = 1).
    pub e_version: u32,

    /// Virtual address of the program entry point.
    pub e_entry: u64,

    /// File offset of the program header table.
    pub e_phoff: u64,

    /// File offset of the section header table.
    pub e_shoff: u64,

    /// Processor-specific flags.
    pub e_flags: u32,

    /// Size of this header (64 for ELF64).
    pub e_ehsize: u16,

    /// Size of one program header table entry.
    pub e_phentsize: u16,

    /// Number of program header table entries.
    pub e_phnum: u16,

    /// Size of one section header table entry.
    pub e_shentsize: u16,

    /// Number of section header table entries.
    pub e_shnum: u16,

    /// Index of the section header string table.
    pub e_shstrndx: u16,
}

impl Elf64Ehdr {
    /// Decodes the file header from the first [`EHDR_SIZE`] bytes of `raw`.
    ///
    /// Pure: no I/O, no allocation beyond the returned record.
    pub fn parse(raw: &[u8]) -> Result<Self, ParseError> {
        if raw.len() < EHDR_SIZE {
            return Err(ParseError::TruncatedInput {
                context: "ELF file header",
                needed: EHDR_SIZE,
            });
        }

        let ident = ElfIdent::parse(&raw[..EI_NIDENT])?;
        let tail = &raw[EI_NIDENT..EHDR_SIZE];
        match ident.data {
            ElfData::Msb => Ok(Self::decode_tail::<BigEndian>(ident, tail)),
            ElfData::Lsb => Ok(Self::decode_tail::<LittleEndian>(ident, tail)),
            other => {
                log::warn!("data encoding is {other}; decoding fields as little-endian");
                Ok(Self::decode_tail::<LittleEndian>(ident, tail))
            }
        }
    }

    /// Reads exactly [`EHDR_SIZE`] bytes from `src` and decodes them.
    pub fn from_reader<R: Read>(src: &mut R) -> Result<Self, ParseError> {
        let mut raw = [0u8; EHDR_SIZE];
        read_exact_or_truncated(src, &mut raw, "ELF file header")?;
        Self::parse(&raw)
    }

    // `tail` is the 48 bytes following the ident block.
    fn decode_tail<B: ByteOrder>(ident: ElfIdent, tail: &[u8]) -> Self {
        Elf64Ehdr {
            ident,
            e_type: ObjectType::from(B::read_u16(&tail[0..2])),
            e_machine: B::read_u16(&tail[2..4]),
            e_version: B::read_u32(&tail[4..8]),
            e_entry: B::read_u64(&tail[8..16]),
            e_phoff: B::read_u64(&tail[16..24]),
            e_shoff: B::read_u64(&tail[24..32]),
            e_flags: B::read_u32(&tail[32..36]),
            e_ehsize: B::read_u16(&tail[36..38]),
            e_phentsize: B::read_u16(&tail[38..40]),
            e_phnum: B::read_u16(&tail[40..42]),
            e_shentsize: B::read_u16(&tail[42..44]),
            e_shnum: B::read_u16(&tail[44..46]),
            e_shstrndx: B::read_u16(&tail[46..48]),
        }
    }

    /// Returns the virtual address of the entry point.
    pub fn entry_point(&self) -> u64 {
        self.e_entry
    }

    /// Returns true if the binary represents an executable (vs object/lib).
    pub fn is_executable(&self) -> bool {
        self.e_type == ObjectType::Exec
    }

    /// Where the program header table lives: (file offset, entry size,
    /// entry count). The single source of truth consumed by
    /// [`crate::program_header::load_program_headers`].
    pub fn program_header_table(&self) -> (u64, u16, u16) {
        (self.e_phoff, self.e_phentsize, self.e_phnum)
    }
}
