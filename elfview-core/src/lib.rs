pub mod binary;
pub mod error;
pub mod header;
pub mod ident;
pub mod program_header;

pub use binary::Binary;
pub use error::ParseError;
pub use header::{Elf64Ehdr, ObjectType, EHDR_SIZE};
pub use ident::{ElfClass, ElfData, ElfIdent, ElfOsAbi};
pub use program_header::{load_program_headers, Elf64Phdr, SegmentType, PHDR_SIZE};
