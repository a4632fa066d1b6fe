use crate::header::Elf64Ehdr;
use crate::ident::ElfClass;
use crate::program_header::{load_program_headers, Elf64Phdr};
use anyhow::{Context, Result};
use std::io::Cursor;

/// A fully decoded binary: the file header plus its program header table.
///
/// The file is read into memory once; no handle is held after `open`
/// returns. Both records are immutable and owned by the caller.
#[derive(Debug)]
pub struct Binary {
    pub path: String,
    pub header: Elf64Ehdr,
    pub program_headers: Vec<Elf64Phdr>,
}

impl Binary {
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let buf = std::fs::read(&path)
            .with_context(|| format!("reading {}", path.as_ref().display()))?;
        let mut cursor = Cursor::new(&buf);

        let header = Elf64Ehdr::from_reader(&mut cursor)?;
        if header.ident.class != ElfClass::Elf64 {
            log::warn!(
                "class byte says {}; decoding with the ELF64 layout anyway",
                header.ident.class
            );
        }

        let (phoff, phentsize, phnum) = header.program_header_table();
        if phnum == 0 || phoff == 0 {
            log::info!("no program header table declared");
        }
        let program_headers = load_program_headers(
            &mut cursor,
            phoff,
            phentsize,
            phnum,
            header.ident.data,
        )?;
        log::info!(
            "decoded {} program header entries at {phoff:#x}",
            program_headers.len()
        );

        Ok(Self {
            path: path.as_ref().display().to_string(),
            header,
            program_headers,
        })
    }

    pub fn entry_point(&self) -> u64 {
        self.header.entry_point()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::EHDR_SIZE;
    use crate::ident::ELF_MAGIC;
    use crate::program_header::{SegmentType, PHDR_SIZE};
    use byteorder::{ByteOrder, LittleEndian};

    // Minimal little-endian ELF64 image: header at 0, one LOAD phdr at 0x40.
    fn sample_image() -> Vec<u8> {
        let mut img = vec![0u8; EHDR_SIZE + PHDR_SIZE];
        img[..4].copy_from_slice(&ELF_MAGIC);
        img[4] = 2;
        img[5] = 1;
        img[6] = 1;
        LittleEndian::write_u16(&mut img[16..18], 2);
        LittleEndian::write_u64(&mut img[24..32], 0x401000);
        LittleEndian::write_u64(&mut img[32..40], EHDR_SIZE as u64);
        LittleEndian::write_u16(&mut img[52..54], 64);
        LittleEndian::write_u16(&mut img[54..56], PHDR_SIZE as u16);
        LittleEndian::write_u16(&mut img[56..58], 1);
        LittleEndian::write_u32(&mut img[64..68], 1); // PT_LOAD
        LittleEndian::write_u64(&mut img[72..80], 0x1000);
        img
    }

    #[test]
    fn open_decodes_header_and_table() {
        let path = std::env::temp_dir().join("elfview-binary-open-test.bin");
        std::fs::write(&path, sample_image()).unwrap();

        let bin = Binary::open(&path).unwrap();
        assert_eq!(bin.entry_point(), 0x401000);
        assert_eq!(bin.program_headers.len(), 1);
        assert_eq!(bin.program_headers[0].p_type, SegmentType::Load);
        assert_eq!(bin.program_headers[0].p_offset, 0x1000);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn open_rejects_non_elf() {
        let path = std::env::temp_dir().join("elfview-binary-notelf-test.bin");
        std::fs::write(&path, b"#!/bin/sh\necho not an elf\n").unwrap();
        assert!(Binary::open(&path).is_err());
        std::fs::remove_file(&path).ok();
    }
}
