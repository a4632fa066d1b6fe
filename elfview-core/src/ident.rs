use crate::error::ParseError;
use std::fmt;

/// Length of the identification block at the start of every ELF file.
pub const EI_NIDENT: usize = 16;

/// The four signature bytes: `0x7F 'E' 'L' 'F'`.
pub const ELF_MAGIC: [u8; 4] = [0x7F, b'E', b'L', b'F'];

/// File class from `e_ident[4]`: address-size of the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElfClass {
    None,
    Elf32,
    Elf64,
    Unknown(u8),
}

impl From<u8> for ElfClass {
    fn from(b: u8) -> Self {
        match b {
            0 => ElfClass::None,
            1 => ElfClass::Elf32,
            2 => ElfClass::Elf64,
            other => ElfClass::Unknown(other),
        }
    }
}

impl fmt::Display for ElfClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElfClass::None => write!(f, "none"),
            ElfClass::Elf32 => write!(f, "32-bit"),
            ElfClass::Elf64 => write!(f, "64-bit"),
            ElfClass::Unknown(b) => write!(f, "unknown ({b:#x})"),
        }
    }
}

/// Data encoding from `e_ident[5]`: byte order of multi-byte fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElfData {
    None,
    /// Two's complement, little-endian.
    Lsb,
    /// Two's complement, big-endian.
    Msb,
    Unknown(u8),
}

impl From<u8> for ElfData {
    fn from(b: u8) -> Self {
        match b {
            0 => ElfData::None,
            1 => ElfData::Lsb,
            2 => ElfData::Msb,
            other => ElfData::Unknown(other),
        }
    }
}

impl fmt::Display for ElfData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElfData::None => write!(f, "none"),
            ElfData::Lsb => write!(f, "little-endian"),
            ElfData::Msb => write!(f, "big-endian"),
            ElfData::Unknown(b) => write!(f, "unknown ({b:#x})"),
        }
    }
}

/// OS/ABI from `e_ident[7]`.
///
/// Covers the vendor codes listed in the System V gABI; anything else lands
/// in `Unknown` and is not treated as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElfOsAbi {
    SysV,
    HpUx,
    NetBsd,
    Gnu,
    Solaris,
    Aix,
    Irix,
    FreeBsd,
    Tru64,
    Modesto,
    OpenBsd,
    OpenVms,
    ArmAeabi,
    Arm,
    Standalone,
    Unknown(u8),
}

impl From<u8> for ElfOsAbi {
    fn from(b: u8) -> Self {
        match b {
            0 => ElfOsAbi::SysV,
            1 => ElfOsAbi::HpUx,
            2 => ElfOsAbi::NetBsd,
            3 => ElfOsAbi::Gnu,
            6 => ElfOsAbi::Solaris,
            7 => ElfOsAbi::Aix,
            8 => ElfOsAbi::Irix,
            9 => ElfOsAbi::FreeBsd,
            10 => ElfOsAbi::Tru64,
            11 => ElfOsAbi::Modesto,
            12 => ElfOsAbi::OpenBsd,
            13 => ElfOsAbi::OpenVms,
            64 => ElfOsAbi::ArmAeabi,
            97 => ElfOsAbi::Arm,
            255 => ElfOsAbi::Standalone,
            other => ElfOsAbi::Unknown(other),
        }
    }
}

impl fmt::Display for ElfOsAbi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElfOsAbi::SysV => "System V",
            ElfOsAbi::HpUx => "HP-UX",
            ElfOsAbi::NetBsd => "NetBSD",
            ElfOsAbi::Gnu => "GNU/Linux",
            ElfOsAbi::Solaris => "Sun Solaris",
            ElfOsAbi::Aix => "IBM AIX",
            ElfOsAbi::Irix => "SGI Irix",
            ElfOsAbi::FreeBsd => "FreeBSD",
            ElfOsAbi::Tru64 => "Compaq TRU64 UNIX",
            ElfOsAbi::Modesto => "Novell Modesto",
            ElfOsAbi::OpenBsd => "OpenBSD",
            ElfOsAbi::OpenVms => "OpenVMS",
            ElfOsAbi::ArmAeabi => "ARM EABI",
            ElfOsAbi::Arm => "ARM",
            ElfOsAbi::Standalone => "Standalone (embedded)",
            ElfOsAbi::Unknown(b) => return write!(f, "unknown ({b:#x})"),
        };
        write!(f, "{name}")
    }
}

/// Decoded identification block (`e_ident`, the first 16 bytes of the file).
#[derive(Debug, Clone, Copy)]
pub struct ElfIdent {
    /// The raw 16 ident bytes, kept for display.
    pub bytes: [u8; EI_NIDENT],
    pub class: ElfClass,
    pub data: ElfData,
    /// Ident version byte; `1` is the only version ever defined.
    pub version: u8,
    pub os_abi: ElfOsAbi,
    pub abi_version: u8,
}

impl ElfIdent {
    /// Decodes the identification block from the start of `raw`.
    ///
    /// Fails with [`ParseError::InvalidMagic`] when the signature bytes do
    /// not match; every other byte value decodes to some variant.
    pub fn parse(raw: &[u8]) -> Result<Self, ParseError> {
        if raw.len() < EI_NIDENT {
            return Err(ParseError::TruncatedInput {
                context: "ELF identification block",
                needed: EI_NIDENT,
            });
        }

        let mut bytes = [0u8; EI_NIDENT];
        bytes.copy_from_slice(&raw[..EI_NIDENT]);

        if bytes[..4] != ELF_MAGIC {
            let mut found = [0u8; 4];
            found.copy_from_slice(&bytes[..4]);
            return Err(ParseError::InvalidMagic { found });
        }

        Ok(ElfIdent {
            bytes,
            class: ElfClass::from(bytes[4]),
            data: ElfData::from(bytes[5]),
            version: bytes[6],
            os_abi: ElfOsAbi::from(bytes[7]),
            abi_version: bytes[8],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident_bytes(class: u8, data: u8, osabi: u8) -> [u8; EI_NIDENT] {
        let mut b = [0u8; EI_NIDENT];
        b[..4].copy_from_slice(&ELF_MAGIC);
        b[4] = class;
        b[5] = data;
        b[6] = 1;
        b[7] = osabi;
        b[8] = 0x2A;
        b
    }

    #[test]
    fn valid_ident_decodes() {
        let ident = ElfIdent::parse(&ident_bytes(2, 1, 0)).unwrap();
        assert_eq!(ident.class, ElfClass::Elf64);
        assert_eq!(ident.data, ElfData::Lsb);
        assert_eq!(ident.version, 1);
        assert_eq!(ident.os_abi, ElfOsAbi::SysV);
        assert_eq!(ident.abi_version, 0x2A);
    }

    #[test]
    fn bad_magic_is_invalid_magic() {
        let mut b = ident_bytes(2, 1, 0);
        b[0] = 0x7E;
        match ElfIdent::parse(&b).unwrap_err() {
            ParseError::InvalidMagic { found } => assert_eq!(found, [0x7E, b'E', b'L', b'F']),
            other => panic!("expected InvalidMagic, got {other:?}"),
        }
    }

    #[test]
    fn short_ident_is_truncated() {
        assert!(matches!(
            ElfIdent::parse(&[0x7F, b'E', b'L']).unwrap_err(),
            ParseError::TruncatedInput { .. }
        ));
    }

    #[test]
    fn every_class_byte_maps_to_a_variant() {
        for b in 0..=u8::MAX {
            match ElfClass::from(b) {
                ElfClass::None => assert_eq!(b, 0),
                ElfClass::Elf32 => assert_eq!(b, 1),
                ElfClass::Elf64 => assert_eq!(b, 2),
                ElfClass::Unknown(v) => assert_eq!(v, b),
            }
        }
    }

    #[test]
    fn every_data_byte_maps_to_a_variant() {
        for b in 0..=u8::MAX {
            match ElfData::from(b) {
                ElfData::None => assert_eq!(b, 0),
                ElfData::Lsb => assert_eq!(b, 1),
                ElfData::Msb => assert_eq!(b, 2),
                ElfData::Unknown(v) => assert_eq!(v, b),
            }
        }
    }

    #[test]
    fn unknown_osabi_is_not_an_error() {
        let ident = ElfIdent::parse(&ident_bytes(2, 1, 0x42)).unwrap();
        assert_eq!(ident.os_abi, ElfOsAbi::Unknown(0x42));
        assert_eq!(ident.os_abi.to_string(), "unknown (0x42)");
    }

    #[test]
    fn known_osabi_codes_round_trip() {
        assert_eq!(ElfOsAbi::from(3), ElfOsAbi::Gnu);
        assert_eq!(ElfOsAbi::from(9), ElfOsAbi::FreeBsd);
        assert_eq!(ElfOsAbi::from(97), ElfOsAbi::Arm);
        assert_eq!(ElfOsAbi::from(255), ElfOsAbi::Standalone);
    }
}
