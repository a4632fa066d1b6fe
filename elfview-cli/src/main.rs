use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use elfview_core::{Binary, Elf64Ehdr, Elf64Phdr};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Simple ELF64 introspection CLI
#[derive(Parser)]
#[command(
    name = "elfview",
    about = "Inspect ELF64 binaries (file header and program header table)",
    version,
    author
)]
struct Cli {
    /// Path to binary file
    #[arg(required = true)]
    path: std::path::PathBuf,

    /// Emit JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Dump every file header field
    Header,
    /// List the program header table
    Segments,
    /// Show entry point of binary
    Entry,
}

#[derive(Serialize)]
struct HeaderReport {
    ident_bytes: String,
    class: String,
    data: String,
    ident_version: u8,
    os_abi: String,
    abi_version: u8,
    object_type: String,
    machine: String,
    version: u32,
    entry: String,
    program_header_offset: String,
    section_header_offset: String,
    flags: u32,
    header_size: u16,
    program_header_entry_size: u16,
    program_header_count: u16,
    section_header_entry_size: u16,
    section_header_count: u16,
    section_name_table_index: u16,
}

impl HeaderReport {
    fn new(hdr: &Elf64Ehdr) -> Self {
        let ident_bytes = hdr
            .ident
            .bytes
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<Vec<_>>()
            .join(" ");
        HeaderReport {
            ident_bytes,
            class: hdr.ident.class.to_string(),
            data: hdr.ident.data.to_string(),
            ident_version: hdr.ident.version,
            os_abi: hdr.ident.os_abi.to_string(),
            abi_version: hdr.ident.abi_version,
            object_type: hdr.e_type.to_string(),
            // Raw hex; no symbolic architecture names yet.
            machine: format!("{:#x}", hdr.e_machine),
            version: hdr.e_version,
            entry: format!("{:#x}", hdr.e_entry),
            program_header_offset: format!("{:#x}", hdr.e_phoff),
            section_header_offset: format!("{:#x}", hdr.e_shoff),
            flags: hdr.e_flags,
            header_size: hdr.e_ehsize,
            program_header_entry_size: hdr.e_phentsize,
            program_header_count: hdr.e_phnum,
            section_header_entry_size: hdr.e_shentsize,
            section_header_count: hdr.e_shnum,
            section_name_table_index: hdr.e_shstrndx,
        }
    }
}

#[derive(Tabled, Serialize)]
struct SegmentRow {
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Flags")]
    flags: String,
    #[tabled(rename = "Offset")]
    offset: String,
    #[tabled(rename = "VirtAddr")]
    vaddr: String,
    #[tabled(rename = "PhysAddr")]
    paddr: String,
    #[tabled(rename = "FileSize")]
    filesz: String,
    #[tabled(rename = "MemSize")]
    memsz: String,
    #[tabled(rename = "Align")]
    align: String,
}

impl SegmentRow {
    fn new(ph: &Elf64Phdr) -> Self {
        SegmentRow {
            kind: ph.p_type.to_string(),
            flags: format!("{:#x}", ph.p_flags),
            offset: format!("{:#x}", ph.p_offset),
            vaddr: format!("{:#x}", ph.p_vaddr),
            paddr: format!("{:#x}", ph.p_paddr),
            filesz: format!("{:#x}", ph.p_filesz),
            memsz: format!("{:#x}", ph.p_memsz),
            align: format!("{:#x}", ph.p_align),
        }
    }
}

fn print_pair(name: &str, value: impl std::fmt::Display) {
    // Pad before colorizing; escape codes would throw off the width.
    println!("{} {}", format!("{name:<44}").cyan(), value);
}

fn dump_header(report: &HeaderReport) {
    print_pair("Magic", &report.ident_bytes);
    print_pair("Class", &report.class);
    print_pair("Data", &report.data);
    if report.ident_version == 1 {
        print_pair("Version", "1 (current)");
    } else {
        print_pair("Version", report.ident_version);
    }
    print_pair("OS/ABI", &report.os_abi);
    print_pair("ABI version", report.abi_version);
    print_pair("Type", &report.object_type);
    print_pair("Machine", &report.machine);
    print_pair("ELF version", report.version);
    print_pair("Entry point address", &report.entry);
    print_pair("Start of program headers", &report.program_header_offset);
    print_pair("Start of section headers", &report.section_header_offset);
    print_pair("Flags", report.flags);
    print_pair("Size of this header", report.header_size);
    print_pair("Size of program header entry", report.program_header_entry_size);
    print_pair("Number of program headers", report.program_header_count);
    print_pair("Size of section header entry", report.section_header_entry_size);
    print_pair("Number of section headers", report.section_header_count);
    print_pair("Section name string table index", report.section_name_table_index);
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let bin = Binary::open(&cli.path)?;

    match cli.command {
        Command::Header => {
            let report = HeaderReport::new(&bin.header);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", format!("ELF file header: {}", bin.path).bold());
                dump_header(&report);
            }
        }

        Command::Segments => {
            let rows: Vec<SegmentRow> = bin.program_headers.iter().map(SegmentRow::new).collect();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else if rows.is_empty() {
                println!("No program headers declared.");
            } else {
                println!("{}", Table::new(&rows).with(Style::psql()));
            }
        }

        Command::Entry => {
            let entry = bin.entry_point();
            if cli.json {
                println!("{}", serde_json::json!({ "entry": format!("{entry:#x}") }));
            } else {
                println!("Entry point: {entry:#x}");
            }
        }
    }

    Ok(())
}
