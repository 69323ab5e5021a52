//! Diagnostic: print the structure of an AC1015 DWG file.
//!
//! Usage: `dwg_dump <file.dwg> [--sequential] [--crc] [--drop-opaque] [--header]`
use std::env;
use std::process;

use anyhow::{bail, Context, Result};

use dwgr15::{DwgReader, DwgReaderConfiguration};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let mut path = None;
    let mut config = DwgReaderConfiguration::default();
    let mut show_header = false;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--sequential" => config.parallel = false,
            "--crc" => config.validate_crc = true,
            "--drop-opaque" => config.keep_opaque = false,
            "--header" => show_header = true,
            flag if flag.starts_with("--") => bail!("unknown option {flag}"),
            _ => path = Some(arg),
        }
    }
    let Some(path) = path else {
        bail!("usage: dwg_dump <file.dwg> [--sequential] [--crc] [--drop-opaque] [--header]");
    };

    let doc = DwgReader::from_file(&path)
        .with_context(|| format!("cannot open {path}"))?
        .with_config(config)
        .read()
        .with_context(|| format!("cannot decode {path}"))?;

    println!("{path}");
    println!("  maintenance version: {}", doc.maintenance_version());
    println!("  code page: {}", doc.code_page());

    println!("\nSections:");
    for (kind, section) in doc.sections() {
        println!(
            "  {:<14} offset {:#010X}  size {:>8}",
            format!("{kind:?}"),
            section.byte_offset,
            section.byte_size
        );
    }
    match doc.preview() {
        Some(preview) => println!(
            "  preview: {}",
            preview
                .kind()
                .map_or_else(|| "header only".to_string(), |k| format!("{k:?}"))
        ),
        None => println!("  preview: none"),
    }

    println!("\nHeader: {} variables", doc.header().len());
    if show_header {
        for (name, value) in doc.header().iter() {
            println!("  {name:<12} {value}");
        }
    }

    println!("\nClasses: {}", doc.classes().len());
    for class in doc.classes().iter() {
        println!(
            "  {:>4}  {:<28} {}{}",
            class.class_number,
            class.dxf_name,
            class.native_name,
            if class.is_entity() { "  (entity)" } else { "" }
        );
    }

    let stats = doc.stats();
    println!(
        "\nRecords: {} decoded, {} opaque, {} dropped, {} in object map",
        stats.records,
        stats.opaque,
        stats.dropped,
        doc.object_map().len()
    );
    for (kind, count) in &stats.per_kind {
        println!("  {:<22} {count}", kind.name());
    }

    if !doc.notifications().is_empty() {
        println!("\nNotifications: {}", doc.notifications().len());
        for notification in doc.notifications().iter() {
            println!("  {notification}");
        }
    }
    Ok(())
}
