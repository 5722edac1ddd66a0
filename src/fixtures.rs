//! Archive and image builders shared by the unit tests

use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// A gradient JPEG of the given size
pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 0]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageOutputFormat::Jpeg(90))
        .unwrap();
    buf.into_inner()
}

/// Build a ZIP in memory; names ending in `/` become directories
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    for (name, data) in entries {
        if name.ends_with('/') {
            zip.add_directory(*name, options).unwrap();
        } else {
            zip.start_file(*name, options).unwrap();
            zip.write_all(data).unwrap();
        }
    }

    zip.finish().unwrap().into_inner()
}

pub fn write_cbz(path: &Path, entries: &[(&str, &[u8])]) {
    fs::write(path, zip_bytes(entries)).unwrap();
}

/// Rewrite the compression method of `name` to one no reader supports,
/// so the archive still opens but that entry cannot.
pub fn break_entry(zip: &mut [u8], name: &str) {
    const LOCAL: &[u8] = b"PK\x03\x04";
    const CENTRAL: &[u8] = b"PK\x01\x02";
    let needle = name.as_bytes();
    let mut patched = 0;

    for pos in 0..zip.len().saturating_sub(46) {
        let (method_at, name_len_at, name_at) = if &zip[pos..pos + 4] == LOCAL {
            (pos + 8, pos + 26, pos + 30)
        } else if &zip[pos..pos + 4] == CENTRAL {
            (pos + 10, pos + 28, pos + 46)
        } else {
            continue;
        };

        let name_len = u16::from_le_bytes([zip[name_len_at], zip[name_len_at + 1]]) as usize;
        if zip.get(name_at..name_at + name_len) == Some(needle) {
            zip[method_at..method_at + 2].copy_from_slice(&97u16.to_le_bytes());
            patched += 1;
        }
    }

    assert_eq!(patched, 2, "entry {name:?} not found in both headers");
}

/// Spooled image files the EPUB builder left behind in `dir`
pub fn spooled_images(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|n| n.starts_with(crate::epub_document::SPOOL_PREFIX))
        .collect();
    names.sort();
    names
}

/// The `._name` resource-fork stub macOS leaves next to every file it zips
pub fn apple_double() -> Vec<u8> {
    let mut stub = vec![0x00, 0x05, 0x16, 0x07, 0x00, 0x02, 0x00, 0x00];
    stub.extend_from_slice(b"Mac OS X        ");
    stub.extend_from_slice(&[0; 58]);
    stub
}

/// CRC32 with the reflected 0xEDB88320 polynomial, as RAR headers use
fn crc32(data: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ 0xEDB8_8320
            } else {
                crc >> 1
            };
        }
    }
    crc ^ 0xFFFF_FFFF
}

/// Append a RAR 4 block: CRC16 of everything after it, type, flags, size, body
fn rar_block(out: &mut Vec<u8>, kind: u8, flags: u16, body: &[u8]) {
    let mut head = vec![kind];
    head.extend_from_slice(&flags.to_le_bytes());
    head.extend_from_slice(&(7 + body.len() as u16).to_le_bytes());
    head.extend_from_slice(body);
    out.extend_from_slice(&(crc32(&head) as u16).to_le_bytes());
    out.extend_from_slice(&head);
}

/// Build a RAR 4 archive in memory with every file stored uncompressed;
/// names ending in `/` become directories
pub fn rar_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    const MAIN_HEAD: u8 = 0x73;
    const FILE_HEAD: u8 = 0x74;
    const END_HEAD: u8 = 0x7b;
    const LONG_BLOCK: u16 = 0x8000;
    const DIRECTORY: u16 = 0x00e0;
    const HOST_UNIX: u8 = 3;
    const STORED: u8 = 0x30;
    // 2024-01-01 00:00 in DOS date/time
    const MODIFIED: u32 = 0x5821_0000;

    let mut out = b"Rar!\x1a\x07\x00".to_vec();
    rar_block(&mut out, MAIN_HEAD, 0, &[0; 6]);

    for (name, data) in entries {
        let (name, flags, mode) = match name.strip_suffix('/') {
            Some(dir) => (dir, LONG_BLOCK | DIRECTORY, 0o40755u32),
            None => (*name, LONG_BLOCK, 0o100644u32),
        };

        let mut body = Vec::new();
        body.extend_from_slice(&(data.len() as u32).to_le_bytes()); // packed
        body.extend_from_slice(&(data.len() as u32).to_le_bytes()); // unpacked
        body.push(HOST_UNIX);
        body.extend_from_slice(&crc32(data).to_le_bytes());
        body.extend_from_slice(&MODIFIED.to_le_bytes());
        body.push(20); // version needed to extract
        body.push(STORED);
        body.extend_from_slice(&(name.len() as u16).to_le_bytes());
        body.extend_from_slice(&mode.to_le_bytes());
        body.extend_from_slice(name.as_bytes());

        rar_block(&mut out, FILE_HEAD, flags, &body);
        out.extend_from_slice(data);
    }

    rar_block(&mut out, END_HEAD, 0x4000, &[]);
    out
}

pub fn write_cbr(path: &Path, entries: &[(&str, &[u8])]) {
    fs::write(path, rar_bytes(entries)).unwrap();
}

#[test]
fn crc32_matches_the_standard_check_value() {
    assert_eq!(crc32(b""), 0);
    assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
}
