#![allow(dead_code)]

use classdex_plugin::{ArtifactParser, ClassDescriptor, MemberDescriptor, ParseError};
use std::io::Write;
use std::path::Path;

/// Reads a line-oriented text stand-in for class files:
///
/// ```text
/// class com.acme.Foo
/// super com.acme.Base
/// interface com.acme.Api
/// tag com.acme.Tag
/// annotation
/// kind interface
/// field count com.acme.Inject
/// method find java.lang.String long com.acme.Cached
/// ```
///
/// `method <name> <return> <params joined by ','|-> [tags...]`
pub struct TextParser;

impl ArtifactParser for TextParser {
    fn name(&self) -> &str {
        "text"
    }

    fn parse(&self, bytes: &[u8]) -> Result<ClassDescriptor, ParseError> {
        let text = std::str::from_utf8(bytes).map_err(|e| ParseError::Malformed(e.to_string()))?;
        let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

        let name = lines
            .next()
            .and_then(|l| l.strip_prefix("class "))
            .ok_or_else(|| ParseError::Malformed("missing class header".into()))?;
        let mut desc = ClassDescriptor::new(name);

        for line in lines {
            let mut words = line.split_whitespace();
            match (words.next(), words.next()) {
                (Some("super"), Some(s)) => desc = desc.with_super(s),
                (Some("interface"), Some(i)) => desc = desc.with_interface(i),
                (Some("tag"), Some(t)) => desc = desc.with_annotation(t),
                (Some("annotation"), None) => desc = desc.as_annotation(),
                (Some("kind"), Some("interface")) => desc = desc.as_interface(),
                (Some("field"), Some(f)) => {
                    let mut field = MemberDescriptor::field(name, f);
                    for tag in words {
                        field = field.with_annotation(tag);
                    }
                    desc = desc.with_field(field);
                }
                (Some("method"), Some(m)) => {
                    let ret = words.next().unwrap_or("void");
                    let params = match words.next() {
                        None | Some("-") => Vec::new(),
                        Some(p) => p.split(',').map(str::to_string).collect(),
                    };
                    let mut method = MemberDescriptor::method(name, m, params, ret);
                    for tag in words {
                        method = method.with_annotation(tag);
                    }
                    desc = desc.with_method(method);
                }
                _ => return Err(ParseError::Malformed(format!("unexpected line '{}'", line))),
            }
        }

        Ok(desc)
    }
}

/// Text body of a class with optional super and interfaces
pub fn class_text(name: &str, super_name: Option<&str>, interfaces: &[&str]) -> String {
    let mut text = format!("class {}\n", name);
    if let Some(s) = super_name {
        text.push_str(&format!("super {}\n", s));
    }
    for i in interfaces {
        text.push_str(&format!("interface {}\n", i));
    }
    text
}

/// Write `files` (relative path, content) under `root`
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (rel, content) in files {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }
}

/// Write `files` (relative path, content) into a zip archive at `path`
pub fn write_jar(path: &Path, files: &[(&str, &str)]) {
    let file = std::fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    for (name, content) in files {
        zip.start_file(*name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

fn crc32(data: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
        }
    }
    !crc
}

/// A single stored entry whose central directory claims, through a zip64
/// extra field, an uncompressed size of `claimed` bytes.
pub fn write_forged_size_jar(path: &Path, name: &str, data: &[u8], claimed: u64) {
    let crc = crc32(data);
    let name_len = name.len() as u16;
    let mut out = Vec::new();

    // local file header
    out.extend_from_slice(&0x0403_4b50u32.to_le_bytes());
    out.extend_from_slice(&20u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes()); // flags
    out.extend_from_slice(&0u16.to_le_bytes()); // stored
    out.extend_from_slice(&0u32.to_le_bytes()); // time + date
    out.extend_from_slice(&crc.to_le_bytes());
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(&name_len.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(name.as_bytes());
    out.extend_from_slice(data);

    // central directory
    let cd_offset = out.len() as u32;
    out.extend_from_slice(&0x0201_4b50u32.to_le_bytes());
    out.extend_from_slice(&45u16.to_le_bytes());
    out.extend_from_slice(&45u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&crc.to_le_bytes());
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(&0xFFFF_FFFFu32.to_le_bytes()); // size lives in zip64 extra
    out.extend_from_slice(&name_len.to_le_bytes());
    out.extend_from_slice(&12u16.to_le_bytes()); // extra length
    out.extend_from_slice(&0u16.to_le_bytes()); // comment length
    out.extend_from_slice(&0u16.to_le_bytes()); // disk
    out.extend_from_slice(&0u16.to_le_bytes()); // internal attrs
    out.extend_from_slice(&0u32.to_le_bytes()); // external attrs
    out.extend_from_slice(&0u32.to_le_bytes()); // local header offset
    out.extend_from_slice(name.as_bytes());
    out.extend_from_slice(&0x0001u16.to_le_bytes());
    out.extend_from_slice(&8u16.to_le_bytes());
    out.extend_from_slice(&claimed.to_le_bytes());
    let cd_size = out.len() as u32 - cd_offset;

    // end of central directory
    out.extend_from_slice(&0x0605_4b50u32.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&cd_size.to_le_bytes());
    out.extend_from_slice(&cd_offset.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());

    std::fs::write(path, out).unwrap();
}
