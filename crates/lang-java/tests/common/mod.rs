#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_SUPER: u16 = 0x0020;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;
pub const ACC_ANNOTATION: u16 = 0x2000;

const TAG_UTF8: u8 = 1;
const TAG_CLASS: u8 = 7;

struct Member {
    access: u16,
    name: String,
    descriptor: String,
    tags: Vec<String>,
}

/// Assembles minimal class files by hand. Methods carry no code, so every
/// method is declared abstract.
pub struct ClassFileBuilder {
    access: u16,
    name: String,
    super_name: Option<String>,
    interfaces: Vec<String>,
    tags: Vec<String>,
    fields: Vec<Member>,
    methods: Vec<Member>,
}

#[derive(Default)]
struct ConstantPool {
    entries: Vec<Vec<u8>>,
    utf8: HashMap<String, u16>,
    classes: HashMap<String, u16>,
}

impl ConstantPool {
    fn push(&mut self, entry: Vec<u8>) -> u16 {
        self.entries.push(entry);
        self.entries.len() as u16
    }

    fn utf8(&mut self, value: &str) -> u16 {
        if let Some(&index) = self.utf8.get(value) {
            return index;
        }
        let mut entry = vec![TAG_UTF8];
        entry.extend_from_slice(&(value.len() as u16).to_be_bytes());
        entry.extend_from_slice(value.as_bytes());
        let index = self.push(entry);
        self.utf8.insert(value.to_string(), index);
        index
    }

    fn class(&mut self, dotted: &str) -> u16 {
        if let Some(&index) = self.classes.get(dotted) {
            return index;
        }
        let name_index = self.utf8(&dotted.replace('.', "/"));
        let mut entry = vec![TAG_CLASS];
        entry.extend_from_slice(&name_index.to_be_bytes());
        let index = self.push(entry);
        self.classes.insert(dotted.to_string(), index);
        index
    }
}

fn annotation_descriptor(tag: &str) -> String {
    format!("L{};", tag.replace('.', "/"))
}

fn u16_bytes(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn write_annotations(out: &mut Vec<u8>, pool: &mut ConstantPool, tags: &[String]) {
    if tags.is_empty() {
        u16_bytes(out, 0);
        return;
    }
    u16_bytes(out, 1);
    u16_bytes(out, pool.utf8("RuntimeVisibleAnnotations"));
    let length = 2 + tags.len() as u32 * 4;
    out.extend_from_slice(&length.to_be_bytes());
    u16_bytes(out, tags.len() as u16);
    for tag in tags {
        u16_bytes(out, pool.utf8(&annotation_descriptor(tag)));
        u16_bytes(out, 0);
    }
}

impl ClassFileBuilder {
    pub fn class(name: &str) -> Self {
        Self {
            access: ACC_PUBLIC | ACC_SUPER | ACC_ABSTRACT,
            name: name.to_string(),
            super_name: Some("java.lang.Object".to_string()),
            interfaces: Vec::new(),
            tags: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn interface(name: &str) -> Self {
        let mut builder = Self::class(name);
        builder.access = ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT;
        builder
    }

    pub fn annotation(name: &str) -> Self {
        let mut builder = Self::interface(name);
        builder.access |= ACC_ANNOTATION;
        builder.interfaces.push("java.lang.annotation.Annotation".to_string());
        builder
    }

    pub fn extends(mut self, super_name: &str) -> Self {
        self.super_name = Some(super_name.to_string());
        self
    }

    pub fn no_super(mut self) -> Self {
        self.super_name = None;
        self
    }

    pub fn implements(mut self, interface: &str) -> Self {
        self.interfaces.push(interface.to_string());
        self
    }

    pub fn tagged(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_string());
        self
    }

    pub fn field(mut self, access: u16, name: &str, descriptor: &str, tags: &[&str]) -> Self {
        self.fields.push(Member {
            access,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        });
        self
    }

    pub fn method(mut self, access: u16, name: &str, descriptor: &str, tags: &[&str]) -> Self {
        self.methods.push(Member {
            access: access | ACC_ABSTRACT,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        });
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut pool = ConstantPool::default();
        let mut body = Vec::new();

        u16_bytes(&mut body, self.access);
        u16_bytes(&mut body, pool.class(&self.name));
        let super_index = match &self.super_name {
            Some(name) => pool.class(name),
            None => 0,
        };
        u16_bytes(&mut body, super_index);

        u16_bytes(&mut body, self.interfaces.len() as u16);
        for interface in &self.interfaces {
            u16_bytes(&mut body, pool.class(interface));
        }

        for members in [&self.fields, &self.methods] {
            u16_bytes(&mut body, members.len() as u16);
            for member in members {
                u16_bytes(&mut body, member.access);
                u16_bytes(&mut body, pool.utf8(&member.name));
                u16_bytes(&mut body, pool.utf8(&member.descriptor));
                write_annotations(&mut body, &mut pool, &member.tags);
            }
        }

        write_annotations(&mut body, &mut pool, &self.tags);

        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFE_BABE_u32.to_be_bytes());
        u16_bytes(&mut out, 0);
        u16_bytes(&mut out, 52);
        u16_bytes(&mut out, pool.entries.len() as u16 + 1);
        for entry in &pool.entries {
            out.extend_from_slice(entry);
        }
        out.extend_from_slice(&body);
        out
    }
}

/// Writes `(entry path, bytes)` pairs into a jar at `path`
pub fn write_jar(path: &Path, entries: &[(String, Vec<u8>)]) {
    let file = std::fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    for (name, bytes) in entries {
        zip.start_file(name.as_str(), options).unwrap();
        zip.write_all(bytes).unwrap();
    }
    zip.finish().unwrap();
}

/// Jar entry for a class built with [`ClassFileBuilder`]
pub fn class_entry(name: &str, builder: &ClassFileBuilder) -> (String, Vec<u8>) {
    (format!("{}.class", name.replace('.', "/")), builder.build())
}
