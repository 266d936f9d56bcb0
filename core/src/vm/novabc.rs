//! NOVABC bytecode module container and serialization.
//!
//! Layout, all integers little-endian `u32`:
//!
//! ```text
//! MAGIC[8] | STR_COUNT | STR_COUNT x (LEN, bytes[LEN]) | CODE_LEN | bytes[CODE_LEN]
//! ```
//!
//! The reader accepts any 8-byte tag starting with `NOVA` (which also covers
//! `NOVABC..`) so modules written by older toolchains keep loading.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use tracing::debug;

use super::ModuleError;

pub const MAGIC: [u8; 8] = *b"NOVABC01";
const MAGIC_PREFIX: &[u8] = b"NOVA";
const MAGIC_PREFIX_LONG: &[u8] = b"NOVABC";

/// A compiled program: string pool plus raw instruction stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BytecodeModule {
    pub strings: Vec<Vec<u8>>,
    pub code: Vec<u8>,
}

impl BytecodeModule {
    pub fn new(strings: Vec<Vec<u8>>, code: Vec<u8>) -> Self {
        Self { strings, code }
    }

    pub fn encode(&self) -> Vec<u8> {
        encode_module(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, ModuleError> {
        decode_module(bytes)
    }

    /// Read and decode a module file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).with_context(|| format!("failed to read module '{}'", path.display()))?;
        let module = decode_module(&bytes)?;
        debug!(
            path = %path.display(),
            strings = module.strings.len(),
            code_len = module.code.len(),
            "loaded module"
        );
        Ok(module)
    }

    /// Encode and write the module, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.encode()).with_context(|| format!("failed to write module '{}'", path.display()))
    }
}

/// Encode a module into the NOVABC binary representation.
pub fn encode_module(module: &BytecodeModule) -> Vec<u8> {
    let pool_len: usize = module.strings.iter().map(|s| 4 + s.len()).sum();
    let mut out = Vec::with_capacity(MAGIC.len() + 8 + pool_len + module.code.len());
    out.extend_from_slice(&MAGIC);
    write_u32(&mut out, module.strings.len() as u32);
    for s in &module.strings {
        write_bytes(&mut out, s);
    }
    write_bytes(&mut out, &module.code);
    out
}

/// Decode a NOVABC payload. Bytes after the code section are ignored.
pub fn decode_module(bytes: &[u8]) -> Result<BytecodeModule, ModuleError> {
    let mut cursor = 0;
    let tag = read_array::<8>(bytes, &mut cursor, "magic")?;
    if !(tag.starts_with(MAGIC_PREFIX) || tag.starts_with(MAGIC_PREFIX_LONG)) {
        return Err(ModuleError::BadMagic(tag));
    }

    let count = read_u32(bytes, &mut cursor, "string count")?;
    // Never trust the count for preallocation; each entry needs at least 4 bytes.
    let mut strings = Vec::with_capacity((count as usize).min(bytes.len() / 4));
    for _ in 0..count {
        strings.push(read_bytes(bytes, &mut cursor, "string data")?.to_vec());
    }
    let code = read_bytes(bytes, &mut cursor, "code")?.to_vec();

    if cursor < bytes.len() {
        debug!(trailing = bytes.len() - cursor, "ignoring trailing bytes after code section");
    }
    Ok(BytecodeModule { strings, code })
}

fn write_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn write_bytes(out: &mut Vec<u8>, value: &[u8]) {
    write_u32(out, value.len() as u32);
    out.extend_from_slice(value);
}

fn read_array<const N: usize>(bytes: &[u8], cursor: &mut usize, what: &'static str) -> Result<[u8; N], ModuleError> {
    let end = cursor.checked_add(N).filter(|&end| end <= bytes.len());
    let Some(end) = end else {
        return Err(ModuleError::Corrupt(what));
    };
    let mut buf = [0u8; N];
    buf.copy_from_slice(&bytes[*cursor..end]);
    *cursor = end;
    Ok(buf)
}

fn read_u32(bytes: &[u8], cursor: &mut usize, what: &'static str) -> Result<u32, ModuleError> {
    read_array::<4>(bytes, cursor, what).map(u32::from_le_bytes)
}

fn read_bytes<'a>(bytes: &'a [u8], cursor: &mut usize, what: &'static str) -> Result<&'a [u8], ModuleError> {
    let len = read_u32(bytes, cursor, what)? as usize;
    let end = cursor.checked_add(len).filter(|&end| end <= bytes.len());
    let Some(end) = end else {
        return Err(ModuleError::Corrupt(what));
    };
    let slice = &bytes[*cursor..end];
    *cursor = end;
    Ok(slice)
}
