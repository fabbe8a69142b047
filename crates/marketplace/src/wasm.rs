//! Local WASM files.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use byte_unit::Byte;
use derive_more::{Display, Error, From};

use crate::model::WasmHash;

/// WASM binary magic number.
const WASM_MAGIC: &[u8] = b"\0asm";

/// WASM file validation errors.
#[derive(Debug, Display, From, Error)]
pub enum WasmFileError {
    /// Unable to read the file.
    Io(io::Error),

    #[display(fmt = "{} is not a .wasm file", _0)]
    #[from(ignore)]
    InvalidExtension(#[error(ignore)] String),

    #[display(fmt = "{} is not a WebAssembly module", _0)]
    #[from(ignore)]
    InvalidFormat(#[error(ignore)] String),

    #[display(fmt = "WASM file is too large ({}), the limit is {}", size, limit)]
    #[from(ignore)]
    TooLarge { size: String, limit: String },
}

/// WASM blob loaded from a local file.
#[derive(Clone, Debug)]
pub struct WasmFile {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    pub hash: WasmHash,
}

fn human_size(bytes: usize) -> String {
    Byte::from_bytes(bytes as _)
        .get_appropriate_unit(true)
        .to_string()
}

impl WasmFile {
    /// Read and validate a WASM file, computing its hash.
    pub fn read(path: impl AsRef<Path>, size_limit: usize) -> Result<Self, WasmFileError> {
        let path = path.as_ref();

        let is_wasm = path
            .extension()
            .map(|extension| extension.eq_ignore_ascii_case("wasm"))
            .unwrap_or(false);

        if !is_wasm {
            return Err(WasmFileError::InvalidExtension(path.display().to_string()));
        }

        let size = fs::metadata(path)?.len() as usize;

        if size > size_limit {
            return Err(WasmFileError::TooLarge {
                size: human_size(size),
                limit: human_size(size_limit),
            });
        }

        let bytes = fs::read(path)?;

        if !bytes.starts_with(WASM_MAGIC) {
            return Err(WasmFileError::InvalidFormat(path.display().to_string()));
        }

        Ok(Self {
            path: path.to_path_buf(),
            hash: WasmHash::of(&bytes),
            bytes,
        })
    }
}
