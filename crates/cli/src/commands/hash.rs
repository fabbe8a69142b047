use common::config::Deploy;
use marketplace::wasm::{WasmFile, WasmFileError};

use crate::commands::Hash;

/// Hash subcommand entrypoint.
pub(crate) fn hash(Hash { file, max_size }: Hash) -> Result<(), WasmFileError> {
    let limit = max_size.unwrap_or_else(|| Deploy::default().wasm_size_limit);
    let wasm = WasmFile::read(file, limit)?;

    println!("{}", wasm.hash);

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn rejects_non_wasm_extension() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(b"\0asm\x01\0\0\0").unwrap();

        let result = hash(Hash {
            file: file.path().to_path_buf(),
            max_size: None,
        });

        assert!(matches!(result, Err(WasmFileError::InvalidExtension(_))));
    }

    #[test]
    fn respects_size_override() {
        let mut file = tempfile::Builder::new().suffix(".wasm").tempfile().unwrap();
        file.write_all(b"\0asm\x01\0\0\0").unwrap();

        let result = hash(Hash {
            file: file.path().to_path_buf(),
            max_size: Some(4),
        });

        assert!(matches!(result, Err(WasmFileError::TooLarge { .. })));
    }

    #[test]
    fn hashes_valid_module() {
        let mut file = tempfile::Builder::new().suffix(".wasm").tempfile().unwrap();
        file.write_all(b"\0asm\x01\0\0\0").unwrap();

        hash(Hash {
            file: file.path().to_path_buf(),
            max_size: None,
        })
        .unwrap();
    }
}
