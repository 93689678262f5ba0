//! Reading bytecode files from disk.

use std::fs;
use std::path::Path;

use log::{debug, error};
use lsharp_common::Program;

use crate::error::LoadError;

/// Read and decode a bytecode file.
pub fn load_program(path: impl AsRef<Path>) -> Result<Program, LoadError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| {
        error!("failed to read {}: {e}", path.display());
        LoadError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        }
    })?;
    let program = Program::decode(&bytes).map_err(|e| {
        error!("failed to decode {}: {e}", path.display());
        LoadError::from(e)
    })?;
    debug!(
        "loaded {} object(s) and {} instruction(s) from {}",
        program.objects.len(),
        program.len(),
        path.display()
    );
    Ok(program)
}
