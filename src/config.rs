use std::path::PathBuf;

use crate::catalog::CatalogError;

const CLIENT_ID_VAR: &str = "SOUNDCLOUD_CLIENT_ID";
const OUTPUT_DIR_VAR: &str = "SEEDMIX_OUTPUT_DIR";

pub fn soundcloud_client_id() -> Result<String, CatalogError> {
    client_id_from(std::env::var(CLIENT_ID_VAR).ok())
}

/// Directory reports are written to when `--out-dir` is not given.
pub fn output_dir() -> PathBuf {
    output_dir_from(std::env::var(OUTPUT_DIR_VAR).ok())
}

fn client_id_from(value: Option<String>) -> Result<String, CatalogError> {
    value
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or(CatalogError::MissingClientId)
}

fn output_dir_from(value: Option<String>) -> PathBuf {
    match value {
        Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir.trim()),
        _ => PathBuf::from("."),
    }
}
