//! Helpers shared by every subcommand: opening the database, reading JSON
//! inputs and writing JSON output.

use std::io::{BufReader, Write};

use camino::Utf8Path;
use kerbside_core::SqliteRepository;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::fs::{ensure_parent_dir, file_is_file, open_utf8_file};
use crate::{ARG_DATABASE, CliError};

/// Open an existing database; a missing file is an error.
pub(crate) fn open_existing(path: &Utf8Path) -> Result<SqliteRepository, CliError> {
    require_existing(path, ARG_DATABASE)?;
    Ok(SqliteRepository::open(path.as_std_path())?)
}

/// Open a database, creating it and its directory when absent.
pub(crate) fn open_or_create(path: &Utf8Path) -> Result<SqliteRepository, CliError> {
    ensure_parent_dir(path).map_err(|source| CliError::PrepareDatabase {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(SqliteRepository::open(path.as_std_path())?)
}

/// Fail unless `path` is an existing regular file.
pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Decode a JSON document from disk.
pub(crate) fn load_json<T>(path: &Utf8Path, field: &'static str) -> Result<T, CliError>
where
    T: DeserializeOwned,
{
    let file = open_utf8_file(path).map_err(|source| CliError::OpenInput {
        field,
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| CliError::ParseInput {
        field,
        path: path.to_path_buf(),
        source,
    })
}

/// Write `value` as pretty JSON followed by a newline.
pub(crate) fn write_json<T>(writer: &mut dyn Write, value: &T) -> Result<(), CliError>
where
    T: Serialize + ?Sized,
{
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)
}
