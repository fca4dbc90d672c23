//! 7z archive codec: LZMA2 compression behind AES-256 encryption

use super::{ArchiveCodec, ArchiveEntry, EntrySource, FilterConfig};
use crate::error::CodecError;
use crate::types::Password;
use sevenz_rust::lzma::LZMA2Options;
use sevenz_rust::{
    AesEncoderOptions, MethodOptions, SevenZArchiveEntry, SevenZMethod,
    SevenZMethodConfiguration, SevenZWriter,
};
use std::fs::File;
use std::path::Path;
use tracing::trace;

/// Writes `.7z` archives
#[derive(Debug, Clone, Copy, Default)]
pub struct SevenZCodec;

impl SevenZCodec {
    fn content_methods(
        password: &Password,
        filter: &FilterConfig,
    ) -> Result<Vec<SevenZMethodConfiguration>, CodecError> {
        let mut methods = Vec::with_capacity(2);
        if filter.encrypt {
            if password.is_empty() {
                return Err(CodecError::EmptyPassword);
            }
            methods.push(AesEncoderOptions::new(password.expose().into()).into());
        }
        methods.push(
            SevenZMethodConfiguration::new(SevenZMethod::LZMA2).with_options(
                MethodOptions::LZMA2(LZMA2Options::with_preset(filter.preset.min(9))),
            ),
        );
        Ok(methods)
    }
}

impl ArchiveCodec for SevenZCodec {
    fn extension(&self) -> &str {
        "7z"
    }

    fn create_archive(
        &self,
        destination: &Path,
        password: &Password,
        filter: &FilterConfig,
        entries: &[ArchiveEntry],
    ) -> Result<(), CodecError> {
        let archive_error = |message: String| CodecError::Archive {
            path: destination.to_path_buf(),
            message,
        };

        let methods = Self::content_methods(password, filter)?;
        let mut writer =
            SevenZWriter::create(destination).map_err(|e| archive_error(e.to_string()))?;
        writer.set_content_methods(methods);

        for entry in entries {
            let entry_error = |e: &dyn std::fmt::Display| CodecError::Entry {
                name: entry.name.clone(),
                message: e.to_string(),
            };
            trace!(name = %entry.name, "Adding archive entry");

            match &entry.source {
                EntrySource::File(path) => {
                    let file = File::open(path).map_err(|e| entry_error(&e))?;
                    writer
                        .push_archive_entry(
                            SevenZArchiveEntry::from_path(path, entry.name.clone()),
                            Some(file),
                        )
                        .map_err(|e| entry_error(&e))?;
                }
                EntrySource::Directory(path) => {
                    writer
                        .push_archive_entry::<&[u8]>(
                            SevenZArchiveEntry::from_path(path, entry.name.clone()),
                            None,
                        )
                        .map_err(|e| entry_error(&e))?;
                }
                EntrySource::Bytes(content) => {
                    let mut archive_entry = SevenZArchiveEntry::new();
                    archive_entry.name = entry.name.clone();
                    archive_entry.has_stream = true;
                    archive_entry.is_directory = false;
                    writer
                        .push_archive_entry(archive_entry, Some(content.as_slice()))
                        .map_err(|e| entry_error(&e))?;
                }
            }
        }

        writer.finish().map_err(|e| archive_error(e.to_string()))?;
        Ok(())
    }
}
