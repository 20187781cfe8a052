//! Password-protected archive codec.
//!
//! Wraps the underlying zip capability behind two operations: `encode`
//! packages one plaintext file into a single-entry encrypted archive named
//! after the current timestamp, and `decode` extracts such an archive into
//! a per-job staging subdirectory. Passwords come from the `SecretStore`;
//! the archive's base file name is only the key-lookup handle, never the
//! key itself.
//!
//! License: MIT OR Apache-2.0

use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};

use chrono::Local;
use log::{debug, info};
use uuid::Uuid;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::errors::{DecodeFailure, ScrubError};
use crate::secrets::SecretStore;

/// Archive base names are the local wall-clock time of the encode.
pub const ARCHIVE_STAMP_FORMAT: &str = "%Y_%m_%d_%I_%M_%S_%p";

/// Result of decoding one archive: the job-scoped staging directory and
/// the extracted files inside it.
#[derive(Debug)]
pub struct Extraction {
    pub job_dir: PathBuf,
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ArchiveCodec {
    secrets: SecretStore,
}

impl ArchiveCodec {
    pub fn new(secrets: SecretStore) -> Self {
        Self { secrets }
    }

    /// Encrypts `source` into a single-entry archive under `output_dir`.
    ///
    /// The archive is named `<stamp>.zip` and its password is a fresh
    /// per-job secret filed under the same stamp. The archive file itself
    /// is owner-only; it holds the pre-redaction plaintext.
    pub fn encode(&self, source: &Path, output_dir: &Path) -> Result<PathBuf, ScrubError> {
        let stamp = Local::now().format(ARCHIVE_STAMP_FORMAT).to_string();
        let dest = output_dir.join(format!("{stamp}.zip"));
        let secret = self.secrets.issue(&stamp)?;

        self.write_single_entry(source, &dest, &secret)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&dest, fs::Permissions::from_mode(0o600)).map_err(|source| {
                ScrubError::Encode {
                    path: dest.clone(),
                    source,
                }
            })?;
        }

        info!("New archive created for later decoding: {}", dest.display());
        Ok(dest)
    }

    fn write_single_entry(
        &self,
        source: &Path,
        dest: &Path,
        secret: &str,
    ) -> Result<(), ScrubError> {
        let encode_err = |source: io::Error| ScrubError::Encode {
            path: dest.to_path_buf(),
            source,
        };

        let entry_name = source
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                encode_err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "source has no usable file name",
                ))
            })?;

        let mut input = File::open(source).map_err(encode_err)?;
        let output = File::create(dest).map_err(encode_err)?;

        let mut writer = ZipWriter::new(output);
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o600)
            .with_deprecated_encryption(secret.as_bytes());

        writer
            .start_file(entry_name, options)
            .map_err(|e| encode_err(e.into()))?;
        io::copy(&mut input, &mut writer).map_err(encode_err)?;
        writer.finish().map_err(|e| encode_err(e.into()))?;

        debug!("Packaged {} as {}", source.display(), dest.display());
        Ok(())
    }

    /// Decrypts `archive` into a fresh job subdirectory of `staging_dir`.
    ///
    /// The password is derived from the archive's base file name via the
    /// secret store (key-file lookup with a legacy name-as-password
    /// fallback). Extracted entry names are sanitized so an archive can
    /// never write outside its own job directory.
    pub fn decode(&self, archive: &Path, staging_dir: &Path) -> Result<Extraction, DecodeFailure> {
        let stem = archive
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| DecodeFailure::BadName(archive.to_path_buf()))?;
        let password = self.secrets.derive_for_decode(stem);

        let job_dir = staging_dir.join(format!("{stem}-{}", Uuid::new_v4()));
        fs::create_dir_all(&job_dir).map_err(|source| DecodeFailure::Stage {
            path: job_dir.clone(),
            source,
        })?;

        match self.extract_entries(archive, &password, &job_dir) {
            Ok(files) => Ok(Extraction { job_dir, files }),
            Err(failure) => {
                // A failed job leaves nothing staged.
                let _ = fs::remove_dir_all(&job_dir);
                Err(failure)
            }
        }
    }

    fn extract_entries(
        &self,
        archive: &Path,
        password: &str,
        job_dir: &Path,
    ) -> Result<Vec<PathBuf>, DecodeFailure> {
        let file = File::open(archive).map_err(|source| DecodeFailure::Stage {
            path: archive.to_path_buf(),
            source,
        })?;
        let mut container = ZipArchive::new(file).map_err(|source| DecodeFailure::Corrupt {
            path: archive.to_path_buf(),
            source,
        })?;

        let mut files = Vec::new();
        for index in 0..container.len() {
            let mut entry = match container.by_index_decrypt(index, password.as_bytes()) {
                Ok(Ok(entry)) => entry,
                Ok(Err(_)) => return Err(DecodeFailure::WrongPassword(archive.to_path_buf())),
                Err(source) => {
                    return Err(DecodeFailure::Corrupt {
                        path: archive.to_path_buf(),
                        source,
                    })
                }
            };

            if entry.name().ends_with('/') {
                continue;
            }

            let relative = sanitize_entry_name(entry.name()).ok_or_else(|| {
                DecodeFailure::UnsafeEntry {
                    path: archive.to_path_buf(),
                    entry: entry.name().to_string(),
                }
            })?;
            let destination = job_dir.join(&relative);

            if let Some(parent) = destination.parent() {
                fs::create_dir_all(parent).map_err(|source| DecodeFailure::Stage {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }

            let mut output = File::create(&destination).map_err(|source| DecodeFailure::Stage {
                path: destination.clone(),
                source,
            })?;
            io::copy(&mut entry, &mut output).map_err(|source| DecodeFailure::Stage {
                path: destination.clone(),
                source,
            })?;

            debug!("Extracted {} to {}", entry.name(), destination.display());
            files.push(destination);
        }

        Ok(files)
    }
}

/// Rejects absolute entry names and parent traversal, keeping only the
/// normal components of the entry path.
fn sanitize_entry_name(entry: &str) -> Option<PathBuf> {
    let path = Path::new(entry);
    if path.is_absolute() {
        return None;
    }

    let mut sanitized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(segment) => sanitized.push(segment),
            Component::CurDir => {}
            _ => return None,
        }
    }

    if sanitized.as_os_str().is_empty() {
        None
    } else {
        Some(sanitized)
    }
}
