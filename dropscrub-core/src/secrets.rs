//! Per-job archive secrets.
//!
//! The original system used an archive's own base file name as its
//! password, so anyone who could list the output directory could decrypt
//! every archive. The derive-a-per-job-secret interface is kept, but the
//! secret is now a random 128-bit token persisted as a `0600` key file in
//! a directory separate from the archives. Decode falls back to the
//! legacy stem-as-password derivation so archives produced by the old
//! system still open.
//!
//! License: MIT OR Apache-2.0

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use rand::RngCore;

use crate::errors::ScrubError;

#[derive(Debug, Clone)]
pub struct SecretStore {
    keys_dir: PathBuf,
}

impl SecretStore {
    pub fn new(keys_dir: impl Into<PathBuf>) -> Self {
        Self {
            keys_dir: keys_dir.into(),
        }
    }

    /// Issues a fresh random secret for the job identified by `stem` and
    /// persists it. Re-issuing for an existing stem overwrites the old
    /// key, matching the overwrite of a same-stamp archive.
    pub fn issue(&self, stem: &str) -> Result<String, ScrubError> {
        let store_err = |source| ScrubError::SecretStore {
            stem: stem.to_string(),
            source,
        };

        fs::create_dir_all(&self.keys_dir).map_err(store_err)?;

        let mut raw = [0u8; 16];
        rand::rng().fill_bytes(&mut raw);
        let secret = hex::encode(raw);

        let path = self.key_path(stem);
        let mut file = open_owner_only(&path).map_err(store_err)?;
        file.write_all(secret.as_bytes()).map_err(store_err)?;

        debug!("Issued secret for job '{}' at {}", stem, path.display());
        Ok(secret)
    }

    /// Looks up the persisted secret for `stem`, if one exists.
    pub fn lookup(&self, stem: &str) -> Option<String> {
        let path = self.key_path(stem);
        match fs::read_to_string(&path) {
            Ok(secret) => Some(secret.trim().to_string()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Unable to read key file {}: {}", path.display(), e);
                None
            }
        }
    }

    /// The password to use when decoding the archive named by `stem`.
    ///
    /// Archives from the legacy system carried no key file; their base
    /// file name was the password.
    pub fn derive_for_decode(&self, stem: &str) -> String {
        match self.lookup(stem) {
            Some(secret) => secret,
            None => {
                debug!("No key file for '{}'; using legacy name-derived password", stem);
                stem.to_string()
            }
        }
    }

    fn key_path(&self, stem: &str) -> PathBuf {
        self.keys_dir.join(format!("{stem}.key"))
    }
}

#[cfg(unix)]
fn open_owner_only(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_owner_only(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_then_lookup_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = SecretStore::new(dir.path());

        let issued = store.issue("2025_01_02_03_04_05_PM").unwrap();
        assert_eq!(issued.len(), 32);
        assert_eq!(store.lookup("2025_01_02_03_04_05_PM"), Some(issued.clone()));
        assert_eq!(store.derive_for_decode("2025_01_02_03_04_05_PM"), issued);
    }

    #[test]
    fn decode_falls_back_to_legacy_name_derivation() {
        let dir = tempfile::tempdir().unwrap();
        let store = SecretStore::new(dir.path());
        assert_eq!(
            store.derive_for_decode("2020_06_07_08_09_10_AM"),
            "2020_06_07_08_09_10_AM"
        );
    }

    #[test]
    fn reissue_overwrites_the_previous_secret() {
        let dir = tempfile::tempdir().unwrap();
        let store = SecretStore::new(dir.path());

        let first = store.issue("stamp").unwrap();
        let second = store.issue("stamp").unwrap();
        assert_ne!(first, second);
        assert_eq!(store.lookup("stamp"), Some(second));
    }

    #[cfg(unix)]
    #[test]
    fn key_files_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = SecretStore::new(dir.path());
        store.issue("stamp").unwrap();

        let mode = fs::metadata(dir.path().join("stamp.key"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
