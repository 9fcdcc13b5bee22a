//! ZIP archive extraction for uploaded codebases.
//!
//! Extraction is synchronous in the `zip` crate, so it runs on Tokio's
//! blocking pool.

use std::fs::File;
use std::path::{Path, PathBuf};

/// Errors raised while unpacking an uploaded archive.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("cannot create extraction directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot open archive {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid zip archive: {0}")]
    Malformed(#[from] zip::result::ZipError),

    #[error("archive contains no files")]
    Empty,

    #[error("extraction task aborted: {0}")]
    Aborted(String),
}

/// Extract the ZIP archive at `archive` into `dest`, creating `dest` if absent.
///
/// Returns the number of regular files in the archive. Entries whose paths
/// would escape `dest` make the `zip` crate reject the whole archive.
pub async fn extract_zip(archive: &Path, dest: &Path) -> Result<usize, ArchiveError> {
    let archive = archive.to_path_buf();
    let dest = dest.to_path_buf();

    tokio::task::spawn_blocking(move || extract_blocking(&archive, &dest))
        .await
        .map_err(|e| ArchiveError::Aborted(e.to_string()))?
}

fn extract_blocking(archive: &Path, dest: &Path) -> Result<usize, ArchiveError> {
    std::fs::create_dir_all(dest).map_err(|source| ArchiveError::CreateDir {
        path: dest.to_path_buf(),
        source,
    })?;

    let file = File::open(archive).map_err(|source| ArchiveError::Open {
        path: archive.to_path_buf(),
        source,
    })?;
    let mut zip = zip::ZipArchive::new(file)?;

    let file_count = zip.file_names().filter(|name| !name.ends_with('/')).count();
    if file_count == 0 {
        return Err(ArchiveError::Empty);
    }

    zip.extract(dest)?;
    Ok(file_count)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::Write;

    use zip::write::SimpleFileOptions;

    use super::*;

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (name, body) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    #[tokio::test]
    async fn extracts_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("in.zip");
        write_zip(
            &archive,
            &[("app.py", "print('hi')\n"), ("pkg/util.py", "X = 1\n")],
        );
        let dest = dir.path().join("out");

        let count = extract_zip(&archive, &dest).await.unwrap();

        assert_eq!(count, 2);
        assert_eq!(
            std::fs::read_to_string(dest.join("pkg/util.py")).unwrap(),
            "X = 1\n"
        );
    }

    #[tokio::test]
    async fn garbage_bytes_are_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("in.zip");
        std::fs::write(&archive, b"definitely not a zip file").unwrap();

        let err = extract_zip(&archive, &dir.path().join("out"))
            .await
            .unwrap_err();
        assert!(matches!(err, ArchiveError::Malformed(_)));
    }

    #[tokio::test]
    async fn empty_archive_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("in.zip");
        write_zip(&archive, &[]);

        let err = extract_zip(&archive, &dir.path().join("out"))
            .await
            .unwrap_err();
        assert!(matches!(err, ArchiveError::Empty));
    }

    #[tokio::test]
    async fn missing_archive_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract_zip(&dir.path().join("absent.zip"), &dir.path().join("out"))
            .await
            .unwrap_err();
        assert!(matches!(err, ArchiveError::Open { .. }));
    }
}
