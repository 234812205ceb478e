//! Archive packaging for exports
//!
//! Exports are packed as a gzip-compressed tar with a single top-level
//! directory named after the export root. Compression runs on the blocking
//! pool; each call owns its inputs.

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use super::{ExportedFile, is_safe_relative_path};
use crate::error::ArchiveError;

/// One regular file read back from an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivedFile {
    /// Entry path including the root directory
    pub path: String,
    pub bytes: Vec<u8>,
}

/// Build a `.tar.gz` archive of `files` under `root/`
pub async fn build_archive(files: &[ExportedFile], root: &str) -> Result<Vec<u8>, ArchiveError> {
    build_archive_with_progress(files, root, |_, _| {}).await
}

/// Build an archive, calling `on_entry(done, total)` after each file
pub async fn build_archive_with_progress<F>(
    files: &[ExportedFile],
    root: &str,
    on_entry: F,
) -> Result<Vec<u8>, ArchiveError>
where
    F: FnMut(usize, usize) + Send + 'static,
{
    let files = files.to_vec();
    let root = root.to_string();
    tokio::task::spawn_blocking(move || write_tar_gz(&files, &root, on_entry)).await?
}

fn write_tar_gz<F>(files: &[ExportedFile], root: &str, mut on_entry: F) -> Result<Vec<u8>, ArchiveError>
where
    F: FnMut(usize, usize),
{
    check_root(root)?;

    let mtime = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let total = files.len();
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));

    for (i, file) in files.iter().enumerate() {
        if !is_safe_relative_path(&file.path) {
            return Err(ArchiveError::UnsafePath(file.path.clone()));
        }
        let bytes = file.bytes()?;

        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_size(bytes.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(mtime);
        builder.append_data(&mut header, format!("{}/{}", root, file.path), bytes.as_slice())?;

        on_entry(i + 1, total);
    }

    let encoder = builder.into_inner()?;
    let archive = encoder.finish()?;
    log::debug!("Archived {} files under '{}/' ({} bytes)", total, root, archive.len());
    Ok(archive)
}

/// Read every regular file from a `.tar.gz` archive
pub fn read_archive(bytes: &[u8]) -> Result<Vec<ArchivedFile>, ArchiveError> {
    let mut archive = tar::Archive::new(GzDecoder::new(bytes));
    let mut files = Vec::new();

    for entry in archive.entries()? {
        let mut entry = entry?;
        if !entry.header().entry_type().is_file() {
            continue;
        }

        let path = entry.path()?.into_owned();
        let path = sanitize_entry_path(&path)?;

        let mut content = Vec::new();
        entry.read_to_end(&mut content)?;
        files.push(ArchivedFile { path, bytes: content });
    }

    Ok(files)
}

/// Slash-separated entry path, rejecting absolute and parent components
fn sanitize_entry_path(path: &Path) -> Result<String, ArchiveError> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(ArchiveError::UnsafePath(path.display().to_string()));
            }
        }
    }
    if parts.is_empty() {
        return Err(ArchiveError::UnsafePath(path.display().to_string()));
    }
    Ok(parts.join("/"))
}

/// Write `files` to `dest/root/`, returning the root directory path
pub async fn write_to_directory(files: &[ExportedFile], root: &str, dest: &Path) -> Result<PathBuf, ArchiveError> {
    check_root(root)?;
    if let Some(bad) = files.iter().find(|f| !is_safe_relative_path(&f.path)) {
        return Err(ArchiveError::UnsafePath(bad.path.clone()));
    }

    let root_dir = dest.join(root);
    tokio::fs::create_dir_all(&root_dir).await?;

    for file in files {
        let target = root_dir.join(&file.path);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, file.bytes()?).await?;
    }

    log::info!("Wrote {} files to {}", files.len(), root_dir.display());
    Ok(root_dir)
}

fn check_root(root: &str) -> Result<(), ArchiveError> {
    if is_safe_relative_path(root) && !root.contains('/') {
        Ok(())
    } else {
        Err(ArchiveError::UnsafePath(root.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn sample_files() -> Vec<ExportedFile> {
        vec![
            ExportedFile::text("agent.md", "# Agent\n"),
            ExportedFile::text("skills/a/SKILL.md", "---\nname: a\n---\n"),
            ExportedFile::placeholder("logs"),
            ExportedFile::binary("assets/logo.png", &[0x89, b'P', b'N', b'G', 0, 255]),
        ]
    }

    #[tokio::test]
    async fn test_archive_roundtrip() {
        let files = sample_files();
        let bytes = build_archive(&files, "my-agent").await.unwrap();
        let read = read_archive(&bytes).unwrap();

        assert_eq!(read.len(), files.len());
        for (original, archived) in files.iter().zip(&read) {
            assert_eq!(archived.path, format!("my-agent/{}", original.path));
            assert_eq!(archived.bytes, original.bytes().unwrap());
        }
    }

    #[tokio::test]
    async fn test_progress_reported_per_entry() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        build_archive_with_progress(&sample_files(), "root", move |done, total| {
            sink.lock().unwrap().push((done, total));
        })
        .await
        .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![(1, 4), (2, 4), (3, 4), (4, 4)]);
    }

    #[tokio::test]
    async fn test_unsafe_paths_rejected() {
        let files = vec![ExportedFile::text("../escape.md", "x")];
        assert!(matches!(
            build_archive(&files, "root").await,
            Err(ArchiveError::UnsafePath(_))
        ));
        assert!(matches!(
            build_archive(&sample_files(), "../root").await,
            Err(ArchiveError::UnsafePath(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_base64_fails() {
        let files = vec![ExportedFile::encoded("bin.dat", "%%%", true)];
        assert!(matches!(
            build_archive(&files, "root").await,
            Err(ArchiveError::InvalidBase64 { .. })
        ));
    }

    #[test]
    fn test_sanitize_entry_path() {
        assert_eq!(sanitize_entry_path(Path::new("./a/b.md")).unwrap(), "a/b.md");
        assert!(sanitize_entry_path(Path::new("/etc/passwd")).is_err());
        assert!(sanitize_entry_path(Path::new("a/../../b")).is_err());
    }

    #[tokio::test]
    async fn test_write_to_directory() {
        let temp = tempfile::tempdir().unwrap();
        let root = write_to_directory(&sample_files(), "my-agent", temp.path()).await.unwrap();

        assert_eq!(root, temp.path().join("my-agent"));
        assert_eq!(std::fs::read_to_string(root.join("agent.md")).unwrap(), "# Agent\n");
        assert!(root.join("logs/.gitkeep").exists());
        assert_eq!(
            std::fs::read(root.join("assets/logo.png")).unwrap(),
            vec![0x89, b'P', b'N', b'G', 0, 255]
        );
    }

    #[tokio::test]
    async fn test_write_to_directory_checks_paths_first() {
        let temp = tempfile::tempdir().unwrap();
        let files = vec![ExportedFile::text("ok.md", "x"), ExportedFile::text("/abs.md", "y")];
        assert!(write_to_directory(&files, "root", temp.path()).await.is_err());
        assert!(!temp.path().join("root").exists());
    }
}
