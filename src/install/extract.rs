//! Zip extraction for bundled tools

use std::fs::File;
use std::path::Path;

use zip::ZipArchive;

use super::error::InstallError;

/// Unpack `archive` into `destination`, creating it if needed.
///
/// Entries that would escape `destination` are rejected by the zip crate.
pub async fn extract_zip(archive: &Path, destination: &Path) -> Result<(), InstallError> {
    let archive_path = archive.to_path_buf();
    let destination = destination.to_path_buf();

    // Decompression is CPU-bound.
    tokio::task::spawn_blocking(move || unpack(&archive_path, &destination))
        .await
        .map_err(|join| InstallError::Extract {
            archive: archive.to_path_buf(),
            reason: format!("extraction task failed: {join}"),
        })?
}

fn unpack(archive: &Path, destination: &Path) -> Result<(), InstallError> {
    let failed = |reason: String| InstallError::Extract {
        archive: archive.to_path_buf(),
        reason,
    };

    std::fs::create_dir_all(destination)
        .map_err(|e| failed(format!("cannot create {}: {e}", destination.display())))?;

    let file = File::open(archive).map_err(|e| failed(e.to_string()))?;
    let mut zip = ZipArchive::new(file).map_err(|e| failed(e.to_string()))?;
    let entries = zip.len();
    zip.extract(destination).map_err(|e| failed(e.to_string()))?;

    log::info!(
        "Extracted {entries} entries from {} into {}",
        archive.display(),
        destination.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn build_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).expect("create zip");
        let mut writer = zip::ZipWriter::new(file);
        for (name, data) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .expect("start entry");
            writer.write_all(data).expect("write entry");
        }
        writer.finish().expect("finish zip");
    }

    #[tokio::test]
    async fn extracts_nested_entries() {
        let dir = tempfile::tempdir().expect("tempdir");
        let archive = dir.path().join("NConvert-win64.zip");
        build_zip(
            &archive,
            &[
                ("NConvert/nconvert.exe", b"MZ"),
                ("NConvert/ReadMe.txt", b"hello"),
            ],
        );
        let destination = dir.path().join("data").join("installed");

        extract_zip(&archive, &destination).await.expect("extract");

        assert_eq!(
            std::fs::read(destination.join("NConvert/nconvert.exe")).expect("read"),
            b"MZ"
        );
        assert!(destination.join("NConvert/ReadMe.txt").is_file());
    }

    #[tokio::test]
    async fn corrupt_archive_is_an_extract_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let archive = dir.path().join("broken.zip");
        std::fs::write(&archive, b"definitely not a zip").expect("write");

        let error = extract_zip(&archive, &dir.path().join("out"))
            .await
            .expect_err("corrupt archive");

        assert!(matches!(error, InstallError::Extract { .. }));
    }
}
