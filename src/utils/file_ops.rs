//! Dateioperationen für den Medien-Bucket

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::utils::error::AppResult;

/// Bytes in eine Datei schreiben, Verzeichnis bei Bedarf anlegen
pub fn write_bytes(path: &Path, bytes: &[u8]) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;
    Ok(())
}

/// Sicherstellen, dass ein Verzeichnis existiert
pub fn ensure_directory(path: &Path) -> AppResult<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Datei löschen (kein Fehler, wenn sie fehlt)
pub fn delete_file(path: &Path) -> AppResult<()> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

/// Verzeichnis rekursiv scannen, Dateien mit relativem Pfad zurückgeben
pub fn scan_directory_relative(base_dir: &Path) -> AppResult<Vec<(PathBuf, String)>> {
    if !base_dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(base_dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if entry.file_type().is_file() {
            let full_path = entry.path().to_path_buf();
            if let Ok(relative) = full_path.strip_prefix(base_dir) {
                // Immer mit Schrägstrich, passend zu URLs
                let relative_normalized = relative.to_string_lossy().replace('\\', "/");
                files.push((full_path, relative_normalized));
            }
        }
    }

    files.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(files)
}

/// Eindeutigen Dateinamen erzeugen, falls die Datei schon existiert
pub fn unique_filename(dir: &Path, filename: &str) -> String {
    if !dir.join(filename).exists() {
        return filename.to_string();
    }

    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);

    let extension = Path::new(filename)
        .extension()
        .and_then(|s| s.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();

    for i in 2..1000 {
        let new_name = format!("{}_{}{}", stem, i, extension);
        if !dir.join(&new_name).exists() {
            return new_name;
        }
    }

    let timestamp = chrono::Utc::now().timestamp_millis();
    format!("{}_{}{}", stem, timestamp, extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_unique_filename() {
        let dir = tempdir().unwrap();

        assert_eq!(unique_filename(dir.path(), "foto.jpg"), "foto.jpg");
        fs::write(dir.path().join("foto.jpg"), "").unwrap();
        assert_eq!(unique_filename(dir.path(), "foto.jpg"), "foto_2.jpg");
    }

    #[test]
    fn test_scan_directory_relative() {
        let dir = tempdir().unwrap();

        let sub = dir.path().join("audio");
        fs::create_dir_all(&sub).unwrap();
        fs::write(dir.path().join("a.jpg"), "").unwrap();
        fs::write(sub.join("b.wav"), "").unwrap();

        let files = scan_directory_relative(dir.path()).unwrap();
        let relatives: Vec<_> = files.iter().map(|(_, r)| r.as_str()).collect();
        assert_eq!(relatives, vec!["a.jpg", "audio/b.wav"]);
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let dir = tempdir().unwrap();
        let files = scan_directory_relative(&dir.path().join("fehlt")).unwrap();
        assert!(files.is_empty());
    }
}
