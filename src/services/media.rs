//! Medien-Bucket für Fotos und Sprachaufnahmen
//!
//! Dateien liegen unter `<media_directory>/<bucket>/`. Die öffentliche URL
//! ergibt sich aus `public_base_url` oder, ohne Basis-URL, als `file://`-URL.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::models::AppSettings;
use crate::utils::error::AppResult;
use crate::utils::file_ops;
use crate::utils::path::{is_audio_file, is_image_file, sanitize_filename};

/// Art eines Mediums nach Dateiendung
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MediaKind {
    Image,
    Audio,
    Other,
}

impl MediaKind {
    pub fn from_filename(filename: &str) -> Self {
        let path = Path::new(filename);
        if is_image_file(path) {
            MediaKind::Image
        } else if is_audio_file(path) {
            MediaKind::Audio
        } else {
            MediaKind::Other
        }
    }
}

/// Ein gespeichertes Objekt im Bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredMedia {
    /// Objektname relativ zum Bucket
    pub name: String,
    pub path: PathBuf,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    bucket: String,
    public_base_url: Option<String>,
}

impl MediaStore {
    pub fn new(root: PathBuf, bucket: impl Into<String>, public_base_url: Option<String>) -> Self {
        Self {
            root,
            bucket: bucket.into(),
            public_base_url: public_base_url
                .map(|u| u.trim_end_matches('/').to_string())
                .filter(|u| !u.is_empty()),
        }
    }

    pub fn from_settings(settings: &AppSettings) -> Self {
        Self::new(
            settings.bucket_directory(),
            settings.media_bucket.clone(),
            settings.public_base_url.clone(),
        )
    }

    /// Blob ablegen und öffentliche URL zurückgeben. Vorhandene Dateien
    /// werden nicht überschrieben, der Name bekommt dann ein Suffix.
    pub fn upload(&self, bytes: &[u8], filename: &str) -> AppResult<StoredMedia> {
        file_ops::ensure_directory(&self.root)?;

        let name = file_ops::unique_filename(&self.root, &sanitize_filename(filename));
        let path = self.root.join(&name);
        file_ops::write_bytes(&path, bytes)?;

        let url = self.public_url(&name);
        tracing::info!("Upload gespeichert: {} ({} Bytes)", name, bytes.len());

        Ok(StoredMedia { name, path, url })
    }

    pub fn public_url(&self, name: &str) -> String {
        match &self.public_base_url {
            Some(base) => format!("{}/{}/{}", base, self.bucket, name),
            None => format!("file://{}", self.root.join(name).to_string_lossy().replace('\\', "/")),
        }
    }

    /// Objekt entfernen (kein Fehler, wenn es fehlt)
    pub fn remove(&self, name: &str) -> AppResult<()> {
        file_ops::delete_file(&self.root.join(name))
    }

    /// Alle Objekte im Bucket
    pub fn list_objects(&self) -> AppResult<Vec<StoredMedia>> {
        let objects = file_ops::scan_directory_relative(&self.root)?
            .into_iter()
            .map(|(path, name)| StoredMedia {
                url: self.public_url(&name),
                name,
                path,
            })
            .collect();
        Ok(objects)
    }

    /// Objekte, auf die keine der übergebenen URLs verweist.
    ///
    /// Verglichen wird der Dateiname, nicht die ganze URL: die URL hängt von
    /// `public_base_url` ab, und die kann sich seit dem Upload geändert haben.
    pub fn orphans(&self, referenced_urls: &HashSet<String>) -> AppResult<Vec<StoredMedia>> {
        let referenced: HashSet<&str> = referenced_urls
            .iter()
            .filter_map(|url| object_name_from_url(url))
            .collect();

        Ok(self
            .list_objects()?
            .into_iter()
            .filter(|object| !referenced.contains(last_segment(&object.name)))
            .collect())
    }
}

/// Letztes Pfadsegment einer Medien-URL, ohne Query und Fragment
pub fn object_name_from_url(url: &str) -> Option<&str> {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    let name = last_segment(&url[..end]);
    (!name.is_empty()).then_some(name)
}

fn last_segment(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_upload_with_public_base_url() {
        let dir = tempdir().unwrap();
        let store = MediaStore::new(
            dir.path().join("baustellen-fotos"),
            "baustellen-fotos",
            Some("https://cdn.example.org/storage/".into()),
        );

        let stored = store.upload(b"jpegdaten", "20240115_143005.jpg").unwrap();
        assert_eq!(
            stored.url,
            "https://cdn.example.org/storage/baustellen-fotos/20240115_143005.jpg"
        );
        assert_eq!(std::fs::read(&stored.path).unwrap(), b"jpegdaten");
    }

    #[test]
    fn test_upload_never_overwrites() {
        let dir = tempdir().unwrap();
        let store = MediaStore::new(dir.path().to_path_buf(), "b", None);

        let first = store.upload(b"eins", "foto.jpg").unwrap();
        let second = store.upload(b"zwei", "foto.jpg").unwrap();

        assert_eq!(first.name, "foto.jpg");
        assert_eq!(second.name, "foto_2.jpg");
        assert!(first.url.starts_with("file://"));
        assert_eq!(std::fs::read(&first.path).unwrap(), b"eins");
    }

    #[test]
    fn test_orphans() {
        let dir = tempdir().unwrap();
        let store = MediaStore::new(dir.path().to_path_buf(), "b", Some("https://x".into()));

        let kept = store.upload(b"1", "a.jpg").unwrap();
        store.upload(b"2", "b.wav").unwrap();

        let referenced: HashSet<String> = [kept.url.clone()].into_iter().collect();
        let orphans = store.orphans(&referenced).unwrap();
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].name, "b.wav");

        store.remove("b.wav").unwrap();
        assert!(store.orphans(&referenced).unwrap().is_empty());
    }

    #[test]
    fn test_orphans_survive_base_url_change() {
        let dir = tempdir().unwrap();
        let before = MediaStore::new(dir.path().to_path_buf(), "b", None);
        let stored = before.upload(b"1", "foto.jpg").unwrap();

        let after = MediaStore::new(dir.path().to_path_buf(), "b", Some("https://cdn.example.org".into()));
        let referenced: HashSet<String> = [stored.url].into_iter().collect();
        assert!(after.orphans(&referenced).unwrap().is_empty());

        let moved: HashSet<String> =
            ["https://alt.example.org/b/foto.jpg?token=abc".to_string()].into_iter().collect();
        assert!(before.orphans(&moved).unwrap().is_empty());
    }

    #[test]
    fn test_media_kind() {
        assert_eq!(MediaKind::from_filename("20240115_143005.JPG"), MediaKind::Image);
        assert_eq!(MediaKind::from_filename("memo.m4a"), MediaKind::Audio);
        assert_eq!(MediaKind::from_filename("plan.pdf"), MediaKind::Other);
        assert_eq!(MediaKind::from_filename("ohne_endung"), MediaKind::Other);
    }

    #[test]
    fn test_object_name_from_url() {
        assert_eq!(object_name_from_url("https://x/b/20240115_143005.jpg"), Some("20240115_143005.jpg"));
        assert_eq!(object_name_from_url("file:///tmp/b/a.wav#t=3"), Some("a.wav"));
        assert_eq!(object_name_from_url("https://x/b/"), None);
    }
}
