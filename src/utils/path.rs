use directories::ProjectDirs;
use std::path::Path;

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("de", "werkos", "WerkOS")
}

/// Pfad für die Anzeige normalisieren
pub fn display_path(path: &Path) -> String {
    // Home-Verzeichnis zu ~ kürzen
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

/// Sicheren Dateinamen aus einer Zeichenkette erzeugen
pub fn sanitize_filename(name: &str) -> String {
    let cleaned = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>()
        .trim()
        .trim_start_matches('.')
        .to_string();

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// Dateiendung (kleingeschrieben)
pub fn get_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
}

pub fn is_image_file(path: &Path) -> bool {
    matches!(
        get_extension(path).as_deref(),
        Some("jpg" | "jpeg" | "png" | "gif" | "webp" | "heic")
    )
}

pub fn is_audio_file(path: &Path) -> bool {
    matches!(
        get_extension(path).as_deref(),
        Some("wav" | "mp3" | "m4a" | "ogg" | "webm")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("foto 1.jpg"), "foto 1.jpg");
        assert_eq!(sanitize_filename("../../etc/passwd"), "_.._etc_passwd");
        assert_eq!(sanitize_filename("plan:a.pdf"), "plan_a.pdf");
        assert_eq!(sanitize_filename("   "), "upload");
        assert_eq!(sanitize_filename(".hidden"), "hidden");
    }

    #[test]
    fn test_media_kinds() {
        assert!(is_image_file(Path::new("20240101_120000.JPG")));
        assert!(is_audio_file(Path::new("memo.wav")));
        assert!(!is_image_file(Path::new("bericht.pdf")));
    }

    #[test]
    fn test_display_path() {
        assert_eq!(get_extension(Path::new("memo.WAV")).as_deref(), Some("wav"));
        assert_eq!(display_path(Path::new("/tmp/werkos.db")), "/tmp/werkos.db");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(display_path(&home.join("werkos.db")), "~/werkos.db");
        }
    }
}
