use chrono::{NaiveDateTime, Timelike};

/// Dateiname für eine Kameraaufnahme, z.B. `20240115_143005.jpg`
pub fn capture_filename(at: NaiveDateTime, extension: &str) -> String {
    format!("{}.{}", at.format("%Y%m%d_%H%M%S"), extension.trim_start_matches('.'))
}

/// Beschriftung für eine Sprachaufnahme
pub fn voice_memo_caption(at: NaiveDateTime) -> String {
    format!("Sprachaufnahme vom {:02}:{:02}", at.hour(), at.minute())
}

pub fn photo_caption(at: NaiveDateTime) -> String {
    format!("Foto vom {}", at.format("%d.%m.%Y %H:%M"))
}

/// Datumsteil eines gespeicherten Zeitstempels ("2024-01-15 14:30:05" -> "2024-01-15")
pub fn date_part(timestamp: &str) -> &str {
    timestamp.get(..10).unwrap_or(timestamp)
}

pub fn now_local() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_capture_filename() {
        assert_eq!(capture_filename(at(14, 30, 5), "jpg"), "20240115_143005.jpg");
        assert_eq!(capture_filename(at(9, 0, 0), ".wav"), "20240115_090000.wav");
    }

    #[test]
    fn test_captions() {
        assert_eq!(voice_memo_caption(at(7, 5, 0)), "Sprachaufnahme vom 07:05");
        assert_eq!(photo_caption(at(16, 45, 12)), "Foto vom 15.01.2024 16:45");
    }

    #[test]
    fn test_date_part() {
        assert_eq!(date_part("2024-01-15 14:30:05"), "2024-01-15");
        assert_eq!(date_part("kurz"), "kurz");
    }
}
