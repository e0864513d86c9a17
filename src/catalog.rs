use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use exif::{In, Reader, Tag, Value};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::ShowreelConfig;
use crate::constants::MEDIA_EXTENSIONS;
use crate::error::ShowreelError;
use crate::item::RotationItem;

/// Items plus the settings that came with them.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub items: Vec<RotationItem>,
    pub config: ShowreelConfig,
}

#[derive(Deserialize)]
struct Manifest {
    #[serde(default)]
    showreel: ShowreelConfig,
    #[serde(default)]
    items: Vec<RotationItem>,
}

/// The project showcase shipped with the site.
pub fn builtin_items() -> Vec<RotationItem> {
    vec![
        RotationItem::new(
            "1",
            "PASSLY SECURITY PLATFORM",
            "ENTERPRISE AUTHENTICATION SYSTEM",
            "SEPTEMBER 2025",
            "/passly.mp4",
        ),
        RotationItem::new(
            "2",
            "KEY MANAGEMENT SYSTEM",
            "SECURE ENCRYPTION SOLUTION",
            "MAY 2025",
            "/key.mp4",
        ),
    ]
}

pub fn builtin() -> Catalog {
    Catalog {
        items: builtin_items(),
        config: ShowreelConfig::default(),
    }
}

// --- TOML manifest ---

pub fn load_manifest(path: &Path) -> Result<Catalog, ShowreelError> {
    let text = fs::read_to_string(path).map_err(|source| ShowreelError::ManifestRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_manifest(&text, path)
}

pub fn parse_manifest(text: &str, path: &Path) -> Result<Catalog, ShowreelError> {
    let manifest: Manifest = toml::from_str(text).map_err(|source| ShowreelError::ManifestParse {
        path: path.to_path_buf(),
        source,
    })?;
    if manifest.items.is_empty() {
        return Err(ShowreelError::EmptyRotation);
    }
    manifest.showreel.validate()?;
    Ok(Catalog {
        items: manifest.items,
        config: manifest.showreel,
    })
}

// --- Media directory ---

/// Media files of a directory, sorted by file name.
pub fn load_sorted_media_paths(dir_path: &Path) -> Result<Vec<PathBuf>, ShowreelError> {
    let scan_error = |source| ShowreelError::Scan {
        path: dir_path.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir_path).map_err(scan_error)? {
        let path = entry.map_err(scan_error)?.path();
        if path.is_file() && is_media(&path) {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    if paths.is_empty() {
        Err(ShowreelError::NoMedia(dir_path.to_path_buf()))
    } else {
        Ok(paths)
    }
}

fn is_media(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| MEDIA_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Builds one item per media file. Titles come from the file name, dates
/// from the EXIF capture date when the file carries one.
///
/// Files whose path is not valid UTF-8 are skipped: their media reference
/// could not be handed back to the host unchanged.
pub fn scan_directory(dir_path: &Path) -> Result<Catalog, ShowreelError> {
    let items: Vec<RotationItem> = load_sorted_media_paths(dir_path)?
        .into_iter()
        .filter_map(|path| {
            let (Some(media_ref), Some(stem)) =
                (path.to_str(), path.file_stem().and_then(|s| s.to_str()))
            else {
                warn!("skipping {path:?}: file name is not valid UTF-8");
                return None;
            };
            let date = read_capture_date(&path).unwrap_or_default();
            Some(RotationItem::new(
                stem,
                stem.replace(['_', '-'], " ").to_uppercase(),
                "",
                date,
                media_ref,
            ))
        })
        .collect();

    if items.is_empty() {
        return Err(ShowreelError::NoMedia(dir_path.to_path_buf()));
    }
    Ok(Catalog {
        items,
        config: ShowreelConfig::default(),
    })
}

fn read_exif(path: &Path) -> Option<exif::Exif> {
    let file = File::open(path)
        .map_err(|e| warn!("could not open {path:?}: {e}"))
        .ok()?;
    Reader::new()
        .read_from_container(&mut BufReader::new(file))
        .map_err(|e| debug!("no EXIF data in {path:?}: {e}"))
        .ok()
}

/// `DateTimeOriginal` rendered as `MONTH YEAR`.
pub fn read_capture_date(path: &Path) -> Option<String> {
    let exif = read_exif(path)?;
    let field = exif.get_field(Tag::DateTimeOriginal, In::PRIMARY)?;
    match &field.value {
        Value::Ascii(values) => {
            let raw = values.first()?;
            format_capture_date(std::str::from_utf8(raw).ok()?)
        }
        _ => None,
    }
}

/// EXIF orientation tag, 1 when absent.
pub fn read_orientation(path: &Path) -> u16 {
    read_exif(path)
        .and_then(|exif| {
            let field = exif.get_field(Tag::Orientation, In::PRIMARY)?;
            match &field.value {
                Value::Short(values) => values.first().copied(),
                _ => None,
            }
        })
        .unwrap_or(1)
}

const MONTHS: [&str; 12] = [
    "JANUARY", "FEBRUARY", "MARCH", "APRIL", "MAY", "JUNE", "JULY", "AUGUST", "SEPTEMBER",
    "OCTOBER", "NOVEMBER", "DECEMBER",
];

/// `2024:03:15 10:20:00` -> `MARCH 2024`.
pub fn format_capture_date(raw: &str) -> Option<String> {
    let mut parts = raw.trim().split([':', ' ']);
    let year: u16 = parts.next()?.parse().ok()?;
    let month: usize = parts.next()?.parse().ok()?;
    let name = MONTHS.get(month.checked_sub(1)?)?;
    Some(format!("{name} {year}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_both_projects() {
        let items = builtin_items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].media_ref, "/passly.mp4");
        assert_eq!(items[1].title, "KEY MANAGEMENT SYSTEM");
    }

    #[test]
    fn manifest_with_overrides() {
        let text = r#"
            [showreel]
            debounce_seconds = 1.0

            [[items]]
            id = "passly"
            title = "PASSLY"
            date = "MARCH 2024"
            media = "/passly.mp4"

            [[items]]
            id = "key"
            title = "KEY"
            description = "SECURE ENCRYPTION SOLUTION"
            video = "/key.mp4"
        "#;
        let catalog = parse_manifest(text, Path::new("showreel.toml")).unwrap();
        assert_eq!(catalog.items.len(), 2);
        assert_eq!(catalog.items[0].media_ref, "/passly.mp4");
        assert_eq!(catalog.items[0].description, "");
        assert_eq!(catalog.items[1].media_ref, "/key.mp4");
        assert_eq!(catalog.config.debounce_seconds, 1.0);
        assert_eq!(catalog.config.viewport_threshold, 0.25);
    }

    #[test]
    fn manifest_without_items_is_rejected() {
        let result = parse_manifest("[showreel]\nfade_seconds = 0.5\n", Path::new("empty.toml"));
        assert!(matches!(result, Err(ShowreelError::EmptyRotation)));
    }

    #[test]
    fn manifest_syntax_error_names_the_file() {
        let result = parse_manifest("[[items]\n", Path::new("broken.toml"));
        match result {
            Err(ShowreelError::ManifestParse { path, .. }) => {
                assert_eq!(path, Path::new("broken.toml"))
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn missing_manifest_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_manifest(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ShowreelError::ManifestRead { .. })));
    }

    #[test]
    fn scan_sorts_and_filters_media() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b_clip.mp4", "a-shot.PNG", "notes.txt"] {
            fs::write(dir.path().join(name), b"not really media").unwrap();
        }
        let catalog = scan_directory(dir.path()).unwrap();
        let titles: Vec<_> = catalog.items.iter().map(|item| item.title.as_str()).collect();
        assert_eq!(titles, ["A SHOT", "B CLIP"]);
        assert_eq!(catalog.items[0].id, "a-shot");
        assert_eq!(catalog.items[0].date, "");
        assert!(catalog.items[1].media_ref.ends_with("b_clip.mp4"));
    }

    #[cfg(unix)]
    #[test]
    fn scan_skips_names_that_are_not_utf8() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("good.mp4"), b"clip").unwrap();
        let bad = dir.path().join(OsStr::from_bytes(b"bad\xff.mp4"));
        if fs::write(&bad, b"clip").is_err() {
            // Filesystem refuses non-UTF-8 names
            return;
        }

        let catalog = scan_directory(dir.path()).unwrap();
        assert_eq!(catalog.items.len(), 1);
        assert_eq!(catalog.items[0].id, "good");
        assert!(catalog.items.iter().all(|item| !item.media_ref.contains('\u{FFFD}')));

        fs::remove_file(dir.path().join("good.mp4")).unwrap();
        assert!(matches!(scan_directory(dir.path()), Err(ShowreelError::NoMedia(_))));
    }

    #[test]
    fn scan_of_directory_without_media_fails() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("readme.md"), b"#").unwrap();
        assert!(matches!(scan_directory(dir.path()), Err(ShowreelError::NoMedia(_))));
    }

    #[test]
    fn orientation_defaults_without_exif() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.jpg");
        fs::write(&path, b"no exif here").unwrap();
        assert_eq!(read_orientation(&path), 1);
    }

    #[test]
    fn capture_date_formatting() {
        assert_eq!(format_capture_date("2024:03:15 10:20:00").as_deref(), Some("MARCH 2024"));
        assert_eq!(format_capture_date("2025:12:01 00:00:00").as_deref(), Some("DECEMBER 2025"));
        assert_eq!(format_capture_date("2025:13:01 00:00:00"), None);
        assert_eq!(format_capture_date("2025:00:01 00:00:00"), None);
        assert_eq!(format_capture_date("garbage"), None);
    }
}
