use std::fs;
use std::path::Path;

use raylib::prelude::*;

use crate::catalog::read_orientation;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];

/// Loads a still as a texture, upright according to its EXIF orientation.
/// Returns `Ok(None)` for media raylib cannot show as a still (video clips).
pub fn load_still(
    rl: &mut RaylibHandle,
    thread: &RaylibThread,
    path: &Path,
) -> Result<Option<Texture2D>, String> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase();
    if !IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        return Ok(None);
    }

    let file_bytes = fs::read(path).map_err(|e| format!("Failed to read file {path:?}: {e}"))?;
    let mut image = Image::load_image_from_mem(&format!(".{extension}"), &file_bytes)
        .map_err(|e| format!("Failed to decode {path:?}: {e}"))?;

    // 3 = 180 deg, 6 = 90 deg CW, 8 = 90 deg CCW; mirrored variants are left as is
    match read_orientation(path) {
        3 => {
            image.rotate_cw();
            image.rotate_cw();
        }
        6 => image.rotate_cw(),
        8 => image.rotate_ccw(),
        _ => {}
    }

    let texture = rl
        .load_texture_from_image(thread, &image)
        .map_err(|e| format!("Failed to create texture for {path:?}: {e}"))?;
    Ok(Some(texture))
}
