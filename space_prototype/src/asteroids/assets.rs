use std::fs;
use std::path::{Path, PathBuf};

use space_engine::{TextureHandle, TextureSink};

use crate::error::AssetError;

/// Pixels with at least this alpha count as solid for collision.
pub const MASK_ALPHA_THRESHOLD: u8 = 20;

/// Maximum number of asteroid templates kept from a directory scan.
pub const MAX_ASSETS: usize = 64;

/// Texture plus a row-major opacity mask (one byte per pixel, 0 or 1).
#[derive(Debug, Clone)]
pub struct AsteroidAsset {
    texture: TextureHandle,
    width: u32,
    height: u32,
    mask: Vec<u8>,
}

impl AsteroidAsset {
    /// Build an asset from decoded RGBA8 pixels. Pixels missing from a short
    /// buffer are treated as empty.
    pub fn from_rgba(texture: TextureHandle, width: u32, height: u32, rgba: &[u8]) -> Self {
        let mut mask = build_mask(rgba);
        mask.resize(width as usize * height as usize, 0);
        Self {
            texture,
            width,
            height,
            mask,
        }
    }

    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn mask(&self) -> &[u8] {
        &self.mask
    }

    /// Mask lookup; anything outside the image is empty space.
    #[inline]
    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return false;
        }
        self.mask[y as usize * self.width as usize + x as usize] != 0
    }
}

/// One byte per pixel: 1 where alpha reaches [`MASK_ALPHA_THRESHOLD`].
pub fn build_mask(rgba: &[u8]) -> Vec<u8> {
    rgba.chunks_exact(4)
        .map(|px| u8::from(px[3] >= MASK_ALPHA_THRESHOLD))
        .collect()
}

/// Load every eligible `.png` in `dir`, in file-name order, up to [`MAX_ASSETS`].
///
/// Files that fail to decode or upload are skipped. An unreadable directory
/// yields no assets.
pub fn load_dir<S>(dir: impl AsRef<Path>, sink: &mut S) -> Vec<AsteroidAsset>
where
    S: TextureSink + ?Sized,
{
    let dir = dir.as_ref();
    let mut paths = match candidate_files(dir) {
        Ok(paths) => paths,
        Err(err) => {
            log::warn!("cannot scan asteroid directory {}: {err}", dir.display());
            return Vec::new();
        }
    };
    paths.sort();

    let mut assets = Vec::new();
    for path in paths {
        if assets.len() >= MAX_ASSETS {
            log::warn!(
                "asteroid asset limit of {MAX_ASSETS} reached, ignoring the rest of {}",
                dir.display()
            );
            break;
        }
        match load_file(&path, sink) {
            Ok(asset) => {
                log::debug!(
                    "loaded asteroid {} ({}x{})",
                    path.display(),
                    asset.width,
                    asset.height
                );
                assets.push(asset);
            }
            Err(err) => log::warn!("skipping asteroid asset: {err}"),
        }
    }

    log::info!("loaded {} asteroid assets from {}", assets.len(), dir.display());
    assets
}

fn candidate_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if is_eligible(&path) && entry.file_type().map_or(false, |t| t.is_file()) {
            paths.push(path);
        }
    }
    Ok(paths)
}

/// Visible files with a `.png` extension, in any letter case (`B.PNG` loads).
fn is_eligible(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if name.starts_with('.') {
        return false;
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("png"))
}

fn load_file<S>(path: &Path, sink: &mut S) -> Result<AsteroidAsset, AssetError>
where
    S: TextureSink + ?Sized,
{
    let bytes = fs::read(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let image = image::load_from_memory(&bytes)
        .map_err(|source| AssetError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();

    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(AssetError::Empty {
            path: path.to_path_buf(),
            width,
            height,
        });
    }

    let texture = sink
        .upload_rgba(image.as_raw(), width, height)
        .map_err(|err| AssetError::Upload {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;

    Ok(AsteroidAsset::from_rgba(texture, width, height, image.as_raw()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_threshold_is_inclusive() {
        let rgba = [
            0, 0, 0, 0, //
            9, 9, 9, 19, //
            9, 9, 9, 20, //
            9, 9, 9, 255,
        ];
        assert_eq!(build_mask(&rgba), vec![0, 0, 1, 1]);
    }

    #[test]
    fn out_of_range_pixels_are_empty() {
        let rgba = vec![255u8; 2 * 3 * 4];
        let asset = AsteroidAsset::from_rgba(TextureHandle::from_raw(1), 2, 3, &rgba);

        assert_eq!(asset.mask().len(), 6);
        assert!(asset.is_solid(1, 2));
        assert!(!asset.is_solid(2, 0));
        assert!(!asset.is_solid(0, 3));
        assert!(!asset.is_solid(-1, 0));
    }

    #[test]
    fn only_visible_png_files_are_eligible() {
        assert!(is_eligible(Path::new("rocks/a.png")));
        assert!(is_eligible(Path::new("rocks/B.PNG")));
        assert!(!is_eligible(Path::new("rocks/.hidden.png")));
        assert!(!is_eligible(Path::new("rocks/notes.txt")));
        assert!(!is_eligible(Path::new("rocks/png")));
    }
}
