use std::collections::HashMap;
use std::hash::Hash;

use anyhow::{Context, Result};

use crate::render::{FontHandle, Renderer, TextureHandle};

/// Path-keyed cache in front of the renderer's loaders.
#[derive(Default)]
pub struct AssetManager {
    textures: HashMap<String, TextureHandle>,
    fonts: HashMap<String, FontHandle>,
}

fn cached<H: Copy + Eq + Hash>(
    cache: &mut HashMap<String, H>,
    path: &str,
    load: impl FnOnce() -> Result<H>,
) -> Result<H> {
    if let Some(handle) = cache.get(path) {
        return Ok(*handle);
    }
    let handle = load()?;
    log::debug!("loaded {path}");
    cache.insert(path.to_owned(), handle);
    Ok(handle)
}

impl AssetManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_texture(&mut self, renderer: &mut Renderer, path: &str) -> Result<TextureHandle> {
        cached(&mut self.textures, path, || renderer.load_texture_from_file(path))
    }

    pub fn load_font(&mut self, renderer: &mut Renderer, path: &str) -> Result<FontHandle> {
        cached(&mut self.fonts, path, || {
            let bytes = std::fs::read(path).with_context(|| format!("reading {path}"))?;
            renderer.load_font_from_bytes(&bytes)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    #[test]
    fn second_lookup_hits_the_cache() {
        let mut cache = HashMap::new();
        let mut loads = 0;
        for _ in 0..3 {
            let handle = cached(&mut cache, "ship.png", || {
                loads += 1;
                Ok(TextureHandle::from_raw(7))
            })
            .unwrap();
            assert_eq!(handle, TextureHandle::from_raw(7));
        }
        assert_eq!(loads, 1);
    }

    #[test]
    fn failures_are_not_cached() {
        let mut cache: HashMap<String, TextureHandle> = HashMap::new();
        let err = cached(&mut cache, "missing.png", || bail!("no such file"));
        assert!(err.is_err());
        assert!(cache.is_empty());
    }
}
