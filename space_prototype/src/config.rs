//! Runtime tunables loaded from `prototype.json`.
//!
//! Every section and field has a default, so the file may override any
//! subset of values. A missing file is the normal case and yields
//! [`GameConfig::default`]; a malformed one is reported and ignored, as are
//! camera zoom limits that are inverted or not positive.

use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;
use space_engine::EngineConfig;

use crate::error::ConfigError;

pub const CONFIG_FILE: &str = "prototype.json";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub window: WindowConfig,
    pub map: MapConfig,
    pub camera: CameraConfig,
    pub beam: BeamConfig,
    pub asteroids: AsteroidConfig,
    pub player: PlayerConfig,
    pub assets: AssetPaths,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Space Prototype".into(),
            width: 1280,
            height: 720,
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 5000.0,
            height: 3000.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Zoom change per mouse-wheel notch.
    pub zoom_step: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            zoom_step: 0.1,
            min_zoom: 0.2,
            max_zoom: 2.5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BeamConfig {
    pub range: f32,
    pub damage_per_second: f32,
    /// Minimum time between two damage popups.
    pub popup_interval: f32,
    /// Popups show `damage * popup_value_scale`.
    pub popup_value_scale: f32,
    pub body_scale: f32,
    pub head_scale: f32,
    /// Body segment spacing as a fraction of the body width.
    pub step_scale: f32,
}

impl Default for BeamConfig {
    fn default() -> Self {
        Self {
            range: 180.0,
            damage_per_second: 30.0,
            popup_interval: 0.18,
            popup_value_scale: 10.0,
            body_scale: 0.75,
            head_scale: 0.65,
            step_scale: 0.55,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AsteroidConfig {
    pub spawn_interval: f32,
    pub base_speed: f32,
    /// Overrides the view-derived minimum spawn distance.
    pub min_spawn_distance: Option<f32>,
    /// Overrides `min + 800`; also widens the despawn radius.
    pub max_spawn_distance: Option<f32>,
    /// Fixed RNG seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for AsteroidConfig {
    fn default() -> Self {
        Self {
            spawn_interval: 1.2,
            base_speed: 140.0,
            min_spawn_distance: None,
            max_spawn_distance: None,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub speed: f32,
    pub boost_speed: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 200.0,
            boost_speed: 420.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssetPaths {
    pub background: String,
    pub beam_head: String,
    pub beam_body: String,
    pub asteroid_dir: String,
    pub ship_body: String,
    pub engine_idle: String,
    pub engine_boost: String,
    pub planet: String,
    pub font: String,
}

impl Default for AssetPaths {
    fn default() -> Self {
        const SHIP: &str = "Assets/Textures/Ships/Ship/Main Ship";
        Self {
            background: "Assets/Textures/Background/Space Background.png".into(),
            beam_head: "Assets/Textures/Lasers/Laser Sprites/04.png".into(),
            beam_body: "Assets/Textures/Lasers/Laser Sprites/23.png".into(),
            asteroid_dir: "Assets/Textures/Asteroids/Stone".into(),
            ship_body: format!("{SHIP}/Main Ship - Bases/PNGs/Main Ship - Base - Full health.png"),
            engine_idle: format!(
                "{SHIP}/Main Ship - Engine Effects/PNGs/Main Ship - Engines - Base Engine - Idle.png"
            ),
            engine_boost: format!(
                "{SHIP}/Main Ship - Engine Effects/PNGs/Main Ship - Engines - Base Engine - Powering.png"
            ),
            planet: "Assets/Textures/Planets/PlanetSpriteSheet.png".into(),
            font: "Assets/Fonts/ui.ttf".into(),
        }
    }
}

impl CameraConfig {
    fn is_usable(&self) -> bool {
        self.min_zoom > 0.0 && self.max_zoom > 0.0 && self.min_zoom <= self.max_zoom
    }
}

impl GameConfig {
    /// Replace sections whose values contradict each other with their
    /// defaults.
    fn sanitized(mut self) -> Self {
        if !self.camera.is_usable() {
            log::warn!(
                "camera zoom limits {}..{} are unusable; using defaults",
                self.camera.min_zoom,
                self.camera.max_zoom
            );
            self.camera = CameraConfig::default();
        }
        self
    }

    /// Parse a config file. A missing file is `Ok(None)`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Option<Self>, ConfigError> {
        let path = path.as_ref();
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_json::from_str::<Self>(&text)
            .map(|config| Some(config.sanitized()))
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Load `path`, falling back to defaults when it is absent or unusable.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::from_path(path) {
            Ok(Some(config)) => {
                log::info!("loaded configuration overrides");
                config
            }
            Ok(None) => Self::default(),
            Err(err) => {
                log::warn!("{err}; using built-in defaults");
                Self::default()
            }
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            title: self.window.title.clone(),
            width: self.window.width,
            height: self.window.height,
            vsync: self.window.vsync,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = GameConfig::from_path(dir.path().join("absent.json")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "asteroids": {{ "seed": 7, "max_spawn_distance": 900.0 }}, "beam": {{ "range": 250.0 }} }}"#
        )
        .unwrap();

        let config = GameConfig::from_path(file.path()).unwrap().unwrap();
        assert_eq!(config.asteroids.seed, Some(7));
        assert_eq!(config.asteroids.max_spawn_distance, Some(900.0));
        assert_eq!(config.asteroids.min_spawn_distance, None);
        assert_eq!(config.asteroids.spawn_interval, 1.2);
        assert_eq!(config.beam.range, 250.0);
        assert_eq!(config.beam.damage_per_second, 30.0);
        assert_eq!(config.map.width, 5000.0);
    }

    #[test]
    fn malformed_file_reports_parse_error_and_falls_back() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let err = GameConfig::from_path(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));

        let config = GameConfig::load_or_default(file.path());
        assert_eq!(config.window.width, 1280);
    }

    #[test]
    fn inverted_zoom_limits_fall_back_to_default_camera() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "camera": {{ "min_zoom": 3.0, "max_zoom": 1.0 }}, "beam": {{ "range": 250.0 }} }}"#
        )
        .unwrap();

        let config = GameConfig::load_or_default(file.path());
        assert_eq!(config.camera.min_zoom, 0.2);
        assert_eq!(config.camera.max_zoom, 2.5);
        assert_eq!(config.beam.range, 250.0);
    }

    #[test]
    fn non_positive_zoom_limit_is_rejected() {
        let camera = CameraConfig {
            min_zoom: 0.0,
            ..CameraConfig::default()
        };
        assert!(!camera.is_usable());
        assert!(CameraConfig::default().is_usable());
    }

    #[test]
    fn engine_config_mirrors_window_section() {
        let mut config = GameConfig::default();
        config.window.title = "Test".into();
        config.window.vsync = false;

        let engine = config.engine_config();
        assert_eq!(engine.title, "Test");
        assert_eq!((engine.width, engine.height), (1280, 720));
        assert!(!engine.vsync);
    }
}
