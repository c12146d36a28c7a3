//! Startup configuration.
//!
//! A small TOML file controls the window and frame pacing. Every field has
//! a default so the engine runs without any file present; a malformed file
//! is reported and ignored rather than aborting startup.

use std::path::Path;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window_width: u32,
    pub window_height: u32,
    pub title: String,
    /// Upper bound for the frame rate. The world loop paces itself to this
    /// with a monotonic clock, it does not busy-wait or rely on vsync.
    pub target_fps: u32,
    /// Background colour as linear RGBA.
    pub clear_color: [f64; 4],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            title: "toy-ngin".to_string(),
            target_fps: 40,
            clear_color: [0.8, 0.85, 0.85, 1.0],
        }
    }
}

impl Config {
    /// Read the config from `path`, falling back to defaults when the file
    /// is absent or malformed.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => match toml::from_str(&text) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("ignoring malformed config {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.window_width as f32 / self.window_height as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_for_missing_fields() {
        let config: Config = toml::from_str("window_width = 640").unwrap();
        assert_eq!(config.window_width, 640);
        assert_eq!(config.window_height, 720);
        assert_eq!(config.target_fps, 40);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::load_or_default("/definitely/not/here.toml");
        assert_eq!(config.window_width, 1280);
        assert_eq!(config.title, "toy-ngin");
    }
}
