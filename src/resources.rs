use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::layout::CellMetrics;
use crate::theme::{build_palette, AccentColor, Palette, ThemeVariant};

const MIN_FONT_SIZE: f32 = 8.0;
const MAX_FONT_SIZE: f32 = 48.0;

/// Appearance settings read from `resources.json`. Changing them resizes the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resources {
    #[serde(default)]
    pub theme: ThemeVariant,
    #[serde(default)]
    pub accent: AccentColor,
    /// Text size in pixels; drives the cell metrics of the grid.
    #[serde(default = "default_font_size")]
    pub font_size: f32,
}

fn default_font_size() -> f32 { 13.0 }

impl Default for Resources {
    fn default() -> Self {
        Self {
            theme: ThemeVariant::default(),
            accent: AccentColor::default(),
            font_size: default_font_size(),
        }
    }
}

impl Resources {
    /// Linux → ~/.config/sysgauges/resources.json
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sysgauges")
            .join("resources.json")
    }

    /// Missing file means defaults; a broken one is reported and ignored.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => {
                let mut resources: Self = serde_json::from_str(&contents).unwrap_or_else(|e| {
                    log::warn!("invalid resources file {}, using defaults: {e}", path.display());
                    Self::default()
                });
                resources.sanitize();
                resources
            }
            Err(_) => Self::default(),
        }
    }

    fn sanitize(&mut self) {
        if !self.font_size.is_finite() {
            self.font_size = default_font_size();
        }
        self.font_size = self.font_size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
    }

    pub fn palette(&self) -> Palette {
        build_palette(self.theme, self.accent)
    }

    pub fn cell_metrics(&self) -> CellMetrics {
        CellMetrics::for_font_size(self.font_size)
    }
}

/// Notices when the resources file is created, edited or removed.
#[derive(Debug)]
pub struct ResourceWatcher {
    path: PathBuf,
    stamp: Option<SystemTime>,
}

impl ResourceWatcher {
    pub fn new(path: PathBuf) -> Self {
        let stamp = modified(&path);
        Self { path, stamp }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True once per change of the file's modification time.
    pub fn changed(&mut self) -> bool {
        let stamp = modified(&self.path);
        if stamp == self.stamp {
            return false;
        }
        self.stamp = stamp;
        true
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sysgauges-{}-{name}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir.join("resources.json")
    }

    #[test]
    fn test_default_values() {
        let res = Resources::default();
        assert_eq!(res.theme, ThemeVariant::CatppuccinMocha);
        assert_eq!(res.accent, AccentColor::Blue);
        assert!((res.font_size - 13.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let res: Resources = serde_json::from_str(r#"{"theme":"GruvboxLight"}"#).unwrap();
        assert_eq!(res.theme, ThemeVariant::GruvboxLight);
        assert_eq!(res.accent, AccentColor::Blue);
        assert!((res.font_size - 13.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_load_sanitizes_and_survives_garbage() {
        let path = scratch("load");
        fs::write(&path, r#"{"font_size": 400.0, "accent": "Green"}"#).unwrap();
        let res = Resources::load_from(&path);
        assert_eq!(res.accent, AccentColor::Green);
        assert!((res.font_size - MAX_FONT_SIZE).abs() < f32::EPSILON);

        fs::write(&path, "not json").unwrap();
        assert_eq!(Resources::load_from(&path), Resources::default());

        fs::remove_file(&path).unwrap();
        assert_eq!(Resources::load_from(&path), Resources::default());
    }

    #[test]
    fn test_watcher_sees_creation_and_removal() {
        let path = scratch("watch");
        let _ = fs::remove_file(&path);

        let mut watcher = ResourceWatcher::new(path.clone());
        assert!(!watcher.changed());

        fs::write(&path, "{}").unwrap();
        assert!(watcher.changed());
        assert!(!watcher.changed());

        fs::remove_file(&path).unwrap();
        assert!(watcher.changed());
        assert!(!watcher.changed());
        assert_eq!(watcher.path(), path.as_path());
    }
}
