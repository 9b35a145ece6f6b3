//! Centralized demo options with TOML preset support.
//!
//! Everything an application would tune (site count, pipeline variant,
//! tint and composite parameters, shader overrides) lives here. Options
//! serialize to/from TOML; every section uses `#[serde(default)]` so partial
//! files work.

mod assets;
mod camera;
mod composite;
mod motion;
mod pipeline;
mod post_processing;
mod sites;

use std::path::Path;

pub use assets::AssetOptions;
pub use camera::CameraOptions;
pub use composite::CompositeOptions;
pub use motion::MotionOptions;
pub use pipeline::{PipelineOptions, RecomputePolicy, Variant};
pub use post_processing::PostProcessingOptions;
use serde::{Deserialize, Serialize};
pub use sites::{Palette, SiteOptions};

use crate::error::VoroError;

/// Top-level options container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Options {
    /// Site generation.
    pub sites: SiteOptions,
    /// Anchor animation.
    pub motion: MotionOptions,
    /// Pipeline variant and recompute policy.
    pub pipeline: PipelineOptions,
    /// Tint pass parameters.
    pub post_processing: PostProcessingOptions,
    /// Final blit parameters.
    pub composite: CompositeOptions,
    /// Camera projection.
    pub camera: CameraOptions,
    /// Shader overrides.
    pub assets: AssetOptions,
}

impl Options {
    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`VoroError::Io`] if the file cannot be read,
    /// [`VoroError::OptionsParse`] if it is not valid TOML for these options,
    /// and [`VoroError::InvalidOptions`] if a value is out of range.
    pub fn load(path: &Path) -> Result<Self, VoroError> {
        let content = std::fs::read_to_string(path).map_err(VoroError::Io)?;
        let options: Self = toml::from_str(&content)
            .map_err(|e| VoroError::OptionsParse(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Save options to a TOML file (pretty-printed).
    ///
    /// # Errors
    ///
    /// Returns [`VoroError::OptionsParse`] on serialization failure and
    /// [`VoroError::Io`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), VoroError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| VoroError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(VoroError::Io)?;
        }
        std::fs::write(path, content).map_err(VoroError::Io)
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }

    /// Check value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`VoroError::InvalidOptions`] naming the first offending
    /// field.
    pub fn validate(&self) -> Result<(), VoroError> {
        let count = self.sites.count;
        if !(SiteOptions::MIN_COUNT..=SiteOptions::MAX_COUNT).contains(&count) {
            return Err(VoroError::InvalidOptions(format!(
                "sites.count = {count} is outside {}..={}",
                SiteOptions::MIN_COUNT,
                SiteOptions::MAX_COUNT
            )));
        }
        if !(self.camera.znear > 0.0 && self.camera.znear < self.camera.zfar) {
            return Err(VoroError::InvalidOptions(format!(
                "camera.znear = {} must be positive and below camera.zfar = {}",
                self.camera.znear, self.camera.zfar
            )));
        }
        let depth = self.sites.depth;
        if !(depth > self.camera.znear && depth < self.camera.zfar) {
            return Err(VoroError::InvalidOptions(format!(
                "sites.depth = {depth} must lie between the clip planes"
            )));
        }
        for (name, value) in [
            ("post_processing.tint_strength", self.post_processing.tint_strength),
            (
                "post_processing.border_strength",
                self.post_processing.border_strength,
            ),
            ("composite.opacity", self.composite.opacity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(VoroError::InvalidOptions(format!(
                    "{name} = {value} is outside 0..=1"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: Options = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r#"
[sites]
count = 500

[pipeline]
variant = "post_process"
recompute = "every_tick"
"#;
        let opts: Options = toml::from_str(toml_str).unwrap();
        assert_eq!(opts.sites.count, 500);
        assert_eq!(opts.pipeline.variant, Variant::PostProcess);
        assert_eq!(opts.pipeline.recompute, RecomputePolicy::EveryTick);
        // Everything else should be default
        assert_eq!(opts.sites.depth, 10.0);
        assert_eq!(opts.motion, MotionOptions::default());
        assert!(opts.assets.voronoi_kernel.is_none());
    }

    #[test]
    fn defaults_are_valid() {
        Options::default().validate().unwrap();
    }

    #[test]
    fn site_count_is_bounded() {
        let mut opts = Options::default();
        opts.sites.count = 0;
        assert!(matches!(opts.validate(), Err(VoroError::InvalidOptions(_))));
        opts.sites.count = SiteOptions::MAX_COUNT + 1;
        assert!(matches!(opts.validate(), Err(VoroError::InvalidOptions(_))));
        opts.sites.count = SiteOptions::MAX_COUNT;
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn blend_factors_are_bounded() {
        let mut opts = Options::default();
        opts.post_processing.tint_strength = 1.5;
        let err = opts.validate().unwrap_err();
        assert!(err.to_string().contains("tint_strength"));
    }

    #[test]
    fn save_then_load_through_a_preset_dir() {
        let dir = std::env::temp_dir()
            .join(format!("voro-presets-{}", std::process::id()));
        let mut opts = Options::default();
        opts.sites.seed = Some(1234);
        opts.pipeline.variant = Variant::PostProcess;

        opts.save(&dir.join("tinted.toml")).unwrap();
        assert_eq!(Options::list_presets(&dir), vec!["tinted".to_owned()]);
        assert_eq!(Options::load(&dir.join("tinted.toml")).unwrap(), opts);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
