//! WGSL composition with `#import` and `#ifdef` support via naga-oil.

use std::borrow::Cow;
use std::collections::HashMap;

use naga_oil::compose::{
    ComposableModuleDescriptor, Composer, NagaModuleDescriptor, ShaderDefValue,
    ShaderLanguage, ShaderType,
};

use crate::error::VoroError;

/// Shader def that enables the Owner-Id output of the Voronoi kernel.
pub const OWNER_IDS_DEF: &str = "OWNER_IDS";

/// Every top-level shader the crate builds pipelines from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shader {
    /// The `generate_voronoi` compute kernel.
    Voronoi,
    /// The `voronoi_post_process` tint kernel.
    VoronoiTint,
    /// Full-screen blit of the Result onto the surface.
    Composite,
    /// Procedural frame the tint kernel blends over.
    Backdrop,
}

impl Shader {
    /// All shaders, for bulk validation.
    pub const ALL: [Self; 4] =
        [Self::Voronoi, Self::VoronoiTint, Self::Composite, Self::Backdrop];

    /// Bundled WGSL source.
    #[must_use]
    pub fn source(self) -> &'static str {
        match self {
            Self::Voronoi => {
                include_str!("../../assets/shaders/compute/voronoi.wgsl")
            }
            Self::VoronoiTint => {
                include_str!("../../assets/shaders/compute/voronoi_tint.wgsl")
            }
            Self::Composite => {
                include_str!("../../assets/shaders/screen/composite.wgsl")
            }
            Self::Backdrop => {
                include_str!("../../assets/shaders/screen/backdrop.wgsl")
            }
        }
    }

    /// Path used in composer diagnostics.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Voronoi => "compute/voronoi.wgsl",
            Self::VoronoiTint => "compute/voronoi_tint.wgsl",
            Self::Composite => "screen/composite.wgsl",
            Self::Backdrop => "screen/backdrop.wgsl",
        }
    }

    /// Debug label for the wgpu shader module.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Voronoi => "Voronoi Kernel",
            Self::VoronoiTint => "Voronoi Tint Kernel",
            Self::Composite => "Composite Shader",
            Self::Backdrop => "Backdrop Shader",
        }
    }
}

/// A shader to compose: a bundled one or a replacement source loaded at
/// runtime.
#[derive(Debug, Clone)]
pub struct ShaderSource<'a> {
    /// Which pipeline the source feeds.
    pub shader: Shader,
    /// WGSL text; may use `#import voro::...`.
    pub source: Cow<'a, str>,
    /// Path reported in diagnostics.
    pub path: Cow<'a, str>,
}

impl ShaderSource<'static> {
    /// The bundled source for `shader`.
    #[must_use]
    pub fn bundled(shader: Shader) -> Self {
        Self {
            shader,
            source: Cow::Borrowed(shader.source()),
            path: Cow::Borrowed(shader.path()),
        }
    }

    /// Read a replacement source from disk.
    ///
    /// # Errors
    ///
    /// Returns [`VoroError::Io`] if the file cannot be read.
    pub fn from_file(
        shader: Shader,
        path: &std::path::Path,
    ) -> Result<Self, VoroError> {
        let source = std::fs::read_to_string(path)?;
        log::info!("loaded {} override from {}", shader.label(), path.display());
        Ok(Self {
            shader,
            source: Cow::Owned(source),
            path: Cow::Owned(path.display().to_string()),
        })
    }
}

/// Wraps `naga_oil::compose::Composer` with the crate's shared modules
/// pre-registered.
pub struct ShaderComposer {
    composer: Composer,
}

impl ShaderComposer {
    /// Register the shared `voro::*` modules.
    ///
    /// # Errors
    ///
    /// Returns [`VoroError::ShaderCompose`] if a shared module fails to
    /// parse.
    pub fn new() -> Result<Self, VoroError> {
        let mut composer = Composer::default();

        let modules: [(&str, &str); 2] = [
            (
                include_str!("../../assets/shaders/modules/site.wgsl"),
                "modules/site.wgsl",
            ),
            (
                include_str!("../../assets/shaders/modules/fullscreen.wgsl"),
                "modules/fullscreen.wgsl",
            ),
        ];
        for (source, file_path) in modules {
            let _ = composer
                .add_composable_module(ComposableModuleDescriptor {
                    source,
                    file_path,
                    language: ShaderLanguage::Wgsl,
                    ..Default::default()
                })
                .map_err(|e| {
                    VoroError::ShaderCompose(format!("{file_path}: {e}"))
                })?;
        }

        Ok(Self { composer })
    }

    /// Compose `source` into a `wgpu::ShaderModule`, with each of `defs`
    /// defined.
    ///
    /// # Errors
    ///
    /// Returns [`VoroError::ShaderCompose`] if the source does not compose.
    pub fn compose(
        &mut self,
        device: &wgpu::Device,
        source: &ShaderSource<'_>,
        defs: &[&str],
    ) -> Result<wgpu::ShaderModule, VoroError> {
        let module = self.compose_naga(&source.source, &source.path, defs)?;
        Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(source.shader.label()),
            source: wgpu::ShaderSource::Naga(Cow::Owned(module)),
        }))
    }

    /// Compose into a `naga::Module` without a device.
    ///
    /// # Errors
    ///
    /// Returns [`VoroError::ShaderCompose`] if the source does not compose.
    pub fn compose_naga(
        &mut self,
        source: &str,
        file_path: &str,
        defs: &[&str],
    ) -> Result<naga::Module, VoroError> {
        let shader_defs: HashMap<String, ShaderDefValue> = defs
            .iter()
            .map(|d| ((*d).to_owned(), ShaderDefValue::Bool(true)))
            .collect();
        self.composer
            .make_naga_module(NagaModuleDescriptor {
                source,
                file_path,
                shader_type: ShaderType::Wgsl,
                shader_defs,
                ..Default::default()
            })
            .map_err(|e| VoroError::ShaderCompose(format!("{file_path}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use naga::valid::{Capabilities, ValidationFlags, Validator};

    use super::*;

    fn compose_and_validate(shader: Shader, defs: &[&str]) -> naga::Module {
        let mut composer = ShaderComposer::new().unwrap();
        let module = composer
            .compose_naga(shader.source(), shader.path(), defs)
            .unwrap_or_else(|e| panic!("{} failed to compose: {e}", shader.path()));
        let _ = Validator::new(ValidationFlags::all(), Capabilities::all())
            .validate(&module)
            .unwrap_or_else(|e| panic!("{} failed to validate: {e:?}", shader.path()));
        module
    }

    fn has_global(module: &naga::Module, name: &str) -> bool {
        module
            .global_variables
            .iter()
            .any(|(_, g)| g.name.as_deref() == Some(name))
    }

    #[test]
    fn every_shader_composes_and_validates() {
        for shader in Shader::ALL {
            let _ = compose_and_validate(shader, &[]);
        }
        let _ = compose_and_validate(Shader::Voronoi, &[OWNER_IDS_DEF]);
    }

    #[test]
    fn owner_id_output_is_gated_by_the_shader_def() {
        let base = compose_and_validate(Shader::Voronoi, &[]);
        assert!(has_global(&base, "result"));
        assert!(!has_global(&base, "owner_ids"));

        let post = compose_and_validate(Shader::Voronoi, &[OWNER_IDS_DEF]);
        assert!(has_global(&post, "owner_ids"));
    }

    #[test]
    fn kernel_entry_points_keep_their_names() {
        let kernel = compose_and_validate(Shader::Voronoi, &[]);
        assert!(kernel.entry_points.iter().any(|e| e.name == "generate_voronoi"
            && e.workgroup_size == [8, 8, 1]));
        let tint = compose_and_validate(Shader::VoronoiTint, &[]);
        assert!(tint.entry_points.iter().any(|e| e.name == "voronoi_post_process"));
    }

    #[test]
    fn site_record_stride_matches_host_layout() {
        let module = compose_and_validate(Shader::Voronoi, &[]);
        let (site, span) = module
            .types
            .iter()
            .find_map(|(handle, ty)| match &ty.inner {
                naga::TypeInner::Struct { members, span }
                    if members.len() == 7
                        && members
                            .iter()
                            .any(|m| m.name.as_deref() == Some("count")) =>
                {
                    Some((handle, *span))
                }
                _ => None,
            })
            .expect("site struct");
        assert_eq!(span as usize, crate::sites::SITE_STRIDE);

        let stride = module.types.iter().find_map(|(_, ty)| match ty.inner {
            naga::TypeInner::Array { base, stride, .. } if base == site => {
                Some(stride)
            }
            _ => None,
        });
        assert_eq!(stride, Some(28));
    }

    #[test]
    fn broken_override_reports_its_path() {
        let mut composer = ShaderComposer::new().unwrap();
        let err = composer
            .compose_naga("fn broken( {", "override.wgsl", &[])
            .unwrap_err();
        assert!(matches!(err, VoroError::ShaderCompose(ref m) if m.contains("override.wgsl")));
    }
}
