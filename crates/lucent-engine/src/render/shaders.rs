use std::fmt::Write as _;

use glam::Vec3;

use crate::config::LightingConfig;
use crate::lights::{BOB_AMPLITUDE, LIGHT_VOLUME_MAX, LIGHT_VOLUME_MIN, ORBIT_RADIUS};

const COMMON: &str = include_str!("shaders/common.wgsl");

pub(crate) const MOVE_LIGHTS_CS: &str = include_str!("shaders/move_lights.cs.wgsl");
pub(crate) const CLUSTERING_CS: &str = include_str!("shaders/clustering.cs.wgsl");
pub(crate) const GEOMETRY_VS: &str = include_str!("shaders/geometry.vs.wgsl");
pub(crate) const NAIVE_FS: &str = include_str!("shaders/naive.fs.wgsl");
pub(crate) const FORWARD_PLUS_FS: &str = include_str!("shaders/forward_plus.fs.wgsl");
pub(crate) const GBUFFER_FS: &str = include_str!("shaders/gbuffer.fs.wgsl");
pub(crate) const FULLSCREEN_VS: &str = include_str!("shaders/fullscreen.vs.wgsl");
pub(crate) const FULLSCREEN_FS: &str = include_str!("shaders/fullscreen.fs.wgsl");

/// Constant ambient term added before any light.
const AMBIENT: f32 = 0.025;

/// Builds shader modules with the lighting constants baked in.
///
/// Every module is `constants + common.wgsl + body`, so kernels and shading
/// passes agree on grid size, capacities and record layout.
#[derive(Debug, Clone)]
pub struct ShaderLibrary {
    header: String,
}

impl ShaderLibrary {
    pub fn new(config: &LightingConfig) -> Self {
        let mut header = constants_preamble(config);
        header.push_str(COMMON);
        header.push('\n');
        Self { header }
    }

    /// Full source for `body`.
    pub fn source(&self, body: &str) -> String {
        let mut src = String::with_capacity(self.header.len() + body.len());
        src.push_str(&self.header);
        src.push_str(body);
        src
    }

    pub fn module(&self, device: &wgpu::Device, label: &str, body: &str) -> wgpu::ShaderModule {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(self.source(body).into()),
        })
    }
}

fn f(v: f32) -> String {
    // Debug always keeps a decimal point or exponent, which WGSL needs for floats.
    format!("{v:?}")
}

fn vec3(v: Vec3) -> String {
    format!("vec3f({}, {}, {})", f(v.x), f(v.y), f(v.z))
}

/// Generated `const` block for `config`.
pub fn constants_preamble(config: &LightingConfig) -> String {
    let [dx, dy, dz] = config.grid_dims;
    let [wx, wy, wz] = config.cluster_workgroup_size;

    let mut s = String::from("// generated\n");
    // Writing to a String cannot fail.
    let _ = writeln!(s, "const CLUSTER_DIMS = vec3u({dx}u, {dy}u, {dz}u);");
    let _ = writeln!(s, "const MAX_LIGHTS_PER_CLUSTER = {}u;", config.max_lights_per_cluster);
    let _ = writeln!(s, "const LIGHT_RADIUS = {};", f(config.light_radius));
    let _ = writeln!(s, "const CLUSTER_WORKGROUP_X = {wx}u;");
    let _ = writeln!(s, "const CLUSTER_WORKGROUP_Y = {wy}u;");
    let _ = writeln!(s, "const CLUSTER_WORKGROUP_Z = {wz}u;");
    let _ = writeln!(
        s,
        "const MOVE_LIGHTS_WORKGROUP_SIZE = {}u;",
        config.move_lights_workgroup_size
    );
    let _ = writeln!(s, "const LIGHT_VOLUME_MIN = {};", vec3(LIGHT_VOLUME_MIN));
    let _ = writeln!(s, "const LIGHT_VOLUME_MAX = {};", vec3(LIGHT_VOLUME_MAX));
    let _ = writeln!(s, "const ORBIT_RADIUS = {};", f(ORBIT_RADIUS));
    let _ = writeln!(s, "const BOB_AMPLITUDE = {};", f(BOB_AMPLITUDE));
    let _ = writeln!(s, "const AMBIENT = {};", vec3(Vec3::splat(AMBIENT)));
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preamble_carries_config() {
        let config = LightingConfig {
            grid_dims: [8, 4, 12],
            max_lights_per_cluster: 32,
            light_radius: 3.0,
            ..Default::default()
        };
        let s = constants_preamble(&config);
        assert!(s.contains("const CLUSTER_DIMS = vec3u(8u, 4u, 12u);"));
        assert!(s.contains("const MAX_LIGHTS_PER_CLUSTER = 32u;"));
        assert!(s.contains("const LIGHT_RADIUS = 3.0;"));
        assert!(s.contains("const MOVE_LIGHTS_WORKGROUP_SIZE = 128u;"));
        assert!(s.contains("const LIGHT_VOLUME_MIN = vec3f(-14.0, 0.0, -6.0);"));
    }

    #[test]
    fn constants_precede_common_and_body() {
        let lib = ShaderLibrary::new(&LightingConfig::default());
        let src = lib.source(CLUSTERING_CS);
        let consts = src.find("const MAX_LIGHTS_PER_CLUSTER").unwrap();
        let common = src.find("struct Cluster {").unwrap();
        let body = src.find("fn cs_main").unwrap();
        assert!(consts < common && common < body);
    }

    #[test]
    fn float_literals_keep_a_decimal_point() {
        assert_eq!(f(2.0), "2.0");
        assert_eq!(f(0.1), "0.1");
    }

    #[test]
    fn every_body_has_an_entry_point() {
        for (body, entry) in [
            (MOVE_LIGHTS_CS, "fn cs_main"),
            (CLUSTERING_CS, "fn cs_main"),
            (GEOMETRY_VS, "fn vs_main"),
            (FULLSCREEN_VS, "fn vs_main"),
            (NAIVE_FS, "fn fs_main"),
            (FORWARD_PLUS_FS, "fn fs_main"),
            (GBUFFER_FS, "fn fs_main"),
            (FULLSCREEN_FS, "fn fs_main"),
        ] {
            assert!(body.contains(entry));
        }
    }
}
