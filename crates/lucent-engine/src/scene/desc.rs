use glam::{Mat4, Quat, Vec3};

use super::mesh::MeshData;
use super::shapes;

/// Host-side material: a flat albedo.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDesc {
    pub name: String,
    /// Linear RGB.
    pub albedo: Vec3,
}

/// Draw of one mesh with one material.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PrimitiveDesc {
    pub mesh: usize,
    pub material: usize,
}

/// Transform plus the primitives drawn with it.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDesc {
    pub transform: Mat4,
    pub primitives: Vec<PrimitiveDesc>,
}

/// Scene before upload: meshes, materials and nodes referencing both by index.
#[derive(Debug, Clone, Default)]
pub struct SceneDesc {
    pub meshes: Vec<MeshData>,
    pub materials: Vec<MaterialDesc>,
    pub nodes: Vec<NodeDesc>,
}

impl SceneDesc {
    pub fn add_mesh(&mut self, mesh: MeshData) -> usize {
        self.meshes.push(mesh);
        self.meshes.len() - 1
    }

    pub fn add_material(&mut self, name: &str, albedo: Vec3) -> usize {
        self.materials.push(MaterialDesc {
            name: name.to_string(),
            albedo,
        });
        self.materials.len() - 1
    }

    pub fn add_node(&mut self, transform: Mat4, mesh: usize, material: usize) {
        self.nodes.push(NodeDesc {
            transform,
            primitives: vec![PrimitiveDesc { mesh, material }],
        });
    }

    /// Checks every node references existing meshes and materials.
    pub fn validate(&self) -> anyhow::Result<()> {
        for (i, node) in self.nodes.iter().enumerate() {
            for p in &node.primitives {
                anyhow::ensure!(
                    p.mesh < self.meshes.len() && p.material < self.materials.len(),
                    "node {i} references mesh {} / material {} out of range",
                    p.mesh,
                    p.material
                );
            }
        }
        Ok(())
    }

    /// World-space bounds over every node's mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for node in &self.nodes {
            for p in &node.primitives {
                for v in &self.meshes[p.mesh].vertices {
                    let w = node.transform.transform_point3(Vec3::from(v.position));
                    min = min.min(w);
                    max = max.max(w);
                }
            }
        }
        (min.x <= max.x).then_some((min, max))
    }

    /// A pillared hall enclosing the light volume `[(-14, 0, -6), (14, 20, 6)]`.
    pub fn demo_hall() -> Self {
        let mut desc = Self::default();
        let cube = desc.add_mesh(shapes::cube());
        let plane = desc.add_mesh(shapes::plane());

        let floor = desc.add_material("floor", Vec3::new(0.55, 0.55, 0.6));
        let wall = desc.add_material("wall", Vec3::new(0.8, 0.72, 0.62));
        let pillar = desc.add_material("pillar", Vec3::splat(0.9));
        let plinth = desc.add_material("plinth", Vec3::new(0.35, 0.4, 0.5));

        let place = |center: Vec3, size: Vec3| {
            Mat4::from_scale_rotation_translation(size, Quat::IDENTITY, center)
        };

        desc.add_node(place(Vec3::ZERO, Vec3::new(36.0, 1.0, 18.0)), plane, floor);

        // Back and side walls; the front stays open for the camera.
        desc.add_node(place(Vec3::new(0.0, 11.0, -9.0), Vec3::new(36.0, 22.0, 1.0)), cube, wall);
        desc.add_node(place(Vec3::new(-18.0, 11.0, 0.0), Vec3::new(1.0, 22.0, 18.0)), cube, wall);
        desc.add_node(place(Vec3::new(18.0, 11.0, 0.0), Vec3::new(1.0, 22.0, 18.0)), cube, wall);

        for row_z in [-3.5f32, 3.5] {
            for i in 0..7 {
                let x = -12.0 + 4.0 * i as f32;
                desc.add_node(place(Vec3::new(x, 8.0, row_z), Vec3::new(1.0, 16.0, 1.0)), cube, pillar);
                desc.add_node(place(Vec3::new(x, 0.5, row_z), Vec3::new(1.8, 1.0, 1.8)), cube, plinth);
            }
        }

        desc
    }
}
