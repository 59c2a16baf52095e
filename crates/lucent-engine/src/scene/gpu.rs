use anyhow::Result;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;

use super::desc::SceneDesc;
use super::mesh::Primitive;

/// Per-node uniform (group 1).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ModelUniform {
    pub model: Mat4,
    /// Inverse transpose of `model`.
    pub normal: Mat4,
}

impl ModelUniform {
    pub fn new(model: Mat4) -> Self {
        Self {
            model,
            normal: model.inverse().transpose(),
        }
    }
}

/// Per-material uniform (group 2).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MaterialUniform {
    pub albedo: [f32; 4],
}

/// Bind group layouts every geometry pipeline shares for groups 1 and 2.
pub struct SceneLayouts {
    pub model: wgpu::BindGroupLayout,
    pub material: wgpu::BindGroupLayout,
}

impl SceneLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let uniform_entry = |visibility, size: usize| wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(size as u64),
            },
            count: None,
        };

        let model = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lucent model bgl"),
            entries: &[uniform_entry(
                wgpu::ShaderStages::VERTEX,
                std::mem::size_of::<ModelUniform>(),
            )],
        });
        let material = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lucent material bgl"),
            entries: &[uniform_entry(
                wgpu::ShaderStages::FRAGMENT,
                std::mem::size_of::<MaterialUniform>(),
            )],
        });

        Self { model, material }
    }
}

pub struct Node {
    pub bind_group: wgpu::BindGroup,
    /// `(material index, mesh index)` in draw order.
    pub primitives: Vec<(usize, usize)>,
}

pub struct Material {
    pub name: String,
    pub bind_group: wgpu::BindGroup,
}

/// Callbacks for [`Scene::for_each_node`], in traversal order.
///
/// For every node: `on_node`, then for each of its primitives `on_material`
/// followed by `on_primitive`.
pub trait SceneVisitor {
    fn on_node(&mut self, node: &Node);
    fn on_material(&mut self, material: &Material);
    fn on_primitive(&mut self, primitive: &Primitive);
}

/// GPU-resident scene.
pub struct Scene {
    layouts: SceneLayouts,
    meshes: Vec<Primitive>,
    materials: Vec<Material>,
    nodes: Vec<Node>,
}

impl Scene {
    /// Uploads `desc`. Fails on dangling mesh or material references.
    pub fn upload(device: &wgpu::Device, desc: &SceneDesc) -> Result<Self> {
        desc.validate()?;
        let layouts = SceneLayouts::new(device);

        let meshes = desc
            .meshes
            .iter()
            .enumerate()
            .map(|(i, m)| Primitive::upload(device, &format!("lucent mesh {i}"), m))
            .collect();

        let materials = desc
            .materials
            .iter()
            .map(|m| {
                let uniform = MaterialUniform {
                    albedo: m.albedo.extend(1.0).to_array(),
                };
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("lucent material {} ubo", m.name)),
                    contents: bytemuck::bytes_of(&uniform),
                    usage: wgpu::BufferUsages::UNIFORM,
                });
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&format!("lucent material {} bind group", m.name)),
                    layout: &layouts.material,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    }],
                });
                Material {
                    name: m.name.clone(),
                    bind_group,
                }
            })
            .collect();

        let nodes = desc
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| {
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("lucent node {i} ubo")),
                    contents: bytemuck::bytes_of(&ModelUniform::new(n.transform)),
                    usage: wgpu::BufferUsages::UNIFORM,
                });
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&format!("lucent node {i} bind group")),
                    layout: &layouts.model,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    }],
                });
                Node {
                    bind_group,
                    primitives: n.primitives.iter().map(|p| (p.material, p.mesh)).collect(),
                }
            })
            .collect();

        log::info!(
            "scene uploaded: {} meshes, {} materials, {} nodes",
            desc.meshes.len(),
            desc.materials.len(),
            desc.nodes.len()
        );

        Ok(Self {
            layouts,
            meshes,
            materials,
            nodes,
        })
    }

    /// The procedural demo hall.
    pub fn demo(device: &wgpu::Device) -> Result<Self> {
        Self::upload(device, &SceneDesc::demo_hall())
    }

    pub fn layouts(&self) -> &SceneLayouts {
        &self.layouts
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Walks nodes in insertion order.
    pub fn for_each_node<V: SceneVisitor>(&self, visitor: &mut V) {
        for node in &self.nodes {
            visitor.on_node(node);
            for &(material, mesh) in &node.primitives {
                visitor.on_material(&self.materials[material]);
                visitor.on_primitive(&self.meshes[mesh]);
            }
        }
    }

    /// Issues every draw into `pass` with the scene groups at 1 (model) and 2 (material).
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        self.for_each_node(&mut PassDraw { pass });
    }
}

struct PassDraw<'p, 'e> {
    pass: &'p mut wgpu::RenderPass<'e>,
}

impl SceneVisitor for PassDraw<'_, '_> {
    fn on_node(&mut self, node: &Node) {
        self.pass.set_bind_group(1, &node.bind_group, &[]);
    }

    fn on_material(&mut self, material: &Material) {
        self.pass.set_bind_group(2, &material.bind_group, &[]);
    }

    fn on_primitive(&mut self, primitive: &Primitive) {
        self.pass.set_vertex_buffer(0, primitive.vertex_buffer.slice(..));
        self.pass
            .set_index_buffer(primitive.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.pass.draw_indexed(0..primitive.num_indices, 0, 0..1);
    }
}
