//! Scene traversal provider.
//!
//! A scene is built on the host as a [`SceneDesc`], uploaded once into a
//! [`Scene`], then walked every frame through [`Scene::for_each_node`]. Geometry
//! passes bind group 1 per node and group 2 per material.

mod desc;
mod gpu;
mod mesh;
pub mod shapes;

pub use desc::{MaterialDesc, NodeDesc, PrimitiveDesc, SceneDesc};
pub use gpu::{Material, MaterialUniform, ModelUniform, Node, Scene, SceneLayouts, SceneVisitor};
pub use mesh::{MeshData, Primitive, Vertex};
