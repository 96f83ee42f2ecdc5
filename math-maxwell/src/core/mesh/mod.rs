//! Surface meshes: storage, validation, queries and generators
//!
//! - `surface`: the [`TriangleMesh`] type and its derived per-triangle data
//! - `topology`: edge structure and closed-surface validation
//! - `intersect`: segment/triangle tests, point distance, self-intersection
//! - `aabb`: axis-aligned bounding boxes
//! - `generators`: icosphere and UV-sphere meshes

pub mod aabb;
pub mod generators;
pub mod intersect;
pub mod surface;
pub mod topology;

pub use aabb::Aabb;
pub use generators::{icosphere, uv_sphere};
pub use surface::TriangleMesh;
pub use topology::{MeshEdge, MeshTopology, MeshValidation};
