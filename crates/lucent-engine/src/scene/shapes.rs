use glam::Vec3;

use super::mesh::MeshData;

/// Face normal with two in-plane axes satisfying `u × v = n`.
const CUBE_FACES: [(Vec3, Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::NEG_Z, Vec3::Y),
    (Vec3::NEG_X, Vec3::Z, Vec3::Y),
    (Vec3::Y, Vec3::X, Vec3::NEG_Z),
    (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    (Vec3::Z, Vec3::X, Vec3::Y),
    (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
];

fn push_face(mesh: &mut MeshData, n: Vec3, u: Vec3, v: Vec3) {
    let c = n * 0.5;
    let (u, v) = (u * 0.5, v * 0.5);
    mesh.push_quad([c - u - v, c + u - v, c + u + v, c - u + v], n);
}

/// Unit cube centered at the origin (side 1).
pub fn cube() -> MeshData {
    let mut mesh = MeshData::default();
    for (n, u, v) in CUBE_FACES {
        push_face(&mut mesh, n, u, v);
    }
    mesh
}

/// Unit square in the XZ plane facing +Y.
pub fn plane() -> MeshData {
    let mut mesh = MeshData::default();
    mesh.push_quad(
        [
            Vec3::new(-0.5, 0.0, 0.5),
            Vec3::new(0.5, 0.0, 0.5),
            Vec3::new(0.5, 0.0, -0.5),
            Vec3::new(-0.5, 0.0, -0.5),
        ],
        Vec3::Y,
    );
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_winding(mesh: &MeshData) {
        for tri in mesh.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| mesh.vertices[i as usize]);
            let (pa, pb, pc) = (
                Vec3::from(a.position),
                Vec3::from(b.position),
                Vec3::from(c.position),
            );
            let face = (pb - pa).cross(pc - pa).normalize();
            assert!(face.dot(Vec3::from(a.normal)) > 0.99, "{tri:?}");
        }
    }

    #[test]
    fn cube_faces_wind_counter_clockwise_outward() {
        let mesh = cube();
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        check_winding(&mesh);
        for v in &mesh.vertices {
            let p = Vec3::from(v.position);
            // Normals point away from the center.
            assert!(p.dot(Vec3::from(v.normal)) > 0.0);
            assert_eq!(p.abs().max_element(), 0.5);
        }
    }

    #[test]
    fn plane_faces_up() {
        let mesh = plane();
        check_winding(&mesh);
        assert!(mesh.vertices.iter().all(|v| v.position[1] == 0.0));
    }

    #[test]
    fn append_rebases_indices() {
        let mut mesh = plane();
        mesh.append(&plane());
        assert_eq!(mesh.indices[6..], [4, 5, 6, 4, 6, 7]);
        check_winding(&mesh);
    }
}
