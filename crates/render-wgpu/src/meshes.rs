use std::f32::consts::{PI, TAU};

use bytemuck::{Pod, Zeroable};
use deskscene_common::MeshKind;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// Indexed triangle list for one primitive kind.
#[derive(Debug, Clone, Default)]
pub(crate) struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    fn push_quad(&mut self, corners: [Vertex; 4]) {
        let base = self.vertices.len() as u32;
        self.vertices.extend(corners);
        let quad = [base, base + 1, base + 2, base + 2, base + 3, base];
        self.indices.extend(quad);
    }
}

const CYLINDER_SEGMENTS: u32 = 36;
const SPHERE_STACKS: u32 = 18;
const SPHERE_SLICES: u32 = 36;

pub(crate) fn mesh_for(kind: MeshKind) -> MeshData {
    match kind {
        MeshKind::Plane => plane_mesh(),
        MeshKind::Box => box_mesh(),
        MeshKind::Cylinder => cylinder_mesh(CYLINDER_SEGMENTS),
        MeshKind::Sphere => sphere_mesh(SPHERE_STACKS, SPHERE_SLICES),
    }
}

/// Square in the XZ plane spanning [-1, 1], facing +Y.
fn plane_mesh() -> MeshData {
    let n = [0.0, 1.0, 0.0];
    let mut mesh = MeshData::default();
    mesh.push_quad([
        Vertex::new([-1.0, 0.0, 1.0], n, [0.0, 0.0]),
        Vertex::new([1.0, 0.0, 1.0], n, [1.0, 0.0]),
        Vertex::new([1.0, 0.0, -1.0], n, [1.0, 1.0]),
        Vertex::new([-1.0, 0.0, -1.0], n, [0.0, 1.0]),
    ]);
    mesh
}

/// Unit cube centered on the origin, one quad per face.
fn box_mesh() -> MeshData {
    let p = 0.5_f32;
    let mut mesh = MeshData::default();
    #[rustfmt::skip]
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        ([0.0, 0.0, 1.0],  [[-p, -p,  p], [ p, -p,  p], [ p,  p,  p], [-p,  p,  p]]),
        ([0.0, 0.0, -1.0], [[ p, -p, -p], [-p, -p, -p], [-p,  p, -p], [ p,  p, -p]]),
        ([1.0, 0.0, 0.0],  [[ p, -p,  p], [ p, -p, -p], [ p,  p, -p], [ p,  p,  p]]),
        ([-1.0, 0.0, 0.0], [[-p, -p, -p], [-p, -p,  p], [-p,  p,  p], [-p,  p, -p]]),
        ([0.0, 1.0, 0.0],  [[-p,  p,  p], [ p,  p,  p], [ p,  p, -p], [-p,  p, -p]]),
        ([0.0, -1.0, 0.0], [[-p, -p, -p], [ p, -p, -p], [ p, -p,  p], [-p, -p,  p]]),
    ];
    let uvs = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
    for (normal, corners) in faces {
        mesh.push_quad(std::array::from_fn(|i| {
            Vertex::new(corners[i], normal, uvs[i])
        }));
    }
    mesh
}

/// Capped cylinder of radius 1 standing on the origin, y in [0, 1].
fn cylinder_mesh(segments: u32) -> MeshData {
    let mut mesh = MeshData::default();

    // Side wall: a ring of vertex pairs, seam duplicated for wrapping UVs.
    for i in 0..=segments {
        let t = i as f32 / segments as f32;
        let (sin, cos) = (t * TAU).sin_cos();
        let normal = [cos, 0.0, sin];
        let bottom = Vertex::new([cos, 0.0, sin], normal, [t, 0.0]);
        let top = Vertex::new([cos, 1.0, sin], normal, [t, 1.0]);
        mesh.vertices.extend([bottom, top]);
    }
    for i in 0..segments {
        let b = i * 2;
        mesh.indices.extend([b, b + 1, b + 3, b + 3, b + 2, b]);
    }

    for (y, ny) in [(0.0_f32, -1.0_f32), (1.0, 1.0)] {
        let center = mesh.vertices.len() as u32;
        let hub = Vertex::new([0.0, y, 0.0], [0.0, ny, 0.0], [0.5, 0.5]);
        mesh.vertices.push(hub);
        for i in 0..=segments {
            let (sin, cos) = (i as f32 / segments as f32 * TAU).sin_cos();
            mesh.vertices.push(Vertex::new(
                [cos, y, sin],
                [0.0, ny, 0.0],
                [0.5 + cos * 0.5, 0.5 + sin * 0.5],
            ));
        }
        for i in 0..segments {
            let fan = [center, center + 1 + i, center + 2 + i];
            mesh.indices.extend(fan);
        }
    }
    mesh
}

/// UV sphere of radius 1 centered on the origin.
fn sphere_mesh(stacks: u32, slices: u32) -> MeshData {
    let mut mesh = MeshData::default();
    for stack in 0..=stacks {
        let v = stack as f32 / stacks as f32;
        let (ring, y) = (v * PI).sin_cos();
        for slice in 0..=slices {
            let u = slice as f32 / slices as f32;
            let (sin, cos) = (u * TAU).sin_cos();
            let p = [ring * cos, -y, ring * sin];
            mesh.vertices.push(Vertex::new(p, p, [u, v]));
        }
    }
    let row = slices + 1;
    for stack in 0..stacks {
        for slice in 0..slices {
            let a = stack * row + slice;
            let b = a + row;
            mesh.indices.extend([a, b, a + 1, a + 1, b, b + 1]);
        }
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_well_formed(mesh: &MeshData) {
        assert!(!mesh.indices.is_empty());
        assert_eq!(mesh.indices.len() % 3, 0);
        let count = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < count));
        for v in &mesh.vertices {
            let [x, y, z] = v.normal;
            assert!(((x * x + y * y + z * z).sqrt() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn every_kind_is_well_formed() {
        for kind in MeshKind::ALL {
            check_well_formed(&mesh_for(kind));
        }
    }

    #[test]
    fn plane_spans_unit_square_at_y0() {
        let mesh = mesh_for(MeshKind::Plane);
        assert!(mesh.vertices.iter().all(|v| v.position[1] == 0.0));
        assert!(mesh
            .vertices
            .iter()
            .all(|v| v.position[0].abs() == 1.0 && v.position[2].abs() == 1.0));
    }

    #[test]
    fn box_is_unit_cube() {
        let mesh = mesh_for(MeshKind::Box);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        assert!(mesh
            .vertices
            .iter()
            .all(|v| v.position.iter().all(|c| c.abs() == 0.5)));
    }

    #[test]
    fn cylinder_stands_on_origin() {
        let mesh = mesh_for(MeshKind::Cylinder);
        for v in &mesh.vertices {
            let [x, y, z] = v.position;
            assert!(y == 0.0 || y == 1.0);
            assert!((x * x + z * z).sqrt() <= 1.0 + 1e-5);
        }
    }

    #[test]
    fn sphere_has_unit_radius() {
        let mesh = mesh_for(MeshKind::Sphere);
        for v in &mesh.vertices {
            let [x, y, z] = v.position;
            assert!(((x * x + y * y + z * z).sqrt() - 1.0).abs() < 1e-4);
        }
        let min_y = mesh
            .vertices
            .iter()
            .map(|v| v.position[1])
            .fold(f32::INFINITY, f32::min);
        assert!((min_y + 1.0).abs() < 1e-5);
    }
}
