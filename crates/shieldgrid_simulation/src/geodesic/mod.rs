//! Geodesic dual mesh (Goldberg-style полиэдр)
//!
//! Разбивает единичную сферу на зоны щита:
//! 1. Икосаэдр (12 вершин, 20 треугольников)
//! 2. `subdivisions` раз: каждый треугольник → 4 (midpoints нормализуются на сферу,
//!    общий edge даёт ровно одну новую вершину)
//! 3. Dual: центроиды треугольников → вершины, вершины икосферы → полигоны
//!
//! Результат: всегда ровно 12 пентагонов, остальное — гексагоны.
//!
//! | level | faces | dual vertices | dual edges |
//! |-------|-------|---------------|------------|
//! | 0     | 12    | 20            | 30         |
//! | 1     | 42    | 80            | 120        |
//! | 2     | 162   | 320           | 480        |
//! | 3     | 642   | 1280          | 1920       |

use std::collections::{HashMap, HashSet};

use bevy::math::Vec3;

use crate::error::MeshError;

mod cache;

pub use cache::MeshCache;


/// Верхняя граница subdivision (level 6 = 40962 зоны)
pub const MAX_SUBDIVISIONS: u32 = 6;

/// Неупорядоченная пара индексов вершин, канонизированная как `(min, max)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge(pub u32, pub u32);

impl Edge {
    pub fn new(a: u32, b: u32) -> Self {
        if a < b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }
}

/// Выпуклый полигон на единичной сфере (5 или 6 углов), одна зона щита
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonFace {
    /// Индексы в `GeodesicMesh::vertices`, в циклическом порядке
    pub vertices: Vec<u32>,
    /// Нормализованный центроид углов (local space, радиус 1)
    pub centroid: Vec3,
}

impl PolygonFace {
    pub fn is_pentagon(&self) -> bool {
        self.vertices.len() == 5
    }

    pub fn is_hexagon(&self) -> bool {
        self.vertices.len() == 6
    }
}

/// Immutable dual mesh. Шарится через `Arc` всеми Modular щитами одного уровня.
#[derive(Debug, Clone)]
pub struct GeodesicMesh {
    pub subdivisions: u32,
    pub vertices: Vec<Vec3>,
    pub faces: Vec<PolygonFace>,
    /// Wireframe рёбра (centroid → centroid соседних треугольников)
    pub edges: Vec<Edge>,
}

impl GeodesicMesh {
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Углы грани в local space (единичная сфера)
    pub fn face_corners(&self, face: usize) -> Vec<Vec3> {
        self.faces
            .get(face)
            .map(|f| f.vertices.iter().map(|&v| self.vertices[v as usize]).collect())
            .unwrap_or_default()
    }
}

/// Генерирует dual mesh заданного уровня (без кэша — см. [`MeshCache`])
pub fn generate(subdivisions: u32) -> Result<GeodesicMesh, MeshError> {
    if subdivisions > MAX_SUBDIVISIONS {
        return Err(MeshError::TooManySubdivisions {
            requested: subdivisions,
            max: MAX_SUBDIVISIONS,
        });
    }

    let (ico_vertices, triangles) = subdivided_icosahedron(subdivisions);
    build_dual(subdivisions, &ico_vertices, &triangles)
}

/// 12 вершин и 20 граней канонического икосаэдра
fn icosahedron() -> (Vec<Vec3>, Vec<[u32; 3]>) {
    let phi = (1.0 + 5.0_f32.sqrt()) / 2.0;

    let vertices = [
        Vec3::new(-1.0, phi, 0.0),
        Vec3::new(1.0, phi, 0.0),
        Vec3::new(-1.0, -phi, 0.0),
        Vec3::new(1.0, -phi, 0.0),
        Vec3::new(0.0, -1.0, phi),
        Vec3::new(0.0, 1.0, phi),
        Vec3::new(0.0, -1.0, -phi),
        Vec3::new(0.0, 1.0, -phi),
        Vec3::new(phi, 0.0, -1.0),
        Vec3::new(phi, 0.0, 1.0),
        Vec3::new(-phi, 0.0, -1.0),
        Vec3::new(-phi, 0.0, 1.0),
    ]
    .into_iter()
    .map(Vec3::normalize)
    .collect();

    let triangles = vec![
        [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
        [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
        [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
        [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
    ];

    (vertices, triangles)
}

fn subdivided_icosahedron(subdivisions: u32) -> (Vec<Vec3>, Vec<[u32; 3]>) {
    let (mut vertices, mut triangles) = icosahedron();

    for _ in 0..subdivisions {
        let mut midpoints: HashMap<Edge, u32> = HashMap::with_capacity(triangles.len() * 3 / 2);
        let mut next = Vec::with_capacity(triangles.len() * 4);

        for &[a, b, c] in &triangles {
            let ab = midpoint(&mut vertices, &mut midpoints, a, b);
            let bc = midpoint(&mut vertices, &mut midpoints, b, c);
            let ca = midpoint(&mut vertices, &mut midpoints, c, a);

            next.push([a, ab, ca]);
            next.push([b, bc, ab]);
            next.push([c, ca, bc]);
            next.push([ab, bc, ca]);
        }

        triangles = next;
    }

    (vertices, triangles)
}

/// Midpoint на сфере, мемоизирован по Edge
fn midpoint(vertices: &mut Vec<Vec3>, cache: &mut HashMap<Edge, u32>, a: u32, b: u32) -> u32 {
    *cache.entry(Edge::new(a, b)).or_insert_with(|| {
        let mid = ((vertices[a as usize] + vertices[b as usize]) * 0.5).normalize();
        vertices.push(mid);
        (vertices.len() - 1) as u32
    })
}

fn build_dual(
    subdivisions: u32,
    ico_vertices: &[Vec3],
    triangles: &[[u32; 3]],
) -> Result<GeodesicMesh, MeshError> {
    let centroids: Vec<Vec3> = triangles
        .iter()
        .map(|t| {
            (ico_vertices[t[0] as usize] + ico_vertices[t[1] as usize] + ico_vertices[t[2] as usize])
                .normalize()
        })
        .collect();

    // vertex → инцидентные треугольники
    let mut incident: Vec<Vec<u32>> = vec![Vec::with_capacity(6); ico_vertices.len()];
    for (tri, corners) in triangles.iter().enumerate() {
        for &v in corners {
            incident[v as usize].push(tri as u32);
        }
    }

    let mut faces = Vec::with_capacity(ico_vertices.len());
    let mut edges = Vec::with_capacity(triangles.len() * 3 / 2);
    let mut seen_edges: HashSet<Edge> = HashSet::with_capacity(triangles.len() * 3 / 2);

    for (vertex, around) in incident.iter_mut().enumerate() {
        if around.len() < 3 {
            return Err(MeshError::DegenerateFace {
                vertex,
                corners: around.len(),
            });
        }

        let normal = ico_vertices[vertex];
        sort_cyclic(around, normal, &centroids);

        for (i, &from) in around.iter().enumerate() {
            let to = around[(i + 1) % around.len()];
            let edge = Edge::new(from, to);
            if seen_edges.insert(edge) {
                edges.push(edge);
            }
        }

        let centroid = around
            .iter()
            .map(|&c| centroids[c as usize])
            .sum::<Vec3>()
            .normalize();

        faces.push(PolygonFace {
            vertices: around.clone(),
            centroid,
        });
    }

    Ok(GeodesicMesh {
        subdivisions,
        vertices: centroids,
        faces,
        edges,
    })
}

/// Сортирует центроиды вокруг `normal` по углу в касательной плоскости
fn sort_cyclic(around: &mut [u32], normal: Vec3, centroids: &[Vec3]) {
    let up = if normal.y.abs() < 0.99 { Vec3::Y } else { Vec3::X };
    let tangent = normal.cross(up).normalize();
    let bitangent = normal.cross(tangent);

    let angle = |index: u32| {
        let offset = centroids[index as usize] - normal;
        offset.dot(bitangent).atan2(offset.dot(tangent))
    };

    around.sort_by(|&a, &b| angle(a).total_cmp(&angle(b)));
}
