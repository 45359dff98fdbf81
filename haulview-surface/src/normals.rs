//! Orientation repair, normals and feature-edge classification.

#![expect(clippy::float_arithmetic, reason = "normal vectors and dihedral angles")]
#![expect(
    clippy::indexing_slicing,
    reason = "triangle corners and cell ids index the mesh built alongside them"
)]

use std::collections::{BTreeMap, VecDeque};

use nalgebra::Vector3;

/// Normals and sharp edges derived from an oriented triangle list.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct Shading {
    pub(crate) point_normals: Vec<Vector3<f64>>,
    pub(crate) cell_normals: Vec<Vector3<f64>>,
    pub(crate) feature_edges: Vec<[usize; 2]>,
}

/// Map each undirected edge to the triangles that use it.
fn edge_map(triangles: &[[usize; 3]]) -> BTreeMap<[usize; 2], Vec<usize>> {
    let mut edges: BTreeMap<[usize; 2], Vec<usize>> = BTreeMap::new();
    for (cell, triangle) in triangles.iter().enumerate() {
        for (a, b) in directed_edges(*triangle) {
            edges.entry(undirected(a, b)).or_default().push(cell);
        }
    }
    edges
}

fn directed_edges([a, b, c]: [usize; 3]) -> [(usize, usize); 3] {
    [(a, b), (b, c), (c, a)]
}

fn undirected(a: usize, b: usize) -> [usize; 2] {
    if a <= b { [a, b] } else { [b, a] }
}

fn traverses(triangle: [usize; 3], a: usize, b: usize) -> bool {
    directed_edges(triangle).contains(&(a, b))
}

/// Flip triangles so neighbours traverse each shared edge in opposite
/// directions, then turn the whole mesh towards `up` if most of it faces
/// away.
pub(crate) fn orient(triangles: &mut [[usize; 3]], vertices: &[Vector3<f64>], up: &Vector3<f64>) {
    let edges = edge_map(triangles);
    let mut visited = vec![false; triangles.len()];
    for start in 0..triangles.len() {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        let mut queue = VecDeque::from([start]);
        while let Some(cell) = queue.pop_front() {
            for (a, b) in directed_edges(triangles[cell]) {
                let Some(neighbours) = edges.get(&undirected(a, b)) else {
                    continue;
                };
                for &neighbour in neighbours {
                    if visited[neighbour] {
                        continue;
                    }
                    visited[neighbour] = true;
                    if traverses(triangles[neighbour], a, b) {
                        triangles[neighbour].swap(1, 2);
                    }
                    queue.push_back(neighbour);
                }
            }
        }
    }

    let facing: f64 = triangles
        .iter()
        .map(|triangle| raw_normal(vertices, *triangle).dot(up))
        .sum();
    if facing < 0.0 {
        for triangle in triangles.iter_mut() {
            triangle.swap(1, 2);
        }
    }
}

fn raw_normal(vertices: &[Vector3<f64>], [a, b, c]: [usize; 3]) -> Vector3<f64> {
    (vertices[b] - vertices[a]).cross(&(vertices[c] - vertices[a]))
}

/// Compute unit cell normals, averaged point normals and the edges whose
/// dihedral angle exceeds `feature_angle` degrees.
///
/// Degenerate cells and isolated vertices fall back to `up`.
pub(crate) fn shade(
    triangles: &[[usize; 3]],
    vertices: &[Vector3<f64>],
    up: &Vector3<f64>,
    feature_angle: f64,
) -> Shading {
    let cell_normals: Vec<Vector3<f64>> = triangles
        .iter()
        .map(|triangle| {
            raw_normal(vertices, *triangle)
                .try_normalize(f64::EPSILON)
                .unwrap_or(*up)
        })
        .collect();

    let mut sums = vec![Vector3::zeros(); vertices.len()];
    for (triangle, normal) in triangles.iter().zip(&cell_normals) {
        for &corner in triangle {
            sums[corner] += normal;
        }
    }
    let point_normals = sums
        .into_iter()
        .map(|sum| sum.try_normalize(f64::EPSILON).unwrap_or(*up))
        .collect();

    let feature_edges = edge_map(triangles)
        .into_iter()
        .filter_map(|(edge, cells)| match cells.as_slice() {
            [first, second] => {
                let cosine = cell_normals[*first].dot(&cell_normals[*second]);
                let angle = cosine.clamp(-1.0, 1.0).acos().to_degrees();
                (angle > feature_angle).then_some(edge)
            }
            _ => None,
        })
        .collect();

    Shading {
        point_normals,
        cell_normals,
        feature_edges,
    }
}
