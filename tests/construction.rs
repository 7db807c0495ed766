//! Integration tests for mesh construction by convex-layer peeling.
//!
//! Handcrafted fixtures pin down exact edge sets and counts; seeded random
//! inputs check the structural invariants at larger sizes.

#![allow(missing_docs)]

use flatmesh::prelude::*;

fn hexagon() -> Vec<Point<f64>> {
    vec![
        Point::new([8.0, 0.0]),
        Point::new([4.0, 7.0]),
        Point::new([-4.0, 7.0]),
        Point::new([-8.0, 0.0]),
        Point::new([-4.0, -7.0]),
        Point::new([4.0, -7.0]),
    ]
}

#[test]
fn triangle_is_three_boundary_edges() {
    let mesh = Mesh::new(vec![
        Point::new([0.0_f64, 0.0]),
        Point::new([5.0, 0.0]),
        Point::new([2.0, 4.0]),
    ])
    .unwrap();

    assert_eq!(mesh.number_of_points(), 3);
    assert_eq!(mesh.number_of_boundary_edges(), 3);
    assert_eq!(mesh.number_of_internal_edges(), 0);
    assert!(mesh.contains_edge(EdgeKey::new(0, 1)));
    assert!(mesh.contains_edge(EdgeKey::new(1, 2)));
    assert!(mesh.contains_edge(EdgeKey::new(0, 2)));
    assert!(mesh.is_valid().is_ok());
}

#[test]
fn quad_gets_one_interior_diagonal() {
    let mesh = Mesh::new(vec![
        Point::new([6.0_f64, 0.0]),
        Point::new([7.0, 4.0]),
        Point::new([1.0, 4.0]),
        Point::new([0.0, 0.0]),
    ])
    .unwrap();

    assert_eq!(mesh.number_of_boundary_edges(), 4);
    assert_eq!(mesh.number_of_internal_edges(), 1);
    assert!(mesh.is_internal_edge(EdgeKey::new(1, 3)));
    assert!(mesh.is_valid().is_ok());
}

#[test]
fn hexagon_around_one_point_fans_to_it() {
    let mut points = hexagon();
    points.push(Point::new([0.0, 0.0]));
    let mesh = Mesh::new(points).unwrap();

    // One hull layer plus a single interior point: six spokes.
    assert_eq!(mesh.number_of_boundary_edges(), 6);
    assert_eq!(mesh.number_of_internal_edges(), 6);
    for hull_vertex in 0..6 {
        assert!(mesh.is_internal_edge(EdgeKey::new(hull_vertex, 6)));
    }
    assert_eq!(mesh.neighbors(6).map(Iterator::count), Some(6));
    assert!(mesh.is_valid().is_ok());
}

#[test]
fn nested_hulls_are_stitched_into_an_annulus() {
    let mut points = hexagon();
    points.push(Point::new([2.0, 0.0]));
    points.push(Point::new([-2.0, 2.0]));
    points.push(Point::new([-2.0, -2.0]));
    let mesh = Mesh::new(points).unwrap();

    // Hexagon ring is boundary; the inner triangle ring and nine spokes are
    // internal, matching the handshake count for nine points.
    assert_eq!(mesh.number_of_boundary_edges(), 6);
    assert_eq!(mesh.number_of_internal_edges(), 12);
    assert_eq!(mesh.number_of_edges(), 18);
    for ring in [
        EdgeKey::new(6, 7),
        EdgeKey::new(7, 8),
        EdgeKey::new(6, 8),
    ] {
        assert!(mesh.is_internal_edge(ring));
    }
    for spoke in [
        EdgeKey::new(3, 7),
        EdgeKey::new(4, 6),
        EdgeKey::new(0, 6),
    ] {
        assert!(mesh.is_internal_edge(spoke));
    }
    assert!(mesh.is_valid().is_ok());
}

#[test]
fn collinear_interior_pair_becomes_a_chain() {
    let mesh = Mesh::new(vec![
        Point::new([-10.0_f64, -10.0]),
        Point::new([10.0, -10.0]),
        Point::new([10.0, 10.0]),
        Point::new([-10.0, 10.0]),
        Point::new([-2.0, 0.0]),
        Point::new([2.0, 0.0]),
    ])
    .unwrap();

    // The two interior points pair into a chain edge; both square sides of
    // the chain are fanned onto it.
    assert_eq!(mesh.number_of_boundary_edges(), 4);
    assert_eq!(mesh.number_of_internal_edges(), 7);
    assert!(mesh.is_internal_edge(EdgeKey::new(4, 5)));
    assert!(mesh.is_internal_edge(EdgeKey::new(0, 4)));
    assert!(mesh.is_internal_edge(EdgeKey::new(3, 4)));
    assert!(mesh.is_valid().is_ok());
}

#[test]
fn fully_collinear_input_is_a_path() {
    let mesh = Mesh::new(vec![
        Point::new([0.0_f64, 0.0]),
        Point::new([9.0, 9.0]),
        Point::new([3.0, 3.0]),
        Point::new([6.0, 6.0]),
    ])
    .unwrap();

    // Sorted along the line: 0, 2, 3, 1.
    assert_eq!(mesh.number_of_boundary_edges(), 3);
    assert_eq!(mesh.number_of_internal_edges(), 0);
    assert!(mesh.contains_edge(EdgeKey::new(0, 2)));
    assert!(mesh.contains_edge(EdgeKey::new(2, 3)));
    assert!(mesh.contains_edge(EdgeKey::new(1, 3)));
    assert!(!mesh.contains_edge(EdgeKey::new(0, 1)));
    assert!(mesh.is_valid().is_ok());
}

#[test]
fn f32_coordinates_build_too() {
    let mesh = Mesh::new(vec![
        Point::new([0.0_f32, 0.0]),
        Point::new([4.0, 0.0]),
        Point::new([4.0, 4.0]),
        Point::new([0.0, 4.0]),
    ])
    .unwrap();
    assert_eq!(mesh.number_of_edges(), 5);
    assert!(mesh.is_valid().is_ok());
}

#[test]
fn too_few_points_are_rejected() {
    let result = Mesh::new(vec![Point::new([0.0_f64, 0.0]), Point::new([1.0, 1.0])]);
    assert!(matches!(
        result,
        Err(MeshConstructionError::InsufficientPoints { actual: 2 })
    ));
}

#[test]
fn non_finite_coordinates_are_rejected() {
    let result = Mesh::new(vec![
        Point::new([0.0_f64, 0.0]),
        Point::new([f64::NAN, 1.0]),
        Point::new([2.0, 0.0]),
    ]);
    assert!(matches!(
        result,
        Err(MeshConstructionError::NonFiniteCoordinate { index: 1 })
    ));
}

#[test]
fn duplicate_points_are_rejected_with_both_indices() {
    let result = Mesh::new(vec![
        Point::new([1.0_f64, 2.0]),
        Point::new([5.0, 5.0]),
        Point::new([1.0, 2.0]),
        Point::new([0.0, 7.0]),
    ]);
    assert!(matches!(
        result,
        Err(MeshConstructionError::DuplicatePoints { first: 0, second: 2 })
    ));
}

#[test]
fn generated_point_sets_build_valid_meshes() {
    for seed in [1, 2, 3, 42] {
        let points = generate_points_seeded::<f64>(640, 480, 40, seed).unwrap();
        assert_eq!(points.len(), 40);

        let mesh = Mesh::new(points).unwrap();
        assert_eq!(mesh.number_of_points(), 40);
        assert_eq!(
            mesh.number_of_edges(),
            mesh.number_of_boundary_edges() + mesh.number_of_internal_edges(),
            "seed {seed}: boundary and internal sets must partition the edges"
        );
        assert!(mesh.number_of_boundary_edges() >= 3);
        assert!(mesh.total_internal_length() > 0.0);
        assert!(
            mesh.is_valid().is_ok(),
            "seed {seed}: constructed mesh failed validation: {:?}",
            mesh.is_valid()
        );
    }
}

#[test]
fn edge_queries_agree_with_each_other() {
    let points = generate_points_seeded::<f64>(320, 320, 24, 5).unwrap();
    let mesh = Mesh::new(points).unwrap();

    for key in mesh.edge_keys().collect::<Vec<_>>() {
        let (a, b) = key.endpoints();
        assert!(a < b);
        assert_eq!(mesh.edge_vertices(key), Some((a, b)));
        assert_eq!(mesh.is_boundary_edge(key), !mesh.is_internal_edge(key));

        // Both stars list the other endpoint.
        assert!(mesh.neighbors(a).into_iter().flatten().any(|n| n == b));
        assert!(mesh.neighbors(b).into_iter().flatten().any(|n| n == a));
    }
}
