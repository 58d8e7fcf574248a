//! Property tests for grid invariants and query refinement

use std::collections::BTreeSet;

use proptest::prelude::*;
use spatial_grid::spatial::{center_within_radius, rect_intersects_circle};
use spatial_grid::{ObjectId, RadiusPrecision, Rect, SpatialGrid};

#[derive(Debug, Clone)]
enum Op {
    Update(i32, Rect),
    Remove(i32),
}

fn rect_strategy() -> impl Strategy<Value = Rect> {
    (-2_000i32..2_000, -2_000i32..2_000, -20i32..400, -20i32..400)
        .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0i32..40, rect_strategy()).prop_map(|(id, rect)| Op::Update(id, rect)),
        1 => (0i32..40).prop_map(Op::Remove),
    ]
}

/// Rectangles with positive extents, whose centers lie inside their covered cells
fn solid_rect_strategy() -> impl Strategy<Value = Rect> {
    (-2_000i32..2_000, -2_000i32..2_000, 1i32..400, 1i32..400)
        .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

fn solid_op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0i32..40, solid_rect_strategy()).prop_map(|(id, rect)| Op::Update(id, rect)),
        1 => (0i32..40).prop_map(Op::Remove),
    ]
}

/// Tracked ids whose rectangle satisfies `keep`, by scanning the object table
fn brute_force(grid: &SpatialGrid, keep: impl Fn(&Rect) -> bool) -> BTreeSet<ObjectId> {
    (0..40)
        .map(ObjectId)
        .filter(|id| grid.rect_of(*id).map_or(false, |rect| keep(&rect)))
        .collect()
}

fn apply(grid: &mut SpatialGrid, ops: &[Op]) {
    for op in ops {
        match op {
            Op::Update(id, rect) => grid.update_object(ObjectId(*id), *rect),
            Op::Remove(id) => grid.remove_object(ObjectId(*id)),
        }
    }
}

/// Every (cell, id) membership pair in the grid
fn snapshot(grid: &SpatialGrid) -> BTreeSet<(i64, i64, i32)> {
    grid.cells()
        .flat_map(|(coord, members)| members.iter().map(move |id| (coord.x, coord.y, id.0)))
        .collect()
}

fn as_set(found: Vec<ObjectId>) -> BTreeSet<ObjectId> {
    found.into_iter().collect()
}

proptest! {
    #[test]
    fn membership_matches_object_table(
        cell_size in 16i32..300,
        ops in prop::collection::vec(op_strategy(), 0..60),
    ) {
        let mut grid = SpatialGrid::new(cell_size).unwrap();
        apply(&mut grid, &ops);

        let mut expected = BTreeSet::new();
        for id in 0..40 {
            if let Some(rect) = grid.rect_of(ObjectId(id)) {
                for coord in grid.covered_cells(&rect).iter() {
                    expected.insert((coord.x, coord.y, id));
                }
            }
        }
        prop_assert_eq!(snapshot(&grid), expected);

        for (_, members) in grid.cells() {
            prop_assert!(!members.is_empty());
        }
    }

    #[test]
    fn add_then_remove_restores_state(
        ops in prop::collection::vec(op_strategy(), 0..30),
        rect in rect_strategy(),
    ) {
        let mut grid = SpatialGrid::new(100).unwrap();
        apply(&mut grid, &ops);
        let before = snapshot(&grid);
        let objects_before = grid.object_count();

        // Fresh id outside the generated range
        grid.add_object(ObjectId(1_000), rect);
        grid.remove_object(ObjectId(1_000));

        prop_assert_eq!(snapshot(&grid), before);
        prop_assert_eq!(grid.object_count(), objects_before);
    }

    #[test]
    fn repeated_update_is_idempotent(
        ops in prop::collection::vec(op_strategy(), 0..30),
        id in 0i32..40,
        rect in rect_strategy(),
    ) {
        let mut grid = SpatialGrid::new(100).unwrap();
        apply(&mut grid, &ops);

        grid.update_object(ObjectId(id), rect);
        let once = snapshot(&grid);
        grid.stats();

        grid.update_object(ObjectId(id), rect);
        prop_assert_eq!(snapshot(&grid), once);
        prop_assert!(!grid.stats_dirty());
        prop_assert_eq!(grid.rect_of(ObjectId(id)), Some(rect));
    }

    #[test]
    fn radius_refinements_stay_within_square(
        ops in prop::collection::vec(op_strategy(), 0..60),
        cx in -2_500i32..2_500,
        cy in -2_500i32..2_500,
        radius in 0i32..1_500,
    ) {
        let mut grid = SpatialGrid::new(100).unwrap();
        apply(&mut grid, &ops);

        let square = as_set(grid.objects_in_radius(cx, cy, radius, RadiusPrecision::Square));
        let center = as_set(grid.objects_in_radius(cx, cy, radius, RadiusPrecision::Center));
        let bounds = as_set(grid.objects_in_radius(cx, cy, radius, RadiusPrecision::Bounds));

        prop_assert!(center.is_subset(&square));
        prop_assert!(bounds.is_subset(&square));
    }

    #[test]
    fn bounds_matches_brute_force_scan(
        cell_size in 16i32..300,
        ops in prop::collection::vec(solid_op_strategy(), 0..60),
        cx in -2_500i32..2_500,
        cy in -2_500i32..2_500,
        radius in 0i32..1_500,
    ) {
        let mut grid = SpatialGrid::new(cell_size).unwrap();
        apply(&mut grid, &ops);

        let found = as_set(grid.objects_in_radius(cx, cy, radius, RadiusPrecision::Bounds));
        let expected = brute_force(&grid, |rect| rect_intersects_circle(rect, cx, cy, radius));
        prop_assert_eq!(found, expected);
    }

    #[test]
    fn center_matches_brute_force_scan(
        cell_size in 16i32..300,
        ops in prop::collection::vec(solid_op_strategy(), 0..60),
        cx in -2_500i32..2_500,
        cy in -2_500i32..2_500,
        radius in 0i32..1_500,
    ) {
        let mut grid = SpatialGrid::new(cell_size).unwrap();
        apply(&mut grid, &ops);

        let found = as_set(grid.objects_in_radius(cx, cy, radius, RadiusPrecision::Center));
        let expected = brute_force(&grid, |rect| center_within_radius(rect, cx, cy, radius));
        prop_assert_eq!(found, expected);
    }

    #[test]
    fn bounds_finds_contact_on_cell_boundaries(
        cell in -20i64..20,
        offset in 0i32..100,
        radius in 1i32..300,
        left in any::<bool>(),
    ) {
        // Circle edge lands exactly on a cell boundary at x = cell * 100
        let mut grid = SpatialGrid::new(100).unwrap();
        let boundary = (cell * 100) as i32;
        let cy = offset;
        let rect = if left {
            // Right edge touches cx - r
            Rect::new(boundary - 30, cy - 5, 30, 10)
        } else {
            // Left edge touches cx + r
            Rect::new(boundary, cy - 5, 30, 10)
        };
        let cx = if left { boundary + radius } else { boundary - radius };
        grid.add_object(ObjectId(1), rect);

        prop_assert!(rect_intersects_circle(&rect, cx, cy, radius));
        prop_assert_eq!(
            grid.objects_in_radius(cx, cy, radius, RadiusPrecision::Bounds),
            vec![ObjectId(1)]
        );
    }

    #[test]
    fn queries_return_unique_tracked_ids(
        ops in prop::collection::vec(op_strategy(), 0..60),
        query in rect_strategy(),
    ) {
        let mut grid = SpatialGrid::new(75).unwrap();
        apply(&mut grid, &ops);

        let found = grid.objects_in_rect(query);
        let unique = as_set(found.clone());
        prop_assert_eq!(unique.len(), found.len());
        for id in &unique {
            prop_assert!(grid.contains(*id));
        }

        // Any object registered in a covered cell must come back
        for coord in grid.covered_cells(&query).iter() {
            if let Some(members) = grid.cell(coord) {
                for id in members {
                    prop_assert!(unique.contains(id));
                }
            }
        }
    }

    #[test]
    fn stats_match_fresh_traversal(
        ops in prop::collection::vec(op_strategy(), 1..60),
    ) {
        let mut grid = SpatialGrid::new(100).unwrap();
        apply(&mut grid, &ops);

        let sizes: Vec<usize> = grid.cells().map(|(_, members)| members.len()).collect();
        let stats = grid.stats();
        prop_assert_eq!(stats.total_references, sizes.iter().sum::<usize>());
        prop_assert_eq!(stats.max_objects_per_cell, sizes.iter().copied().max().unwrap_or(0));
    }
}
