use std::ops::Range;

use super::vector::{Vector, vector};

const LEAF_CAPACITY: usize = 12;
const MAX_DEPTH: u32 = 24;
/// Point sets narrower than this on both axes are treated as one location.
const COINCIDENT_EXTENT: f64 = 1e-6;

/// Square region of the plane together with the bodies inside it.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    pub(crate) center: Vector,
    pub(crate) half_extent: f64,
    pub(crate) centroid: Vector,
    pub(crate) mass: f64,
    depth: u32,
    /// Slice of `QuadTree::order` holding this cell's node indices.
    points: Range<usize>,
    /// Children are stored next to each other in `QuadTree::cells`; empty for leaves.
    children: Range<usize>,
}

impl Cell {
    fn new(
        positions: &[Vector],
        members: &[usize],
        center: Vector,
        half_extent: f64,
        points: Range<usize>,
        depth: u32,
    ) -> Self {
        let mut sum = Vector::ZERO;
        for &index in members {
            sum += positions[index];
        }
        let mass = members.len() as f64;

        Self {
            center,
            half_extent,
            centroid: if mass > 0.0 { sum / mass } else { center },
            mass,
            depth,
            points,
            children: 0..0,
        }
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn side_length(&self) -> f64 {
        self.half_extent * 2.0
    }

    pub(crate) fn contains(&self, point: Vector) -> bool {
        let offset = point - self.center;
        offset.x.abs() <= self.half_extent && offset.y.abs() <= self.half_extent
    }

    pub(crate) fn children(&self) -> Range<usize> {
        self.children.clone()
    }
}

/// Arena quadtree over a position snapshot. Cell `ROOT` spans every point;
/// each cell's points are a contiguous run of `order`, so leaves never copy
/// index lists.
pub(crate) struct QuadTree {
    cells: Vec<Cell>,
    order: Vec<usize>,
}

impl QuadTree {
    pub(crate) const ROOT: usize = 0;

    /// Returns `None` for an empty snapshot or when any coordinate is not finite.
    pub(crate) fn build(positions: &[Vector]) -> Option<Self> {
        let (center, half_extent) = bounding_square(positions)?;
        let order = (0..positions.len()).collect::<Vec<_>>();
        let root = Cell::new(
            positions,
            &order,
            center,
            half_extent,
            0..positions.len(),
            0,
        );

        let mut tree = Self {
            cells: vec![root],
            order,
        };
        let mut pending = vec![Self::ROOT];
        while let Some(cell) = pending.pop() {
            if tree.should_split(cell, positions) {
                let first_child = tree.cells.len();
                tree.split(cell, positions);
                pending.extend(first_child..tree.cells.len());
            }
        }
        Some(tree)
    }

    pub(crate) fn cell(&self, index: usize) -> &Cell {
        &self.cells[index]
    }

    /// Node indices inside `cell`.
    pub(crate) fn points(&self, cell: &Cell) -> &[usize] {
        &self.order[cell.points.clone()]
    }

    fn should_split(&self, index: usize, positions: &[Vector]) -> bool {
        let cell = &self.cells[index];
        if cell.points.len() <= LEAF_CAPACITY || cell.depth >= MAX_DEPTH {
            return false;
        }

        let members = self.points(cell);
        let mut min = positions[members[0]];
        let mut max = min;
        for &member in &members[1..] {
            let point = positions[member];
            min = vector(min.x.min(point.x), min.y.min(point.y));
            max = vector(max.x.max(point.x), max.y.max(point.y));
        }
        (max.x - min.x).max(max.y - min.y) > COINCIDENT_EXTENT
    }

    /// Reorders the cell's run of `order` by quadrant and appends one child per
    /// non-empty quadrant.
    fn split(&mut self, index: usize, positions: &[Vector]) {
        let cell = &self.cells[index];
        let (center, half_extent, depth, points) =
            (cell.center, cell.half_extent, cell.depth, cell.points.clone());

        self.order[points.clone()]
            .sort_unstable_by_key(|&member| quadrant(center, positions[member]));

        let first_child = self.cells.len();
        let child_half = half_extent * 0.5;
        let mut start = points.start;
        for slot in 0..4 {
            let end = start
                + self.order[start..points.end]
                    .iter()
                    .take_while(|&&member| quadrant(center, positions[member]) == slot)
                    .count();
            if end > start {
                let child = Cell::new(
                    positions,
                    &self.order[start..end],
                    center + quadrant_offset(slot) * child_half,
                    child_half,
                    start..end,
                    depth + 1,
                );
                self.cells.push(child);
            }
            start = end;
        }

        self.cells[index].children = first_child..self.cells.len();
    }
}

/// Bit 0 is set right of center, bit 1 below it.
fn quadrant(center: Vector, point: Vector) -> usize {
    usize::from(point.x >= center.x) | (usize::from(point.y >= center.y) << 1)
}

fn quadrant_offset(slot: usize) -> Vector {
    let sign = |set: bool| if set { 1.0 } else { -1.0 };
    vector(sign(slot & 1 != 0), sign(slot & 2 != 0))
}

fn bounding_square(positions: &[Vector]) -> Option<(Vector, f64)> {
    let first = *positions.first()?;
    let (min, max) = positions.iter().fold((first, first), |(min, max), point| {
        (
            vector(min.x.min(point.x), min.y.min(point.y)),
            vector(max.x.max(point.x), max.y.max(point.y)),
        )
    });
    if !positions.iter().all(|point| point.is_finite()) {
        return None;
    }

    let span = (max.x - min.x).max(max.y - min.y);
    Some(((min + max) * 0.5, (span * 0.5).max(1.0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::initial_position;

    fn leaves(tree: &QuadTree) -> Vec<&Cell> {
        tree.cells.iter().filter(|cell| cell.is_leaf()).collect()
    }

    #[test]
    fn every_point_lands_in_exactly_one_leaf() {
        let positions = (0..200).map(initial_position).collect::<Vec<_>>();
        let tree = QuadTree::build(&positions).unwrap();

        let mut indices = leaves(&tree)
            .into_iter()
            .flat_map(|cell| tree.points(cell).iter().copied())
            .collect::<Vec<_>>();
        indices.sort_unstable();
        assert_eq!(indices, (0..200).collect::<Vec<_>>());

        let root = tree.cell(QuadTree::ROOT);
        assert_eq!(root.mass, 200.0);
        assert!(!root.is_leaf());
    }

    #[test]
    fn cells_contain_their_points_and_weigh_their_children() {
        let positions = (0..150).map(initial_position).collect::<Vec<_>>();
        let tree = QuadTree::build(&positions).unwrap();

        for cell in &tree.cells {
            for &index in tree.points(cell) {
                assert!(cell.contains(positions[index]));
            }
            if !cell.is_leaf() {
                let child_mass = cell
                    .children()
                    .map(|child| tree.cell(child).mass)
                    .sum::<f64>();
                assert_eq!(child_mass, cell.mass);
            }
        }
    }

    #[test]
    fn distant_outlier_does_not_collapse_the_cluster() {
        let mut positions = (0..299).map(initial_position).collect::<Vec<_>>();
        positions.push(vector(1e5, 0.0));
        let tree = QuadTree::build(&positions).unwrap();

        let largest = leaves(&tree)
            .iter()
            .map(|cell| tree.points(cell).len())
            .max()
            .unwrap();
        assert!(
            largest <= LEAF_CAPACITY,
            "largest leaf holds {largest} points"
        );
    }

    #[test]
    fn near_but_distinct_points_keep_splitting() {
        let positions = (0..40)
            .map(|i| vector(3.0 + i as f64 * 1e-3, 3.0))
            .collect::<Vec<_>>();
        let tree = QuadTree::build(&positions).unwrap();
        assert!(
            leaves(&tree)
                .iter()
                .all(|cell| tree.points(cell).len() <= LEAF_CAPACITY)
        );
    }

    #[test]
    fn coincident_points_stay_in_one_leaf() {
        let mut positions = vec![vector(5.0, 5.0); 40];
        let tree = QuadTree::build(&positions).unwrap();
        let root = tree.cell(QuadTree::ROOT);
        assert!(root.is_leaf());
        assert_eq!(tree.points(root).len(), 40);
        assert_eq!(root.centroid, vector(5.0, 5.0));

        positions.push(vector(-500.0, 80.0));
        let tree = QuadTree::build(&positions).unwrap();
        let stacked = leaves(&tree)
            .iter()
            .map(|cell| tree.points(cell).len())
            .max()
            .unwrap();
        assert_eq!(stacked, 40);
    }

    #[test]
    fn empty_or_non_finite_input_builds_nothing() {
        assert!(QuadTree::build(&[]).is_none());
        assert!(QuadTree::build(&[vector(f64::NAN, 0.0)]).is_none());
        assert!(QuadTree::build(&[vector(0.0, 0.0), vector(f64::INFINITY, 1.0)]).is_none());
    }
}
