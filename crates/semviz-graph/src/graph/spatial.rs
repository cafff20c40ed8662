//! R-tree hit testing for treemap tiles and tree nodes
//!
//! Treemap tiles nest, so a point may fall inside several entries; the entry
//! with the greatest `layer` (deepest tile) wins. Tree nodes are small circles
//! hit within a pixel threshold.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::model::NodeId;

#[derive(Debug, Clone)]
pub struct SpatialNode {
    pub id: NodeId,
    bounds: AABB<[f32; 2]>,
    pub center: [f32; 2],
    /// Hit radius for circular entries; 0 for rectangles
    pub radius: f32,
    /// Nesting depth, higher wins when entries overlap
    pub layer: usize,
}

impl SpatialNode {
    /// Circular entry (tree node)
    pub fn circle(id: NodeId, center: [f32; 2], radius: f32) -> Self {
        Self {
            id,
            bounds: AABB::from_corners(
                [center[0] - radius, center[1] - radius],
                [center[0] + radius, center[1] + radius],
            ),
            center,
            radius,
            layer: 0,
        }
    }

    /// Rectangular entry (treemap tile)
    pub fn rect(id: NodeId, min: [f32; 2], max: [f32; 2], layer: usize) -> Self {
        Self {
            id,
            bounds: AABB::from_corners(min, max),
            center: [(min[0] + max[0]) / 2.0, (min[1] + max[1]) / 2.0],
            radius: 0.0,
            layer,
        }
    }

    fn is_rect(&self) -> bool {
        self.radius == 0.0
    }

    /// Distance from `point` to the entry's edge (0 when inside)
    fn edge_distance(&self, point: [f32; 2]) -> f32 {
        if self.is_rect() {
            let lower = self.bounds.lower();
            let upper = self.bounds.upper();
            let dx = (lower[0] - point[0]).max(point[0] - upper[0]).max(0.0);
            let dy = (lower[1] - point[1]).max(point[1] - upper[1]).max(0.0);
            (dx * dx + dy * dy).sqrt()
        } else {
            let dx = point[0] - self.center[0];
            let dy = point[1] - self.center[1];
            ((dx * dx + dy * dy).sqrt() - self.radius).max(0.0)
        }
    }
}

impl RTreeObject for SpatialNode {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.bounds
    }
}

impl PointDistance for SpatialNode {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let d = self.edge_distance(*point);
        d * d
    }

    fn contains_point(&self, point: &[f32; 2]) -> bool {
        self.edge_distance(*point) == 0.0
    }
}

#[derive(Clone, Default)]
pub struct SpatialIndex {
    tree: RTree<SpatialNode>,
}

impl std::fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("len", &self.tree.size())
            .finish_non_exhaustive()
    }
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_nodes(nodes: impl IntoIterator<Item = SpatialNode>) -> Self {
        Self {
            tree: RTree::bulk_load(nodes.into_iter().collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Deepest entry containing `point`
    pub fn topmost_at(&self, point: [f32; 2]) -> Option<&SpatialNode> {
        self.tree
            .locate_all_at_point(&point)
            .max_by_key(|node| node.layer)
    }

    /// Closest entry whose edge is within `threshold` of `point`
    pub fn hit_test(&self, point: [f32; 2], threshold: f32) -> Option<&SpatialNode> {
        let search = AABB::from_corners(
            [point[0] - threshold, point[1] - threshold],
            [point[0] + threshold, point[1] + threshold],
        );
        self.tree
            .locate_in_envelope_intersecting(&search)
            .map(|node| (node, node.edge_distance(point)))
            .filter(|(_, d)| *d <= threshold)
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(node, _)| node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_index() {
        let index = SpatialIndex::new();
        assert!(index.is_empty());
        assert!(index.topmost_at([0.0, 0.0]).is_none());
        assert!(index.hit_test([0.0, 0.0], 10.0).is_none());
    }

    #[test]
    fn test_topmost_prefers_deepest_tile() {
        let index = SpatialIndex::from_nodes(vec![
            SpatialNode::rect(NodeId(1), [0.0, 0.0], [100.0, 100.0], 1),
            SpatialNode::rect(NodeId(2), [10.0, 20.0], [50.0, 60.0], 2),
            SpatialNode::rect(NodeId(3), [60.0, 20.0], [90.0, 60.0], 2),
        ]);
        assert_eq!(index.topmost_at([30.0, 30.0]).map(|n| n.id), Some(NodeId(2)));
        assert_eq!(index.topmost_at([5.0, 5.0]).map(|n| n.id), Some(NodeId(1)));
        assert_eq!(index.topmost_at([70.0, 50.0]).map(|n| n.id), Some(NodeId(3)));
        assert!(index.topmost_at([150.0, 5.0]).is_none());
    }

    #[test]
    fn test_circle_hit_within_threshold() {
        let index = SpatialIndex::from_nodes(vec![
            SpatialNode::circle(NodeId(0), [0.0, 0.0], 5.0),
            SpatialNode::circle(NodeId(1), [40.0, 0.0], 5.0),
        ]);
        assert_eq!(index.hit_test([37.0, 0.0], 4.0).map(|n| n.id), Some(NodeId(1)));
        assert_eq!(index.hit_test([8.0, 0.0], 4.0).map(|n| n.id), Some(NodeId(0)));
        assert!(index.hit_test([20.0, 0.0], 4.0).is_none());
    }

    #[test]
    fn test_many_rows() {
        let nodes = (0..500).map(|i| SpatialNode::circle(NodeId(i), [0.0, i as f32 * 20.0], 4.0));
        let index = SpatialIndex::from_nodes(nodes);
        assert_eq!(index.len(), 500);
        assert_eq!(
            index.hit_test([1.0, 2001.0], 6.0).map(|n| n.id),
            Some(NodeId(100))
        );
    }
}
