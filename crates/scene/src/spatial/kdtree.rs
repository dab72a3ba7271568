use foundation::math::Vec3;
use foundation::math::precision::stable_total_cmp_f64;

/// A deterministic k-d tree over 3D points.
///
/// Ordering contract:
/// - `within` returns item indices in ascending order, so callers can replay
///   a linear scan over just the candidates and get the same tie-breaks.
///
/// Leaves hold up to `LEAF_MAX` points; interior nodes split on the axis of
/// largest extent at the median.
#[derive(Debug, Clone, Default)]
pub struct KdTree {
    nodes: Vec<Node>,
    len: usize,
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        items: Vec<Item>,
    },
    Internal {
        axis: usize,
        split: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Item {
    pub index: u32,
    pub point: Vec3,
}

const LEAF_MAX: usize = 8;

impl KdTree {
    pub fn build(items: Vec<Item>) -> Self {
        let len = items.len();
        let mut nodes = Vec::new();
        let mut items = items;
        if !items.is_empty() {
            let _root = build_node(&mut nodes, &mut items);
        }
        Self { nodes, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Indices of all items within `radius` (inclusive) of `query`.
    pub fn within(&self, query: Vec3, radius: f64) -> Vec<u32> {
        if self.nodes.is_empty() || radius.is_nan() || radius < 0.0 {
            return Vec::new();
        }

        let r2 = radius * radius;
        let q = query.as_array();
        let mut hits: Vec<u32> = Vec::new();
        let mut stack: Vec<usize> = vec![0];

        while let Some(idx) = stack.pop() {
            match &self.nodes[idx] {
                Node::Leaf { items } => {
                    for item in items {
                        if (item.point - query).length_squared() <= r2 {
                            hits.push(item.index);
                        }
                    }
                }
                Node::Internal {
                    axis,
                    split,
                    left,
                    right,
                } => {
                    // Points equal to the split may sit on either side.
                    if q[*axis] - radius <= *split {
                        stack.push(*left);
                    }
                    if q[*axis] + radius >= *split {
                        stack.push(*right);
                    }
                }
            }
        }

        hits.sort_unstable();
        hits
    }
}

fn build_node(nodes: &mut Vec<Node>, items: &mut [Item]) -> usize {
    if items.len() <= LEAF_MAX {
        let idx = nodes.len();
        nodes.push(Node::Leaf {
            items: items.to_vec(),
        });
        return idx;
    }

    let axis = split_axis(items);
    items.sort_by(|a, b| {
        let ca = a.point.as_array()[axis];
        let cb = b.point.as_array()[axis];
        stable_total_cmp_f64(ca, cb).then_with(|| a.index.cmp(&b.index))
    });

    let mid = items.len() / 2;
    let split = items[mid].point.as_array()[axis];
    let (left_items, right_items) = items.split_at_mut(mid);

    let idx = nodes.len();
    // Placeholder; patched once the children exist.
    nodes.push(Node::Leaf { items: Vec::new() });

    let left = build_node(nodes, left_items);
    let right = build_node(nodes, right_items);

    nodes[idx] = Node::Internal {
        axis,
        split,
        left,
        right,
    };
    idx
}

fn split_axis(items: &[Item]) -> usize {
    let mut min = [f64::INFINITY; 3];
    let mut max = [f64::NEG_INFINITY; 3];
    for item in items {
        let p = item.point.as_array();
        for axis in 0..3 {
            min[axis] = min[axis].min(p[axis]);
            max[axis] = max[axis].max(p[axis]);
        }
    }
    let ex = max[0] - min[0];
    let ey = max[1] - min[1];
    let ez = max[2] - min[2];

    // Deterministic tie-break: prefer X, then Y, then Z.
    if ex >= ey && ex >= ez {
        0
    } else if ey >= ez {
        1
    } else {
        2
    }
}

#[cfg(test)]
mod tests {
    use super::{Item, KdTree};
    use foundation::math::Vec3;

    fn grid() -> Vec<Item> {
        let mut items = Vec::new();
        let mut index = 0;
        for x in 0..5 {
            for y in 0..5 {
                for z in 0..5 {
                    items.push(Item {
                        index,
                        point: Vec3::new(x as f64, y as f64, z as f64),
                    });
                    index += 1;
                }
            }
        }
        items
    }

    fn brute_force(items: &[Item], q: Vec3, r: f64) -> Vec<u32> {
        let mut out: Vec<u32> = items
            .iter()
            .filter(|i| (i.point - q).length_squared() <= r * r)
            .map(|i| i.index)
            .collect();
        out.sort_unstable();
        out
    }

    #[test]
    fn within_matches_brute_force() {
        let items = grid();
        let tree = KdTree::build(items.clone());
        assert_eq!(tree.len(), 125);

        for (q, r) in [
            (Vec3::new(2.0, 2.0, 2.0), 1.0),
            (Vec3::new(0.2, 4.1, 3.3), 1.5),
            (Vec3::new(-3.0, -3.0, -3.0), 2.0),
            (Vec3::new(2.5, 2.5, 2.5), 10.0),
        ] {
            assert_eq!(tree.within(q, r), brute_force(&items, q, r));
        }
    }

    #[test]
    fn results_are_in_index_order_regardless_of_input_order() {
        let mut items = grid();
        items.reverse();
        let tree = KdTree::build(items);
        let hits = tree.within(Vec3::new(1.0, 1.0, 1.0), 1.0);
        assert!(hits.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(hits.len(), 7);
    }

    #[test]
    fn empty_tree_and_bad_radius_return_nothing() {
        let tree = KdTree::build(Vec::new());
        assert!(tree.is_empty());
        assert!(tree.within(Vec3::ZERO, 1.0).is_empty());

        let tree = KdTree::build(grid());
        assert!(tree.within(Vec3::ZERO, f64::NAN).is_empty());
    }
}
