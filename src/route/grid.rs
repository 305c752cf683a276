//! Sparse non-uniform search grid.
//!
//! Rows and columns are exactly the distinct coordinates that matter:
//! obstacle box edges, the union bounds, and each dongle's off-axis lane.
//! A node exists at every intersection, so the node count scales with the
//! number of boxes, not with canvas size.

use crate::heading::Heading;
use crate::types::{Bounds, GlobalPoint};

/// Transient search vertex; the whole arena is rebuilt per routing call.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GridNode {
    pub pos: GlobalPoint,
    pub addr: (usize, usize),
    pub f: f64,
    pub g: f64,
    pub h: f64,
    /// Arena index of the predecessor on the best known path.
    pub parent: Option<usize>,
    pub visited: bool,
    pub closed: bool,
}

impl GridNode {
    fn at(pos: GlobalPoint, addr: (usize, usize)) -> GridNode {
        GridNode {
            pos,
            addr,
            f: 0.0,
            g: 0.0,
            h: 0.0,
            parent: None,
            visited: false,
            closed: false,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Grid {
    cols: Vec<f64>,
    rows: Vec<f64>,
    pub(crate) nodes: Vec<GridNode>,
}

impl Grid {
    /// Collect rulers from every box edge, the union of all boxes, and the
    /// dongle lanes, then lay out one node per intersection (row-major).
    pub(crate) fn build(
        boxes: &[Bounds],
        start_dongle: GlobalPoint,
        start_heading: Heading,
        end_dongle: GlobalPoint,
        end_heading: Heading,
    ) -> Grid {
        let mut xs = Vec::with_capacity(boxes.len() * 2 + 3);
        let mut ys = Vec::with_capacity(boxes.len() * 2 + 3);
        for b in boxes {
            xs.push(norm(b.min.x));
            xs.push(norm(b.max.x));
            ys.push(norm(b.min.y));
            ys.push(norm(b.max.y));
        }
        if let Some((first, rest)) = boxes.split_first() {
            let union = rest.iter().fold(*first, |acc, b| acc.union(b));
            xs.push(norm(union.min.x));
            xs.push(norm(union.max.x));
            ys.push(norm(union.min.y));
            ys.push(norm(union.max.y));
        }
        // A dongle sits on a box edge along its heading; only its lane on
        // the perpendicular axis is new information.
        for (dongle, heading) in [(start_dongle, start_heading), (end_dongle, end_heading)] {
            if heading.is_horizontal() {
                ys.push(norm(dongle.y()));
            } else {
                xs.push(norm(dongle.x()));
            }
        }

        xs.sort_by(f64::total_cmp);
        xs.dedup_by(|a, b| a == b);
        ys.sort_by(f64::total_cmp);
        ys.dedup_by(|a, b| a == b);

        let mut nodes = Vec::with_capacity(xs.len() * ys.len());
        for (row, &y) in ys.iter().enumerate() {
            for (col, &x) in xs.iter().enumerate() {
                nodes.push(GridNode::at(GlobalPoint::new(x, y), (col, row)));
            }
        }
        Grid { cols: xs, rows: ys, nodes }
    }

    /// Arena index of the node at exactly `p`, if `p` lies on the rulers.
    pub(crate) fn node_at(&self, p: GlobalPoint) -> Option<usize> {
        let col = self.cols.binary_search_by(|c| c.total_cmp(&norm(p.x()))).ok()?;
        let row = self.rows.binary_search_by(|r| r.total_cmp(&norm(p.y()))).ok()?;
        Some(row * self.cols.len() + col)
    }

    /// Adjacent node in the given direction, or `None` at the border.
    pub(crate) fn neighbor(&self, index: usize, heading: Heading) -> Option<usize> {
        let cols = self.cols.len();
        let (col, row) = self.nodes[index].addr;
        match heading {
            Heading::Up => row.checked_sub(1).map(|r| r * cols + col),
            Heading::Down => (row + 1 < self.rows.len()).then(|| (row + 1) * cols + col),
            Heading::Left => col.checked_sub(1).map(|c| row * cols + c),
            Heading::Right => (col + 1 < cols).then(|| row * cols + col + 1),
        }
    }
}

/// Collapse negative zero so ruler lookups cannot miss on bit order.
#[inline]
fn norm(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}
