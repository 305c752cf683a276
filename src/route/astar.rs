//! Turn-penalized A* between the two dongles.
//!
//! Costs are Manhattan distances; every direction change adds a penalty of
//! `bendMultiplier³` where `bendMultiplier` is the Manhattan distance between
//! the endpoints, so turns stay expensive at any problem scale. The open set
//! is a plain binary heap with lazy deletion; ties on `f` resolve by push
//! order, which together with the fixed neighbor order makes the search
//! fully deterministic.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::heading::{Heading, heading_between};
use crate::log::trace;
use crate::types::{Bounds, GlobalPoint};

use super::grid::Grid;

/// Open-set entry. Stale entries (re-pushed nodes improved later) are
/// recognized by the node's `closed` flag and skipped on pop.
#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    f: f64,
    seq: u64,
    index: usize,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &OpenEntry) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &OpenEntry) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &OpenEntry) -> Ordering {
        self.f.total_cmp(&other.f).then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Search the grid for the cheapest orthogonal path from `start` to `end`
/// (arena indices). Returns the node positions from start to end inclusive,
/// or `None` when the open set empties first.
pub(crate) fn find_path(
    grid: &mut Grid,
    start: usize,
    end: usize,
    start_heading: Heading,
    end_heading: Heading,
    obstacles: &[Bounds],
) -> Option<Vec<GlobalPoint>> {
    let end_pos = grid.nodes[end].pos;
    let bend_multiplier = grid.nodes[start].pos.manhattan(end_pos);

    let mut open = BinaryHeap::new();
    let mut seq = 0u64;
    grid.nodes[start].visited = true;
    open.push(Reverse(OpenEntry { f: 0.0, seq, index: start }));

    while let Some(Reverse(entry)) = open.pop() {
        let current = entry.index;
        if grid.nodes[current].closed {
            continue;
        }
        if current == end {
            return Some(trace_back(grid, end));
        }
        grid.nodes[current].closed = true;

        let current_pos = grid.nodes[current].pos;
        let current_g = grid.nodes[current].g;
        let came_from = match grid.nodes[current].parent {
            Some(p) => heading_between(grid.nodes[p].pos, current_pos),
            None => start_heading,
        };
        trace!("expand {} g={} via {:?}", current_pos, current_g, came_from);

        for step in Heading::ALL {
            // No immediate reversal.
            if step == came_from.flip() {
                continue;
            }
            let Some(ni) = grid.neighbor(current, step) else {
                continue;
            };
            if grid.nodes[ni].closed {
                continue;
            }
            // Re-entering a dongle along its consumed heading would cut
            // back through the attachment corridor.
            if ni == start && step == start_heading {
                continue;
            }
            if ni == end && step == end_heading {
                continue;
            }
            let neighbor_pos = grid.nodes[ni].pos;
            let mid = current_pos.midpoint(neighbor_pos);
            if obstacles.iter().any(|b| b.contains(mid)) {
                continue;
            }

            let turn = if step == came_from { 0.0 } else { bend_multiplier.powi(3) };
            let g = current_g + current_pos.manhattan(neighbor_pos) + turn;
            if !grid.nodes[ni].visited || g < grid.nodes[ni].g {
                let h = neighbor_pos.manhattan(end_pos)
                    + remaining_bends(neighbor_pos, end_pos, step, end_heading)
                        * bend_multiplier.powi(2);
                let node = &mut grid.nodes[ni];
                node.visited = true;
                node.parent = Some(current);
                node.g = g;
                node.h = h;
                node.f = g + h;
                seq += 1;
                open.push(Reverse(OpenEntry { f: node.f, seq, index: ni }));
            }
        }
    }
    None
}

/// Fewest turns an unobstructed elbow path still needs from `from` (moving
/// `travel`) to reach `to` arriving opposite the end heading, i.e. the
/// direction the final hop into the attachment will take. Feeds the
/// heuristic as a quadrant-and-headings lookup with values 0 through 4.
///
/// The table assumes that entry-aligned arrival. The search itself also
/// accepts a perpendicular final hop, so some cells overstate the
/// reachable minimum by up to four turns. An estimated turn weighs
/// `powi(2)` where a real turn costs `powi(3)`, and the multiplier is the
/// dongle distance, so the overstatement stays below one real turn once
/// the dongles sit more than four units apart. On equal-cost candidates
/// it steers the search toward entry-aligned arrivals.
fn remaining_bends(
    from: GlobalPoint,
    to: GlobalPoint,
    travel: Heading,
    end_heading: Heading,
) -> f64 {
    let delta = to - from;
    let entry = end_heading.flip();
    let along = delta.dot(travel.unit());
    if entry == travel {
        let lateral = if travel.is_horizontal() { delta.y } else { delta.x };
        if lateral == 0.0 {
            if along >= 0.0 { 0.0 } else { 4.0 }
        } else if along > 0.0 {
            2.0
        } else {
            4.0
        }
    } else if entry == travel.flip() {
        let lateral = if travel.is_horizontal() { delta.y } else { delta.x };
        if lateral != 0.0 { 2.0 } else { 4.0 }
    } else {
        let toward = delta.dot(entry.unit());
        if toward > 0.0 && along >= 0.0 { 1.0 } else { 3.0 }
    }
}

fn trace_back(grid: &Grid, end: usize) -> Vec<GlobalPoint> {
    let mut points = Vec::new();
    let mut cursor = Some(end);
    while let Some(i) = cursor {
        points.push(grid.nodes[i].pos);
        cursor = grid.nodes[i].parent;
    }
    points.reverse();
    points
}
