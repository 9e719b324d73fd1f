//! Conversation flow pattern
//!
//! A row of eight nodes bobbing around mid-height, each listening to its own
//! ten-bin band, joined left to right by curved links.

use super::PatternInput;
use crate::draw::{bezier_point, lerp, map_range, DrawList, DrawOp, Point};
use crate::palette;

const NODES: usize = 8;
const BAND_WIDTH: usize = 10;
/// Horizontal inset of the first and last node
const MARGIN: f32 = 100.0;
/// Horizontal pull of the Bezier control points
const CURVE_PULL: f32 = 50.0;
const CURVE_STEPS: usize = 10;
const BOB_SPEED: f32 = 0.02;
const COLOR_SPEED: f32 = 0.01;
const LINK_ALPHA: u8 = 150;
const NODE_ALPHA: u8 = 200;

struct Node {
    pos: Point,
    energy: f32,
}

fn layout(input: &PatternInput) -> Vec<Node> {
    let t = input.time();
    let mid = input.height / 2.0;
    (0..NODES)
        .map(|i| {
            let x = lerp(MARGIN, input.width - MARGIN, i as f32 / (NODES - 1) as f32);
            let energy = input.spectrum.band_mean(i * BAND_WIDTH, (i + 1) * BAND_WIDTH);
            let swing = map_range(energy, 0.0, 255.0, 10.0, 100.0);
            let y = mid + (t * BOB_SPEED + i as f32).sin() * swing;
            Node {
                pos: Point::new(x, y),
                energy,
            }
        })
        .collect()
}

/// Cubic curve leaving `from` and entering `to` horizontally
fn link_curve(from: Point, to: Point) -> Vec<Point> {
    (0..=CURVE_STEPS)
        .map(|k| {
            let t = k as f32 / CURVE_STEPS as f32;
            Point::new(
                bezier_point(from.x, from.x + CURVE_PULL, to.x - CURVE_PULL, to.x, t),
                bezier_point(from.y, from.y, to.y, to.y, t),
            )
        })
        .collect()
}

pub fn render(input: &PatternInput) -> DrawList {
    let nodes = layout(input);
    let stroke = map_range(input.level(), 0.0, 1.0, 0.5, 3.0);
    let blend = (input.time() * COLOR_SPEED).sin() * 0.5 + 0.5;
    let node_color = palette::ACCENT.with_alpha(NODE_ALPHA);
    let mut ops = Vec::with_capacity(NODES * 2);

    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            let color = palette::sunset(i)
                .lerp(palette::cyber(i), blend)
                .with_alpha(LINK_ALPHA);
            ops.push(DrawOp::Polyline {
                points: link_curve(nodes[i - 1].pos, node.pos),
                closed: false,
                width: stroke,
                color,
            });
        }

        ops.push(DrawOp::Circle {
            center: node.pos,
            diameter: map_range(node.energy, 0.0, 255.0, 5.0, 20.0),
            color: node_color,
        });
    }
    ops
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::SpectrumFrame;
    use crate::pattern::test_support::{assert_all_finite, input};

    fn circles(ops: &[DrawOp]) -> Vec<(Point, f32)> {
        ops.iter()
            .filter_map(|op| match op {
                DrawOp::Circle { center, diameter, .. } => Some((*center, *diameter)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn eight_nodes_seven_links() {
        let spectrum = SpectrumFrame::silent(512);
        let ops = render(&input(&spectrum, 0.0, 0));
        assert_eq!(ops.len(), NODES + NODES - 1);
        assert_all_finite(&ops);

        let nodes = circles(&ops);
        assert_eq!(nodes.len(), NODES);
        assert_eq!(nodes[0].0.x, 100.0);
        assert_eq!(nodes[NODES - 1].0.x, 1300.0);
        // silent nodes are the smallest size
        assert!(nodes.iter().all(|(_, d)| *d == 5.0));
    }

    #[test]
    fn node_size_follows_its_band() {
        let mut bins = vec![0u8; 512];
        for b in &mut bins[10..20] {
            *b = 255;
        }
        let spectrum = SpectrumFrame::from_bins(bins);
        let nodes = circles(&render(&input(&spectrum, 0.0, 0)));
        assert_eq!(nodes[0].1, 5.0);
        assert_eq!(nodes[1].1, 20.0);
        // frame 0: node 1 sits at mid + sin(1) * 100
        assert!((nodes[1].0.y - (450.0 + 1f32.sin() * 100.0)).abs() < 1e-3);
    }

    #[test]
    fn links_join_consecutive_nodes() {
        let spectrum = SpectrumFrame::silent(512);
        let ops = render(&input(&spectrum, 1.0, 17));
        let nodes = circles(&ops);
        let link = ops
            .iter()
            .find_map(|op| match op {
                DrawOp::Polyline { points, width, closed, .. } => Some((points, *width, *closed)),
                _ => None,
            })
            .unwrap();
        assert_eq!(link.0.len(), CURVE_STEPS + 1);
        assert_eq!(link.1, 3.0);
        assert!(!link.2);
        let first = link.0[0];
        let last = link.0[CURVE_STEPS];
        assert!((first.x - nodes[0].0.x).abs() < 1e-3 && (first.y - nodes[0].0.y).abs() < 1e-3);
        assert!((last.x - nodes[1].0.x).abs() < 1e-3 && (last.y - nodes[1].0.y).abs() < 1e-3);
    }

    #[test]
    fn empty_spectrum_and_tiny_canvas_stay_finite() {
        let spectrum = SpectrumFrame::default();
        let mut inp = input(&spectrum, 0.0, 0);
        inp.width = 0.0;
        inp.height = 0.0;
        assert_all_finite(&render(&inp));
    }
}
