#![allow(clippy::float_cmp)]

use super::*;
use crate::viewport::Rect;

// =============================================================
// Recording surface
// =============================================================

#[derive(Debug, Clone, PartialEq)]
enum Op {
    Clear(f64, f64),
    Save,
    Restore,
    StrokeStyle(String),
    FillStyle(String),
    LineWidth(f64),
    LineCap(String),
    LineJoin(String),
    LineDash(Vec<f64>),
    Font(String),
    TextAlign(String),
    TextBaseline(String),
    BeginPath,
    MoveTo(f64, f64),
    LineTo(f64, f64),
    Arc { x: f64, y: f64, radius: f64, start: f64, end: f64, anticlockwise: bool },
    Stroke,
    Fill,
    FillRect(f64, f64, f64, f64),
    FillText(String, f64, f64),
}

#[derive(Default)]
struct Recorder {
    ops: Vec<Op>,
    fail_arc: bool,
}

impl Surface for Recorder {
    fn clear(&mut self, width: f64, height: f64) {
        self.ops.push(Op::Clear(width, height));
    }
    fn save(&mut self) {
        self.ops.push(Op::Save);
    }
    fn restore(&mut self) {
        self.ops.push(Op::Restore);
    }
    fn set_stroke_style(&mut self, color: &str) {
        self.ops.push(Op::StrokeStyle(color.to_owned()));
    }
    fn set_fill_style(&mut self, color: &str) {
        self.ops.push(Op::FillStyle(color.to_owned()));
    }
    fn set_line_width(&mut self, width: f64) {
        self.ops.push(Op::LineWidth(width));
    }
    fn set_line_cap(&mut self, cap: &str) {
        self.ops.push(Op::LineCap(cap.to_owned()));
    }
    fn set_line_join(&mut self, join: &str) {
        self.ops.push(Op::LineJoin(join.to_owned()));
    }
    fn set_line_dash(&mut self, segments: &[f64]) -> Result<(), SurfaceError> {
        self.ops.push(Op::LineDash(segments.to_vec()));
        Ok(())
    }
    fn set_font(&mut self, font: &str) {
        self.ops.push(Op::Font(font.to_owned()));
    }
    fn set_text_align(&mut self, align: &str) {
        self.ops.push(Op::TextAlign(align.to_owned()));
    }
    fn set_text_baseline(&mut self, baseline: &str) {
        self.ops.push(Op::TextBaseline(baseline.to_owned()));
    }
    fn begin_path(&mut self) {
        self.ops.push(Op::BeginPath);
    }
    fn move_to(&mut self, x: f64, y: f64) {
        self.ops.push(Op::MoveTo(x, y));
    }
    fn line_to(&mut self, x: f64, y: f64) {
        self.ops.push(Op::LineTo(x, y));
    }
    fn arc(
        &mut self,
        x: f64,
        y: f64,
        radius: f64,
        start: f64,
        end: f64,
        anticlockwise: bool,
    ) -> Result<(), SurfaceError> {
        if self.fail_arc {
            return Err(SurfaceError::Canvas("arc rejected".to_owned()));
        }
        self.ops.push(Op::Arc { x, y, radius, start, end, anticlockwise });
        Ok(())
    }
    fn stroke(&mut self) {
        self.ops.push(Op::Stroke);
    }
    fn fill(&mut self) {
        self.ops.push(Op::Fill);
    }
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ops.push(Op::FillRect(x, y, width, height));
    }
    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), SurfaceError> {
        self.ops.push(Op::FillText(text.to_owned(), x, y));
        Ok(())
    }
}

// =============================================================
// Helpers
// =============================================================

const SIZE: f64 = 200.0;
const FONT: &str = "14px sans-serif";

fn viewport() -> Viewport {
    Viewport::fitted(Rect::new(0.0, 0.0, SIZE, SIZE))
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

/// Build a stroke from surface-pixel coordinates on the test viewport.
fn make_stroke(tool: ToolKind, px: &[(f64, f64)]) -> Stroke {
    Stroke {
        tool,
        points: px.iter().map(|&(x, y)| Point::new(x / SIZE, y / SIZE)).collect(),
        color: "#ff0000".to_owned(),
        width: 2.0,
        timestamp: 0.0,
    }
}

fn record(strokes: &[Stroke], preview: &Preview<'_>) -> Vec<Op> {
    let mut rec = Recorder::default();
    draw(&mut rec, strokes, &viewport(), preview, FONT).unwrap();
    rec.ops
}

fn texts(ops: &[Op]) -> Vec<(String, f64, f64)> {
    ops.iter()
        .filter_map(|op| match op {
            Op::FillText(t, x, y) => Some((t.clone(), *x, *y)),
            _ => None,
        })
        .collect()
}

fn arcs(ops: &[Op]) -> Vec<Op> {
    ops.iter().filter(|op| matches!(op, Op::Arc { .. })).cloned().collect()
}

fn line_tos(ops: &[Op]) -> Vec<(f64, f64)> {
    ops.iter()
        .filter_map(|op| match op {
            Op::LineTo(x, y) => Some((*x, *y)),
            _ => None,
        })
        .collect()
}

fn has_nan(ops: &[Op]) -> bool {
    ops.iter().any(|op| match op {
        Op::MoveTo(x, y) | Op::LineTo(x, y) | Op::FillText(_, x, y) => x.is_nan() || y.is_nan(),
        Op::Arc { x, y, radius, start, end, .. } => [x, y, radius, start, end].iter().any(|v| v.is_nan()),
        Op::FillRect(x, y, w, h) => [x, y, w, h].iter().any(|v| v.is_nan()),
        _ => false,
    })
}

// =============================================================
// Frame setup
// =============================================================

#[test]
fn draw_clears_full_surface_first() {
    let ops = record(&[], &Preview::None);
    assert_eq!(ops, vec![Op::Clear(SIZE, SIZE)]);
}

#[test]
fn draw_is_idempotent() {
    let strokes = vec![
        make_stroke(ToolKind::Pen, &[(10.0, 10.0), (20.0, 10.0), (20.0, 20.0)]),
        make_stroke(ToolKind::Arrow, &[(0.0, 0.0), (100.0, 40.0)]),
        make_stroke(ToolKind::Circle, &[(50.0, 50.0), (60.0, 50.0)]),
        make_stroke(ToolKind::Angle, &[(0.0, 0.0), (50.0, 0.0), (50.0, 50.0)]),
        make_stroke(ToolKind::RightAngle, &[(20.0, 100.0), (80.0, 100.0)]),
    ];
    assert_eq!(record(&strokes, &Preview::None), record(&strokes, &Preview::None));
}

#[test]
fn strokes_draw_in_collection_order() {
    let strokes = vec![
        make_stroke(ToolKind::Pen, &[(10.0, 10.0), (20.0, 10.0)]),
        make_stroke(ToolKind::Circle, &[(50.0, 50.0), (60.0, 50.0)]),
    ];
    let ops = record(&strokes, &Preview::None);
    let first_line = ops.iter().position(|op| matches!(op, Op::LineTo(..))).unwrap();
    let first_arc = ops.iter().position(|op| matches!(op, Op::Arc { .. })).unwrap();
    assert!(first_line < first_arc);
}

#[test]
fn each_stroke_is_wrapped_in_save_restore() {
    let strokes = vec![
        make_stroke(ToolKind::Pen, &[(10.0, 10.0), (20.0, 10.0)]),
        make_stroke(ToolKind::Arrow, &[(10.0, 10.0), (20.0, 10.0)]),
    ];
    let ops = record(&strokes, &Preview::None);
    let saves = ops.iter().filter(|op| **op == Op::Save).count();
    let restores = ops.iter().filter(|op| **op == Op::Restore).count();
    assert_eq!(saves, 2);
    assert_eq!(restores, 2);
}

// =============================================================
// Pen / highlight
// =============================================================

#[test]
fn pen_draws_round_polyline_in_stroke_style() {
    let ops = record(&[make_stroke(ToolKind::Pen, &[(10.0, 10.0), (20.0, 10.0), (20.0, 20.0)])], &Preview::None);
    assert!(ops.contains(&Op::StrokeStyle("#ff0000".to_owned())));
    assert!(ops.contains(&Op::LineWidth(2.0)));
    assert!(ops.contains(&Op::LineCap("round".to_owned())));
    assert!(ops.contains(&Op::LineJoin("round".to_owned())));

    let start = ops.iter().position(|op| matches!(op, Op::MoveTo(..))).unwrap();
    let Op::MoveTo(x, y) = ops[start] else { unreachable!() };
    assert!(approx(x, 10.0) && approx(y, 10.0));
    let lines = line_tos(&ops);
    assert_eq!(lines.len(), 2);
    assert!(approx(lines[1].0, 20.0) && approx(lines[1].1, 20.0));
    assert_eq!(ops[ops.len() - 2], Op::Stroke);
}

#[test]
fn single_point_pen_draws_a_dot() {
    let ops = record(&[make_stroke(ToolKind::Pen, &[(30.0, 40.0)])], &Preview::None);
    let lines = line_tos(&ops);
    assert_eq!(lines.len(), 1);
    assert!(approx(lines[0].0, 30.0) && approx(lines[0].1, 40.0));
}

#[test]
fn highlight_differs_from_pen_only_by_color() {
    let pen = make_stroke(ToolKind::Pen, &[(10.0, 10.0), (30.0, 30.0)]);
    let mut highlight = pen.clone();
    highlight.tool = ToolKind::Highlight;
    highlight.color = "rgba(255, 255, 0, 0.4)".to_owned();

    let pen_ops = record(&[pen], &Preview::None);
    let hl_ops = record(&[highlight], &Preview::None);
    assert_eq!(pen_ops.len(), hl_ops.len());
    for (a, b) in pen_ops.iter().zip(&hl_ops) {
        match (a, b) {
            (Op::StrokeStyle(_), Op::StrokeStyle(c)) | (Op::FillStyle(_), Op::FillStyle(c)) => {
                assert_eq!(c, "rgba(255, 255, 0, 0.4)");
            }
            _ => assert_eq!(a, b),
        }
    }
}

// =============================================================
// Arrow / circle
// =============================================================

#[test]
fn arrow_draws_line_and_two_head_segments() {
    // Intermediate samples are ignored: the arrow runs first -> last.
    let ops = record(&[make_stroke(ToolKind::Arrow, &[(0.0, 100.0), (50.0, 0.0), (100.0, 100.0)])], &Preview::None);
    let lines = line_tos(&ops);
    assert_eq!(lines.len(), 3);
    assert!(approx(lines[0].0, 100.0) && approx(lines[0].1, 100.0));

    let back = 15.0 * (std::f64::consts::PI / 6.0).cos();
    let side = 15.0 * (std::f64::consts::PI / 6.0).sin();
    let mut heads = vec![lines[1], lines[2]];
    heads.sort_by(|a, b| a.1.total_cmp(&b.1));
    assert!(approx(heads[0].0, 100.0 - back) && approx(heads[0].1, 100.0 - side));
    assert!(approx(heads[1].0, 100.0 - back) && approx(heads[1].1, 100.0 + side));
}

#[test]
fn circle_centered_on_first_point_through_last() {
    let ops = record(&[make_stroke(ToolKind::Circle, &[(50.0, 50.0), (70.0, 60.0), (80.0, 90.0)])], &Preview::None);
    let arcs = arcs(&ops);
    assert_eq!(arcs.len(), 1);
    let Op::Arc { x, y, radius, start, end, anticlockwise } = arcs[0] else { unreachable!() };
    assert!(approx(x, 50.0) && approx(y, 50.0));
    assert!(approx(radius, 50.0));
    assert_eq!(start, 0.0);
    assert!(approx(end, TAU));
    assert!(!anticlockwise);
}

// =============================================================
// Angle
// =============================================================

#[test]
fn collinear_angle_labels_180() {
    let ops = record(&[make_stroke(ToolKind::Angle, &[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)])], &Preview::None);
    let labels = texts(&ops);
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].0, "180.0°");
}

#[test]
fn right_angle_through_three_points_labels_90() {
    let ops = record(&[make_stroke(ToolKind::Angle, &[(100.0, 150.0), (100.0, 100.0), (150.0, 100.0)])], &Preview::None);
    assert_eq!(texts(&ops)[0].0, "90.0°");
}

#[test]
fn angle_draws_both_arms_and_vertex_arc() {
    let ops = record(&[make_stroke(ToolKind::Angle, &[(150.0, 100.0), (100.0, 100.0), (100.0, 150.0)])], &Preview::None);
    let lines = line_tos(&ops);
    assert!(approx(lines[0].0, 100.0) && approx(lines[0].1, 100.0));
    assert!(approx(lines[1].0, 100.0) && approx(lines[1].1, 150.0));

    let arcs = arcs(&ops);
    assert_eq!(arcs.len(), 1);
    let Op::Arc { x, y, radius, start, end, anticlockwise } = arcs[0] else { unreachable!() };
    assert!(approx(x, 100.0) && approx(y, 100.0));
    assert_eq!(radius, 30.0);
    assert!(approx(start, 0.0));
    assert!(approx(end, std::f64::consts::FRAC_PI_2));
    assert!(!anticlockwise);
}

#[test]
fn angle_arc_takes_short_way_round_when_reversed() {
    let ops = record(&[make_stroke(ToolKind::Angle, &[(100.0, 150.0), (100.0, 100.0), (150.0, 100.0)])], &Preview::None);
    let Op::Arc { start, end, anticlockwise, .. } = arcs(&ops)[0] else { unreachable!() };
    assert!(approx(start, std::f64::consts::FRAC_PI_2));
    assert!(approx(end, 0.0));
    assert!(anticlockwise);
}

#[test]
fn angle_label_sits_on_bisector_past_arc() {
    let ops = record(&[make_stroke(ToolKind::Angle, &[(150.0, 100.0), (100.0, 100.0), (100.0, 150.0)])], &Preview::None);
    let (_, x, y) = texts(&ops)[0].clone();
    let d = 50.0 * std::f64::consts::FRAC_1_SQRT_2;
    assert!(approx(x, 100.0 + d), "x = {x}");
    assert!(approx(y, 100.0 + d), "y = {y}");
}

#[test]
fn angle_label_uses_stroke_color_and_font() {
    let ops = record(&[make_stroke(ToolKind::Angle, &[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)])], &Preview::None);
    let text_at = ops.iter().position(|op| matches!(op, Op::FillText(..))).unwrap();
    assert!(ops[..text_at].contains(&Op::Font(FONT.to_owned())));
    assert!(ops[..text_at].contains(&Op::FillStyle("#ff0000".to_owned())));
}

#[test]
fn degenerate_angle_skips_arc_and_label_without_nan() {
    let ops = record(&[make_stroke(ToolKind::Angle, &[(40.0, 40.0), (40.0, 40.0), (90.0, 60.0)])], &Preview::None);
    assert!(arcs(&ops).is_empty());
    assert!(texts(&ops).is_empty());
    assert!(!has_nan(&ops));
}

#[test]
fn partial_angle_draws_only_its_segments() {
    let ops = record(&[make_stroke(ToolKind::Angle, &[(10.0, 10.0), (60.0, 10.0)])], &Preview::None);
    assert_eq!(line_tos(&ops).len(), 1);
    assert!(arcs(&ops).is_empty());
    assert!(texts(&ops).is_empty());
}

// =============================================================
// Right angle
// =============================================================

#[test]
fn right_angle_draws_arm_square_and_label() {
    let ops = record(&[make_stroke(ToolKind::RightAngle, &[(50.0, 100.0), (100.0, 100.0)])], &Preview::None);

    let lines = line_tos(&ops);
    assert_eq!(lines.len(), 2);
    assert!(approx(lines[0].0, 100.0) && approx(lines[0].1, 100.0));
    assert!(approx(lines[1].0, 100.0) && approx(lines[1].1, 130.0));

    let square = ops.iter().find_map(|op| match op {
        Op::FillRect(x, y, w, h) => Some((*x, *y, *w, *h)),
        _ => None,
    });
    let (x, y, w, h) = square.unwrap();
    assert!(approx(x, 96.0) && approx(y, 96.0));
    assert_eq!((w, h), (8.0, 8.0));

    let labels = texts(&ops);
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].0, "90°");
    assert!(approx(labels[0].1, 100.0) && approx(labels[0].2, 145.0));
}

#[test]
fn degenerate_right_angle_draws_nothing_extra() {
    let ops = record(&[make_stroke(ToolKind::RightAngle, &[(70.0, 70.0), (70.0, 70.0)])], &Preview::None);
    assert!(texts(&ops).is_empty());
    assert!(!ops.iter().any(|op| matches!(op, Op::FillRect(..))));
    assert!(!has_nan(&ops));
}

// =============================================================
// Preview
// =============================================================

#[test]
fn stroke_preview_draws_after_committed_strokes() {
    let committed = vec![make_stroke(ToolKind::Circle, &[(50.0, 50.0), (60.0, 50.0)])];
    let live = make_stroke(ToolKind::Pen, &[(1.0, 1.0), (2.0, 2.0)]);
    let ops = record(&committed, &Preview::Stroke(&live));
    let arc_at = ops.iter().position(|op| matches!(op, Op::Arc { .. })).unwrap();
    let line_at = ops.iter().position(|op| matches!(op, Op::LineTo(..))).unwrap();
    assert!(arc_at < line_at);
}

#[test]
fn angle_preview_is_dashed_to_cursor_then_reset() {
    let placed = [Point::new(0.25, 0.25), Point::new(0.5, 0.25)];
    let preview = Preview::Angle { points: &placed, cursor: Some(Point::new(0.5, 0.5)), color: "#00f", width: 3.0 };
    let ops = record(&[], &preview);

    let dash_on = ops.iter().position(|op| *op == Op::LineDash(vec![6.0, 6.0])).unwrap();
    let dash_off = ops.iter().position(|op| *op == Op::LineDash(vec![])).unwrap();
    assert!(dash_on < dash_off);

    let lines = line_tos(&ops[dash_on..dash_off]);
    assert_eq!(lines.len(), 2);
    assert!(approx(lines[0].0, 100.0) && approx(lines[0].1, 50.0));
    assert!(approx(lines[1].0, 100.0) && approx(lines[1].1, 100.0));

    // One marker per placed point, after the dashed path.
    assert_eq!(arcs(&ops[dash_off..]).len(), 2);
    assert!(ops.contains(&Op::StrokeStyle("#00f".to_owned())));
}

#[test]
fn angle_preview_without_cursor_still_marks_points() {
    let placed = [Point::new(0.1, 0.1)];
    let preview = Preview::Angle { points: &placed, cursor: None, color: "#00f", width: 3.0 };
    let ops = record(&[], &preview);
    assert!(line_tos(&ops).is_empty());
    assert_eq!(arcs(&ops).len(), 1);
}

#[test]
fn empty_angle_preview_draws_nothing() {
    let preview = Preview::Angle { points: &[], cursor: Some(Point::new(0.5, 0.5)), color: "#00f", width: 3.0 };
    assert_eq!(record(&[], &preview), vec![Op::Clear(SIZE, SIZE)]);
}

// =============================================================
// Errors
// =============================================================

#[test]
fn surface_error_propagates_and_state_is_restored() {
    let mut rec = Recorder { fail_arc: true, ..Recorder::default() };
    let strokes = vec![make_stroke(ToolKind::Circle, &[(50.0, 50.0), (60.0, 50.0)])];
    let err = draw(&mut rec, &strokes, &viewport(), &Preview::None, FONT).unwrap_err();
    assert_eq!(err, SurfaceError::Canvas("arc rejected".to_owned()));
    assert_eq!(rec.ops.last(), Some(&Op::Restore));
}

// =============================================================
// Helpers
// =============================================================

#[test]
fn format_angle_one_decimal_with_degree_sign() {
    assert_eq!(format_angle(90.0), "90.0°");
    assert_eq!(format_angle(33.333), "33.3°");
    assert_eq!(format_angle(180.0), "180.0°");
}

#[test]
fn signed_sweep_is_shortest_direction() {
    use std::f64::consts::FRAC_PI_2;
    assert!(approx(signed_sweep(0.0, FRAC_PI_2), FRAC_PI_2));
    assert!(approx(signed_sweep(0.0, -FRAC_PI_2), -FRAC_PI_2));
    assert!(approx(signed_sweep(PI - 0.1, -PI + 0.1), 0.2));
    assert!(approx(signed_sweep(PI, 0.0), PI));
}
