// File: crates/ticker-core/src/chart.rs
// Summary: Line chart adapter; renders one labeled series to a Skia CPU raster (image or PNG).

use std::time::Instant;

use skia_safe as skia;
use tracing::debug;

use crate::error::Result;
use crate::format::format_tick;
use crate::grid::{nice_ticks, skip_labels};
use crate::raster::Raster;
use crate::scale::{IndexScale, ValueScale};
use crate::series::Series;
use crate::style::StyleConfig;
use crate::text::{FontSpec, TextShaper};
use crate::types::{ChartSize, Insets, ThemeKind};

const LINE_WIDTH: f32 = 3.0;
const TENSION: f32 = 0.2;
const LEGEND_BOX_WIDTH: f32 = 40.0;
const TICK_PADDING: f32 = 8.0;
const MAX_Y_TICKS: usize = 8;

/// Axes, grid and optional legend.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisParams {
    pub font_size: f32,
    pub legend: bool,
    pub insets: Insets,
}

/// Line and fill only; the value range fills the plot height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SparklineParams {
    pub insets: Insets,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ChartMode {
    FullAxis(AxisParams),
    Sparkline(SparklineParams),
}

impl ChartMode {
    /// `line_only` always yields a sparkline. Otherwise axes are drawn with the
    /// size's font; the legend appears on large charts only.
    pub fn for_request(size: ChartSize, line_only: bool) -> Self {
        if line_only {
            ChartMode::Sparkline(SparklineParams { insets: Insets::new(0, 0, 4, 4) })
        } else {
            ChartMode::FullAxis(AxisParams {
                font_size: size.font_size(),
                legend: size == ChartSize::Large,
                insets: Insets::uniform(10),
            })
        }
    }
}

/// Caller-facing chart request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChartRequest {
    pub label: Option<String>,
    pub theme: ThemeKind,
    pub size: ChartSize,
    pub line_only: bool,
}

pub struct RenderOptions {
    pub width: i32,
    pub height: i32,
    pub mode: ChartMode,
    pub style: StyleConfig,
}

impl RenderOptions {
    pub fn for_request(request: &ChartRequest, style: StyleConfig) -> Self {
        let (width, height) = request.size.dimensions();
        Self { width, height, mode: ChartMode::for_request(request.size, request.line_only), style }
    }
}

/// One series plus its legend label.
pub struct LineChart<'a> {
    pub series: &'a Series,
    pub label: Option<&'a str>,
}

/// Render `series` per `request` and encode as PNG.
pub fn render_line_chart(
    series: &Series,
    style: &StyleConfig,
    request: &ChartRequest,
    shaper: &TextShaper,
) -> Result<Vec<u8>> {
    let chart = LineChart { series, label: request.label.as_deref() };
    chart.render_to_png_bytes(&RenderOptions::for_request(request, *style), shaper)
}

impl<'a> LineChart<'a> {
    pub fn new(series: &'a Series) -> Self {
        Self { series, label: None }
    }

    pub fn with_label(mut self, label: &'a str) -> Self {
        self.label = Some(label);
        self
    }

    /// Render to an in-memory image for compositing into another canvas.
    pub fn render_image(&self, opts: &RenderOptions, shaper: &TextShaper) -> Result<skia::Image> {
        Ok(self.rasterize(opts, shaper)?.snapshot())
    }

    /// Render and encode as PNG bytes.
    pub fn render_to_png_bytes(&self, opts: &RenderOptions, shaper: &TextShaper) -> Result<Vec<u8>> {
        self.rasterize(opts, shaper)?.into_png()
    }

    fn rasterize(&self, opts: &RenderOptions, shaper: &TextShaper) -> Result<Raster> {
        let started = Instant::now();
        let mut raster = Raster::new(opts.width, opts.height)?;
        let canvas = raster.canvas();
        canvas.clear(opts.style.background);

        match &opts.mode {
            ChartMode::FullAxis(params) => self.draw_full_axis(canvas, opts, params, shaper),
            ChartMode::Sparkline(params) => self.draw_sparkline(canvas, opts, params),
        }

        debug!(
            width = opts.width,
            height = opts.height,
            points = self.series.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "rendered line chart"
        );
        Ok(raster)
    }

    fn draw_sparkline(&self, canvas: &skia::Canvas, opts: &RenderOptions, params: &SparklineParams) {
        let plot = inset_rect(opts.width, opts.height, &params.insets, 0.0, 0.0);
        let series = self.series.downsample_lttb(max_points_for(plot));
        let Some((lo, hi)) = series.value_range() else { return };
        let ys = ValueScale::new_linear(plot.top, plot.bottom, lo, hi);
        draw_line_series(canvas, plot, &series, &ys, &opts.style);
    }

    fn draw_full_axis(&self, canvas: &skia::Canvas, opts: &RenderOptions, params: &AxisParams, shaper: &TextShaper) {
        let style = &opts.style;
        let font = FontSpec::regular(params.font_size);

        let (lo, hi) = self.series.value_range().unwrap_or((0.0, 1.0));
        let (ticks, nice_lo, nice_hi) = nice_ticks(lo, hi, MAX_Y_TICKS);
        let step = if ticks.len() > 1 { ticks[1] - ticks[0] } else { 1.0 };
        let tick_text: Vec<String> = ticks.iter().map(|&t| format_tick(t, step)).collect();
        let y_label_w = tick_text.iter().map(|t| shaper.measure_width(t, font)).fold(0.0f32, f32::max);

        let legend_h = match self.label {
            Some(_) if params.legend => params.font_size + 20.0,
            _ => 0.0,
        };
        let x_label_h = params.font_size + TICK_PADDING;
        let plot = inset_rect(opts.width, opts.height, &params.insets, y_label_w + TICK_PADDING, 0.0);
        let plot = skia::Rect::from_ltrb(plot.left, plot.top + legend_h, plot.right, plot.bottom - x_label_h);

        if let (Some(label), true) = (self.label, legend_h > 0.0) {
            draw_legend(canvas, opts.width as f32, params.insets.top as f32, legend_h, label, font, style, shaper);
        }

        let ys = ValueScale::new_linear(plot.top, plot.bottom, nice_lo, nice_hi);
        let mut grid = skia::Paint::default();
        grid.set_anti_alias(true);
        grid.set_style(skia::paint::Style::Stroke);
        grid.set_stroke_width(1.0);
        grid.set_color(style.grid);

        // Y ticks and horizontal grid
        for (t, text) in ticks.iter().zip(&tick_text) {
            let y = ys.to_px(*t);
            canvas.draw_line((plot.left, y), (plot.right, y), &grid);
            shaper.draw_right(canvas, text, plot.left - TICK_PADDING, y + params.font_size * 0.35, font, style.text);
        }

        // X labels and vertical grid, skipped to fit
        let series = self.series.downsample_lttb(max_points_for(plot));
        let xs = IndexScale::new(plot.left, plot.right, series.len());
        if let Some(longest) = series.labels().iter().max_by_key(|l| l.chars().count()) {
            let label_w = shaper.measure_width(longest, font) + 12.0;
            let max_labels = ((plot.width() / label_w.max(1.0)) as usize).max(1);
            for i in skip_labels(series.len(), max_labels) {
                let x = xs.to_px(i as f64);
                canvas.draw_line((x, plot.top), (x, plot.bottom), &grid);
                shaper.draw_centered(
                    canvas,
                    &series.labels()[i],
                    x,
                    plot.bottom + params.font_size + TICK_PADDING * 0.5,
                    font,
                    style.text,
                );
            }
        }

        // Axis borders
        let mut border = grid.clone();
        border.set_color(style.text);
        canvas.draw_line((plot.left, plot.bottom), (plot.right, plot.bottom), &border);
        canvas.draw_line((plot.left, plot.top), (plot.left, plot.bottom), &border);

        draw_line_series(canvas, plot, &series, &ys, style);
    }
}

// ---- helpers ----------------------------------------------------------------

fn inset_rect(width: i32, height: i32, insets: &Insets, extra_left: f32, extra_top: f32) -> skia::Rect {
    skia::Rect::from_ltrb(
        insets.left as f32 + extra_left,
        insets.top as f32 + extra_top,
        (width - insets.right as i32) as f32,
        (height - insets.bottom as i32) as f32,
    )
}

/// Two points per horizontal pixel is as much detail as the stroke can show.
fn max_points_for(plot: skia::Rect) -> usize {
    (plot.width().max(1.0) as usize) * 2
}

#[allow(clippy::too_many_arguments)]
fn draw_legend(
    canvas: &skia::Canvas,
    width: f32,
    top: f32,
    height: f32,
    label: &str,
    font: FontSpec,
    style: &StyleConfig,
    shaper: &TextShaper,
) {
    let text_w = shaper.measure_width(label, font);
    let box_h = font.size * 0.8;
    let total = LEGEND_BOX_WIDTH + 10.0 + text_w;
    let x0 = (width - total) / 2.0;
    let box_top = top + (height - box_h) / 2.0;
    let legend_box = skia::Rect::from_xywh(x0, box_top, LEGEND_BOX_WIDTH, box_h);

    let mut paint = skia::Paint::default();
    paint.set_anti_alias(true);
    if let Some(fill) = &style.fill {
        fill.apply(&mut paint, legend_box);
        canvas.draw_rect(legend_box, &paint);
    }
    let mut stroke = skia::Paint::default();
    stroke.set_anti_alias(true);
    stroke.set_style(skia::paint::Style::Stroke);
    stroke.set_stroke_width(LINE_WIDTH);
    stroke.set_color(style.border);
    canvas.draw_rect(legend_box, &stroke);

    shaper.draw_left(canvas, label, x0 + LEGEND_BOX_WIDTH + 10.0, box_top + box_h, font, style.text);
}

fn draw_line_series(canvas: &skia::Canvas, plot: skia::Rect, series: &Series, ys: &ValueScale, style: &StyleConfig) {
    if series.len() < 2 {
        return;
    }
    let xs = IndexScale::new(plot.left, plot.right, series.len());
    let points: Vec<(f32, f32)> = series
        .values()
        .iter()
        .enumerate()
        .map(|(i, &v)| (xs.to_px(i as f64), ys.to_px(v)))
        .collect();
    let line = smooth_path(&points, TENSION, plot.top, plot.bottom);

    let saved = canvas.save();
    canvas.clip_rect(plot.with_outset((LINE_WIDTH, LINE_WIDTH)), skia::ClipOp::Intersect, true);

    if let Some(fill) = &style.fill {
        let mut area = line.clone();
        if let (Some(&(first_x, _)), Some(&(last_x, _))) = (points.first(), points.last()) {
            area.line_to((last_x, plot.bottom));
            area.line_to((first_x, plot.bottom));
            area.close();
        }
        let mut paint = skia::Paint::default();
        paint.set_anti_alias(true);
        paint.set_style(skia::paint::Style::Fill);
        fill.apply(&mut paint, plot);
        canvas.draw_path(&area, &paint);
    }

    let mut stroke = skia::Paint::default();
    stroke.set_anti_alias(true);
    stroke.set_style(skia::paint::Style::Stroke);
    stroke.set_stroke_width(LINE_WIDTH);
    stroke.set_stroke_join(skia::paint::Join::Round);
    stroke.set_stroke_cap(skia::paint::Cap::Round);
    stroke.set_color(style.border);
    canvas.draw_path(&line, &stroke);

    canvas.restore_to_count(saved);
}

/// Cubic path through `points` with control points placed along the
/// neighbour chord, scaled by `tension`. Control points are kept inside
/// `[top, bottom]` so the curve never overshoots the plot.
pub fn smooth_path(points: &[(f32, f32)], tension: f32, top: f32, bottom: f32) -> skia::Path {
    let mut path = skia::Path::new();
    let Some(&first) = points.first() else { return path };
    path.move_to(first);
    if tension <= 0.0 || points.len() < 3 {
        for &p in &points[1..] {
            path.line_to(p);
        }
        return path;
    }

    let n = points.len();
    // (previous-side control, next-side control) for each point
    let mut controls = Vec::with_capacity(n);
    for i in 0..n {
        let cur = points[i];
        let prev = if i == 0 { cur } else { points[i - 1] };
        let next = if i + 1 == n { cur } else { points[i + 1] };
        let d01 = ((cur.0 - prev.0).powi(2) + (cur.1 - prev.1).powi(2)).sqrt();
        let d12 = ((next.0 - cur.0).powi(2) + (next.1 - cur.1).powi(2)).sqrt();
        let total = d01 + d12;
        let (s01, s12) = if total > 0.0 { (d01 / total, d12 / total) } else { (0.0, 0.0) };
        let (fa, fb) = (tension * s01, tension * s12);
        let dx = next.0 - prev.0;
        let dy = next.1 - prev.1;
        let clamp_y = |y: f32| y.clamp(top, bottom);
        controls.push((
            (cur.0 - fa * dx, clamp_y(cur.1 - fa * dy)),
            (cur.0 + fb * dx, clamp_y(cur.1 + fb * dy)),
        ));
    }
    for i in 1..n {
        path.cubic_to(controls[i - 1].1, controls[i].0, points[i]);
    }
    path
}
