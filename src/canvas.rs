//! Braille raster for draw ops
//!
//! Keeps an RGB pixel grid at 2x4 dots per terminal cell and blends every
//! draw op into it, so trails fade out across frames. Logical canvas units
//! are multiplied by `scale` to get dots.

use crate::draw::{DrawOp, Point};
use crate::palette::{self, luma, Rgba};
use crate::terminal::Terminal;

// Braille constants (2x4 dot grid per character)
const BRAILLE_BASE: u32 = 0x2800;
const DOTS_X: usize = 2;
const DOTS_Y: usize = 4;

/// Luma above background needed for a dot to be lit
const LIT_THRESHOLD: f32 = 10.0;

/// Pixel grid with float channels; fades never stall on rounding
pub struct Canvas {
    width: usize,
    height: usize,
    scale: f32,
    pixels: Vec<[f32; 3]>,
    // Per-op stamp so a pixel is blended at most once per primitive
    stamp: Vec<u32>,
    generation: u32,
}

impl Canvas {
    /// Canvas covering `cols` x `rows` terminal cells
    pub fn new(cols: u16, rows: u16, scale: f32) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
        let mut canvas = Self {
            width: 0,
            height: 0,
            scale,
            pixels: Vec::new(),
            stamp: Vec::new(),
            generation: 0,
        };
        canvas.resize(cols, rows);
        canvas
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.width = cols as usize * DOTS_X;
        self.height = rows as usize * DOTS_Y;
        let n = self.width * self.height;
        self.pixels = vec![rgb(palette::BACKGROUND); n];
        self.stamp = vec![0; n];
        self.generation = 0;
    }

    /// Size in logical units as seen by the visualizer
    pub fn logical_size(&self) -> (f32, f32) {
        (self.width as f32 / self.scale, self.height as f32 / self.scale)
    }

    #[cfg(test)]
    pub fn dot_size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn apply(&mut self, ops: &[DrawOp]) {
        for op in ops {
            self.draw(op);
        }
    }

    pub fn draw(&mut self, op: &DrawOp) {
        self.next_generation();
        match op {
            DrawOp::Clear(color) => {
                let c = rgb(*color);
                self.pixels.iter_mut().for_each(|p| *p = c);
            }
            DrawOp::Fill(color) => {
                let a = color.a as f32 / 255.0;
                let c = rgb(*color);
                for p in &mut self.pixels {
                    blend(p, c, a);
                }
            }
            DrawOp::Line { from, to, width, color } => {
                self.stroke(*from, *to, *width, *color);
            }
            DrawOp::Polyline { points, closed, width, color } => {
                for pair in points.windows(2) {
                    self.stroke(pair[0], pair[1], *width, *color);
                }
                if *closed && points.len() > 2 {
                    self.stroke(points[points.len() - 1], points[0], *width, *color);
                }
            }
            DrawOp::Circle { center, diameter, color } => {
                let c = self.to_dots(*center);
                self.disc(c, diameter * self.scale / 2.0, *color);
            }
        }
    }

    fn next_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            self.stamp.fill(0);
            self.generation = 1;
        }
    }

    fn to_dots(&self, p: Point) -> Point {
        Point::new(p.x * self.scale, p.y * self.scale)
    }

    /// Thick line between two logical points
    fn stroke(&mut self, from: Point, to: Point, width: f32, color: Rgba) {
        let radius = (width * self.scale / 2.0).max(0.0);
        let (a, b) = (self.to_dots(from), self.to_dots(to));
        let Some((a, b)) = self.clip(a, b, radius + 1.0) else {
            return;
        };

        let steps = ((b.x - a.x).abs().max((b.y - a.y).abs()) * 2.0).ceil().max(1.0) as usize;
        for k in 0..=steps {
            let t = k as f32 / steps as f32;
            let p = Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t);
            self.disc(p, radius, color);
        }
    }

    /// Liang-Barsky clip of a segment to the canvas grown by `margin`
    fn clip(&self, a: Point, b: Point, margin: f32) -> Option<(Point, Point)> {
        if !a.is_finite() || !b.is_finite() {
            return None;
        }
        let (min_x, min_y) = (-margin, -margin);
        let (max_x, max_y) = (self.width as f32 + margin, self.height as f32 + margin);
        let (dx, dy) = (b.x - a.x, b.y - a.y);
        let mut t0 = 0.0f32;
        let mut t1 = 1.0f32;

        for (p, q) in [
            (-dx, a.x - min_x),
            (dx, max_x - a.x),
            (-dy, a.y - min_y),
            (dy, max_y - a.y),
        ] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
            } else {
                let r = q / p;
                if p < 0.0 {
                    t0 = t0.max(r);
                } else {
                    t1 = t1.min(r);
                }
                if t0 > t1 {
                    return None;
                }
            }
        }

        Some((
            Point::new(a.x + dx * t0, a.y + dy * t0),
            Point::new(a.x + dx * t1, a.y + dy * t1),
        ))
    }

    /// Filled disc in dot coordinates; always covers at least the center dot
    fn disc(&mut self, center: Point, radius: f32, color: Rgba) {
        if !center.is_finite() || !radius.is_finite() {
            return;
        }
        let r = radius.max(0.5);
        let x0 = (center.x - r).floor().max(0.0) as i64;
        let x1 = (center.x + r).ceil().min(self.width as f32 - 1.0) as i64;
        let y0 = (center.y - r).floor().max(0.0) as i64;
        let y1 = (center.y + r).ceil().min(self.height as f32 - 1.0) as i64;
        let r2 = r * r;

        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f32 + 0.5 - center.x;
                let dy = y as f32 + 0.5 - center.y;
                if dx * dx + dy * dy <= r2 {
                    self.plot(x as usize, y as usize, color);
                }
            }
        }
    }

    fn plot(&mut self, x: usize, y: usize, color: Rgba) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = y * self.width + x;
        if self.stamp[idx] == self.generation {
            return;
        }
        self.stamp[idx] = self.generation;
        blend(&mut self.pixels[idx], rgb(color), color.a as f32 / 255.0);
    }

    fn pixel(&self, x: usize, y: usize) -> [f32; 3] {
        self.pixels[y * self.width + x]
    }

    /// Encode the raster as colored braille glyphs into the terminal buffer
    pub fn render(&self, term: &mut Terminal) {
        let bg = palette::BACKGROUND.luma();
        let cols = self.width / DOTS_X;
        let rows = self.height / DOTS_Y;

        for cy in 0..rows {
            for cx in 0..cols {
                let mut dots = [[false; DOTS_X]; DOTS_Y];
                let mut brightest: Option<([f32; 3], f32)> = None;

                for (dy, row) in dots.iter_mut().enumerate() {
                    for (dx, dot) in row.iter_mut().enumerate() {
                        let px = self.pixel(cx * DOTS_X + dx, cy * DOTS_Y + dy);
                        let l = luma(px);
                        if l - bg > LIT_THRESHOLD {
                            *dot = true;
                            if brightest.map_or(true, |(_, best)| l > best) {
                                brightest = Some((px, l));
                            }
                        }
                    }
                }

                if let Some((px, _)) = brightest {
                    let color = Rgba {
                        r: px[0].round() as u8,
                        g: px[1].round() as u8,
                        b: px[2].round() as u8,
                        a: 255,
                    };
                    term.set(cx as i32, cy as i32, encode_braille(&dots), Some(color.to_color()));
                }
            }
        }
    }
}

fn rgb(c: Rgba) -> [f32; 3] {
    [c.r as f32, c.g as f32, c.b as f32]
}

fn blend(dst: &mut [f32; 3], src: [f32; 3], alpha: f32) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d += (s - *d) * alpha;
    }
}

/// Encode 2x4 dot pattern to braille character
fn encode_braille(dots: &[[bool; DOTS_X]; DOTS_Y]) -> char {
    // Braille dot positions:
    // 0 3
    // 1 4
    // 2 5
    // 6 7
    let mut code: u32 = 0;
    if dots[0][0] { code |= 1 << 0; }
    if dots[1][0] { code |= 1 << 1; }
    if dots[2][0] { code |= 1 << 2; }
    if dots[0][1] { code |= 1 << 3; }
    if dots[1][1] { code |= 1 << 4; }
    if dots[2][1] { code |= 1 << 5; }
    if dots[3][0] { code |= 1 << 6; }
    if dots[3][1] { code |= 1 << 7; }

    char::from_u32(BRAILLE_BASE + code).unwrap_or(' ')
}
