//! Supersampled RGBA drawing surface blitted to the terminal as half blocks.
//!
//! Coordinates are logical pixels: one terminal cell is one logical pixel
//! wide and two tall. The backing store holds `scale × scale` samples per
//! logical pixel, and every sample is either inside a shape or not, so a
//! higher scale yields smoother edges after averaging. Angles are y-up
//! radians: 0 points right, π/2 points up, π points left.

use std::f64::consts::TAU;

use ratatui::{buffer::Buffer, layout::Rect, style::Color};

// ── Colors ────────────────────────────────────────────────────────────

/// Straight (non-premultiplied) color with alpha in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0.0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[must_use]
    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// RGB part as a terminal color, ignoring alpha.
    pub const fn to_color(self) -> Color {
        Color::Rgb(self.r, self.g, self.b)
    }

    /// Interpolate every channel, alpha included. `t` is clamped to `0..=1`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0) as f32;
        let mix = |a: u8, b: u8| to_channel(f32::from(a) / 255.0 * (1.0 - t) + f32::from(b) / 255.0 * t);
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: self.a * (1.0 - t) + other.a * t,
        }
    }

    /// Composite this color over an opaque `background`.
    pub fn over(self, background: Self) -> Color {
        let a = self.a.clamp(0.0, 1.0);
        let mix = |fg: u8, bg: u8| to_channel(f32::from(fg) / 255.0 * a + f32::from(bg) / 255.0 * (1.0 - a));
        Color::Rgb(
            mix(self.r, background.r),
            mix(self.g, background.g),
            mix(self.b, background.b),
        )
    }

    fn premultiplied(self) -> [f32; 4] {
        let a = self.a.clamp(0.0, 1.0);
        [
            f32::from(self.r) / 255.0 * a,
            f32::from(self.g) / 255.0 * a,
            f32::from(self.b) / 255.0 * a,
            a,
        ]
    }

    fn from_premultiplied([r, g, b, a]: [f32; 4]) -> Self {
        if a <= f32::EPSILON {
            return Self::TRANSPARENT;
        }
        Self {
            r: to_channel(r / a),
            g: to_channel(g / a),
            b: to_channel(b / a),
            a: a.min(1.0),
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::as_conversions)]
fn to_channel(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

// ── Paint ─────────────────────────────────────────────────────────────

/// How a shape is filled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    Solid(Rgba),
    /// Horizontal two-stop gradient from `start` at `x0` to `end` at `x1`.
    LinearGradient {
        x0: f64,
        x1: f64,
        start: Rgba,
        end: Rgba,
    },
}

impl Paint {
    fn color_at(&self, x: f64) -> Rgba {
        match *self {
            Self::Solid(c) => c,
            Self::LinearGradient { x0, x1, start, end } => {
                let span = x1 - x0;
                if span.abs() < f64::EPSILON {
                    return end;
                }
                start.lerp(end, (x - x0) / span)
            }
        }
    }
}

// ── Surface ───────────────────────────────────────────────────────────

/// Off-screen RGBA canvas.
#[derive(Debug, Clone, Default)]
pub struct DrawingSurface {
    width: u16,
    height: u16,
    scale: u8,
    /// Premultiplied samples, row-major over the backing store.
    samples: Vec<[f32; 4]>,
}

impl DrawingSurface {
    pub fn new(width: u16, height: u16, scale: u8) -> Self {
        let mut surface = Self::default();
        surface.resize(width, height, scale);
        surface
    }

    /// Logical size in pixels.
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn scale(&self) -> u8 {
        self.scale
    }

    /// Reallocate for a new logical size or scale and clear.
    pub fn resize(&mut self, width: u16, height: u16, scale: u8) {
        self.width = width;
        self.height = height;
        self.scale = scale.max(1);
        let (bw, bh) = self.backing_size();
        self.samples.clear();
        self.samples.resize(bw * bh, [0.0; 4]);
    }

    /// Make every sample transparent.
    pub fn clear(&mut self) {
        self.samples.fill([0.0; 4]);
    }

    /// `true` when nothing has been painted since the last clear.
    pub fn is_blank(&self) -> bool {
        self.samples.iter().all(|s| s[3] <= f32::EPSILON)
    }

    fn backing_size(&self) -> (usize, usize) {
        let s = usize::from(self.scale);
        (usize::from(self.width) * s, usize::from(self.height) * s)
    }

    /// Paint every sample whose center satisfies `inside`, in logical units.
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    fn paint_where(&mut self, paint: &Paint, inside: impl Fn(f64, f64) -> bool) {
        let (bw, _) = self.backing_size();
        if bw == 0 {
            return;
        }
        let step = 1.0 / f64::from(self.scale);
        for (i, sample) in self.samples.iter_mut().enumerate() {
            let x = ((i % bw) as f64 + 0.5) * step;
            let y = ((i / bw) as f64 + 0.5) * step;
            if inside(x, y) {
                let [r, g, b, a] = paint.color_at(x).premultiplied();
                let keep = 1.0 - a;
                *sample = [
                    r + sample[0] * keep,
                    g + sample[1] * keep,
                    b + sample[2] * keep,
                    a + sample[3] * keep,
                ];
            }
        }
    }

    /// Stroke a circular arc of `line_width` centered on radius `radius`.
    ///
    /// The arc runs clockwise (as seen on screen) from angle `from` down to
    /// angle `to`; `from >= to` is expected. Equal angles paint nothing.
    pub fn stroke_arc(
        &mut self,
        center: (f64, f64),
        radius: f64,
        from: f64,
        to: f64,
        line_width: f64,
        paint: &Paint,
    ) {
        if from <= to || radius <= 0.0 || line_width <= 0.0 {
            return;
        }
        let (cx, cy) = center;
        let half = line_width / 2.0;
        self.paint_where(paint, |x, y| {
            let (dx, dy) = (x - cx, cy - y);
            let dist = dx.hypot(dy);
            if (dist - radius).abs() > half {
                return false;
            }
            let mut theta = dy.atan2(dx);
            if theta < to {
                theta += TAU;
            }
            theta <= from
        });
    }

    /// Fill a disk of `radius` around `center`.
    pub fn fill_circle(&mut self, center: (f64, f64), radius: f64, paint: &Paint) {
        if radius <= 0.0 {
            return;
        }
        let (cx, cy) = center;
        self.paint_where(paint, |x, y| (x - cx).hypot(y - cy) <= radius);
    }

    /// Average of the samples covering logical pixel `(x, y)`.
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    pub fn logical_pixel(&self, x: u16, y: u16) -> Rgba {
        if x >= self.width || y >= self.height {
            return Rgba::TRANSPARENT;
        }
        let s = usize::from(self.scale);
        let (bw, _) = self.backing_size();
        let mut acc = [0.0_f32; 4];
        for sy in 0..s {
            let row = (usize::from(y) * s + sy) * bw;
            for sx in 0..s {
                if let Some(sample) = self.samples.get(row + usize::from(x) * s + sx) {
                    for (a, v) in acc.iter_mut().zip(sample) {
                        *a += v;
                    }
                }
            }
        }
        let n = (s * s) as f32;
        Rgba::from_premultiplied(acc.map(|v| v / n))
    }

    /// Copy the surface into `area`, two logical rows per cell using `▀`.
    ///
    /// Each pixel is composited over `background`.
    pub fn blit(&self, area: Rect, buf: &mut Buffer, background: Rgba) {
        let rows = area.height.min(self.height.div_ceil(2));
        let cols = area.width.min(self.width);
        for row in 0..rows {
            for col in 0..cols {
                let top = self.logical_pixel(col, row * 2).over(background);
                let bottom = self.logical_pixel(col, row * 2 + 1).over(background);
                if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                    cell.set_symbol("▀").set_fg(top).set_bg(bottom);
                }
            }
        }
    }
}
