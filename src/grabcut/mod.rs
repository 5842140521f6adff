//! Iterated graph-cut foreground/background estimation (GrabCut).
//!
//! The algorithm is seeded with a rectangle assumed to contain the subject:
//! everything outside is hard background, everything inside starts as
//! probable foreground. Each iteration re-fits two Gaussian mixture color
//! models (one per class), builds a grid graph whose terminal links encode
//! color likelihood and whose neighbor links encode contrast-weighted
//! smoothness, and relabels the probable pixels along the minimum cut.
//! Rother, Kolmogorov, Blake, "GrabCut" (SIGGRAPH 2004).

mod gmm;
mod graph;

use image::RgbImage;

use gmm::Gmm;
use graph::FlowGraph;

/// Smoothness weight between neighboring pixels.
const GAMMA: f64 = 50.0;

/// Terminal weight for hard-labeled pixels; large enough that no combination
/// of neighbor links (at most 8 * GAMMA) can pull them across the cut.
const LAMBDA: f64 = 9.0 * GAMMA;

/// Per-pixel label. Numeric values match the conventional GrabCut mask
/// encoding; the binary collapse keeps `Foreground` and `ProbableForeground`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum MaskValue {
    Background = 0,
    Foreground = 1,
    ProbableBackground = 2,
    ProbableForeground = 3,
}

impl MaskValue {
    pub fn is_foreground(self) -> bool {
        matches!(self, Self::Foreground | Self::ProbableForeground)
    }

    fn is_background_class(self) -> bool {
        matches!(self, Self::Background | Self::ProbableBackground)
    }
}

/// Seed rectangle in pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle inset `margin` pixels from every edge of a `width` x
    /// `height` frame, or `None` when the frame is too small to leave a
    /// non-empty interior.
    pub fn inset(width: u32, height: u32, margin: u32) -> Option<Self> {
        if width <= 2 * margin || height <= 2 * margin {
            return None;
        }
        Some(Self::new(
            margin,
            margin,
            width - 2 * margin,
            height - 2 * margin,
        ))
    }

    fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    fn clamped(&self, width: u32, height: u32) -> Self {
        let x = self.x.min(width);
        let y = self.y.min(height);
        Self {
            x,
            y,
            width: self.width.min(width - x),
            height: self.height.min(height - y),
        }
    }
}

/// Per-pixel label buffer produced by [`grab_cut`].
#[derive(Clone, Debug)]
pub struct Mask {
    width: u32,
    height: u32,
    data: Vec<MaskValue>,
}

impl Mask {
    /// All-background mask with the rectangle interior marked probable
    /// foreground; this is exactly the state after rectangle initialization.
    pub fn from_rect(width: u32, height: u32, rect: Rect) -> Self {
        let rect = rect.clamped(width, height);
        let mut data = vec![MaskValue::Background; (width * height) as usize];
        for y in rect.y..rect.y + rect.height {
            for x in rect.x..rect.x + rect.width {
                data[(y * width + x) as usize] = MaskValue::ProbableForeground;
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn all_background(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![MaskValue::Background; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> MaskValue {
        self.data[(y * self.width + x) as usize]
    }

    pub fn is_foreground(&self, x: u32, y: u32) -> bool {
        self.get(x, y).is_foreground()
    }

    fn set(&mut self, x: u32, y: u32, value: MaskValue) {
        self.data[(y * self.width + x) as usize] = value;
    }
}

/// Run rectangle-seeded GrabCut for `iterations` refinement rounds.
///
/// Zero iterations return the rectangle initialization unchanged. Hard
/// background pixels (outside the rectangle) never flip to foreground.
/// The routine is fully deterministic.
pub fn grab_cut(image: &RgbImage, rect: Rect, iterations: u32) -> Mask {
    let (width, height) = image.dimensions();
    let rect = rect.clamped(width, height);
    let mut mask = Mask::from_rect(width, height, rect);
    if iterations == 0 || rect.width == 0 || rect.height == 0 {
        return mask;
    }

    let colors: Vec<[f64; 3]> = image
        .pixels()
        .map(|p| [f64::from(p[0]), f64::from(p[1]), f64::from(p[2])])
        .collect();
    let beta = compute_beta(&colors, width, height);

    let (mut background_gmm, mut foreground_gmm) = init_gmms(&colors, &mask);

    for _ in 0..iterations {
        let (bg_assignments, fg_assignments) =
            assign_components(&colors, &mask, &background_gmm, &foreground_gmm);
        background_gmm = relearn(&colors, &mask, &bg_assignments, true);
        foreground_gmm = relearn(&colors, &mask, &fg_assignments, false);

        let mut graph = build_graph(
            &colors,
            &mask,
            width,
            height,
            beta,
            &background_gmm,
            &foreground_gmm,
        );
        graph.max_flow();

        for y in 0..height {
            for x in 0..width {
                let value = mask.get(x, y);
                if value == MaskValue::ProbableBackground || value == MaskValue::ProbableForeground
                {
                    let node = (y * width + x) as usize;
                    mask.set(
                        x,
                        y,
                        if graph.is_source_side(node) {
                            MaskValue::ProbableForeground
                        } else {
                            MaskValue::ProbableBackground
                        },
                    );
                }
            }
        }
    }

    mask
}

/// Contrast sensitivity: beta = 1 / (2 * <||z_i - z_j||^2>) averaged over
/// all 8-neighborhood pairs. A perfectly flat image gets beta = 0, making
/// every neighbor link uniform.
fn compute_beta(colors: &[[f64; 3]], width: u32, height: u32) -> f64 {
    let mut total = 0.0;
    let mut count = 0u64;
    for y in 0..height {
        for x in 0..width {
            let here = colors[(y * width + x) as usize];
            for (dx, dy) in NEIGHBOR_OFFSETS {
                let nx = x as i64 + dx;
                let ny = y as i64 + dy;
                if nx < 0 || ny < 0 || nx >= i64::from(width) || ny >= i64::from(height) {
                    continue;
                }
                let there = colors[(ny as u32 * width + nx as u32) as usize];
                total += color_distance_sq(here, there);
                count += 1;
            }
        }
    }
    if total <= f64::EPSILON || count == 0 {
        0.0
    } else {
        1.0 / (2.0 * total / count as f64)
    }
}

/// Upper-left half of the 8-neighborhood; each undirected pair is visited
/// exactly once.
const NEIGHBOR_OFFSETS: [(i64, i64); 4] = [(-1, 0), (-1, -1), (0, -1), (1, -1)];

fn color_distance_sq(a: [f64; 3], b: [f64; 3]) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)
}

fn init_gmms(colors: &[[f64; 3]], mask: &Mask) -> (Gmm, Gmm) {
    let mut background = Vec::new();
    let mut foreground = Vec::new();
    for (color, value) in colors.iter().zip(&mask.data) {
        if value.is_background_class() {
            background.push(*color);
        } else {
            foreground.push(*color);
        }
    }
    (Gmm::from_samples(&background), Gmm::from_samples(&foreground))
}

/// Component index per pixel under the GMM of its current class. The two
/// returned vectors are sample-aligned with the class subsets used by
/// [`relearn`].
fn assign_components(
    colors: &[[f64; 3]],
    mask: &Mask,
    background_gmm: &Gmm,
    foreground_gmm: &Gmm,
) -> (Vec<usize>, Vec<usize>) {
    let mut background = Vec::new();
    let mut foreground = Vec::new();
    for (color, value) in colors.iter().zip(&mask.data) {
        if value.is_background_class() {
            background.push(background_gmm.which_component(*color));
        } else {
            foreground.push(foreground_gmm.which_component(*color));
        }
    }
    (background, foreground)
}

fn relearn(colors: &[[f64; 3]], mask: &Mask, assignments: &[usize], background: bool) -> Gmm {
    let samples: Vec<[f64; 3]> = colors
        .iter()
        .zip(&mask.data)
        .filter(|(_, value)| value.is_background_class() == background)
        .map(|(color, _)| *color)
        .collect();
    Gmm::from_assignments(&samples, assignments)
}

fn build_graph(
    colors: &[[f64; 3]],
    mask: &Mask,
    width: u32,
    height: u32,
    beta: f64,
    background_gmm: &Gmm,
    foreground_gmm: &Gmm,
) -> FlowGraph {
    let mut graph = FlowGraph::new((width * height) as usize);
    let diagonal_scale = 1.0 / std::f64::consts::SQRT_2;

    for y in 0..height {
        for x in 0..width {
            let node = (y * width + x) as usize;
            let color = colors[node];

            // Terminal links. Probable pixels pay the negative log
            // likelihood of the opposite model; both weights are shifted by
            // their minimum so capacities stay non-negative, which leaves
            // the minimum cut unchanged (every cut severs exactly one
            // terminal link per pixel).
            let (to_source, to_sink) = match mask.get(x, y) {
                MaskValue::Background => (0.0, LAMBDA),
                MaskValue::Foreground => (LAMBDA, 0.0),
                MaskValue::ProbableBackground | MaskValue::ProbableForeground => {
                    let from_source =
                        -background_gmm.probability(color).max(f64::MIN_POSITIVE).ln();
                    let to_sink =
                        -foreground_gmm.probability(color).max(f64::MIN_POSITIVE).ln();
                    let shift = from_source.min(to_sink);
                    (from_source - shift, to_sink - shift)
                }
            };
            graph.add_terminal_weights(node, to_source, to_sink);

            // Neighbor links, one per undirected pair.
            for (dx, dy) in NEIGHBOR_OFFSETS {
                let nx = x as i64 + dx;
                let ny = y as i64 + dy;
                if nx < 0 || ny < 0 || nx >= i64::from(width) || ny >= i64::from(height) {
                    continue;
                }
                let neighbor = (ny as u32 * width + nx as u32) as usize;
                let scale = if dx != 0 && dy != 0 {
                    diagonal_scale
                } else {
                    1.0
                };
                let weight =
                    GAMMA * scale * (-beta * color_distance_sq(color, colors[neighbor])).exp();
                graph.add_neighbor_weight(node, neighbor, weight);
            }
        }
    }

    graph
}
