//! Gaussian mixture color models for the foreground and background classes.
//!
//! Five full-covariance RGB components per model, working on raw 0-255
//! channel values. Initialization is a deterministic k-means (centers seeded
//! from the luminance-sorted sample list, no RNG) so that identical inputs
//! always produce identical mixtures.

pub const COMPONENT_COUNT: usize = 5;

/// Added to the covariance diagonal when the determinant collapses, which
/// happens whenever a component sees a single flat color.
const VARIANCE_FLOOR: f64 = 0.01;

const DETERMINANT_MIN: f64 = 1e-10;

const KMEANS_ITERATIONS: usize = 10;

#[derive(Clone, Debug, Default)]
struct Component {
    weight: f64,
    mean: [f64; 3],
    inverse_cov: [[f64; 3]; 3],
    cov_determinant: f64,
}

impl Component {
    /// Gaussian density without the constant (2*pi)^(3/2) factor. The factor
    /// is identical for both models, so it shifts every pixel's two data
    /// terms equally and cannot change the minimum cut.
    fn density(&self, color: [f64; 3]) -> f64 {
        if self.weight <= 0.0 || self.cov_determinant <= 0.0 {
            return 0.0;
        }
        let d = [
            color[0] - self.mean[0],
            color[1] - self.mean[1],
            color[2] - self.mean[2],
        ];
        let mut mahalanobis = 0.0;
        for (i, di) in d.iter().enumerate() {
            for (j, dj) in d.iter().enumerate() {
                mahalanobis += di * self.inverse_cov[i][j] * dj;
            }
        }
        (1.0 / self.cov_determinant.sqrt()) * (-0.5 * mahalanobis).exp()
    }
}

#[derive(Clone, Debug)]
pub struct Gmm {
    components: [Component; COMPONENT_COUNT],
}

impl Gmm {
    /// Learn a mixture from scratch: deterministic k-means clustering of the
    /// samples, then per-cluster parameter estimation. An empty sample set
    /// yields a mixture of zero-weight components whose density is 0
    /// everywhere.
    pub fn from_samples(samples: &[[f64; 3]]) -> Self {
        let assignments = kmeans_assign(samples, COMPONENT_COUNT, KMEANS_ITERATIONS);
        Self::from_assignments(samples, &assignments)
    }

    /// Re-estimate mixture parameters from a fixed component assignment.
    pub fn from_assignments(samples: &[[f64; 3]], assignments: &[usize]) -> Self {
        debug_assert_eq!(samples.len(), assignments.len());

        let mut sums = [[0.0f64; 3]; COMPONENT_COUNT];
        let mut products = [[[0.0f64; 3]; 3]; COMPONENT_COUNT];
        let mut counts = [0usize; COMPONENT_COUNT];

        for (color, &k) in samples.iter().zip(assignments) {
            counts[k] += 1;
            for i in 0..3 {
                sums[k][i] += color[i];
                for j in 0..3 {
                    products[k][i][j] += color[i] * color[j];
                }
            }
        }

        let total = samples.len() as f64;
        let mut components: [Component; COMPONENT_COUNT] = Default::default();
        for k in 0..COMPONENT_COUNT {
            if counts[k] == 0 {
                continue;
            }
            let n = counts[k] as f64;
            let mean = [sums[k][0] / n, sums[k][1] / n, sums[k][2] / n];
            let mut cov = [[0.0f64; 3]; 3];
            for i in 0..3 {
                for j in 0..3 {
                    cov[i][j] = products[k][i][j] / n - mean[i] * mean[j];
                }
            }

            let mut determinant = determinant3(&cov);
            while determinant < DETERMINANT_MIN {
                for (i, row) in cov.iter_mut().enumerate() {
                    row[i] += VARIANCE_FLOOR;
                }
                determinant = determinant3(&cov);
            }

            components[k] = Component {
                weight: n / total,
                mean,
                inverse_cov: invert3(&cov, determinant),
                cov_determinant: determinant,
            };
        }

        Self { components }
    }

    /// Weighted mixture density of a color under this model.
    pub fn probability(&self, color: [f64; 3]) -> f64 {
        self.components
            .iter()
            .map(|c| c.weight * c.density(color))
            .sum()
    }

    /// Index of the component that explains the color best. Ties resolve to
    /// the lowest index, keeping the assignment step deterministic.
    pub fn which_component(&self, color: [f64; 3]) -> usize {
        let mut best = 0;
        let mut best_density = -1.0;
        for (k, component) in self.components.iter().enumerate() {
            let density = component.density(color);
            if density > best_density {
                best = k;
                best_density = density;
            }
        }
        best
    }
}

fn determinant3(m: &[[f64; 3]; 3]) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

fn invert3(m: &[[f64; 3]; 3], determinant: f64) -> [[f64; 3]; 3] {
    let inv_det = 1.0 / determinant;
    [
        [
            (m[1][1] * m[2][2] - m[1][2] * m[2][1]) * inv_det,
            (m[0][2] * m[2][1] - m[0][1] * m[2][2]) * inv_det,
            (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * inv_det,
        ],
        [
            (m[1][2] * m[2][0] - m[1][0] * m[2][2]) * inv_det,
            (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * inv_det,
            (m[0][2] * m[1][0] - m[0][0] * m[1][2]) * inv_det,
        ],
        [
            (m[1][0] * m[2][1] - m[1][1] * m[2][0]) * inv_det,
            (m[0][1] * m[2][0] - m[0][0] * m[2][1]) * inv_det,
            (m[0][0] * m[1][1] - m[0][1] * m[1][0]) * inv_det,
        ],
    ]
}

fn luminance(color: [f64; 3]) -> f64 {
    0.299 * color[0] + 0.587 * color[1] + 0.114 * color[2]
}

/// Deterministic Lloyd k-means over RGB samples. Centers are seeded from
/// evenly spaced positions in the luminance-sorted sample list; assignment
/// ties go to the lowest center index. When there are fewer samples than
/// requested clusters, each sample founds its own cluster.
fn kmeans_assign(samples: &[[f64; 3]], k: usize, iterations: usize) -> Vec<usize> {
    if samples.is_empty() {
        return Vec::new();
    }
    let k = k.min(samples.len());

    let mut order: Vec<usize> = (0..samples.len()).collect();
    order.sort_by(|&a, &b| {
        luminance(samples[a])
            .total_cmp(&luminance(samples[b]))
            .then(a.cmp(&b))
    });

    let mut centers: Vec<[f64; 3]> = (0..k)
        .map(|c| {
            let position = if k == 1 {
                0
            } else {
                c * (samples.len() - 1) / (k - 1)
            };
            samples[order[position]]
        })
        .collect();

    let mut assignments = vec![0usize; samples.len()];
    for _ in 0..iterations {
        for (sample, slot) in samples.iter().zip(assignments.iter_mut()) {
            let mut best = 0;
            let mut best_distance = f64::INFINITY;
            for (c, center) in centers.iter().enumerate() {
                let distance = (sample[0] - center[0]).powi(2)
                    + (sample[1] - center[1]).powi(2)
                    + (sample[2] - center[2]).powi(2);
                if distance < best_distance {
                    best = c;
                    best_distance = distance;
                }
            }
            *slot = best;
        }

        let mut sums = vec![[0.0f64; 3]; k];
        let mut counts = vec![0usize; k];
        for (sample, &c) in samples.iter().zip(&assignments) {
            counts[c] += 1;
            for i in 0..3 {
                sums[c][i] += sample[i];
            }
        }
        for c in 0..k {
            // Empty clusters keep their previous center.
            if counts[c] > 0 {
                let n = counts[c] as f64;
                centers[c] = [sums[c][0] / n, sums[c][1] / n, sums[c][2] / n];
            }
        }
    }

    assignments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_color_samples_learn_that_mean() {
        let samples = vec![[10.0, 200.0, 30.0]; 64];
        let gmm = Gmm::from_samples(&samples);
        let occupied: Vec<_> = gmm.components.iter().filter(|c| c.weight > 0.0).collect();
        assert!(!occupied.is_empty());
        let weight_sum: f64 = occupied.iter().map(|c| c.weight).sum();
        assert!((weight_sum - 1.0).abs() < 1e-9);
        for component in occupied {
            assert!((component.mean[1] - 200.0).abs() < 1e-6);
        }
    }

    #[test]
    fn probability_separates_distinct_colors() {
        let red = [220.0, 30.0, 30.0];
        let blue = [20.0, 40.0, 200.0];
        let gmm = Gmm::from_samples(&vec![red; 50]);
        assert!(gmm.probability(red) > gmm.probability(blue) * 1e3);
    }

    #[test]
    fn empty_sample_set_has_zero_density() {
        let gmm = Gmm::from_samples(&[]);
        assert_eq!(gmm.probability([128.0, 128.0, 128.0]), 0.0);
    }

    #[test]
    fn which_component_is_deterministic() {
        let mut samples = vec![[10.0, 10.0, 10.0]; 30];
        samples.extend(vec![[240.0, 240.0, 240.0]; 30]);
        let gmm = Gmm::from_samples(&samples);
        let first = gmm.which_component([12.0, 12.0, 12.0]);
        for _ in 0..5 {
            assert_eq!(gmm.which_component([12.0, 12.0, 12.0]), first);
        }
    }

    #[test]
    fn kmeans_splits_two_clusters() {
        let mut samples = vec![[0.0, 0.0, 0.0]; 20];
        samples.extend(vec![[255.0, 255.0, 255.0]; 20]);
        let assignments = kmeans_assign(&samples, 2, 10);
        assert_eq!(assignments.len(), 40);
        assert_ne!(assignments[0], assignments[39]);
        assert!(assignments[..20].iter().all(|&a| a == assignments[0]));
        assert!(assignments[20..].iter().all(|&a| a == assignments[39]));
    }
}
