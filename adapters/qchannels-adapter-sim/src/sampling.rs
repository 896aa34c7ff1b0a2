//! Turning outcome probabilities into shot counts.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// How shots are drawn from an exact distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SamplingMode {
    /// Independent draws from the thread RNG.
    #[default]
    Random,
    /// Independent draws from an RNG seeded once per backend.
    Seeded(u64),
    /// No noise: `shots · p` rounded by largest remainder.
    Exact,
}

/// Stateful sampler for one backend instance.
pub(crate) struct Sampler {
    mode: SamplingMode,
    rng: Option<Mutex<StdRng>>,
}

impl Sampler {
    pub(crate) fn new(mode: SamplingMode) -> Self {
        let rng = match mode {
            SamplingMode::Seeded(seed) => Some(Mutex::new(StdRng::seed_from_u64(seed))),
            SamplingMode::Random | SamplingMode::Exact => None,
        };
        Self { mode, rng }
    }

    pub(crate) fn mode(&self) -> SamplingMode {
        self.mode
    }

    /// Shot count per outcome index.
    pub(crate) fn sample(&self, probs: &[f64], shots: u32) -> Vec<u64> {
        match (&self.mode, &self.rng) {
            (SamplingMode::Exact, _) => largest_remainder(probs, shots),
            (_, Some(rng)) => {
                let mut rng = rng.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
                draw(probs, shots, &mut *rng)
            }
            (_, None) => draw(probs, shots, &mut rand::thread_rng()),
        }
    }
}

fn draw<R: Rng + ?Sized>(probs: &[f64], shots: u32, rng: &mut R) -> Vec<u64> {
    let mut counts = vec![0u64; probs.len()];
    if probs.is_empty() {
        return counts;
    }
    let mut cumulative = Vec::with_capacity(probs.len());
    let mut total = 0.0;
    for p in probs {
        total += p;
        cumulative.push(total);
    }
    for _ in 0..shots {
        let r: f64 = rng.r#gen::<f64>() * total;
        let outcome = cumulative
            .iter()
            .position(|&c| r < c)
            .unwrap_or(probs.len() - 1);
        counts[outcome] += 1;
    }
    counts
}

/// Floor of `shots · p_i` for every outcome, with the leftover shots going
/// to the largest fractional parts (lower index first on ties).
pub(crate) fn largest_remainder(probs: &[f64], shots: u32) -> Vec<u64> {
    let total: f64 = probs.iter().sum();
    if probs.is_empty() || total <= 0.0 {
        return vec![0; probs.len()];
    }
    let shots = u64::from(shots);
    let exact: Vec<f64> = probs.iter().map(|p| p / total * shots as f64).collect();
    let mut counts: Vec<u64> = exact.iter().map(|x| x.floor() as u64).collect();

    let assigned: u64 = counts.iter().sum();
    let mut order: Vec<usize> = (0..probs.len()).collect();
    order.sort_by(|&a, &b| {
        let fa = exact[a] - exact[a].floor();
        let fb = exact[b] - exact[b].floor();
        fb.total_cmp(&fa).then(a.cmp(&b))
    });
    for &i in order.iter().take(shots.saturating_sub(assigned) as usize) {
        counts[i] += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_largest_remainder() {
        assert_eq!(largest_remainder(&[0.5, 0.5], 1000), vec![500, 500]);
        assert_eq!(largest_remainder(&[1.0 / 3.0; 3], 10), vec![4, 3, 3]);
        assert_eq!(largest_remainder(&[0.0, 1.0], 7), vec![0, 7]);
        assert_eq!(largest_remainder(&[0.0, 0.0], 7), vec![0, 0]);
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let probs = [0.25, 0.25, 0.5];
        let a = Sampler::new(SamplingMode::Seeded(7)).sample(&probs, 500);
        let b = Sampler::new(SamplingMode::Seeded(7)).sample(&probs, 500);
        assert_eq!(a, b);
        assert_eq!(a.iter().sum::<u64>(), 500);
    }

    #[test]
    fn test_random_respects_support() {
        let counts = Sampler::new(SamplingMode::Random).sample(&[0.0, 1.0, 0.0], 200);
        assert_eq!(counts, vec![0, 200, 0]);
    }
}
