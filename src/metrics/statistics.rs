use serde::{Deserialize, Serialize};

/// Summary of a set of episode returns or losses.
///
/// `std` is the population standard deviation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Statistics {
    pub mean: f32,
    pub std: f32,
    pub min: f32,
    pub max: f32,
    pub count: usize,
}

impl Statistics {
    /// Compute statistics from a slice of values. An empty slice gives all zeros.
    pub fn from_slice(values: &[f32]) -> Self {
        if values.is_empty() {
            return Statistics::default();
        }

        let count = values.len();
        let mean = values.iter().map(|&x| x as f64).sum::<f64>() / count as f64;
        let variance = values
            .iter()
            .map(|&x| (x as f64 - mean).powi(2))
            .sum::<f64>()
            / count as f64;

        let min = values.iter().copied().fold(f32::INFINITY, f32::min);
        let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);

        Statistics {
            mean: mean as f32,
            std: variance.sqrt() as f32,
            min,
            max,
            count,
        }
    }
}

/// Running mean and population variance (Welford), used to average
/// per-update losses over a training block.
#[derive(Debug, Clone)]
pub struct RunningStats {
    count: usize,
    mean: f64,
    m2: f64,
    min: f32,
    max: f32,
}

impl RunningStats {
    pub fn new() -> Self {
        RunningStats {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            min: f32::INFINITY,
            max: f32::NEG_INFINITY,
        }
    }

    pub fn update(&mut self, value: f32) {
        self.count += 1;
        let delta = value as f64 - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value as f64 - self.mean);
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn mean(&self) -> f32 {
        self.mean as f32
    }

    pub fn std(&self) -> f32 {
        if self.count == 0 {
            0.0
        } else {
            (self.m2 / self.count as f64).sqrt() as f32
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn to_statistics(&self) -> Statistics {
        if self.count == 0 {
            return Statistics::default();
        }
        Statistics {
            mean: self.mean(),
            std: self.std(),
            min: self.min,
            max: self.max,
            count: self.count,
        }
    }
}

impl Default for RunningStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_population_std() {
        let stats = Statistics::from_slice(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((stats.mean - 5.0).abs() < 1e-6);
        assert!((stats.std - 2.0).abs() < 1e-6);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);
        assert_eq!(stats.count, 8);
    }

    #[test]
    fn test_empty_and_single() {
        assert_eq!(Statistics::from_slice(&[]), Statistics::default());
        let single = Statistics::from_slice(&[-3.5]);
        assert_eq!(single.mean, -3.5);
        assert_eq!(single.std, 0.0);
    }

    #[test]
    fn test_running_matches_batch() {
        let values = [1.0, -2.0, 3.5, 0.25, 8.0];
        let mut running = RunningStats::new();
        for &v in &values {
            running.update(v);
        }
        let batch = Statistics::from_slice(&values);
        let streamed = running.to_statistics();
        assert!((batch.mean - streamed.mean).abs() < 1e-5);
        assert!((batch.std - streamed.std).abs() < 1e-5);
        assert_eq!(batch.min, streamed.min);
        assert_eq!(batch.max, streamed.max);
    }
}
