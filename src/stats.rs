//! Latency aggregation shared by the load-test binaries.

/// Summary over a set of latency samples, in seconds. Percentiles use the
/// sorted-index definition (`sorted[len * p]`, median at `len / 2`).
#[derive(Debug, Clone, PartialEq)]
pub struct LatencySummary {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub p95: f64,
    pub p99: f64,
}

impl LatencySummary {
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let len = sorted.len();
        let at = |p: f64| sorted[((len as f64 * p) as usize).min(len - 1)];

        Some(Self {
            avg: sorted.iter().sum::<f64>() / len as f64,
            min: sorted[0],
            max: sorted[len - 1],
            median: sorted[len / 2],
            p95: at(0.95),
            p99: at(0.99),
        })
    }

    pub fn print(&self, label: &str, indent: &str) {
        println!("{indent}{label}:");
        println!("{indent}  avg:    {:.3}s", self.avg);
        println!("{indent}  min:    {:.3}s", self.min);
        println!("{indent}  max:    {:.3}s", self.max);
        println!("{indent}  median: {:.3}s", self.median);
        println!("{indent}  p95:    {:.3}s", self.p95);
        println!("{indent}  p99:    {:.3}s", self.p99);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_samples_yield_no_summary() {
        assert_eq!(LatencySummary::from_samples(&[]), None);
    }

    #[test]
    fn single_sample_is_its_own_percentiles() {
        let summary = LatencySummary::from_samples(&[0.25]).unwrap();
        assert_eq!(summary.min, 0.25);
        assert_eq!(summary.max, 0.25);
        assert_eq!(summary.median, 0.25);
        assert_eq!(summary.p95, 0.25);
        assert_eq!(summary.p99, 0.25);
    }

    #[test]
    fn percentiles_use_sorted_index() {
        // 1.0, 2.0, ..., 100.0
        let samples: Vec<f64> = (1..=100).map(f64::from).collect();
        let summary = LatencySummary::from_samples(&samples).unwrap();
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 100.0);
        // index 50 of the sorted slice
        assert_eq!(summary.median, 51.0);
        // index 95 and 99
        assert_eq!(summary.p95, 96.0);
        assert_eq!(summary.p99, 100.0);
        assert!((summary.avg - 50.5).abs() < 1e-9);
    }

    #[test]
    fn unsorted_input_is_sorted_first() {
        let summary = LatencySummary::from_samples(&[3.0, 1.0, 2.0]).unwrap();
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 3.0);
        assert_eq!(summary.median, 2.0);
    }
}
