//! Spike detection on integrated trajectories

use std::ops::Sub;
use crate::trajectory::Trajectory;


/// Differences between consecutive elements
pub fn diff<T: Sub<Output = T> + Copy>(x: &[T]) -> Vec<T> {
    (1..x.len()).map(|i| x[i] - x[i-1])
        .collect()
}

/// Returns indices of local maxima above `threshold`, endpoints are never peaks and
/// a flat top counts once at its last index when it rises from a strictly lower value
pub fn find_peaks(values: &[f64], threshold: f64) -> Vec<usize> {
    if values.len() < 3 {
        return vec![];
    }

    (1..values.len() - 1)
        .filter(|&i| {
            if !(values[i] > threshold && values[i] > values[i+1]) {
                return false;
            }

            let mut left = i;
            while left > 0 && values[left-1] == values[i] {
                left -= 1;
            }

            left > 0 && values[left-1] < values[i]
        })
        .collect()
}

/// Times at which the given state variable peaks above `threshold`, `None` if the
/// trajectory has no such column
pub fn spike_times(trajectory: &Trajectory, column: usize, threshold: f64) -> Option<Vec<f64>> {
    let values = trajectory.column(column)?.to_vec();

    Some(
        find_peaks(&values, threshold).into_iter()
            .map(|i| trajectory.times()[i])
            .collect()
    )
}

/// Time between consecutive spikes
pub fn interspike_intervals(spike_times: &[f64]) -> Vec<f64> {
    diff(spike_times)
}

#[cfg(test)]
mod test {
    use super::{diff, find_peaks, interspike_intervals};


    #[test]
    fn test_diff() {
        assert_eq!(diff(&[1, 4, 9, 16]), vec![3, 5, 7]);
        assert!(diff::<f64>(&[]).is_empty());
    }

    #[test]
    fn test_find_peaks() {
        let values = [-65., -20., 30., 10., -70., -60., 35., 35., 0., 20.];

        assert_eq!(find_peaks(&values, 0.), vec![2, 7]);
        assert_eq!(find_peaks(&values, 32.), vec![7]);
        assert!(find_peaks(&values[..2], 0.).is_empty());

        // plateaus on a falling edge or at the start are not peaks
        assert_eq!(find_peaks(&[10., 20., 5., 5., 3.], 0.), vec![1]);
        assert_eq!(find_peaks(&[30., 30., 10., 40., 40., 40., 0.], 0.), vec![5]);
    }

    #[test]
    fn test_intervals() {
        assert_eq!(interspike_intervals(&[1., 3.5, 8.]), vec![2.5, 4.5]);
    }
}
