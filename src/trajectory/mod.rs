//! Integration output: time points with the state of the model at each of them

use std::{fs::File, io::Write, path::Path};
use ndarray::{Array1, Array2, ArrayView1};
use crate::error::ConfigError;


/// States of a model sampled at a set of time points, `states` has one row per time
/// point and one column per state variable
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    times: Array1<f64>,
    states: Array2<f64>,
    labels: Vec<String>,
}

impl Trajectory {
    pub(crate) fn new(times: Array1<f64>, states: Array2<f64>, labels: Vec<String>) -> Self {
        Trajectory { times, states, labels }
    }

    /// Output time points
    pub fn times(&self) -> &Array1<f64> {
        &self.times
    }

    /// State matrix, rows are time points
    pub fn states(&self) -> &Array2<f64> {
        &self.states
    }

    /// Number of time points
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Names of the state variables
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// State at the `i`th time point
    pub fn state_at(&self, i: usize) -> Option<ArrayView1<f64>> {
        if i < self.len() {
            Some(self.states.row(i))
        } else {
            None
        }
    }

    /// State at the last time point
    pub fn last_state(&self) -> Option<ArrayView1<f64>> {
        self.len().checked_sub(1).and_then(|i| self.state_at(i))
    }

    /// Values of one state variable over time
    pub fn column(&self, index: usize) -> Option<ArrayView1<f64>> {
        if index < self.states.ncols() {
            Some(self.states.column(index))
        } else {
            None
        }
    }

    /// Values of the state variable with the given name over time
    pub fn column_by_label(&self, label: &str) -> Option<ArrayView1<f64>> {
        self.labels.iter()
            .position(|i| i == label)
            .and_then(|i| self.column(i))
    }

    /// Writes the trajectory as csv with a `time,<labels>` header
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), ConfigError> {
        let mut writer = csv::Writer::from_writer(writer);

        writer.write_record(std::iter::once("time").chain(self.labels.iter().map(|i| i.as_str())))?;
        for (t, row) in self.times.iter().zip(self.states.rows()) {
            writer.write_record(
                std::iter::once(t.to_string()).chain(row.iter().map(|i| i.to_string()))
            )?;
        }
        writer.flush()?;

        Ok(())
    }

    /// Writes the trajectory to a csv file
    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let file = File::create(path)?;

        self.write_csv(file)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{array, Array1};
    use super::Trajectory;


    fn example() -> Trajectory {
        Trajectory::new(
            Array1::from(vec![0., 0.5]),
            array![[1., -2.], [0.25, 3.]],
            vec![String::from("V_m"), String::from("n")],
        )
    }

    #[test]
    fn test_accessors() {
        let trajectory = example();

        assert_eq!(trajectory.len(), 2);
        assert!(!trajectory.is_empty());
        assert_eq!(trajectory.column_by_label("n").unwrap().to_vec(), vec![-2., 3.]);
        assert!(trajectory.column_by_label("h").is_none());
        assert_eq!(trajectory.last_state().unwrap().to_vec(), vec![0.25, 3.]);
        assert!(trajectory.state_at(2).is_none());
        assert!(trajectory.column(2).is_none());
    }

    #[test]
    fn test_csv_output() {
        let mut buffer = vec![];
        example().write_csv(&mut buffer).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "time,V_m,n\n0,1,-2\n0.5,0.25,3\n");
    }
}
