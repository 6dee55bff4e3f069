//! Scoring helpers for predicted labels.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::MetricsError;

fn check_lengths(truth: &[String], predicted: &[String]) -> Result<(), MetricsError> {
    if truth.len() != predicted.len() {
        return Err(MetricsError::LengthMismatch {
            truth: truth.len(),
            predicted: predicted.len(),
        });
    }
    if truth.is_empty() {
        return Err(MetricsError::Empty);
    }
    Ok(())
}

/// Counts indexed `[true class][predicted class]`. Pairs whose labels are not
/// in `classes` are skipped.
pub fn confusion_matrix(
    truth: &[String],
    predicted: &[String],
    classes: &[String],
) -> Result<Vec<Vec<usize>>, MetricsError> {
    check_lengths(truth, predicted)?;
    let mut m = vec![vec![0usize; classes.len()]; classes.len()];
    let pos = |label: &String| classes.iter().position(|c| c == label);
    for (t, p) in truth.iter().zip(predicted) {
        if let (Some(i), Some(j)) = (pos(t), pos(p)) {
            m[i][j] += 1;
        }
    }
    Ok(m)
}

pub fn accuracy(truth: &[String], predicted: &[String]) -> Result<f64, MetricsError> {
    check_lengths(truth, predicted)?;
    let correct = truth.iter().zip(predicted).filter(|(t, p)| t == p).count();
    Ok(correct as f64 / truth.len() as f64)
}

/// Micro-averaged F1 over every class present in either sequence.
pub fn f1_micro(truth: &[String], predicted: &[String]) -> Result<f64, MetricsError> {
    check_lengths(truth, predicted)?;
    let classes = union_classes(truth, predicted);
    let m = confusion_matrix(truth, predicted, &classes)?;

    let tp: usize = (0..classes.len()).map(|k| m[k][k]).sum();
    let predicted_total: usize = m.iter().flatten().sum();
    let fp = predicted_total - tp;
    let fn_ = predicted_total - tp;

    let denom = 2 * tp + fp + fn_;
    if denom == 0 {
        return Ok(0.0);
    }
    Ok(2.0 * tp as f64 / denom as f64)
}

fn union_classes(truth: &[String], predicted: &[String]) -> Vec<String> {
    truth
        .iter()
        .chain(predicted)
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Confusion matrix plus summary scores for one evaluation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub classes: Vec<String>,
    pub confusion: Vec<Vec<usize>>,
    pub accuracy: f64,
    pub f1_micro: f64,
    pub samples: usize,
}

impl ClassificationReport {
    pub fn new(truth: &[String], predicted: &[String]) -> Result<Self, MetricsError> {
        let classes = union_classes(truth, predicted);
        Ok(Self {
            confusion: confusion_matrix(truth, predicted, &classes)?,
            accuracy: accuracy(truth, predicted)?,
            f1_micro: f1_micro(truth, predicted)?,
            samples: truth.len(),
            classes,
        })
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .classes
            .iter()
            .map(String::len)
            .max()
            .unwrap_or(0)
            .max(5);
        writeln!(f, "Confusion matrix (rows = truth, cols = predicted):")?;
        write!(f, "{:width$}", "")?;
        for c in &self.classes {
            write!(f, " {c:>width$}")?;
        }
        writeln!(f)?;
        for (c, row) in self.classes.iter().zip(&self.confusion) {
            write!(f, "{c:width$}")?;
            for n in row {
                write!(f, " {n:>width$}")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "Accuracy: {:.4}", self.accuracy)?;
        write!(f, "F1 score (micro): {:.4}", self.f1_micro)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn s(items: &[&str]) -> Vec<String> {
        items.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn confusion_rows_are_truth() {
        let truth = s(&["order", "order", "drone", "none"]);
        let pred = s(&["order", "drone", "drone", "order"]);
        let classes = s(&["drone", "none", "order"]);
        let m = confusion_matrix(&truth, &pred, &classes).unwrap();
        assert_eq!(m, vec![vec![1, 0, 0], vec![0, 0, 1], vec![1, 0, 1]]);
    }

    #[test]
    fn accuracy_and_micro_f1_agree_for_single_label() {
        let truth = s(&["a", "b", "b", "c", "a"]);
        let pred = s(&["a", "b", "c", "c", "b"]);
        assert_relative_eq!(accuracy(&truth, &pred).unwrap(), 0.6);
        assert_relative_eq!(f1_micro(&truth, &pred).unwrap(), 0.6);
    }

    #[test]
    fn report_collects_union_of_labels() {
        let truth = s(&["order", "drone"]);
        let pred = s(&["order", "inspection"]);
        let report = ClassificationReport::new(&truth, &pred).unwrap();
        assert_eq!(report.classes, s(&["drone", "inspection", "order"]));
        assert_eq!(report.samples, 2);
        assert_relative_eq!(report.accuracy, 0.5);
        let text = report.to_string();
        assert!(text.contains("Accuracy: 0.5000"));
    }

    #[test]
    fn mismatched_or_empty_inputs_fail() {
        assert_eq!(
            accuracy(&s(&["a"]), &s(&[])).unwrap_err(),
            MetricsError::LengthMismatch {
                truth: 1,
                predicted: 0
            }
        );
        assert_eq!(f1_micro(&[], &[]).unwrap_err(), MetricsError::Empty);
    }
}
