//! Binary confusion matrix with `yes` as the positive class.

use std::fmt;

use campaign_io::Subscribed;

use crate::EvalError;

/// Counts of the four prediction outcomes, relative to `yes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfusionMatrix {
    tp: usize,
    fp: usize,
    tn: usize,
    fn_: usize,
}

impl ConfusionMatrix {
    /// Create a matrix from explicit counts.
    #[must_use]
    pub fn new(tp: usize, fp: usize, tn: usize, fn_: usize) -> Self {
        Self { tp, fp, tn, fn_ }
    }

    /// Cross-tabulate predicted against true class indices (`0` = no,
    /// `1` = yes), aligned by position.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`EvalError::LabelMismatch`] | Slices differ in length |
    /// | [`EvalError::EmptyPredictions`] | Zero rows |
    /// | [`EvalError::UnknownLabel`] | A value outside `{0, 1}` |
    pub fn from_labels(predicted: &[usize], actual: &[usize]) -> Result<Self, EvalError> {
        if predicted.len() != actual.len() {
            return Err(EvalError::LabelMismatch {
                n_predictions: predicted.len(),
                n_labels: actual.len(),
            });
        }
        if predicted.is_empty() {
            return Err(EvalError::EmptyPredictions);
        }

        let mut cm = Self::new(0, 0, 0, 0);
        for (row_index, (&p, &a)) in predicted.iter().zip(actual).enumerate() {
            match Subscribed::from_index(p).zip(Subscribed::from_index(a)) {
                Some((Subscribed::Yes, Subscribed::Yes)) => cm.tp += 1,
                Some((Subscribed::Yes, Subscribed::No)) => cm.fp += 1,
                Some((Subscribed::No, Subscribed::No)) => cm.tn += 1,
                Some((Subscribed::No, Subscribed::Yes)) => cm.fn_ += 1,
                None => {
                    return Err(EvalError::UnknownLabel {
                        row_index,
                        label: if p > 1 { p } else { a },
                    });
                }
            }
        }
        Ok(cm)
    }

    /// Cross-tabulate typed labels.
    ///
    /// # Errors
    ///
    /// Same as [`ConfusionMatrix::from_labels`], minus `UnknownLabel`.
    pub fn from_subscribed(
        predicted: &[Subscribed],
        actual: &[Subscribed],
    ) -> Result<Self, EvalError> {
        let predicted: Vec<usize> = predicted.iter().map(|l| l.index()).collect();
        let actual: Vec<usize> = actual.iter().map(|l| l.index()).collect();
        Self::from_labels(&predicted, &actual)
    }

    /// Predicted yes, actually yes.
    #[must_use]
    pub fn tp(&self) -> usize {
        self.tp
    }

    /// Predicted yes, actually no.
    #[must_use]
    pub fn fp(&self) -> usize {
        self.fp
    }

    /// Predicted no, actually no.
    #[must_use]
    pub fn tn(&self) -> usize {
        self.tn
    }

    /// Predicted no, actually yes.
    #[must_use]
    pub fn fn_(&self) -> usize {
        self.fn_
    }

    /// Total number of rows tabulated.
    #[must_use]
    pub fn total(&self) -> usize {
        self.tp + self.fp + self.tn + self.fn_
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>10} {:>8} {:>8}", "", "pred_no", "pred_yes")?;
        writeln!(f, "{:>10} {:>8} {:>8}", "actual_no", self.tn, self.fp)?;
        writeln!(f, "{:>10} {:>8} {:>8}", "actual_yes", self.fn_, self.tp)
    }
}
