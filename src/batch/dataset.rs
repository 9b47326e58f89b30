//! batch::dataset — aligned expression matrices and batch requests.
//!
//! Gene identifiers are expected to be resolved upstream: a dataset maps
//! already-aligned names to value vectors sharing one time axis.
use crate::{
    batch::errors::PairFailureKind,
    data::{DataError, DataResult, PairedSeries},
};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// ExpressionDataset — one tissue / cohort: a time axis and gene series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionDataset {
    pub name: String,
    pub time: Array1<f64>,
    pub genes: BTreeMap<String, Array1<f64>>,
}

impl ExpressionDataset {
    pub fn new(name: impl Into<String>, time: Array1<f64>) -> Self {
        ExpressionDataset { name: name.into(), time, genes: BTreeMap::new() }
    }

    /// Add (or replace) a gene series.
    ///
    /// Errors
    /// ------
    /// - `DataError::LengthMismatch` if `values` does not match `time`.
    pub fn insert_gene(&mut self, gene: impl Into<String>, values: Array1<f64>) -> DataResult<()> {
        if values.len() != self.time.len() {
            return Err(DataError::LengthMismatch {
                field: "gene",
                expected: self.time.len(),
                actual: values.len(),
            });
        }
        self.genes.insert(gene.into(), values);
        Ok(())
    }

    pub fn with_gene(mut self, gene: impl Into<String>, values: Array1<f64>) -> DataResult<Self> {
        self.insert_gene(gene, values)?;
        Ok(self)
    }

    /// Check every stored gene against the time axis.
    pub fn validate(&self) -> DataResult<()> {
        if self.time.is_empty() {
            return Err(DataError::EmptySeries);
        }
        match self.genes.values().find(|v| v.len() != self.time.len()) {
            Some(v) => Err(DataError::LengthMismatch {
                field: "gene",
                expected: self.time.len(),
                actual: v.len(),
            }),
            None => Ok(()),
        }
    }

    /// Pair `target` with `clock` on this dataset's time axis.
    pub fn pair(&self, target: &str, clock: &str) -> Result<PairedSeries, PairFailureKind> {
        let (Some(t), Some(c)) = (self.genes.get(target), self.genes.get(clock)) else {
            return Err(PairFailureKind::MissingGene);
        };
        PairedSeries::new(self.time.clone(), t.clone(), c.clone())
            .map_err(|_| PairFailureKind::InvalidInput)
    }
}

/// How each pair's minimum phase p-value is additionally calibrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NullCalibration {
    /// FFT phase-randomized target surrogates (`surrogate_count` draws).
    Surrogate,
    /// Independent time shuffles (`permutation_iterations` draws).
    TimeShuffle,
}

/// BatchRequest — every (dataset × target × clock) combination to screen.
///
/// A gene is never paired with itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRequest {
    pub datasets: Vec<ExpressionDataset>,
    pub targets: Vec<String>,
    pub clocks: Vec<String>,
    #[serde(default)]
    pub calibration: Option<NullCalibration>,
}

impl BatchRequest {
    pub fn new(
        datasets: Vec<ExpressionDataset>, targets: Vec<String>, clocks: Vec<String>,
    ) -> Self {
        BatchRequest { datasets, targets, clocks, calibration: None }
    }

    pub fn with_calibration(mut self, calibration: NullCalibration) -> Self {
        self.calibration = Some(calibration);
        self
    }

    /// (dataset index, target, clock) jobs in deterministic order.
    pub(crate) fn jobs(&self) -> Vec<(usize, &str, &str)> {
        let mut jobs = Vec::new();
        for d in 0..self.datasets.len() {
            for target in &self.targets {
                for clock in &self.clocks {
                    if target != clock {
                        jobs.push((d, target.as_str(), clock.as_str()));
                    }
                }
            }
        }
        jobs
    }
}
