//! Element-wise averaging of per-instance deletion curves.

use serde::Serialize;

use super::{
    deletion::{CurvePoint, DeletionCurve},
    ranking::Strategy,
};
use crate::error::{LosError, Result};

/// Mean curve of one strategy across the explained instances.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateCurve {
    pub strategy: Strategy,
    pub instances: usize,
    pub curve: DeletionCurve,
    pub auc: f64,
}

/// Flat row of `deletion_aggregate.csv`.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateRow {
    pub strategy: Strategy,
    pub fraction: f64,
    pub mean_probability: f64,
    pub auc: f64,
    pub instances: usize,
}

/// Equal-weight mean over curves sharing one fraction grid.
pub fn mean_curve(curves: &[DeletionCurve]) -> Result<DeletionCurve> {
    let first = curves.first().ok_or(LosError::EmptyDataset)?;
    let grid = first.fractions();
    if curves.iter().any(|c| c.fractions() != grid) {
        return Err(LosError::InvalidConfig(
            "deletion curves use different fraction grids".into(),
        ));
    }
    let n = curves.len() as f64;
    let points = grid
        .iter()
        .enumerate()
        .map(|(idx, &fraction)| CurvePoint {
            fraction,
            probability: curves.iter().map(|c| c.points[idx].probability).sum::<f64>() / n,
        })
        .collect();
    Ok(DeletionCurve { points })
}

/// Mean curve and its area for one strategy.
pub fn aggregate(strategy: Strategy, curves: &[DeletionCurve]) -> Result<AggregateCurve> {
    let curve = mean_curve(curves)?;
    let auc = curve.auc();
    Ok(AggregateCurve {
        strategy,
        instances: curves.len(),
        curve,
        auc,
    })
}

impl AggregateCurve {
    pub fn rows(&self) -> Vec<AggregateRow> {
        self.curve
            .points
            .iter()
            .map(|p| AggregateRow {
                strategy: self.strategy,
                fraction: p.fraction,
                mean_probability: p.probability,
                auc: self.auc,
                instances: self.instances,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve(probs: &[f64]) -> DeletionCurve {
        let grid = [0.0, 0.5, 1.0];
        DeletionCurve {
            points: grid
                .iter()
                .zip(probs)
                .map(|(&fraction, &probability)| CurvePoint {
                    fraction,
                    probability,
                })
                .collect(),
        }
    }

    #[test]
    fn averages_pointwise() {
        let agg = aggregate(Strategy::Random, &[curve(&[1.0, 0.5, 0.0]), curve(&[0.8, 0.7, 0.2])])
            .unwrap();
        for (got, want) in agg.curve.probabilities().iter().zip([0.9, 0.6, 0.1]) {
            assert!((got - want).abs() < 1e-12);
        }
        assert!((agg.auc - 0.55).abs() < 1e-12);
        assert_eq!(agg.rows().len(), 3);
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(
            aggregate(Strategy::Focus, &[]),
            Err(LosError::EmptyDataset)
        ));
    }
}
