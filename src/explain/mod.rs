//! Uncertainty-aware explanation evaluation.
//!
//! Monte Carlo dropout scores each note, three token rankings (local
//! attribution, domain focus, random) are traced through deletion curves, and
//! the curves are averaged per strategy. Lower area under the curve means the
//! ranking found tokens the classifier actually relies on.

pub mod aggregate;
pub mod deletion;
pub mod lime;
pub mod pipeline;
pub mod plot;
pub mod ranking;
pub mod uncertainty;

pub use aggregate::{aggregate, AggregateCurve};
pub use deletion::{deletion_curve, mask_text, CurvePoint, DeletionCurve};
pub use pipeline::{run_explanation, ExplanationReport, ScoredInstance};
pub use ranking::{RankedToken, Strategy, TokenRanking};
pub use uncertainty::{estimate_uncertainty, Uncertainty};
