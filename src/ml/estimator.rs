//! Common interface of the pipeline stages.

use crate::dataset::Label;
use crate::error::Result;

/// A pipeline stage that can be fitted on data and then transform it.
///
/// Stateless stages (the normalizer) implement `fit` as a no-op and report
/// themselves as always fitted. Supervised stages require `labels`.
pub trait Estimator {
    /// What the stage consumes.
    type Input;
    /// What the stage produces.
    type Output;

    /// Learn the stage's state from `inputs` (and `labels` when supervised).
    fn fit(&mut self, inputs: &[Self::Input], labels: Option<&[Label]>) -> Result<()>;

    /// Apply the fitted stage to `inputs`, one output per input.
    fn transform(&self, inputs: &[Self::Input]) -> Result<Vec<Self::Output>>;

    /// Whether `fit` has been called successfully.
    fn is_fitted(&self) -> bool;

    /// Get the name of this stage.
    fn name(&self) -> &'static str;
}
