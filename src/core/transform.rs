use std::{fmt, sync::Arc};

use crate::error::TransformError;

/// Result of applying a transform to a present cell.
pub type TransformResult = Result<String, TransformError>;

/// A pure function applied to one cell while decoding or encoding.
///
/// Transforms only ever see present values: an absent (empty) cell short-circuits the whole
/// [`TransformChain`] and stays absent.
pub trait CellTransform: Send + Sync {
    fn apply(&self, value: String) -> TransformResult;
}

impl<F> CellTransform for F
where
    F: Fn(String) -> TransformResult + Send + Sync,
{
    fn apply(&self, value: String) -> TransformResult {
        self(value)
    }
}

/// Upper-cases the cell.
#[derive(Debug, Default, Clone, Copy)]
pub struct UpperCase;

impl CellTransform for UpperCase {
    fn apply(&self, value: String) -> TransformResult {
        Ok(value.to_uppercase())
    }
}

/// Lower-cases the cell.
#[derive(Debug, Default, Clone, Copy)]
pub struct LowerCase;

impl CellTransform for LowerCase {
    fn apply(&self, value: String) -> TransformResult {
        Ok(value.to_lowercase())
    }
}

/// Removes surrounding whitespace.
#[derive(Debug, Default, Clone, Copy)]
pub struct Trim;

impl CellTransform for Trim {
    fn apply(&self, value: String) -> TransformResult {
        Ok(value.trim().to_string())
    }
}

/// Ordered list of transforms applied left to right to a single column.
///
/// An empty chain is the identity ("optional" column).
///
/// # Examples
///
/// ```
/// use warehouse_csv::core::transform::{TransformChain, Trim, UpperCase};
///
/// let chain = TransformChain::new().then(Trim).then(UpperCase);
/// assert_eq!(chain.execute(Some(" ek12 ".to_string())).unwrap(), Some("EK12".to_string()));
/// assert_eq!(chain.execute(None).unwrap(), None);
/// ```
#[derive(Clone, Default)]
pub struct TransformChain {
    steps: Vec<Arc<dyn CellTransform>>,
}

impl TransformChain {
    /// The identity chain.
    pub fn new() -> Self {
        TransformChain { steps: Vec::new() }
    }

    /// A chain with a single step.
    pub fn of<T: CellTransform + 'static>(transform: T) -> Self {
        TransformChain::new().then(transform)
    }

    /// Appends a transform to the end of the chain.
    pub fn then<T: CellTransform + 'static>(mut self, transform: T) -> Self {
        self.steps.push(Arc::new(transform));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Runs the chain. `None` passes through without invoking any step.
    pub fn execute(&self, value: Option<String>) -> Result<Option<String>, TransformError> {
        let Some(mut value) = value else {
            return Ok(None);
        };
        for step in &self.steps {
            value = step.apply(value)?;
        }
        Ok(Some(value))
    }
}

impl fmt::Debug for TransformChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformChain")
            .field("steps", &self.steps.len())
            .finish()
    }
}
