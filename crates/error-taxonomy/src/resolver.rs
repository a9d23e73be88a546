// Causing-error resolver
// Flattens chains and aggregates of errors down to their leaf (causing) errors

use std::error::Error as StdError;
use std::fmt;

use tracing::{trace, warn};

use crate::aggregate::{probe_aggregate, unwrap_shared, AggregateError, AggregateProbe, TaskFailures};
use crate::config::TaxonomyConfig;
use crate::error::{ResolveError, Result};
use crate::taxonomy::LocalizableError;

//-----------------------------------------------------------------------------
// Roots
//-----------------------------------------------------------------------------

/// Anything that can be the (possibly absent) root of a resolution
pub trait ErrorRoot<'a> {
    fn into_root(self) -> Option<&'a (dyn StdError + 'static)>;
}

impl<'a, E> ErrorRoot<'a> for &'a E
where
    E: StdError + 'static,
{
    fn into_root(self) -> Option<&'a (dyn StdError + 'static)> {
        Some(self as &(dyn StdError + 'static))
    }
}

impl<'a> ErrorRoot<'a> for &'a (dyn StdError + 'static) {
    fn into_root(self) -> Option<&'a (dyn StdError + 'static)> {
        Some(self)
    }
}

impl<'a> ErrorRoot<'a> for &'a (dyn StdError + Send + Sync + 'static) {
    fn into_root(self) -> Option<&'a (dyn StdError + 'static)> {
        Some(self as &(dyn StdError + 'static))
    }
}

impl<'a, R> ErrorRoot<'a> for Option<R>
where
    R: ErrorRoot<'a>,
{
    fn into_root(self) -> Option<&'a (dyn StdError + 'static)> {
        self.and_then(ErrorRoot::into_root)
    }
}

//-----------------------------------------------------------------------------
// Lookup results
//-----------------------------------------------------------------------------

/// Outcome of a single-result query over the causing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CausingLookup<T> {
    /// No causing error exists
    NotFound,
    /// Exactly one causing error exists
    Found(T),
    /// Two or more causing errors exist; none is picked
    Ambiguous(usize),
}

impl<T> CausingLookup<T> {
    pub fn from_vec(mut items: Vec<T>) -> Self {
        match items.len() {
            0 => CausingLookup::NotFound,
            1 => items
                .pop()
                .map_or(CausingLookup::NotFound, CausingLookup::Found),
            count => CausingLookup::Ambiguous(count),
        }
    }

    /// Number of causing errors behind this lookup
    pub fn count(&self) -> usize {
        match self {
            CausingLookup::NotFound => 0,
            CausingLookup::Found(_) => 1,
            CausingLookup::Ambiguous(count) => *count,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, CausingLookup::Found(_))
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, CausingLookup::Ambiguous(_))
    }

    pub fn found(self) -> Option<T> {
        match self {
            CausingLookup::Found(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U, F>(self, f: F) -> CausingLookup<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            CausingLookup::NotFound => CausingLookup::NotFound,
            CausingLookup::Found(value) => CausingLookup::Found(f(value)),
            CausingLookup::Ambiguous(count) => CausingLookup::Ambiguous(count),
        }
    }
}

//-----------------------------------------------------------------------------
// Resolver
//-----------------------------------------------------------------------------

/// Resolves the causing errors of an error.
///
/// An error is aggregate-shaped when one of the resolver's probes recognizes
/// it. [`TaskFailures`] and the aggregate kinds of [`LocalizableError`] are
/// recognized out of the box; further types are added with
/// [`Resolver::with_aggregate`].
#[derive(Clone)]
pub struct Resolver {
    probes: Vec<AggregateProbe>,
    max_depth: Option<usize>,
}

impl Resolver {
    pub fn new() -> Self {
        Self {
            probes: vec![
                probe_aggregate::<TaskFailures> as AggregateProbe,
                probe_aggregate::<LocalizableError> as AggregateProbe,
            ],
            max_depth: None,
        }
    }

    pub fn from_config(config: &TaxonomyConfig) -> Self {
        Self::new().with_max_depth(config.max_depth)
    }

    /// Treat errors of type `T` as aggregates
    pub fn with_aggregate<T>(mut self) -> Self
    where
        T: StdError + AggregateError + 'static,
    {
        self.probes.push(probe_aggregate::<T>);
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// The aggregate view of `error`, if any probe recognizes it
    pub fn aggregate_of<'a>(
        &self,
        error: &'a (dyn StdError + 'static),
    ) -> Option<&'a dyn AggregateError> {
        let error = unwrap_shared(error);
        self.probes.iter().find_map(|probe| probe(error))
    }

    pub fn is_aggregate(&self, error: &(dyn StdError + 'static)) -> bool {
        self.aggregate_of(error).is_some()
    }

    /// Leaf errors of `root` in depth-first, left-to-right order.
    ///
    /// Empty when the root is absent, or has neither a source nor aggregate
    /// members. The same leaf appears once per path that reaches it. Cycles
    /// and depth overruns are logged and the offending branch is skipped.
    pub fn causing_errors<'a>(&self, root: impl ErrorRoot<'a>) -> Vec<&'a (dyn StdError + 'static)> {
        match self.resolve(root.into_root(), false) {
            Ok(causes) => causes,
            Err(error) => {
                // lenient walks never fail
                warn!(%error, "Unexpected failure in lenient resolution");
                Vec::new()
            }
        }
    }

    /// Like [`causing_errors`](Self::causing_errors) but fails on cycles and depth overruns
    pub fn checked_causing_errors<'a>(
        &self,
        root: impl ErrorRoot<'a>,
    ) -> Result<Vec<&'a (dyn StdError + 'static)>> {
        self.resolve(root.into_root(), true)
    }

    /// The causing error, only when there is exactly one
    pub fn try_causing_error<'a>(&self, root: impl ErrorRoot<'a>) -> Option<&'a (dyn StdError + 'static)> {
        self.lookup_causing_error(root).found()
    }

    /// Single-result query that also reports how many causing errors exist
    pub fn lookup_causing_error<'a>(
        &self,
        root: impl ErrorRoot<'a>,
    ) -> CausingLookup<&'a (dyn StdError + 'static)> {
        CausingLookup::from_vec(self.causing_errors(root))
    }

    pub fn causing_error_count<'a>(&self, root: impl ErrorRoot<'a>) -> usize {
        self.causing_errors(root).len()
    }

    fn resolve<'a>(
        &self,
        root: Option<&'a (dyn StdError + 'static)>,
        strict: bool,
    ) -> Result<Vec<&'a (dyn StdError + 'static)>> {
        let Some(root) = root.map(unwrap_shared) else {
            return Ok(Vec::new());
        };
        if root.source().is_none() && !self.is_aggregate(root) {
            return Ok(Vec::new());
        }

        let mut walk = Walk {
            resolver: self,
            strict,
            ancestors: Vec::new(),
            causes: Vec::new(),
        };
        walk.flatten(root)?;
        trace!(count = walk.causes.len(), "Resolved causing errors");
        Ok(walk.causes)
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("probes", &self.probes.len())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

/// State of one depth-first walk
struct Walk<'r, 'a> {
    resolver: &'r Resolver,
    strict: bool,
    /// Errors on the path from the root to the current node
    ancestors: Vec<*const (dyn StdError + 'static)>,
    causes: Vec<&'a (dyn StdError + 'static)>,
}

impl<'r, 'a> Walk<'r, 'a> {
    fn flatten(&mut self, node: &'a (dyn StdError + 'static)) -> Result<()> {
        let node = unwrap_shared(node);
        let depth = self.ancestors.len();
        if let Some(limit) = self.resolver.max_depth {
            if depth >= limit {
                return self.truncate(ResolveError::DepthExceeded { limit });
            }
        }

        let address = node as *const (dyn StdError + 'static);
        if self
            .ancestors
            .iter()
            .any(|ancestor| std::ptr::eq(*ancestor, address))
        {
            return self.truncate(ResolveError::InvalidStructure { depth });
        }

        if let Some(aggregate) = self.resolver.aggregate_of(node) {
            self.ancestors.push(address);
            let result = aggregate
                .inner_errors()
                .into_iter()
                .try_for_each(|member| self.flatten(member));
            self.ancestors.pop();
            return result;
        }

        match node.source() {
            None => {
                self.causes.push(node);
                Ok(())
            }
            Some(cause) => {
                self.ancestors.push(address);
                let result = self.flatten(cause);
                self.ancestors.pop();
                result
            }
        }
    }

    fn truncate(&self, error: ResolveError) -> Result<()> {
        if self.strict {
            return Err(error);
        }
        warn!(%error, "Skipping branch while resolving causing errors");
        Ok(())
    }
}
