//! Candidates: named implementations under comparison.
//!
//! Anything implementing [`Workload`] can be benchmarked. Closures are
//! adapted through [`Candidate::new`] and [`Candidate::fallible`].
//!
//! ```ignore
//! use rate_bench::Candidate;
//!
//! let candidate = Candidate::new("vec-push", || {
//!     let mut v = Vec::with_capacity(16);
//!     v.push(1u8);
//!     v
//! })
//! .with_setup(|| warm_cache())
//! .with_teardown(|| flush_cache());
//! ```

use std::fmt;
use std::hint::black_box;
use std::panic::{self, AssertUnwindSafe};

use tracing::warn;

use crate::error::BoxError;

/// The call-signature contract for a benchmark candidate.
///
/// `setup` and `teardown` run once per batch, outside the timed span.
pub trait Workload {
    /// Run one invocation of the operation being measured.
    fn invoke(&mut self) -> Result<(), BoxError>;

    /// Prepare resources before a batch.
    fn setup(&mut self) -> Result<(), BoxError> {
        Ok(())
    }

    /// Release resources after a batch.
    fn teardown(&mut self) -> Result<(), BoxError> {
        Ok(())
    }
}

/// Adapter for an infallible closure; its return value is passed through `black_box`.
pub struct FnWorkload<F>(F);

impl<F, T> Workload for FnWorkload<F>
where
    F: FnMut() -> T,
{
    #[inline]
    fn invoke(&mut self) -> Result<(), BoxError> {
        black_box((self.0)());
        Ok(())
    }
}

/// Adapter for a closure returning `Result`.
pub struct FallibleWorkload<F>(F);

impl<F, T, E> Workload for FallibleWorkload<F>
where
    F: FnMut() -> Result<T, E>,
    E: Into<BoxError>,
{
    #[inline]
    fn invoke(&mut self) -> Result<(), BoxError> {
        match (self.0)() {
            Ok(value) => {
                black_box(value);
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }
}

type Hook<'a> = Box<dyn FnMut() -> Result<(), BoxError> + 'a>;

/// A named workload plus optional per-batch hooks.
pub struct Candidate<'a> {
    name: String,
    workload: Box<dyn Workload + 'a>,
    setup: Option<Hook<'a>>,
    teardown: Option<Hook<'a>>,
}

impl<'a> Candidate<'a> {
    /// Candidate from an infallible closure.
    pub fn new<F, T>(name: impl Into<String>, work: F) -> Self
    where
        F: FnMut() -> T + 'a,
    {
        Self::from_workload(name, FnWorkload(work))
    }

    /// Candidate from a closure whose errors abort the candidate's run.
    pub fn fallible<F, T, E>(name: impl Into<String>, work: F) -> Self
    where
        F: FnMut() -> Result<T, E> + 'a,
        E: Into<BoxError>,
    {
        Self::from_workload(name, FallibleWorkload(work))
    }

    /// Candidate from any [`Workload`] implementation.
    pub fn from_workload<W>(name: impl Into<String>, workload: W) -> Self
    where
        W: Workload + 'a,
    {
        Self {
            name: name.into(),
            workload: Box::new(workload),
            setup: None,
            teardown: None,
        }
    }

    /// Attach a setup hook run once before each batch.
    pub fn with_setup<F>(mut self, mut setup: F) -> Self
    where
        F: FnMut() + 'a,
    {
        self.setup = Some(Box::new(move || -> Result<(), BoxError> {
            setup();
            Ok(())
        }));
        self
    }

    /// Attach a fallible setup hook.
    pub fn with_fallible_setup<F, E>(mut self, mut setup: F) -> Self
    where
        F: FnMut() -> Result<(), E> + 'a,
        E: Into<BoxError>,
    {
        self.setup = Some(Box::new(move || -> Result<(), BoxError> {
            setup().map_err(Into::into)
        }));
        self
    }

    /// Attach a teardown hook run once after each batch, even if the batch failed.
    pub fn with_teardown<F>(mut self, mut teardown: F) -> Self
    where
        F: FnMut() + 'a,
    {
        self.teardown = Some(Box::new(move || -> Result<(), BoxError> {
            teardown();
            Ok(())
        }));
        self
    }

    /// Attach a fallible teardown hook.
    pub fn with_fallible_teardown<F, E>(mut self, mut teardown: F) -> Self
    where
        F: FnMut() -> Result<(), E> + 'a,
        E: Into<BoxError>,
    {
        self.teardown = Some(Box::new(move || -> Result<(), BoxError> {
            teardown().map_err(Into::into)
        }));
        self
    }

    /// The candidate's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the setup hook, then the workload's setup.
    ///
    /// If the workload's setup fails or panics after the hook succeeded, the
    /// teardown hook runs before the failure propagates.
    pub(crate) fn setup(&mut self) -> Result<(), BoxError> {
        let hooked = match self.setup.as_mut() {
            Some(hook) => {
                hook()?;
                true
            }
            None => false,
        };
        let workload = &mut self.workload;
        match panic::catch_unwind(AssertUnwindSafe(|| workload.setup())) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => {
                if hooked {
                    self.release_setup_hook();
                }
                Err(err)
            }
            Err(payload) => {
                if hooked {
                    self.release_setup_hook();
                }
                panic::resume_unwind(payload)
            }
        }
    }

    fn release_setup_hook(&mut self) {
        if let Some(Err(err)) = self.teardown.as_mut().map(|hook| hook()) {
            warn!(candidate = %self.name, error = %err, "teardown hook failed after setup error");
        }
    }

    #[inline]
    pub(crate) fn invoke(&mut self) -> Result<(), BoxError> {
        self.workload.invoke()
    }

    /// Run the workload's teardown, then the teardown hook. The first error wins.
    pub(crate) fn teardown(&mut self) -> Result<(), BoxError> {
        let result = self.workload.teardown();
        let hook_result = match self.teardown.as_mut() {
            Some(hook) => hook(),
            None => Ok(()),
        };
        match (result, hook_result) {
            (Err(first), Err(second)) => {
                warn!(candidate = %self.name, error = %second, "teardown hook also failed");
                Err(first)
            }
            (Err(err), Ok(())) | (Ok(()), Err(err)) => Err(err),
            (Ok(()), Ok(())) => Ok(()),
        }
    }
}

impl fmt::Debug for Candidate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Candidate")
            .field("name", &self.name)
            .field("setup", &self.setup.is_some())
            .field("teardown", &self.teardown.is_some())
            .finish_non_exhaustive()
    }
}
