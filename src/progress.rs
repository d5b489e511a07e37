//! Progress indication boundary consumed during readiness waits and tunnel
//! handoff.

use std::io::{self, Write};

/// Receives begin/end notifications around long-running phases.
///
/// Calls are issued in matched pairs; [`ProgressGuard`] guarantees the `end`
/// half on every exit path, including early returns and errors.
pub trait ProgressIndicator {
    /// Marks the start of a phase described by `label`.
    fn begin(&self, label: &str);
    /// Marks the end of the most recently begun phase.
    fn end(&self);
}

/// Indicator that renders nothing; the library default and the test choice.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentProgress;

impl ProgressIndicator for SilentProgress {
    fn begin(&self, _label: &str) {}
    fn end(&self) {}
}

/// Indicator that writes phase labels to stderr for interactive runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct StderrProgress;

impl ProgressIndicator for StderrProgress {
    fn begin(&self, label: &str) {
        writeln!(io::stderr(), "{label}...").ok();
    }

    fn end(&self) {}
}

/// Scope guard pairing [`ProgressIndicator::begin`] with
/// [`ProgressIndicator::end`] on drop.
#[derive(Debug)]
pub struct ProgressGuard<'a, P>
where
    P: ProgressIndicator + ?Sized,
{
    indicator: &'a P,
}

impl<'a, P> ProgressGuard<'a, P>
where
    P: ProgressIndicator + ?Sized,
{
    /// Begins a phase and returns a guard that ends it when dropped.
    #[must_use]
    pub fn begin(indicator: &'a P, label: &str) -> Self {
        indicator.begin(label);
        Self { indicator }
    }
}

impl<P> Drop for ProgressGuard<'_, P>
where
    P: ProgressIndicator + ?Sized,
{
    fn drop(&mut self) {
        self.indicator.end();
    }
}
