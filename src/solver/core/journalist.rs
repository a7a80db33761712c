//! Leveled, categorized text output.
//!
//! All solver printing is routed through a [`Journalist`] so that output
//! can be silenced, raised per algorithm area, or redirected to an
//! arbitrary sink (e.g. a buffer in tests).  Printing is text only.

use crate::algebra::FloatT;
use std::cell::RefCell;
use std::io::Write;

/// Verbosity levels, in increasing order of detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PrintLevel {
    /// No output at all
    None,
    /// One line per iteration plus banner and exit summary
    Summary,
    /// Narrative of the algorithm decisions
    Detailed,
    /// Iterate-sized vectors
    Vector,
    /// Matrices
    Matrix,
    /// Working vectors of inner procedures
    MoreVector,
}

/// Output categories, each with an independently settable level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintCategory {
    Main,
    LineSearch,
    Initialization,
    SolvePdSystem,
    HessianApproximation,
}

const NUM_CATEGORIES: usize = 5;

impl PrintCategory {
    fn index(self) -> usize {
        match self {
            PrintCategory::Main => 0,
            PrintCategory::LineSearch => 1,
            PrintCategory::Initialization => 2,
            PrintCategory::SolvePdSystem => 3,
            PrintCategory::HessianApproximation => 4,
        }
    }
}

/// Text output sink with per-category verbosity.
pub struct Journalist {
    levels: [PrintLevel; NUM_CATEGORIES],
    out: RefCell<Box<dyn Write>>,
}

impl std::fmt::Debug for Journalist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Journalist")
            .field("levels", &self.levels)
            .finish()
    }
}

impl Journalist {
    /// A journalist writing to stdout at the given level for all
    /// categories.
    pub fn new(level: PrintLevel) -> Self {
        Self::with_writer(level, Box::new(std::io::stdout()))
    }

    /// A journalist writing to an arbitrary sink.
    pub fn with_writer(level: PrintLevel, out: Box<dyn Write>) -> Self {
        Self {
            levels: [level; NUM_CATEGORIES],
            out: RefCell::new(out),
        }
    }

    /// Raise or lower the level of a single category.
    pub fn set_category_level(&mut self, category: PrintCategory, level: PrintLevel) {
        self.levels[category.index()] = level;
    }

    /// True if a message at `level` in `category` would be printed.
    pub fn enabled(&self, level: PrintLevel, category: PrintCategory) -> bool {
        level <= self.levels[category.index()]
    }

    /// Print a formatted message.  Output errors are ignored; the solver
    /// never fails because a log sink is full.
    pub fn print(&self, level: PrintLevel, category: PrintCategory, args: std::fmt::Arguments) {
        if self.enabled(level, category) {
            let mut out = self.out.borrow_mut();
            let _ = out.write_fmt(args);
            let _ = out.flush();
        }
    }

    /// Print a named vector, one line, at the given level.
    pub fn print_vector<T: FloatT>(
        &self,
        level: PrintLevel,
        category: PrintCategory,
        name: &str,
        v: &[T],
    ) {
        if self.enabled(level, category) {
            let mut out = self.out.borrow_mut();
            let _ = write!(out, "{} = [", name);
            for (i, x) in v.iter().enumerate() {
                let sep = if i == 0 { "" } else { ", " };
                let _ = write!(out, "{}{:.16e}", sep, x);
            }
            let _ = writeln!(out, "]");
        }
    }
}

impl Default for Journalist {
    fn default() -> Self {
        Self::new(PrintLevel::Summary)
    }
}

/// Formatted print through a [`Journalist`], e.g.
/// `jprint!(jnlst, Detailed, LineSearch, "alpha = {:e}\n", α)`.
macro_rules! jprint {
    ($jnlst:expr, $lvl:ident, $cat:ident, $($arg:tt)*) => {
        $jnlst.print(
            $crate::solver::core::journalist::PrintLevel::$lvl,
            $crate::solver::core::journalist::PrintCategory::$cat,
            format_args!($($arg)*),
        )
    };
}
pub(crate) use jprint;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_gating() {
        let jnlst = Journalist::with_writer(PrintLevel::Summary, Box::new(Vec::<u8>::new()));
        assert!(jnlst.enabled(PrintLevel::Summary, PrintCategory::Main));
        assert!(!jnlst.enabled(PrintLevel::Detailed, PrintCategory::Main));
        assert!(!jnlst.enabled(PrintLevel::Vector, PrintCategory::LineSearch));
    }

    #[test]
    fn test_category_override() {
        let mut jnlst = Journalist::with_writer(PrintLevel::Summary, Box::new(Vec::<u8>::new()));
        jnlst.set_category_level(PrintCategory::LineSearch, PrintLevel::Vector);
        assert!(jnlst.enabled(PrintLevel::Vector, PrintCategory::LineSearch));
        assert!(!jnlst.enabled(PrintLevel::Vector, PrintCategory::Main));
    }
}
