//! Chord-to-key assignments and the assignment table.

use crate::models::{KeyPressList, Twiddle};
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// One key list and every twiddle that produces it.
///
/// # Validation
///
/// - At least one twiddle
/// - The key list is non-empty (enforced by `KeyPressList`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    twiddles: Vec<Twiddle>,
    keys: KeyPressList,
}

impl Assignment {
    /// Creates an assignment for a single twiddle.
    #[must_use]
    pub fn new(twiddle: Twiddle, keys: KeyPressList) -> Self {
        Self {
            twiddles: vec![twiddle],
            keys,
        }
    }

    /// Creates an assignment shared by several twiddles.
    pub fn with_twiddles(twiddles: Vec<Twiddle>, keys: KeyPressList) -> Result<Self> {
        if twiddles.is_empty() {
            anyhow::bail!("An assignment needs at least one twiddle (keys: {keys})");
        }
        Ok(Self { twiddles, keys })
    }

    /// Number of twiddles producing this key list.
    #[must_use]
    pub fn twiddle_count(&self) -> usize {
        self.twiddles.len()
    }

    /// Twiddle at `index`.
    #[must_use]
    pub fn twiddle(&self, index: usize) -> Option<Twiddle> {
        self.twiddles.get(index).copied()
    }

    /// All twiddles in order.
    #[must_use]
    pub fn twiddles(&self) -> &[Twiddle] {
        &self.twiddles
    }

    /// The emitted key list.
    #[must_use]
    pub const fn keys(&self) -> &KeyPressList {
        &self.keys
    }

    /// Parses an assignment line: `TWIDDLE [TWIDDLE ...] = KEY [KEY ...]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use twiddlecfg::models::Assignment;
    ///
    /// let asg = Assignment::parse_line("L000 0L00 = Ctrl+c").unwrap();
    /// assert_eq!(asg.twiddle_count(), 2);
    /// assert_eq!(asg.keys().len(), 1);
    /// ```
    pub fn parse_line(line: &str) -> Result<Self> {
        let (lhs, rhs) = line
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("Missing '=' in assignment line: {line}"))?;

        let twiddles = lhs
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<Vec<Twiddle>>>()?;
        let keys: KeyPressList = rhs
            .parse()
            .with_context(|| format!("Invalid keys in assignment line: {line}"))?;

        Self::with_twiddles(twiddles, keys)
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for twiddle in &self.twiddles {
            write!(f, "{twiddle} ")?;
        }
        write!(f, "= {}", self.keys)
    }
}

/// Two assignments claiming the same twiddle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Remap {
    /// The contested twiddle
    pub twiddle: Twiddle,
    /// Keys of the assignment that claimed the twiddle first
    pub first: KeyPressList,
    /// Keys of the later assignment that claims it again
    pub second: KeyPressList,
}

impl fmt::Display for Remap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} is assigned both '{}' and '{}'",
            self.twiddle, self.first, self.second
        )
    }
}

/// Ordered assignment table.
///
/// No two assignments should claim the same twiddle. The table does not
/// enforce this on insertion; [`Assignments::remaps`] reports every collision
/// so callers can surface them after loading and before saving.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Assignments {
    items: Vec<Assignment>,
}

impl Assignments {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an assignment.
    pub fn push(&mut self, assignment: Assignment) {
        self.items.push(assignment);
    }

    /// Number of assignments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over assignments in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Assignment> {
        self.items.iter()
    }

    /// Total number of twiddles across all assignments.
    #[must_use]
    pub fn twiddle_count(&self) -> usize {
        self.items.iter().map(Assignment::twiddle_count).sum()
    }

    /// Number of assignments whose key list needs the multi-key table.
    #[must_use]
    pub fn multi_key_count(&self) -> usize {
        self.items.iter().filter(|a| a.keys.is_multi()).count()
    }

    /// Every twiddle claimed more than once, in table order.
    #[must_use]
    pub fn remaps(&self) -> Vec<Remap> {
        let mut owners: HashMap<Twiddle, &KeyPressList> = HashMap::new();
        let mut remaps = Vec::new();

        for assignment in &self.items {
            for twiddle in &assignment.twiddles {
                if let Some(first) = owners.get(twiddle) {
                    remaps.push(Remap {
                        twiddle: *twiddle,
                        first: (*first).clone(),
                        second: assignment.keys.clone(),
                    });
                } else {
                    owners.insert(*twiddle, &assignment.keys);
                }
            }
        }

        remaps
    }

    /// Whether any twiddle is claimed more than once.
    #[must_use]
    pub fn is_remap(&self) -> bool {
        !self.remaps().is_empty()
    }

    /// Human-readable collision report for `label` (usually a file path).
    #[must_use]
    pub fn report_remaps(&self, label: &str) -> String {
        let remaps = self.remaps();
        let mut report = format!("{} remapped twiddle(s) in {label}:", remaps.len());
        for remap in &remaps {
            report.push_str(&format!("\n  {remap}"));
        }
        report
    }

    /// Flattened (twiddle, keys) pairs sorted by twiddle then keys.
    #[must_use]
    pub fn mappings(&self) -> Vec<(Twiddle, KeyPressList)> {
        let mut pairs: Vec<(Twiddle, KeyPressList)> = self
            .items
            .iter()
            .flat_map(|a| a.twiddles.iter().map(|t| (*t, a.keys.clone())))
            .collect();
        pairs.sort();
        pairs
    }

    /// Whether both tables map the same twiddles to the same keys, ignoring
    /// order and how twiddles are grouped into assignments.
    #[must_use]
    pub fn same_mappings(&self, other: &Self) -> bool {
        self.mappings() == other.mappings()
    }
}

impl<'a> IntoIterator for &'a Assignments {
    type Item = &'a Assignment;
    type IntoIter = std::slice::Iter<'a, Assignment>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl FromIterator<Assignment> for Assignments {
    fn from_iter<I: IntoIterator<Item = Assignment>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Assignments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for assignment in &self.items {
            writeln!(f, "{assignment}")?;
        }
        Ok(())
    }
}
