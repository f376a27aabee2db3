use std::collections::{BTreeSet, HashMap};

use tracing::{info, warn};

use crate::expression::Expression;
use crate::{normalize_identifier, EnrichError, EnrichResult};

/// The disjoint identifier sets of one analysis
///
/// All identifiers are lower-cased. The constructors guarantee that every
/// identifier belongs to exactly one category and that directional (up/down)
/// and unsigned changes are not mixed.
///
/// # Examples
///
/// ```
/// use binenrich::{Expression, ExpressionSets};
///
/// let sets = ExpressionSets::directional(
///     ["geneA", "geneB"],
///     ["geneC"],
///     ["geneA", "geneB", "geneC", "geneD"],
/// ).unwrap();
///
/// assert!(sets.is_directional());
/// assert_eq!(sets.get(Expression::Up).len(), 2);
/// // changed identifiers are removed from the background
/// assert_eq!(sets.get(Expression::Undetermined).len(), 1);
/// assert_eq!(sets.detected().len(), 4);
///
/// // without any changed identifier, there is nothing to test
/// assert!(ExpressionSets::directional(Vec::<&str>::new(), [], ["geneA"]).is_err());
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExpressionSets {
    up: BTreeSet<String>,
    down: BTreeSet<String>,
    diff: BTreeSet<String>,
    undetermined: BTreeSet<String>,
}

fn normalized<I, S>(identifiers: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    identifiers
        .into_iter()
        .map(|id| normalize_identifier(id.as_ref()))
        .filter(|id| !id.is_empty())
        .collect()
}

impl ExpressionSets {
    /// Builds the sets from up- and down-regulated identifiers
    ///
    /// All `background` identifiers that are neither up nor down are
    /// undetermined.
    ///
    /// # Errors
    ///
    /// [`EnrichError::InvalidInput`] if no identifier is changed or if an
    /// identifier is both up and down
    pub fn directional<U, D, B, S>(up: U, down: D, background: B) -> EnrichResult<Self>
    where
        U: IntoIterator<Item = S>,
        D: IntoIterator<Item = S>,
        B: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let up = normalized(up);
        let down = normalized(down);
        let undetermined = normalized(background)
            .into_iter()
            .filter(|id| !up.contains(id) && !down.contains(id))
            .collect();
        let sets = Self {
            up,
            down,
            diff: BTreeSet::new(),
            undetermined,
        };
        sets.validate()?;
        sets.require_changes()?;
        Ok(sets)
    }

    /// Builds the sets from changed identifiers without direction
    ///
    /// All `background` identifiers that are not changed are undetermined.
    ///
    /// # Errors
    ///
    /// [`EnrichError::InvalidInput`] if no identifier is changed
    pub fn unsigned<D, B, S>(diff: D, background: B) -> EnrichResult<Self>
    where
        D: IntoIterator<Item = S>,
        B: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let diff = normalized(diff);
        let undetermined = normalized(background)
            .into_iter()
            .filter(|id| !diff.contains(id))
            .collect();
        let sets = Self {
            up: BTreeSet::new(),
            down: BTreeSet::new(),
            diff,
            undetermined,
        };
        sets.require_changes()?;
        Ok(sets)
    }

    /// Builds the sets from the outcome of every single identifier
    ///
    /// This is the natural output of readers of differential expression
    /// results. An identifier may be listed several times, as long as the
    /// outcome is always the same.
    ///
    /// # Errors
    ///
    /// [`EnrichError::InvalidInput`] if an identifier has conflicting outcomes
    /// or if directional and unsigned outcomes are mixed
    ///
    /// # Examples
    ///
    /// ```
    /// use binenrich::{Expression, ExpressionSets};
    ///
    /// let sets = ExpressionSets::from_outcomes([
    ///     ("geneA", Expression::Up),
    ///     ("geneB", Expression::Undetermined),
    ///     ("geneA", Expression::Up),
    /// ]).unwrap();
    /// assert_eq!(sets.detected().len(), 2);
    ///
    /// assert!(ExpressionSets::from_outcomes([
    ///     ("geneA", Expression::Up),
    ///     ("GENEA", Expression::Down),
    /// ]).is_err());
    /// ```
    pub fn from_outcomes<I, S>(outcomes: I) -> EnrichResult<Self>
    where
        I: IntoIterator<Item = (S, Expression)>,
        S: AsRef<str>,
    {
        let mut seen: HashMap<String, Expression> = HashMap::new();
        let mut sets = Self::default();
        for (identifier, expression) in outcomes {
            let identifier = normalize_identifier(identifier.as_ref());
            if identifier.is_empty() {
                continue;
            }
            match seen.get(&identifier) {
                Some(previous) if *previous != expression => {
                    return Err(EnrichError::InvalidInput(format!(
                        "{identifier} is both {previous} and {expression}"
                    )));
                }
                Some(_) => continue,
                None => {
                    seen.insert(identifier.clone(), expression);
                    sets.get_mut(expression).insert(identifier);
                }
            }
        }
        sets.validate()?;
        Ok(sets)
    }

    /// Combines several analyses into a consensus
    ///
    /// An identifier is up (or down, or unsigned diff) if it shows this
    /// outcome in at least `min_prop` of the `runs` and does not show the
    /// same outcome in any of the `exclude` runs. All other identifiers that
    /// were detected in any of the `runs` are undetermined. Identifiers that
    /// qualify for more than one category are undetermined, too.
    ///
    /// Excluding runs is useful to test the unique part of a Venn diagram.
    ///
    /// # Errors
    ///
    /// - [`EnrichError::InvalidInput`] if `runs` is empty
    /// - [`EnrichError::InvalidConfig`] if `min_prop` is not in `(0, 1]`
    ///
    /// # Examples
    ///
    /// ```
    /// use binenrich::{Expression, ExpressionSets};
    ///
    /// let a = ExpressionSets::directional(["g1", "g2"], ["g3"], ["g4"]).unwrap();
    /// let b = ExpressionSets::directional(["g1"], ["g3", "g4"], ["g2"]).unwrap();
    ///
    /// let both = ExpressionSets::consensus(&[a.clone(), b.clone()], &[], 1.0).unwrap();
    /// assert_eq!(both.get(Expression::Up).iter().collect::<Vec<_>>(), vec!["g1"]);
    /// assert_eq!(both.get(Expression::Down).iter().collect::<Vec<_>>(), vec!["g3"]);
    /// assert_eq!(both.get(Expression::Undetermined).len(), 2);
    ///
    /// let any = ExpressionSets::consensus(&[a, b], &[], 0.5).unwrap();
    /// assert_eq!(any.get(Expression::Up).len(), 2);
    /// ```
    pub fn consensus(
        runs: &[ExpressionSets],
        exclude: &[ExpressionSets],
        min_prop: f64,
    ) -> EnrichResult<Self> {
        if runs.is_empty() {
            return Err(EnrichError::InvalidInput(
                "consensus requires at least one analysis".to_string(),
            ));
        }
        if !(min_prop > 0.0 && min_prop <= 1.0) {
            return Err(EnrichError::InvalidConfig(format!(
                "minimum proportion must be in (0, 1], got {min_prop}"
            )));
        }
        info!(
            "Building consensus of {} analyses, excluding {}, minimum proportion {}",
            runs.len(),
            exclude.len(),
            min_prop
        );

        let detected: BTreeSet<String> = runs
            .iter()
            .flat_map(|run| Expression::ALL.into_iter().flat_map(move |e| run.get(e).iter()))
            .cloned()
            .collect();

        let changed = [Expression::Up, Expression::Down, Expression::Diff];
        let mut res = Self::default();
        for identifier in detected {
            let mut qualified = changed.iter().filter(|expression| {
                let hits = runs
                    .iter()
                    .filter(|run| run.get(**expression).contains(&identifier))
                    .count();
                let excluded = exclude
                    .iter()
                    .any(|run| run.get(**expression).contains(&identifier));
                !excluded && proportion(hits, runs.len()) >= min_prop
            });
            let category = match (qualified.next(), qualified.next()) {
                (Some(expression), None) => *expression,
                (Some(_), Some(_)) => {
                    warn!("{} qualifies for several categories, treating as undetermined", identifier);
                    Expression::Undetermined
                }
                (None, _) => Expression::Undetermined,
            };
            res.get_mut(category).insert(identifier);
        }
        res.validate()?;
        Ok(res)
    }

    /// Returns the identifiers of the category
    pub fn get(&self, expression: Expression) -> &BTreeSet<String> {
        match expression {
            Expression::Up => &self.up,
            Expression::Down => &self.down,
            Expression::Diff => &self.diff,
            Expression::Undetermined => &self.undetermined,
        }
    }

    fn get_mut(&mut self, expression: Expression) -> &mut BTreeSet<String> {
        match expression {
            Expression::Up => &mut self.up,
            Expression::Down => &mut self.down,
            Expression::Diff => &mut self.diff,
            Expression::Undetermined => &mut self.undetermined,
        }
    }

    /// Returns `true` if the changes have a direction (up/down)
    pub fn is_directional(&self) -> bool {
        !self.up.is_empty() || !self.down.is_empty()
    }

    /// Returns all changed identifiers
    pub fn changed(&self) -> BTreeSet<&str> {
        self.up
            .iter()
            .chain(self.down.iter())
            .chain(self.diff.iter())
            .map(String::as_str)
            .collect()
    }

    /// Returns all identifiers
    pub fn detected(&self) -> BTreeSet<&str> {
        let mut res = self.changed();
        res.extend(self.undetermined.iter().map(String::as_str));
        res
    }

    /// Checks that the categories are disjoint and not mixed
    fn validate(&self) -> EnrichResult<()> {
        if self.is_directional() && !self.diff.is_empty() {
            return Err(EnrichError::InvalidInput(
                "unsigned changes may only be provided without up or down changes".to_string(),
            ));
        }
        for (idx, a) in Expression::ALL.iter().enumerate() {
            for b in &Expression::ALL[idx + 1..] {
                if let Some(id) = self.get(*a).intersection(self.get(*b)).next() {
                    return Err(EnrichError::InvalidInput(format!(
                        "{id} is both {a} and {b}"
                    )));
                }
            }
        }
        Ok(())
    }

    fn require_changes(&self) -> EnrichResult<()> {
        if self.changed().is_empty() {
            Err(EnrichError::InvalidInput("no changed identifiers provided".to_string()))
        } else {
            Ok(())
        }
    }
}

fn proportion(hits: usize, total: usize) -> f64 {
    let hits = u32::try_from(hits).unwrap_or(u32::MAX);
    let total = u32::try_from(total).unwrap_or(u32::MAX);
    f64::from(hits) / f64::from(total)
}
