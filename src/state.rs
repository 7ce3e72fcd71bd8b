//! Abstract state: a map from variables to intervals.

use std::collections::BTreeMap;
use std::fmt;

use crate::domain::AbstractDomain;
use crate::interval::Interval;
use crate::types::VarId;

/// Abstract state at a program point.
///
/// Maps each variable to the [`Interval`] of values it may hold. Variables
/// that were never bound read as `Bottom` (not yet defined on any path).
/// An unreachable state is distinct from a reachable state in which every
/// variable is `Bottom`: the former is the lattice bottom, the latter is the
/// state at function entry before any definition.
///
/// This is a *non-relational* abstraction: each variable is tracked
/// independently, so relationships between variables (e.g. `x ≤ y`) are lost.
///
/// The representation is canonical: entries equal to the state's default
/// value are never stored, so structural equality coincides with lattice
/// equality.
///
/// # Example
///
/// ```rust
/// use vsa_rs::domain::AbstractDomain;
/// use vsa_rs::interval::Interval;
/// use vsa_rs::state::AbstractState;
/// use vsa_rs::types::VarId;
///
/// let x = VarId::new(0);
/// let y = VarId::new(1);
///
/// let mut state = AbstractState::new();
/// state.set(x, Interval::from_bounds(0, 100));
///
/// assert!(state.get(x).contains(50));
/// assert!(state.get(y).is_bottom());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbstractState {
    reachable: bool,
    default: Interval,
    values: BTreeMap<VarId, Interval>,
}

impl AbstractState {
    /// Create a reachable state with no variable bound.
    pub fn new() -> Self {
        Self {
            reachable: true,
            default: Interval::Bottom,
            values: BTreeMap::new(),
        }
    }

    /// Create the unreachable state.
    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            default: Interval::Bottom,
            values: BTreeMap::new(),
        }
    }

    /// Check if the program point may be reached.
    pub fn is_reachable(&self) -> bool {
        self.reachable
    }

    /// Get the interval of a variable.
    ///
    /// Returns bottom if the variable is not bound or the state is unreachable.
    pub fn get(&self, var: VarId) -> Interval {
        if !self.reachable {
            return Interval::Bottom;
        }
        self.values.get(&var).copied().unwrap_or(self.default)
    }

    /// Bind a variable. Has no effect on an unreachable state.
    pub fn set(&mut self, var: VarId, value: Interval) {
        if !self.reachable {
            return;
        }
        if value == self.default {
            self.values.remove(&var);
        } else {
            self.values.insert(var, value);
        }
    }

    /// Functional variant of [`set`](Self::set).
    pub fn with(&self, var: VarId, value: Interval) -> Self {
        let mut result = self.clone();
        result.set(var, value);
        result
    }

    /// Intersect a variable with `constraint`.
    ///
    /// If the variable becomes bottom, the whole state becomes unreachable.
    pub fn assume(&mut self, var: VarId, constraint: &Interval) {
        let refined = self.get(var).meet(constraint);
        if refined.is_bottom() {
            self.mark_unreachable();
        } else {
            self.set(var, refined);
        }
    }

    /// Turn this state into the unreachable state.
    pub fn mark_unreachable(&mut self) {
        *self = Self::unreachable();
    }

    /// Explicitly bound variables and their intervals, in variable order.
    pub fn iter(&self) -> impl Iterator<Item = (VarId, Interval)> + '_ {
        self.values.iter().map(|(&var, &value)| (var, value))
    }

    /// Number of explicitly bound variables.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if no variable is explicitly bound.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Pointwise combination over the union of bound variables.
    ///
    /// Both states must be reachable.
    fn pointwise(&self, other: &Self, f: impl Fn(&Interval, &Interval) -> Interval) -> Self {
        let mut result = Self {
            reachable: true,
            default: f(&self.default, &other.default),
            values: BTreeMap::new(),
        };
        for &var in self.values.keys().chain(other.values.keys()) {
            if !result.values.contains_key(&var) {
                result.set(var, f(&self.get(var), &other.get(var)));
            }
        }
        result
    }
}

impl Default for AbstractState {
    fn default() -> Self {
        Self::new()
    }
}

impl AbstractDomain for AbstractState {
    fn bottom() -> Self {
        Self::unreachable()
    }

    /// Reachable state in which every variable is `Top`.
    fn top() -> Self {
        Self {
            reachable: true,
            default: Interval::Top,
            values: BTreeMap::new(),
        }
    }

    fn is_bottom(&self) -> bool {
        !self.reachable
    }

    fn is_top(&self) -> bool {
        self.reachable && self.default.is_top() && self.values.is_empty()
    }

    fn leq(&self, other: &Self) -> bool {
        if !self.reachable {
            return true;
        }
        if !other.reachable {
            return false;
        }
        self.default.leq(&other.default)
            && self
                .values
                .keys()
                .chain(other.values.keys())
                .all(|&var| self.get(var).leq(&other.get(var)))
    }

    fn join(&self, other: &Self) -> Self {
        match (self.reachable, other.reachable) {
            (false, _) => other.clone(),
            (_, false) => self.clone(),
            _ => self.pointwise(other, Interval::join),
        }
    }

    fn meet(&self, other: &Self) -> Self {
        if !self.reachable || !other.reachable {
            return Self::unreachable();
        }
        self.pointwise(other, Interval::meet)
    }

    fn widen(&self, other: &Self) -> Self {
        match (self.reachable, other.reachable) {
            (false, _) => other.clone(),
            (_, false) => self.clone(),
            _ => self.pointwise(other, Interval::widen),
        }
    }

    fn narrow(&self, other: &Self) -> Self {
        if !self.reachable || !other.reachable {
            return Self::unreachable();
        }
        self.pointwise(other, Interval::narrow)
    }
}

impl fmt::Display for AbstractState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.reachable {
            return write!(f, "unreachable");
        }
        write!(f, "{{")?;
        for (i, (var, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", var, value)?;
        }
        if self.default.is_top() {
            if !self.values.is_empty() {
                write!(f, ", ")?;
            }
            write!(f, "..: ⊤")?;
        }
        write!(f, "}}")
    }
}
