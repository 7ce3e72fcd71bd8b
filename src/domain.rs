//! Core lattice trait shared by intervals and abstract states.

use std::fmt::Debug;

/// Abstract domain interface.
///
/// An abstract domain is a lattice used to approximate sets of concrete
/// values. Both [`Interval`](crate::interval::Interval) and
/// [`AbstractState`](crate::state::AbstractState) implement it, the latter by
/// pointwise extension.
///
/// # Lattice Properties
///
/// An abstract domain must satisfy:
/// - Reflexivity: `∀a. a ⊑ a`
/// - Transitivity: `∀a,b,c. a ⊑ b ∧ b ⊑ c ⇒ a ⊑ c`
/// - Join is an upper bound: `a ⊑ a ⊔ b` and `b ⊑ a ⊔ b`
/// - Meet is a lower bound: `a ⊓ b ⊑ a` and `a ⊓ b ⊑ b`
/// - Widening covers join: `a ⊔ b ⊑ a ∇ b`
pub trait AbstractDomain: Clone + Debug + PartialEq {
    /// Create the bottom element (`⊥`): the empty set.
    fn bottom() -> Self;

    /// Create the top element (`⊤`): every representable value.
    fn top() -> Self;

    /// Check if an element is bottom.
    fn is_bottom(&self) -> bool;

    /// Check if an element is top.
    fn is_top(&self) -> bool;

    /// Partial order: `self ⊑ other`.
    fn leq(&self, other: &Self) -> bool;

    /// Join (`⊔`): least upper bound.
    fn join(&self, other: &Self) -> Self;

    /// Meet (`⊓`): greatest lower bound.
    fn meet(&self, other: &Self) -> Self;

    /// Widening (`∇`): extrapolates unstable bounds to infinity.
    ///
    /// Must satisfy `self ⊔ other ⊑ self ∇ other`, and every increasing chain
    /// `x₀, x₁ = x₀ ∇ y₀, x₂ = x₁ ∇ y₁, …` must stabilise.
    fn widen(&self, other: &Self) -> Self;

    /// Narrowing (`∆`): refines infinite bounds after widening.
    ///
    /// Must satisfy `self ⊓ other ⊑ self ∆ other ⊑ self` whenever
    /// `other ⊑ self`, and never reintroduce divergence.
    fn narrow(&self, other: &Self) -> Self;

    /// Check equality in the lattice order.
    fn equiv(&self, other: &Self) -> bool {
        self.leq(other) && other.leq(self)
    }

    /// Join multiple elements.
    fn join_many<I>(elems: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        elems.into_iter().fold(Self::bottom(), |acc, e| acc.join(&e))
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    /// Test helper: validate basic lattice axioms
    pub fn test_lattice_axioms<D: AbstractDomain>(samples: &[D]) {
        let bottom = D::bottom();
        let top = D::top();

        for a in samples {
            // Reflexivity: a ⊑ a
            assert!(a.leq(a), "Reflexivity failed for {:?}", a);

            // Bounds: ⊥ ⊑ a ⊑ ⊤
            assert!(bottom.leq(a), "Bottom is not least for {:?}", a);
            assert!(a.leq(&top), "Top is not greatest for {:?}", a);

            // Identity: a ⊔ ⊥ = a
            assert!(a.join(&bottom).equiv(a), "Join with bottom failed for {:?}", a);

            // Identity: a ⊓ ⊤ = a
            assert!(a.meet(&top).equiv(a), "Meet with top failed for {:?}", a);
        }

        for a in samples {
            for b in samples {
                let joined = a.join(b);
                assert!(joined.equiv(&b.join(a)), "Join commutativity failed");
                assert!(a.leq(&joined), "Join is not upper bound for {:?}", a);
                assert!(b.leq(&joined), "Join is not upper bound for {:?}", b);

                let met = a.meet(b);
                assert!(met.equiv(&b.meet(a)), "Meet commutativity failed");
                assert!(met.leq(a), "Meet is not lower bound of {:?}", a);
                assert!(met.leq(b), "Meet is not lower bound of {:?}", b);

                // Widening safety: a ⊔ b ⊑ a ∇ b
                let widened = a.widen(b);
                assert!(joined.leq(&widened), "Widening {:?} ∇ {:?} lost precision", a, b);

                // Narrowing stays between the meet and the old value.
                if b.leq(a) {
                    let narrowed = a.narrow(b);
                    assert!(narrowed.leq(a), "Narrowing {:?} ∆ {:?} went up", a, b);
                    assert!(met.leq(&narrowed), "Narrowing {:?} ∆ {:?} went below meet", a, b);
                }
            }
        }
    }
}
