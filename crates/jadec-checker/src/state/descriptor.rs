use jadec_common::Atom;
use smallvec::SmallVec;

/// Structural fingerprint of an expression whose type can be narrowed.
///
/// `c of b of a` is described as `PropertyChain([a, b, c])`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExpressionDescriptor {
    PropertyChain(SmallVec<[Atom; 4]>),
}

impl ExpressionDescriptor {
    pub fn name(root: Atom) -> Self {
        let mut chain = SmallVec::new();
        chain.push(root);
        ExpressionDescriptor::PropertyChain(chain)
    }

    /// Descriptor of `property of self`.
    pub fn property(&self, property: Atom) -> Self {
        let ExpressionDescriptor::PropertyChain(chain) = self;
        let mut chain = chain.clone();
        chain.push(property);
        ExpressionDescriptor::PropertyChain(chain)
    }

    pub fn root(&self) -> Atom {
        let ExpressionDescriptor::PropertyChain(chain) = self;
        chain.first().copied().unwrap_or(Atom::NONE)
    }

    pub fn len(&self) -> usize {
        let ExpressionDescriptor::PropertyChain(chain) = self;
        chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` when `self` is `other` or one of its owners: `[a]` prefixes
    /// `[a, b]`, so assigning `a` invalidates what is known about `b of a`.
    pub fn is_prefix_of(&self, other: &ExpressionDescriptor) -> bool {
        let (ExpressionDescriptor::PropertyChain(mine), ExpressionDescriptor::PropertyChain(theirs)) =
            (self, other);
        mine.len() <= theirs.len() && theirs.starts_with(mine)
    }
}
