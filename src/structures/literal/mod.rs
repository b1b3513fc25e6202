/*!
Literals are atoms paired with a (boolean) polarity.

The canonical representation is [CLiteral], an atom and polarity packed into
a single `u32` with the polarity in the low bit:

- A positive literal on atom *a* is encoded as 2*a*.
- A negative literal on atom *a* is encoded as 2*a* + 1.

The encoding doubles as a dense index for the per-literal tables of the
engine (binary adjacency, watch lists, heuristic scores, DFS records), and
negation is a single xor.

```rust
# use lynx_sat::structures::literal::{CLiteral, Literal};
let literal = CLiteral::new(79, true);

assert!(literal.polarity());
assert_eq!(literal.atom(), 79);
assert_eq!(literal.negate().polarity(), false);
assert_eq!(literal.index(), 158);
assert_eq!(literal.negate().index(), 159);
```
*/

use crate::structures::atom::Atom;

/// Something which has methods for returning an atom and a polarity, etc.
pub trait Literal {
    /// A fresh literal, specified by pairing an atom with a boolean.
    fn new(atom: Atom, polarity: bool) -> Self;

    /// The negation of the literal.
    fn negate(&self) -> Self;

    /// The atom of the literal.
    fn atom(&self) -> Atom;

    /// The polarity of the literal.
    fn polarity(&self) -> bool;

    /// The literal in its integer form, with sign indicating polarity.
    /// Atoms are offset by one, DIMACS style, so the sign of atom zero
    /// survives.
    fn as_int(&self) -> isize;
}

/// The canonical representation of a literal, an atom and a polarity packed
/// into a `u32`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CLiteral(u32);

impl CLiteral {
    /// The index of the literal, for use with per-literal tables.
    ///
    /// Indicies of the two literals of an atom are adjacent, with the
    /// positive literal first.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The literal whose [index](CLiteral::index) is `index`.
    #[inline]
    pub fn from_index(index: usize) -> Self {
        CLiteral(index as u32)
    }
}

impl Literal for CLiteral {
    fn new(atom: Atom, polarity: bool) -> Self {
        CLiteral((atom << 1) | !polarity as u32)
    }

    fn negate(&self) -> Self {
        CLiteral(self.0 ^ 1)
    }

    fn atom(&self) -> Atom {
        self.0 >> 1
    }

    fn polarity(&self) -> bool {
        (self.0 & 1) == 0
    }

    fn as_int(&self) -> isize {
        let external = self.atom() as isize + 1;
        match self.polarity() {
            true => external,
            false => -external,
        }
    }
}

impl std::ops::Not for CLiteral {
    type Output = Self;

    fn not(self) -> Self {
        self.negate()
    }
}

impl std::ops::Neg for CLiteral {
    type Output = Self;

    fn neg(self) -> Self {
        self.negate()
    }
}

impl std::fmt::Display for CLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.polarity() {
            true => write!(f, "{}", self.atom()),
            false => write!(f, "-{}", self.atom()),
        }
    }
}

impl std::fmt::Debug for CLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod literal_tests {
    use super::*;

    #[test]
    fn encoding() {
        let p = CLiteral::new(5, true);
        let not_p = CLiteral::new(5, false);

        assert_eq!(p.index(), 10);
        assert_eq!(not_p.index(), 11);

        assert_eq!(!p, not_p);
        assert_eq!(!!p, p);

        assert_eq!(CLiteral::from_index(10), p);
        assert_eq!(CLiteral::from_index(11), not_p);
    }

    #[test]
    fn integer_form() {
        assert_eq!(CLiteral::new(3, true).as_int(), 4);
        assert_eq!(CLiteral::new(3, false).as_int(), -4);
        assert_eq!(CLiteral::new(0, false).as_int(), -1);
    }
}
