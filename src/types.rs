//! Type-safe identifiers for SSA values, basic blocks and integer widths.
//!
//! These newtypes keep block indices, variable identifiers and bit widths
//! apart at compile time, so a `BlockId` can never be used to look up a
//! variable's interval by accident.

use std::fmt;

/// An SSA value identifier.
///
/// Every value defined by an instruction or passed as a function parameter
/// is named by exactly one `VarId`. Identifiers are chosen by whoever builds
/// the [`Function`][crate::ir::Function] and need not be dense.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VarId(u32);

impl VarId {
    /// Creates a new variable identifier.
    pub fn new(id: u32) -> Self {
        VarId(id)
    }

    /// Returns the raw identifier.
    pub fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

impl From<u32> for VarId {
    fn from(id: u32) -> Self {
        VarId(id)
    }
}

/// A basic block identifier (0-indexed position in the block table).
///
/// The entry block of a function always has index 0.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct BlockId(usize);

impl BlockId {
    /// The entry block of every function.
    pub const ENTRY: BlockId = BlockId(0);

    /// Creates a new block identifier with the given index.
    pub fn new(index: usize) -> Self {
        BlockId(index)
    }

    /// Returns the raw block index as a `usize`.
    pub fn index(self) -> usize {
        self.0
    }

    /// Checks if this is the entry block.
    pub fn is_entry(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

impl From<BlockId> for usize {
    fn from(block: BlockId) -> Self {
        block.0
    }
}

impl From<usize> for BlockId {
    fn from(index: usize) -> Self {
        BlockId(index)
    }
}

/// Location of an instruction: its block and position inside the block.
///
/// The terminator of a block is addressed by the position one past the last
/// instruction.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct InstLoc {
    pub block: BlockId,
    pub index: usize,
}

impl InstLoc {
    pub fn new(block: BlockId, index: usize) -> Self {
        Self { block, index }
    }
}

impl fmt::Display for InstLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.block, self.index)
    }
}

/// Bit width of an integer value (1 to 64 bits).
///
/// Values are interpreted as signed two's-complement numbers, except for
/// 1-bit values which are booleans ranging over `{0, 1}`.
///
/// # Invariants
///
/// - `1 <= bits <= 64`
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct IntWidth(u8);

impl IntWidth {
    pub const I1: IntWidth = IntWidth(1);
    pub const I8: IntWidth = IntWidth(8);
    pub const I16: IntWidth = IntWidth(16);
    pub const I32: IntWidth = IntWidth(32);
    pub const I64: IntWidth = IntWidth(64);

    /// Creates a new width.
    ///
    /// # Panics
    ///
    /// Panics if `bits` is not in `1..=64`.
    pub fn new(bits: u8) -> Self {
        assert!((1..=64).contains(&bits), "Integer width must be in 1..=64");
        IntWidth(bits)
    }

    /// Returns the number of bits.
    pub fn bits(self) -> u32 {
        self.0 as u32
    }

    /// Whether this is the 1-bit boolean width.
    pub fn is_bool(self) -> bool {
        self.0 == 1
    }

    /// Smallest representable value.
    pub fn min_value(self) -> i64 {
        match self.0 {
            1 => 0,
            64 => i64::MIN,
            n => -(1i64 << (n - 1)),
        }
    }

    /// Largest representable value.
    pub fn max_value(self) -> i64 {
        match self.0 {
            1 => 1,
            64 => i64::MAX,
            n => (1i64 << (n - 1)) - 1,
        }
    }

    /// Largest unsigned value, `2^bits - 1`.
    pub fn umax(self) -> u64 {
        if self.0 == 64 {
            u64::MAX
        } else {
            (1u64 << self.0) - 1
        }
    }

    /// Number of distinct values, `2^bits`.
    pub fn modulus(self) -> i128 {
        1i128 << self.0
    }

    /// Checks whether `value` is representable in this width.
    pub fn contains(self, value: i64) -> bool {
        self.min_value() <= value && value <= self.max_value()
    }
}

impl fmt::Display for IntWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "i{}", self.0)
    }
}
