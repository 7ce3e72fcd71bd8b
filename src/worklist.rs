//! Block sets and the fixpoint worklist.
//!
//! [`BlockSet`] is a dense bit set over block indices, used both for
//! dominator sets and as the backing store of the [`Worklist`]. The worklist
//! hands out pending blocks in reverse postorder, so a block is normally
//! processed after all of its forward predecessors.

use crate::types::BlockId;

/// A bit set of blocks backed by a vector of u64 words.
///
/// Each bit corresponds to a block index. The set grows as needed when
/// inserting blocks beyond the current capacity.
#[derive(Debug, Clone)]
pub struct BlockSet {
    /// Storage: each u64 holds 64 bits
    words: Vec<u64>,
    /// Number of set bits (cached for O(1) len())
    count: usize,
    /// Index of the first word that might have a set bit
    min_word: usize,
}

impl BlockSet {
    const BITS_PER_WORD: usize = 64;

    /// Creates an empty set able to hold `capacity` blocks without growing.
    pub fn new(capacity: usize) -> Self {
        Self {
            words: vec![0; capacity.div_ceil(Self::BITS_PER_WORD)],
            count: 0,
            min_word: usize::MAX,
        }
    }

    /// Creates the set `{0, 1, ..., n - 1}`.
    pub fn full(n: usize) -> Self {
        let mut set = Self::new(n);
        set.extend((0..n).map(BlockId::new));
        set
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    fn word_and_bit(index: usize) -> (usize, usize) {
        (index / Self::BITS_PER_WORD, index % Self::BITS_PER_WORD)
    }

    #[inline]
    pub fn contains(&self, block: BlockId) -> bool {
        let (word_idx, bit_idx) = Self::word_and_bit(block.index());
        self.words.get(word_idx).is_some_and(|w| w & (1u64 << bit_idx) != 0)
    }

    /// Adds a block. Returns true if it was not already present.
    pub fn insert(&mut self, block: BlockId) -> bool {
        let (word_idx, bit_idx) = Self::word_and_bit(block.index());
        if word_idx >= self.words.len() {
            self.words.resize(word_idx + 1, 0);
        }

        let mask = 1u64 << bit_idx;
        let was_clear = self.words[word_idx] & mask == 0;
        if was_clear {
            self.words[word_idx] |= mask;
            self.count += 1;
            self.min_word = self.min_word.min(word_idx);
        }
        was_clear
    }

    /// Removes a block. Returns true if it was present.
    pub fn remove(&mut self, block: BlockId) -> bool {
        let (word_idx, bit_idx) = Self::word_and_bit(block.index());
        let Some(word) = self.words.get_mut(word_idx) else {
            return false;
        };

        let mask = 1u64 << bit_idx;
        let was_set = *word & mask != 0;
        if was_set {
            *word &= !mask;
            self.count -= 1;
            // min_word is only a hint and stays as is
        }
        was_set
    }

    /// Removes and returns the block with the smallest index.
    pub fn pop_first(&mut self) -> Option<BlockId> {
        if self.count == 0 {
            return None;
        }

        for word_idx in self.min_word..self.words.len() {
            let word = self.words[word_idx];
            if word != 0 {
                let bit_idx = word.trailing_zeros() as usize;
                self.words[word_idx] &= !(1u64 << bit_idx);
                self.count -= 1;
                self.min_word = if self.words[word_idx] == 0 { word_idx + 1 } else { word_idx };
                return Some(BlockId::new(word_idx * Self::BITS_PER_WORD + bit_idx));
            }
        }

        self.count = 0;
        self.min_word = usize::MAX;
        None
    }

    /// Keeps only the blocks also present in `other`. Returns true if the
    /// set changed.
    pub fn intersect_with(&mut self, other: &BlockSet) -> bool {
        let mut changed = false;
        let mut count = 0;
        for (i, word) in self.words.iter_mut().enumerate() {
            let new = *word & other.words.get(i).copied().unwrap_or(0);
            changed |= new != *word;
            *word = new;
            count += new.count_ones() as usize;
        }
        self.count = count;
        changed
    }

    pub fn clear(&mut self) {
        self.words.fill(0);
        self.count = 0;
        self.min_word = usize::MAX;
    }

    pub fn extend(&mut self, iter: impl IntoIterator<Item = BlockId>) {
        for block in iter {
            self.insert(block);
        }
    }

    /// Iterates over the blocks in increasing index order.
    pub fn iter(&self) -> BlockSetIter<'_> {
        BlockSetIter {
            set: self,
            word_idx: 0,
            current_word: self.words.first().copied().unwrap_or(0),
        }
    }
}

impl PartialEq for BlockSet {
    fn eq(&self, other: &Self) -> bool {
        let len = self.words.len().max(other.words.len());
        self.count == other.count
            && (0..len).all(|i| self.words.get(i).copied().unwrap_or(0) == other.words.get(i).copied().unwrap_or(0))
    }
}

impl Eq for BlockSet {}

impl Default for BlockSet {
    fn default() -> Self {
        Self::new(0)
    }
}

impl FromIterator<BlockId> for BlockSet {
    fn from_iter<I: IntoIterator<Item = BlockId>>(iter: I) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

/// Iterator over the blocks of a [`BlockSet`].
pub struct BlockSetIter<'a> {
    set: &'a BlockSet,
    word_idx: usize,
    current_word: u64,
}

impl Iterator for BlockSetIter<'_> {
    type Item = BlockId;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current_word != 0 {
                let bit_idx = self.current_word.trailing_zeros() as usize;
                self.current_word &= self.current_word - 1;
                return Some(BlockId::new(self.word_idx * BlockSet::BITS_PER_WORD + bit_idx));
            }

            self.word_idx += 1;
            if self.word_idx >= self.set.words.len() {
                return None;
            }
            self.current_word = self.set.words[self.word_idx];
        }
    }
}

/// Pending blocks, popped in reverse postorder.
///
/// Internally the set stores reverse-postorder ranks, so popping the first
/// bit yields the earliest pending block. Blocks without a rank
/// (unreachable from the entry) are never queued.
#[derive(Debug, Clone)]
pub struct Worklist {
    order: Vec<BlockId>,
    rank: Vec<Option<usize>>,
    pending: BlockSet,
}

impl Worklist {
    /// Creates an empty worklist for the given reverse postorder of a
    /// function with `num_blocks` blocks.
    pub fn new(order: &[BlockId], num_blocks: usize) -> Self {
        let mut rank = vec![None; num_blocks];
        for (i, block) in order.iter().enumerate() {
            rank[block.index()] = Some(i);
        }
        Self {
            order: order.to_vec(),
            rank,
            pending: BlockSet::new(order.len()),
        }
    }

    /// Queues a block. Returns true if it was not already pending.
    pub fn push(&mut self, block: BlockId) -> bool {
        match self.rank.get(block.index()).copied().flatten() {
            Some(r) => self.pending.insert(BlockId::new(r)),
            None => false,
        }
    }

    /// Removes and returns the pending block earliest in reverse postorder.
    pub fn pop(&mut self) -> Option<BlockId> {
        let r = self.pending.pop_first()?;
        Some(self.order[r.index()])
    }

    pub fn contains(&self, block: BlockId) -> bool {
        match self.rank.get(block.index()).copied().flatten() {
            Some(r) => self.pending.contains(BlockId::new(r)),
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
