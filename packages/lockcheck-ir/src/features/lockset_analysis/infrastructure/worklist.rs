//! FIFO block worklist with membership tracking

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use crate::features::program_model::BlockId;

/// A block is queued at most once at a time
#[derive(Debug, Default)]
pub struct BlockWorklist {
    queue: VecDeque<BlockId>,
    in_queue: FxHashSet<BlockId>,
}

impl BlockWorklist {
    pub fn new(entry: BlockId) -> Self {
        let mut worklist = Self::default();
        worklist.push(entry);
        worklist
    }

    /// Enqueue unless already pending; returns whether it was added
    pub fn push(&mut self, block: BlockId) -> bool {
        if !self.in_queue.insert(block) {
            return false;
        }
        self.queue.push_back(block);
        true
    }

    pub fn pop(&mut self) -> Option<BlockId> {
        let block = self.queue.pop_front()?;
        self.in_queue.remove(&block);
        Some(block)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_without_duplicates() {
        let mut worklist = BlockWorklist::new(BlockId::new(0));
        assert!(worklist.push(BlockId::new(2)));
        assert!(!worklist.push(BlockId::new(0)));
        assert_eq!(worklist.len(), 2);

        assert_eq!(worklist.pop(), Some(BlockId::new(0)));
        // Popped blocks may be queued again
        assert!(worklist.push(BlockId::new(0)));
        assert_eq!(worklist.pop(), Some(BlockId::new(2)));
        assert_eq!(worklist.pop(), Some(BlockId::new(0)));
        assert!(worklist.is_empty());
    }
}
