//! Worklist fixpoint over one function's CFG
//!
//! ## Algorithm
//! 1. Seed the entry block with `AnalysisState::new(initial)`
//! 2. Pop a block, run the interpreter over a copy of its entry state
//! 3. Unseen successor: record the exit state and enqueue it.
//!    Seen successor: meet with the exit state; re-enqueue only if it shrank
//! 4. Report: one more pass over every reached block with its converged
//!    entry state, emitting diagnostics
//!
//! Entry states only shrink, so step 3 terminates after at most
//! `|blocks| × |identities|` re-enqueues. Reporting from converged states
//! gives one diagnostic per unmet requirement per call site, even in loops.

use rustc_hash::FxHashMap;

use crate::features::lockset_analysis::domain::{AnalysisState, DiagnosticSink, LockSet};
use crate::features::program_model::{BlockId, Function};

use super::interpreter::Interpreter;
use super::worklist::BlockWorklist;

/// Converged states of one block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockFacts {
    pub entry: AnalysisState,
    pub exit: AnalysisState,
}

/// Fixpoint result for one function
#[derive(Debug, Clone, Default)]
pub struct FunctionFacts {
    blocks: FxHashMap<BlockId, BlockFacts>,
    /// Number of block visits until convergence
    pub iterations: usize,
}

impl FunctionFacts {
    pub fn block(&self, block: BlockId) -> Option<&BlockFacts> {
        self.blocks.get(&block)
    }

    pub fn entry_state(&self, block: BlockId) -> Option<&AnalysisState> {
        self.blocks.get(&block).map(|f| &f.entry)
    }

    pub fn exit_state(&self, block: BlockId) -> Option<&AnalysisState> {
        self.blocks.get(&block).map(|f| &f.exit)
    }

    /// Blocks never reached from the entry have no facts
    pub fn is_reachable(&self, block: BlockId) -> bool {
        self.blocks.contains_key(&block)
    }
}

pub struct FixpointSolver<'i, 'a> {
    interpreter: &'i Interpreter<'a>,
}

impl<'i, 'a> FixpointSolver<'i, 'a> {
    pub fn new(interpreter: &'i Interpreter<'a>) -> Self {
        Self { interpreter }
    }

    /// Compute converged entry/exit states; a body-less function has none
    pub fn solve(&self, func: &Function, initial: LockSet) -> FunctionFacts {
        let Some(entry) = func.entry() else {
            return FunctionFacts::default();
        };

        let mut entries: FxHashMap<BlockId, AnalysisState> = FxHashMap::default();
        let mut exits: FxHashMap<BlockId, AnalysisState> = FxHashMap::default();
        entries.insert(entry.index, AnalysisState::new(initial));
        let mut worklist = BlockWorklist::new(entry.index);
        let mut iterations = 0;

        while let Some(current) = worklist.pop() {
            let (Some(block), Some(entry_state)) = (func.block(current), entries.get(&current)) else {
                continue;
            };
            iterations += 1;

            let mut state = entry_state.clone();
            self.interpreter.run_block(func, block, &mut state, None);
            tracing::trace!(
                function = %func.name,
                block = %current,
                held = state.held.len(),
                "block visited"
            );

            for succ in &block.successors {
                match entries.get(succ) {
                    None => {
                        entries.insert(*succ, state.clone());
                        worklist.push(*succ);
                    }
                    Some(existing) => {
                        let merged = existing.intersect(&state);
                        if merged != *existing {
                            entries.insert(*succ, merged);
                            worklist.push(*succ);
                        }
                    }
                }
            }
            exits.insert(current, state);
        }

        let blocks = entries
            .into_iter()
            .filter_map(|(id, entry)| {
                let exit = exits.remove(&id)?;
                Some((id, BlockFacts { entry, exit }))
            })
            .collect();
        FunctionFacts { blocks, iterations }
    }

    /// Re-run reached blocks from their converged entry states, in block order,
    /// reporting unmet requirements
    pub fn report(&self, func: &Function, facts: &FunctionFacts, sink: &mut DiagnosticSink) {
        for block in &func.blocks {
            let Some(entry) = facts.entry_state(block.index) else {
                continue;
            };
            let mut state = entry.clone();
            self.interpreter.run_block(func, block, &mut state, Some(&mut *sink));
        }
    }

    /// `solve` then `report`
    pub fn analyze(&self, func: &Function, initial: LockSet, sink: &mut DiagnosticSink) -> FunctionFacts {
        let facts = self.solve(func, initial);
        self.report(func, &facts, sink);
        facts
    }
}
