//! Edit log — transaction boundaries of the reference text view.
//!
//! Records every buffer mutation as an [`Edit`] grouped into
//! [`Transaction`]s. A transaction is what an undo stack would revert as
//! one step; the log itself never undoes anything, it only keeps the
//! grouping observable.
//!
//! ```text
//! log.begin();            // depth 1, transaction opened
//! log.begin();            // depth 2, nested: same transaction
//! log.record_delete(3, "abc");
//! log.end();              // depth 1
//! log.record_insert(3, " ");
//! log.end();              // depth 0, transaction committed
//! ```
//!
//! Edits recorded outside any block become single-edit transactions.
//! Empty transactions are discarded on commit.

// ---------------------------------------------------------------------------
// Edit
// ---------------------------------------------------------------------------

/// A single buffer edit at a char offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Insert { offset: usize, text: String },
    Delete { offset: usize, text: String },
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A group of edits made inside one outermost edit block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    edits: Vec<Edit>,
}

impl Transaction {
    #[inline]
    #[must_use]
    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }
}

// ---------------------------------------------------------------------------
// EditLog
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct EditLog {
    committed: Vec<Transaction>,
    pending: Option<Transaction>,
    depth: usize,
}

impl EditLog {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            committed: Vec::new(),
            pending: None,
            depth: 0,
        }
    }

    /// Open a block. Nested calls join the enclosing transaction.
    pub fn begin(&mut self) {
        if self.depth == 0 {
            self.pending = Some(Transaction::default());
        }
        self.depth += 1;
    }

    /// Close a block. The outermost close commits the transaction.
    ///
    /// An unmatched close is ignored.
    pub fn end(&mut self) {
        if self.depth == 0 {
            tracing::warn!("edit block closed without a matching begin");
            return;
        }
        self.depth -= 1;
        if self.depth == 0 {
            if let Some(txn) = self.pending.take() {
                self.commit(txn);
            }
        }
    }

    pub fn record_insert(&mut self, offset: usize, text: &str) {
        self.record(Edit::Insert {
            offset,
            text: text.to_string(),
        });
    }

    pub fn record_delete(&mut self, offset: usize, text: &str) {
        self.record(Edit::Delete {
            offset,
            text: text.to_string(),
        });
    }

    /// True while at least one block is open.
    #[inline]
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.depth > 0
    }

    /// Current nesting depth.
    #[inline]
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Committed transactions, oldest first.
    #[inline]
    #[must_use]
    pub fn transactions(&self) -> &[Transaction] {
        &self.committed
    }

    /// The most recently committed transaction.
    #[must_use]
    pub fn last(&self) -> Option<&Transaction> {
        self.committed.last()
    }

    fn record(&mut self, edit: Edit) {
        match self.pending.as_mut() {
            Some(txn) => txn.edits.push(edit),
            None => self.commit(Transaction { edits: vec![edit] }),
        }
    }

    fn commit(&mut self, txn: Transaction) {
        if !txn.edits.is_empty() {
            self.committed.push(txn);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn block_groups_edits() {
        let mut log = EditLog::new();
        log.begin();
        log.record_delete(0, "foo");
        log.record_insert(0, " ");
        log.end();

        assert_eq!(log.transactions().len(), 1);
        assert_eq!(
            log.transactions()[0].edits(),
            &[
                Edit::Delete {
                    offset: 0,
                    text: "foo".into()
                },
                Edit::Insert {
                    offset: 0,
                    text: " ".into()
                },
            ]
        );
    }

    #[test]
    fn nested_blocks_commit_once() {
        let mut log = EditLog::new();
        log.begin();
        log.begin();
        log.record_insert(0, "a");
        log.end();
        assert!(log.is_open());
        assert!(log.transactions().is_empty());
        log.record_insert(1, "b");
        log.end();

        assert!(!log.is_open());
        assert_eq!(log.transactions().len(), 1);
        assert_eq!(log.last().map(|t| t.edits().len()), Some(2));
    }

    #[test]
    fn edits_outside_blocks_stand_alone() {
        let mut log = EditLog::new();
        log.record_insert(0, "a");
        log.record_insert(1, "b");
        assert_eq!(log.transactions().len(), 2);
    }

    #[test]
    fn empty_block_is_discarded() {
        let mut log = EditLog::new();
        log.begin();
        log.end();
        assert!(log.transactions().is_empty());
    }

    #[test]
    fn unmatched_end_is_ignored() {
        let mut log = EditLog::new();
        log.end();
        assert_eq!(log.depth(), 0);
        log.begin();
        assert_eq!(log.depth(), 1);
    }
}
