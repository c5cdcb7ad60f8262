// The state engine owns the balance table, the mempool and the latest-block
// pointers, and is the only writer of the append-only block log. Every
// mutation is validate-then-commit: a failed operation leaves the state
// exactly as it was.

use crate::core::{Account, Block, BlockRecord, Hash, Transaction};
use crate::error::{LedgerError, Result};
use crate::storage::{self, Genesis};
use crate::utils::current_timestamp;
use log::info;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::path::Path;

#[derive(Debug)]
pub struct State {
    balances: HashMap<Account, u64>,
    mempool: Vec<Transaction>,
    db_file: File,
    latest_block: Block,
    latest_block_hash: Hash,
    has_genesis_block: bool,
}

impl State {
    /// Open the ledger at `data_dir`: provision the directory if needed,
    /// seed balances from the genesis manifest, then replay the block log
    /// in file order. Any invalid record or chain-integrity violation in
    /// the log aborts the open.
    pub fn open(data_dir: &Path) -> Result<State> {
        storage::init_data_dir_if_not_exists(data_dir)?;

        let genesis = Genesis::load(&storage::genesis_json_file_path(data_dir))?;

        let db_file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(storage::blocks_db_file_path(data_dir))?;

        // Reading via the append handle leaves its cursor at end of file,
        // which is where appends continue.
        let records = storage::read_records(&db_file)?;

        let mut state = State {
            balances: genesis.balances,
            mempool: Vec::new(),
            db_file,
            latest_block: Block::default(),
            latest_block_hash: Hash::zero(),
            has_genesis_block: false,
        };

        for record in records {
            state.apply_block(record.value)?;
        }

        info!(
            "Loaded state from {}: {} accounts, next block number {}",
            data_dir.display(),
            state.balances.len(),
            state.next_block_number()
        );

        Ok(state)
    }

    /// Validate a transaction against the current balances and, on success,
    /// apply it and append it to the mempool. On failure neither balances
    /// nor mempool change.
    pub fn add_tx(&mut self, tx: Transaction) -> Result<()> {
        Self::apply_tx(&mut self.balances, &tx)?;
        self.mempool.push(tx);
        Ok(())
    }

    /// Persist the full mempool as the next block in the chain.
    ///
    /// The record is appended to the log first; only once the write has
    /// succeeded are the latest pointers advanced and the mempool cleared,
    /// so a failed write leaves the state exactly as before the call.
    pub fn persist(&mut self) -> Result<Hash> {
        let block = Block::new(
            self.latest_block_hash,
            self.next_block_number(),
            current_timestamp()?,
            self.mempool.clone(),
        );
        let block_hash = block.hash()?;

        let record = BlockRecord::new(block_hash, block);
        storage::append_record(&mut self.db_file, &record)?;

        info!(
            "Persisted block {} at height {} with {} transaction(s)",
            block_hash,
            record.value.header.height,
            record.value.payload.len()
        );

        self.latest_block = record.value;
        self.latest_block_hash = block_hash;
        self.has_genesis_block = true;
        self.mempool.clear();

        Ok(block_hash)
    }

    /// Validate a block against the chain tip and apply its transactions.
    ///
    /// Transactions run against a working copy of the balance table; the
    /// copy is committed only if every transaction succeeds, so a rejected
    /// block leaves no partial mutation behind.
    pub fn apply_block(&mut self, block: Block) -> Result<Hash> {
        let expected_height = self.next_block_number();
        if block.header.height != expected_height {
            return Err(LedgerError::InvalidHeight {
                expected: expected_height,
                got: block.header.height,
            });
        }

        if self.has_genesis_block && block.header.parent != self.latest_block_hash {
            return Err(LedgerError::InvalidParent {
                expected: self.latest_block_hash,
                got: block.header.parent,
            });
        }

        let mut balances = self.balances.clone();
        for tx in &block.payload {
            Self::apply_tx(&mut balances, tx)?;
        }

        let block_hash = block.hash()?;

        self.balances = balances;
        self.latest_block = block;
        self.latest_block_hash = block_hash;
        self.has_genesis_block = true;

        Ok(block_hash)
    }

    // A reward transaction mints value into the recipient unconditionally.
    // A transfer checks the sender's balance before touching either side,
    // so a failure mutates nothing.
    fn apply_tx(balances: &mut HashMap<Account, u64>, tx: &Transaction) -> Result<()> {
        if tx.is_reward() {
            *balances.entry(tx.to.clone()).or_insert(0) += tx.value;
            return Ok(());
        }

        let available = balances.get(&tx.from).copied().unwrap_or(0);
        if available < tx.value {
            return Err(LedgerError::InsufficientBalance {
                required: tx.value,
                available,
            });
        }

        *balances.entry(tx.from.clone()).or_insert(0) -= tx.value;
        *balances.entry(tx.to.clone()).or_insert(0) += tx.value;

        Ok(())
    }

    pub fn balances(&self) -> &HashMap<Account, u64> {
        &self.balances
    }

    pub fn mempool(&self) -> &[Transaction] {
        &self.mempool
    }

    pub fn latest_block(&self) -> &Block {
        &self.latest_block
    }

    pub fn latest_block_hash(&self) -> Hash {
        self.latest_block_hash
    }

    pub fn has_genesis_block(&self) -> bool {
        self.has_genesis_block
    }

    /// 0 until the first block is persisted, then latest height + 1.
    pub fn next_block_number(&self) -> u64 {
        if self.has_genesis_block {
            self.latest_block.header.height + 1
        } else {
            0
        }
    }

    /// Release the log file handle. Consuming `self` makes a second close
    /// impossible, so the operation is trivially idempotent.
    pub fn close(self) {}
}
