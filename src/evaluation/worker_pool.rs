use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use threadpool::ThreadPool;

use super::batch::EvaluationBackend;
use super::{evaluate_block, CandidateTable};
use crate::arena::SlotRegion;
use crate::error::Error;
use crate::huffman::HuffmanTable;
use crate::image::blocks::DataUnit;
use crate::Result;

const WORKER_THREAD_NAME: &str = "evaluation-worker";

/// Fixed set of threads, created once and idle between dispatches.
///
/// A dispatch hands every worker the same claim loop: fetch-and-increment
/// a shared cursor, evaluate the claimed block, store into the slot with
/// the block's index. Collecting joins the pool, so no slot is written
/// after it returns.
pub struct WorkerPool {
    pool: ThreadPool,
    workers: usize,
    blocks: Arc<[DataUnit]>,
    ac_table: &'static HuffmanTable,
    cursor: Arc<AtomicUsize>,
    panics_before_dispatch: usize,
}

impl WorkerPool {
    pub fn new(workers: usize, blocks: Arc<[DataUnit]>, ac_table: &'static HuffmanTable) -> Self {
        let workers = workers.max(1);
        log::info!("Starting {} evaluation workers", workers);
        WorkerPool {
            pool: ThreadPool::with_name(WORKER_THREAD_NAME.to_owned(), workers),
            workers,
            blocks,
            ac_table,
            cursor: Arc::new(AtomicUsize::new(0)),
            panics_before_dispatch: 0,
        }
    }
}

impl EvaluationBackend for WorkerPool {
    fn name(&self) -> &str {
        "cpu"
    }

    fn block_count(&self) -> usize {
        self.blocks.len()
    }

    fn dispatch(&mut self, candidate: Arc<CandidateTable>, region: &SlotRegion) -> Result<()> {
        self.cursor.store(0, Ordering::SeqCst);
        self.panics_before_dispatch = self.pool.panic_count();
        for _ in 0..self.workers {
            let blocks = Arc::clone(&self.blocks);
            let candidate = Arc::clone(&candidate);
            let cursor = Arc::clone(&self.cursor);
            let region = region.clone();
            let ac_table = self.ac_table;
            self.pool.execute(move || loop {
                let index = cursor.fetch_add(1, Ordering::Relaxed);
                if index >= blocks.len() {
                    break;
                }
                let result = evaluate_block(&blocks[index], &candidate, ac_table);
                region.store(index, result.bits, result.error);
            });
        }
        Ok(())
    }

    fn collect(&mut self, _region: &SlotRegion) -> Result<()> {
        self.pool.join();
        let panicked = self.pool.panic_count() - self.panics_before_dispatch;
        if panicked > 0 {
            return Err(Error::WorkerPanicked(panicked));
        }
        Ok(())
    }
}
