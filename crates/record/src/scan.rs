//! Predicate-driven table scans.

use common::{DbError, DbResult, PageNum, RecordId};
use expr::{EvalContext, Expr};
use types::Value;

use crate::{Record, Table};

/// A cursor over every slot of a table, yielding records whose decoded
/// attributes satisfy the predicate.
///
/// The cursor starts at page 1, slot 0 and probes one slot per step,
/// pinning and unpinning the page around each probe. Tombstones do not
/// pre-filter slots: a deleted slot whose stale bytes satisfy the
/// predicate is still yielded, so predicates normally anchor on a key
/// attribute.
#[derive(Debug)]
pub struct Scan<'t> {
    table: &'t mut Table,
    predicate: Expr,
    columns: Vec<String>,
    page: PageNum,
    slot: usize,
}

impl<'t> Scan<'t> {
    pub(crate) fn new(table: &'t mut Table, predicate: Expr) -> Self {
        let columns = table.schema().column_names();
        Self {
            table,
            predicate,
            columns,
            page: 1,
            slot: 0,
        }
    }

    /// Advance to the next matching record, or `Ok(None)` once the cursor
    /// has left the last allocated page. Exhaustion resets the cursor so
    /// the scan can be replayed.
    pub fn next(&mut self) -> DbResult<Option<Record>> {
        let size = self.table.schema().record_size();
        let slots = self.table.schema().slots_per_page();

        loop {
            if self.page >= self.table.pool_total_pages() {
                self.reset();
                return Ok(None);
            }
            let (page_num, slot) = (self.page, self.slot);
            self.advance(slots);

            self.table.pool().pin(page_num)?;
            let image = {
                let result = self
                    .table
                    .pool()
                    .page(page_num)
                    .map(|page| page[slot * size..(slot + 1) * size].to_vec());
                self.table.pool().unpin(page_num)?;
                result?
            };

            let record = Record {
                id: RecordId::new(page_num as i32, slot as i32),
                data: image,
            };
            let values = record.decode_all(self.table.schema())?;
            let ctx = EvalContext {
                columns: &self.columns,
            };
            match ctx.eval(&self.predicate, &values)? {
                Value::Bool(true) => return Ok(Some(record)),
                Value::Bool(false) => continue,
                other => {
                    return Err(DbError::TypeMismatch(format!(
                        "predicate evaluated to {other:?}, expected a boolean"
                    )));
                }
            }
        }
    }

    fn advance(&mut self, slots: usize) {
        self.slot += 1;
        if self.slot >= slots {
            self.slot = 0;
            self.page += 1;
        }
    }

    fn reset(&mut self) {
        self.page = 1;
        self.slot = 0;
    }
}
