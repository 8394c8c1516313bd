//! Drag-and-drop gesture resolution.
//!
//! A drag gesture reaches the board twice: once while hovering over a
//! different column (the task is moved right away for live feedback) and
//! once on drop (to settle the final position within the column). Both
//! resolve the "over" target against the current snapshot, which already
//! reflects the hover move.

use crate::facade::BoardStore;
use crate::types::Board;

/// What the pointer is over: another task card, or a column's empty area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget<'a> {
    Task(&'a str),
    Column(&'a str),
}

/// Resolved move parameters for a gesture step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan {
    pub source_column_id: String,
    pub dest_column_id: String,
    pub source_index: usize,
    pub dest_index: usize,
}

/// Resolve the active task and target to column ids and indexes.
///
/// Over a task: the destination index is that task's index. Over a column:
/// the end of the column.
pub fn resolve(board: &Board, active_id: &str, over: DropTarget<'_>) -> Option<MovePlan> {
    let source_column_id = board.owning_column(active_id)?.clone();
    let source_index = board.column(&source_column_id)?.position(active_id)?;

    let (dest_column_id, dest_index) = match over {
        DropTarget::Task(over_id) => {
            let column_id = board.owning_column(over_id)?.clone();
            let index = board.column(&column_id)?.position(over_id)?;
            (column_id, index)
        }
        DropTarget::Column(column_id) => {
            let column = board.column(column_id)?;
            (column.id.clone(), column.task_ids.len())
        }
    };

    Some(MovePlan {
        source_column_id,
        dest_column_id,
        source_index,
        dest_index,
    })
}

impl BoardStore {
    /// Hover step: relocate the task only when it is over a different column.
    pub fn drag_over(&mut self, active_id: &str, over: DropTarget<'_>) -> bool {
        let Some(plan) = resolve(self.board(), active_id, over) else {
            return false;
        };
        if plan.source_column_id == plan.dest_column_id {
            return false;
        }
        self.apply_plan(active_id, plan)
    }

    /// Drop step: settle the position within the column the task ended up in.
    pub fn drag_end(&mut self, active_id: &str, over: Option<DropTarget<'_>>) -> bool {
        let Some(over) = over else {
            return false;
        };
        let Some(plan) = resolve(self.board(), active_id, over) else {
            return false;
        };
        if plan.source_column_id != plan.dest_column_id || plan.source_index == plan.dest_index {
            return false;
        }
        self.apply_plan(active_id, plan)
    }

    fn apply_plan(&mut self, active_id: &str, plan: MovePlan) -> bool {
        self.move_task(
            active_id,
            &plan.source_column_id,
            &plan.dest_column_id,
            plan.source_index,
            plan.dest_index,
        )
    }
}
