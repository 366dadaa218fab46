//! Task status model
//!
//! Owns the ordered batch task list and every status transition. At most one
//! task is `Running` at a time: promoting a task to `Running` demotes the
//! previous runner back to `Normal`.
//!
//! All index-taking methods panic on an out-of-range index; callers enumerate
//! indices from [`TaskModel::len`].

use std::path::PathBuf;
use std::sync::mpsc;

use tracing::debug;

use crate::types::{ReportPaths, Task, TaskStatus};

/// Notification that the task at `index` changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskChanged {
    pub index: usize,
}

#[derive(Debug, Default)]
pub struct TaskModel {
    tasks: Vec<Task>,
    running: Option<usize>,
    observers: Vec<mpsc::Sender<TaskChanged>>,
}

impl TaskModel {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            running: None,
            observers: Vec::new(),
        }
    }

    /// Replace the whole list (catalog repopulation) and notify every index.
    pub fn replace(&mut self, tasks: Vec<Task>) {
        let notify_upto = self.tasks.len().max(tasks.len());
        self.tasks = tasks;
        self.running = None;
        for index in 0..notify_upto {
            self.notify(index);
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, index: usize) -> &Task {
        &self.tasks[index]
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Index of the task currently `Running`, if any.
    pub fn running_index(&self) -> Option<usize> {
        self.running
    }

    /// Register an observer; it receives one [`TaskChanged`] per mutated index.
    pub fn subscribe(&mut self) -> mpsc::Receiver<TaskChanged> {
        let (tx, rx) = mpsc::channel();
        self.observers.push(tx);
        rx
    }

    pub fn set_status(&mut self, index: usize, status: TaskStatus) {
        let previous = self.tasks[index].status;

        if status == TaskStatus::Running {
            if let Some(other) = self.running.filter(|&other| other != index) {
                self.tasks[other].status = TaskStatus::Normal;
                debug!(index = other, "demoted previously running task");
                self.notify(other);
            }
            self.running = Some(index);
        } else if self.running == Some(index) {
            self.running = None;
        }

        self.tasks[index].status = status;
        debug!(index, from = %previous, to = %status, "task status changed");
        self.notify(index);
    }

    pub fn set_report_path(
        &mut self,
        index: usize,
        map: impl Into<PathBuf>,
        table: impl Into<PathBuf>,
    ) {
        self.tasks[index].report = Some(ReportPaths {
            map: map.into(),
            table: table.into(),
        });
        self.notify(index);
    }

    pub fn set_error_message(&mut self, index: usize, message: impl Into<String>) {
        self.tasks[index].error_detail = Some(message.into());
        self.notify(index);
    }

    fn notify(&mut self, index: usize) {
        // Drop observers whose receiver is gone
        self.observers
            .retain(|tx| tx.send(TaskChanged { index }).is_ok());
    }
}
