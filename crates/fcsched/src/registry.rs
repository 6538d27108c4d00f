//! Fixed-capacity task registry.
//!
//! Storage order is registration order. It only serves as the deterministic
//! tie-break between equally scored tasks; it carries no fairness meaning.

use heapless::Vec;

use crate::error::SchedulerError;
use crate::task::{TaskDescriptor, TaskId};

/// Maximum number of tasks one scheduler can hold.
pub const MAX_TASKS: usize = 32;

pub struct TaskRegistry {
    tasks: Vec<TaskDescriptor, MAX_TASKS>,
}

impl TaskRegistry {
    pub const fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Appends a descriptor and returns its storage index.
    pub(crate) fn insert(&mut self, task: TaskDescriptor) -> Result<usize, SchedulerError> {
        if self.position(task.id).is_some() {
            return Err(SchedulerError::DuplicateTask(task.id));
        }
        let index = self.tasks.len();
        self.tasks
            .push(task)
            .map_err(|_| SchedulerError::RegistryFull(MAX_TASKS))?;
        Ok(index)
    }

    pub fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    pub fn get(&self, id: TaskId) -> Option<&TaskDescriptor> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub(crate) fn index_of(&self, id: TaskId) -> Result<usize, SchedulerError> {
        self.position(id).ok_or(SchedulerError::UnknownTask(id))
    }

    pub fn at(&self, index: usize) -> Option<&TaskDescriptor> {
        self.tasks.get(index)
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> &mut TaskDescriptor {
        &mut self.tasks[index]
    }

    pub(crate) fn slot_id(&self, index: usize) -> TaskId {
        self.tasks[index].id
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskDescriptor> {
        self.tasks.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut TaskDescriptor> {
        self.tasks.iter_mut()
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}
