//! Arena-backed job table and queue order.
//!
//! The table is the only shared mutable state of a scheduler. It is always
//! accessed under the scheduler's mutex and never while a job body runs.

use smallvec::SmallVec;
use std::collections::VecDeque;

use super::job::Work;
use super::{JobError, JobHandle};

/// Observed state of a handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum HandleState {
    /// Waiting in the queue at `position` (0 = head).
    Queued { position: usize },
    Running,
    Complete,
    Cancelled,
}

enum SlotState {
    Vacant,
    Queued { work: Work, pending_deps: usize },
    Running,
    Cancelled,
}

struct Slot {
    /// Generation of the current (or most recent) occupant. Bumped when the
    /// occupant completes, which turns outstanding handles stale.
    generation: u32,
    state: SlotState,
    /// Slots waiting for this one to complete.
    dependents: SmallVec<[u32; 4]>,
}

pub(crate) struct JobTable {
    slots: Vec<Slot>,
    free: Vec<u32>,
    /// Queued slot indices in drain order.
    queue: VecDeque<u32>,
    running: Option<u32>,
    accepting: bool,
}

impl JobTable {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            queue: VecDeque::new(),
            running: None,
            accepting: true,
        }
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Nothing queued and nothing running.
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty() && self.running.is_none()
    }

    pub fn queued_handles(&self) -> Vec<JobHandle> {
        self.queue
            .iter()
            .map(|&index| JobHandle::new(index, self.slots[index as usize].generation))
            .collect()
    }

    pub fn state(&self, handle: JobHandle) -> Result<HandleState, JobError> {
        let slot = self
            .slots
            .get(handle.index as usize)
            .ok_or(JobError::InvalidHandle(handle))?;

        if slot.generation != handle.generation {
            // Generations only advance on completion.
            return Ok(HandleState::Complete);
        }

        Ok(match slot.state {
            SlotState::Vacant => HandleState::Complete,
            SlotState::Running => HandleState::Running,
            SlotState::Cancelled => HandleState::Cancelled,
            SlotState::Queued { .. } => {
                let position = self
                    .queue
                    .iter()
                    .position(|&index| index == handle.index)
                    .unwrap_or(0);
                HandleState::Queued { position }
            }
        })
    }

    /// Adds `work` to the queue behind `deps`.
    ///
    /// - No dependencies: appended at the tail.
    /// - Some dependency still queued: inserted right after the last queued one.
    /// - Dependencies all running or complete: inserted at the head.
    pub fn insert(&mut self, work: Work, deps: &[JobHandle]) -> Result<JobHandle, JobError> {
        if !self.accepting {
            return Err(JobError::ShutDown);
        }

        let mut pending_deps = 0;
        let mut waiting_on: SmallVec<[u32; 4]> = SmallVec::new();
        let mut after: Option<usize> = None;
        let mut has_deps = false;

        for &dep in deps.iter().filter(|dep| dep.is_some()) {
            has_deps = true;
            match self.state(dep)? {
                HandleState::Queued { position } => {
                    pending_deps += 1;
                    waiting_on.push(dep.index);
                    after = Some(after.map_or(position, |p| p.max(position)));
                }
                HandleState::Running => {
                    pending_deps += 1;
                    waiting_on.push(dep.index);
                }
                HandleState::Complete | HandleState::Cancelled => {}
            }
        }

        let index = self.allocate();
        let slot = &mut self.slots[index as usize];
        slot.state = SlotState::Queued { work, pending_deps };
        let handle = JobHandle::new(index, slot.generation);

        for dep in waiting_on {
            self.slots[dep as usize].dependents.push(index);
        }

        match after {
            Some(position) => self.queue.insert(position + 1, index),
            None if has_deps => self.queue.push_front(index),
            None => self.queue.push_back(index),
        }

        Ok(handle)
    }

    /// Removes the first job in queue order whose dependencies have all
    /// completed, and marks it running.
    pub fn take_ready(&mut self) -> Option<(JobHandle, Work)> {
        let position = self.queue.iter().position(|&index| {
            matches!(
                self.slots[index as usize].state,
                SlotState::Queued { pending_deps: 0, .. }
            )
        })?;
        let index = self.queue.remove(position)?;
        let slot = &mut self.slots[index as usize];

        match std::mem::replace(&mut slot.state, SlotState::Running) {
            SlotState::Queued { work, .. } => {
                self.running = Some(index);
                Some((JobHandle::new(index, slot.generation), work))
            }
            other => {
                slot.state = other;
                None
            }
        }
    }

    /// Marks a running job complete, releases its dependents and recycles the slot.
    pub fn complete(&mut self, handle: JobHandle) {
        let Some(slot) = self.slots.get_mut(handle.index as usize) else {
            return;
        };
        if slot.generation != handle.generation {
            return;
        }

        slot.state = SlotState::Vacant;
        slot.generation = slot.generation.wrapping_add(1).max(1);
        let dependents = std::mem::take(&mut slot.dependents);

        for dependent in dependents {
            if let SlotState::Queued { pending_deps, .. } = &mut self.slots[dependent as usize].state {
                *pending_deps = pending_deps.saturating_sub(1);
            }
        }

        if self.running == Some(handle.index) {
            self.running = None;
        }
        self.free.push(handle.index);
    }

    /// Stops accepting work.
    pub fn close(&mut self) {
        self.accepting = false;
    }

    /// Drops every queued job, marking it cancelled. Returns how many were dropped.
    pub fn cancel_queued(&mut self) -> usize {
        let dropped = self.queue.len();
        for index in self.queue.drain(..) {
            self.slots[index as usize].state = SlotState::Cancelled;
        }
        dropped
    }

    fn allocate(&mut self) -> u32 {
        if let Some(index) = self.free.pop() {
            return index;
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 1,
            state: SlotState::Vacant,
            dependents: SmallVec::new(),
        });
        index
    }
}
