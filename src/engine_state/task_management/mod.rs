//! # Task Management System
//!
//! This module provides the worker pool that runs chunk generation and mesh
//! building off the main thread.
//!
//! ## Architecture Overview
//!
//! - `TaskManager`: Central coordinator for task distribution and worker management
//! - `Task`: A unit of work that can be executed asynchronously
//! - `TaskResult`: The result of a completed task, which can spawn additional tasks
//! - `TaskChannel`: Communication channel between the main thread and one worker
//!
//! Each worker is a `std::thread` with a dedicated pair of mpsc channels. Tasks
//! are handed out round-robin, at most `MAX_TASKS_IN_FLIGHT` per worker; the
//! rest wait in a FIFO queue.
//!
//! ## Inline Mode
//!
//! A manager created with zero workers runs every task immediately on the
//! calling thread and queues its result. Results are still applied in
//! `process_completed_tasks`, so the main-thread code path is identical, but
//! the whole pipeline becomes deterministic.
//!
//! ## Task Lifecycle
//! 1. Tasks are created and published via `TaskManager::publish_task()`
//! 2. The manager distributes tasks to available worker channels using round-robin
//! 3. Workers process tasks and send results back
//! 4. Results are applied on the main thread in `process_completed_tasks()`
//!
//! ## Example Usage
//! ```
//! use voxel_world::engine_state::task_management::TaskManager;
//!
//! let mut task_manager = TaskManager::new(0);
//! assert!(task_manager.is_idle());
//! ```

pub mod task;

use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};

use log::{info, warn};
use task::{Task, TaskContext, TaskResult};

/// A communication channel between the main thread and a worker thread.
///
/// # Fields
/// - `task_sender`: Sends tasks from main thread to worker
/// - `result_receiver`: Receives task results from worker
/// - `num_tasks_in_flight`: Tracks number of tasks currently being processed
/// - `_worker`: Handle to the worker thread
#[derive(Debug)]
pub struct TaskChannel {
    task_sender: Sender<Box<dyn Task + Send>>,
    result_receiver: Receiver<Box<dyn TaskResult + Send>>,
    num_tasks_in_flight: usize,
    _worker: JoinHandle<()>,
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// # Fields
/// - `channels`: Set of active worker channels (empty in inline mode)
/// - `queued_tasks`: Tasks waiting for an available worker
/// - `inline_results`: Results of tasks already run inline, awaiting application
/// - `current_channel`: Index for round-robin scheduling
pub struct TaskManager {
    channels: Vec<TaskChannel>,
    queued_tasks: VecDeque<Box<dyn Task + Send>>,
    inline_results: VecDeque<Box<dyn TaskResult + Send>>,
    current_channel: usize,
}

/// Maximum number of tasks that can be in flight per worker channel.
///
/// Kept small so that a burst of generation requests does not starve mesh
/// builds published after it.
pub const MAX_TASKS_IN_FLIGHT: usize = 2;

impl TaskManager {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// # Arguments
    /// * `num_workers` - Number of worker threads to create. `0` selects inline mode.
    pub fn new(num_workers: usize) -> Self {
        let mut channels = Vec::with_capacity(num_workers);

        if num_workers > 0 {
            info!(
                "Starting {} task workers (available parallelism: {:?})",
                num_workers,
                thread::available_parallelism()
            );
        } else {
            info!("Running tasks inline on the main thread");
        }

        for _ in 0..num_workers {
            let (task_tx, task_rx) = channel::<Box<dyn Task + Send>>();
            let (result_tx, result_rx) = channel::<Box<dyn TaskResult + Send>>();

            let worker = thread::spawn(move || {
                while let Ok(task) = task_rx.recv() {
                    let result = task.process();
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
            });

            channels.push(TaskChannel {
                task_sender: task_tx,
                result_receiver: result_rx,
                num_tasks_in_flight: 0,
                _worker: worker,
            });
        }

        TaskManager {
            channels,
            queued_tasks: VecDeque::new(),
            inline_results: VecDeque::new(),
            current_channel: 0,
        }
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// # Returns
    /// - `Ok(())` if the task was handed to the worker
    /// - `Err(task)` if the worker has disconnected
    fn try_send_task(
        &mut self,
        task: Box<dyn Task + Send>,
        channel_idx: usize,
    ) -> Result<(), Box<dyn Task + Send>> {
        match self.channels[channel_idx].task_sender.send(task) {
            Ok(_) => {
                self.channels[channel_idx].num_tasks_in_flight += 1;
                Ok(())
            }
            Err(task) => Err(task.0),
        }
    }

    /// Finds a worker channel that can accept a new task, round-robin from the
    /// last used channel.
    ///
    /// # Returns
    /// - `Some(usize)` index of an available channel
    /// - `None` if all channels are busy or there are no channels
    fn find_available_channel(&self) -> Option<usize> {
        if self.channels.is_empty() {
            return None;
        }

        let start_channel = self.current_channel % self.channels.len();
        let mut current = start_channel;

        loop {
            if self.channels[current].num_tasks_in_flight < MAX_TASKS_IN_FLIGHT {
                return Some(current);
            }
            current = (current + 1) % self.channels.len();
            if current == start_channel {
                return None;
            }
        }
    }

    /// Publishes a new task for execution.
    ///
    /// In inline mode the task runs before this returns. Otherwise it is sent to
    /// a free worker, or queued if every worker is busy.
    ///
    /// # Returns
    /// - `true` if the task was run or handed to a worker
    /// - `false` if the task was queued
    pub fn publish_task(&mut self, task: Box<dyn Task + Send>) -> bool {
        if self.channels.is_empty() {
            self.inline_results.push_back(task.process());
            return true;
        }

        match self.find_available_channel() {
            Some(channel_idx) => match self.try_send_task(task, channel_idx) {
                Ok(_) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                    true
                }
                Err(task) => {
                    warn!("Task worker {} disconnected, queueing task", channel_idx);
                    self.queued_tasks.push_back(task);
                    false
                }
            },
            None => {
                self.queued_tasks.push_back(task);
                false
            }
        }
    }

    /// Publishes every task in order.
    pub fn publish_tasks(&mut self, tasks: Vec<Box<dyn Task + Send>>) {
        for task in tasks {
            self.publish_task(task);
        }
    }

    /// Moves queued tasks onto workers that have room, oldest first.
    ///
    /// Stops at the first task that cannot be placed. Call once per frame.
    pub fn process_queued_tasks(&mut self) {
        while !self.queued_tasks.is_empty() {
            let Some(channel_idx) = self.find_available_channel() else {
                break;
            };
            let Some(task) = self.queued_tasks.pop_front() else {
                break;
            };

            match self.try_send_task(task, channel_idx) {
                Ok(_) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => {
                    self.queued_tasks.push_front(task);
                    break;
                }
            }
        }
    }

    /// Applies all completed task results on the main thread.
    ///
    /// Follow-up tasks returned by results are published afterwards. In inline
    /// mode they run immediately, and their results are applied in the same
    /// call, so the pipeline settles before this returns.
    pub fn process_completed_tasks(&mut self, context: &mut TaskContext<'_>) {
        let mut tasks_to_queue = Vec::new();

        for channel in &mut self.channels {
            while let Ok(result) = channel.result_receiver.try_recv() {
                channel.num_tasks_in_flight = channel.num_tasks_in_flight.saturating_sub(1);
                tasks_to_queue.extend(result.handle_result(context));
            }
        }

        loop {
            while let Some(result) = self.inline_results.pop_front() {
                tasks_to_queue.extend(result.handle_result(context));
            }
            if tasks_to_queue.is_empty() {
                break;
            }
            self.publish_tasks(std::mem::take(&mut tasks_to_queue));
            if !self.channels.is_empty() {
                break;
            }
        }
    }

    /// Number of tasks handed to workers whose results have not come back.
    pub fn num_tasks_in_flight(&self) -> usize {
        self.channels
            .iter()
            .map(|channel| channel.num_tasks_in_flight)
            .sum()
    }

    /// True when nothing is queued, running, or waiting to be applied.
    pub fn is_idle(&self) -> bool {
        self.queued_tasks.is_empty()
            && self.inline_results.is_empty()
            && self.num_tasks_in_flight() == 0
    }

    pub fn num_workers(&self) -> usize {
        self.channels.len()
    }
}
