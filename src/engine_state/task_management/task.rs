//! # Task System Core Traits
//!
//! This module defines the fundamental building blocks of the task system.
//!
//! ## Core Components
//! - `Task`: A unit of work that runs on a worker thread
//! - `TaskResult`: The immutable outcome of a task, applied on the main thread
//! - `TaskContext`: The engine state a result may touch while being applied
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. The task's `process()` method is called on a worker thread
//! 3. The task returns a boxed `TaskResult`
//! 4. The result's `handle_result()` is called on the main thread with a `TaskContext`
//! 5. The result can spawn follow-up tasks
//!
//! ## Thread Safety
//! Tasks own everything they read (snapshots, `Arc`s). Nothing on a worker ever
//! touches the world store; only `handle_result` does, on the main thread.

use web_time::Instant;

use crate::engine_state::{
    rendering::meshing::MeshManager,
    voxels::{streaming::StreamingManager, world::WorldStore},
};

/// The main-thread state available while applying a task result.
pub struct TaskContext<'a> {
    /// The world store, for inserting generated chunks and installing meshes
    pub world: &'a mut WorldStore,
    /// The streaming manager, which decides whether a generated chunk is still wanted
    pub streaming: &'a mut StreamingManager,
    /// The mesh manager, which tracks in-flight mesh builds
    pub mesh_manager: &'a mut MeshManager,
    /// The time at which results are being applied
    pub now: Instant,
}

/// A trait representing a unit of work that can be executed asynchronously.
///
/// Tasks are the primary mechanism for offloading work from the main thread to
/// background workers. They should own all the data they need.
pub trait Task: Send {
    /// Processes the task and returns a result.
    ///
    /// Runs on a worker thread (or inline when the manager has no workers).
    /// Failures are reported through the result, never by panicking.
    ///
    /// # Returns
    /// A boxed `TaskResult` that will be processed on the main thread.
    fn process(&self) -> Box<dyn TaskResult + Send>;
}

/// A trait representing the result of processing a `Task`.
pub trait TaskResult: Send {
    /// Handles the result of a completed task on the main thread.
    ///
    /// # Arguments
    /// * `context` - The engine state the result may update
    ///
    /// # Returns
    /// Follow-up tasks to schedule (can be empty).
    fn handle_result(self: Box<Self>, context: &mut TaskContext<'_>) -> Vec<Box<dyn Task + Send>>;
}
