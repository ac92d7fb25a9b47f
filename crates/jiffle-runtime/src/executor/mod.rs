//! Asynchronous evaluation on a fixed-size worker pool.
//!
//! Each submitted [`RuntimeUnit`] runs one full pass on a single pool
//! thread, independent of other submissions. Submitting returns a
//! [`TaskHandle`] at once; the caller may cancel the task or block on its
//! output. Executor-wide [`ExecutorListener`]s are told how every task
//! ended.
//!
//! Units own their destination rasters, so two tasks never share one.
//! Progress callbacks run on the worker thread evaluating the task.

use crate::cancel::CancelToken;
use crate::config::ExecutorConfig;
use crate::error::{Result, RuntimeError};
use crate::progress::ProgressListener;
use crate::raster::RasterSurface;
use crate::unit::RuntimeUnit;
use indexmap::IndexMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// Destination rasters of a finished task, by image name.
#[derive(Clone, Default)]
pub struct TaskOutput {
    pub destinations: IndexMap<String, Arc<dyn RasterSurface>>,
}

impl TaskOutput {
    pub fn destination(&self, name: &str) -> Option<&Arc<dyn RasterSurface>> {
        self.destinations.get(name)
    }
}

impl fmt::Debug for TaskOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskOutput")
            .field("destinations", &self.destinations.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// How a task ended. Exactly one is delivered per task.
#[derive(Debug, Clone)]
pub struct ExecutorEvent {
    pub task_id: u64,
    pub outcome: std::result::Result<TaskOutput, RuntimeError>,
}

/// Receives the outcome of every task an executor runs.
pub trait ExecutorListener: Send + Sync {
    fn on_event(&self, event: &ExecutorEvent);
}

/// Handle to a submitted task.
#[derive(Debug)]
pub struct TaskHandle {
    id: u64,
    cancel: CancelToken,
    receiver: mpsc::Receiver<std::result::Result<TaskOutput, RuntimeError>>,
}

impl TaskHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Ask the task to stop at the next row.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Block until the task ends.
    pub fn wait(self) -> Result<TaskOutput> {
        self.receiver.recv().map_err(|_| {
            RuntimeError::Internal(format!("task {} ended without an outcome", self.id))
        })?
    }
}

/// Fixed-size pool evaluating runtime units.
pub struct Executor {
    pool: rayon::ThreadPool,
    next_id: AtomicU64,
    listeners: Arc<RwLock<Vec<Arc<dyn ExecutorListener>>>>,
}

impl Executor {
    pub fn new(config: &ExecutorConfig) -> Result<Self> {
        let prefix = config.thread_name_prefix.clone();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .thread_name(move |i| format!("{}{}", prefix, i))
            .build()
            .map_err(|e| RuntimeError::Internal(format!("cannot start worker pool: {}", e)))?;
        info!(threads = pool.current_num_threads(), "executor started");
        Ok(Self {
            pool,
            next_id: AtomicU64::new(1),
            listeners: Arc::new(RwLock::new(Vec::new())),
        })
    }

    /// Number of worker threads.
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn add_listener(&self, listener: Arc<dyn ExecutorListener>) {
        self.listeners
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(listener);
    }

    /// Queue a full pass of `unit`.
    pub fn submit(
        &self,
        mut unit: RuntimeUnit,
        mut progress: Box<dyn ProgressListener>,
    ) -> TaskHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let cancel = unit.cancel_token();
        let (sender, receiver) = mpsc::channel();
        let listeners = Arc::clone(&self.listeners);
        info!(task = id, unit = unit.name(), "task submitted");

        self.pool.spawn(move || {
            let outcome = unit
                .evaluate_all(progress.as_mut())
                .map(|()| collect_output(&mut unit));
            match &outcome {
                Ok(_) => info!(task = id, "task completed"),
                Err(error) => info!(task = id, %error, "task ended"),
            }

            let event = ExecutorEvent {
                task_id: id,
                outcome,
            };
            for listener in listeners.read().unwrap_or_else(|e| e.into_inner()).iter() {
                listener.on_event(&event);
            }
            if sender.send(event.outcome).is_err() {
                debug!(task = id, "task handle dropped before completion");
            }
        });

        TaskHandle {
            id,
            cancel,
            receiver,
        }
    }
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("threads", &self.threads())
            .finish_non_exhaustive()
    }
}

fn collect_output(unit: &mut RuntimeUnit) -> TaskOutput {
    let destinations = unit
        .bound_destinations()
        .into_iter()
        .filter_map(|name| {
            let raster = unit.take_destination(&name)?;
            Some((name, Arc::<dyn RasterSurface>::from(raster)))
        })
        .collect();
    TaskOutput { destinations }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::compile_program;
    use crate::config::RuntimeConfig;
    use crate::progress::NullProgressListener;
    use crate::raster::MemoryRaster;
    use crate::unit::EvaluationModel;
    use jiffle_ast::{ImageRole, SourceFile};
    use jiffle_parser::parse_program;
    use jiffle_resolve::{analyze, RoleMap};
    use std::sync::Mutex;

    fn unit(source: &str, size: i64) -> RuntimeUnit {
        let file = SourceFile::new("test", source);
        let program = parse_program(&file).unwrap();
        let roles: RoleMap = [("dest".to_string(), ImageRole::Destination)]
            .into_iter()
            .collect();
        let analysis = analyze(&program, &roles).unwrap();
        let program = Arc::new(compile_program(&analysis.ir).unwrap());
        let mut unit = RuntimeUnit::new(
            "task",
            program,
            EvaluationModel::Direct,
            RuntimeConfig::default(),
        );
        unit.bind_destination("dest", Box::new(MemoryRaster::new(size, size, 1)))
            .unwrap();
        unit
    }

    #[derive(Default)]
    struct Events(Mutex<Vec<(u64, bool)>>);

    impl ExecutorListener for Events {
        fn on_event(&self, event: &ExecutorEvent) {
            self.0
                .lock()
                .unwrap()
                .push((event.task_id, event.outcome.is_ok()));
        }
    }

    fn executor(threads: usize) -> Executor {
        Executor::new(&ExecutorConfig {
            threads,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_tasks_run_independently() {
        let executor = executor(2);
        assert_eq!(executor.threads(), 2);
        let a = executor.submit(unit("dest = x();", 4), Box::new(NullProgressListener));
        let b = executor.submit(unit("dest = y() * 10;", 4), Box::new(NullProgressListener));
        assert_ne!(a.id(), b.id());

        let a = a.wait().unwrap();
        let b = b.wait().unwrap();
        assert_eq!(a.destination("dest").unwrap().get_sample(3, 1, 0), Some(3.0));
        assert_eq!(b.destination("dest").unwrap().get_sample(3, 1, 0), Some(10.0));
    }

    #[test]
    fn test_listeners_see_every_outcome() {
        let executor = executor(1);
        let events = Arc::new(Events::default());
        executor.add_listener(events.clone());

        let ok = executor.submit(unit("dest = 1;", 2), Box::new(NullProgressListener));
        let cancelled_unit = unit("dest = 1;", 2);
        cancelled_unit.cancel_token().cancel();
        let cancelled = executor.submit(cancelled_unit, Box::new(NullProgressListener));

        let ok_id = ok.id();
        let cancelled_id = cancelled.id();
        assert!(ok.wait().is_ok());
        assert_eq!(cancelled.wait().unwrap_err(), RuntimeError::Cancelled);

        let mut seen = events.0.lock().unwrap().clone();
        seen.sort();
        assert_eq!(seen, vec![(ok_id, true), (cancelled_id, false)]);
    }
}
