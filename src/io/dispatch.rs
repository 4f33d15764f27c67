use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, error};

use crate::io::backend::{BackendError, StatusBackend};
use crate::model::board::TaskId;
use crate::model::status::{StatusResponse, StatusUpdate};

/// A backend reply, tagged with the task it answers
#[derive(Debug)]
pub struct Completion {
    pub task_id: TaskId,
    pub outcome: Result<StatusResponse, BackendError>,
}

/// Runs status updates on worker threads so the UI loop never blocks on
/// the network. Replies are collected with [`Dispatcher::poll`] in the
/// order they arrive, which need not match the order they were sent.
pub struct Dispatcher {
    backend: Arc<dyn StatusBackend>,
    tx: mpsc::Sender<Completion>,
    rx: mpsc::Receiver<Completion>,
    in_flight: usize,
}

impl Dispatcher {
    pub fn new(backend: Arc<dyn StatusBackend>) -> Self {
        let (tx, rx) = mpsc::channel();
        Dispatcher {
            backend,
            tx,
            rx,
            in_flight: 0,
        }
    }

    /// Use `backend` for updates dispatched from now on. Requests already
    /// running keep the backend they started with.
    pub fn set_backend(&mut self, backend: Arc<dyn StatusBackend>) {
        self.backend = backend;
    }

    /// Updates sent whose replies have not been collected yet
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn dispatch(&mut self, update: StatusUpdate) {
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        let task_id = update.task_id;
        self.in_flight += 1;

        let spawned = thread::Builder::new()
            .name(format!("status-{}", task_id))
            .spawn(move || {
                let outcome = backend.update_status(&update);
                let _ = tx.send(Completion { task_id, outcome });
            });
        if let Err(e) = spawned {
            // Still deliver a completion so the optimistic move is rolled back
            error!(task_id, error = %e, "could not spawn status update thread");
            let _ = self.tx.send(Completion {
                task_id,
                outcome: Err(BackendError::Transport(format!(
                    "could not start request: {}",
                    e
                ))),
            });
        } else {
            debug!(task_id, "status update dispatched");
        }
    }

    /// Non-blocking: every reply that has arrived so far
    pub fn poll(&mut self) -> Vec<Completion> {
        let mut done = Vec::new();
        while let Ok(completion) = self.rx.try_recv() {
            done.push(completion);
        }
        self.in_flight = self.in_flight.saturating_sub(done.len());
        done
    }

    /// Block until everything in flight has replied or `timeout` passes
    pub fn wait(&mut self, timeout: Duration) -> Vec<Completion> {
        let deadline = Instant::now() + timeout;
        let mut done = Vec::new();
        while self.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match self.rx.recv_timeout(remaining) {
                Ok(completion) => {
                    self.in_flight -= 1;
                    done.push(completion);
                }
                Err(_) => break,
            }
        }
        done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Condvar, Mutex};

    /// Backend that blocks each task until the test releases it
    struct Gate {
        open: Mutex<Vec<TaskId>>,
        cv: Condvar,
    }

    impl Gate {
        fn new() -> Arc<Self> {
            Arc::new(Gate {
                open: Mutex::new(Vec::new()),
                cv: Condvar::new(),
            })
        }

        fn release(&self, task_id: TaskId) {
            self.open.lock().unwrap().push(task_id);
            self.cv.notify_all();
        }
    }

    impl StatusBackend for Gate {
        fn update_status(&self, update: &StatusUpdate) -> Result<StatusResponse, BackendError> {
            let mut open = self.open.lock().unwrap();
            while !open.contains(&update.task_id) {
                open = self.cv.wait(open).unwrap();
            }
            Ok(StatusResponse::ok(update.status.clone()))
        }
    }

    fn poll_until_some(dispatcher: &mut Dispatcher) -> Vec<Completion> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let done = dispatcher.poll();
            if !done.is_empty() || Instant::now() >= deadline {
                return done;
            }
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn completions_arrive_in_reply_order() {
        let gate = Gate::new();
        let mut dispatcher = Dispatcher::new(gate.clone());
        dispatcher.dispatch(StatusUpdate::new(1, "done"));
        dispatcher.dispatch(StatusUpdate::new(2, "todo"));
        assert_eq!(dispatcher.in_flight(), 2);
        assert!(dispatcher.poll().is_empty());

        gate.release(2);
        let first = poll_until_some(&mut dispatcher);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].task_id, 2);
        assert_eq!(dispatcher.in_flight(), 1);

        gate.release(1);
        let second = dispatcher.wait(Duration::from_secs(5));
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].task_id, 1);
        assert_eq!(dispatcher.in_flight(), 0);
    }

    struct Refuse;

    impl StatusBackend for Refuse {
        fn update_status(&self, _: &StatusUpdate) -> Result<StatusResponse, BackendError> {
            Err(BackendError::Rejected {
                message: "closed".into(),
            })
        }
    }

    #[test]
    fn swapped_backend_serves_later_updates() {
        let mut dispatcher = Dispatcher::new(Gate::new());
        dispatcher.set_backend(Arc::new(Refuse));
        dispatcher.dispatch(StatusUpdate::new(3, "done"));

        let done = dispatcher.wait(Duration::from_secs(5));
        assert_eq!(done.len(), 1);
        assert_eq!(
            done[0].outcome,
            Err(BackendError::Rejected {
                message: "closed".into()
            })
        );
    }
}
