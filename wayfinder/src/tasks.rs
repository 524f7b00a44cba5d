//! Background work owned by a coordinator's flow.
//!
//! A coordinator that spawns domain work (a fake sign-in request, a polling
//! loop) tracks it here so everything is aborted when the flow finishes or
//! the coordinator is dropped.

use std::future::Future;

use tokio::task::AbortHandle;

#[derive(Debug, Default)]
pub struct FlowTasks {
    handles: Vec<AbortHandle>,
}

impl FlowTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a future on the runtime and keep it on the flow's leash.
    pub fn spawn<F>(&mut self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handles.retain(|handle| !handle.is_finished());
        self.handles.push(tokio::spawn(future).abort_handle());
    }

    /// Abort everything still running. Tasks stop at their next await point.
    pub fn abort_all(&mut self) {
        for handle in self.handles.drain(..) {
            handle.abort();
        }
    }

    pub fn active(&self) -> usize {
        self.handles.iter().filter(|handle| !handle.is_finished()).count()
    }
}

impl Drop for FlowTasks {
    fn drop(&mut self) {
        self.abort_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn abort_all_stops_running_tasks() {
        let mut tasks = FlowTasks::new();
        tasks.spawn(async {
            loop {
                tokio::time::sleep(tokio::time::Duration::from_secs(1)).await;
            }
        });
        tasks.spawn(async {
            loop {
                tokio::time::sleep(tokio::time::Duration::from_secs(1)).await;
            }
        });
        assert_eq!(tasks.active(), 2);

        tasks.abort_all();
        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
        assert_eq!(tasks.active(), 0);
    }

    #[tokio::test]
    async fn dropping_the_tracker_aborts_its_tasks() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        {
            let mut tasks = FlowTasks::new();
            tasks.spawn(async move {
                tokio::time::sleep(tokio::time::Duration::from_secs(30)).await;
                let _ = tx.send(());
            });
        }
        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
        // The task never got to send.
        assert!(rx.try_recv().is_err());
    }
}
