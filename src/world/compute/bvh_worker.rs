//! Background master BVH rebuilds
//!
//! Requests are box snapshots sent over a channel. The worker coalesces a
//! backlog down to the newest snapshot, builds it, and publishes the tree.
//! Shutdown is observed between builds, never inside one.

use super::bvh_data::MasterBvhTree;
use super::bvh_operations::construct_master_bvh;
use crate::config::BvhConfig;
use crate::error::VoxelResult;
use crate::physics::AABB;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How often an idle worker checks the shutdown flag
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Rebuild worker state
pub struct BvhRebuildWorker {
    pub config: BvhConfig,
    request_tx: Sender<Vec<AABB>>,
    request_rx: Receiver<Vec<AABB>>,
    result_tx: Sender<MasterBvhTree>,
    result_rx: Receiver<MasterBvhTree>,
    pub worker_thread: Option<JoinHandle<()>>,
    pub shutdown: Arc<AtomicBool>,
    pub builds_completed: Arc<AtomicU64>,
}

/// Create a stopped worker
pub fn create_bvh_worker(config: BvhConfig) -> BvhRebuildWorker {
    let (request_tx, request_rx) = unbounded();
    let (result_tx, result_rx) = unbounded();
    BvhRebuildWorker {
        config,
        request_tx,
        request_rx,
        result_tx,
        result_rx,
        worker_thread: None,
        shutdown: Arc::new(AtomicBool::new(false)),
        builds_completed: Arc::new(AtomicU64::new(0)),
    }
}

/// Start the background thread; no-op if already running
pub fn start(worker: &mut BvhRebuildWorker) -> VoxelResult<()> {
    if worker.worker_thread.is_some() {
        return Ok(());
    }
    worker.shutdown.store(false, Ordering::Release);

    let requests = worker.request_rx.clone();
    let results = worker.result_tx.clone();
    let config = worker.config.clone();
    let shutdown = Arc::clone(&worker.shutdown);
    let builds = Arc::clone(&worker.builds_completed);

    let handle = thread::Builder::new()
        .name("bvh-rebuild".to_string())
        .spawn(move || worker_loop(requests, results, config, shutdown, builds))?;
    worker.worker_thread = Some(handle);

    log::info!("[bvh_worker::start] Rebuild worker started");
    Ok(())
}

/// Signal shutdown and wait for the current build to finish
pub fn stop(worker: &mut BvhRebuildWorker) {
    worker.shutdown.store(true, Ordering::Release);
    if let Some(handle) = worker.worker_thread.take() {
        if handle.join().is_err() {
            log::error!("[bvh_worker::stop] Rebuild worker panicked");
        }
        log::info!(
            "[bvh_worker::stop] Rebuild worker stopped after {} builds",
            worker.builds_completed.load(Ordering::Acquire)
        );
    }
}

/// Queue a snapshot for rebuilding
pub fn request_rebuild(worker: &BvhRebuildWorker, boxes: Vec<AABB>) -> VoxelResult<()> {
    worker.request_tx.send(boxes)?;
    Ok(())
}

/// Newest finished tree, discarding older ones
pub fn try_take_latest(worker: &BvhRebuildWorker) -> Option<MasterBvhTree> {
    worker.result_rx.try_iter().last()
}

/// Block until a tree is published or `timeout` elapses
pub fn wait_for_result(worker: &BvhRebuildWorker, timeout: Duration) -> Option<MasterBvhTree> {
    worker.result_rx.recv_timeout(timeout).ok()
}

fn worker_loop(
    requests: Receiver<Vec<AABB>>,
    results: Sender<MasterBvhTree>,
    config: BvhConfig,
    shutdown: Arc<AtomicBool>,
    builds: Arc<AtomicU64>,
) {
    while !shutdown.load(Ordering::Acquire) {
        let boxes = match requests.recv_timeout(POLL_INTERVAL) {
            Ok(first) => {
                let latest = requests.try_iter().last();
                if latest.is_some() {
                    log::debug!("[bvh_worker::worker_loop] Skipping stale snapshots");
                }
                latest.unwrap_or(first)
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        let tree = construct_master_bvh(&boxes, &config);
        builds.fetch_add(1, Ordering::AcqRel);
        if results.send(tree).is_err() {
            break;
        }
    }
}

impl Drop for BvhRebuildWorker {
    fn drop(&mut self) {
        stop(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::aabb::create_aabb;
    use cgmath::Point3;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn row(count: usize) -> Vec<AABB> {
        (0..count)
            .map(|i| {
                let x = i as f32 * 2.0;
                create_aabb(Point3::new(x, 0.0, 0.0), Point3::new(x + 1.0, 1.0, 1.0))
            })
            .collect()
    }

    #[test]
    fn test_rebuild_round_trip() {
        init();
        let mut worker = create_bvh_worker(BvhConfig::default());
        start(&mut worker).unwrap();

        request_rebuild(&worker, row(16)).unwrap();
        let tree = wait_for_result(&worker, Duration::from_secs(10)).unwrap();
        assert_eq!(tree.boxes.len(), 16);
        assert!(tree.nodes_used > 1);

        stop(&mut worker);
        assert!(worker.worker_thread.is_none());
        assert_eq!(worker.builds_completed.load(Ordering::Acquire), 1);
    }

    #[test]
    fn test_backlog_coalesces_to_latest() {
        init();
        let mut worker = create_bvh_worker(BvhConfig::default());
        for count in [3, 5, 7] {
            request_rebuild(&worker, row(count)).unwrap();
        }
        start(&mut worker).unwrap();

        let tree = wait_for_result(&worker, Duration::from_secs(10)).unwrap();
        assert_eq!(tree.boxes.len(), 7);

        stop(&mut worker);
        assert!(try_take_latest(&worker).is_none());
        assert_eq!(worker.builds_completed.load(Ordering::Acquire), 1);
    }

    #[test]
    fn test_stop_idle_worker() {
        init();
        let mut worker = create_bvh_worker(BvhConfig::default());
        start(&mut worker).unwrap();
        stop(&mut worker);
        stop(&mut worker);
        assert!(try_take_latest(&worker).is_none());
    }
}
