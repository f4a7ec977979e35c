use std::sync::Mutex;
use std::sync::mpsc;

/// Work posted to the platform UI thread.
pub type UiTask = Box<dyn FnOnce() + Send + 'static>;

/// Runs tasks on the platform main/UI thread, in posting order.
pub trait UiDispatcher: Send + Sync {
    fn post(&self, task: UiTask);
}

pub const LOOPER_THREAD_NAME: &str = "ocs-main-looper";

/// Single dedicated thread draining a FIFO queue, standing in for the
/// platform main looper.
pub struct LooperDispatcher {
    tx: Mutex<mpsc::Sender<UiTask>>,
}

impl LooperDispatcher {
    pub fn new() -> std::io::Result<Self> {
        let (tx, rx) = mpsc::channel::<UiTask>();
        std::thread::Builder::new()
            .name(LOOPER_THREAD_NAME.to_string())
            .spawn(move || {
                while let Ok(task) = rx.recv() {
                    task();
                }
                tracing::debug!("main looper stopped");
            })?;
        Ok(Self { tx: Mutex::new(tx) })
    }
}

impl UiDispatcher for LooperDispatcher {
    fn post(&self, task: UiTask) {
        let tx = self.tx.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(mpsc::SendError(task)) = tx.send(task) {
            tracing::warn!("main looper gone, running task inline");
            task();
        }
    }
}
