use std::sync::mpsc::{self, Receiver, Sender};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Submit handle for the render thread. Cheap to clone and usable from any
/// thread; the paired [`RenderLoop`] executes everything submitted here.
pub struct RenderDispatcher {
    tx: Sender<Job>,
}

/// The executing end of a [`render_channel`]. `run` must be called on the
/// thread that owns the graphics context; every submitted job runs there.
pub struct RenderLoop {
    rx: Receiver<Job>,
}

/// Creates a dispatcher/loop pair.
///
/// All graphics-context work (device setup, buffer uploads, draw submission)
/// has to happen on a single thread. Other threads hand such work over via
/// [`RenderDispatcher::submit`], which blocks until the loop has executed it.
pub fn render_channel() -> (RenderDispatcher, RenderLoop) {
    let (tx, rx) = mpsc::channel::<Job>();
    (RenderDispatcher { tx }, RenderLoop { rx })
}

impl Clone for RenderDispatcher {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl RenderDispatcher {
    /// Runs `job` on the render thread and blocks until it has finished,
    /// returning its result.
    ///
    /// Must not be called from inside a running job: the nested submission
    /// would wait on the loop that is busy executing its caller.
    pub fn submit<F, R>(&self, job: F) -> R
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (done_tx, done_rx) = mpsc::sync_channel::<R>(1);
        let task: Job = Box::new(move || {
            let _ = done_tx.send(job());
        });
        self.tx
            .send(task)
            .expect("render loop has shut down with dispatchers still live");
        done_rx
            .recv()
            .expect("render loop dropped a submitted job")
    }
}

impl RenderLoop {
    /// Dequeues and executes jobs in submission order, each exactly once,
    /// until every [`RenderDispatcher`] clone has been dropped.
    pub fn run(self) {
        while let Ok(job) = self.rx.recv() {
            job();
        }
    }
}
