use crate::{
    Document, Error, Page, PageConfig, Result, SurfaceSnapshot, ToastConfig, ToastPresenter,
};
use log::debug;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;

enum Command {
    Show(String, Option<String>, oneshot::Sender<Result<()>>),
    Surface(oneshot::Sender<Option<SurfaceSnapshot>>),
    Html(oneshot::Sender<String>),
    Close(oneshot::Sender<Result<()>>),
}

/// An async-friendly toast service backed by a dedicated worker thread.
///
/// The worker thread owns the `Page` and the presenter and is the only thread
/// that ever touches them. Between commands it sleeps until the next timer
/// deadline and advances the page clock to the real elapsed time, so hide
/// timers fire on the wall clock.
#[derive(Clone)]
pub struct ToastService {
    cmd_tx: Sender<Command>,
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

impl ToastService {
    /// Start a service on `document` (a blank page when `None`).
    pub async fn start(config: ToastConfig, document: Option<Document>) -> Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
        let (init_tx, init_rx): (oneshot::Sender<Result<()>>, oneshot::Receiver<Result<()>>) =
            oneshot::channel();

        thread::Builder::new()
            .name("pagetoast-page".to_string())
            .spawn(move || {
                let mut presenter = match ToastPresenter::new(config) {
                    Ok(p) => p,
                    Err(err) => {
                        let _ = init_tx.send(Err(err));
                        return;
                    }
                };
                let mut page =
                    Page::with_document(document.unwrap_or_default(), PageConfig::default());
                let _ = init_tx.send(Ok(()));

                let started = Instant::now();
                loop {
                    let now = elapsed_ms(started);
                    page.advance_to(now);

                    let cmd = match page.next_deadline() {
                        Some(deadline) => {
                            let wait = Duration::from_millis(deadline.saturating_sub(now));
                            match cmd_rx.recv_timeout(wait) {
                                Ok(cmd) => cmd,
                                Err(RecvTimeoutError::Timeout) => continue,
                                Err(RecvTimeoutError::Disconnected) => break,
                            }
                        }
                        None => match cmd_rx.recv() {
                            Ok(cmd) => cmd,
                            Err(_) => break,
                        },
                    };

                    // Timers due while waiting run before the command.
                    page.advance_to(elapsed_ms(started));

                    match cmd {
                        Command::Show(message, category, resp) => {
                            let res = presenter
                                .show_toast(&mut page, &message, category.as_deref())
                                .map(|_| ());
                            let _ = resp.send(res);
                        }
                        Command::Surface(resp) => {
                            let _ = resp.send(presenter.surface_snapshot(&page));
                        }
                        Command::Html(resp) => {
                            let _ = resp.send(page.document().to_html());
                        }
                        Command::Close(resp) => {
                            debug!(
                                "toast service closing with {} pending timers",
                                page.pending_timers()
                            );
                            let _ = resp.send(Ok(()));
                            break;
                        }
                    }
                }
            })
            .map_err(|e| Error::Other(format!("Failed to spawn page worker: {}", e)))?;

        // Wait for the worker to report initialization success or failure
        let init_res = init_rx
            .await
            .map_err(|e| Error::Other(format!("Worker init canceled: {}", e)))?;
        init_res?;

        Ok(Self { cmd_tx })
    }

    fn send(&self, cmd: Command) -> Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| Error::Other("Toast service is closed".to_string()))
    }

    /// Show a toast; returns once the surface is visible
    pub async fn show(&self, message: &str, category: Option<&str>) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Show(
            message.to_string(),
            category.map(|s| s.to_string()),
            tx,
        ))?;
        rx.await
            .map_err(|e| Error::Other(format!("Show canceled: {}", e)))?
    }

    /// Current state of the notification surface
    pub async fn surface(&self) -> Result<Option<SurfaceSnapshot>> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Surface(tx))?;
        rx.await
            .map_err(|e| Error::Other(format!("Surface canceled: {}", e)))
    }

    /// Serialized page HTML
    pub async fn html(&self) -> Result<String> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Html(tx))?;
        rx.await
            .map_err(|e| Error::Other(format!("Html canceled: {}", e)))
    }

    /// Shut down the worker. Pending hide timers are dropped.
    pub async fn close(self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Close(tx))?;
        rx.await
            .map_err(|e| Error::Other(format!("Close canceled: {}", e)))?
    }
}
