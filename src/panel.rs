//! Panel lifecycle: Closed -> Open -> Closed.
//!
//! The manager owns the store controller while the panel is closed and lends
//! it to a spawned task while the panel is open. The surface talks to that task
//! over two FIFO channels; disposing the panel stops the task and takes the
//! controller back, so the persisted notes outlive any one surface.

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::controller::{ConfirmPrompt, StoreController};
use crate::error::{PostitError, Result};
use crate::protocol::Outbound;
use crate::storage::KeyValueStore;
use crate::theme::{SharedTheme, ThemeKind, ThemeSource};

/// Surface end of an open panel.
pub struct SurfaceChannel {
    /// Raw JSON payloads to the controller.
    pub to_controller: mpsc::UnboundedSender<Value>,
    /// Controller replies and theme notifications, in order.
    pub from_controller: mpsc::UnboundedReceiver<Outbound>,
    /// Per-session token for the surface's content-security boundary.
    pub nonce: String,
}

/// Result of [`PanelManager::toggle`].
pub enum PanelEvent {
    Opened(SurfaceChannel),
    Revealed,
}

struct OpenPanel<S, C> {
    nonce: String,
    outbound: mpsc::UnboundedSender<Outbound>,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<StoreController<S, C, SharedTheme>>,
    reveals: u32,
}

impl<S, C> OpenPanel<S, C> {
    /// The surface dropped its receiver or the controller loop already stopped.
    fn is_detached(&self) -> bool {
        self.outbound.is_closed() || self.task.is_finished()
    }
}

enum PanelState<S, C> {
    Closed(StoreController<S, C, SharedTheme>),
    Open(OpenPanel<S, C>),
    /// Only observed if a controller task was lost.
    Broken,
}

pub struct PanelManager<S, C> {
    state: PanelState<S, C>,
    theme: SharedTheme,
}

impl<S, C> PanelManager<S, C>
where
    S: KeyValueStore + Send + 'static,
    C: ConfirmPrompt + Send + 'static,
{
    /// Build a closed panel around a controller. The controller must read the
    /// theme from `theme` so that [`PanelManager::notify_theme`] reaches it.
    pub fn new(controller: StoreController<S, C, SharedTheme>, theme: SharedTheme) -> Self {
        Self {
            state: PanelState::Closed(controller),
            theme,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, PanelState::Open(_))
    }

    /// Nonce of the open panel.
    pub fn nonce(&self) -> Option<&str> {
        match &self.state {
            PanelState::Open(panel) => Some(&panel.nonce),
            _ => None,
        }
    }

    /// Number of times the open panel was revealed instead of recreated.
    pub fn reveal_count(&self) -> u32 {
        match &self.state {
            PanelState::Open(panel) => panel.reveals,
            _ => 0,
        }
    }

    /// Open the panel, or reveal it if it is already open.
    ///
    /// A panel whose surface went away without [`PanelManager::dispose`] is
    /// reclaimed and reopened. Must be called from within a tokio runtime.
    pub async fn toggle(&mut self) -> Result<PanelEvent> {
        if let PanelState::Open(panel) = &mut self.state {
            if !panel.is_detached() {
                panel.reveals += 1;
                debug!(reveals = panel.reveals, "revealing open panel");
                return Ok(PanelEvent::Revealed);
            }
            info!("surface dropped without dispose, reopening");
            self.dispose().await?;
        }

        let controller = match std::mem::replace(&mut self.state, PanelState::Broken) {
            PanelState::Closed(controller) => controller,
            _ => {
                return Err(PostitError::Panel(
                    "controller was lost by a previous panel".to_string(),
                ))
            }
        };

        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task = tokio::spawn(controller.run(in_rx, out_tx.clone(), async move {
            let _ = shutdown_rx.await;
        }));

        let nonce = generate_nonce();
        info!("panel opened");

        self.state = PanelState::Open(OpenPanel {
            nonce: nonce.clone(),
            outbound: out_tx,
            shutdown: shutdown_tx,
            task,
            reveals: 0,
        });

        Ok(PanelEvent::Opened(SurfaceChannel {
            to_controller: in_tx,
            from_controller: out_rx,
            nonce,
        }))
    }

    /// Record a host theme change and push it to the open panel, if any.
    pub fn notify_theme(&self, kind: ThemeKind) {
        self.theme.set(kind);
        if let PanelState::Open(panel) = &self.state {
            if panel.outbound.send(Outbound::Theme { value: kind }).is_err() {
                debug!("theme change not delivered, surface is gone");
            }
        }
    }

    pub fn current_theme(&self) -> ThemeKind {
        self.theme.current_theme()
    }

    /// Close the panel: stop the controller task and release its channels.
    /// A no-op when already closed.
    pub async fn dispose(&mut self) -> Result<()> {
        let panel = match std::mem::replace(&mut self.state, PanelState::Broken) {
            PanelState::Open(panel) => panel,
            other => {
                self.state = other;
                return Ok(());
            }
        };

        let _ = panel.shutdown.send(());
        drop(panel.outbound);

        let controller = panel
            .task
            .await
            .map_err(|e| PostitError::Panel(format!("controller task failed: {}", e)))?;

        self.state = PanelState::Closed(controller);
        info!("panel disposed");
        Ok(())
    }

    /// Take the controller back out. Fails while the panel is open.
    pub fn into_controller(self) -> Result<StoreController<S, C, SharedTheme>> {
        match self.state {
            PanelState::Closed(controller) => Ok(controller),
            PanelState::Open(_) => Err(PostitError::Panel(
                "panel is still open; dispose it first".to_string(),
            )),
            PanelState::Broken => Err(PostitError::Panel(
                "controller was lost by a previous panel".to_string(),
            )),
        }
    }
}

/// 32 alphanumeric characters, fresh per panel.
fn generate_nonce() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::AutoConfirm;
    use crate::storage::{MemoryStore, NoteStore};

    fn manager() -> PanelManager<MemoryStore, AutoConfirm> {
        let theme = SharedTheme::new(ThemeKind::Light);
        let controller =
            StoreController::new(NoteStore::new(MemoryStore::new()), AutoConfirm(true), theme.clone());
        PanelManager::new(controller, theme)
    }

    #[test]
    fn test_nonce_shape() {
        let nonce = generate_nonce();
        assert_eq!(nonce.len(), 32);
        assert!(nonce.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(nonce, generate_nonce());
    }

    #[tokio::test]
    async fn test_toggle_opens_then_reveals() {
        let mut panels = manager();
        assert!(!panels.is_open());

        let opened = panels.toggle().await.unwrap();
        assert!(matches!(opened, PanelEvent::Opened(_)));
        assert!(panels.is_open());
        assert!(panels.nonce().is_some());

        assert!(matches!(panels.toggle().await.unwrap(), PanelEvent::Revealed));
        assert_eq!(panels.reveal_count(), 1);

        panels.dispose().await.unwrap();
        assert!(!panels.is_open());
        assert_eq!(panels.nonce(), None);
    }

    #[tokio::test]
    async fn test_toggle_reopens_after_surface_dropped() {
        let mut panels = manager();
        let channel = match panels.toggle().await.unwrap() {
            PanelEvent::Opened(channel) => channel,
            PanelEvent::Revealed => panic!("Expected a new panel"),
        };
        let first_nonce = channel.nonce.clone();
        drop(channel);

        let reopened = panels.toggle().await.unwrap();
        assert!(matches!(reopened, PanelEvent::Opened(_)));
        assert!(panels.is_open());
        assert_eq!(panels.reveal_count(), 0);
        assert_ne!(panels.nonce(), Some(first_nonce.as_str()));
    }

    #[tokio::test]
    async fn test_dispose_when_closed_is_noop() {
        let mut panels = manager();
        panels.dispose().await.unwrap();
        assert!(panels.into_controller().is_ok());
    }

    #[tokio::test]
    async fn test_into_controller_fails_while_open() {
        let mut panels = manager();
        let _channel = panels.toggle().await.unwrap();
        assert!(matches!(panels.into_controller(), Err(PostitError::Panel(_))));
    }
}
