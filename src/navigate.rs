//! Navigation to an annotated cell, possibly in another document.
//!
//! Rendering is asynchronous and of unspecified duration, so the navigator
//! polls for the target cell with growing delays (`base * (attempt + 1)`,
//! capped). A generation counter makes every pending step of an older
//! navigation a no-op once a newer one starts: a stale scroll or highlight
//! can never fire after a newer request.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::cell_id::CellId;
use crate::config::NavigationConfig;
use crate::error::Error;

/// Rendering collaborator the navigator drives.
///
/// Implemented by the hosting UI layer. Showing a document triggers its
/// (asynchronous) load and render; the cell operations act on whatever is
/// currently rendered.
#[async_trait]
pub trait CellSurface: Send + Sync {
    /// Load and render the document. [`Error::DocumentNotFound`] when the id
    /// is unknown; this is the one failure the caller must handle itself.
    async fn show_document(&self, document_id: &str) -> Result<(), Error>;

    /// Whether the cell is present in the rendered view.
    fn cell_rendered(&self, cell_id: &CellId) -> bool;

    fn scroll_to(&self, cell_id: &CellId);

    /// Transient visual emphasis for the given duration.
    fn highlight(&self, cell_id: &CellId, duration: Duration);

    /// Open the annotation edit surface for the cell.
    fn open_editor(&self, cell_id: &CellId);
}

/// Terminal state of a `goto` that did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The cell was found, scrolled to, highlighted, and its editor opened.
    Complete,
    /// A newer navigation started first; this one stopped without touching
    /// the view.
    Superseded,
}

pub struct Navigator {
    surface: Arc<dyn CellSurface>,
    config: NavigationConfig,
    generation: Arc<AtomicU64>,
}

impl Navigator {
    pub fn new(surface: Arc<dyn CellSurface>, config: NavigationConfig) -> Self {
        Self {
            surface,
            config,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Render `document_id` and bring `cell_id` into view.
    ///
    /// [`Error::DocumentNotFound`] (and any fetch failure from the surface)
    /// propagates. Exhausting the retry budget yields
    /// [`Error::CellNotFound`], which is non-fatal: it is logged here and
    /// the view stays in its last valid state.
    pub async fn goto(
        &self,
        document_id: &str,
        cell_id: &CellId,
    ) -> Result<NavigationOutcome, Error> {
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        self.surface.show_document(document_id).await?;

        for attempt in 0..self.config.max_attempts {
            if self.generation.load(Ordering::SeqCst) != token {
                debug!(document_id, %cell_id, "navigation superseded");
                return Ok(NavigationOutcome::Superseded);
            }
            if self.surface.cell_rendered(cell_id) {
                self.surface.scroll_to(cell_id);
                self.surface
                    .highlight(cell_id, Duration::from_millis(self.config.highlight_ms));
                self.surface.open_editor(cell_id);
                return Ok(NavigationOutcome::Complete);
            }
            if attempt + 1 < self.config.max_attempts {
                let delay = (self.config.retry_base_ms * (u64::from(attempt) + 1))
                    .min(self.config.retry_cap_ms);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
        }

        warn!(document_id, %cell_id, "cell not found after render retries");
        Err(Error::CellNotFound {
            document_id: document_id.to_string(),
            cell_id: cell_id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Scripted surface: a cell becomes visible after a set number of
    /// `cell_rendered` probes, and every view mutation is logged.
    struct ScriptedSurface {
        known: Vec<String>,
        visible_after: Mutex<std::collections::HashMap<CellId, u32>>,
        probes: Mutex<std::collections::HashMap<CellId, u32>>,
        actions: Mutex<Vec<String>>,
    }

    impl ScriptedSurface {
        fn new(known: &[&str]) -> Self {
            Self {
                known: known.iter().map(|s| s.to_string()).collect(),
                visible_after: Mutex::new(std::collections::HashMap::new()),
                probes: Mutex::new(std::collections::HashMap::new()),
                actions: Mutex::new(Vec::new()),
            }
        }

        fn cell_visible_after(&self, cell: CellId, probes: u32) {
            self.visible_after.lock().unwrap().insert(cell, probes);
        }

        fn actions(&self) -> Vec<String> {
            self.actions.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CellSurface for ScriptedSurface {
        async fn show_document(&self, document_id: &str) -> Result<(), Error> {
            if !self.known.iter().any(|d| d == document_id) {
                return Err(Error::DocumentNotFound {
                    document_id: document_id.to_string(),
                });
            }
            self.actions
                .lock()
                .unwrap()
                .push(format!("show {}", document_id));
            Ok(())
        }

        fn cell_rendered(&self, cell_id: &CellId) -> bool {
            let mut probes = self.probes.lock().unwrap();
            let seen = probes.entry(*cell_id).or_insert(0);
            *seen += 1;
            match self.visible_after.lock().unwrap().get(cell_id) {
                Some(threshold) => *seen > *threshold,
                None => false,
            }
        }

        fn scroll_to(&self, cell_id: &CellId) {
            self.actions.lock().unwrap().push(format!("scroll {}", cell_id));
        }

        fn highlight(&self, cell_id: &CellId, duration: Duration) {
            self.actions
                .lock()
                .unwrap()
                .push(format!("highlight {} {}ms", cell_id, duration.as_millis()));
        }

        fn open_editor(&self, cell_id: &CellId) {
            self.actions.lock().unwrap().push(format!("edit {}", cell_id));
        }
    }

    fn navigator(surface: &Arc<ScriptedSurface>) -> Navigator {
        Navigator::new(
            Arc::clone(surface) as Arc<dyn CellSurface>,
            NavigationConfig::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn completes_when_cell_renders_late() {
        let surface = Arc::new(ScriptedSurface::new(&["doc"]));
        let cell = CellId::new(1, 2, 0);
        surface.cell_visible_after(cell, 3);
        let nav = navigator(&surface);

        let outcome = nav.goto("doc", &cell).await.unwrap();
        assert_eq!(outcome, NavigationOutcome::Complete);
        assert_eq!(
            surface.actions(),
            vec![
                "show doc".to_string(),
                format!("scroll {}", cell),
                format!("highlight {} 2000ms", cell),
                format!("edit {}", cell),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_document_fails_before_polling() {
        let surface = Arc::new(ScriptedSurface::new(&["doc"]));
        let nav = navigator(&surface);

        let err = nav.goto("nope", &CellId::new(1, 0, 0)).await.unwrap_err();
        assert!(matches!(err, Error::DocumentNotFound { .. }));
        assert!(surface.actions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn reports_cell_not_found_after_budget() {
        let surface = Arc::new(ScriptedSurface::new(&["doc"]));
        let cell = CellId::new(1, 0, 0);
        let nav = navigator(&surface);

        let start = tokio::time::Instant::now();
        let err = nav.goto("doc", &cell).await.unwrap_err();
        assert!(matches!(err, Error::CellNotFound { .. }));
        assert_eq!(surface.probes.lock().unwrap()[&cell], 10);
        // 100+200+300+400 then capped at 500 for the remaining five waits
        assert_eq!(start.elapsed(), Duration::from_millis(3500));
    }

    #[tokio::test(start_paused = true)]
    async fn newer_goto_supersedes_pending_one() {
        let surface = Arc::new(ScriptedSurface::new(&["doc"]));
        let cell_a = CellId::new(1, 1, 0);
        let cell_b = CellId::new(1, 2, 0);
        // cellA never renders; cellB is visible immediately
        surface.cell_visible_after(cell_b, 0);
        let nav = navigator(&surface);

        let (first, second) = tokio::join!(nav.goto("doc", &cell_a), nav.goto("doc", &cell_b));
        assert_eq!(first.unwrap(), NavigationOutcome::Superseded);
        assert_eq!(second.unwrap(), NavigationOutcome::Complete);

        let actions = surface.actions();
        assert!(
            !actions.iter().any(|a| a.contains(&cell_a.to_string())),
            "no stale scroll/highlight for the superseded target: {:?}",
            actions
        );
        assert!(actions.contains(&format!("scroll {}", cell_b)));
    }
}
