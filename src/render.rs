use std::io::Write;

use crate::domain::outcome::Outcome;

/// The page side of a form: status text, submit control, input fields.
pub trait Renderer: Send + Sync {
    /// Disables (`true`) or re-enables the submit control.
    fn set_busy(&self, busy: bool);

    /// Interim text while a request is in flight.
    fn set_progress(&self, message: &str);

    /// Final status, styled as success or error by the outcome.
    fn set_status(&self, outcome: Outcome, message: &str);

    fn clear_fields(&self);

    /// Raw response details appended beneath the status.
    fn show_debug(&self, details: &str);
}

/// Holds the submit control disabled until dropped.
pub struct BusyGuard<'a> {
    renderer: &'a dyn Renderer,
}

impl<'a> BusyGuard<'a> {
    pub fn acquire(renderer: &'a dyn Renderer) -> Self {
        renderer.set_busy(true);
        Self { renderer }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.renderer.set_busy(false);
    }
}

/// Writes statuses to the terminal for the command-line front end.
#[derive(Debug, Default)]
pub struct TerminalRenderer;

impl TerminalRenderer {
    fn line(&self, text: &str) {
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{text}") {
            tracing::warn!(detail = e.to_string(), "failed to write to stdout");
        }
    }
}

impl Renderer for TerminalRenderer {
    fn set_busy(&self, busy: bool) {
        tracing::trace!(busy, "submit control");
    }

    fn set_progress(&self, message: &str) {
        self.line(message);
    }

    fn set_status(&self, outcome: Outcome, message: &str) {
        let label = if outcome.is_success() { "ok" } else { "error" };
        self.line(&format!("[{label}] {message}"));
    }

    fn clear_fields(&self) {}

    fn show_debug(&self, details: &str) {
        self.line(details);
    }
}
