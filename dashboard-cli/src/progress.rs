use dashboard_core::{TaskEvent, TaskObserver, TaskStatus};

/// Prints one line per task lifecycle event — the terminal stand-in for
/// an animated spinner. Failure details are rendered by the flows; here
/// the line only marks the outcome.
pub struct ProgressPrinter;

impl TaskObserver for ProgressPrinter {
    fn on_event(&self, event: &TaskEvent) {
        match event.status {
            TaskStatus::Running => println!("⏳ {}...", event.label),
            TaskStatus::Succeeded => println!("✅ {}", event.label),
            TaskStatus::Failed => println!("❌ {}", event.label),
            TaskStatus::Pending => {}
        }
    }
}
