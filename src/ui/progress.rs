use crate::ui::{palette, Icons, Palette};
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress bar for `gadget ingest`, hidden when stdout is not a terminal.
pub struct IngestProgress {
    pb: ProgressBar,
}

impl IngestProgress {
    pub fn new(total: usize) -> Self {
        let pb = if console::Term::stdout().is_term() {
            ProgressBar::new(total as u64)
        } else {
            ProgressBar::hidden()
        };

        if let Ok(style) = ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}") {
            pb.set_style(style);
        }

        Self { pb }
    }

    pub fn inc(&self, short_id: &str) {
        self.pb.set_message(format!("Adding {}", short_id));
        self.pb.inc(1);
    }

    pub fn finish_with_summary(&self, duration: Duration, images: usize, failed: usize) {
        self.pb.finish_and_clear();
        println!(
            "{} {}",
            Icons::CHECK,
            Palette::paint(
                palette().ok,
                &format!("Ingested {} images in {}", images, HumanDuration(duration))
            )
        );
        if failed > 0 {
            println!(
                "  {} {}",
                Icons::WARN,
                Palette::paint(palette().alert, &format!("{} failed", failed))
            );
        }
    }
}
