use anyhow::{Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};

use crate::types::AttackProgress;

/// Resolution of the bar: progress fractions are mapped onto this many steps.
const STEPS: u64 = 10_000;

/// Terminal progress bar fed with attack snapshots.
pub struct Bar {
    bar: ProgressBar,
}

impl Bar {
    pub fn new(description: &str) -> Result<Self> {
        let bar = ProgressBar::new(STEPS);
        let style = ProgressStyle::default_bar()
            .template("{prefix} [{bar:40.cyan/blue}] {percent:>3}% {msg}")
            .map_err(|e| anyhow!("invalid progress template: {e}"))?
            .progress_chars("●○ ");

        bar.set_style(style);
        bar.set_prefix(description.to_owned());

        Ok(Self { bar })
    }

    pub fn update(&self, progress: &AttackProgress) {
        self.bar.set_position(position(progress.progress));
        self.bar.set_message(format!("{} attempts, eta {}s, trying {}", progress.attempts, progress.eta.as_secs(), progress.current));
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Drop for Bar {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

#[inline]
fn position(fraction: f64) -> u64 {
    (fraction.clamp(0.0, 1.0) * STEPS as f64).round() as u64
}
