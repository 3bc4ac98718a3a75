// ============================================================
// Layer 5 — Early Stopping
// ============================================================
// Watches validation loss after every epoch and stops training
// once it has failed to improve for `patience` epochs in a row.
//
//   epoch  val_loss  best   wait  decision
//     1     0.050    0.050   0    continue
//     2     0.052    0.050   1    continue
//     3     0.049    0.049   0    continue
//     4     0.051    0.049   1    continue
//     5     0.049    0.049   2    stop        (patience = 2)
//
// An epoch only counts as an improvement if it is strictly
// lower than the best seen so far.

/// Epochs without improvement tolerated before stopping
pub const DEFAULT_PATIENCE: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopDecision {
    /// Validation loss reached a new best
    Improved,
    /// No improvement yet, but patience is not exhausted
    Continue,
    /// Patience exhausted
    Stop,
}

#[derive(Debug, Clone)]
pub struct EarlyStopping {
    patience: usize,
    best:     f64,
    wait:     usize,
}

impl EarlyStopping {
    pub fn new(patience: usize) -> Self {
        Self { patience, best: f64::INFINITY, wait: 0 }
    }

    /// Record one epoch's validation loss and decide whether to keep going.
    ///
    /// A non-finite loss (e.g. no validation samples) is ignored.
    pub fn update(&mut self, val_loss: f64) -> StopDecision {
        if !val_loss.is_finite() {
            return StopDecision::Continue;
        }

        if val_loss < self.best {
            self.best = val_loss;
            self.wait = 0;
            return StopDecision::Improved;
        }

        self.wait += 1;
        if self.wait >= self.patience {
            StopDecision::Stop
        } else {
            StopDecision::Continue
        }
    }

    /// Best validation loss seen, if any finite one was recorded
    pub fn best(&self) -> Option<f64> {
        self.best.is_finite().then_some(self.best)
    }

    pub fn epochs_without_improvement(&self) -> usize {
        self.wait
    }
}

impl Default for EarlyStopping {
    fn default() -> Self {
        Self::new(DEFAULT_PATIENCE)
    }
}
