use tracing::info;

/// Events emitted while a pipeline runs in verbose mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    /// A stage is about to run. `description` is the stage's display form.
    StageStarted { index: usize, description: String },
    /// A stage completed and produced a dataset of this shape.
    StageFinished {
        index: usize,
        rows: usize,
        columns: usize,
    },
    /// A batch of records was committed to a store.
    RecordsCommitted { added: usize, skipped: usize },
}

/// Observer hook for pipeline events.
pub trait PipelineObserver: Send + Sync {
    fn on_event(&self, event: &PipelineEvent);
}

/// Forwards pipeline events to `tracing` at `info` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_event(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::StageStarted { index, description } => {
                info!(stage = index, "{description}");
            }
            PipelineEvent::StageFinished {
                index,
                rows,
                columns,
            } => {
                info!(stage = index, rows, columns, "stage finished");
            }
            PipelineEvent::RecordsCommitted { added, skipped } => {
                info!(added, skipped, "Transactions added: {added}, skipped: {skipped}");
            }
        }
    }
}
