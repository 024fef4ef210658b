//! Ordered execution of [`Transform`] stages.
//!
//! A [`Transformer`] folds its stages over a [`DataSet`] left to right: each stage receives the
//! previous stage's output, and the first failing stage aborts the run. Verbose mode reports each
//! stage to a [`PipelineObserver`] without affecting the result.

mod observer;

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::Configuration;
use crate::error::PipelineResult;
use crate::ingestion::read_csv_from_path;
use crate::processing::Transform;
use crate::record::TransactionList;
use crate::types::DataSet;

pub use observer::{PipelineEvent, PipelineObserver, TracingObserver};

/// Runs an ordered list of materialized transforms.
pub struct Transformer {
    transforms: Vec<Transform>,
    verbose: bool,
    observer: Arc<dyn PipelineObserver>,
}

impl Transformer {
    /// Create a transformer over `transforms`, applied in the given order.
    pub fn new(transforms: Vec<Transform>) -> Self {
        Self {
            transforms,
            verbose: false,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Materialize every transform of `configuration`. Fails before any row is touched if a
    /// description is invalid.
    pub fn from_configuration(configuration: &Configuration) -> PipelineResult<Self> {
        Ok(Self::new(configuration.transforms()?))
    }

    /// Report stage events to the observer while running.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Replace the default [`TracingObserver`].
    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn add_transform(&mut self, transform: Transform) {
        self.transforms.push(transform);
    }

    pub fn set_transforms(&mut self, transforms: Vec<Transform>) {
        self.transforms = transforms;
    }

    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Apply every stage in order.
    pub fn transform(&self, dataset: DataSet) -> PipelineResult<DataSet> {
        let mut dataset = dataset;
        for (index, stage) in self.transforms.iter().enumerate() {
            debug!(stage = index, transform = %stage, "applying transform");
            if self.verbose {
                self.observer.on_event(&PipelineEvent::StageStarted {
                    index,
                    description: stage.to_string(),
                });
            }

            dataset = stage.transform(dataset)?;

            if self.verbose {
                self.observer.on_event(&PipelineEvent::StageFinished {
                    index,
                    rows: dataset.row_count(),
                    columns: dataset.column_count(),
                });
            }
        }
        Ok(dataset)
    }

    /// Read, transform and materialize every file, in order.
    ///
    /// Nothing is returned unless every file succeeds, so a failure part-way through a batch never
    /// leaves a partial set of records for the caller to commit.
    pub fn transform_files<P: AsRef<Path>>(
        &self,
        paths: &[P],
        headers: bool,
    ) -> PipelineResult<TransactionList> {
        let mut batch = TransactionList::new();
        for path in paths {
            let path = path.as_ref();
            let dataset = self.transform(read_csv_from_path(path, headers)?)?;
            let records = TransactionList::from_dataset(&dataset)?;
            info!(path = %path.display(), records = records.len(), "transformed file");
            batch.extend(records);
        }
        Ok(batch)
    }

    /// Forward an event to the observer when verbose.
    pub fn emit(&self, event: PipelineEvent) {
        if self.verbose {
            self.observer.on_event(&event);
        }
    }
}

impl Default for Transformer {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::{PipelineEvent, PipelineObserver, Transformer};
    use crate::error::PipelineError;
    use crate::processing::Transform;
    use crate::types::{ColumnRef, DataSet, Value};

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<PipelineEvent>>,
    }

    impl Recorder {
        fn events(&self) -> Vec<PipelineEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl PipelineObserver for Recorder {
        fn on_event(&self, event: &PipelineEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    fn sample() -> DataSet {
        DataSet::from_columns(vec![("0", vec![Value::from(" a "), Value::from("b ")])])
    }

    fn rename_then_trim() -> Vec<Transform> {
        vec![
            Transform::RenameColumns {
                columns: vec![(ColumnRef::Index(0), "memo".to_string())],
            },
            Transform::TrimStrings {
                columns: vec![ColumnRef::from("memo")],
            },
        ]
    }

    #[test]
    fn stages_run_in_order_on_previous_output() {
        let out = Transformer::new(rename_then_trim()).transform(sample()).unwrap();
        assert_eq!(out.schema.columns, vec!["memo".to_string()]);
        assert_eq!(
            out.column_values(0).cloned().collect::<Vec<_>>(),
            vec![Value::from("a"), Value::from("b")]
        );
    }

    #[test]
    fn order_matters() {
        let mut stages = rename_then_trim();
        stages.reverse();
        let err = Transformer::new(stages).transform(sample()).unwrap_err();
        assert!(matches!(err, PipelineError::ColumnResolution { .. }));
    }

    #[test]
    fn empty_transformer_is_identity() {
        assert_eq!(Transformer::default().transform(sample()).unwrap(), sample());
    }

    #[test]
    fn verbose_mode_reports_each_stage() {
        let recorder = Arc::new(Recorder::default());
        let transformer = Transformer::new(rename_then_trim())
            .with_verbose(true)
            .with_observer(recorder.clone());
        transformer.transform(sample()).unwrap();

        let events = recorder.events();
        assert_eq!(events.len(), 4);
        assert_eq!(
            events[0],
            PipelineEvent::StageStarted {
                index: 0,
                description: "RenameColumns(columns={#0: 'memo'})".to_string(),
            }
        );
        assert_eq!(
            events[3],
            PipelineEvent::StageFinished {
                index: 1,
                rows: 2,
                columns: 1
            }
        );
    }

    #[test]
    fn quiet_mode_reports_nothing() {
        let recorder = Arc::new(Recorder::default());
        let transformer = Transformer::new(rename_then_trim()).with_observer(recorder.clone());
        transformer.transform(sample()).unwrap();
        transformer.emit(PipelineEvent::RecordsCommitted { added: 1, skipped: 0 });
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn failing_stage_stops_the_run() {
        let recorder = Arc::new(Recorder::default());
        let mut transformer = Transformer::new(Vec::new())
            .with_verbose(true)
            .with_observer(recorder.clone());
        transformer.add_transform(Transform::DropColumns {
            columns: vec![ColumnRef::from("missing")],
        });
        transformer.add_transform(Transform::TrimStrings {
            columns: vec![ColumnRef::Index(0)],
        });

        assert!(transformer.transform(sample()).is_err());
        assert_eq!(recorder.events().len(), 1);
    }
}
