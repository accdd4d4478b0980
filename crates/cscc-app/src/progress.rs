use cscc_core::Scenario;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    ResolvingPaths,
    ParsingScenario,
    ParsingReference,
    Joining,
    Aggregating,
    Completed,
}

impl LoadStage {
    pub fn label(&self) -> &'static str {
        match self {
            LoadStage::ResolvingPaths => "resolving paths",
            LoadStage::ParsingScenario => "parsing scenario",
            LoadStage::ParsingReference => "parsing reference table",
            LoadStage::Joining => "joining",
            LoadStage::Aggregating => "aggregating",
            LoadStage::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadProgressEvent {
    pub scenario: Scenario,
    pub stage: LoadStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
    /// Rows read from this stage's own source. Only set on the event sent
    /// once a parsing stage has finished.
    pub rows_read: Option<usize>,
}

impl LoadProgressEvent {
    pub fn stage(
        scenario: Scenario,
        stage: LoadStage,
        elapsed_wall_s: f64,
        message: Option<String>,
    ) -> Self {
        Self {
            scenario,
            stage,
            elapsed_wall_s,
            message,
            rows_read: None,
        }
    }
}
