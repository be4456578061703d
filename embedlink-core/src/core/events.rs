use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Source,
    DataLink,
    Legacy,
    Dispatch,
}

impl Stage {
    pub fn tag(&self) -> &'static str {
        match self {
            Stage::Source => "source",
            Stage::DataLink => "datalink",
            Stage::Legacy => "legacy",
            Stage::Dispatch => "dispatch",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Marker or selector not present on the page.
    AbsentFeature,
    /// Malformed JSON, Base64 or text in a single item.
    Decode,
    /// Fetch, decrypt or extractor call failed.
    Remote,
}

/// A failure that was contained instead of aborting the resolution.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResolutionEvent {
    pub stage: Stage,
    pub kind: FailureKind,
    pub target: String,
    pub message: String,
}

impl ResolutionEvent {
    pub fn new(
        stage: Stage,
        kind: FailureKind,
        target: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            stage,
            kind,
            target: target.into(),
            message: message.into(),
        }
    }
}

/// A best-effort value together with every failure suppressed while building it.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome<T> {
    pub value: T,
    pub events: Vec<ResolutionEvent>,
}

impl<T> Outcome<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            events: Vec::new(),
        }
    }

    pub fn with_events(value: T, events: Vec<ResolutionEvent>) -> Self {
        Self { value, events }
    }

    /// Logs the event and keeps it for the caller.
    pub fn record(&mut self, event: ResolutionEvent) {
        match event.kind {
            FailureKind::AbsentFeature => tracing::debug!(
                "[{}] {}: {}",
                event.stage.tag(),
                event.target,
                event.message
            ),
            FailureKind::Decode | FailureKind::Remote => tracing::warn!(
                "[{}] {}: {}",
                event.stage.tag(),
                event.target,
                event.message
            ),
        }
        self.events.push(event);
    }

    pub fn absorb<U>(&mut self, other: Outcome<U>) -> U {
        self.events.extend(other.events);
        other.value
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            events: self.events,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.events
            .iter()
            .any(|e| e.kind != FailureKind::AbsentFeature)
    }
}

impl<T: Default> Default for Outcome<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
