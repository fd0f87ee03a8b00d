//! Wrapper dependencies introduced by one file's rewrite

use rustc_hash::FxHashSet;

use crate::features::instrumentation::domain::{Dependency, WRAP_PIPE, WRAP_PIPEABLE_OPERATOR};

#[derive(Debug)]
pub struct DependencyTracker {
    wrapper_location: String,
    telemetry_sink: String,
    recorded: Vec<Dependency>,
    seen: FxHashSet<Dependency>,
}

impl DependencyTracker {
    pub fn new(wrapper_location: impl Into<String>, telemetry_sink: impl Into<String>) -> Self {
        Self {
            wrapper_location: wrapper_location.into(),
            telemetry_sink: telemetry_sink.into(),
            recorded: Vec::new(),
            seen: FxHashSet::default(),
        }
    }

    /// Record a dependency; duplicates of `(identifier, location)` are ignored
    pub fn record(&mut self, dependency: Dependency) {
        if self.seen.insert(dependency.clone()) {
            self.recorded.push(dependency);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.recorded.is_empty()
    }

    /// Final dependency list: the telemetry sink first, then the pipeable
    /// operator wrapper when pipes were wrapped, then everything recorded in
    /// first-use order
    pub fn finalize(self) -> Vec<Dependency> {
        if self.recorded.is_empty() {
            return Vec::new();
        }

        let mut derived = vec![Dependency::new(
            self.telemetry_sink.as_str(),
            self.wrapper_location.as_str(),
        )];
        let pipe = Dependency::new(WRAP_PIPE, self.wrapper_location.as_str());
        if self.seen.contains(&pipe) {
            derived.push(Dependency::new(
                WRAP_PIPEABLE_OPERATOR,
                self.wrapper_location.as_str(),
            ));
        }

        let mut seen = FxHashSet::default();
        derived
            .into_iter()
            .chain(self.recorded)
            .filter(|dependency| seen.insert(dependency.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::instrumentation::domain::{WRAP_CREATION_OPERATOR, WRAP_SUBSCRIBE};

    const LOCATION: &str = "rxjs-transformer/dist/rxjs_wrapper";

    fn tracker() -> DependencyTracker {
        DependencyTracker::new(LOCATION, "sendToBackpage")
    }

    fn names(dependencies: &[Dependency]) -> Vec<&str> {
        dependencies.iter().map(|d| d.identifier.as_str()).collect()
    }

    #[test]
    fn test_empty_file_needs_nothing() {
        assert!(tracker().finalize().is_empty());
    }

    #[test]
    fn test_pipe_implies_operator_wrapper() {
        let mut tracker = tracker();
        tracker.record(Dependency::new(WRAP_PIPE, LOCATION));
        tracker.record(Dependency::new(WRAP_SUBSCRIBE, LOCATION));
        tracker.record(Dependency::new(WRAP_PIPE, LOCATION));

        assert_eq!(
            names(&tracker.finalize()),
            vec!["sendToBackpage", "wrapPipeableOperator", "wrapPipe", "wrapSubscribe"]
        );
    }

    #[test]
    fn test_sink_added_once() {
        let mut tracker = tracker();
        tracker.record(Dependency::new(WRAP_CREATION_OPERATOR, LOCATION));
        tracker.record(Dependency::new(WRAP_CREATION_OPERATOR, LOCATION));

        let dependencies = tracker.finalize();
        assert_eq!(names(&dependencies), vec!["sendToBackpage", "wrapCreationOperator"]);
        assert!(dependencies.iter().all(|d| d.location == LOCATION));
    }
}
