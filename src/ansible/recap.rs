use crate::subprocess::ExitStatus;

/// Marker line that opens ansible-playbook's per-host summary.
pub const RECAP_MARKER: &str = "PLAY RECAP";

/// Outcome of one ansible-playbook run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Every stdout line, followed by stderr prefixed with `Error: `.
    pub full_output: String,
    /// Lines from the `PLAY RECAP` marker (inclusive) to the end of stdout.
    pub recap: String,
    pub status: ExitStatus,
}

impl ExecutionResult {
    pub fn succeeded(&self) -> bool {
        self.status.success()
    }

    pub fn recap_found(&self) -> bool {
        !self.recap.is_empty()
    }
}

/// Splits a transcript into full output and recap as lines arrive.
#[derive(Debug, Default)]
pub struct RecapCollector {
    full_output: String,
    recap: String,
    recap_seen: bool,
}

impl RecapCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_line(&mut self, line: &str) {
        self.full_output.push_str(line);
        self.full_output.push('\n');

        if !self.recap_seen && line.contains(RECAP_MARKER) {
            self.recap_seen = true;
        }

        if self.recap_seen {
            self.recap.push_str(line);
            self.recap.push('\n');
        }
    }

    /// Append the child's stderr once the run is over.
    pub fn push_stderr(&mut self, lines: &[String]) {
        if lines.is_empty() {
            return;
        }
        self.full_output.push_str("Error: ");
        for line in lines {
            self.full_output.push_str(line);
            self.full_output.push('\n');
        }
    }

    pub fn recap_seen(&self) -> bool {
        self.recap_seen
    }

    pub fn finish(self, status: ExitStatus) -> ExecutionResult {
        ExecutionResult {
            full_output: self.full_output,
            recap: self.recap,
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(lines: &[&str]) -> ExecutionResult {
        let mut collector = RecapCollector::new();
        for line in lines {
            collector.push_line(line);
        }
        collector.finish(ExitStatus::Success)
    }

    #[test]
    fn test_recap_starts_at_marker() {
        let result = collect(&[
            "PLAY [Implement defined automation tasks] ****",
            "TASK [Update Banner] ****",
            "changed: [core1]",
            "PLAY RECAP *********",
            "core1 : ok=5 changed=1 unreachable=0 failed=0",
            "",
        ]);

        assert_eq!(
            result.recap,
            "PLAY RECAP *********\ncore1 : ok=5 changed=1 unreachable=0 failed=0\n\n"
        );
        assert!(result.full_output.starts_with("PLAY [Implement"));
        assert_eq!(result.full_output.lines().count(), 6);
        assert!(result.recap_found());
    }

    #[test]
    fn test_no_marker_means_empty_recap() {
        let result = collect(&["PLAY [all]", "fatal: [core1]: UNREACHABLE!"]);
        assert!(result.recap.is_empty());
        assert!(!result.recap_found());
    }

    #[test]
    fn test_second_marker_stays_in_recap() {
        let result = collect(&["a", "PLAY RECAP", "b", "PLAY RECAP again"]);
        assert_eq!(result.recap, "PLAY RECAP\nb\nPLAY RECAP again\n");
    }

    #[test]
    fn test_stderr_is_prefixed_once() {
        let mut collector = RecapCollector::new();
        collector.push_line("PLAY RECAP");
        collector.push_stderr(&["[WARNING]: one".to_string(), "[WARNING]: two".to_string()]);
        let result = collector.finish(ExitStatus::Error(2));

        assert_eq!(
            result.full_output,
            "PLAY RECAP\nError: [WARNING]: one\n[WARNING]: two\n"
        );
        assert_eq!(result.recap, "PLAY RECAP\n");
        assert!(!result.succeeded());
    }
}
