//! The research report: fixed, labeled sections assembled from collaborator
//! output.

use serde::{Deserialize, Serialize};

/// Marker that opens the topic heading. The document exporter looks for it.
pub const TOPIC_MARKER: &str = "\u{1F4CC}";

/// Section labels, in report order.
pub const TOPIC_LABEL: &str = "\u{1F4CC} **Research Topic**";
pub const EXPLANATION_LABEL: &str = "\u{1F4DA} **Detailed Explanation**";
pub const SUMMARY_LABEL: &str = "\u{1F50D} **Key Summary Points**";
pub const REPOSITORIES_LABEL: &str = "\u{1F4BB} **GitHub Projects**";

/// A finished report. Memory recall is deliberately not part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub topic: String,
    pub explanation: String,
    pub summary: String,
    pub repositories: String,
}

impl Report {
    pub fn new(
        topic: impl Into<String>,
        explanation: impl Into<String>,
        summary: impl Into<String>,
        repositories: impl Into<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            explanation: explanation.into(),
            summary: summary.into(),
            repositories: repositories.into(),
        }
    }

    /// `(label, body)` pairs in report order.
    pub fn sections(&self) -> [(&'static str, &str); 4] {
        [
            (TOPIC_LABEL, self.topic.as_str()),
            (EXPLANATION_LABEL, self.explanation.as_str()),
            (SUMMARY_LABEL, self.summary.as_str()),
            (REPOSITORIES_LABEL, self.repositories.as_str()),
        ]
    }

    /// Render the report text: a leading newline, then each label on its own
    /// line followed by its body, sections separated by a blank line, and a
    /// trailing newline.
    pub fn render(&self) -> String {
        let body = self
            .sections()
            .iter()
            .map(|(label, text)| format!("{}\n{}", label, text))
            .collect::<Vec<_>>()
            .join("\n\n");
        format!("\n{}\n", body)
    }
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}
