use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

static TYPE_DECL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(class|struct|enum|trait|interface)\s+([A-Za-z_][A-Za-z0-9_]*)")
        .expect("valid regex")
});
static INSTANTIATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)\s*=\s*[A-Za-z_][A-Za-z0-9_]*(?:(?:\.|::)[A-Za-z_][A-Za-z0-9_]*)*\(")
        .expect("valid regex")
});

/// Shortest variable name worth remembering; `x = f(` style noise is skipped.
const MIN_INSTANCE_NAME_LEN: usize = 4;

/// Examples already used in the current article run.
///
/// Advisory only: the hint is passed to later prompts, nothing enforces it.
/// Grows monotonically until `reset`.
#[derive(Debug, Default, Clone)]
pub struct ExampleTracker {
    used: BTreeSet<String>,
}

impl ExampleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract example descriptors from written content. Returns how many
    /// were new.
    pub fn record(&mut self, content: &str) -> usize {
        let before = self.used.len();

        for caps in TYPE_DECL_RE.captures_iter(content) {
            let name = &caps[2];
            let descriptor = match &caps[1] {
                "class" => format!("Class {name}"),
                _ => format!("Type {name}"),
            };
            self.used.insert(descriptor);
        }

        for caps in INSTANTIATION_RE.captures_iter(content) {
            let name = &caps[1];
            if name.len() >= MIN_INSTANCE_NAME_LEN {
                self.used.insert(format!("Example using {name}"));
            }
        }

        let added = self.used.len() - before;
        if added > 0 {
            tracing::debug!(added, total = self.used.len(), "Recorded used examples");
        }
        added
    }

    /// Instruction block listing every recorded example, or an empty string.
    pub fn render_avoidance_hint(&self) -> String {
        if self.used.is_empty() {
            return String::new();
        }
        let mut hint =
            String::from("\nIMPORTANT - EXAMPLES ALREADY USED (do not reuse them, create new ones):\n");
        for descriptor in &self.used {
            hint.push_str("- ");
            hint.push_str(descriptor);
            hint.push('\n');
        }
        hint
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &str> {
        self.used.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    pub fn reset(&mut self) {
        self.used.clear();
    }
}
