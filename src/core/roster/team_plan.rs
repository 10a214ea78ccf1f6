// Multi-turn plan dialogue: the captain types lines until a sentinel.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanInput {
    Line(String),
    Done,
    Cancel,
}

impl PlanInput {
    pub fn classify(message: &str) -> Self {
        match message.trim().to_lowercase().as_str() {
            "done" => PlanInput::Done,
            "cancel" => PlanInput::Cancel,
            _ => PlanInput::Line(message.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlanDraft {
    lines: Vec<String>,
}

impl PlanDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn finish(self) -> String {
        self.lines.join("\n")
    }
}
