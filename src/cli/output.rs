//! CLI output: JSON envelopes for robot mode, key/value text for humans.

use crate::error::Result;

pub fn emit_json(payload: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(payload)?);
    Ok(())
}

/// Minimal sectioned key/value layout for human output.
#[derive(Debug, Default)]
pub struct HumanLayout {
    lines: Vec<String>,
}

impl HumanLayout {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&mut self, text: &str) -> &mut Self {
        self.lines.push(text.to_string());
        self.lines.push("=".repeat(text.len()));
        self
    }

    pub fn section(&mut self, text: &str) -> &mut Self {
        self.lines.push(String::new());
        self.lines.push(format!("{text}:"));
        self
    }

    pub fn kv(&mut self, key: &str, value: &str) -> &mut Self {
        self.lines.push(format!("  {key}: {value}"));
        self
    }

    pub fn item(&mut self, value: &str) -> &mut Self {
        self.lines.push(format!("  - {value}"));
        self
    }
}

pub fn emit_human(layout: &HumanLayout) {
    for line in &layout.lines {
        println!("{line}");
    }
}
