//! Environment variable presence check, optionally matched against a pattern.

use regex::Regex;

use crate::health::Check;

#[derive(Debug, Clone)]
pub struct EnvCheck {
    variable: String,
    pattern: Option<Regex>,
    name: String,
}

impl EnvCheck {
    pub fn new(variable: impl Into<String>) -> Self {
        let variable = variable.into();
        Self {
            name: format!("env-{}", variable),
            variable,
            pattern: None,
        }
    }

    /// An empty pattern means "no pattern".
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.pattern = if pattern.is_empty() {
            None
        } else {
            Some(Regex::new(pattern)?)
        };
        Ok(self)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.name = title.into();
        self
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }
}

#[async_trait::async_trait]
impl Check for EnvCheck {
    async fn pass(&self) -> bool {
        match std::env::var(&self.variable) {
            Ok(value) => self
                .pattern
                .as_ref()
                .map_or(true, |pattern| pattern.is_match(&value)),
            Err(_) => false,
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
