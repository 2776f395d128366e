//! Unique ID generator.

use uuid::Uuid;

/// Generates identifiers for import runs.
pub struct IdGenerator;

impl IdGenerator {
    /// Generates a unique run ID.
    ///
    /// # Returns
    /// A UUID v4 string, attached to the run's log span and report.
    pub fn run_id() -> String {
        Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id_is_unique() {
        assert_ne!(IdGenerator::run_id(), IdGenerator::run_id());
    }
}
