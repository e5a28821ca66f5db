use super::{ExportConfig, Limits, Tolerances, DEFAULT_IGNORED_NAMES};

/// Options for one export run
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Compute and report every decision without touching the filesystem
    pub dry_run: bool,
    /// Hard-link files instead of copying them
    pub link: bool,
    /// Obsolete entries are only removed when deletions are confirmed
    pub delete: bool,
    /// Overwrite existing targets that are out of date
    pub update: bool,
    /// Export unedited originals into `Originals/`
    pub originals: bool,
    pub tolerances: Tolerances,
    pub limits: Limits,
    pub ignored_names: Vec<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            link: false,
            delete: false,
            update: true,
            originals: false,
            tolerances: Tolerances::default(),
            limits: Limits::default(),
            ignored_names: DEFAULT_IGNORED_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ExportOptions {
    /// Options seeded from a configuration file
    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            tolerances: config.tolerances,
            ignored_names: config.ignored_names.clone(),
            ..Default::default()
        }
    }
}

/// Remaining allowance for one kind of mutation in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    remaining: Option<usize>,
}

impl Quota {
    pub fn new(limit: Option<usize>) -> Self {
        Self { remaining: limit }
    }

    pub fn unlimited() -> Self {
        Self { remaining: None }
    }

    /// Consume one unit. Returns false once the limit is reached.
    pub fn take(&mut self) -> bool {
        match self.remaining.as_mut() {
            None => true,
            Some(0) => false,
            Some(n) => {
                *n -= 1;
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota() {
        let mut quota = Quota::new(Some(2));
        assert!(quota.take());
        assert!(quota.take());
        assert!(!quota.take());

        let mut unlimited = Quota::unlimited();
        for _ in 0..100 {
            assert!(unlimited.take());
        }

        assert!(!Quota::new(Some(0)).take());
    }

    #[test]
    fn test_default_options() {
        let options = ExportOptions::default();
        assert!(!options.dry_run);
        assert!(!options.delete);
        assert!(options.update);
        assert_eq!(options.limits, Limits::default());
    }
}
