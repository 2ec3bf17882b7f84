use std::path::PathBuf;

/// Options for constructing a [`DataPairer`](crate::DataPairer).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PairerOptions {
    /// Load the autosave file at construction when it exists, and enable autosave.
    pub autoload: bool,

    /// Directory of autosave files (default: `./autosaves`).
    pub autosave_dir: PathBuf,

    /// Include the last extracted data when saving or serializing the schema.
    pub save_data: bool,
}

impl Default for PairerOptions {
    fn default() -> Self {
        PairerOptions {
            autoload: false,
            autosave_dir: PathBuf::from("./autosaves"),
            save_data: false,
        }
    }
}

impl PairerOptions {
    pub fn with_autoload(mut self, autoload: bool) -> Self {
        self.autoload = autoload;
        self
    }

    pub fn with_autosave_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.autosave_dir = dir.into();
        self
    }

    pub fn with_save_data(mut self, save_data: bool) -> Self {
        self.save_data = save_data;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = PairerOptions::default();
        assert!(!options.autoload);
        assert!(!options.save_data);
        assert_eq!(options.autosave_dir, PathBuf::from("./autosaves"));
    }

    #[test]
    fn builders() {
        let options = PairerOptions::default()
            .with_autoload(true)
            .with_autosave_dir("/tmp/pairer")
            .with_save_data(true);
        assert!(options.autoload);
        assert!(options.save_data);
        assert_eq!(options.autosave_dir, PathBuf::from("/tmp/pairer"));
    }
}
