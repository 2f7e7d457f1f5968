//! JSON configuration for the patch command.
//!
//! ```json
//! {
//!   "base_archive": "libs/compiler-1.3.jar",
//!   "excludes": ["META-INF/native/**/*jansi.*"],
//!   "secondary_archives": ["libs/jansi-1.18.jar"],
//!   "secondary_includes": [
//!     { "prefix": "jansi-", "includes": ["META-INF/native/**"] }
//!   ],
//!   "additional_files": [
//!     { "source": "patches/Launcher.class", "dest": "org/example/Launcher.class" },
//!     { "tree": "patches/resources", "includes": ["**/*.properties"] }
//!   ],
//!   "output_dir": "build/patched"
//! }
//! ```
//!
//! Relative paths are resolved against the directory holding the file.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use archpatch::{Error, FileOperation, LooseFile, PatchSpec, Result, SecondaryRule};

/// Contents of a configuration file, possibly extended by command-line flags.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatchConfig {
    pub base_archive: Option<PathBuf>,
    #[serde(default)]
    pub excludes: Vec<String>,
    #[serde(default)]
    pub secondary_archives: Vec<PathBuf>,
    #[serde(default)]
    pub secondary_includes: Vec<IncludeRule>,
    #[serde(default)]
    pub additional_files: Vec<AdditionalFile>,
    pub output_dir: Option<PathBuf>,
}

/// Include patterns for secondary archives starting with `prefix`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IncludeRule {
    pub prefix: String,
    pub includes: Vec<String>,
}

/// A loose file or a directory of loose files.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AdditionalFile {
    File {
        source: PathBuf,
        dest: String,
    },
    Tree {
        tree: PathBuf,
        #[serde(default)]
        includes: Vec<String>,
    },
}

impl PatchConfig {
    /// Reads a configuration file and resolves its relative paths.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::file(FileOperation::Read, path, e))?;
        let mut config = Self::parse(&text)
            .map_err(|e| Error::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        config.resolve_relative(base_dir);
        Ok(config)
    }

    /// Parses configuration JSON without resolving paths.
    pub fn parse(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Joins every relative path onto `base_dir`.
    pub fn resolve_relative(&mut self, base_dir: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base_dir.join(&*path);
            }
        };

        if let Some(base) = self.base_archive.as_mut() {
            resolve(base);
        }
        if let Some(output) = self.output_dir.as_mut() {
            resolve(output);
        }
        self.secondary_archives.iter_mut().for_each(resolve);
        for file in &mut self.additional_files {
            match file {
                AdditionalFile::File { source, .. } => resolve(source),
                AdditionalFile::Tree { tree, .. } => resolve(tree),
            }
        }
    }

    /// Adds `pattern` to the rule for `prefix`, creating the rule after the
    /// existing ones if needed.
    pub fn add_include(&mut self, prefix: &str, pattern: &str) {
        match self
            .secondary_includes
            .iter_mut()
            .find(|rule| rule.prefix == prefix)
        {
            Some(rule) => rule.includes.push(pattern.to_string()),
            None => self.secondary_includes.push(IncludeRule {
                prefix: prefix.to_string(),
                includes: vec![pattern.to_string()],
            }),
        }
    }

    /// Builds the [`PatchSpec`].
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] if the base archive or output directory is
    /// missing.
    pub fn into_spec(self) -> Result<PatchSpec> {
        let base = self
            .base_archive
            .ok_or_else(|| Error::InvalidConfig("no base archive given".into()))?;
        let output = self
            .output_dir
            .ok_or_else(|| Error::InvalidConfig("no output directory given".into()))?;

        let mut spec = PatchSpec::new(base, output)
            .exclude_all(self.excludes)
            .secondary_archive_all(self.secondary_archives);
        for rule in self.secondary_includes {
            spec = spec.rule(SecondaryRule::new(rule.prefix, rule.includes));
        }
        for file in self.additional_files {
            spec = spec.loose_file(match file {
                AdditionalFile::File { source, dest } => LooseFile::file(source, dest),
                AdditionalFile::Tree { tree, includes } => LooseFile::tree_matching(tree, includes),
            });
        }
        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "base_archive": "libs/compiler-1.3.jar",
        "excludes": ["META-INF/native/**/*jansi.*"],
        "secondary_archives": ["libs/jansi-1.18.jar", "/opt/libs/other.jar"],
        "secondary_includes": [
            { "prefix": "jansi-", "includes": ["META-INF/native/**"] }
        ],
        "additional_files": [
            { "source": "patches/A.class", "dest": "org/example/A.class" },
            { "tree": "patches/res" }
        ],
        "output_dir": "build/patched"
    }"#;

    #[test]
    fn test_parse_sample() {
        let config = PatchConfig::parse(SAMPLE).unwrap();
        assert_eq!(config.excludes.len(), 1);
        assert_eq!(config.secondary_includes[0].prefix, "jansi-");
        assert_eq!(
            config.additional_files[1],
            AdditionalFile::Tree {
                tree: PathBuf::from("patches/res"),
                includes: Vec::new(),
            }
        );
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(PatchConfig::parse(r#"{ "base": "a.jar" }"#).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_relative() {
        let mut config = PatchConfig::parse(SAMPLE).unwrap();
        config.resolve_relative(Path::new("/work"));
        assert_eq!(
            config.base_archive,
            Some(PathBuf::from("/work/libs/compiler-1.3.jar"))
        );
        assert_eq!(
            config.secondary_archives,
            vec![
                PathBuf::from("/work/libs/jansi-1.18.jar"),
                PathBuf::from("/opt/libs/other.jar"),
            ]
        );
        assert_eq!(config.output_dir, Some(PathBuf::from("/work/build/patched")));
    }

    #[test]
    fn test_add_include_groups_by_prefix() {
        let mut config = PatchConfig::default();
        config.add_include("jansi-", "a/**");
        config.add_include("kotlin-", "b/**");
        config.add_include("jansi-", "c/*");

        assert_eq!(config.secondary_includes.len(), 2);
        assert_eq!(config.secondary_includes[0].includes, vec!["a/**", "c/*"]);
        assert_eq!(config.secondary_includes[1].prefix, "kotlin-");
    }

    #[test]
    fn test_into_spec_requires_output() {
        let config = PatchConfig {
            base_archive: Some(PathBuf::from("a.jar")),
            ..Default::default()
        };
        assert!(matches!(config.into_spec(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_into_spec() {
        let spec = PatchConfig::parse(SAMPLE).unwrap().into_spec().unwrap();
        assert_eq!(spec.base_archive(), Path::new("libs/compiler-1.3.jar"));
        assert_eq!(spec.secondary_archives().len(), 2);
        assert_eq!(spec.secondary_rules()[0].includes(), ["META-INF/native/**"]);
        assert_eq!(spec.loose_files().len(), 2);
    }
}
