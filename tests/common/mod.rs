//! Shared test utilities for CLI end-to-end tests.
//!
//! Provides a fixture that lays out a consuming project with a local
//! artifact repository, installed resource bundles, and a configuration
//! file, so individual tests stay focused on the behavior under test.

use assert_fs::prelude::*;
use assert_fs::TempDir;
use std::path::PathBuf;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::Command;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::TestFixture;
}

/// A consuming project rooted in a temporary directory.
pub struct TestFixture {
    pub temp: TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    pub fn new() -> Self {
        Self {
            temp: TempDir::new().expect("temp dir"),
        }
    }

    pub fn root(&self) -> PathBuf {
        self.temp.path().to_path_buf()
    }

    pub fn repository(&self) -> PathBuf {
        self.temp.path().join("repository")
    }

    /// Install a bundle as a directory artifact in the local repository
    /// under `org.test:<artifact>:1.0`, with the given resource entries.
    pub fn install_bundle(&self, artifact: &str, entries: &[(&str, &str)]) {
        let bundle = self
            .repository()
            .join(format!("org/test/{a}/1.0/{a}-1.0.jar", a = artifact));
        std::fs::create_dir_all(bundle.join("META-INF")).expect("bundle dirs");

        let mut manifest = String::from("<remoteResourcesBundle>\n  <remoteResources>\n");
        for (path, _) in entries {
            manifest.push_str(&format!("    <remoteResource>{}</remoteResource>\n", path));
        }
        manifest.push_str("  </remoteResources>\n</remoteResourcesBundle>\n");
        std::fs::write(bundle.join("META-INF/remote-resources.xml"), manifest)
            .expect("manifest");

        for (path, content) in entries {
            let full = bundle.join(path);
            std::fs::create_dir_all(full.parent().expect("parent")).expect("resource dirs");
            std::fs::write(full, content).expect("resource");
        }
    }

    /// Write a configuration file declaring the given bundles and return
    /// its path.
    pub fn write_config(&self, bundles: &[&str], extra: &str) -> PathBuf {
        let mut config = String::from(
            "project:\n  groupId: org.test\n  artifactId: app\n  version: \"1.0\"\n  name: Demo\n",
        );
        config.push_str("bundles:\n");
        for bundle in bundles {
            config.push_str(&format!("  - {}\n", bundle));
        }
        config.push_str("output_timestamp: \"2024-06-01T00:00:00Z\"\n");
        config.push_str("local_repository: repository\n");
        config.push_str(extra);

        let file = self.temp.child(".remote-resources.yaml");
        file.write_str(&config).expect("config");
        file.path().to_path_buf()
    }

    pub fn output_file(&self, name: &str) -> PathBuf {
        self.temp.path().join("target/remote-resources").join(name)
    }
}
