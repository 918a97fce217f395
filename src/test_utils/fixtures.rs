//! Sample manifest fragments for tests
//!
//! Every fixture is one YAML file. The sample set describes a small shop
//! application with a network, a volume backed by a secret value, and an
//! application split across two fragments.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// A manifest fragment written under a fixed file name
#[derive(Clone, Debug)]
pub struct ManifestFixture {
    /// File name, relative to the target directory
    pub name: String,
    /// YAML content
    pub content: String,
}

impl ManifestFixture {
    /// Fixture with arbitrary content.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// `secret` named `shopSecret`.
    pub fn secret() -> Self {
        Self::new(
            "secret.yaml",
            r#"
secret:
  schemaVersion: 1.0.0-preview2
  name: shopSecret
  properties:
    kind: inlinedValue
    contentType: text/plain
"#
            .trim_start(),
        )
    }

    /// `secretValue` `shopSecret/v1` holding a parameter placeholder.
    pub fn secret_value() -> Self {
        Self::new(
            "secret_value.yaml",
            r#"
secretValue:
  schemaVersion: 1.0.0-preview2
  name: shopSecret/v1
  properties:
    value: "[parameters('storageKey')]"
"#
            .trim_start(),
        )
    }

    /// `volume` backed by Azure Files, depending on the secret value.
    pub fn volume() -> Self {
        Self::new(
            "volume.yaml",
            r#"
volume:
  schemaVersion: 1.0.0-preview2
  name: shopVolume
  properties:
    provider: SFAzureFile
    azureFileParameters:
      shareName: share
      accountName: account
      accountKey: "[parameters('storageKey')]"
"#
            .trim_start(),
        )
    }

    /// `network` named `shopNetwork`.
    pub fn network() -> Self {
        Self::new(
            "network.yaml",
            r#"
network:
  schemaVersion: 1.0.0-preview2
  name: shopNetwork
  properties:
    kind: Local
    networkAddressPrefix: 10.0.0.0/22
"#
            .trim_start(),
        )
    }

    /// First half of the `shop` application: the service and its network.
    pub fn application_base() -> Self {
        Self::new(
            "app_base.yaml",
            r#"
application:
  schemaVersion: 1.0.0-preview2
  name: shop
  properties:
    description: Online shop
    services:
      - name: web
        properties:
          osType: Linux
          replicaCount: "1"
          networkRefs:
            - name: shopNetwork
          codePackages:
            - name: webCode
              image: "[parameters('image')]"
              resources:
                requests:
                  cpu: "0.5"
                  memoryInGB: "1"
"#
            .trim_start(),
        )
    }

    /// Second half of the `shop` application: a second service using the volume.
    pub fn application_patch() -> Self {
        Self::new(
            "app_patch.yaml",
            r#"
application:
  name: shop
  properties:
    services:
      - name: worker
        properties:
          osType: Linux
          replicaCount: "2"
          codePackages:
            - name: workerCode
              image: worker:latest
              volumeRefs:
                - name: shopVolume
                  destinationPath: /data
                  readOnly: "false"
              resources:
                requests:
                  cpu: "1"
                  memoryInGB: "2"
"#
            .trim_start(),
        )
    }

    /// All sample fragments, application fragments first.
    pub fn sample_set() -> Vec<Self> {
        vec![
            Self::application_base(),
            Self::application_patch(),
            Self::network(),
            Self::volume(),
            Self::secret_value(),
            Self::secret(),
        ]
    }

    /// Write the fixture into `dir`, creating parent directories.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, &self.content)
            .with_context(|| format!("Failed to write fixture {}", path.display()))?;
        Ok(path)
    }

    /// Write every fixture into `dir`, returning paths in input order.
    pub fn write_all(fixtures: &[Self], dir: &Path) -> Result<Vec<PathBuf>> {
        fixtures.iter().map(|fixture| fixture.write_to(dir)).collect()
    }
}
