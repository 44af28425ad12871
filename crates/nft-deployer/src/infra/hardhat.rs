//! Lookup of compiled contracts in a Hardhat `artifacts` directory.

use {
    alloy::{
        json_abi::JsonAbi,
        primitives::{Bytes, hex},
    },
    anyhow::{Context, Result, bail, ensure},
    serde::Deserialize,
    std::{
        collections::BTreeMap,
        path::{Path, PathBuf},
    },
    tokio::fs,
};

/// Compiler output for a single contract, ready to be deployed.
#[derive(Debug)]
pub struct Artifact {
    pub contract_name: String,
    pub source_name: Option<String>,
    pub abi: JsonAbi,
    /// Creation bytecode, without constructor arguments.
    pub bytecode: Bytes,
}

/// Artifact file as written by Hardhat. The bytecode stays a string since
/// unlinked library addresses appear as `__$<hash>$__` placeholders in it.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct File {
    contract_name: String,
    #[serde(default)]
    source_name: Option<String>,
    abi: JsonAbi,
    bytecode: String,
    #[serde(default)]
    link_references: BTreeMap<String, serde_json::Value>,
}

impl Artifact {
    /// Parses the artifact JSON of `template` and checks that it can be
    /// deployed as is.
    pub fn parse(template: &str, data: &[u8]) -> Result<Self> {
        let file = serde_json::from_slice::<File>(data)?;
        ensure!(
            file.contract_name == template,
            "artifact describes contract {}, expected {template}",
            file.contract_name
        );
        ensure!(
            file.link_references.is_empty(),
            "{template} needs the libraries {:?} linked before it can be deployed",
            file.link_references.keys().collect::<Vec<_>>()
        );
        let bytecode = hex::decode(&file.bytecode)
            .with_context(|| format!("{template} bytecode is not valid hex"))?;
        ensure!(
            !bytecode.is_empty(),
            "{template} has no bytecode, abstract contracts and interfaces can not be deployed"
        );
        Ok(Self {
            contract_name: file.contract_name,
            source_name: file.source_name,
            abi: file.abi,
            bytecode: bytecode.into(),
        })
    }
}

#[derive(Clone, Debug)]
pub struct Artifacts {
    root: PathBuf,
}

impl Artifacts {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Loads and validates the artifact of the contract named `template`.
    pub async fn load(&self, template: &str) -> Result<Artifact> {
        let path = self.find(template).await?;
        let data = fs::read(&path)
            .await
            .with_context(|| format!("I/O error while reading {path:?}"))?;
        let artifact = Artifact::parse(template, &data)
            .with_context(|| format!("invalid artifact {path:?}"))?;
        tracing::debug!(
            ?path,
            source = ?artifact.source_name,
            bytecode_len = artifact.bytecode.len(),
            "loaded artifact"
        );
        Ok(artifact)
    }

    /// Finds the artifact file of `template`: first at the location Hardhat
    /// writes it to for a contract living in a file of the same name, then
    /// anywhere below the artifacts directory.
    pub async fn find(&self, template: &str) -> Result<PathBuf> {
        let file_name = format!("{template}.json");
        let conventional = self
            .root
            .join("contracts")
            .join(format!("{template}.sol"))
            .join(&file_name);
        if fs::try_exists(&conventional).await.unwrap_or(false) {
            return Ok(conventional);
        }

        let mut candidates = Vec::new();
        let mut dirs = vec![self.root.clone()];
        while let Some(dir) = dirs.pop() {
            let mut entries = fs::read_dir(&dir)
                .await
                .with_context(|| format!("could not read artifacts directory {dir:?}"))?;
            while let Some(entry) = entries.next_entry().await? {
                if entry.file_type().await?.is_dir() {
                    // compiler inputs and outputs, no contract artifacts
                    if entry.file_name() != "build-info" {
                        dirs.push(entry.path());
                    }
                } else if entry.file_name().to_str() == Some(file_name.as_str()) {
                    candidates.push(entry.path());
                }
            }
        }
        candidates.sort();

        match candidates.as_slice() {
            [] => bail!("no artifact for contract {template} in {:?}", self.root),
            [path] => Ok(path.clone()),
            _ => bail!("contract name {template} is ambiguous, found artifacts {candidates:?}"),
        }
    }
}
