//! Backend that drives the `oci` command line tool.
//!
//! Every call spawns one `oci` process and parses its JSON output. The CLI
//! prints nothing at all for empty list results, which is read as an empty
//! collection. Paged commands carry the next page token next to `data`.

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::process::Command;
use tracing::{debug, warn};

use sweep_config::BackendConfig;

use super::errors::BackendError;
use super::traits::SearchBackend;
use super::types::{CompartmentSummary, ResourceRecord, SearchPage, SearchQuery};

pub struct OciCliBackend {
    bin: String,
    profile: Option<String>,
    tenancy_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned + Default"))]
struct Envelope<T> {
    #[serde(default)]
    data: T,
    #[serde(default, rename = "opc-next-page")]
    next_page: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ResourceTypeWire {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct SearchCollectionWire {
    #[serde(default)]
    items: Vec<SearchItemWire>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct SearchItemWire {
    resource_type: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    lifecycle_state: Option<String>,
    #[serde(default)]
    compartment_id: Option<String>,
    #[serde(default)]
    identifier: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RegionSubscriptionWire {
    region_name: String,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct CompartmentWire {
    id: String,
    name: String,
    #[serde(default)]
    lifecycle_state: Option<String>,
}

impl From<SearchItemWire> for ResourceRecord {
    fn from(item: SearchItemWire) -> Self {
        ResourceRecord {
            resource_type: item.resource_type,
            display_name: item.display_name.unwrap_or_default(),
            lifecycle_state: item.lifecycle_state,
            compartment_id: item.compartment_id,
            identifier: item.identifier,
        }
    }
}

impl From<CompartmentWire> for CompartmentSummary {
    fn from(c: CompartmentWire) -> Self {
        CompartmentSummary {
            id: c.id,
            name: c.name,
            lifecycle_state: c.lifecycle_state,
        }
    }
}

impl OciCliBackend {
    pub fn new(bin: impl Into<String>, profile: Option<String>, tenancy_id: Option<String>) -> Self {
        Self {
            bin: bin.into(),
            profile,
            tenancy_id,
        }
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new(
            config.oci_bin.clone(),
            config.profile.clone(),
            config.tenancy_id(),
        )
    }

    /// Fail early when the `oci` binary is not on PATH.
    pub fn ensure_available(&self) -> Result<(), BackendError> {
        which::which(&self.bin).map_err(|_| BackendError::ToolNotFound {
            tool: self.bin.clone(),
        })?;
        Ok(())
    }

    fn tenancy(&self) -> Result<&str, BackendError> {
        self.tenancy_id
            .as_deref()
            .ok_or(BackendError::MissingTenancy)
    }

    fn command_args(&self, args: &[&str], region: Option<&str>) -> Vec<String> {
        let mut full: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        if let Some(profile) = &self.profile {
            full.push("--profile".to_string());
            full.push(profile.clone());
        }
        if let Some(region) = region {
            full.push("--region".to_string());
            full.push(region.to_string());
        }
        full
    }

    async fn run_json<T>(&self, args: Vec<String>) -> Result<T, BackendError>
    where
        T: DeserializeOwned + Default,
    {
        let (command, stdout) = self.run(args).await?;
        parse_envelope::<T>(&command, &stdout).map(|envelope| envelope.data)
    }

    /// Run the CLI and return the rendered command line with its stdout.
    async fn run(&self, args: Vec<String>) -> Result<(String, String), BackendError> {
        let rendered = format!("{} {}", self.bin, args.join(" "));
        debug!(event = "core.backend.oci_command_started", command = %rendered);

        let output = Command::new(&self.bin)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => BackendError::ToolNotFound {
                    tool: self.bin.clone(),
                },
                _ => BackendError::IoError { source: e },
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(
                event = "core.backend.oci_command_failed",
                command = %rendered,
                status = ?output.status.code(),
                stderr = %stderr
            );
            return Err(BackendError::CommandFailed {
                command: rendered,
                code: output
                    .status
                    .code()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string()),
                stderr,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        Ok((rendered, stdout))
    }
}

fn parse_envelope<T>(command: &str, stdout: &str) -> Result<Envelope<T>, BackendError>
where
    T: DeserializeOwned + Default,
{
    if stdout.trim().is_empty() {
        return Ok(Envelope {
            data: T::default(),
            next_page: None,
        });
    }
    serde_json::from_str::<Envelope<T>>(stdout).map_err(|e| BackendError::ParseFailed {
        command: command.to_string(),
        message: e.to_string(),
    })
}

fn search_page(envelope: Envelope<SearchCollectionWire>) -> SearchPage {
    SearchPage {
        records: envelope
            .data
            .items
            .into_iter()
            .map(ResourceRecord::from)
            .collect(),
        next_page: envelope.next_page.filter(|token| !token.is_empty()),
    }
}

/// Names of the subscribed regions that are usable. Subscriptions still
/// being provisioned cannot be searched and are left out.
fn ready_regions(subscriptions: Vec<RegionSubscriptionWire>) -> Vec<String> {
    subscriptions
        .into_iter()
        .filter_map(|sub| match sub.status.as_deref() {
            None => Some(sub.region_name),
            Some(status) if status.eq_ignore_ascii_case("READY") => Some(sub.region_name),
            Some(status) => {
                warn!(
                    event = "core.backend.region_not_ready",
                    region = %sub.region_name,
                    status = status
                );
                None
            }
        })
        .collect()
}

#[async_trait]
impl SearchBackend for OciCliBackend {
    fn name(&self) -> &'static str {
        "oci-cli"
    }

    async fn list_resource_types(&self) -> Result<Vec<String>, BackendError> {
        let args = self.command_args(&["search", "resource-type", "list", "--all"], None);
        let types: Vec<ResourceTypeWire> = self.run_json(args).await?;
        Ok(types.into_iter().map(|t| t.name).collect())
    }

    async fn search(
        &self,
        region: &str,
        query: &SearchQuery,
        limit: u32,
        page: Option<&str>,
    ) -> Result<SearchPage, BackendError> {
        let query_text = query.to_query_text();
        let limit = limit.to_string();
        let mut base: Vec<&str> = vec![
            "search",
            "resource",
            "structured-search",
            "--query-text",
            &query_text,
            "--limit",
            &limit,
        ];
        if let Some(page) = page {
            base.push("--page");
            base.push(page);
        }
        let args = self.command_args(&base, Some(region));
        let (command, stdout) = self.run(args).await.map_err(|e| match e {
            BackendError::CommandFailed { stderr, .. } => BackendError::SearchFailed {
                region: region.to_string(),
                message: stderr,
            },
            other => other,
        })?;
        parse_envelope::<SearchCollectionWire>(&command, &stdout).map(search_page)
    }

    async fn list_region_subscriptions(&self) -> Result<Vec<String>, BackendError> {
        let tenancy = self.tenancy()?;
        let args = self.command_args(
            &["iam", "region-subscription", "list", "--tenancy-id", tenancy],
            None,
        );
        let subscriptions: Vec<RegionSubscriptionWire> = self.run_json(args).await?;
        Ok(ready_regions(subscriptions))
    }

    async fn list_compartments(&self) -> Result<Vec<CompartmentSummary>, BackendError> {
        let tenancy = self.tenancy()?;
        let list_args = self.command_args(
            &[
                "iam",
                "compartment",
                "list",
                "--compartment-id",
                tenancy,
                "--compartment-id-in-subtree",
                "true",
                "--all",
            ],
            None,
        );
        let mut compartments: Vec<CompartmentSummary> = self
            .run_json::<Vec<CompartmentWire>>(list_args)
            .await?
            .into_iter()
            .map(CompartmentSummary::from)
            .collect();

        let root_args =
            self.command_args(&["iam", "compartment", "get", "--compartment-id", tenancy], None);
        let root: Option<CompartmentWire> = self.run_json(root_args).await?;
        if let Some(root) = root {
            compartments.push(root.into());
        }
        Ok(compartments)
    }
}
