//! Pipeline configuration types
//!
//! `PipelineConfig` is the raw, partially specified input as a caller or a
//! configuration document supplies it. `ResolvedConfig` is what the resolver
//! produces from it: every default applied, every derived name filled in.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PipelineError;

/// Branch checked out when none is configured
pub const DEFAULT_BRANCH: &str = "master";

/// Code source provider
///
/// A closed set: anything else is rejected when the configuration is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    CodeCommit,
    GitHub,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::CodeCommit => "codecommit",
            SourceType::GitHub => "github",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "codecommit" => Ok(SourceType::CodeCommit),
            "github" => Ok(SourceType::GitHub),
            _ => Err(PipelineError::UnsupportedSourceType(s.to_string())),
        }
    }
}

/// Ambient deployment identity
///
/// Supplied by the provisioning environment and passed in explicitly so that
/// construction never reads global state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackContext {
    /// 12-digit account id
    pub account: String,

    /// Region the stack deploys into (e.g., "us-east-1")
    pub region: String,

    /// Name of the enclosing deployment stack
    pub stack_name: String,
}

impl StackContext {
    pub fn new(
        account: impl Into<String>,
        region: impl Into<String>,
        stack_name: impl Into<String>,
    ) -> Self {
        Self {
            account: account.into(),
            region: region.into(),
            stack_name: stack_name.into(),
        }
    }

    /// Validates the context
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.account.len() != 12 || !self.account.chars().all(|c| c.is_ascii_digit()) {
            return Err(PipelineError::config(format!(
                "account id must be 12 digits, got '{}'",
                self.account
            )));
        }

        if self.region.trim().is_empty() {
            return Err(PipelineError::config("region cannot be empty"));
        }

        if self.stack_name.trim().is_empty() {
            return Err(PipelineError::config("stack name cannot be empty"));
        }

        Ok(())
    }
}

/// Raw pipeline configuration
///
/// Field names follow the camelCase keys of the configuration document.
/// `source_type` stays a string here so that an unrecognized provider is
/// reported as such instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
    pub source_type: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub repository_name: String,
    pub account_owner: Option<String>,
    pub branch_name: Option<String>,
    pub create_repository: Option<bool>,
    pub pipeline_name: Option<String>,
    pub stack_name: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub needs_app_delivery: bool,
    pub oauth_secret_arn: Option<String>,
}

/// Treat an explicit `null` like an absent key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl PipelineConfig {
    /// Creates a configuration for the given repository with every other field defaulted
    pub fn new(repository_name: impl Into<String>) -> Self {
        Self {
            repository_name: repository_name.into(),
            ..Self::default()
        }
    }

    /// Parses a configuration document
    pub fn from_json(source: &str) -> serde_json::Result<Self> {
        serde_json::from_str(source)
    }

    pub fn with_source(mut self, source_type: SourceType) -> Self {
        self.source_type = Some(source_type.as_str().to_string());
        self
    }

    /// Points the pipeline at a GitHub repository
    pub fn with_github(
        mut self,
        account_owner: impl Into<String>,
        oauth_secret_arn: impl Into<String>,
    ) -> Self {
        self.source_type = Some(SourceType::GitHub.as_str().to_string());
        self.account_owner = Some(account_owner.into());
        self.oauth_secret_arn = Some(oauth_secret_arn.into());
        self
    }

    pub fn with_branch(mut self, branch_name: impl Into<String>) -> Self {
        self.branch_name = Some(branch_name.into());
        self
    }

    pub fn with_create_repository(mut self, create: bool) -> Self {
        self.create_repository = Some(create);
        self
    }

    pub fn with_pipeline_name(mut self, pipeline_name: impl Into<String>) -> Self {
        self.pipeline_name = Some(pipeline_name.into());
        self
    }

    pub fn with_stack_name(mut self, stack_name: impl Into<String>) -> Self {
        self.stack_name = Some(stack_name.into());
        self
    }

    pub fn with_app_delivery(mut self, needs_app_delivery: bool) -> Self {
        self.needs_app_delivery = needs_app_delivery;
        self
    }
}

/// Provider-specific part of a resolved configuration
///
/// GitHub carries its required fields by value, so a resolved GitHub source
/// can never be missing its owner or credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ResolvedSource {
    #[serde(rename_all = "camelCase")]
    CodeCommit { create_repository: bool },
    #[serde(rename_all = "camelCase")]
    GitHub {
        account_owner: String,
        oauth_secret_arn: String,
    },
}

impl ResolvedSource {
    pub fn source_type(&self) -> SourceType {
        match self {
            ResolvedSource::CodeCommit { .. } => SourceType::CodeCommit,
            ResolvedSource::GitHub { .. } => SourceType::GitHub,
        }
    }
}

/// Fully resolved pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedConfig {
    pub source: ResolvedSource,
    pub repository_name: String,
    pub branch_name: String,
    pub pipeline_name: String,
    pub stack_name: String,
    pub needs_app_delivery: bool,
    pub context: StackContext,
}

impl ResolvedConfig {
    pub fn source_type(&self) -> SourceType {
        self.source.source_type()
    }
}
