//! Pipeline topology types

use serde::{Deserialize, Serialize};
use std::fmt;

use super::source::SourceBinding;

pub const STAGING_STAGE: &str = "Staging";
pub const BUILD_INFRA_STAGE: &str = "BuildInfra";
pub const DEPLOY_STAGE: &str = "Deploy";
pub const DELIVERY_STAGE: &str = "Delivery";

/// Change set every deploy creates and executes
pub const CHANGE_SET_NAME: &str = "Main";

pub const TEMPLATE_FILE: &str = "template.yaml";
pub const TEMPLATE_CONFIGURATION_FILE: &str = "template-configuration.json";

/// Named bundle passed between actions
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Artifact(String);

impl Artifact {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Fetched source tree
    pub fn source_code() -> Self {
        Self::new("SourceCode")
    }

    /// Output of the infrastructure build
    pub fn infra_definition() -> Self {
        Self::new("InfraDefinition")
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// Path of a file inside this artifact, e.g. `InfraDefinition::template.yaml`
    pub fn at_path(&self, file: &str) -> String {
        format!("{}::{}", self.0, file)
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// IAM capability acknowledged by a change set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Capability {
    /// Create IAM resources without naming them up front
    #[serde(rename = "CAPABILITY_IAM")]
    AnonymousIam,
}

/// Change set replace-and-execute against a stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSetDeploy {
    pub stack_name: String,
    pub change_set_name: String,
    pub template_path: String,
    pub template_configuration: String,
    pub admin_permissions: bool,
    pub capabilities: Vec<Capability>,
}

/// What an action does
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ActionKind {
    SourceFetch { source: SourceBinding },
    BuildInvoke { project: String },
    ChangeSetDeploy(ChangeSetDeploy),
    DeliveryInvoke { project: String },
}

impl ActionKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ActionKind::SourceFetch { .. } => "SourceFetch",
            ActionKind::BuildInvoke { .. } => "BuildInvoke",
            ActionKind::ChangeSetDeploy(_) => "ChangeSetDeploy",
            ActionKind::DeliveryInvoke { .. } => "DeliveryInvoke",
        }
    }
}

/// Unit of work inside a stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    pub inputs: Vec<Artifact>,
    pub outputs: Vec<Artifact>,
    #[serde(flatten)]
    pub kind: ActionKind,
}

impl Action {
    pub fn new(name: impl Into<String>, kind: ActionKind) -> Self {
        Self {
            name: name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            kind,
        }
    }

    pub fn with_input(mut self, artifact: Artifact) -> Self {
        self.inputs.push(artifact);
        self
    }

    pub fn with_output(mut self, artifact: Artifact) -> Self {
        self.outputs.push(artifact);
        self
    }

    pub fn is_source_fetch(&self) -> bool {
        matches!(self.kind, ActionKind::SourceFetch { .. })
    }
}

/// Ordered, named group of actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub name: String,
    pub actions: Vec<Action>,
}

impl Stage {
    /// Stage holding a single action
    pub fn single(name: impl Into<String>, action: Action) -> Self {
        Self {
            name: name.into(),
            actions: vec![action],
        }
    }
}

/// Declared pipeline
///
/// Stages run strictly in the order they were added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    pub name: String,
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new(name: impl Into<String>, stages: Vec<Stage>) -> Self {
        Self {
            name: name.into(),
            stages,
        }
    }

    /// Append a stage after every existing one
    pub fn add_stage(&mut self, stage: Stage) {
        self.stages.push(stage);
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stage(&self, name: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.name == name)
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.stages.iter().flat_map(|s| s.actions.iter())
    }

    pub fn has_delivery(&self) -> bool {
        self.stage(DELIVERY_STAGE).is_some()
    }

    /// Stack targeted by the change set deploy, if the pipeline has one
    pub fn deploy_target(&self) -> Option<&str> {
        self.actions().find_map(|action| match &action.kind {
            ActionKind::ChangeSetDeploy(deploy) => Some(deploy.stack_name.as_str()),
            _ => None,
        })
    }
}
