//! Build executor types
//!
//! A `BuildProject` is the external build environment an action runs in:
//! a build specification file, a Linux image, plaintext environment
//! variables and the execution role the build assumes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::config::StackContext;

/// Image every build and delivery project runs on
pub const LINUX_BUILD_IMAGE: &str = "aws/codebuild/standard:5.0";

/// Build specification of the infrastructure build
pub const BUILD_SPEC: &str = "buildspec.yaml";

/// Build specification of the application delivery
pub const DELIVER_SPEC: &str = "deliverspec.yaml";

/// Resource a grant applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourcePattern {
    /// A path under one service, rendered into an ARN with the stack context
    Scoped { service: String, path: String },
    /// Every resource (`*`)
    Any(AnyResource),
}

/// Marker for the unrestricted resource pattern; serializes as `"*"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnyResource {
    #[serde(rename = "*")]
    Wildcard,
}

impl ResourcePattern {
    pub fn scoped(service: impl Into<String>, path: impl Into<String>) -> Self {
        ResourcePattern::Scoped {
            service: service.into(),
            path: path.into(),
        }
    }

    pub fn any() -> Self {
        ResourcePattern::Any(AnyResource::Wildcard)
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, ResourcePattern::Any(_))
    }

    /// Full ARN in the given account and region
    pub fn to_arn(&self, context: &StackContext) -> String {
        match self {
            ResourcePattern::Scoped { service, path } => format!(
                "arn:aws:{}:{}:{}:{}",
                service, context.region, context.account, path
            ),
            ResourcePattern::Any(_) => "*".to_string(),
        }
    }
}

impl fmt::Display for ResourcePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourcePattern::Scoped { path, .. } => f.write_str(path),
            ResourcePattern::Any(_) => f.write_str("*"),
        }
    }
}

/// An allow statement attached to an execution role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    /// Name of the role receiving the grant
    pub principal: String,
    pub actions: Vec<String>,
    pub resources: Vec<ResourcePattern>,
}

impl PermissionGrant {
    pub fn new(
        principal: impl Into<String>,
        actions: impl IntoIterator<Item = impl Into<String>>,
        resources: Vec<ResourcePattern>,
    ) -> Self {
        Self {
            principal: principal.into(),
            actions: actions.into_iter().map(Into::into).collect(),
            resources,
        }
    }

    /// Resources as relative paths, `*` for unrestricted
    pub fn resource_paths(&self) -> Vec<String> {
        self.resources.iter().map(ToString::to_string).collect()
    }

    pub fn resource_arns(&self, context: &StackContext) -> Vec<String> {
        self.resources.iter().map(|r| r.to_arn(context)).collect()
    }

    pub fn is_unrestricted(&self) -> bool {
        self.resources.iter().any(ResourcePattern::is_wildcard)
    }
}

/// Identity a build runs under
///
/// Roles are declared by the provisioning collaborator; grants are only ever
/// appended to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRole {
    pub name: String,
    grants: Vec<PermissionGrant>,
}

impl ExecutionRole {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            grants: Vec::new(),
        }
    }

    /// Attach a grant to the role's policy
    pub fn add_to_policy(&mut self, grant: PermissionGrant) {
        self.grants.push(grant);
    }

    pub fn grants(&self) -> &[PermissionGrant] {
        &self.grants
    }
}

/// Environment variable injected into a build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum EnvironmentVariable {
    Plaintext(String),
}

/// Which build specification a project runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectKind {
    Build,
    Delivery,
}

impl ProjectKind {
    pub fn build_spec(&self) -> &'static str {
        match self {
            ProjectKind::Build => BUILD_SPEC,
            ProjectKind::Delivery => DELIVER_SPEC,
        }
    }
}

/// External build executor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildProject {
    pub name: String,
    pub kind: ProjectKind,
    pub build_spec: String,
    pub image: String,
    pub environment_variables: BTreeMap<String, EnvironmentVariable>,
    pub role: ExecutionRole,
}

impl BuildProject {
    /// Declares a project of the given kind with its fixed spec file and image
    pub fn new(name: impl Into<String>, kind: ProjectKind) -> Self {
        let name = name.into();
        Self {
            role: ExecutionRole::new(format!("{}-role", name)),
            name,
            kind,
            build_spec: kind.build_spec().to_string(),
            image: LINUX_BUILD_IMAGE.to_string(),
            environment_variables: BTreeMap::new(),
        }
    }

    pub fn with_plaintext_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment_variables
            .insert(key.into(), EnvironmentVariable::Plaintext(value.into()));
        self
    }

    pub fn plaintext_env(&self, key: &str) -> Option<&str> {
        match self.environment_variables.get(key) {
            Some(EnvironmentVariable::Plaintext(value)) => Some(value.as_str()),
            None => None,
        }
    }
}
