//! Source binding types

use serde::{Deserialize, Serialize};

/// JSON field of the secret that holds the GitHub token
pub const GITHUB_TOKEN_FIELD: &str = "github-access-token";

/// How a CodeCommit repository is obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryOrigin {
    /// Declared alongside the pipeline
    Created,
    /// Looked up by name; must already exist
    Existing,
}

/// Handle to a CodeCommit repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryHandle {
    pub name: String,
    pub origin: RepositoryOrigin,
}

impl RepositoryHandle {
    pub fn created(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            origin: RepositoryOrigin::Created,
        }
    }

    pub fn existing(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            origin: RepositoryOrigin::Existing,
        }
    }

    pub fn is_created(&self) -> bool {
        self.origin == RepositoryOrigin::Created
    }
}

/// Reference to a value inside the secret store
///
/// Only the reference is recorded; the value is read by the source host at
/// execution time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretReference {
    pub secret_arn: String,
    pub json_field: String,
}

impl SecretReference {
    pub fn github_token(secret_arn: impl Into<String>) -> Self {
        Self {
            secret_arn: secret_arn.into(),
            json_field: GITHUB_TOKEN_FIELD.to_string(),
        }
    }
}

/// Resolved reference to the code source
///
/// Exactly one binding exists per pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum SourceBinding {
    CodeCommit {
        repository: RepositoryHandle,
        branch: String,
    },
    GitHub {
        owner: String,
        repo: String,
        branch: String,
        credential: SecretReference,
    },
}

impl SourceBinding {
    pub fn branch(&self) -> &str {
        match self {
            SourceBinding::CodeCommit { branch, .. } | SourceBinding::GitHub { branch, .. } => {
                branch
            }
        }
    }

    /// Repository name at the source host
    pub fn repository_name(&self) -> &str {
        match self {
            SourceBinding::CodeCommit { repository, .. } => &repository.name,
            SourceBinding::GitHub { repo, .. } => repo,
        }
    }

    /// Human readable location, e.g. `codecommit://app@master`
    pub fn describe(&self) -> String {
        match self {
            SourceBinding::CodeCommit { repository, branch } => {
                format!("codecommit://{}@{}", repository.name, branch)
            }
            SourceBinding::GitHub {
                owner,
                repo,
                branch,
                ..
            } => format!("github://{}/{}@{}", owner, repo, branch),
        }
    }
}
