//! Configuration resolver
//!
//! Turns a raw `PipelineConfig` into a `ResolvedConfig`: applies defaults,
//! derives names and enforces the provider invariants before anything is
//! declared.

use tracing::debug;

use crate::domain::config::{
    DEFAULT_BRANCH, PipelineConfig, ResolvedConfig, ResolvedSource, SourceType, StackContext,
};
use crate::error::{PipelineError, Result};

/// Prefix of synthesized repository names
pub const PLACEHOLDER_REPOSITORY_PREFIX: &str = "my-cloudmod-repo-";

/// Resolve a raw configuration against the ambient stack context
///
/// # Errors
/// - `UnsupportedSourceType` if `source_type` names an unknown provider
/// - `Config` if a GitHub source lacks `account_owner` or `oauth_secret_arn`
pub fn resolve(config: &PipelineConfig, context: &StackContext) -> Result<ResolvedConfig> {
    let source_type = match config.source_type.as_deref() {
        Some(raw) => raw.parse::<SourceType>()?,
        None => SourceType::CodeCommit,
    };

    let source = match source_type {
        SourceType::CodeCommit => ResolvedSource::CodeCommit {
            create_repository: config.create_repository.unwrap_or(true),
        },
        SourceType::GitHub => resolve_github(config)?,
    };

    let repository_name = match &source {
        ResolvedSource::CodeCommit {
            create_repository: true,
        } if config.repository_name.trim().is_empty() => placeholder_repository_name(),
        _ => config.repository_name.clone(),
    };

    let branch_name = non_blank(config.branch_name.as_deref())
        .unwrap_or(DEFAULT_BRANCH)
        .to_string();

    let stack_name = non_blank(config.stack_name.as_deref())
        .unwrap_or(&context.stack_name)
        .to_string();

    let pipeline_name = match non_blank(config.pipeline_name.as_deref()) {
        Some(name) => name.to_string(),
        None => format!("{}-pipeline", stack_name),
    };

    debug!(
        "Resolved pipeline configuration: source={}, repository={}, branch={}, stack={}",
        source_type, repository_name, branch_name, stack_name
    );

    Ok(ResolvedConfig {
        source,
        repository_name,
        branch_name,
        pipeline_name,
        stack_name,
        needs_app_delivery: config.needs_app_delivery,
        context: context.clone(),
    })
}

fn resolve_github(config: &PipelineConfig) -> Result<ResolvedSource> {
    let account_owner = non_blank(config.account_owner.as_deref());
    let oauth_secret_arn = non_blank(config.oauth_secret_arn.as_deref());

    match (account_owner, oauth_secret_arn) {
        (Some(owner), Some(arn)) => Ok(ResolvedSource::GitHub {
            account_owner: owner.to_string(),
            oauth_secret_arn: arn.to_string(),
        }),
        (owner, arn) => {
            let missing: Vec<&str> = [
                owner.is_none().then_some("accountOwner"),
                arn.is_none().then_some("oauthSecretArn"),
            ]
            .into_iter()
            .flatten()
            .collect();

            Err(PipelineError::config(format!(
                "github source requires {}",
                missing.join(" and ")
            )))
        }
    }
}

/// Placeholder name for a repository created without an explicit name
///
/// The suffix is a v4 UUID, so collisions across processes are negligible.
pub fn placeholder_repository_name() -> String {
    format!(
        "{}{}",
        PLACEHOLDER_REPOSITORY_PREFIX,
        uuid::Uuid::new_v4().simple()
    )
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> StackContext {
        StackContext::new("123456789012", "us-east-1", "AmbientStack")
    }

    #[test]
    fn test_defaults_for_codecommit() {
        let resolved = resolve(&PipelineConfig::new("app"), &context()).unwrap();

        assert_eq!(resolved.source_type(), SourceType::CodeCommit);
        assert_eq!(
            resolved.source,
            ResolvedSource::CodeCommit {
                create_repository: true
            }
        );
        assert_eq!(resolved.repository_name, "app");
        assert_eq!(resolved.branch_name, "master");
        assert_eq!(resolved.stack_name, "AmbientStack");
        assert_eq!(resolved.pipeline_name, "AmbientStack-pipeline");
        assert!(!resolved.needs_app_delivery);
    }

    #[test]
    fn test_explicit_values_win() {
        let config = PipelineConfig::new("app")
            .with_branch("release")
            .with_stack_name("prod")
            .with_pipeline_name("app-cd")
            .with_create_repository(false);

        let resolved = resolve(&config, &context()).unwrap();
        assert_eq!(resolved.branch_name, "release");
        assert_eq!(resolved.stack_name, "prod");
        assert_eq!(resolved.pipeline_name, "app-cd");
        assert_eq!(
            resolved.source,
            ResolvedSource::CodeCommit {
                create_repository: false
            }
        );
    }

    #[test]
    fn test_placeholder_name_when_creating_unnamed_repository() {
        let resolved = resolve(&PipelineConfig::default(), &context()).unwrap();
        assert!(
            resolved
                .repository_name
                .starts_with(PLACEHOLDER_REPOSITORY_PREFIX)
        );
        assert!(resolved.repository_name.len() > PLACEHOLDER_REPOSITORY_PREFIX.len());
    }

    #[test]
    fn test_placeholder_names_are_unique() {
        assert_ne!(placeholder_repository_name(), placeholder_repository_name());
    }

    #[test]
    fn test_no_placeholder_for_existing_repository() {
        let config = PipelineConfig::default().with_create_repository(false);
        let resolved = resolve(&config, &context()).unwrap();
        assert_eq!(resolved.repository_name, "");
    }

    #[test]
    fn test_github_requires_owner_and_secret() {
        let mut config = PipelineConfig::new("app").with_source(SourceType::GitHub);
        config.oauth_secret_arn = Some("arn:aws:secretsmanager:us-east-1:1:secret:gh".into());

        let err = resolve(&config, &context()).unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("accountOwner"));
        assert!(!err.to_string().contains("oauthSecretArn"));

        config.account_owner = Some("octo".into());
        config.oauth_secret_arn = None;
        let err = resolve(&config, &context()).unwrap_err();
        assert!(err.to_string().contains("oauthSecretArn"));
    }

    #[test]
    fn test_github_blank_fields_count_as_missing() {
        let config = PipelineConfig::new("app").with_github("  ", "");
        let err = resolve(&config, &context()).unwrap_err();
        assert_eq!(
            err,
            PipelineError::Config("github source requires accountOwner and oauthSecretArn".into())
        );
    }

    #[test]
    fn test_github_resolves() {
        let config = PipelineConfig::new("app").with_github("octo", "arn:secret");
        let resolved = resolve(&config, &context()).unwrap();
        assert_eq!(
            resolved.source,
            ResolvedSource::GitHub {
                account_owner: "octo".into(),
                oauth_secret_arn: "arn:secret".into(),
            }
        );
    }

    #[test]
    fn test_unknown_source_type_is_rejected() {
        let mut config = PipelineConfig::new("app");
        config.source_type = Some("bitbucket".into());
        let err = resolve(&config, &context()).unwrap_err();
        assert!(err.is_unsupported_source());
    }

    #[test]
    fn test_blank_branch_and_stack_fall_back() {
        let config = PipelineConfig::new("app")
            .with_branch("   ")
            .with_stack_name("  ")
            .with_pipeline_name("");
        let resolved = resolve(&config, &context()).unwrap();

        assert_eq!(resolved.branch_name, DEFAULT_BRANCH);
        assert_eq!(resolved.stack_name, "AmbientStack");
        assert_eq!(resolved.pipeline_name, "AmbientStack-pipeline");
    }
}
