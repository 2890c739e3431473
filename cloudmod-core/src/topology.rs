//! Pipeline topology builder
//!
//! Maps a resolved configuration to the fixed stage sequence
//! `Staging → BuildInfra → Deploy → [Delivery]`. The shape only branches on
//! the source provider and on whether application delivery is requested.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::config::{ResolvedConfig, ResolvedSource};
use crate::domain::pipeline::{
    Action, ActionKind, Artifact, BUILD_INFRA_STAGE, CHANGE_SET_NAME, Capability, ChangeSetDeploy,
    DELIVERY_STAGE, DEPLOY_STAGE, Pipeline, STAGING_STAGE, Stage, TEMPLATE_CONFIGURATION_FILE,
    TEMPLATE_FILE,
};
use crate::domain::project::{BuildProject, ProjectKind};
use crate::domain::source::{RepositoryHandle, SecretReference, SourceBinding};

/// Environment variable carrying the stack name into the delivery build
pub const STACK_NAME_ENV: &str = "STACK_NAME";

/// Build and delivery executors invoked by the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Executors {
    pub build: BuildProject,
    pub delivery: Option<BuildProject>,
}

/// Everything the builder declares for one configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    pub source: SourceBinding,
    pub pipeline: Pipeline,
    pub executors: Executors,
}

/// Build the pipeline topology for a resolved configuration
///
/// Construction is pure: calling this twice with the same configuration
/// yields equal topologies.
pub fn build(config: &ResolvedConfig) -> Topology {
    let source = bind_source(config);
    debug!("Bound pipeline source: {}", source.describe());

    let build_project = BuildProject::new(
        format!("{}-build-infra", config.pipeline_name),
        ProjectKind::Build,
    );

    let mut pipeline = Pipeline::new(
        config.pipeline_name.clone(),
        vec![
            Stage::single(STAGING_STAGE, source_action(&source)),
            Stage::single(BUILD_INFRA_STAGE, build_action(&build_project)),
            Stage::single(DEPLOY_STAGE, deploy_action(config)),
        ],
    );

    // Delivery goes on last, after the core pipeline exists
    let delivery_project = if config.needs_app_delivery {
        let project = BuildProject::new(
            format!("{}-delivery", config.pipeline_name),
            ProjectKind::Delivery,
        )
        .with_plaintext_env(STACK_NAME_ENV, config.stack_name.clone());
        pipeline.add_stage(Stage::single(DELIVERY_STAGE, delivery_action(&project)));
        Some(project)
    } else {
        None
    };

    info!(
        "Pipeline topology built: {} [{}]",
        pipeline.name,
        pipeline.stage_names().join(" -> ")
    );

    Topology {
        source,
        pipeline,
        executors: Executors {
            build: build_project,
            delivery: delivery_project,
        },
    }
}

/// Resolve the code source binding
pub fn bind_source(config: &ResolvedConfig) -> SourceBinding {
    match &config.source {
        ResolvedSource::CodeCommit { create_repository } => {
            let repository = if *create_repository {
                RepositoryHandle::created(config.repository_name.clone())
            } else {
                RepositoryHandle::existing(config.repository_name.clone())
            };
            SourceBinding::CodeCommit {
                repository,
                branch: config.branch_name.clone(),
            }
        }
        ResolvedSource::GitHub {
            account_owner,
            oauth_secret_arn,
        } => SourceBinding::GitHub {
            owner: account_owner.clone(),
            repo: config.repository_name.clone(),
            branch: config.branch_name.clone(),
            credential: SecretReference::github_token(oauth_secret_arn.clone()),
        },
    }
}

fn source_action(source: &SourceBinding) -> Action {
    let name = match source {
        SourceBinding::CodeCommit { .. } => "CodeCommit_Source",
        SourceBinding::GitHub { .. } => "GitHub_Source",
    };
    Action::new(
        name,
        ActionKind::SourceFetch {
            source: source.clone(),
        },
    )
    .with_output(Artifact::source_code())
}

fn build_action(project: &BuildProject) -> Action {
    Action::new(
        "Build_Infra",
        ActionKind::BuildInvoke {
            project: project.name.clone(),
        },
    )
    .with_input(Artifact::source_code())
    .with_output(Artifact::infra_definition())
}

fn deploy_action(config: &ResolvedConfig) -> Action {
    let infra = Artifact::infra_definition();
    Action::new(
        "Deploy_ChangeSet",
        ActionKind::ChangeSetDeploy(ChangeSetDeploy {
            stack_name: config.stack_name.clone(),
            change_set_name: CHANGE_SET_NAME.to_string(),
            template_path: infra.at_path(TEMPLATE_FILE),
            template_configuration: infra.at_path(TEMPLATE_CONFIGURATION_FILE),
            admin_permissions: true,
            capabilities: vec![Capability::AnonymousIam],
        }),
    )
    .with_input(infra)
}

fn delivery_action(project: &BuildProject) -> Action {
    Action::new(
        "Deliver_App",
        ActionKind::DeliveryInvoke {
            project: project.name.clone(),
        },
    )
    .with_input(Artifact::source_code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::{PipelineConfig, StackContext};
    use crate::domain::source::RepositoryOrigin;
    use crate::resolver::resolve;

    fn resolved(config: PipelineConfig) -> ResolvedConfig {
        let context = StackContext::new("123456789012", "us-east-1", "AmbientStack");
        resolve(&config, &context).unwrap()
    }

    #[test]
    fn test_core_stages_without_delivery() {
        let topology = build(&resolved(PipelineConfig::new("app")));
        assert_eq!(
            topology.pipeline.stage_names(),
            vec!["Staging", "BuildInfra", "Deploy"]
        );
        assert!(topology.executors.delivery.is_none());
    }

    #[test]
    fn test_delivery_stage_is_last() {
        let topology = build(&resolved(PipelineConfig::new("app").with_app_delivery(true)));
        assert_eq!(
            topology.pipeline.stage_names(),
            vec!["Staging", "BuildInfra", "Deploy", "Delivery"]
        );

        let delivery = topology.pipeline.stage(DELIVERY_STAGE).unwrap();
        assert_eq!(delivery.actions.len(), 1);
        assert_eq!(delivery.actions[0].inputs, vec![Artifact::source_code()]);
        assert!(delivery.actions[0].outputs.is_empty());
    }

    #[test]
    fn test_codecommit_created_repository() {
        let topology = build(&resolved(PipelineConfig::new("app")));
        match &topology.source {
            SourceBinding::CodeCommit { repository, branch } => {
                assert_eq!(repository.name, "app");
                assert_eq!(repository.origin, RepositoryOrigin::Created);
                assert_eq!(branch, "master");
            }
            other => panic!("expected codecommit binding, got {:?}", other),
        }
    }

    #[test]
    fn test_codecommit_existing_repository() {
        let topology = build(&resolved(
            PipelineConfig::new("app").with_create_repository(false),
        ));
        match &topology.source {
            SourceBinding::CodeCommit { repository, .. } => assert!(!repository.is_created()),
            other => panic!("expected codecommit binding, got {:?}", other),
        }
    }

    #[test]
    fn test_github_source_action() {
        let topology = build(&resolved(
            PipelineConfig::new("app")
                .with_github("octo", "arn:secret")
                .with_branch("main"),
        ));

        let staging = topology.pipeline.stage(STAGING_STAGE).unwrap();
        assert_eq!(staging.actions.len(), 1);
        let action = &staging.actions[0];
        assert_eq!(action.name, "GitHub_Source");
        assert_eq!(action.outputs, vec![Artifact::source_code()]);
        match &action.kind {
            ActionKind::SourceFetch {
                source:
                    SourceBinding::GitHub {
                        owner,
                        repo,
                        branch,
                        credential,
                    },
            } => {
                assert_eq!(owner, "octo");
                assert_eq!(repo, "app");
                assert_eq!(branch, "main");
                assert_eq!(credential.secret_arn, "arn:secret");
                assert_eq!(credential.json_field, "github-access-token");
            }
            other => panic!("expected github source fetch, got {:?}", other),
        }
    }

    #[test]
    fn test_build_stage_wiring() {
        let topology = build(&resolved(PipelineConfig::new("app").with_stack_name("prod")));
        let action = &topology.pipeline.stage(BUILD_INFRA_STAGE).unwrap().actions[0];

        assert_eq!(action.inputs, vec![Artifact::source_code()]);
        assert_eq!(action.outputs, vec![Artifact::infra_definition()]);
        assert_eq!(
            action.kind,
            ActionKind::BuildInvoke {
                project: "prod-pipeline-build-infra".into()
            }
        );
        assert_eq!(topology.executors.build.build_spec, "buildspec.yaml");
    }

    #[test]
    fn test_deploy_stage_change_set() {
        let topology = build(&resolved(PipelineConfig::new("app").with_stack_name("prod")));
        let action = &topology.pipeline.stage(DEPLOY_STAGE).unwrap().actions[0];

        match &action.kind {
            ActionKind::ChangeSetDeploy(deploy) => {
                assert_eq!(deploy.stack_name, "prod");
                assert_eq!(deploy.change_set_name, "Main");
                assert_eq!(deploy.template_path, "InfraDefinition::template.yaml");
                assert_eq!(
                    deploy.template_configuration,
                    "InfraDefinition::template-configuration.json"
                );
                assert!(deploy.admin_permissions);
                assert_eq!(deploy.capabilities, vec![Capability::AnonymousIam]);
            }
            other => panic!("expected change set deploy, got {:?}", other),
        }
    }

    #[test]
    fn test_delivery_project_env() {
        let topology = build(&resolved(
            PipelineConfig::new("app")
                .with_stack_name("prod")
                .with_app_delivery(true),
        ));
        let delivery = topology.executors.delivery.unwrap();
        assert_eq!(delivery.build_spec, "deliverspec.yaml");
        assert_eq!(delivery.image, topology.executors.build.image);
        assert_eq!(delivery.plaintext_env(STACK_NAME_ENV), Some("prod"));
        assert_eq!(delivery.environment_variables.len(), 1);
    }

    #[test]
    fn test_builder_does_not_grant() {
        let topology = build(&resolved(PipelineConfig::new("app").with_app_delivery(true)));
        assert!(topology.executors.build.role.grants().is_empty());
        assert!(
            topology
                .executors
                .delivery
                .as_ref()
                .unwrap()
                .role
                .grants()
                .is_empty()
        );
    }
}
