//! Pipeline construct
//!
//! One-call entry point that runs resolver, topology builder and policy
//! composer in order and hands back the three handles an embedding system
//! composes further: the source binding, the pipeline, and the executors.

use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::domain::config::{PipelineConfig, ResolvedConfig, StackContext};
use crate::domain::pipeline::Pipeline;
use crate::domain::project::{BuildProject, PermissionGrant};
use crate::domain::source::SourceBinding;
use crate::error::Result;
use crate::topology::{Executors, Topology};
use crate::{policy, resolver, topology};

/// A fully declared continuous-delivery pipeline
///
/// Either construction succeeds with every stage, executor and grant in
/// place, or it fails before anything is declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodePipeline {
    config: ResolvedConfig,
    topology: Topology,
}

impl CodePipeline {
    /// Declare a pipeline from a raw configuration
    ///
    /// # Errors
    /// Fails with `PipelineError::Config` or `PipelineError::UnsupportedSourceType`
    /// as reported by the resolver.
    pub fn new(config: &PipelineConfig, context: &StackContext) -> Result<Self> {
        let resolved = resolver::resolve(config, context)?;
        Ok(Self::from_resolved(resolved))
    }

    /// Declare a pipeline from an already resolved configuration
    pub fn from_resolved(config: ResolvedConfig) -> Self {
        let mut topology = topology::build(&config);
        let grants = policy::compose(&mut topology);

        info!(
            "Declared pipeline {} ({} stage(s), {} grant(s))",
            topology.pipeline.name,
            topology.pipeline.stages().len(),
            grants.len()
        );

        Self { config, topology }
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    pub fn source(&self) -> &SourceBinding {
        &self.topology.source
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.topology.pipeline
    }

    pub fn executors(&self) -> &Executors {
        &self.topology.executors
    }

    pub fn build_project(&self) -> &BuildProject {
        &self.topology.executors.build
    }

    pub fn delivery_project(&self) -> Option<&BuildProject> {
        self.topology.executors.delivery.as_ref()
    }

    /// Every grant attached by this construct, in attachment order
    pub fn grants(&self) -> Vec<&PermissionGrant> {
        let executors = &self.topology.executors;
        std::iter::once(&executors.build)
            .chain(executors.delivery.as_ref())
            .flat_map(|project| project.role.grants())
            .collect()
    }

    /// Render the declaration for the provisioning collaborator
    ///
    /// Grant resources are rendered as full ARNs in the stack's account and
    /// region.
    pub fn manifest(&self) -> serde_json::Value {
        let context = &self.config.context;
        let grants: Vec<serde_json::Value> = self
            .grants()
            .into_iter()
            .map(|grant| {
                json!({
                    "principal": grant.principal,
                    "actions": grant.actions,
                    "resources": grant.resource_arns(context),
                })
            })
            .collect();

        json!({
            "stackName": self.config.stack_name,
            "account": context.account,
            "region": context.region,
            "source": self.topology.source,
            "pipeline": self.topology.pipeline,
            "executors": self.topology.executors,
            "grants": grants,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;

    fn context() -> StackContext {
        StackContext::new("123456789012", "us-east-1", "AmbientStack")
    }

    #[test]
    fn test_construct_exposes_handles() {
        let pipeline = CodePipeline::new(
            &PipelineConfig::new("app").with_app_delivery(true),
            &context(),
        )
        .unwrap();

        assert_eq!(pipeline.source().repository_name(), "app");
        assert_eq!(pipeline.pipeline().stages().len(), 4);
        assert!(pipeline.delivery_project().is_some());
        assert_eq!(pipeline.grants().len(), 3);
        assert_eq!(pipeline.build_project().build_spec, "buildspec.yaml");
    }

    #[test]
    fn test_construct_fails_fast() {
        let config = PipelineConfig::new("app").with_github("", "arn:secret");
        let err = CodePipeline::new(&config, &context()).unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn test_manifest_renders_arns() {
        let pipeline = CodePipeline::new(
            &PipelineConfig::new("app")
                .with_stack_name("prod")
                .with_app_delivery(true),
            &context(),
        )
        .unwrap();

        let manifest = pipeline.manifest();
        assert_eq!(manifest["stackName"], "prod");
        assert_eq!(manifest["pipeline"]["stages"][3]["name"], "Delivery");
        assert_eq!(
            manifest["grants"][0]["resources"][0],
            "arn:aws:cloudformation:us-east-1:123456789012:stack/prod"
        );
        assert_eq!(manifest["grants"][1]["resources"][0], "*");
        assert_eq!(
            manifest["executors"]["delivery"]["environmentVariables"]["STACK_NAME"]["value"],
            "prod"
        );
    }
}
