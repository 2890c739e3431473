//! Access policy composer
//!
//! Attaches the permission grants the declared actions need to the execution
//! roles of their executors. Only the delivery build needs anything beyond
//! the baseline role the provisioning side assigns.

use tracing::info;

use crate::domain::project::{PermissionGrant, ResourcePattern};
use crate::topology::Topology;

pub const DESCRIBE_STACKS: &str = "cloudformation:DescribeStacks";
pub const PUT_OBJECT: &str = "s3:PutObject";
pub const DESCRIBE_ENDPOINT: &str = "iot:DescribeEndpoint";

/// Grants the delivery role needs to read the deployed stack and publish
///
/// `DescribeStacks` is limited to the stack and its nested resources. The
/// object store and device endpoint grants are unrestricted.
pub fn delivery_grants(role: &str, stack_name: &str) -> Vec<PermissionGrant> {
    vec![
        PermissionGrant::new(
            role,
            [DESCRIBE_STACKS],
            vec![
                ResourcePattern::scoped("cloudformation", format!("stack/{}", stack_name)),
                ResourcePattern::scoped("cloudformation", format!("stack/{}/*", stack_name)),
            ],
        ),
        PermissionGrant::new(role, [PUT_OBJECT], vec![ResourcePattern::any()]),
        PermissionGrant::new(role, [DESCRIBE_ENDPOINT], vec![ResourcePattern::any()]),
    ]
}

/// Attach grants for every stage present in the topology
///
/// The stack is the one the pipeline's change set deploy targets. Returns the
/// grants attached by this call: nothing when the pipeline has no delivery
/// stage, and nothing when the grants are already in place.
pub fn compose(topology: &mut Topology) -> Vec<PermissionGrant> {
    if !topology.pipeline.has_delivery() {
        return Vec::new();
    }

    let Some(stack_name) = topology.pipeline.deploy_target() else {
        return Vec::new();
    };

    let Some(project) = topology.executors.delivery.as_mut() else {
        return Vec::new();
    };

    let grants: Vec<PermissionGrant> = delivery_grants(&project.role.name, stack_name)
        .into_iter()
        .filter(|grant| !project.role.grants().contains(grant))
        .collect();

    if grants.is_empty() {
        return grants;
    }

    for grant in &grants {
        project.role.add_to_policy(grant.clone());
    }

    info!(
        "Attached {} grant(s) to execution role {}",
        grants.len(),
        project.role.name
    );

    grants
}
