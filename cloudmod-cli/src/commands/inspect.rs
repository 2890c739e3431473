//! Inspection command handlers
//!
//! Human readable views of a declared pipeline: its stages and the grants
//! attached to its execution roles.

use cloudmod_core::CodePipeline;
use cloudmod_core::domain::pipeline::{Action, ActionKind};
use colored::*;

/// Print the pipeline stages in execution order
pub fn print_stages(pipeline: &CodePipeline) {
    let declared = pipeline.pipeline();

    println!("{}", "Pipeline Details:".bold());
    println!("  Name:   {}", declared.name.bold());
    println!("  Stack:  {}", pipeline.config().stack_name.cyan());
    println!("  Source: {}", pipeline.source().describe().dimmed());
    println!();

    for (index, stage) in declared.stages().iter().enumerate() {
        println!("  {} {}", format!("{}.", index + 1).cyan(), stage.name.bold());
        for action in &stage.actions {
            print_action(action);
        }
    }
}

fn print_action(action: &Action) {
    println!(
        "    {} {} {}",
        "▸".cyan(),
        action.name,
        format!("({})", action.kind.type_name()).dimmed()
    );

    if !action.inputs.is_empty() {
        let inputs: Vec<&str> = action.inputs.iter().map(|a| a.name()).collect();
        println!("      In:  {}", inputs.join(", ").dimmed());
    }
    if !action.outputs.is_empty() {
        let outputs: Vec<&str> = action.outputs.iter().map(|a| a.name()).collect();
        println!("      Out: {}", outputs.join(", ").dimmed());
    }

    match &action.kind {
        ActionKind::ChangeSetDeploy(deploy) => {
            println!(
                "      Stack: {}  Change set: {}",
                deploy.stack_name.cyan(),
                deploy.change_set_name
            );
        }
        ActionKind::BuildInvoke { project } | ActionKind::DeliveryInvoke { project } => {
            println!("      Project: {}", project.dimmed());
        }
        ActionKind::SourceFetch { .. } => {}
    }
}

/// Print the grants attached to each execution role
pub fn print_grants(pipeline: &CodePipeline) {
    let grants = pipeline.grants();

    if grants.is_empty() {
        println!("{}", "No grants attached.".yellow());
        return;
    }

    let context = &pipeline.config().context;
    println!("{}", format!("Found {} grant(s):", grants.len()).bold());
    println!();
    for grant in grants {
        let scope = if grant.is_unrestricted() {
            "unrestricted".yellow()
        } else {
            "scoped".green()
        };
        println!(
            "  {} {} {}",
            "▸".cyan(),
            grant.actions.join(", ").bold(),
            format!("[{}]", scope).dimmed()
        );
        println!("    Principal: {}", grant.principal.dimmed());
        for arn in grant.resource_arns(context) {
            println!("    Resource:  {}", arn);
        }
    }
}
