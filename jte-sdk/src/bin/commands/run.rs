// Full workflow command

use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::Args;
use jte_sdk::workflow::{Workflow, WorkflowPlan};

use super::{
    utils::{info, success},
    Context,
};

#[derive(Args)]
pub struct RunCmd {
    /// Validate the configuration and print the plan without sending anything
    #[arg(long)]
    dry_run: bool,

    /// Ignore the configured deadline
    #[arg(long)]
    no_deadline: bool,
}

pub async fn execute(cmd: RunCmd, config: jte_sdk::JteConfig) -> Result<()> {
    config.validate().context("Invalid configuration")?;

    let metadata_args = match (&config.metadata, config.steps.metadata) {
        (Some(metadata), true) => Some(
            metadata
                .load_args()
                .await
                .context("Failed to load metadata image")?,
        ),
        _ => None,
    };
    let plan = WorkflowPlan::from_config(&config, metadata_args);

    if cmd.dry_run {
        info(&format!("Steps: {:?}", plan.steps));
        info(&format!(
            "Amounts: mint {}, transfer {}, burn {}",
            plan.mint_amount, plan.transfer_amount, plan.burn_amount
        ));
        success("Configuration is valid");
        return Ok(());
    }

    let deadline_secs = config.cluster.deadline_secs;
    let ctx = Context::new(config)?;
    let identity = ctx.config.identity_provider()?;
    let cluster = ctx.cluster.clone();
    let workflow = Workflow::new(ctx.client, identity, plan, cluster.clone());

    let result = if deadline_secs == 0 || cmd.no_deadline {
        workflow.run().await
    } else {
        workflow
            .run_with_deadline(Duration::from_secs(deadline_secs))
            .await
    };
    let report = result.context("Workflow failed")?;

    for (label, link) in report.links(&cluster) {
        info(&format!("{}: {}", label, link));
    }
    success("Finished successfully");
    Ok(())
}
