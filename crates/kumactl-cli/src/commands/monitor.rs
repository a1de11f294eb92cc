use anyhow::Result;
use kumactl_core::{inspect_monitors, Credentials, MonitorSelector};

use super::RunContext;
use crate::cli::MonitorListArgs;
use crate::output::print_monitors;

pub fn selector(args: &MonitorListArgs) -> MonitorSelector {
    match (args.id, &args.name) {
        (Some(id), _) => MonitorSelector::Id(id),
        (None, Some(name)) => MonitorSelector::Name(name.clone()),
        (None, None) => MonitorSelector::All,
    }
}

pub async fn list(ctx: &RunContext, credentials: &Credentials, args: &MonitorListArgs) -> Result<()> {
    let client = ctx.connect().await?;
    let monitors = inspect_monitors(client, credentials, &selector(args)).await?;
    print_monitors(&monitors, ctx.format)
}
