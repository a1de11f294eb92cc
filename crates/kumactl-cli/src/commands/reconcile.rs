use kumactl_core::{
    reconcile, Credentials, DesiredAssertion, ReconciliationResult, ResultReporter,
};

use super::RunContext;
use crate::cli::{MonitorTagArgs, TagArgs};

pub async fn tag(ctx: &RunContext, credentials: &Credentials, args: &TagArgs) -> ReconciliationResult {
    let assertion =
        DesiredAssertion::tag(&args.name, args.color.as_deref(), args.state.into());
    converge(ctx, credentials, &assertion).await
}

pub async fn monitor_tag(
    ctx: &RunContext,
    credentials: &Credentials,
    args: &MonitorTagArgs,
) -> ReconciliationResult {
    let assertion = DesiredAssertion::monitor_tag(
        &args.monitor_name,
        &args.tag_name,
        &args.value,
        args.state.into(),
    );
    converge(ctx, credentials, &assertion).await
}

async fn converge(
    ctx: &RunContext,
    credentials: &Credentials,
    assertion: &DesiredAssertion,
) -> ReconciliationResult {
    tracing::debug!(?assertion, "converging");
    match ctx.connect().await {
        Ok(client) => reconcile(client, credentials, assertion).await,
        Err(error) => {
            let mut reporter = ResultReporter::new();
            reporter.fail(error);
            reporter.finish()
        }
    }
}
