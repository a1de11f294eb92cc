use anyhow::Result;
use kumactl_core::{ensure_setup, ReconciliationResult, ResultReporter};

use super::RunContext;

pub async fn setup(
    ctx: &RunContext,
    username: Option<&str>,
    password: Option<&str>,
) -> Result<ReconciliationResult> {
    let (Some(username), Some(password)) = (username, password) else {
        anyhow::bail!("setup needs --username and --password");
    };
    Ok(match ctx.connect().await {
        Ok(client) => ensure_setup(client, username, password).await,
        Err(error) => {
            let mut reporter = ResultReporter::new();
            reporter.fail(error);
            reporter.finish()
        }
    })
}
