use super::runner::{CommandError, CommandRunner};

pub const KUBECTL: &str = "kubectl";

pub async fn cluster_info<R>(runner: &R) -> Result<String, CommandError>
where
    R: CommandRunner + ?Sized,
{
    runner.output(KUBECTL, &["cluster-info"]).await
}

pub async fn current_context<R>(runner: &R) -> Result<String, CommandError>
where
    R: CommandRunner + ?Sized,
{
    runner.output(KUBECTL, &["config", "current-context"]).await
}
