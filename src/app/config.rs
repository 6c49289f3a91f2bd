use crate::app::cli::CliArgs;

/// Settings for one login run. Starts out as whatever was passed on the
/// command line; the resolver steps fill in anything left empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub profile: Option<String>,
    pub region: String,
    pub cluster: Option<String>,
    pub skip_sso: bool,
    pub interactive: bool,
}

impl From<CliArgs> for RunConfig {
    fn from(args: CliArgs) -> Self {
        RunConfig {
            profile: non_empty(args.profile),
            region: args.region,
            cluster: non_empty(args.cluster),
            skip_sso: args.skip_sso,
            interactive: args.interactive,
        }
    }
}

// `--profile ""` means the same as leaving the flag off.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
