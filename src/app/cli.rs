use crate::app::aws::DEFAULT_REGION;
use clap::{ArgAction, Parser, Subcommand};

/// EKS Login Helper automates logging into AWS SSO, picking an EKS cluster
/// and updating your kubeconfig.
///
/// Examples:
///   eks-login                           # Interactive mode
///   eks-login --profile my-profile      # Use specific profile
///   eks-login --profile my-profile --region us-east-1 --cluster my-cluster
#[derive(Parser, Debug)]
#[clap(name = "eks-login", author, version, about, long_about, verbatim_doc_comment)]
pub struct CliArgs {
    #[clap(subcommand)]
    pub command: Option<Command>,

    /// AWS profile to use
    #[clap(short, long)]
    pub profile: Option<String>,

    /// AWS region
    #[clap(short, long, default_value = DEFAULT_REGION)]
    pub region: String,

    /// EKS cluster name
    #[clap(short, long)]
    pub cluster: Option<String>,

    /// Skip SSO login (assume already logged in)
    #[clap(long)]
    pub skip_sso: bool,

    /// Enable interactive mode
    #[clap(long, default_value_t = true, action = ArgAction::Set)]
    pub interactive: bool,

    /// Log every command that is run
    #[clap(short, long)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Print the version number
    Version,
}

pub fn version_string() -> String {
    format!("EKS Login Helper v{}", env!("CARGO_PKG_VERSION"))
}
