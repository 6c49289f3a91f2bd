use super::aws::{self, AwsError, SessionStatus, DEFAULT_REGION};
use super::cli::{version_string, CliArgs, Command};
use super::config::RunConfig;
use super::kubectl::{self, KUBECTL};
use super::prompt::{PromptError, Prompter};
use super::runner::{CommandRunner, SystemRunner};
use anyhow::Result;
use clap::Parser;
use log::{info, warn, LevelFilter};
use std::io::Write;
use thiserror::Error;
use tokio::io::{AsyncBufRead, BufReader};

const REQUIRED_TOOLS: [&str; 2] = [aws::AWS, KUBECTL];

#[derive(Error, Debug)]
pub enum LoginError {
    #[error("Required dependency '{tool}' not found in PATH")]
    DependencyMissing { tool: String },

    #[error("No AWS profiles found. Please configure AWS CLI first")]
    NoProfiles,

    #[error("No EKS clusters found in region {region} with profile {profile}")]
    NoClusters { region: String, profile: String },

    #[error(transparent)]
    Aws(#[from] AwsError),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error("Failed to write to terminal")]
    Output(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Connected {
        context: Option<String>,
        cluster_info: String,
    },
    Unverified,
}

/// Drives the login steps in order. Each step either fills in part of the
/// [`RunConfig`] or acts on what earlier steps resolved.
pub struct LoginWorkflow<R, I, W> {
    runner: R,
    prompter: Prompter<I>,
    out: W,
}

impl<R, I, W> LoginWorkflow<R, I, W>
where
    R: CommandRunner,
    I: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(runner: R, prompter: Prompter<I>, out: W) -> Self {
        Self {
            runner,
            prompter,
            out,
        }
    }

    pub async fn run(&mut self, config: &mut RunConfig) -> Result<Verification, LoginError> {
        self.check_dependencies()?;
        let profile = self.resolve_profile(config).await?;
        self.ensure_session(config, &profile).await?;
        let cluster = self.resolve_cluster(config, &profile).await?;
        self.update_kubeconfig(&config.region, &cluster, &profile).await?;
        let verification = self.verify_connection().await?;
        self.show_summary(config)?;
        Ok(verification)
    }

    pub fn check_dependencies(&mut self) -> Result<(), LoginError> {
        writeln!(self.out, "🔍 Checking dependencies...")?;

        for tool in REQUIRED_TOOLS {
            match self.runner.locate(tool) {
                Some(path) => {
                    info!("Found {} at {}", tool, path.display());
                    writeln!(self.out, "  ✓ {} found", tool)?;
                }
                None => {
                    return Err(LoginError::DependencyMissing {
                        tool: tool.to_string(),
                    })
                }
            }
        }

        Ok(())
    }

    /// Returns the profile to use, asking the user to pick one when none was
    /// given. Picking a profile also switches the region to the profile's.
    pub async fn resolve_profile(&mut self, config: &mut RunConfig) -> Result<String, LoginError> {
        if let Some(profile) = &config.profile {
            return Ok(profile.clone());
        }

        let profiles = aws::list_profiles(&self.runner, DEFAULT_REGION).await?;
        if profiles.is_empty() {
            return Err(LoginError::NoProfiles);
        }

        let index = self
            .prompter
            .choose(&mut self.out, "profile", "📋 Available AWS Profiles:", &profiles)
            .await?;
        let selected = &profiles[index];

        if profiles.len() == 1 {
            writeln!(
                self.out,
                "📋 Using profile: {} (region: {})",
                selected.name, selected.region
            )?;
        }

        config.profile = Some(selected.name.clone());
        config.region = selected.region.clone();
        Ok(selected.name.clone())
    }

    pub async fn ensure_session(
        &mut self,
        config: &RunConfig,
        profile: &str,
    ) -> Result<(), LoginError> {
        match aws::check_session(&self.runner, profile).await {
            SessionStatus::Valid => {
                writeln!(self.out, "✓ SSO session is valid")?;
            }
            SessionStatus::Invalid if config.skip_sso => {
                info!("SSO session for {} looks invalid, login skipped", profile);
            }
            SessionStatus::Invalid => {
                writeln!(self.out, "🔐 Logging in to AWS SSO...")?;
                self.out.flush()?;
                aws::sso_login(&self.runner, profile).await?;
                writeln!(self.out, "✓ SSO login successful")?;
            }
        }

        Ok(())
    }

    pub async fn resolve_cluster(
        &mut self,
        config: &mut RunConfig,
        profile: &str,
    ) -> Result<String, LoginError> {
        if let Some(cluster) = &config.cluster {
            return Ok(cluster.clone());
        }

        writeln!(self.out, "📋 Fetching EKS clusters...")?;
        let clusters = aws::list_clusters(&self.runner, profile, &config.region).await?;
        if clusters.is_empty() {
            return Err(LoginError::NoClusters {
                region: config.region.clone(),
                profile: profile.to_string(),
            });
        }

        let heading = format!("🎯 Available EKS Clusters in {}:", config.region);
        let index = self
            .prompter
            .choose(&mut self.out, "cluster", &heading, &clusters)
            .await?;
        let selected = clusters[index].clone();

        if clusters.len() == 1 {
            writeln!(self.out, "🎯 Using cluster: {}", selected)?;
        }

        config.cluster = Some(selected.clone());
        Ok(selected)
    }

    pub async fn update_kubeconfig(
        &mut self,
        region: &str,
        cluster: &str,
        profile: &str,
    ) -> Result<(), LoginError> {
        writeln!(self.out, "⚙️  Updating kubeconfig for cluster: {}", cluster)?;
        self.out.flush()?;
        aws::update_kubeconfig(&self.runner, region, cluster, profile).await?;
        writeln!(self.out, "✓ Kubeconfig updated successfully!")?;
        Ok(())
    }

    /// Best effort: a cluster we can't reach yet is reported but never fails
    /// the run, since the kubeconfig has already been written.
    pub async fn verify_connection(&mut self) -> Result<Verification, LoginError> {
        writeln!(self.out, "🔍 Verifying cluster connection...")?;

        let cluster_info = match kubectl::cluster_info(&self.runner).await {
            Ok(info) => info,
            Err(err) => {
                warn!("kubectl cluster-info failed: {}", err);
                writeln!(self.out, "⚠️  Kubeconfig updated but unable to verify connection")?;
                return Ok(Verification::Unverified);
            }
        };

        writeln!(self.out, "✓ Successfully connected to cluster!")?;

        let context = kubectl::current_context(&self.runner).await.ok();
        if let Some(context) = &context {
            writeln!(self.out, "📍 Current context: {}", context)?;
        }

        writeln!(self.out, "\n{}", cluster_info)?;

        Ok(Verification::Connected {
            context,
            cluster_info,
        })
    }

    pub fn show_summary(&mut self, config: &RunConfig) -> Result<(), LoginError> {
        writeln!(self.out, "\n🎉 EKS Login Complete!")?;
        writeln!(self.out, "Profile: {}", config.profile.as_deref().unwrap_or_default())?;
        writeln!(self.out, "Region: {}", config.region)?;
        writeln!(self.out, "Cluster: {}", config.cluster.as_deref().unwrap_or_default())?;
        writeln!(self.out, "\nYou can now use kubectl to interact with your cluster.")?;
        Ok(())
    }

    pub fn into_output(self) -> W {
        self.out
    }
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

pub async fn run() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.verbose);

    if let Some(Command::Version) = args.command {
        println!("{}", version_string());
        return Ok(());
    }

    let mut config: RunConfig = args.into();
    let prompter = Prompter::new(BufReader::new(tokio::io::stdin()), config.interactive);
    let mut workflow = LoginWorkflow::new(SystemRunner, prompter, std::io::stdout());
    workflow.run(&mut config).await?;
    Ok(())
}
