use super::runner::{CommandError, CommandRunner};
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const AWS: &str = "aws";
pub const DEFAULT_REGION: &str = "us-west-2";

/// Shape of `aws eks list-clusters --output json`.
#[derive(Debug, Deserialize, Serialize)]
pub struct ListClustersResponse {
    pub clusters: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileInfo {
    pub name: String,
    pub region: String,
}

impl std::fmt::Display for ProfileInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (region: {})", self.name, self.region)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Valid,
    Invalid,
}

#[derive(Error, Debug)]
pub enum AwsError {
    #[error("Failed to list AWS profiles")]
    ListProfiles { source: CommandError },

    #[error("Failed to list EKS clusters")]
    ListClusters { source: CommandError },

    #[error("Failed to parse cluster list")]
    ParseClusters { source: serde_json::Error },

    #[error("SSO login failed")]
    LoginFailed { source: CommandError },

    #[error("Failed to update kubeconfig")]
    UpdateKubeconfig { source: CommandError },
}

/// Lists configured profiles along with the region each one points at.
/// Profiles without a region fall back to `default_region`.
pub async fn list_profiles<R>(
    runner: &R,
    default_region: &str,
) -> Result<Vec<ProfileInfo>, AwsError>
where
    R: CommandRunner + ?Sized,
{
    let output = runner
        .output(AWS, &["configure", "list-profiles"])
        .await
        .map_err(|source| AwsError::ListProfiles { source })?;

    let mut profiles = Vec::new();
    for name in output.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let region = match runner
            .output(AWS, &["configure", "get", "region", "--profile", name])
            .await
        {
            Ok(region) if !region.is_empty() => region,
            Ok(_) => default_region.to_string(),
            Err(err) => {
                debug!("No region configured for profile {}: {}", name, err);
                default_region.to_string()
            }
        };

        profiles.push(ProfileInfo {
            name: name.to_string(),
            region,
        });
    }

    Ok(profiles)
}

/// Checks whether the cached credentials for `profile` still work. Only the
/// exit status of `get-caller-identity` matters.
pub async fn check_session<R>(runner: &R, profile: &str) -> SessionStatus
where
    R: CommandRunner + ?Sized,
{
    match runner
        .output(AWS, &["sts", "get-caller-identity", "--profile", profile])
        .await
    {
        Ok(_) => SessionStatus::Valid,
        Err(err) => {
            debug!("Session check for profile {} failed: {}", profile, err);
            SessionStatus::Invalid
        }
    }
}

pub async fn sso_login<R>(runner: &R, profile: &str) -> Result<(), AwsError>
where
    R: CommandRunner + ?Sized,
{
    runner
        .passthrough(AWS, &["sso", "login", "--profile", profile])
        .await
        .map_err(|source| AwsError::LoginFailed { source })
}

pub async fn list_clusters<R>(
    runner: &R,
    profile: &str,
    region: &str,
) -> Result<Vec<String>, AwsError>
where
    R: CommandRunner + ?Sized,
{
    let output = runner
        .output(
            AWS,
            &[
                "eks",
                "list-clusters",
                "--profile",
                profile,
                "--region",
                region,
                "--output",
                "json",
            ],
        )
        .await
        .map_err(|source| AwsError::ListClusters { source })?;

    let response: ListClustersResponse =
        serde_json::from_str(&output).map_err(|source| AwsError::ParseClusters { source })?;

    debug!("Found {} clusters in {}", response.clusters.len(), region);
    Ok(response.clusters)
}

pub async fn update_kubeconfig<R>(
    runner: &R,
    region: &str,
    cluster: &str,
    profile: &str,
) -> Result<(), AwsError>
where
    R: CommandRunner + ?Sized,
{
    runner
        .passthrough(
            AWS,
            &[
                "eks",
                "update-kubeconfig",
                "--region",
                region,
                "--name",
                cluster,
                "--profile",
                profile,
            ],
        )
        .await
        .map_err(|source| AwsError::UpdateKubeconfig { source })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::app::runner::fake::FakeRunner;
    use anyhow::Result;

    #[test_log::test(tokio::test)]
    async fn test_list_profiles_reads_regions() -> Result<()> {
        let runner = FakeRunner::new()
            .ok("aws configure list-profiles", "dev\nprod\n")
            .ok("aws configure get region --profile dev", "us-west-2")
            .ok("aws configure get region --profile prod", "us-east-1");

        let profiles = list_profiles(&runner, DEFAULT_REGION).await?;

        assert_eq!(
            profiles,
            vec![
                ProfileInfo {
                    name: "dev".to_string(),
                    region: "us-west-2".to_string()
                },
                ProfileInfo {
                    name: "prod".to_string(),
                    region: "us-east-1".to_string()
                },
            ]
        );
        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn test_list_profiles_falls_back_to_default_region() -> Result<()> {
        let runner = FakeRunner::new()
            .ok("aws configure list-profiles", "  sandbox  \n\n\nstaging")
            .ok("aws configure get region --profile staging", "");

        let profiles = list_profiles(&runner, "eu-west-1").await?;

        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].name, "sandbox");
        assert_eq!(profiles[0].region, "eu-west-1");
        assert_eq!(profiles[1].name, "staging");
        assert_eq!(profiles[1].region, "eu-west-1");
        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn test_list_profiles_empty_output() -> Result<()> {
        let runner = FakeRunner::new().ok("aws configure list-profiles", "");
        assert!(list_profiles(&runner, DEFAULT_REGION).await?.is_empty());
        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn test_list_profiles_command_failure() {
        let runner = FakeRunner::new().fail("aws configure list-profiles");
        let err = list_profiles(&runner, DEFAULT_REGION).await.unwrap_err();
        assert!(matches!(err, AwsError::ListProfiles { .. }));
    }

    #[test_log::test(tokio::test)]
    async fn test_check_session_uses_exit_status_only() {
        let valid = FakeRunner::new().ok("aws sts get-caller-identity --profile dev", "");
        assert_eq!(check_session(&valid, "dev").await, SessionStatus::Valid);

        let expired = FakeRunner::new().fail("aws sts get-caller-identity --profile dev");
        assert_eq!(check_session(&expired, "dev").await, SessionStatus::Invalid);
    }

    #[test_log::test(tokio::test)]
    async fn test_list_clusters_parses_json() -> Result<()> {
        let runner = FakeRunner::new().ok(
            "aws eks list-clusters --profile dev --region us-west-2 --output json",
            r#"{"clusters": ["alpha", "beta"]}"#,
        );

        let clusters = list_clusters(&runner, "dev", "us-west-2").await?;

        assert_eq!(clusters, vec!["alpha".to_string(), "beta".to_string()]);
        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn test_list_clusters_rejects_malformed_json() {
        let runner = FakeRunner::new().ok(
            "aws eks list-clusters --profile dev --region us-west-2 --output json",
            "not json",
        );

        let err = list_clusters(&runner, "dev", "us-west-2").await.unwrap_err();
        assert!(matches!(err, AwsError::ParseClusters { .. }));
    }

    #[test_log::test(tokio::test)]
    async fn test_list_clusters_command_failure() {
        let runner = FakeRunner::new();
        let err = list_clusters(&runner, "dev", "us-west-2").await.unwrap_err();
        assert!(matches!(err, AwsError::ListClusters { .. }));
    }

    #[test_log::test(tokio::test)]
    async fn test_update_kubeconfig_arguments() -> Result<()> {
        let runner = FakeRunner::new().ok(
            "aws eks update-kubeconfig --region us-east-1 --name prod --profile ops",
            "",
        );

        update_kubeconfig(&runner, "us-east-1", "prod", "ops").await?;

        assert_eq!(
            runner.calls(),
            vec!["aws eks update-kubeconfig --region us-east-1 --name prod --profile ops"]
        );
        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn test_sso_login_failure_is_an_error() {
        let runner = FakeRunner::new().fail("aws sso login --profile dev");
        let err = sso_login(&runner, "dev").await.unwrap_err();
        assert!(matches!(err, AwsError::LoginFailed { .. }));
    }
}
