//! # eden CLI
//!
//! ECS Dynamic Environment Manager. Clone Amazon ECS environments easily.
//!
//! ## Usage
//!
//! ```bash
//! # Save parameters into the local profile
//! eden config setup --profile dev --name-prefix dev --target-cluster dev
//!
//! # Validate every local profile
//! eden config check
//!
//! # Share the profile through the state table
//! eden config push --profile dev
//!
//! # Deploy an image as a new environment, then list environments
//! eden create --profile dev --name feature-x --image-uri repo/api:feature-x
//! eden ls
//! ```

pub mod output;
pub mod run;

use crate::config::ini::check_section_name;
use crate::constants::{DEFAULT_CONFIG_PATH, DEFAULT_PROFILE_NAME, DEFAULT_TABLE_NAME};
use crate::profile::{Overrides, ParameterId};
use clap::{Args, Parser, Subcommand};

pub use run::{dispatch, run};

/// Version string shown by `--version`
pub const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("BUILD_GIT_HASH"),
    ", built ",
    env!("BUILD_DATETIME"),
    ")"
);

/// ECS Dynamic Environment Manager
#[derive(Debug, Parser)]
#[command(name = "eden")]
#[command(
    version = VERSION,
    about = "ECS Dynamic Environment Manager. Clone Amazon ECS environments easily.",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create environment or deploy to existent
    Create {
        #[command(flatten)]
        common: CommonArgs,
        #[command(flatten)]
        remote: RemoteArgs,
        #[command(flatten)]
        parameters: ParameterArgs,
        /// Environment name (branch name etc.)
        #[arg(long)]
        name: String,
        /// Image URI to deploy (ECR repository path, image name and tag)
        #[arg(long)]
        image_uri: String,
    },
    /// Delete environment
    Delete {
        #[command(flatten)]
        common: CommonArgs,
        #[command(flatten)]
        remote: RemoteArgs,
        #[command(flatten)]
        parameters: ParameterArgs,
        /// Environment name (branch name etc.)
        #[arg(long)]
        name: String,
    },
    /// List existing environments
    Ls {
        #[command(flatten)]
        common: CommonArgs,
        #[command(flatten)]
        remote: RemoteArgs,
    },
    /// Configure eden
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Setup profiles for other commands
    Setup {
        #[command(flatten)]
        common: CommonArgs,
        #[command(flatten)]
        parameters: ParameterArgs,
    },
    /// Check configuration file integrity
    Check {
        #[command(flatten)]
        common: CommonArgs,
        #[command(flatten)]
        parameters: ParameterArgs,
    },
    /// Push local profile to DynamoDB for use by eden API
    Push {
        #[command(flatten)]
        common: CommonArgs,
        #[command(flatten)]
        remote: RemoteArgs,
        #[command(flatten)]
        parameters: ParameterArgs,
    },
    /// Pull remote profile to local configuration
    Pull {
        #[command(flatten)]
        common: CommonArgs,
        #[command(flatten)]
        remote: RemoteArgs,
    },
    /// List remote profiles
    Ls {
        #[command(flatten)]
        common: CommonArgs,
        #[command(flatten)]
        remote: RemoteArgs,
    },
    /// Delete remote profile from DynamoDB
    #[command(name = "remote-rm")]
    RemoteRm {
        #[command(flatten)]
        common: CommonArgs,
        #[command(flatten)]
        remote: RemoteArgs,
    },
}

/// Switches shared by every command
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Profile name in eden configuration file
    #[arg(short, long, default_value = DEFAULT_PROFILE_NAME, value_parser = parse_profile_name)]
    pub profile: String,

    /// eden configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config_path: String,

    /// Debug logging with source locations
    #[arg(short, long)]
    pub verbose: bool,
}

/// Profile names double as config section names and must read back unchanged
fn parse_profile_name(name: &str) -> Result<String, String> {
    check_section_name(name)
        .map(|()| name.to_string())
        .map_err(|e| e.to_string())
}

/// Switches of commands that talk to the state table
#[derive(Debug, Clone, Args)]
pub struct RemoteArgs {
    /// Remote DynamoDB table name
    #[arg(long, default_value = DEFAULT_TABLE_NAME)]
    pub remote_table_name: String,

    /// Seconds to wait for a new table to become ACTIVE (default: EDEN_TABLE_WAIT_TIMEOUT_SECS)
    #[arg(long, value_name = "SECONDS")]
    pub table_wait_timeout: Option<u64>,
}

/// One optional flag per schema parameter
#[derive(Debug, Clone, Default, Args)]
pub struct ParameterArgs {
    #[arg(long, help = ParameterId::NamePrefix.parameter().help)]
    pub name_prefix: Option<String>,
    #[arg(long, help = ParameterId::ReferenceServiceArn.parameter().help)]
    pub reference_service_arn: Option<String>,
    #[arg(long, help = ParameterId::TargetCluster.parameter().help)]
    pub target_cluster: Option<String>,
    #[arg(long, help = ParameterId::DomainNameSuffix.parameter().help)]
    pub domain_name_suffix: Option<String>,
    #[arg(long, help = ParameterId::MasterAlbArn.parameter().help)]
    pub master_alb_arn: Option<String>,
    #[arg(long, help = ParameterId::DynamicZoneId.parameter().help)]
    pub dynamic_zone_id: Option<String>,
    #[arg(long, help = ParameterId::DynamicZoneName.parameter().help)]
    pub dynamic_zone_name: Option<String>,
    #[arg(long, help = ParameterId::ConfigBucketName.parameter().help)]
    pub config_bucket_name: Option<String>,
    #[arg(long, help = ParameterId::ConfigBucketKey.parameter().help)]
    pub config_bucket_key: Option<String>,
    #[arg(long, help = ParameterId::ConfigUpdateKey.parameter().help)]
    pub config_update_key: Option<String>,
    #[arg(long, help = ParameterId::ConfigEnvType.parameter().help)]
    pub config_env_type: Option<String>,
    #[arg(long, help = ParameterId::ConfigNamePrefix.parameter().help)]
    pub config_name_prefix: Option<String>,
}

impl ParameterArgs {
    /// Non-null flags as profile overrides
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        [
            (ParameterId::NamePrefix, &self.name_prefix),
            (ParameterId::ReferenceServiceArn, &self.reference_service_arn),
            (ParameterId::TargetCluster, &self.target_cluster),
            (ParameterId::DomainNameSuffix, &self.domain_name_suffix),
            (ParameterId::MasterAlbArn, &self.master_alb_arn),
            (ParameterId::DynamicZoneId, &self.dynamic_zone_id),
            (ParameterId::DynamicZoneName, &self.dynamic_zone_name),
            (ParameterId::ConfigBucketName, &self.config_bucket_name),
            (ParameterId::ConfigBucketKey, &self.config_bucket_key),
            (ParameterId::ConfigUpdateKey, &self.config_update_key),
            (ParameterId::ConfigEnvType, &self.config_env_type),
            (ParameterId::ConfigNamePrefix, &self.config_name_prefix),
        ]
        .into_iter()
        .map(|(parameter, value)| (parameter, value.clone()))
        .collect()
    }
}

/// Every command eden knows, decided at definition time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Create,
    Delete,
    Ls,
    ConfigSetup,
    ConfigCheck,
    ConfigPush,
    ConfigPull,
    ConfigLs,
    ConfigRemoteRm,
}

impl CommandKind {
    /// Whether the command needs the state table (and AWS credentials)
    #[must_use]
    pub fn requires_remote(self) -> bool {
        !matches!(self, Self::ConfigSetup | Self::ConfigCheck)
    }

    /// Command line spelling, for diagnostics
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Delete => "delete",
            Self::Ls => "ls",
            Self::ConfigSetup => "config setup",
            Self::ConfigCheck => "config check",
            Self::ConfigPush => "config push",
            Self::ConfigPull => "config pull",
            Self::ConfigLs => "config ls",
            Self::ConfigRemoteRm => "config remote-rm",
        }
    }
}

impl Command {
    #[must_use]
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Create { .. } => CommandKind::Create,
            Command::Delete { .. } => CommandKind::Delete,
            Command::Ls { .. } => CommandKind::Ls,
            Command::Config { command } => match command {
                ConfigCommand::Setup { .. } => CommandKind::ConfigSetup,
                ConfigCommand::Check { .. } => CommandKind::ConfigCheck,
                ConfigCommand::Push { .. } => CommandKind::ConfigPush,
                ConfigCommand::Pull { .. } => CommandKind::ConfigPull,
                ConfigCommand::Ls { .. } => CommandKind::ConfigLs,
                ConfigCommand::RemoteRm { .. } => CommandKind::ConfigRemoteRm,
            },
        }
    }

    #[must_use]
    pub fn common(&self) -> &CommonArgs {
        match self {
            Command::Create { common, .. }
            | Command::Delete { common, .. }
            | Command::Ls { common, .. } => common,
            Command::Config { command } => match command {
                ConfigCommand::Setup { common, .. }
                | ConfigCommand::Check { common, .. }
                | ConfigCommand::Push { common, .. }
                | ConfigCommand::Pull { common, .. }
                | ConfigCommand::Ls { common, .. }
                | ConfigCommand::RemoteRm { common, .. } => common,
            },
        }
    }

    /// Remote switches; `None` exactly for local-only commands
    #[must_use]
    pub fn remote(&self) -> Option<&RemoteArgs> {
        match self {
            Command::Create { remote, .. }
            | Command::Delete { remote, .. }
            | Command::Ls { remote, .. } => Some(remote),
            Command::Config { command } => match command {
                ConfigCommand::Push { remote, .. }
                | ConfigCommand::Pull { remote, .. }
                | ConfigCommand::Ls { remote, .. }
                | ConfigCommand::RemoteRm { remote, .. } => Some(remote),
                ConfigCommand::Setup { .. } | ConfigCommand::Check { .. } => None,
            },
        }
    }
}
