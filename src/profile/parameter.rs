//! # Parameter Schema
//!
//! The fixed, ordered catalog of deployment parameters every profile is made of.
//!
//! Each parameter carries:
//! - the key used in the local configuration file and the remote profile blob
//! - the command-line flag that overrides it
//! - the environment variable name under which the resolved value is handed to
//!   the environment lifecycle capability
//! - a validation predicate
//!
//! Validation never fails loudly: callers count failures (see [`crate::config::LocalConfig::check`]).

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Identifier of a schema parameter
///
/// The enumeration is closed: a profile can only ever hold values for these keys.
/// Declaration order is the catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterId {
    NamePrefix,
    ReferenceServiceArn,
    TargetCluster,
    DomainNameSuffix,
    MasterAlbArn,
    DynamicZoneId,
    DynamicZoneName,
    ConfigBucketName,
    ConfigBucketKey,
    ConfigUpdateKey,
    ConfigEnvType,
    ConfigNamePrefix,
}

impl ParameterId {
    /// Every parameter, in catalog order
    pub const ALL: [ParameterId; 12] = [
        ParameterId::NamePrefix,
        ParameterId::ReferenceServiceArn,
        ParameterId::TargetCluster,
        ParameterId::DomainNameSuffix,
        ParameterId::MasterAlbArn,
        ParameterId::DynamicZoneId,
        ParameterId::DynamicZoneName,
        ParameterId::ConfigBucketName,
        ParameterId::ConfigBucketKey,
        ParameterId::ConfigUpdateKey,
        ParameterId::ConfigEnvType,
        ParameterId::ConfigNamePrefix,
    ];

    /// Schema entry for this parameter
    #[must_use]
    pub fn parameter(self) -> &'static Parameter {
        &PARAMETERS[self as usize]
    }

    /// Key used in configuration files and remote profile blobs
    #[must_use]
    pub fn name(self) -> &'static str {
        self.parameter().name
    }

    /// Look up a parameter by its configuration key
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.name() == name)
    }
}

impl fmt::Display for ParameterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One schema entry. Pure data plus a validation predicate.
pub struct Parameter {
    pub id: ParameterId,
    /// Configuration key (`name_prefix`)
    pub name: &'static str,
    /// Command-line flag (`--name-prefix`)
    pub flag: &'static str,
    /// Variable name handed to the lifecycle capability (`NAME_PREFIX`)
    pub envvar_name: &'static str,
    pub help: &'static str,
    validator: fn(&str) -> bool,
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("name", &self.name)
            .field("flag", &self.flag)
            .field("envvar_name", &self.envvar_name)
            .finish_non_exhaustive()
    }
}

impl Parameter {
    /// Returns true when `value` is acceptable for this parameter
    #[must_use]
    pub fn validate(&self, value: &str) -> bool {
        (self.validator)(value)
    }
}

/// The parameter catalog, indexed by `ParameterId as usize`
pub static PARAMETERS: [Parameter; 12] = [
    Parameter {
        id: ParameterId::NamePrefix,
        name: "name_prefix",
        flag: "--name-prefix",
        envvar_name: "NAME_PREFIX",
        help: "Prefix for cloned service and target group names",
        validator: is_name_prefix,
    },
    Parameter {
        id: ParameterId::ReferenceServiceArn,
        name: "reference_service_arn",
        flag: "--reference-service-arn",
        envvar_name: "REFERENCE_SERVICE_ARN",
        help: "ARN of the ECS service to clone",
        validator: is_ecs_service_arn,
    },
    Parameter {
        id: ParameterId::TargetCluster,
        name: "target_cluster",
        flag: "--target-cluster",
        envvar_name: "TARGET_CLUSTER",
        help: "ECS cluster name to deploy cloned services into",
        validator: is_token,
    },
    Parameter {
        id: ParameterId::DomainNameSuffix,
        name: "domain_name_suffix",
        flag: "--domain-name-suffix",
        envvar_name: "DOMAIN_NAME_SUFFIX",
        help: "Domain name suffix for environment endpoints (dev.example.com)",
        validator: is_domain_name,
    },
    Parameter {
        id: ParameterId::MasterAlbArn,
        name: "master_alb_arn",
        flag: "--master-alb-arn",
        envvar_name: "MASTER_ALB_ARN",
        help: "ARN of the load balancer environments are attached to",
        validator: is_load_balancer_arn,
    },
    Parameter {
        id: ParameterId::DynamicZoneId,
        name: "dynamic_zone_id",
        flag: "--dynamic-zone-id",
        envvar_name: "DYNAMIC_ZONE_ID",
        help: "Route 53 hosted zone ID for environment records",
        validator: is_hosted_zone_id,
    },
    Parameter {
        id: ParameterId::DynamicZoneName,
        name: "dynamic_zone_name",
        flag: "--dynamic-zone-name",
        envvar_name: "DYNAMIC_ZONE_NAME",
        help: "Route 53 hosted zone name, fully qualified (dev.example.com.)",
        validator: is_zone_name,
    },
    Parameter {
        id: ParameterId::ConfigBucketName,
        name: "config_bucket_name",
        flag: "--config-bucket-name",
        envvar_name: "CONFIG_BUCKET_NAME",
        help: "S3 bucket holding the endpoint configuration file",
        validator: is_bucket_name,
    },
    Parameter {
        id: ParameterId::ConfigBucketKey,
        name: "config_bucket_key",
        flag: "--config-bucket-key",
        envvar_name: "CONFIG_BUCKET_KEY",
        help: "S3 object key of the endpoint configuration file",
        validator: is_non_empty,
    },
    Parameter {
        id: ParameterId::ConfigUpdateKey,
        name: "config_update_key",
        flag: "--config-update-key",
        envvar_name: "CONFIG_UPDATE_KEY",
        help: "Key to update inside the endpoint configuration file",
        validator: is_token,
    },
    Parameter {
        id: ParameterId::ConfigEnvType,
        name: "config_env_type",
        flag: "--config-env-type",
        envvar_name: "CONFIG_ENV_TYPE",
        help: "Environment type recorded in the endpoint configuration file",
        validator: is_token,
    },
    Parameter {
        id: ParameterId::ConfigNamePrefix,
        name: "config_name_prefix",
        flag: "--config-name-prefix",
        envvar_name: "CONFIG_NAME_PREFIX",
        help: "Prefix for environment names in the endpoint configuration file",
        validator: is_token,
    },
];

static NAME_PREFIX_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9-]*$")
        .expect("Failed to compile NAME_PREFIX_PATTERN - this should never happen")
});

static ECS_SERVICE_ARN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^arn:aws[a-z-]*:ecs:[a-z0-9-]+:\d{12}:service/[A-Za-z0-9_/-]+$")
        .expect("Failed to compile ECS_SERVICE_ARN_PATTERN - this should never happen")
});

static LOAD_BALANCER_ARN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^arn:aws[a-z-]*:elasticloadbalancing:[a-z0-9-]+:\d{12}:loadbalancer/[A-Za-z0-9_/-]+$",
    )
    .expect("Failed to compile LOAD_BALANCER_ARN_PATTERN - this should never happen")
});

static DOMAIN_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)*[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?$")
        .expect("Failed to compile DOMAIN_NAME_PATTERN - this should never happen")
});

static HOSTED_ZONE_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Z[A-Z0-9]{1,31}$")
        .expect("Failed to compile HOSTED_ZONE_ID_PATTERN - this should never happen")
});

// S3 bucket naming rules: 3-63 chars, lowercase letters, digits, dots and hyphens
static BUCKET_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9][a-z0-9.-]{1,61}[a-z0-9]$")
        .expect("Failed to compile BUCKET_NAME_PATTERN - this should never happen")
});

fn is_non_empty(value: &str) -> bool {
    !value.trim().is_empty()
}

fn is_token(value: &str) -> bool {
    !value.is_empty() && !value.chars().any(char::is_whitespace)
}

fn is_name_prefix(value: &str) -> bool {
    NAME_PREFIX_PATTERN.is_match(value)
}

fn is_ecs_service_arn(value: &str) -> bool {
    ECS_SERVICE_ARN_PATTERN.is_match(value)
}

fn is_load_balancer_arn(value: &str) -> bool {
    LOAD_BALANCER_ARN_PATTERN.is_match(value)
}

fn is_domain_name(value: &str) -> bool {
    value.len() <= 253 && DOMAIN_NAME_PATTERN.is_match(value)
}

fn is_zone_name(value: &str) -> bool {
    value
        .strip_suffix('.')
        .is_some_and(|name| !name.is_empty() && is_domain_name(name))
}

fn is_hosted_zone_id(value: &str) -> bool {
    HOSTED_ZONE_ID_PATTERN.is_match(value)
}

fn is_bucket_name(value: &str) -> bool {
    BUCKET_NAME_PATTERN.is_match(value) && !value.contains("..")
}
