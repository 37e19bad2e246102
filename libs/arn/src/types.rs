//! ARN definitions for the IAM resources clusterform works with.
//!
//! The generic [`Arn`] accepts any service; the typed wrappers below only
//! accept IAM ARNs of their own resource type.

use crate::{define_iam_arn, ArnError};

/// Service segment shared by every IAM ARN.
pub const IAM_SERVICE: &str = "iam";

/// Account segment used by AWS-managed policies.
pub const AWS_MANAGED_ACCOUNT: &str = "aws";

// =============================================================================
// Partition
// =============================================================================

/// AWS partition an ARN belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Partition {
    /// Commercial regions.
    #[default]
    Aws,
    /// China regions.
    AwsCn,
    /// GovCloud (US) regions.
    AwsUsGov,
}

impl Partition {
    /// Returns the partition segment as written in an ARN.
    pub fn as_str(self) -> &'static str {
        match self {
            Partition::Aws => "aws",
            Partition::AwsCn => "aws-cn",
            Partition::AwsUsGov => "aws-us-gov",
        }
    }

    /// Returns the partition serving the given region.
    pub fn for_region(region: &str) -> Self {
        if region.starts_with("cn-") {
            Partition::AwsCn
        } else if region.starts_with("us-gov-") {
            Partition::AwsUsGov
        } else {
            Partition::Aws
        }
    }
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Partition {
    type Err = ArnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aws" => Ok(Partition::Aws),
            "aws-cn" => Ok(Partition::AwsCn),
            "aws-us-gov" => Ok(Partition::AwsUsGov),
            other => Err(ArnError::InvalidPartition(other.to_string())),
        }
    }
}

// =============================================================================
// Generic ARN
// =============================================================================

/// A syntactically valid ARN of any service.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Arn {
    partition: Partition,
    service: String,
    region: String,
    account: String,
    resource: String,
}

impl Arn {
    /// Parses `arn:{partition}:{service}:{region}:{account}:{resource}`.
    ///
    /// The resource portion may itself contain `:` characters.
    pub fn parse(s: &str) -> Result<Self, ArnError> {
        if s.is_empty() {
            return Err(ArnError::Empty);
        }

        let Some(rest) = s.strip_prefix("arn:") else {
            return Err(ArnError::MissingPrefix(s.to_string()));
        };

        let parts: Vec<&str> = rest.splitn(5, ':').collect();
        let &[partition, service, region, account, resource] = parts.as_slice() else {
            return Err(ArnError::InvalidFormat {
                message: format!("expected 6 ':'-separated segments in '{}'", s),
            });
        };

        if service.is_empty() {
            return Err(ArnError::InvalidFormat {
                message: "service segment is empty".to_string(),
            });
        }

        if resource.is_empty() {
            return Err(ArnError::InvalidFormat {
                message: "resource segment is empty".to_string(),
            });
        }

        Ok(Self {
            partition: partition.parse()?,
            service: service.to_string(),
            region: region.to_string(),
            account: account.to_string(),
            resource: resource.to_string(),
        })
    }

    pub fn partition(&self) -> Partition {
        self.partition
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }
}

impl std::fmt::Display for Arn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "arn:{}:{}:{}:{}:{}",
            self.partition, self.service, self.region, self.account, self.resource
        )
    }
}

impl std::str::FromStr for Arn {
    type Err = ArnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Checks an IAM account segment: twelve digits, or `aws` for managed policies.
#[doc(hidden)]
pub fn validate_account(account: &str) -> Result<(), ArnError> {
    let is_account_id = account.len() == 12 && account.bytes().all(|b| b.is_ascii_digit());
    if is_account_id || account == AWS_MANAGED_ACCOUNT {
        Ok(())
    } else {
        Err(ArnError::InvalidAccount(account.to_string()))
    }
}

// =============================================================================
// IAM resources
// =============================================================================

define_iam_arn!(RoleArn, "role");
define_iam_arn!(InstanceProfileArn, "instance-profile");
define_iam_arn!(PolicyArn, "policy");

impl PolicyArn {
    /// Builds the ARN of an AWS-managed policy in the given partition.
    pub fn aws_managed(partition: Partition, name: &str) -> Result<Self, ArnError> {
        Self::parse(&format!(
            "arn:{}:{}::{}:policy/{}",
            partition, IAM_SERVICE, AWS_MANAGED_ACCOUNT, name
        ))
    }

    /// Returns true if the policy is owned by AWS rather than a customer account.
    pub fn is_aws_managed(&self) -> bool {
        self.account() == AWS_MANAGED_ACCOUNT
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_arn_roundtrip() {
        let s = "arn:aws:iam::123456789012:role/eks/nodes";
        let arn: RoleArn = s.parse().unwrap();
        assert_eq!(arn.to_string(), s);
        assert_eq!(arn.resource_name(), "nodes");
        assert_eq!(arn.account(), "123456789012");
        assert_eq!(arn.partition(), Partition::Aws);
    }

    #[test]
    fn test_profile_arn_rejected_as_role() {
        let result: Result<RoleArn, _> =
            "arn:aws:iam::123456789012:instance-profile/nodes".parse();
        assert!(matches!(
            result.unwrap_err(),
            ArnError::WrongResourceType {
                expected: "role",
                ..
            }
        ));
    }

    #[test]
    fn test_wrong_service() {
        let result = RoleArn::parse("arn:aws:s3:::bucket/role/x");
        let err = result.unwrap_err();
        assert!(err.is_kind_mismatch());
        assert!(matches!(err, ArnError::WrongService { .. }));
    }

    #[test]
    fn test_empty() {
        assert!(RoleArn::parse("").unwrap_err().is_empty());
    }

    #[test]
    fn test_missing_prefix() {
        assert!(matches!(
            InstanceProfileArn::parse("iam::123456789012:instance-profile/x"),
            Err(ArnError::MissingPrefix(_))
        ));
    }

    #[test]
    fn test_invalid_account() {
        assert!(matches!(
            RoleArn::parse("arn:aws:iam::1234:role/x"),
            Err(ArnError::InvalidAccount(_))
        ));
    }

    #[test]
    fn test_missing_resource_name() {
        assert!(matches!(
            RoleArn::parse("arn:aws:iam::123456789012:role/"),
            Err(ArnError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_regional_iam_arn_rejected() {
        assert!(matches!(
            RoleArn::parse("arn:aws:iam:us-west-2:123456789012:role/x"),
            Err(ArnError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_generic_arn_keeps_colons_in_resource() {
        let arn = Arn::parse("arn:aws:logs:us-east-1:123456789012:log-group:/eks/x:*").unwrap();
        assert_eq!(arn.service(), "logs");
        assert_eq!(arn.resource(), "log-group:/eks/x:*");
    }

    #[test]
    fn test_generic_arn_allows_empty_account() {
        let arn = Arn::parse("arn:aws:route53:::hostedzone/*").unwrap();
        assert_eq!(arn.account(), "");
        assert_eq!(arn.resource(), "hostedzone/*");
    }

    #[test]
    fn test_aws_managed_policy() {
        let arn = PolicyArn::aws_managed(Partition::AwsCn, "AmazonEKS_CNI_Policy").unwrap();
        assert_eq!(
            arn.to_string(),
            "arn:aws-cn:iam::aws:policy/AmazonEKS_CNI_Policy"
        );
        assert!(arn.is_aws_managed());
    }

    #[test]
    fn test_partition_for_region() {
        assert_eq!(Partition::for_region("us-west-2"), Partition::Aws);
        assert_eq!(Partition::for_region("cn-north-1"), Partition::AwsCn);
        assert_eq!(Partition::for_region("us-gov-west-1"), Partition::AwsUsGov);
    }

    #[test]
    fn test_unknown_partition() {
        assert!(matches!(
            Arn::parse("arn:azure:iam::123456789012:role/x"),
            Err(ArnError::InvalidPartition(_))
        ));
    }

    #[test]
    fn test_serde_roundtrip() {
        let arn = InstanceProfileArn::parse("arn:aws:iam::123456789012:instance-profile/p").unwrap();
        let json = serde_json::to_string(&arn).unwrap();
        assert_eq!(json, "\"arn:aws:iam::123456789012:instance-profile/p\"");
        let back: InstanceProfileArn = serde_json::from_str(&json).unwrap();
        assert_eq!(arn, back);
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn role_arn_display_parses_back(
                account in "[0-9]{12}",
                path in "(/[a-z][a-z0-9-]{0,8}){0,2}",
                name in "[A-Za-z][A-Za-z0-9+=,.@_-]{0,30}",
            ) {
                let s = format!("arn:aws:iam::{account}:role{path}/{name}");
                let arn = RoleArn::parse(&s).unwrap();
                prop_assert_eq!(arn.to_string(), s);
                prop_assert_eq!(arn.resource_name(), name.as_str());
            }
        }
    }
}
