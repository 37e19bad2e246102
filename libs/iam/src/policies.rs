//! Well-known managed policies, service principals and inline policy grants.

use clusterform_arn::{Partition, AWS_MANAGED_ACCOUNT, IAM_SERVICE};

pub const EKS_SERVICE_POLICY: &str = "AmazonEKSServicePolicy";
pub const EKS_CLUSTER_POLICY: &str = "AmazonEKSClusterPolicy";

pub const EKS_WORKER_NODE_POLICY: &str = "AmazonEKSWorkerNodePolicy";
pub const EKS_CNI_POLICY: &str = "AmazonEKS_CNI_Policy";
pub const ECR_POWER_USER_POLICY: &str = "AmazonEC2ContainerRegistryPowerUser";
pub const ECR_READ_ONLY_POLICY: &str = "AmazonEC2ContainerRegistryReadOnly";

/// Policies attached to the control-plane service role.
pub const CLUSTER_SERVICE_POLICIES: [&str; 2] = [EKS_SERVICE_POLICY, EKS_CLUSTER_POLICY];

/// Policies attached to a created node role when none are configured.
pub const DEFAULT_NODE_POLICIES: [&str; 2] = [EKS_WORKER_NODE_POLICY, EKS_CNI_POLICY];

pub const EKS_SERVICE_PRINCIPAL: &str = "eks.amazonaws.com";
pub const EC2_SERVICE_PRINCIPAL: &str = "ec2.amazonaws.com";

/// Load balancer management for the control plane.
pub const NLB_ACTIONS: [&str; 3] = [
    "elasticloadbalancing:*",
    "ec2:CreateSecurityGroup",
    "ec2:Describe*",
];

/// Control-plane metric publishing.
pub const CLOUDWATCH_METRICS_ACTIONS: [&str; 1] = ["cloudwatch:PutMetricData"];

/// Cluster autoscaler add-on.
pub const AUTOSCALER_ACTIONS: [&str; 6] = [
    "autoscaling:DescribeAutoScalingGroups",
    "autoscaling:DescribeAutoScalingInstances",
    "autoscaling:DescribeLaunchConfigurations",
    "autoscaling:DescribeTags",
    "autoscaling:SetDesiredCapacity",
    "autoscaling:TerminateInstanceInAutoScalingGroup",
];

/// External DNS add-on.
pub const EXTERNAL_DNS_ACTIONS: [&str; 3] = [
    "route53:ChangeResourceRecordSets",
    "route53:ListHostedZones",
    "route53:ListResourceRecordSets",
];

/// ARN of an AWS-managed policy in the given partition.
pub fn managed_policy_arn(partition: Partition, name: &str) -> String {
    format!(
        "arn:{}:{}::{}:policy/{}",
        partition, IAM_SERVICE, AWS_MANAGED_ACCOUNT, name
    )
}

/// Resource pattern covering every Route 53 hosted zone.
pub fn hosted_zone_pattern(partition: Partition) -> String {
    format!("arn:{}:route53:::hostedzone/*", partition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clusterform_arn::PolicyArn;

    #[test]
    fn test_managed_policy_arns_parse() {
        for partition in [Partition::Aws, Partition::AwsCn, Partition::AwsUsGov] {
            for name in CLUSTER_SERVICE_POLICIES
                .iter()
                .chain(DEFAULT_NODE_POLICIES.iter())
                .chain([ECR_POWER_USER_POLICY, ECR_READ_ONLY_POLICY].iter())
            {
                let arn = managed_policy_arn(partition, name);
                let parsed = PolicyArn::parse(&arn).unwrap();
                assert_eq!(parsed, PolicyArn::aws_managed(partition, name).unwrap());
                assert!(parsed.is_aws_managed());
            }
        }
    }

    #[test]
    fn test_hosted_zone_pattern() {
        assert_eq!(
            hosted_zone_pattern(Partition::Aws),
            "arn:aws:route53:::hostedzone/*"
        );
    }
}
