//! Integration tests for cluster and node group IAM composition.
//!
//! Covers strategy selection, the flags handed to the stack provider, the
//! registry policy rule for created roles, and the compose, apply, collect,
//! recompose cycle.

use clusterform_arn::Partition;
use clusterform_iam::{
    managed_policy_arn, AddonPolicies, ClusterIam, ClusterResourceSet, IamError, IamStrategy,
    NodeGroupIam, NodeGroupResourceSet, RoleArnSource, CLUSTER_SERVICE_ROLE_ARN,
    ECR_POWER_USER_POLICY, ECR_READ_ONLY_POLICY, EKS_CNI_POLICY, EKS_WORKER_NODE_POLICY,
    NODE_GROUP_INSTANCE_ROLE_ARN, NODE_INSTANCE_PROFILE, NODE_INSTANCE_ROLE, SERVICE_ROLE,
};
use clusterform_template::{StackOutputs, Value};
use proptest::prelude::*;
use rstest::rstest;

const ROLE_ARN: &str = "arn:aws:iam::123456789012:role/foo";
const PROFILE_ARN: &str = "arn:aws:iam::123456789012:instance-profile/bar";
const POWER_USER: &str = "arn:aws:iam::aws:policy/AmazonEC2ContainerRegistryPowerUser";
const READ_ONLY: &str = "arn:aws:iam::aws:policy/AmazonEC2ContainerRegistryReadOnly";

fn compose_node_group(spec: &NodeGroupIam) -> Result<NodeGroupResourceSet, IamError> {
    let mut ng = NodeGroupResourceSet::new("ng1", Partition::Aws, spec);
    ng.add_resources_for_iam()?;
    Ok(ng)
}

fn resource_names(ng: &NodeGroupResourceSet) -> Vec<String> {
    ng.template().resource_names().map(String::from).collect()
}

#[test]
fn test_empty_node_group_spec_uses_defaults() {
    let ng = compose_node_group(&NodeGroupIam::default()).unwrap();
    let outcome = ng.outcome().unwrap();

    assert_eq!(outcome.strategy, IamStrategy::CreateRole);
    assert!(ng.with_iam());
    assert!(ng.with_named_iam());
    assert_eq!(
        outcome.attach_policy_arns,
        vec![
            "arn:aws:iam::aws:policy/AmazonEKSWorkerNodePolicy",
            "arn:aws:iam::aws:policy/AmazonEKS_CNI_Policy",
            READ_ONLY,
        ]
    );
    assert_eq!(
        resource_names(&ng),
        vec![NODE_INSTANCE_PROFILE, NODE_INSTANCE_ROLE]
    );
    assert_eq!(
        outcome.role_arn,
        RoleArnSource::Synthesized {
            output: NODE_GROUP_INSTANCE_ROLE_ARN.to_string()
        }
    );
}

#[test]
fn test_supplied_role_is_wrapped_in_new_profile() {
    let spec = NodeGroupIam {
        instance_role_arn: ROLE_ARN.to_string(),
        ..Default::default()
    };
    let ng = compose_node_group(&spec).unwrap();

    assert_eq!(ng.outcome().unwrap().strategy, IamStrategy::ReuseRole);
    assert!(ng.with_iam());
    assert!(!ng.with_named_iam());
    assert_eq!(resource_names(&ng), vec![NODE_INSTANCE_PROFILE]);

    let profile = ng.template().resource(NODE_INSTANCE_PROFILE).unwrap();
    assert_eq!(profile.properties["Roles"], serde_json::json!(["foo"]));

    let known = ng.template().known_outputs();
    assert_eq!(
        known.get(NODE_GROUP_INSTANCE_ROLE_ARN).map(String::as_str),
        Some(ROLE_ARN)
    );

    let (_, collectors) = ng.into_parts();
    assert!(collectors.is_empty());
}

#[test]
fn test_supplied_profile_registers_nothing() {
    let spec = NodeGroupIam {
        instance_profile_arn: PROFILE_ARN.to_string(),
        ..Default::default()
    };
    let ng = compose_node_group(&spec).unwrap();

    assert_eq!(ng.outcome().unwrap().strategy, IamStrategy::ReuseProfile);
    assert!(!ng.with_iam());
    assert!(!ng.with_named_iam());
    assert!(ng.template().is_empty());
    assert_eq!(ng.instance_profile(), Some(&Value::literal(PROFILE_ARN)));
    assert!(ng.outcome().unwrap().flags.capabilities().is_empty());
}

#[test]
fn test_foreign_partition_registry_policy_replaced() {
    let spec = NodeGroupIam {
        attach_policy_arns: vec![POWER_USER.to_string(), READ_ONLY.to_string()],
        with_addon_policies: AddonPolicies {
            image_builder: Some(true),
            ..Default::default()
        },
        ..Default::default()
    };
    let mut ng = NodeGroupResourceSet::new("ng1", Partition::AwsUsGov, &spec);
    let outcome = ng.add_resources_for_iam().unwrap();

    assert_eq!(
        outcome.attach_policy_arns,
        vec!["arn:aws-us-gov:iam::aws:policy/AmazonEC2ContainerRegistryPowerUser"]
    );
}

#[rstest]
#[case::profile_and_role(PROFILE_ARN, ROLE_ARN, "", &[], AddonPolicies::default())]
#[case::profile_and_role_name(PROFILE_ARN, "", "nodes", &[], AddonPolicies::default())]
#[case::all_three(PROFILE_ARN, ROLE_ARN, "nodes", &[], AddonPolicies::default())]
#[case::profile_and_policies(PROFILE_ARN, "", "", &[READ_ONLY], AddonPolicies::default())]
#[case::profile_and_addons(
    PROFILE_ARN,
    "",
    "",
    &[],
    AddonPolicies { image_builder: Some(true), ..Default::default() }
)]
fn test_conflicting_identity_rejected(
    #[case] profile: &str,
    #[case] role: &str,
    #[case] role_name: &str,
    #[case] policies: &[&str],
    #[case] addons: AddonPolicies,
) {
    let spec = NodeGroupIam {
        instance_profile_arn: profile.to_string(),
        instance_role_arn: role.to_string(),
        instance_role_name: role_name.to_string(),
        attach_policy_arns: policies.iter().map(|p| p.to_string()).collect(),
        with_addon_policies: addons,
    };
    let mut ng = NodeGroupResourceSet::new("ng1", Partition::Aws, &spec);
    let err = ng.add_resources_for_iam().unwrap_err();

    assert!(matches!(err, IamError::ConflictingIdentity(_)));
    assert!(ng.outcome().is_none());
    assert!(ng.template().is_empty());
    assert!(!ng.with_iam());
}

#[rstest]
#[case::autoscaler(AddonPolicies { auto_scaler: Some(true), ..Default::default() }, &["PolicyAutoScaling"])]
#[case::external_dns(AddonPolicies { external_dns: Some(true), ..Default::default() }, &["PolicyExternalDNS"])]
#[case::both(
    AddonPolicies { auto_scaler: Some(true), external_dns: Some(true), image_builder: Some(false) },
    &["PolicyAutoScaling", "PolicyExternalDNS"]
)]
#[case::explicit_false(AddonPolicies { auto_scaler: Some(false), ..Default::default() }, &[])]
fn test_addon_policies(#[case] addons: AddonPolicies, #[case] expected: &[&str]) {
    let spec = NodeGroupIam {
        with_addon_policies: addons,
        ..Default::default()
    };
    let ng = compose_node_group(&spec).unwrap();

    let policies: Vec<&str> = ng
        .template()
        .resources_of_type("AWS::IAM::Policy")
        .map(|(name, _)| name)
        .collect();
    assert_eq!(policies, expected);

    for (_, policy) in ng.template().resources_of_type("AWS::IAM::Policy") {
        assert_eq!(
            policy.properties["Roles"],
            serde_json::json!([{"Ref": NODE_INSTANCE_ROLE}])
        );
    }
}

#[test]
fn test_external_dns_scoped_to_hosted_zones() {
    let spec = NodeGroupIam {
        with_addon_policies: AddonPolicies {
            external_dns: Some(true),
            ..Default::default()
        },
        ..Default::default()
    };
    let mut ng = NodeGroupResourceSet::new("ng1", Partition::AwsUsGov, &spec);
    ng.add_resources_for_iam().unwrap();

    let policy = ng.template().resource("PolicyExternalDNS").unwrap();
    assert_eq!(
        policy.properties["PolicyDocument"]["Statement"][0]["Resource"],
        serde_json::json!("arn:aws-us-gov:route53:::hostedzone/*")
    );
}

#[test]
fn test_explicit_role_name_is_not_provider_named() {
    let spec = NodeGroupIam {
        instance_role_name: "eks-nodes".to_string(),
        ..Default::default()
    };
    let ng = compose_node_group(&spec).unwrap();

    assert!(ng.with_iam());
    assert!(!ng.with_named_iam());
    let role = ng.template().resource(NODE_INSTANCE_ROLE).unwrap();
    assert_eq!(role.properties["RoleName"], serde_json::json!("eks-nodes"));
    assert_eq!(role.properties["Path"], serde_json::json!("/"));
}

#[test]
fn test_recompose_after_write_back_reuses_role() {
    let mut spec = NodeGroupIam::default();

    let ng = compose_node_group(&spec).unwrap();
    ng.outcome().unwrap().apply_to(&mut spec);
    let (_, collectors) = ng.into_parts();

    let outputs: StackOutputs = [(
        NODE_GROUP_INSTANCE_ROLE_ARN.to_string(),
        ROLE_ARN.to_string(),
    )]
    .into_iter()
    .collect();
    assert_eq!(collectors.collect(&mut spec, &outputs).unwrap(), 1);
    assert_eq!(spec.instance_role_arn, ROLE_ARN);
    assert_eq!(spec.attach_policy_arns.len(), 3);

    let second = compose_node_group(&spec).unwrap();
    assert_eq!(second.outcome().unwrap().strategy, IamStrategy::ReuseRole);
    assert!(!second.template().has_resource(NODE_INSTANCE_ROLE));
}

#[test]
fn test_missing_output_skips_write_back() {
    let mut spec = NodeGroupIam::default();
    let (_, collectors) = compose_node_group(&spec).unwrap().into_parts();

    let err = collectors
        .collect(&mut spec, &StackOutputs::new())
        .unwrap_err();
    assert!(err.to_string().contains(NODE_GROUP_INSTANCE_ROLE_ARN));
    assert!(spec.instance_role_arn.is_empty());
}

#[test]
fn test_cluster_creates_service_role() {
    let mut cluster = ClusterResourceSet::new("demo", Partition::Aws, &ClusterIam::default());
    cluster.add_resources_for_iam().unwrap();

    assert!(cluster.with_iam());
    assert!(!cluster.with_named_iam());

    let policies: Vec<&str> = cluster
        .template()
        .resources_of_type("AWS::IAM::Policy")
        .map(|(name, _)| name)
        .collect();
    assert_eq!(policies, vec!["PolicyCloudWatchMetrics", "PolicyNLB"]);

    let role = cluster.template().resource(SERVICE_ROLE).unwrap();
    assert_eq!(
        role.properties["ManagedPolicyArns"].as_array().map(Vec::len),
        Some(2)
    );
    assert!(cluster.template().output(CLUSTER_SERVICE_ROLE_ARN).is_some());
    assert_eq!(
        cluster.service_role_arn(),
        Some(&Value::get_att(SERVICE_ROLE, "Arn"))
    );
}

#[test]
fn test_cluster_reuses_service_role() {
    let spec = ClusterIam {
        service_role_arn: ROLE_ARN.to_string(),
    };
    let mut cluster = ClusterResourceSet::new("demo", Partition::Aws, &spec);
    cluster.add_resources_for_iam().unwrap();

    assert!(!cluster.with_iam());
    assert!(!cluster.with_named_iam());
    assert!(cluster.template().is_empty());
    assert_eq!(cluster.service_role_arn(), Some(&Value::literal(ROLE_ARN)));
}

#[test]
fn test_cluster_rejects_non_role_arn() {
    let spec = ClusterIam {
        service_role_arn: PROFILE_ARN.to_string(),
    };
    let mut cluster = ClusterResourceSet::new("demo", Partition::Aws, &spec);
    let err = cluster.add_resources_for_iam().unwrap_err();

    assert!(err.is_config_error());
    assert_eq!(cluster.iam(), None);
}

fn arb_toggle() -> impl Strategy<Value = Option<bool>> {
    prop_oneof![Just(None), Just(Some(false)), Just(Some(true))]
}

fn arb_addons() -> impl Strategy<Value = AddonPolicies> {
    (arb_toggle(), arb_toggle(), arb_toggle()).prop_map(|(auto_scaler, external_dns, image_builder)| {
        AddonPolicies {
            auto_scaler,
            external_dns,
            image_builder,
        }
    })
}

fn arb_partition() -> impl Strategy<Value = Partition> {
    prop_oneof![
        Just(Partition::Aws),
        Just(Partition::AwsCn),
        Just(Partition::AwsUsGov),
    ]
}

fn arb_policies() -> impl Strategy<Value = Vec<String>> {
    let mut arns = vec!["arn:aws:iam::123456789012:policy/custom".to_string()];
    for partition in [Partition::Aws, Partition::AwsCn, Partition::AwsUsGov] {
        for name in [
            EKS_WORKER_NODE_POLICY,
            EKS_CNI_POLICY,
            ECR_POWER_USER_POLICY,
            ECR_READ_ONLY_POLICY,
        ] {
            arns.push(managed_policy_arn(partition, name));
        }
    }
    proptest::sample::subsequence(arns, 0..=6)
}

fn arb_node_group_iam() -> impl Strategy<Value = NodeGroupIam> {
    (
        prop::option::of(Just(PROFILE_ARN.to_string())),
        prop::option::of(Just(ROLE_ARN.to_string())),
        prop::option::of("[a-z][a-z0-9-]{0,20}"),
        arb_policies(),
        arb_addons(),
    )
        .prop_map(|(profile, role, role_name, attach_policy_arns, with_addon_policies)| {
            NodeGroupIam {
                instance_profile_arn: profile.unwrap_or_default(),
                instance_role_arn: role.unwrap_or_default(),
                instance_role_name: role_name.unwrap_or_default(),
                attach_policy_arns,
                with_addon_policies,
            }
        })
}

/// Count AWS-managed policies with the given name, whatever their partition.
fn count_managed(arns: &[String], name: &str) -> usize {
    let suffix = format!(":iam::aws:policy/{}", name);
    arns.iter().filter(|arn| arn.ends_with(&suffix)).count()
}

proptest! {
    #[test]
    fn prop_exactly_one_strategy(partition in arb_partition(), spec in arb_node_group_iam()) {
        let conflicting = !spec.instance_profile_arn.is_empty()
            && (!spec.instance_role_arn.is_empty()
                || !spec.instance_role_name.is_empty()
                || !spec.attach_policy_arns.is_empty()
                || spec.with_addon_policies.any_enabled());

        let mut ng = NodeGroupResourceSet::new("ng1", partition, &spec);
        let result = ng.add_resources_for_iam().map(|o| o.strategy);
        if conflicting {
            prop_assert!(matches!(result, Err(IamError::ConflictingIdentity(_))));
            prop_assert!(ng.template().is_empty());
            prop_assert!(!ng.with_iam());
            return Ok(());
        }

        let strategy = result.unwrap();
        let names = resource_names(&ng);
        match strategy {
            IamStrategy::ReuseProfile => prop_assert!(names.is_empty()),
            IamStrategy::ReuseRole => {
                prop_assert_eq!(names, vec![NODE_INSTANCE_PROFILE.to_string()]);
            }
            IamStrategy::CreateRole => {
                prop_assert!(spec.instance_profile_arn.is_empty());
                prop_assert!(spec.instance_role_arn.is_empty());
                prop_assert!(names.contains(&NODE_INSTANCE_ROLE.to_string()));
                prop_assert!(names.contains(&NODE_INSTANCE_PROFILE.to_string()));
            }
        }
    }

    #[test]
    fn prop_named_iam_iff_created_without_name(
        partition in arb_partition(),
        spec in arb_node_group_iam(),
    ) {
        let mut ng = NodeGroupResourceSet::new("ng1", partition, &spec);
        if ng.add_resources_for_iam().is_err() {
            return Ok(());
        }

        let expected = ng.with_iam() && spec.instance_role_name.is_empty()
            && spec.instance_role_arn.is_empty();
        prop_assert_eq!(ng.with_named_iam(), expected);
        if ng.with_named_iam() {
            prop_assert!(ng.with_iam());
        }
    }

    #[test]
    fn prop_exactly_one_registry_policy(
        partition in arb_partition(),
        spec in arb_node_group_iam(),
    ) {
        let mut ng = NodeGroupResourceSet::new("ng1", partition, &spec);
        let Ok(outcome) = ng.add_resources_for_iam() else {
            return Ok(());
        };
        if outcome.strategy != IamStrategy::CreateRole {
            prop_assert!(outcome.attach_policy_arns.is_empty());
            return Ok(());
        }

        let arns = &outcome.attach_policy_arns;
        let power_user = count_managed(arns, ECR_POWER_USER_POLICY);
        let read_only = count_managed(arns, ECR_READ_ONLY_POLICY);
        prop_assert_eq!(power_user + read_only, 1);

        let expected = if spec.with_addon_policies.image_builder_enabled() {
            ECR_POWER_USER_POLICY
        } else {
            ECR_READ_ONLY_POLICY
        };
        prop_assert!(arns.contains(&managed_policy_arn(partition, expected)));
    }
}
