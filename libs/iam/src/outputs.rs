//! Names of the stack outputs published by IAM composition.

/// ARN of the role node group instances run as.
pub const NODE_GROUP_INSTANCE_ROLE_ARN: &str = "NodeGroupInstanceRoleARN";

/// ARN of the control-plane service role.
pub const CLUSTER_SERVICE_ROLE_ARN: &str = "ClusterServiceRoleARN";
