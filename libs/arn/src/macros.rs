//! Macros for defining typed IAM ARN types.

/// Macro to define a typed IAM ARN for one resource type.
///
/// This generates a newtype wrapper around [`Arn`](crate::Arn) with:
/// - A `RESOURCE_TYPE` constant (the prefix of the resource portion)
/// - `parse()` enforcing the `iam` service, an empty region, a valid
///   account and the resource type prefix
/// - `resource_name()` returning the last path segment
/// - `Display`, `FromStr`, `Serialize` and `Deserialize` implementations
///
/// # Example
///
/// ```ignore
/// define_iam_arn!(RoleArn, "role");
///
/// let arn: RoleArn = "arn:aws:iam::123456789012:role/nodes".parse()?;
/// assert_eq!(arn.resource_name(), "nodes");
/// ```
#[macro_export]
macro_rules! define_iam_arn {
    ($name:ident, $resource_type:literal) => {
        /// A validated IAM ARN for this resource type.
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name($crate::Arn);

        impl $name {
            /// The resource type prefix for this ARN type.
            pub const RESOURCE_TYPE: &'static str = $resource_type;

            /// Parses an ARN from a string.
            pub fn parse(s: &str) -> Result<Self, $crate::ArnError> {
                let arn = $crate::Arn::parse(s)?;

                if arn.service() != $crate::IAM_SERVICE {
                    return Err($crate::ArnError::WrongService {
                        expected: $crate::IAM_SERVICE,
                        actual: arn.service().to_string(),
                    });
                }

                if !arn.region().is_empty() {
                    return Err($crate::ArnError::InvalidFormat {
                        message: format!("IAM ARNs are global, got region '{}'", arn.region()),
                    });
                }

                $crate::validate_account(arn.account())?;

                let Some((kind, rest)) = arn.resource().split_once('/') else {
                    return Err($crate::ArnError::WrongResourceType {
                        expected: Self::RESOURCE_TYPE,
                        actual: arn.resource().to_string(),
                    });
                };

                if kind != Self::RESOURCE_TYPE {
                    return Err($crate::ArnError::WrongResourceType {
                        expected: Self::RESOURCE_TYPE,
                        actual: kind.to_string(),
                    });
                }

                if rest.rsplit('/').next().map_or(true, str::is_empty) {
                    return Err($crate::ArnError::InvalidFormat {
                        message: format!("missing {} name", Self::RESOURCE_TYPE),
                    });
                }

                Ok(Self(arn))
            }

            /// Returns the underlying generic ARN.
            #[must_use]
            pub fn arn(&self) -> &$crate::Arn {
                &self.0
            }

            /// Returns the partition this ARN lives in.
            #[must_use]
            pub fn partition(&self) -> $crate::Partition {
                self.0.partition()
            }

            /// Returns the owning account (`aws` for AWS-managed resources).
            #[must_use]
            pub fn account(&self) -> &str {
                self.0.account()
            }

            /// Returns the final path segment of the resource, i.e. its name.
            #[must_use]
            pub fn resource_name(&self) -> &str {
                self.0.resource().rsplit('/').next().unwrap_or_default()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::ArnError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.collect_str(self)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Self::parse(&s).map_err(serde::de::Error::custom)
            }
        }

        impl AsRef<$crate::Arn> for $name {
            fn as_ref(&self) -> &$crate::Arn {
                &self.0
            }
        }
    };
}
