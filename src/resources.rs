// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource kinds served by the connector
//!
//! Each kind owns the routing tags under which inbound subjects reach its
//! handler: the singular tag and its plural alias (`network` / `networks`).
//! The list is declarative; the routing table is built from whichever kinds
//! a deployment registers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Infrastructure resource kinds with a dedicated handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Subnet inside a virtual network
    Network,
    /// NAT gateway
    Nat,
    /// Security group / firewall rule set
    Firewall,
    /// Virtual private network
    Vpc,
    /// Compute instance
    Instance,
    /// Elastic load balancer
    Elb,
    /// Object storage bucket
    S3,
    /// DNS zone
    Route53,
    /// Relational database cluster
    RdsCluster,
    /// Relational database instance
    RdsInstance,
    /// Block storage volume
    EbsVolume,
}

impl ResourceKind {
    /// Every kind, in registration order
    pub const ALL: [ResourceKind; 11] = [
        ResourceKind::Network,
        ResourceKind::Nat,
        ResourceKind::Firewall,
        ResourceKind::Vpc,
        ResourceKind::Instance,
        ResourceKind::Elb,
        ResourceKind::S3,
        ResourceKind::Route53,
        ResourceKind::RdsCluster,
        ResourceKind::RdsInstance,
        ResourceKind::EbsVolume,
    ];

    /// Singular routing tag
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Nat => "nat",
            Self::Firewall => "firewall",
            Self::Vpc => "vpc",
            Self::Instance => "instance",
            Self::Elb => "elb",
            Self::S3 => "s3",
            Self::Route53 => "route53",
            Self::RdsCluster => "rds_cluster",
            Self::RdsInstance => "rds_instance",
            Self::EbsVolume => "ebs_volume",
        }
    }

    /// Plural routing tag
    pub fn plural(&self) -> &'static str {
        match self {
            Self::Network => "networks",
            Self::Nat => "nats",
            Self::Firewall => "firewalls",
            Self::Vpc => "vpcs",
            Self::Instance => "instances",
            Self::Elb => "elbs",
            Self::S3 => "s3s",
            Self::Route53 => "route53s",
            Self::RdsCluster => "rds_clusters",
            Self::RdsInstance => "rds_instances",
            Self::EbsVolume => "ebs_volumes",
        }
    }

    /// All routing tags for this kind
    pub fn tags(&self) -> [&'static str; 2] {
        [self.as_str(), self.plural()]
    }

    /// Resolve a routing tag (singular or plural). Exact, case-sensitive.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == tag || kind.plural() == tag)
    }

    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Network => "Network",
            Self::Nat => "NAT Gateway",
            Self::Firewall => "Firewall",
            Self::Vpc => "Virtual Private Cloud",
            Self::Instance => "Compute Instance",
            Self::Elb => "Load Balancer",
            Self::S3 => "Object Storage",
            Self::Route53 => "DNS Zone",
            Self::RdsCluster => "Database Cluster",
            Self::RdsInstance => "Database Instance",
            Self::EbsVolume => "Block Volume",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_tags_resolve_to_kind() {
        for kind in ResourceKind::ALL {
            for tag in kind.tags() {
                assert_eq!(ResourceKind::from_tag(tag), Some(kind), "tag {tag}");
            }
        }
    }

    #[test]
    fn test_tags_are_unique() {
        let tags: HashSet<&str> = ResourceKind::ALL.iter().flat_map(|k| k.tags()).collect();
        assert_eq!(tags.len(), ResourceKind::ALL.len() * 2);
    }

    #[test]
    fn test_from_tag_is_exact() {
        assert_eq!(ResourceKind::from_tag("Network"), None);
        assert_eq!(ResourceKind::from_tag("net"), None);
        assert_eq!(ResourceKind::from_tag("rds"), None);
        assert_eq!(ResourceKind::from_tag("ebs_volumes"), Some(ResourceKind::EbsVolume));
    }

    #[test]
    fn test_serde_uses_singular_tag() {
        let json = serde_json::to_string(&ResourceKind::RdsCluster).unwrap();
        assert_eq!(json, "\"rds_cluster\"");
    }
}
