//! Result type produced by a successful provisioning run.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-region instance IDs and public IPs produced after a successful apply.
///
/// Sequences are ordered by creation index; for a region with elastic IPs
/// enabled, `public_ips[region][i]` belongs to `instance_ids[region][i]`.
/// Regions absent from `public_ips` did not request elastic IPs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvisioningResult {
    /// Created instance IDs, per region, in creation order.
    pub instance_ids: HashMap<String, Vec<String>>,

    /// Elastic IPs, per region, index-correlated with `instance_ids`.
    pub public_ips: HashMap<String, Vec<String>>,
}

impl ProvisioningResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pairs of (instance ID, public IP) for a region, correlated by index.
    ///
    /// Returns `None` when the region has no elastic IPs or the sequences
    /// disagree in length.
    pub fn correlated(&self, region: &str) -> Option<Vec<(&str, &str)>> {
        let ids = self.instance_ids.get(region)?;
        let ips = self.public_ips.get(region)?;
        if ids.len() != ips.len() {
            return None;
        }
        Some(
            ids.iter()
                .zip(ips.iter())
                .map(|(id, ip)| (id.as_str(), ip.as_str()))
                .collect(),
        )
    }

    /// Regions present in the result, sorted for stable display.
    pub fn regions(&self) -> Vec<&str> {
        let mut regions: Vec<&str> = self.instance_ids.keys().map(String::as_str).collect();
        regions.sort_unstable();
        regions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correlates_ids_and_ips_by_index() {
        let mut result = ProvisioningResult::new();
        result.instance_ids.insert(
            "us-east-1".to_string(),
            vec!["i-0".to_string(), "i-1".to_string(), "i-2".to_string()],
        );
        result.public_ips.insert(
            "us-east-1".to_string(),
            vec![
                "1.2.3.4".to_string(),
                "5.6.7.8".to_string(),
                "9.9.9.9".to_string(),
            ],
        );

        let pairs = result.correlated("us-east-1").unwrap();
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[1], ("i-1", "5.6.7.8"));
    }

    #[test]
    fn missing_ips_yield_no_correlation() {
        let mut result = ProvisioningResult::new();
        result
            .instance_ids
            .insert("us-east-1".to_string(), vec!["i-0".to_string()]);
        assert!(result.correlated("us-east-1").is_none());
    }
}
