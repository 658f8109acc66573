//! Resource and output naming shared by the document builder and the driver.
//!
//! A document may target several regions at once, so every resource and
//! output name embeds its region to stay unique. Documents written by older
//! releases used unscoped names for their single region; passing `None` keeps
//! that layout readable.

/// Name of a terraform resource, suffixed with its region when scoped.
pub fn resource_name(base: &str, region: Option<&str>) -> String {
    match region {
        Some(region) => format!("{base}_{region}"),
        None => base.to_string(),
    }
}

/// Name of a terraform output, suffixed with its region when scoped.
pub fn output_name(base: &str, region: Option<&str>) -> String {
    match region {
        Some(region) => format!("{base}_{region}"),
        None => base.to_string(),
    }
}

/// Sanitized form of an IP address usable inside a resource name.
///
/// Security group rule additions are keyed by the operator IP; dots are not
/// valid in terraform identifiers so they are stripped.
pub fn sanitize_ip(ip: &str) -> String {
    ip.replace('.', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoped_names_embed_region() {
        assert_eq!(resource_name("node", Some("us-east-1")), "node_us-east-1");
        assert_eq!(
            output_name("instance_ids", Some("eu-west-1")),
            "instance_ids_eu-west-1"
        );
    }

    #[test]
    fn legacy_names_are_unsuffixed() {
        assert_eq!(resource_name("node", None), "node");
        assert_eq!(output_name("instance_ids", None), "instance_ids");
    }

    #[test]
    fn sanitize_strips_dots() {
        assert_eq!(sanitize_ip("192.168.1.42"), "192168142");
    }
}
