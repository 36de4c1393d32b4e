//! Regions polled when no explicit list is given.

/// Commercial-partition CloudWatch Logs regions.
pub const SUPPORTED_REGIONS: &[&str] = &[
    "af-south-1",
    "ap-east-1",
    "ap-northeast-1",
    "ap-northeast-2",
    "ap-northeast-3",
    "ap-south-1",
    "ap-south-2",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-southeast-3",
    "ap-southeast-4",
    "ca-central-1",
    "ca-west-1",
    "eu-central-1",
    "eu-central-2",
    "eu-north-1",
    "eu-south-1",
    "eu-south-2",
    "eu-west-1",
    "eu-west-2",
    "eu-west-3",
    "il-central-1",
    "me-central-1",
    "me-south-1",
    "sa-east-1",
    "us-east-1",
    "us-east-2",
    "us-west-1",
    "us-west-2",
];

/// The explicit list if non-empty, otherwise every supported region.
pub fn resolve_regions(explicit: Vec<String>) -> Vec<String> {
    if explicit.is_empty() {
        SUPPORTED_REGIONS.iter().map(|r| r.to_string()).collect()
    } else {
        explicit
    }
}
