//! Static table of the jobs this binary knows how to run.

use super::url_source::UrlSource;

/// Immutable description of one job type.
#[derive(Debug, Clone, Copy)]
pub struct JobDefinition {
    pub name: &'static str,
    /// Destination prefix in the bucket.
    pub prefix: &'static str,
    pub description: &'static str,
    pub url_source: UrlSource,
    /// Download concurrency; `None` uses the configured default.
    pub max_concurrent: Option<usize>,
}

const ECB_URLS: &[&str] = &[
    "https://www.ecb.europa.eu/stats/eurofxref/eurofxref-daily.xml",
    "https://www.ecb.europa.eu/stats/eurofxref/eurofxref.zip",
    "https://www.ecb.europa.eu/stats/eurofxref/eurofxref-hist-90d.xml",
];

pub const REGISTRY: &[JobDefinition] = &[
    JobDefinition {
        name: "ecb",
        prefix: "ecb",
        description: "ECB euro foreign exchange reference rates",
        url_source: UrlSource::Static(ECB_URLS),
        max_concurrent: None,
    },
    JobDefinition {
        name: "geonames",
        prefix: "geonames",
        description: "Geonames geographical database dumps",
        url_source: UrlSource::SideFile {
            file_name: "geonames-urls.txt",
            needs_license_key: false,
        },
        max_concurrent: Some(6),
    },
    JobDefinition {
        name: "maxmind",
        prefix: "maxmind",
        description: "MaxMind GeoLite2 databases",
        url_source: UrlSource::SideFile {
            file_name: "maxmind-urls.txt",
            needs_license_key: true,
        },
        max_concurrent: None,
    },
    JobDefinition {
        name: "ofcom",
        prefix: "codelist",
        description: "Ofcom UK telephone numbering codelists",
        url_source: UrlSource::SideFile {
            file_name: "ofcom-urls.txt",
            needs_license_key: false,
        },
        max_concurrent: None,
    },
];

/// Find a job definition by its exact name.
pub fn lookup(name: &str) -> Option<&'static JobDefinition> {
    REGISTRY.iter().find(|d| d.name == name)
}

/// Registered job names, in registry order.
pub fn names() -> impl Iterator<Item = &'static str> {
    REGISTRY.iter().map(|d| d.name)
}
