use serde::{Deserialize, Serialize};
use std::fmt;

const DEFAULT_SOURCE_BASE: &str = "https://raw.githubusercontent.com/qdm12/files/master";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockCategory {
    Malicious,
    Ads,
    Surveillance,
}

impl BlockCategory {
    pub const ALL: [BlockCategory; 3] = [
        BlockCategory::Malicious,
        BlockCategory::Ads,
        BlockCategory::Surveillance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockCategory::Malicious => "malicious",
            BlockCategory::Ads => "ads",
            BlockCategory::Surveillance => "surveillance",
        }
    }

    pub fn default_source(&self, kind: ListKind) -> String {
        format!(
            "{}/{}-{}.updated",
            DEFAULT_SOURCE_BASE,
            self.as_str(),
            kind.as_str()
        )
    }
}

impl fmt::Display for BlockCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which of the two lists published per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    Hostnames,
    Ips,
}

impl ListKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListKind::Hostnames => "hostnames",
            ListKind::Ips => "ips",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
