//! Version identifiers and their release-channel classification.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Release channel a version belongs to. Only used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Channel {
    Release,
    Snapshot,
    LegacyBeta,
    LegacyAlpha,
}

impl Channel {
    #[cfg(test)]
    pub const ALL: [Channel; 4] = [
        Channel::Release,
        Channel::Snapshot,
        Channel::LegacyBeta,
        Channel::LegacyAlpha,
    ];

    /// Classify by substring heuristics, for backends without a stability flag.
    pub fn guess(version: &str) -> Channel {
        let lower = version.to_lowercase();
        let unstable = ["pre", "rc", "snapshot", "beta", "alpha"];
        if unstable.iter().any(|marker| lower.contains(marker)) {
            Channel::Snapshot
        } else {
            Channel::Release
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Release => write!(f, "release"),
            Channel::Snapshot => write!(f, "snapshot"),
            Channel::LegacyBeta => write!(f, "beta"),
            Channel::LegacyAlpha => write!(f, "alpha"),
        }
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "release" => Ok(Channel::Release),
            "snapshot" | "pre-release" | "prerelease" => Ok(Channel::Snapshot),
            "beta" | "old_beta" | "legacy-beta" => Ok(Channel::LegacyBeta),
            "alpha" | "old_alpha" | "legacy-alpha" => Ok(Channel::LegacyAlpha),
            other => Err(format!(
                "unknown channel '{}' (expected release, snapshot, beta or alpha)",
                other
            )),
        }
    }
}

/// Set of channels a caller wants to see.
pub type ChannelFilter = HashSet<Channel>;

/// An installable version as published upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionId {
    pub id: String,
    pub channel: Channel,
}

impl VersionId {
    pub fn new(id: impl Into<String>, channel: Channel) -> Self {
        VersionId {
            id: id.into(),
            channel,
        }
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Compare dotted version strings segment by segment, numerically where both
/// segments are numbers. "1.9" < "1.20" < "1.20.1".
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let split = |s: &str| -> Vec<String> {
        s.split(|c: char| c == '.' || c == '-' || c == '_')
            .map(str::to_string)
            .collect()
    };
    let (left, right) = (split(a), split(b));

    for (l, r) in left.iter().zip(right.iter()) {
        let ord = match (l.parse::<u64>(), r.parse::<u64>()) {
            (Ok(l), Ok(r)) => l.cmp(&r),
            (Ok(_), Err(_)) => Ordering::Greater,
            (Err(_), Ok(_)) => Ordering::Less,
            (Err(_), Err(_)) => l.cmp(r),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    left.len().cmp(&right.len())
}

/// Sort newest first.
pub fn sort_newest_first(versions: &mut [String]) {
    versions.sort_by(|a, b| compare_versions(b, a));
}
