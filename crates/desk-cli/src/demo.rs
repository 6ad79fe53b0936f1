//! Demo collection and a deterministic scoring oracle

use async_trait::async_trait;
use desk_batch::{OracleError, ScoringOracle};
use desk_collection::{Asset, AssetCollection, CollectionError, MediaKind, VersionGroup};
use desk_model::{Finding, ItemId, ReviewData, Severity};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

const KINDS: [MediaKind; 4] = [
    MediaKind::Image,
    MediaKind::Video,
    MediaKind::Audio,
    MediaKind::Copy,
];

/// Scores items from the SHA-256 of their id, so reruns are reproducible
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct DemoOracle {
    fail_every: Option<u64>,
}

impl DemoOracle {
    pub(crate) fn new(fail_every: Option<u64>) -> Self {
        Self {
            fail_every: fail_every.filter(|n| *n > 0),
        }
    }

    fn digest(id: &ItemId) -> [u8; 32] {
        Sha256::digest(id.as_str().as_bytes()).into()
    }

    fn fails(&self, digest: &[u8; 32]) -> bool {
        let mut bucket = [0_u8; 8];
        bucket.copy_from_slice(&digest[..8]);
        self.fail_every
            .is_some_and(|n| u64::from_be_bytes(bucket) % n == 0)
    }

    pub(crate) fn review_for(id: &ItemId) -> ReviewData {
        let digest = Self::digest(id);
        let score = digest[8] % 101;
        let mut findings = vec![Finding::new(
            Severity::Info,
            format!("fingerprint {}", hex::encode(&digest[..4])),
        )];
        if score < 40 {
            findings.push(Finding::new(Severity::Blocker, "contrast below threshold"));
        } else if score < 70 {
            findings.push(Finding::new(Severity::Warning, "logo overlaps safe area"));
        }
        ReviewData::new(score, findings)
    }
}

#[async_trait]
impl ScoringOracle for DemoOracle {
    async fn score(&self, id: &ItemId) -> Result<ReviewData, OracleError> {
        let digest = Self::digest(id);
        if self.fails(&digest) {
            return Err(OracleError::Unavailable(format!(
                "backend timed out ({})",
                hex::encode(&digest[..4])
            )));
        }
        Ok(Self::review_for(id))
    }
}

/// Seed `items` assets. Every fifth lands in a version group, every fourth
/// already carries check results.
pub(crate) fn seed_collection(items: usize) -> Result<AssetCollection, CollectionError> {
    let mut standalone = Vec::new();
    let mut groups: BTreeMap<usize, VersionGroup> = BTreeMap::new();

    for i in 1..=items {
        let id = ItemId::new(format!("asset-{i:03}"));
        let mut asset = Asset::new(id.clone(), format!("Creative {i:03}"), KINDS[i % KINDS.len()]);
        if i % 4 == 0 {
            asset = asset.with_review(DemoOracle::review_for(&id));
        }

        if i % 5 == 0 {
            let campaign = (i - 1) / 10;
            let group = groups
                .remove(&campaign)
                .unwrap_or_else(|| VersionGroup::new(format!("campaign-{campaign}")));
            groups.insert(campaign, group.with_version(asset));
        } else {
            standalone.push(asset);
        }
    }

    AssetCollection::from_parts(standalone, groups.into_values())
}
