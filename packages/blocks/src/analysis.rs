//! Render-cost estimate for a block forest

use crate::{BlockNode, BlockType};
use serde::{Deserialize, Serialize};

const ANIMATION_KEYS: [&str; 3] = ["animation", "transition", "motion"];

const HIGH_SCORE: usize = 30;
const MEDIUM_SCORE: usize = 16;

const NODE_WARNING: usize = 40;
const DEPTH_WARNING: usize = 5;
const IMAGE_WARNING: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    pub count: usize,
    pub max_depth: usize,
    pub image_count: usize,
    pub animated_count: usize,
    pub score: usize,
    pub level: LoadLevel,
}

impl PerformanceReport {
    /// Human-readable hints for trees that are large, deep or image-heavy
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.count > NODE_WARNING {
            warnings.push(format!(
                "High node count ({}) may reduce editor and page performance.",
                self.count
            ));
        }
        if self.max_depth > DEPTH_WARNING {
            warnings.push(format!(
                "Tree depth is high ({}); flatten layout where possible.",
                self.max_depth
            ));
        }
        if self.image_count > IMAGE_WARNING {
            warnings.push(format!(
                "Many image blocks ({}); optimize sizes for LCP.",
                self.image_count
            ));
        }
        warnings
    }
}

#[derive(Default)]
struct Metrics {
    count: usize,
    max_depth: usize,
    image_count: usize,
    animated_count: usize,
}

fn walk(nodes: &[BlockNode], depth: usize, metrics: &mut Metrics) {
    for node in nodes {
        metrics.count += 1;
        metrics.max_depth = metrics.max_depth.max(depth);
        if node.kind == BlockType::Image {
            metrics.image_count += 1;
        }
        if ANIMATION_KEYS.iter().any(|key| node.flag(key)) {
            metrics.animated_count += 1;
        }
        walk(&node.children, depth + 1, metrics);
    }
}

pub fn analyze_performance(tree: &[BlockNode]) -> PerformanceReport {
    let mut metrics = Metrics::default();
    walk(tree, 1, &mut metrics);

    let score = metrics.count
        + metrics.image_count * 2
        + metrics.animated_count * 2
        + metrics.max_depth.saturating_sub(3) * 2;

    let level = if score >= HIGH_SCORE {
        LoadLevel::High
    } else if score >= MEDIUM_SCORE {
        LoadLevel::Medium
    } else {
        LoadLevel::Low
    };

    PerformanceReport {
        count: metrics.count,
        max_depth: metrics.max_depth,
        image_count: metrics.image_count,
        animated_count: metrics.animated_count,
        score,
        level,
    }
}
