//! Illustrative call trees for `a*T(n/b) + f(n)`.
//!
//! The tree is a picture, not a cost computation: it stops at a fixed depth
//! whatever the real depth of the recursion is.

use super::recurrence::Recurrence;
use super::solver::{render_growth, EPSILON};
use serde::Serialize;

pub const DEFAULT_DEPTH: u32 = 5;

/// Upper bound on the number of nodes in a built tree.
pub const MAX_NODES: u64 = 4096;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub label: String,
    pub level: u32,
    pub cost: String,
    /// Work of every node on this node's level.
    pub total_cost: String,
    pub children: Vec<TreeNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeLevel {
    pub level: u32,
    pub nodes: Vec<String>,
    pub cost: String,
    pub total_cost: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecursionTree {
    pub root: TreeNode,
    pub max_level: u32,
    pub total_cost: String,
    pub description: String,
    pub levels: Vec<TreeLevel>,
}

impl RecursionTree {
    /// Complete `a`-ary tree of depth at most `depth_cap`. `None` unless
    /// `a >= 1` and `b >= 2`.
    #[tracing::instrument(level = "debug", skip(cost))]
    pub fn build(a: u32, b: u32, cost: &str, depth_cap: u32) -> Option<RecursionTree> {
        if a == 0 || b < 2 {
            return None;
        }
        let depth = bounded_depth(a, depth_cap);
        let shape = Shape { a, b, cost, depth };
        let root = shape.node(0);
        let levels = (0..=depth).map(|level| shape.level(level)).collect();
        let total_cost = total_cost(a, b, cost);

        tracing::debug!(depth, %total_cost, "built recursion tree");
        Some(RecursionTree {
            description: format!(
                "Recursion tree for T(n) = {}T(n/{}) + {}. Height: {} levels.",
                coefficient(a),
                b,
                cost,
                depth
            ),
            root,
            max_level: depth,
            total_cost,
            levels,
        })
    }

    /// Divide-and-conquer recurrences only.
    pub fn from_recurrence(recurrence: &Recurrence, depth_cap: u32) -> Option<RecursionTree> {
        let (a, b) = recurrence.divide_and_conquer()?;
        Self::build(a, b, &recurrence.local_cost.render_factors(), depth_cap)
    }

    pub fn node_count(&self) -> usize {
        self.levels.iter().map(|level| level.nodes.len()).sum()
    }
}

struct Shape<'a> {
    a: u32,
    b: u32,
    cost: &'a str,
    depth: u32,
}

impl Shape<'_> {
    fn label(&self, level: u32) -> String {
        match level {
            0 => "T(n)".to_string(),
            _ => format!("T(n/{})", u64::from(self.b).saturating_pow(level)),
        }
    }

    fn level_cost(&self, level: u32) -> String {
        if level == self.depth {
            return format!("{} * 1", nodes_at(self.a, level));
        }
        format!("{} * {}", nodes_at(self.a, level), self.cost)
    }

    fn node_cost(&self, level: u32) -> String {
        if level == self.depth {
            "1".to_string()
        } else {
            self.cost.to_string()
        }
    }

    fn node(&self, level: u32) -> TreeNode {
        let children = if level < self.depth {
            (0..self.a).map(|_| self.node(level + 1)).collect()
        } else {
            Vec::new()
        };
        TreeNode {
            label: self.label(level),
            level,
            cost: self.node_cost(level),
            total_cost: self.level_cost(level),
            children,
        }
    }

    fn level(&self, level: u32) -> TreeLevel {
        let label = self.label(level);
        TreeLevel {
            level,
            nodes: (0..nodes_at(self.a, level)).map(|_| label.clone()).collect(),
            cost: self.node_cost(level),
            total_cost: self.level_cost(level),
        }
    }
}

fn nodes_at(a: u32, level: u32) -> u64 {
    u64::from(a).saturating_pow(level)
}

/// Largest depth up to `cap` whose tree stays within [`MAX_NODES`].
fn bounded_depth(a: u32, cap: u32) -> u32 {
    let mut depth = cap;
    while depth > 0 && (0..=depth).map(|j| nodes_at(a, j)).sum::<u64>() > MAX_NODES {
        depth -= 1;
    }
    depth
}

fn coefficient(a: u32) -> String {
    if a == 1 {
        String::new()
    } else {
        a.to_string()
    }
}

fn total_cost(a: u32, b: u32, cost: &str) -> String {
    if a == b && cost == "n" {
        return "Θ(n log n)".to_string();
    }
    if a < b {
        return "Θ(n)".to_string();
    }
    let exponent = f64::from(a).ln() / f64::from(b).ln();
    if (exponent - exponent.round()).abs() < EPSILON {
        format!("Θ({})", render_growth(exponent.round(), 0))
    } else {
        format!("Θ({})", render_growth(exponent, 0))
    }
}
