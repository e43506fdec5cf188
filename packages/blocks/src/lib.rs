//! # Storefront Blocks
//!
//! Block tree model for the storefront visual builder.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ raw JSON (server payload, pasted props)      │
//! └─────────────────────────────────────────────┘
//!                     ↓  normalize
//! ┌─────────────────────────────────────────────┐
//! │ blocks: BlockNode forest                    │
//! │  - unique ids, typed catalogue, default     │
//! │    props, children always present           │
//! │  - pure path-addressed tree algorithms      │
//! │  - outline, style allow-list, analysis      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: sessions, history, drag/drop        │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Every tree operation takes a forest by reference and returns a new one.
//! Operations that cannot resolve their paths return the input unchanged.
//!
//! ## Usage
//!
//! ```rust
//! use storefront_blocks::{normalize_tree, tree, DropPosition, IdGenerator};
//!
//! let mut ids = IdGenerator::new("docs");
//! let raw = serde_json::json!([
//!     { "id": "a", "type": "row" },
//!     { "id": "b", "type": "text", "props": { "text": "Hello" } },
//! ]);
//!
//! let forest = normalize_tree(&raw, &mut ids);
//! let moved = tree::extract_and_reinsert(&forest, &[1], &[0], DropPosition::Inside);
//!
//! assert_eq!(moved.len(), 1);
//! assert_eq!(moved[0].children[0].id, "b");
//! ```

mod analysis;
mod error;
mod id_generator;
mod node;
mod normalize;
mod outline;
mod responsive;
mod style;
pub mod tree;

pub use analysis::{analyze_performance, LoadLevel, PerformanceReport};
pub use error::BlockError;
pub use id_generator::{session_seed, IdGenerator};
pub use node::{create_node, is_truthy, props_from, BlockNode, BlockType, Props, Zone};
pub use normalize::{normalize_nodes, normalize_tree, parse_tree};
pub use outline::{filter_outline, flatten, OutlineItem};
pub use responsive::{resolve_responsive_props, set_responsive_prop, Device};
pub use style::{apply_style_payload, extract_style_payload, is_style_key, STYLE_PROP_KEYS};
pub use tree::DropPosition;
