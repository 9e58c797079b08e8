//! Region grouping for control flow graph nodes.
//!
//! Regions are an optional layer over the CFG that records nested scopes:
//! loop bodies, exception handler extents, any grouping a structuring pass
//! wants to hang off the graph. The graph itself acts as the implicit root
//! of the region tree; every region without a parent hangs directly off it.

use crate::graph::NodeId;
use crate::{Error, Result};
use std::fmt;

/// A strongly-typed identifier for a region within one control flow graph.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegionId(pub(crate) usize);

impl RegionId {
    /// Creates a new `RegionId` from a raw index value.
    #[must_use]
    #[inline]
    pub const fn new(index: usize) -> Self {
        RegionId(index)
    }

    /// Returns the raw index value of this region identifier.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RegionId({})", self.0)
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// One region: its place in the region tree and its member nodes.
#[derive(Debug, Clone, Default)]
struct Region {
    parent: Option<RegionId>,
    children: Vec<RegionId>,
    nodes: Vec<NodeId>,
}

/// The region tree of one control flow graph.
///
/// Tracks, per graph node, which region (if any) owns it. A node belongs to
/// at most one region at a time; regions nest through parent links. All
/// structural rules are enforced at mutation time and surface as
/// [`Error::RegionError`].
#[derive(Debug, Clone, Default)]
pub(crate) struct RegionTree {
    regions: Vec<Region>,
    /// Per graph node, the owning region. Indexed by `NodeId::index`.
    membership: Vec<Option<RegionId>>,
}

impl RegionTree {
    pub(crate) fn new(node_count: usize) -> Self {
        RegionTree {
            regions: Vec::new(),
            membership: vec![None; node_count],
        }
    }

    /// Creates a new empty region. With `parent` set, the region is nested
    /// inside an existing region; otherwise it hangs off the graph root.
    pub(crate) fn add_region(&mut self, parent: Option<RegionId>) -> Result<RegionId> {
        if let Some(parent) = parent {
            if parent.index() >= self.regions.len() {
                return Err(Error::RegionError(format!(
                    "parent region {parent} does not exist"
                )));
            }
        }
        let id = RegionId::new(self.regions.len());
        self.regions.push(Region {
            parent,
            ..Region::default()
        });
        if let Some(parent) = parent {
            self.regions[parent.index()].children.push(id);
        }
        Ok(id)
    }

    /// Adds `node` to `region`.
    pub(crate) fn add_node(&mut self, region: RegionId, node: NodeId) -> Result<()> {
        if region.index() >= self.regions.len() {
            return Err(Error::RegionError(format!("region {region} does not exist")));
        }
        if node.index() >= self.membership.len() {
            return Err(Error::RegionError(format!(
                "node {node} does not belong to the owning graph"
            )));
        }
        match self.membership[node.index()] {
            Some(owner) if owner == region => Ok(()),
            Some(owner) => Err(Error::RegionError(format!(
                "node {node} already belongs to region {owner}"
            ))),
            None => {
                self.membership[node.index()] = Some(region);
                self.regions[region.index()].nodes.push(node);
                Ok(())
            }
        }
    }

    /// New graph nodes extend the membership table with unowned slots.
    pub(crate) fn grow(&mut self, node_count: usize) {
        if node_count > self.membership.len() {
            self.membership.resize(node_count, None);
        }
    }

    pub(crate) fn region_of(&self, node: NodeId) -> Option<RegionId> {
        self.membership.get(node.index()).copied().flatten()
    }

    pub(crate) fn parent(&self, region: RegionId) -> Option<RegionId> {
        self.regions.get(region.index())?.parent
    }

    pub(crate) fn children(&self, region: RegionId) -> &[RegionId] {
        self.regions
            .get(region.index())
            .map(|r| r.children.as_slice())
            .unwrap_or(&[])
    }

    pub(crate) fn nodes(&self, region: RegionId) -> &[NodeId] {
        self.regions
            .get(region.index())
            .map(|r| r.nodes.as_slice())
            .unwrap_or(&[])
    }

    pub(crate) fn region_count(&self) -> usize {
        self.regions.len()
    }
}
