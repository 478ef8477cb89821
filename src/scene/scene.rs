use std::sync::atomic::{AtomicU32, Ordering};

use glam::Vec3;
use slotmap::SlotMap;

use crate::errors::{AnimError, Result};
use crate::scene::NodeHandle;
use crate::scene::node::Node;
use crate::scene::settings::SceneSettings;

static NEXT_SCENE_ID: AtomicU32 = AtomicU32::new(1);

/// Arena owning every node of one or more node trees.
///
/// Nodes are addressed by generational [`NodeHandle`]s, so a handle to a
/// destroyed node never aliases a newer one. All edits go through the scene
/// so that cache invalidation reaches every affected descendant.
///
/// Mutation requires `&mut Scene`; evaluation through an
/// [`EvalContext`](crate::EvalContext) only needs `&Scene`, so several
/// threads can evaluate the same scene at once, each with its own context.
#[derive(Debug)]
pub struct Scene {
    id: u32,
    pub(crate) nodes: SlotMap<NodeHandle, Node>,
    settings: SceneSettings,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(SceneSettings::default())
    }

    #[must_use]
    pub fn with_settings(settings: SceneSettings) -> Self {
        Self {
            id: NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed),
            nodes: SlotMap::with_key(),
            settings,
        }
    }

    /// Process-unique id of this scene; evaluation contexts bind to it.
    #[inline]
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ========================================================================
    // Node creation & removal
    // ========================================================================

    /// Creates a detached node with one empty animation.
    pub fn create_node(&mut self) -> NodeHandle {
        let node = Node::with_policies(self.settings.interpolator, self.settings.extrapolator);
        self.nodes.insert(node)
    }

    pub fn create_node_with_name(&mut self, name: &str) -> NodeHandle {
        let handle = self.create_node();
        if let Some(node) = self.nodes.get_mut(handle) {
            node.name = Some(name.to_owned());
        }
        handle
    }

    /// Destroys `handle` and its whole subtree, detaching it from its parent.
    pub fn destroy_node(&mut self, handle: NodeHandle) -> Result<()> {
        let parent = self.node(handle)?.parent;
        if let Some(parent) = parent
            && let Some(p) = self.nodes.get_mut(parent)
        {
            p.children.retain(|&c| c != handle);
        }

        let doomed = self.subtree(handle);
        log::debug!("Destroying {} node(s) under {handle:?}", doomed.len());
        for h in doomed {
            self.nodes.remove(h);
        }
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.nodes.contains_key(handle)
    }

    #[inline]
    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeHandle, &Node)> {
        self.nodes.iter()
    }

    /// Nodes without a parent.
    pub fn root_nodes(&self) -> impl Iterator<Item = NodeHandle> + '_ {
        self.nodes.iter().filter(|(_, n)| n.parent.is_none()).map(|(h, _)| h)
    }

    pub(crate) fn node(&self, handle: NodeHandle) -> Result<&Node> {
        self.nodes.get(handle).ok_or(AnimError::NodeNotFound(handle))
    }

    pub(crate) fn node_mut(&mut self, handle: NodeHandle) -> Result<&mut Node> {
        self.nodes.get_mut(handle).ok_or(AnimError::NodeNotFound(handle))
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    /// Makes `child` a child of `parent`, detaching it from any previous
    /// parent. Rejects links that would create a cycle.
    pub fn link(&mut self, parent: NodeHandle, child: NodeHandle) -> Result<()> {
        self.node(parent)?;
        let old_parent = self.node(child)?.parent;

        if old_parent == Some(parent) {
            return Ok(());
        }
        if self.is_ancestor_or_self(child, parent) {
            log::warn!("Cannot link {child:?} under {parent:?}: would create a cycle");
            return Err(AnimError::CycleDetected { parent, child });
        }

        if let Some(old) = old_parent
            && let Some(p) = self.nodes.get_mut(old)
        {
            p.children.retain(|&c| c != child);
        }
        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);

        log::debug!("Linked {child:?} under {parent:?}");
        self.invalidate(child);
        Ok(())
    }

    /// Detaches `child` from `parent`, making it a root.
    pub fn unlink(&mut self, parent: NodeHandle, child: NodeHandle) -> Result<()> {
        self.node(parent)?;
        if self.node(child)?.parent != Some(parent) {
            log::warn!("Cannot unlink {child:?}: not a child of {parent:?}");
            return Err(AnimError::NotAChild { parent, child });
        }

        self.node_mut(parent)?.children.retain(|&c| c != child);
        self.node_mut(child)?.parent = None;

        log::debug!("Unlinked {child:?} from {parent:?}");
        self.invalidate(child);
        Ok(())
    }

    #[must_use]
    pub fn parent(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.nodes.get(handle).and_then(|n| n.parent)
    }

    #[must_use]
    pub fn children(&self, handle: NodeHandle) -> &[NodeHandle] {
        self.nodes.get(handle).map_or(&[], |n| n.children.as_slice())
    }

    /// `handle` and all its descendants, parents before children.
    #[must_use]
    pub fn subtree(&self, handle: NodeHandle) -> Vec<NodeHandle> {
        let mut out = Vec::new();
        let mut stack = vec![handle];
        while let Some(h) = stack.pop() {
            let Some(node) = self.nodes.get(h) else {
                continue;
            };
            out.push(h);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// True if `ancestor` is `node` or lies on its parent chain.
    #[must_use]
    pub fn is_ancestor_or_self(&self, ancestor: NodeHandle, node: NodeHandle) -> bool {
        let mut current = Some(node);
        while let Some(h) = current {
            if h == ancestor {
                return true;
            }
            current = self.nodes.get(h).and_then(|n| n.parent);
        }
        false
    }

    // ========================================================================
    // Identity & pivot
    // ========================================================================

    pub fn set_name(&mut self, handle: NodeHandle, name: &str) -> Result<()> {
        self.node_mut(handle)?.name = Some(name.to_owned());
        Ok(())
    }

    /// The node's name; empty for unnamed or missing nodes.
    #[must_use]
    pub fn get_name(&self, handle: NodeHandle) -> &str {
        self.nodes.get(handle).and_then(Node::name).unwrap_or("")
    }

    /// First node with the given name.
    #[must_use]
    pub fn find_node_by_name(&self, name: &str) -> Option<NodeHandle> {
        self.nodes.iter().find(|(_, n)| n.name() == Some(name)).map(|(h, _)| h)
    }

    pub fn set_pivot(&mut self, handle: NodeHandle, pivot: Vec3) -> Result<()> {
        self.node_mut(handle)?.pivot = pivot;
        self.invalidate(handle);
        Ok(())
    }

    pub fn pivot(&self, handle: NodeHandle) -> Result<Vec3> {
        Ok(self.node(handle)?.pivot)
    }

    // ========================================================================
    // Invalidation
    // ========================================================================

    /// Marks the cached matrices of `handle` and every descendant as stale
    /// for all evaluation contexts.
    pub(crate) fn invalidate(&mut self, handle: NodeHandle) {
        let mut stack = vec![handle];
        while let Some(h) = stack.pop() {
            let Some(node) = self.nodes.get_mut(h) else {
                continue;
            };
            node.bump_revision();
            stack.extend(node.children.iter().copied());
        }
    }
}
