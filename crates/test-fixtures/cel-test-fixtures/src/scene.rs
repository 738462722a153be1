//! Arena-backed scene graph and stub keyframe channels.

use std::sync::{Arc, Mutex, RwLock};

use anyhow::{bail, Context, Result};
use hashbrown::HashMap;
use serde::Deserialize;

use cel_timeline_core::{
    KeyframeChannel, NodeId, Rect, SceneGraph, TimeRange, CONTENT_CHANNEL,
};

/// Keyframe channel backed by a sorted list of key times.
///
/// The identical range of a time is the hold span of the key active at that
/// time: up to the next key (exclusive), or infinite after the last key.
/// Times before the first key hold from frame 0. Affected and identical
/// ranges coincide for this stub, as they do for plain content channels.
pub struct StubChannel {
    id: String,
    keys: Mutex<Vec<i32>>,
}

impl StubChannel {
    pub fn new(id: &str, mut keys: Vec<i32>) -> Arc<Self> {
        keys.sort_unstable();
        Arc::new(Self {
            id: id.to_string(),
            keys: Mutex::new(keys),
        })
    }

    pub fn content(keys: Vec<i32>) -> Arc<Self> {
        Self::new(CONTENT_CHANNEL, keys)
    }

    /// Insert a keyframe at runtime. The caller is responsible for routing
    /// the matching `notify_node_changed` to the timeline, as a host would.
    pub fn add_key(&self, time: i32) {
        let mut keys = self.keys.lock().unwrap();
        keys.push(time);
        keys.sort_unstable();
    }
}

impl KeyframeChannel for StubChannel {
    fn id(&self) -> &str {
        &self.id
    }

    fn last_keyframe_time(&self) -> Option<i32> {
        self.keys.lock().unwrap().last().copied()
    }

    fn affected_range(&self, time: i32) -> TimeRange {
        self.identical_range(time)
    }

    fn identical_range(&self, time: i32) -> TimeRange {
        let keys = self.keys.lock().unwrap();
        if keys.is_empty() {
            return TimeRange::infinite(0);
        }
        let active = keys.iter().rev().find(|key| **key <= time).copied();
        let next = keys.iter().find(|key| **key > time).copied();
        match (active, next) {
            (Some(active), Some(next)) => TimeRange::from_time(active, next - 1),
            (Some(active), None) => TimeRange::infinite(active),
            (None, Some(next)) => TimeRange::from_time(0, next - 1),
            (None, None) => TimeRange::infinite(0),
        }
    }
}

struct NodeData {
    children: Vec<NodeId>,
    affects_animation: bool,
    channels: HashMap<String, Arc<StubChannel>>,
}

struct ArenaInner {
    nodes: Vec<NodeData>,
    bounds: Rect,
}

/// Mutable tree of nodes with parent/child indices, rooted at `NodeId(0)`.
pub struct SceneArena {
    inner: RwLock<ArenaInner>,
}

impl SceneArena {
    pub fn new() -> Arc<Self> {
        Self::with_bounds(Rect::new(0, 0, 512, 512))
    }

    pub fn with_bounds(bounds: Rect) -> Arc<Self> {
        Arc::new(Self {
            inner: RwLock::new(ArenaInner {
                nodes: vec![NodeData {
                    children: Vec::new(),
                    affects_animation: true,
                    channels: HashMap::new(),
                }],
                bounds,
            }),
        })
    }

    pub fn add_node(&self, parent: NodeId) -> NodeId {
        let mut inner = self.inner.write().unwrap();
        let id = NodeId(inner.nodes.len() as u32);
        inner.nodes.push(NodeData {
            children: Vec::new(),
            affects_animation: true,
            channels: HashMap::new(),
        });
        inner.nodes[parent.0 as usize].children.push(id);
        id
    }

    pub fn add_channel(&self, node: NodeId, channel: Arc<StubChannel>) {
        let mut inner = self.inner.write().unwrap();
        inner.nodes[node.0 as usize]
            .channels
            .insert(channel.id().to_string(), channel);
    }

    /// Mark a node as excluded from animation, like a selection mask.
    pub fn set_affects_animation(&self, node: NodeId, value: bool) {
        let mut inner = self.inner.write().unwrap();
        inner.nodes[node.0 as usize].affects_animation = value;
    }
}

impl SceneGraph for SceneArena {
    fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.inner.read().unwrap().nodes[node.0 as usize]
            .children
            .clone()
    }

    fn bounds(&self) -> Rect {
        self.inner.read().unwrap().bounds
    }

    fn is_animated(&self, node: NodeId) -> bool {
        !self.inner.read().unwrap().nodes[node.0 as usize]
            .channels
            .is_empty()
    }

    fn affects_animation(&self, node: NodeId) -> bool {
        self.inner.read().unwrap().nodes[node.0 as usize].affects_animation
    }

    fn channels(&self, node: NodeId) -> Vec<Arc<dyn KeyframeChannel>> {
        self.inner.read().unwrap().nodes[node.0 as usize]
            .channels
            .values()
            .map(|channel| Arc::clone(channel) as Arc<dyn KeyframeChannel>)
            .collect()
    }

    fn channel(&self, node: NodeId, id: &str) -> Option<Arc<dyn KeyframeChannel>> {
        self.inner.read().unwrap().nodes[node.0 as usize]
            .channels
            .get(id)
            .map(|channel| Arc::clone(channel) as Arc<dyn KeyframeChannel>)
    }
}

#[derive(Debug, Deserialize)]
struct SceneSpec {
    #[serde(default)]
    bounds: Option<[i32; 4]>,
    nodes: Vec<NodeSpec>,
}

#[derive(Debug, Deserialize)]
struct NodeSpec {
    #[serde(default)]
    parent: Option<u32>,
    #[serde(default = "default_true")]
    affects_animation: bool,
    #[serde(default)]
    channels: Vec<ChannelSpec>,
}

#[derive(Debug, Deserialize)]
struct ChannelSpec {
    id: String,
    keys: Vec<i32>,
}

fn default_true() -> bool {
    true
}

/// Build a scene arena from a declarative JSON description. The first node
/// is the root and must not name a parent; later nodes reference earlier
/// indices.
pub fn scene_from_json(text: &str) -> Result<Arc<SceneArena>> {
    let spec: SceneSpec =
        serde_json::from_str(text).context("failed to parse scene fixture JSON")?;
    if spec.nodes.is_empty() {
        bail!("scene fixture must declare at least a root node");
    }
    if spec.nodes[0].parent.is_some() {
        bail!("root node must not declare a parent");
    }

    let arena = match spec.bounds {
        Some([x, y, w, h]) => SceneArena::with_bounds(Rect::new(x, y, w, h)),
        None => SceneArena::new(),
    };

    for (index, node_spec) in spec.nodes.iter().enumerate() {
        let node = if index == 0 {
            arena.root()
        } else {
            let parent = node_spec
                .parent
                .with_context(|| format!("node {index} is missing a parent"))?;
            if parent as usize >= index {
                bail!("node {index} references parent {parent} that is not defined yet");
            }
            arena.add_node(NodeId(parent))
        };
        arena.set_affects_animation(node, node_spec.affects_animation);
        for channel in &node_spec.channels {
            arena.add_channel(node, StubChannel::new(&channel.id, channel.keys.clone()));
        }
    }

    Ok(arena)
}
