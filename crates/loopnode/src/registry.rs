//! The set of nodes active during run mode.

use crate::node::Node;
use loopnode_client::{ApiClient, HttpTransport};
use loopnode_store::AccountSession;
use tracing::info;

/// Nodes in session order. Owned by the scheduler while running.
#[derive(Debug, Default)]
pub struct NodeRegistry {
    nodes: Vec<Node>,
}

impl NodeRegistry {
    /// Build one node per session, resolving invite codes one at a time.
    pub async fn build<T, I>(sessions: I, api: &ApiClient<T>) -> Self
    where
        T: HttpTransport,
        I: IntoIterator<Item = AccountSession>,
    {
        let mut nodes = Vec::new();
        for session in sessions {
            let node = Node::create(session, api).await;
            info!("Node ready: {} (invite {})", node.email(), node.invite_code());
            nodes.push(node);
        }
        Self { nodes }
    }

    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Node> {
        self.nodes.iter_mut()
    }
}
