// ABOUTME: In-memory stand-in for an SSH agent.
// ABOUTME: Counts connection attempts and serves a fixed identity list.

use async_trait::async_trait;
use remsh::ssh::AgentConnector;
use russh::keys::ssh_key::PublicKey;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const AGENT_KEYS: [&str; 3] = [
    "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIPD9XiSaTwjUrgXmArY/I1YvogFs/lnzZ1FiPpTj5Al2 agent-1",
    "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIFYuQYD7fwv0dJCDScPZnSDaP3t/sOVRtXIEiLiGjP6P agent-2",
    "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAICRK3ONZmLefJ+h3xbKvR+XE/UH3kDFYqaWmveYd+0wg agent-3",
];

/// Parse the first `n` agent fixture keys.
pub fn agent_keys(n: usize) -> Vec<PublicKey> {
    AGENT_KEYS[..n]
        .iter()
        .map(|line| PublicKey::from_openssh(line).expect("fixture key should parse"))
        .collect()
}

/// Handle returned by a successful fake agent connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeAgent;

enum Behaviour {
    Unreachable,
    Hangs,
    Serves(Vec<PublicKey>),
    ListFails,
}

pub struct FakeAgentConnector {
    behaviour: Behaviour,
    connects: Arc<AtomicUsize>,
}

impl FakeAgentConnector {
    pub fn unreachable() -> Self {
        Self::with(Behaviour::Unreachable)
    }

    /// Accepts the connection attempt but never answers it.
    pub fn hanging() -> Self {
        Self::with(Behaviour::Hangs)
    }

    pub fn serving(keys: Vec<PublicKey>) -> Self {
        Self::with(Behaviour::Serves(keys))
    }

    pub fn failing_list() -> Self {
        Self::with(Behaviour::ListFails)
    }

    fn with(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            connects: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared counter of connection attempts.
    pub fn connects(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.connects)
    }
}

#[async_trait]
impl AgentConnector for FakeAgentConnector {
    type Agent = FakeAgent;

    async fn connect(&self, _socket: &Path) -> Result<FakeAgent, String> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        match self.behaviour {
            Behaviour::Unreachable => Err("connection refused".to_string()),
            Behaviour::Hangs => std::future::pending().await,
            _ => Ok(FakeAgent),
        }
    }

    async fn identities(&self, _agent: &mut FakeAgent) -> Result<Vec<PublicKey>, String> {
        match &self.behaviour {
            Behaviour::Serves(keys) => Ok(keys.clone()),
            Behaviour::ListFails => Err("agent refused request".to_string()),
            Behaviour::Unreachable | Behaviour::Hangs => Err("not connected".to_string()),
        }
    }
}
