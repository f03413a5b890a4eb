//! Static agent catalog
//!
//! Agents never change for the lifetime of the process; race state only
//! borrows descriptors from here.

use serde::Serialize;

/// Agent identifier (1-based)
pub type AgentId = u32;

/// Identity and visuals of one skater
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgentDescriptor {
    pub id: AgentId,
    pub name: &'static str,
    /// Sprite asset key
    pub sprite: &'static str,
    /// Dot and scoreboard color (`#RRGGBB`)
    pub color: &'static str,
}

pub const AGENTS: [AgentDescriptor; 4] = [
    AgentDescriptor {
        id: 1,
        name: "Ace",
        sprite: "skater1",
        color: "#FF0000",
    },
    AgentDescriptor {
        id: 2,
        name: "Blaze",
        sprite: "skater2",
        color: "#0000FF",
    },
    AgentDescriptor {
        id: 3,
        name: "Cruz",
        sprite: "skater3",
        color: "#00FF00",
    },
    AgentDescriptor {
        id: 4,
        name: "Dash",
        sprite: "skater4",
        color: "#FFFF00",
    },
];

/// Look up a descriptor by id
pub fn agent(id: AgentId) -> Option<&'static AgentDescriptor> {
    AGENTS.iter().find(|a| a.id == id)
}

/// Display name, falling back to `#id` for ids outside the catalog
pub fn agent_name(id: AgentId) -> String {
    agent(id)
        .map(|a| a.name.to_string())
        .unwrap_or_else(|| format!("#{}", id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(agent(3).map(|a| a.name), Some("Cruz"));
        assert!(agent(0).is_none());
        assert!(agent(5).is_none());
        assert_eq!(agent_name(9), "#9");
    }

    #[test]
    fn test_ids_are_sequential() {
        for (i, a) in AGENTS.iter().enumerate() {
            assert_eq!(a.id as usize, i + 1);
        }
    }
}
