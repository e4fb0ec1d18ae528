//! Five-slot agent compositions.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub const SLOTS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Controller,
    Sentinel,
    Initiator,
    Duelist,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Controller => "Controller",
            Self::Sentinel => "Sentinel",
            Self::Initiator => "Initiator",
            Self::Duelist => "Duelist",
        })
    }
}

/// Static per-agent data: role, ultimate cost, utility tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AgentInfo {
    pub name: &'static str,
    pub role: Role,
    pub credits: u32,
    pub orbs: u32,
    pub attributes: &'static [&'static str],
}

const fn agent(name: &'static str, role: Role, credits: u32, orbs: u32, attributes: &'static [&'static str]) -> AgentInfo {
    AgentInfo { name, role, credits, orbs, attributes }
}

use Role::{Controller, Duelist, Initiator, Sentinel};

pub const AGENTS: &[AgentInfo] = &[
    agent("Brimstone", Controller, 650, 8, &["Smoke", "Molly", "Stun"]),
    agent("Viper", Controller, 500, 9, &["Smoke", "Wall", "Molly", "Debuff"]),
    agent("Omen", Controller, 600, 7, &["Smoke", "Flash", "Teleport"]),
    agent("Astra", Controller, 600, 7, &["Smoke", "Stun", "Slow", "Suppress"]),
    agent("Harbor", Controller, 500, 7, &["Smoke", "Wall", "Slow", "Stun"]),
    agent("Clove", Controller, 600, 8, &["Smoke", "Slow", "Revive"]),
    agent("Killjoy", Sentinel, 600, 9, &["Trap", "Damage", "Debuff", "Suppress"]),
    agent("Cypher", Sentinel, 500, 7, &["Trap", "Recon", "Slow"]),
    agent("Sage", Sentinel, 700, 7, &["Wall", "Slow", "Heal", "Revive"]),
    agent("Chamber", Sentinel, 1000, 8, &["Trap", "Teleport", "Slow"]),
    agent("Deadlock", Sentinel, 700, 7, &["Trap", "Wall", "Stun"]),
    agent("Vyse", Sentinel, 500, 8, &["Flash", "Wall", "Slow", "Damage", "Suppress"]),
    agent("Sova", Initiator, 700, 8, &["Recon", "Damage"]),
    agent("Breach", Initiator, 700, 8, &["Flash", "Stun", "Damage"]),
    agent("Skye", Initiator, 700, 8, &["Flash", "Heal", "Recon"]),
    agent("KAY/O", Initiator, 700, 8, &["Flash", "Molly", "Suppress", "Revive"]),
    agent("Fade", Initiator, 700, 8, &["Recon", "Slow", "Debuff"]),
    agent("Gekko", Initiator, 550, 8, &["Flash", "Stun", "Recon"]),
    agent("Tejo", Initiator, 750, 9, &["Flash", "Damage", "Stun"]),
    agent("Waylay", Initiator, 600, 8, &["Trap", "Slow", "Recon"]),
    agent("Phoenix", Duelist, 600, 6, &["Flash", "Molly", "Wall", "Heal", "Revive"]),
    agent("Jett", Duelist, 550, 8, &["Smoke", "Mobility"]),
    agent("Reyna", Duelist, 700, 7, &["Flash", "Heal", "Mobility"]),
    agent("Raze", Duelist, 700, 8, &["Damage", "Mobility"]),
    agent("Yoru", Duelist, 850, 8, &["Flash", "Teleport", "Recon", "Debuff"]),
    agent("Neon", Duelist, 500, 8, &["Wall", "Stun", "Mobility"]),
    agent("Iso", Duelist, 500, 7, &["Wall", "Debuff", "Suppress"]),
    agent("Veto", Duelist, 600, 7, &["Flash", "Damage", "Mobility"]),
];

/// Look up an agent by exact display name.
#[must_use]
pub fn agent_info(name: &str) -> Option<&'static AgentInfo> {
    AGENTS.iter().find(|a| a.name == name)
}

/// Agents filtered by role. `None` means every role.
pub fn agents_by_role(role: Option<Role>) -> impl Iterator<Item = &'static AgentInfo> {
    AGENTS.iter().filter(move |a| role.is_none_or(|r| a.role == r))
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompositionError {
    #[error("{0} is already in the composition")]
    AlreadyInComposition(String),
    #[error("composition is full, clear a slot first")]
    Full,
    #[error("slot {0} is out of range")]
    SlotOutOfRange(usize),
}

/// Ordered agent slots. An agent occupies at most one slot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Composition {
    slots: [Option<String>; SLOTS],
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompStats {
    pub credits: u32,
    pub orbs: u32,
    /// Agents with no cost data. Excluded from the totals.
    pub missing_cost: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeCount {
    pub attribute: String,
    pub count: usize,
}

impl Composition {
    /// Build from a list of agents, filling slots in order.
    ///
    /// # Errors
    ///
    /// `AlreadyInComposition` on a repeat, `Full` past five agents.
    pub fn from_agents<I, S>(agents: I) -> Result<Self, CompositionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut comp = Self::default();
        for agent in agents {
            comp.add(agent.as_ref())?;
        }
        Ok(comp)
    }

    #[must_use]
    pub fn slots(&self) -> &[Option<String>; SLOTS] {
        &self.slots
    }

    pub fn agents(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().flatten().map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, agent: &str) -> bool {
        self.position(agent).is_some()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    fn position(&self, agent: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.as_deref() == Some(agent))
    }

    /// Put `agent` into the first empty slot and return that slot.
    ///
    /// # Errors
    ///
    /// `AlreadyInComposition` or `Full`.
    pub fn add(&mut self, agent: &str) -> Result<usize, CompositionError> {
        if self.contains(agent) {
            return Err(CompositionError::AlreadyInComposition(agent.to_owned()));
        }
        let index = self.slots.iter().position(Option::is_none).ok_or(CompositionError::Full)?;
        self.slots[index] = Some(agent.to_owned());
        Ok(index)
    }

    /// Place `agent` in slot `index`. If it already sits elsewhere the two
    /// slots swap.
    ///
    /// # Errors
    ///
    /// `SlotOutOfRange`.
    pub fn set_slot(&mut self, index: usize, agent: &str) -> Result<(), CompositionError> {
        if index >= SLOTS {
            return Err(CompositionError::SlotOutOfRange(index));
        }
        match self.position(agent) {
            Some(existing) if existing != index => self.slots.swap(existing, index),
            Some(_) => {}
            None => self.slots[index] = Some(agent.to_owned()),
        }
        Ok(())
    }

    /// Empty slot `index`, returning what was there.
    ///
    /// # Errors
    ///
    /// `SlotOutOfRange`.
    pub fn clear_slot(&mut self, index: usize) -> Result<Option<String>, CompositionError> {
        self.slots.get_mut(index).map(Option::take).ok_or(CompositionError::SlotOutOfRange(index))
    }

    #[must_use]
    pub fn stats(&self) -> CompStats {
        let mut stats = CompStats::default();
        for name in self.agents() {
            match agent_info(name) {
                Some(info) => {
                    stats.credits += info.credits;
                    stats.orbs += info.orbs;
                }
                None => stats.missing_cost.push(name.to_owned()),
            }
        }
        stats
    }

    /// Attribute tally, highest count first, ties by name.
    #[must_use]
    pub fn attributes(&self) -> Vec<AttributeCount> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for info in self.agents().filter_map(agent_info) {
            for attr in info.attributes {
                *counts.entry(*attr).or_default() += 1;
            }
        }
        let mut tally: Vec<AttributeCount> =
            counts.into_iter().map(|(attribute, count)| AttributeCount { attribute: attribute.to_owned(), count }).collect();
        tally.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.attribute.cmp(&b.attribute)));
        tally
    }
}

#[cfg(test)]
#[path = "composition_test.rs"]
mod tests;
