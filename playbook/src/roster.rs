//! Team roster: a name and five players, each with an agent pool.

use serde::{Deserialize, Serialize};

pub const PLAYERS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    #[error("player {0} is out of range")]
    PlayerOutOfRange(usize),
    #[error("{agent} is already in player {player}'s pool")]
    AgentAlreadyInPool { player: usize, agent: String },
    #[error("team name must not be blank")]
    MissingTeamName,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub name: String,
    pub agent_pool: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roster {
    pub team_name: String,
    pub players: [Player; PLAYERS],
}

impl Roster {
    fn player_mut(&mut self, index: usize) -> Result<&mut Player, RosterError> {
        self.players.get_mut(index).ok_or(RosterError::PlayerOutOfRange(index))
    }

    /// # Errors
    ///
    /// `PlayerOutOfRange`.
    pub fn set_player_name(&mut self, index: usize, name: &str) -> Result<(), RosterError> {
        self.player_mut(index)?.name = name.to_owned();
        Ok(())
    }

    /// # Errors
    ///
    /// `PlayerOutOfRange`, or `AgentAlreadyInPool` when the player already
    /// lists the agent.
    pub fn add_agent(&mut self, index: usize, agent: &str) -> Result<(), RosterError> {
        let player = self.player_mut(index)?;
        if player.agent_pool.iter().any(|a| a == agent) {
            return Err(RosterError::AgentAlreadyInPool { player: index, agent: agent.to_owned() });
        }
        player.agent_pool.push(agent.to_owned());
        Ok(())
    }

    /// Remove an agent from a player's pool. Returns whether it was present.
    ///
    /// # Errors
    ///
    /// `PlayerOutOfRange`.
    pub fn remove_agent(&mut self, index: usize, agent: &str) -> Result<bool, RosterError> {
        let player = self.player_mut(index)?;
        let before = player.agent_pool.len();
        player.agent_pool.retain(|a| a != agent);
        Ok(player.agent_pool.len() != before)
    }

    /// A roster can only be saved under a non-blank team name.
    ///
    /// # Errors
    ///
    /// `MissingTeamName`.
    pub fn validate_for_save(&self) -> Result<(), RosterError> {
        if self.team_name.trim().is_empty() {
            return Err(RosterError::MissingTeamName);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "roster_test.rs"]
mod tests;
