//! Domain Models
//! Mission: Typed entities for the football schema

use serde::{Deserialize, Serialize};

/// A football team
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub foundation_year: i32,
    pub city: String,
}

/// Team payload for create/update requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTeam {
    pub name: String,
    pub foundation_year: i32,
    pub city: String,
}

/// A position a player can hold, e.g. "goalkeeper", "midfielder"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRole {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPlayerRole {
    pub name: String,
}

/// A player, tied to a [`PlayerRole`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: i64,
    pub name: String,
    pub birth_date: String,
    pub role_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPlayer {
    pub name: String,
    pub birth_date: String,
    pub role_id: i64,
}

/// One stint of a player at a team; an open stint has no end_date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerHistory {
    pub id: i64,
    pub player_id: i64,
    pub team_id: i64,
    pub start_date: String,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPlayerHistory {
    pub player_id: i64,
    pub team_id: i64,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
}
