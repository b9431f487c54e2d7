//! Domain Database
//! Mission: Single-row SQLite persistence for teams, players, roles, and history

use crate::models::{
    NewPlayer, NewPlayerHistory, NewPlayerRole, NewTeam, Player, PlayerHistory, PlayerRole, Team,
};
use anyhow::{Context, Result};
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use tracing::info;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS teams (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    foundation_year INTEGER NOT NULL,
    city TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS player_roles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS players (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    birth_date TEXT NOT NULL,
    role_id INTEGER NOT NULL,
    FOREIGN KEY (role_id) REFERENCES player_roles(id)
);

CREATE TABLE IF NOT EXISTS player_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    player_id INTEGER NOT NULL,
    team_id INTEGER NOT NULL,
    start_date TEXT NOT NULL,
    end_date TEXT,
    FOREIGN KEY (player_id) REFERENCES players(id),
    FOREIGN KEY (team_id) REFERENCES teams(id)
);

CREATE INDEX IF NOT EXISTS idx_player_history_player
    ON player_history(player_id);
"#;

/// Domain storage with SQLite backend
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) the database and apply the schema
    pub fn open(path: &str) -> Result<Self> {
        let conn =
            Connection::open(path).with_context(|| format!("Failed to open database {}", path))?;
        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to apply schema")?;

        info!("⚽ Domain database ready at: {}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    // ===== Teams =====

    pub fn create_team(&self, team: &NewTeam) -> Result<Team> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO teams (name, foundation_year, city) VALUES (?1, ?2, ?3)",
            params![team.name, team.foundation_year, team.city],
        )
        .context("Failed to insert team")?;

        Ok(Team {
            id: conn.last_insert_rowid(),
            name: team.name.clone(),
            foundation_year: team.foundation_year,
            city: team.city.clone(),
        })
    }

    /// Returns None when no team has the given id
    pub fn update_team(&self, id: i64, team: &NewTeam) -> Result<Option<Team>> {
        let conn = self.conn.lock();
        let rows_affected = conn
            .execute(
                "UPDATE teams SET name = ?1, foundation_year = ?2, city = ?3 WHERE id = ?4",
                params![team.name, team.foundation_year, team.city, id],
            )
            .context("Failed to update team")?;

        if rows_affected == 0 {
            return Ok(None);
        }

        Ok(Some(Team {
            id,
            name: team.name.clone(),
            foundation_year: team.foundation_year,
            city: team.city.clone(),
        }))
    }

    pub fn delete_team(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock();
        let rows_affected = conn
            .execute("DELETE FROM teams WHERE id = ?1", params![id])
            .context("Failed to delete team")?;
        Ok(rows_affected > 0)
    }

    // ===== Player roles =====

    pub fn create_role(&self, role: &NewPlayerRole) -> Result<PlayerRole> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO player_roles (name) VALUES (?1)",
            params![role.name],
        )
        .context("Failed to insert role")?;

        Ok(PlayerRole {
            id: conn.last_insert_rowid(),
            name: role.name.clone(),
        })
    }

    pub fn update_role(&self, id: i64, role: &NewPlayerRole) -> Result<Option<PlayerRole>> {
        let conn = self.conn.lock();
        let rows_affected = conn
            .execute(
                "UPDATE player_roles SET name = ?1 WHERE id = ?2",
                params![role.name, id],
            )
            .context("Failed to update role")?;

        if rows_affected == 0 {
            return Ok(None);
        }

        Ok(Some(PlayerRole {
            id,
            name: role.name.clone(),
        }))
    }

    pub fn delete_role(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock();
        let rows_affected = conn
            .execute("DELETE FROM player_roles WHERE id = ?1", params![id])
            .context("Failed to delete role")?;
        Ok(rows_affected > 0)
    }

    pub fn list_roles(&self) -> Result<Vec<PlayerRole>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT id, name FROM player_roles ORDER BY id")?;

        let roles = stmt
            .query_map([], |row| {
                Ok(PlayerRole {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(roles)
    }

    // ===== Players =====

    pub fn create_player(&self, player: &NewPlayer) -> Result<Player> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO players (name, birth_date, role_id) VALUES (?1, ?2, ?3)",
            params![player.name, player.birth_date, player.role_id],
        )
        .context("Failed to insert player")?;

        Ok(Player {
            id: conn.last_insert_rowid(),
            name: player.name.clone(),
            birth_date: player.birth_date.clone(),
            role_id: player.role_id,
        })
    }

    pub fn update_player(&self, id: i64, player: &NewPlayer) -> Result<Option<Player>> {
        let conn = self.conn.lock();
        let rows_affected = conn
            .execute(
                "UPDATE players SET name = ?1, birth_date = ?2, role_id = ?3 WHERE id = ?4",
                params![player.name, player.birth_date, player.role_id, id],
            )
            .context("Failed to update player")?;

        if rows_affected == 0 {
            return Ok(None);
        }

        Ok(Some(Player {
            id,
            name: player.name.clone(),
            birth_date: player.birth_date.clone(),
            role_id: player.role_id,
        }))
    }

    pub fn delete_player(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock();
        let rows_affected = conn
            .execute("DELETE FROM players WHERE id = ?1", params![id])
            .context("Failed to delete player")?;
        Ok(rows_affected > 0)
    }

    // ===== Player history =====

    pub fn add_history(&self, stint: &NewPlayerHistory) -> Result<PlayerHistory> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO player_history (player_id, team_id, start_date, end_date)
             VALUES (?1, ?2, ?3, ?4)",
            params![stint.player_id, stint.team_id, stint.start_date, stint.end_date],
        )
        .context("Failed to insert player history")?;

        Ok(PlayerHistory {
            id: conn.last_insert_rowid(),
            player_id: stint.player_id,
            team_id: stint.team_id,
            start_date: stint.start_date.clone(),
            end_date: stint.end_date.clone(),
        })
    }

    pub fn history_for_player(&self, player_id: i64) -> Result<Vec<PlayerHistory>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, player_id, team_id, start_date, end_date
             FROM player_history WHERE player_id = ?1 ORDER BY id",
        )?;

        let history = stmt
            .query_map(params![player_id], |row| {
                Ok(PlayerHistory {
                    id: row.get(0)?,
                    player_id: row.get(1)?,
                    team_id: row.get(2)?,
                    start_date: row.get(3)?,
                    end_date: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(history)
    }
}
