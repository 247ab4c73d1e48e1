//! Team roster and the `check_team_availability` tool.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};

use touchline_core::types::ToolResult;

use super::base::{require_string, ParamKind, ParamSpec, Tool, ToolArgs};

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("team '{team}' has {registered} registered but capacity {capacity}")]
    OverCapacity {
        team: String,
        registered: u32,
        capacity: u32,
    },
    #[error("team '{0}' appears more than once")]
    DuplicateTeam(String),
    #[error("failed to read roster: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse roster: {0}")]
    Parse(#[from] serde_json::Error),
}

// ─────────────────────────────────────────────
// Roster
// ─────────────────────────────────────────────

/// One squad in the club.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TeamRecord {
    pub name: String,
    pub capacity: u32,
    pub registered: u32,
    pub gender: String,
    pub age_group: String,
}

impl TeamRecord {
    fn new(name: &str, capacity: u32, registered: u32, gender: &str, age_group: &str) -> Self {
        Self {
            name: name.to_string(),
            capacity,
            registered,
            gender: gender.to_string(),
            age_group: age_group.to_string(),
        }
    }

    pub fn spaces_left(&self) -> u32 {
        self.capacity.saturating_sub(self.registered)
    }

    pub fn spaces_available(&self) -> bool {
        self.spaces_left() > 0
    }
}

/// Read-only set of teams, validated on construction.
#[derive(Clone, Debug)]
pub struct TeamRoster {
    teams: Vec<TeamRecord>,
}

impl TeamRoster {
    /// Build a roster, rejecting over-capacity or duplicate teams.
    pub fn new(teams: Vec<TeamRecord>) -> Result<Self, RosterError> {
        let mut seen = HashSet::new();
        for team in &teams {
            if team.registered > team.capacity {
                return Err(RosterError::OverCapacity {
                    team: team.name.clone(),
                    registered: team.registered,
                    capacity: team.capacity,
                });
            }
            if !seen.insert(team.name.as_str()) {
                return Err(RosterError::DuplicateTeam(team.name.clone()));
            }
        }
        Ok(Self { teams })
    }

    /// The club's current squads.
    pub fn builtin() -> Self {
        Self {
            teams: vec![
                TeamRecord::new("U8 Cubs", 10, 7, "Mixed", "U8"),
                TeamRecord::new("U10 Tigers", 14, 12, "Mixed", "U10"),
                TeamRecord::new("U12 Eagles", 16, 16, "Boys", "U12"),
                TeamRecord::new("U13 Swifts", 14, 9, "Girls", "U13"),
                TeamRecord::new("U14 Falcons", 18, 15, "Girls", "U14"),
                TeamRecord::new("U16 Hawks", 18, 18, "Boys", "U16"),
            ],
        }
    }

    /// Load a roster from a JSON array of team records.
    pub fn from_json_file(path: &Path) -> Result<Self, RosterError> {
        let content = std::fs::read_to_string(path)?;
        let teams: Vec<TeamRecord> = serde_json::from_str(&content)?;
        let roster = Self::new(teams)?;
        info!(path = %path.display(), teams = roster.len(), "loaded team roster");
        Ok(roster)
    }

    /// Exact-name lookup (surrounding whitespace ignored).
    pub fn find(&self, name: &str) -> Option<&TeamRecord> {
        let name = name.trim();
        self.teams.iter().find(|t| t.name == name)
    }

    pub fn teams(&self) -> &[TeamRecord] {
        &self.teams
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}

impl Default for TeamRoster {
    fn default() -> Self {
        Self::builtin()
    }
}

// ─────────────────────────────────────────────
// Tool
// ─────────────────────────────────────────────

/// Reports capacity and free places for a named team.
pub struct TeamAvailabilityTool {
    roster: Arc<TeamRoster>,
}

impl TeamAvailabilityTool {
    pub fn new(roster: Arc<TeamRoster>) -> Self {
        Self { roster }
    }
}

#[async_trait]
impl Tool for TeamAvailabilityTool {
    fn name(&self) -> &str {
        "check_team_availability"
    }

    fn description(&self) -> &str {
        "Check whether a club team has spaces for new players. \
         Returns capacity, registered players and spaces left."
    }

    fn params(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::required(
            "team_name",
            ParamKind::String,
            "Exact team name, e.g. \"U10 Tigers\"",
        )]
    }

    async fn execute(&self, args: ToolArgs) -> anyhow::Result<ToolResult> {
        let team_name = require_string(&args, "team_name")?;

        let result = match self.roster.find(&team_name) {
            Some(team) => {
                debug!(team = %team.name, spaces_left = team.spaces_left(), "team found");
                json!({
                    "team_found": true,
                    "team_name": team.name,
                    "capacity": team.capacity,
                    "registered": team.registered,
                    "spaces_left": team.spaces_left(),
                    "spaces_available": team.spaces_available(),
                    "gender": team.gender,
                    "age_group": team.age_group,
                })
            }
            None => {
                debug!(team = %team_name, "team not found");
                json!({
                    "team_found": false,
                    "team_name": team_name,
                    "message": format!("No team called '{team_name}' was found at Urmston Town Juniors."),
                })
            }
        };

        Ok(ToolResult::from_json(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn tool() -> TeamAvailabilityTool {
        TeamAvailabilityTool::new(Arc::new(TeamRoster::builtin()))
    }

    fn args(team: &str) -> ToolArgs {
        let mut args = ToolArgs::new();
        args.insert("team_name".into(), json!(team));
        args
    }

    #[test]
    fn test_builtin_roster_is_valid() {
        let builtin = TeamRoster::builtin();
        let roster = TeamRoster::new(builtin.teams().to_vec()).unwrap();
        assert_eq!(roster.len(), 6);
    }

    #[tokio::test]
    async fn test_spaces_derived_for_every_team() {
        let tool = tool();
        for team in TeamRoster::builtin().teams() {
            let result = tool.execute(args(&team.name)).await.unwrap();
            let left = result.get("spaces_left").and_then(|v| v.as_u64()).unwrap();
            assert_eq!(left, u64::from(team.capacity - team.registered));
            assert_eq!(result.get("spaces_available"), Some(&json!(left > 0)));
            assert_eq!(result.get("team_found"), Some(&json!(true)));
        }
    }

    #[tokio::test]
    async fn test_full_team() {
        let result = tool().execute(args("U12 Eagles")).await.unwrap();
        assert_eq!(result.get("spaces_left"), Some(&json!(0)));
        assert_eq!(result.get("spaces_available"), Some(&json!(false)));
        assert_eq!(result.get("gender"), Some(&json!("Boys")));
    }

    #[tokio::test]
    async fn test_team_with_spaces() {
        let result = tool().execute(args("U10 Tigers")).await.unwrap();
        assert_eq!(result.get("spaces_left"), Some(&json!(2)));
        assert_eq!(result.get("spaces_available"), Some(&json!(true)));
        assert_eq!(result.get("age_group"), Some(&json!("U10")));
    }

    #[tokio::test]
    async fn test_absent_team_is_not_an_error() {
        let result = tool().execute(args("Nonexistent FC")).await.unwrap();
        assert!(!result.is_error());
        assert_eq!(result.get("team_found"), Some(&json!(false)));
        assert_eq!(result.get("team_name"), Some(&json!("Nonexistent FC")));
        assert!(result.get("message").is_some());
    }

    #[test]
    fn test_find_is_exact() {
        let roster = TeamRoster::builtin();
        assert!(roster.find("  U8 Cubs ").is_some());
        assert!(roster.find("u8 cubs").is_none());
        assert!(roster.find("U8").is_none());
    }

    #[test]
    fn test_over_capacity_rejected() {
        let err = TeamRoster::new(vec![TeamRecord::new("U9 Owls", 10, 11, "Mixed", "U9")]).unwrap_err();
        assert!(matches!(err, RosterError::OverCapacity { registered: 11, .. }));
    }

    #[test]
    fn test_duplicate_rejected() {
        let team = TeamRecord::new("U9 Owls", 10, 5, "Mixed", "U9");
        let err = TeamRoster::new(vec![team.clone(), team]).unwrap_err();
        assert!(matches!(err, RosterError::DuplicateTeam(name) if name == "U9 Owls"));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"name": "U9 Owls", "capacity": 12, "registered": 4, "gender": "Mixed", "age_group": "U9"}}]"#
        )
        .unwrap();

        let roster = TeamRoster::from_json_file(file.path()).unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.find("U9 Owls").unwrap().spaces_left(), 8);
    }

    #[test]
    fn test_from_json_file_errors() {
        assert!(matches!(
            TeamRoster::from_json_file(Path::new("/nonexistent/teams.json")),
            Err(RosterError::Io(_))
        ));

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            TeamRoster::from_json_file(file.path()),
            Err(RosterError::Parse(_))
        ));
    }
}
