//! Tool modules for the Touchline orchestrator.

pub mod base;
pub mod registration;
pub mod registry;
pub mod team_availability;

pub use base::{require_string, ParamKind, ParamSpec, Tool, ToolArgs};
pub use registration::{
    AirtableLookupService, CodeValidation, LookupError, LookupService, RegistrationCodeTool,
};
pub use registry::{RegistryError, ToolRegistry};
pub use team_availability::{RosterError, TeamAvailabilityTool, TeamRecord, TeamRoster};

use std::sync::Arc;
use std::time::Duration;

/// Registry holding the club's two lookup tools.
pub fn club_registry(
    roster: Arc<TeamRoster>,
    lookup: Arc<dyn LookupService>,
    tool_timeout: Duration,
) -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::with_timeout(tool_timeout);
    registry.register(Arc::new(TeamAvailabilityTool::new(roster)))?;
    registry.register(Arc::new(RegistrationCodeTool::new(lookup)))?;
    Ok(registry)
}
