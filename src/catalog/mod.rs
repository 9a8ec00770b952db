//! Per-scenario event catalogs
//!
//! Each scenario owns a fixed list of parametrized event templates, gated
//! by rank and optionally targeted at a team. Catalogs are compiled in
//! ([`builtin`]) and can be extended from XML manifests ([`manifest`]).

mod builtin;
mod manifest;

pub use manifest::load_manifest_dir;

use anyhow::{bail, Result};
use std::collections::HashMap;

/// Upper bound on templates per scenario; the token grammar carries the
/// event index as two digits
pub const MAX_EVENTS_PER_SCENARIO: usize = 99;

/// Longest event name accepted into a catalog; names travel inside the
/// token, and this bound keeps the longest plannable battle under the
/// platform's token ceiling
pub const MAX_EVENT_NAME_LEN: usize = 24;

/// One parametrized event template
///
/// The asset path may contain a `{rank}` placeholder (substituted when the
/// template is resolved for a rank) and a `{team}` placeholder (substituted
/// when a team index is chosen at planning time).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventTemplate {
    /// Stable 1-based index within the scenario; carried in tokens
    pub index: u8,

    /// Unique event name (ASCII alphanumeric, token-safe)
    pub name: String,

    /// Lowest rank this event appears at
    pub min_rank: u8,

    /// Whether the template targets a specific team
    pub needs_team: bool,

    /// Asset path relative to the scenario directory
    pub path: String,
}

/// An event template with its rank placeholder substituted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEvent {
    pub index: u8,
    pub name: String,
    pub needs_team: bool,
    pub path: String,
}

/// Event library for one scenario theme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioCatalog {
    name: String,
    events: Vec<EventTemplate>,
}

impl ScenarioCatalog {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            events: Vec::new(),
        }
    }

    /// The distinct "no events" catalog: resolves to an empty list at every
    /// rank, signalling a filler-only playlist
    pub fn silent() -> Self {
        Self::new("silent")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a template; indices are assigned in insertion order, 1-based
    pub fn add_event(
        &mut self,
        name: impl Into<String>,
        min_rank: u8,
        needs_team: bool,
        path: impl Into<String>,
    ) {
        let index = self.events.len() as u8 + 1;
        self.events.push(EventTemplate {
            index,
            name: name.into(),
            min_rank,
            needs_team,
            path: path.into(),
        });
    }

    /// All templates, in index order
    pub fn templates(&self) -> &[EventTemplate] {
        &self.events
    }

    /// Look up a template by event name
    pub fn template(&self, name: &str) -> Option<&EventTemplate> {
        self.events.iter().find(|e| e.name == name)
    }

    /// Resolve every template available at `rank`, substituting the rank
    /// placeholder; team placeholders stay unresolved until planning picks
    /// a team index. Rank tiers are cumulative, so the returned list never
    /// shrinks as rank grows.
    pub fn events_for_rank(&self, rank: u8) -> Vec<ResolvedEvent> {
        let rank_field = format!("{:02}", rank);
        self.events
            .iter()
            .filter(|e| e.min_rank <= rank)
            .map(|e| ResolvedEvent {
                index: e.index,
                name: e.name.clone(),
                needs_team: e.needs_team,
                path: e.path.replace("{rank}", &rank_field),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// All loaded scenario catalogs, indexed by scenario and by event name
///
/// Tokens do not carry a scenario field; the global event-name index
/// recovers the owning scenario when serving from a decoded token, so
/// event names must be unique across scenarios.
#[derive(Debug, Clone)]
pub struct CatalogSet {
    scenarios: HashMap<String, ScenarioCatalog>,
    event_owner: HashMap<String, String>,
}

impl CatalogSet {
    pub fn new() -> Self {
        Self {
            scenarios: HashMap::new(),
            event_owner: HashMap::new(),
        }
    }

    /// The compiled-in scenario library
    pub fn builtin() -> Self {
        let mut set = Self::new();
        for catalog in builtin::scenarios() {
            set.insert(catalog)
                .expect("builtin scenario catalogs are internally consistent");
        }
        set
    }

    /// Register a scenario catalog, enforcing the token-facing invariants:
    /// unique scenario name, unique token-safe event names, index range
    pub fn insert(&mut self, catalog: ScenarioCatalog) -> Result<()> {
        if self.scenarios.contains_key(catalog.name()) {
            bail!("duplicate scenario `{}`", catalog.name());
        }
        if catalog.len() > MAX_EVENTS_PER_SCENARIO {
            bail!(
                "scenario `{}` has {} events, more than the {} the token grammar can carry",
                catalog.name(),
                catalog.len(),
                MAX_EVENTS_PER_SCENARIO
            );
        }
        for template in catalog.templates() {
            if template.name.is_empty()
                || template.name.len() > MAX_EVENT_NAME_LEN
                || !template.name.bytes().all(|b| b.is_ascii_alphanumeric())
            {
                bail!(
                    "event name `{}` in scenario `{}` is not token-safe",
                    template.name,
                    catalog.name()
                );
            }
            if let Some(owner) = self.event_owner.get(&template.name) {
                bail!(
                    "event name `{}` already owned by scenario `{}`",
                    template.name,
                    owner
                );
            }
        }
        for template in catalog.templates() {
            self.event_owner
                .insert(template.name.clone(), catalog.name().to_string());
        }
        self.scenarios.insert(catalog.name().to_string(), catalog);
        Ok(())
    }

    pub fn scenario(&self, name: &str) -> Option<&ScenarioCatalog> {
        self.scenarios.get(name)
    }

    /// Recover the owning scenario and template for an event name carried
    /// in a token
    pub fn lookup_event(&self, event_name: &str) -> Option<(&ScenarioCatalog, &EventTemplate)> {
        let owner = self.event_owner.get(event_name)?;
        let catalog = self.scenarios.get(owner)?;
        let template = catalog.template(event_name)?;
        Some((catalog, template))
    }

    pub fn scenario_count(&self) -> usize {
        self.scenarios.len()
    }

    /// Scenario names, sorted for stable logging
    pub fn scenario_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.scenarios.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for CatalogSet {
    fn default() -> Self {
        Self::new()
    }
}
