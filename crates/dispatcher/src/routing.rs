//! Static routing table
//!
//! Built once at startup and read-only afterwards.

use contracts::{Department, EventCode, RouteConfig, SimulationBlueprint};
use serde::{Deserialize, Serialize};

use crate::error::DispatcherError;

/// Where events of one code go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingRule {
    pub primary: Department,
    pub alternative: Option<Department>,
    pub redirect_allowed: bool,
}

impl RoutingRule {
    /// Rule without an alternative
    pub fn primary_only(primary: Department) -> Self {
        Self {
            primary,
            alternative: None,
            redirect_allowed: false,
        }
    }

    /// Rule that may redirect to `alternative` when `primary` is full
    pub fn with_redirect(primary: Department, alternative: Department) -> Self {
        Self {
            primary,
            alternative: Some(alternative),
            redirect_allowed: true,
        }
    }

    /// Alternative usable for a redirect, if the rule permits one
    pub fn redirect_target(&self) -> Option<Department> {
        self.alternative.filter(|_| self.redirect_allowed)
    }
}

impl From<&RouteConfig> for RoutingRule {
    fn from(route: &RouteConfig) -> Self {
        Self {
            primary: route.primary,
            alternative: route.alternative,
            redirect_allowed: route.redirect_allowed,
        }
    }
}

const CODE_COUNT: usize = EventCode::ALL.len();

/// One optional rule per event code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingTable {
    rules: [Option<RoutingRule>; CODE_COUNT],
}

impl Default for RoutingTable {
    /// Police and FireDept stay home; Ambulance may overflow into Police
    fn default() -> Self {
        Self {
            rules: [
                Some(RoutingRule::primary_only(Department::Police)),
                Some(RoutingRule::with_redirect(
                    Department::Ambulance,
                    Department::Police,
                )),
                Some(RoutingRule::primary_only(Department::FireDept)),
            ],
        }
    }
}

impl RoutingTable {
    /// Build from rules; codes without a rule stay unmapped
    pub fn from_rules(
        rules: impl IntoIterator<Item = (EventCode, RoutingRule)>,
    ) -> Result<Self, DispatcherError> {
        let mut table = Self {
            rules: [None; CODE_COUNT],
        };
        for (code, rule) in rules {
            if rule.alternative == Some(rule.primary) {
                return Err(DispatcherError::AlternativeIsPrimary(code));
            }
            let slot = &mut table.rules[slot_index(code)];
            if slot.is_some() {
                return Err(DispatcherError::DuplicateRule(code));
            }
            *slot = Some(rule);
        }
        Ok(table)
    }

    pub fn from_routes(routes: &[RouteConfig]) -> Result<Self, DispatcherError> {
        Self::from_rules(routes.iter().map(|r| (r.code, RoutingRule::from(r))))
    }

    pub fn from_blueprint(blueprint: &SimulationBlueprint) -> Result<Self, DispatcherError> {
        Self::from_routes(&blueprint.routing)
    }

    /// Rule for `code`, `None` if unmapped
    pub fn rule(&self, code: EventCode) -> Option<&RoutingRule> {
        self.rules[slot_index(code)].as_ref()
    }

    /// Whether every event code has a rule
    pub fn is_complete(&self) -> bool {
        self.rules.iter().all(Option::is_some)
    }

    /// Mapped rules in code order
    pub fn iter(&self) -> impl Iterator<Item = (EventCode, &RoutingRule)> {
        EventCode::ALL
            .into_iter()
            .filter_map(|code| self.rule(code).map(|rule| (code, rule)))
    }
}

fn slot_index(code: EventCode) -> usize {
    usize::from(code.as_u8() - 1)
}
