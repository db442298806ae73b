//! Voter-based security manager.
//!
//! Each [Voter] looks at the attribute, the subject (root operation or field)
//! and the current [Principal] and grants, denies or abstains. The manager uses
//! an affirmative strategy: one grant is enough, otherwise any denial wins, and
//! unanimous abstention falls back to [SecurityConfig::allow_if_all_abstain].

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::Config;
use crate::graphql::{ExecutionContext, FieldNode, ResolveInfo};

use super::{Principal, SecurityAttribute, SecurityManager};

/// Outcome of a single voter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Granted,
    Denied,
    Abstain,
}

/// What a voter is asked about.
#[derive(Debug, Clone, Copy)]
pub enum Subject<'a> {
    Operation(&'a FieldNode),
    Field(&'a ResolveInfo),
}

impl Subject<'_> {
    /// `me` for operations, `User.email` for fields.
    pub fn target(&self) -> String {
        match self {
            Subject::Operation(query) => query.name().to_string(),
            Subject::Field(info) => info.target(),
        }
    }
}

pub trait Voter: Send + Sync {
    fn vote(
        &self,
        attribute: SecurityAttribute,
        subject: &Subject<'_>,
        principal: Option<&Principal>,
    ) -> Vote;
}

/// Which checks the voter manager runs.
#[derive(Debug, Clone, Default)]
pub struct SecurityConfig {
    pub operation_enabled: bool,
    pub field_enabled: bool,
    pub allow_if_all_abstain: bool,
}

impl From<&Config> for SecurityConfig {
    fn from(config: &Config) -> Self {
        Self {
            operation_enabled: config.operation_security,
            field_enabled: config.field_security,
            allow_if_all_abstain: config.allow_if_all_abstain,
        }
    }
}

/// [SecurityManager] deciding through a list of voters.
pub struct VoterSecurityManager {
    config: SecurityConfig,
    voters: Vec<Arc<dyn Voter>>,
}

impl VoterSecurityManager {
    pub fn new(config: SecurityConfig) -> Self {
        Self {
            config,
            voters: Vec::new(),
        }
    }

    pub fn with_voter(mut self, voter: impl Voter + 'static) -> Self {
        self.voters.push(Arc::new(voter));
        self
    }

    fn decide(
        &self,
        attribute: SecurityAttribute,
        subject: Subject<'_>,
        principal: Option<&Principal>,
    ) -> bool {
        let mut denied = 0;
        for voter in &self.voters {
            match voter.vote(attribute, &subject, principal) {
                Vote::Granted => return true,
                Vote::Denied => denied += 1,
                Vote::Abstain => {}
            }
        }
        if denied > 0 {
            return false;
        }
        self.config.allow_if_all_abstain
    }
}

impl SecurityManager for VoterSecurityManager {
    fn is_security_enabled_for(&self, attribute: SecurityAttribute) -> bool {
        match attribute {
            SecurityAttribute::ResolveRootOperation => self.config.operation_enabled,
            SecurityAttribute::ResolveField => self.config.field_enabled,
        }
    }

    fn is_granted_to_operation_resolve(&self, query: &FieldNode, ctx: &ExecutionContext) -> bool {
        self.decide(
            SecurityAttribute::ResolveRootOperation,
            Subject::Operation(query),
            ctx.principal(),
        )
    }

    fn is_granted_to_field_resolve(&self, info: &ResolveInfo) -> bool {
        self.decide(
            SecurityAttribute::ResolveField,
            Subject::Field(info),
            info.context().principal(),
        )
    }
}

/// Grants authenticated callers and denies anonymous ones for one attribute.
pub struct AuthenticatedVoter {
    attribute: SecurityAttribute,
}

impl AuthenticatedVoter {
    pub fn new(attribute: SecurityAttribute) -> Self {
        Self { attribute }
    }
}

impl Voter for AuthenticatedVoter {
    fn vote(
        &self,
        attribute: SecurityAttribute,
        _subject: &Subject<'_>,
        principal: Option<&Principal>,
    ) -> Vote {
        if attribute != self.attribute {
            return Vote::Abstain;
        }
        match principal {
            Some(_) => Vote::Granted,
            None => Vote::Denied,
        }
    }
}

/// Requires a role for specific targets (`me`, `User.email`); abstains elsewhere.
#[derive(Default)]
pub struct RoleVoter {
    required: HashMap<String, String>,
}

impl RoleVoter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(mut self, target: impl Into<String>, role: impl Into<String>) -> Self {
        self.required.insert(target.into(), role.into());
        self
    }
}

impl Voter for RoleVoter {
    fn vote(
        &self,
        _attribute: SecurityAttribute,
        subject: &Subject<'_>,
        principal: Option<&Principal>,
    ) -> Vote {
        let Some(role) = self.required.get(&subject.target()) else {
            return Vote::Abstain;
        };
        match principal {
            Some(p) if p.has_role(role) => Vote::Granted,
            _ => Vote::Denied,
        }
    }
}
