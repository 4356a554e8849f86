use crate::error::{Result, TourError};
use crate::paths::validate_tour_id;
use crate::types::{Category, Placement, StepTarget};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// StepHook
// ---------------------------------------------------------------------------

pub type HookFuture = BoxFuture<'static, Result<()>>;

/// Side effect run before a step is shown or after it is left, e.g. opening
/// the panel a step's anchor lives in. Hooks are code, not content, so they
/// are attached after the registry is loaded and never serialized.
#[derive(Clone)]
pub struct StepHook(Arc<dyn Fn() -> HookFuture + Send + Sync>);

impl StepHook {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self(Arc::new(move || f().boxed()))
    }

    pub fn call(&self) -> HookFuture {
        (self.0)()
    }
}

impl fmt::Debug for StepHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StepHook(..)")
    }
}

// ---------------------------------------------------------------------------
// StepDefinition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepDefinition {
    pub target: StepTarget,
    /// Localization key for the tooltip title.
    pub title: String,
    /// Localization key for the tooltip body.
    pub content: String,
    #[serde(default)]
    pub placement: Placement,
    #[serde(default = "default_spotlight_padding")]
    pub spotlight_padding: u32,
    #[serde(default)]
    pub disable_interaction: bool,
    #[serde(skip)]
    pub before_step: Option<StepHook>,
    #[serde(skip)]
    pub after_step: Option<StepHook>,
}

fn default_spotlight_padding() -> u32 {
    8
}

impl StepDefinition {
    pub fn new(
        target: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            target: StepTarget::from(target.into()),
            title: title.into(),
            content: content.into(),
            placement: Placement::default(),
            spotlight_padding: default_spotlight_padding(),
            disable_interaction: false,
            before_step: None,
            after_step: None,
        }
    }

    pub fn with_before_step(mut self, hook: StepHook) -> Self {
        self.before_step = Some(hook);
        self
    }

    pub fn with_after_step(mut self, hook: StepHook) -> Self {
        self.after_step = Some(hook);
        self
    }
}

// ---------------------------------------------------------------------------
// TourDefinition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TourDefinition {
    pub id: String,
    pub category: Category,
    /// Role tags allowed to see this tour. `None` means every role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<BTreeSet<String>>,
    /// Page the tour belongs to. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(default)]
    pub steps: Vec<StepDefinition>,
}

impl TourDefinition {
    pub fn new(id: impl Into<String>, category: Category) -> Self {
        Self {
            id: id.into(),
            category,
            roles: None,
            page: None,
            steps: Vec::new(),
        }
    }

    pub fn with_steps(mut self, steps: Vec<StepDefinition>) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = Some(roles.into_iter().map(Into::into).collect());
        self
    }

    /// A tour without a role restriction is available to everyone. A
    /// restricted tour requires a matching role.
    pub fn available_to(&self, role: Option<&str>) -> bool {
        match (&self.roles, role) {
            (None, _) => true,
            (Some(roles), Some(r)) => roles.contains(r),
            (Some(_), None) => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryWarning {
    pub tour_id: String,
    pub message: String,
}

/// Ordered, read-only catalog of tour definitions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    pub tours: Vec<TourDefinition>,
}

impl Registry {
    pub fn new(tours: Vec<TourDefinition>) -> Self {
        Self { tours }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let registry: Registry = serde_yaml::from_str(&data)?;
        Ok(registry)
    }

    pub fn get(&self, id: &str) -> Option<&TourDefinition> {
        self.tours.iter().find(|t| t.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.tours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tours.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TourDefinition> {
        self.tours.iter()
    }

    /// The subset of tours visible to `role`, in registry order.
    pub fn for_role(&self, role: Option<&str>) -> Registry {
        Registry::new(
            self.tours
                .iter()
                .filter(|t| t.available_to(role))
                .cloned()
                .collect(),
        )
    }

    pub fn attach_before_step(&mut self, tour_id: &str, index: usize, hook: StepHook) -> Result<()> {
        self.step_mut(tour_id, index)?.before_step = Some(hook);
        Ok(())
    }

    pub fn attach_after_step(&mut self, tour_id: &str, index: usize, hook: StepHook) -> Result<()> {
        self.step_mut(tour_id, index)?.after_step = Some(hook);
        Ok(())
    }

    fn step_mut(&mut self, tour_id: &str, index: usize) -> Result<&mut StepDefinition> {
        self.tours
            .iter_mut()
            .find(|t| t.id == tour_id)
            .and_then(|t| t.steps.get_mut(index))
            .ok_or_else(|| TourError::TourNotFound(format!("{tour_id} (step {index})")))
    }

    pub fn validate(&self) -> Vec<RegistryWarning> {
        let mut warnings = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();

        for tour in &self.tours {
            if !seen.insert(tour.id.as_str()) {
                warnings.push(RegistryWarning {
                    tour_id: tour.id.clone(),
                    message: "duplicate tour id; only the first definition is reachable"
                        .to_string(),
                });
            }
            if validate_tour_id(&tour.id).is_err() {
                warnings.push(RegistryWarning {
                    tour_id: tour.id.clone(),
                    message: "tour id is not a lowercase hyphenated slug".to_string(),
                });
            }
            if tour.steps.is_empty() {
                warnings.push(RegistryWarning {
                    tour_id: tour.id.clone(),
                    message: "tour has no steps and can never be shown".to_string(),
                });
            }
            if let Some(roles) = &tour.roles {
                if roles.is_empty() {
                    warnings.push(RegistryWarning {
                        tour_id: tour.id.clone(),
                        message: "empty role list hides the tour from every role".to_string(),
                    });
                }
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
