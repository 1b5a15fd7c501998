//! # Render Context
//!
//! The context every template resource is rendered against. It is seeded
//! with the user's static properties, carries the eagerly computed scalars
//! (`project`, `presentYear`, `projectTimespan`, `locator`), and exposes
//! two *lazily computed* entries:
//!
//! - `projects`: the resolved, supplement-merged dependency projects, in
//!   coordinate order;
//! - `projectsSortedByOrganization`: the same projects grouped by
//!   organization, unknown organization last.
//!
//! Both keys are enumerable before their value exists; the first read
//! triggers a single computation behind a `OnceLock`, so the expensive
//! dependency walk happens at most once per run no matter how many reads
//! race for it, and every subsequent read observes the same cached value.
//!
//! Because the template engine consumes a fully materialized context, a
//! per-template context is built with [`RenderContext::tera_context_for`]:
//! the lazy entries are materialized only when the template source
//! mentions them, which preserves the laziness for runs whose templates
//! never list dependencies.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, Utc};
use log::{debug, warn};
use serde_json::Value;

use crate::model::ProjectModel;
use crate::projects::{group_by_organization, OrganizationGroup};

/// Lazy context key: the dependency project list.
pub const KEY_PROJECTS: &str = "projects";
/// Lazy context key: dependency projects grouped by organization.
pub const KEY_PROJECTS_ORGS: &str = "projectsSortedByOrganization";

/// Offset the present year is computed in, fixed so a given timestamp
/// renders identically on every machine.
const YEAR_ZONE_OFFSET_SECONDS: i32 = 10 * 3600;

/// Source of the lazily computed dependency projects.
pub trait DependencyProjectsSource: Send + Sync {
    /// Resolve, build and supplement-merge the dependency projects.
    /// Per-dependency failures are handled (and logged) by the
    /// implementation; the computation itself is total.
    fn dependency_projects(&self) -> Vec<ProjectModel>;
}

/// An empty dependency set, for runs with no dependency reporting.
pub struct NoDependencies;

impl DependencyProjectsSource for NoDependencies {
    fn dependency_projects(&self) -> Vec<ProjectModel> {
        Vec::new()
    }
}

struct LazyProjects {
    projects: Value,
    by_organization: Value,
}

/// Name -> value mapping handed to the template engine.
pub struct RenderContext {
    entries: BTreeMap<String, Value>,
    source: Box<dyn DependencyProjectsSource>,
    lazy: OnceLock<LazyProjects>,
}

impl RenderContext {
    /// Build the context for one run.
    pub fn build(
        properties: &BTreeMap<String, String>,
        project: &ProjectModel,
        locator_paths: Vec<String>,
        output_timestamp: Option<&str>,
        source: Box<dyn DependencyProjectsSource>,
    ) -> Self {
        let mut entries: BTreeMap<String, Value> = properties
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();

        let year = present_year(output_timestamp);
        let inception = match &project.inception_year {
            Some(inception) if !inception.is_empty() => inception.clone(),
            _ => {
                debug!("inceptionYear not specified, defaulting to {}", year);
                year.clone()
            }
        };
        let timespan = if inception == year {
            year.clone()
        } else {
            format!("{}-{}", inception, year)
        };

        entries.insert(
            "project".to_string(),
            serde_json::to_value(project).unwrap_or(Value::Null),
        );
        entries.insert("presentYear".to_string(), Value::String(year));
        entries.insert("projectTimespan".to_string(), Value::String(timespan));
        entries.insert(
            "locator".to_string(),
            Value::Array(locator_paths.into_iter().map(Value::String).collect()),
        );

        Self {
            entries,
            source,
            lazy: OnceLock::new(),
        }
    }

    /// Every key of the context, the lazy keys included whether or not
    /// their value has been computed yet.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.keys().cloned().collect();
        keys.push(KEY_PROJECTS.to_string());
        keys.push(KEY_PROJECTS_ORGS.to_string());
        keys
    }

    pub fn contains_key(&self, key: &str) -> bool {
        key == KEY_PROJECTS || key == KEY_PROJECTS_ORGS || self.entries.contains_key(key)
    }

    /// Value of a key. Reading a lazy key triggers the at-most-once
    /// dependency computation.
    pub fn get(&self, key: &str) -> Option<Value> {
        match key {
            KEY_PROJECTS => Some(self.lazy_projects().projects.clone()),
            KEY_PROJECTS_ORGS => Some(self.lazy_projects().by_organization.clone()),
            _ => self.entries.get(key).cloned(),
        }
    }

    /// Materialize a `tera` context for one template. The lazy entries are
    /// included only when the source text mentions them; `KEY_PROJECTS` is
    /// a prefix of `KEY_PROJECTS_ORGS`, so one scan covers both.
    pub fn tera_context_for(&self, template_source: &str) -> tera::Context {
        let mut context = tera::Context::new();
        for (key, value) in &self.entries {
            context.insert(key, value);
        }
        if template_source.contains(KEY_PROJECTS) {
            let lazy = self.lazy_projects();
            context.insert(KEY_PROJECTS, &lazy.projects);
            context.insert(KEY_PROJECTS_ORGS, &lazy.by_organization);
        }
        context
    }

    fn lazy_projects(&self) -> &LazyProjects {
        self.lazy.get_or_init(|| {
            debug!("Computing dependency projects for the rendering context");
            let projects = self.source.dependency_projects();
            let groups: Vec<OrganizationGroup> = group_by_organization(&projects);
            LazyProjects {
                projects: serde_json::to_value(&projects).unwrap_or_else(|e| {
                    warn!("Could not serialize dependency projects: {}", e);
                    Value::Array(Vec::new())
                }),
                by_organization: serde_json::to_value(&groups).unwrap_or_else(|e| {
                    warn!("Could not serialize organization groups: {}", e);
                    Value::Array(Vec::new())
                }),
            }
        })
    }
}

/// The 4-digit present year: derived from the reproducible output
/// timestamp when one is configured (ISO-8601 or integer epoch seconds),
/// else from the current instant, always interpreted at the fixed UTC+10
/// offset so output is machine-independent for a given timestamp.
pub fn present_year(output_timestamp: Option<&str>) -> String {
    let instant = output_timestamp
        .and_then(parse_build_timestamp)
        .unwrap_or_else(Utc::now);

    let offset =
        FixedOffset::east_opt(YEAR_ZONE_OFFSET_SECONDS).expect("constant offset is in range");
    instant.with_timezone(&offset).format("%Y").to_string()
}

fn parse_build_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.len() <= 1 {
        return None;
    }

    if let Ok(epoch) = trimmed.parse::<i64>() {
        return DateTime::from_timestamp(epoch, 0);
    }

    match DateTime::parse_from_rfc3339(trimmed) {
        Ok(parsed) => Some(parsed.with_timezone(&Utc)),
        Err(e) => {
            warn!("Ignoring unparseable output timestamp '{}': {}", raw, e);
            None
        }
    }
}
