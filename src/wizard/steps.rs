// src/wizard/steps.rs
//! Builder steps, client-side routes and back/next navigation

use std::fmt;

use crate::types::resume::Section;

pub const LANDING_PATH: &str = "/";
pub const TEMPLATES_PATH: &str = "/templates";
pub const BUILDER_PREFIX: &str = "/builder";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WizardStep {
    Contacts,
    Experience,
    Education,
    Skills,
    Certificates,
    Summary,
    JobDescription,
    Finalize,
}

impl WizardStep {
    pub const ALL: [WizardStep; 8] = [
        WizardStep::Contacts,
        WizardStep::Experience,
        WizardStep::Education,
        WizardStep::Skills,
        WizardStep::Certificates,
        WizardStep::Summary,
        WizardStep::JobDescription,
        WizardStep::Finalize,
    ];

    pub fn first() -> Self {
        Self::ALL[0]
    }

    pub fn last() -> Self {
        Self::ALL[Self::ALL.len() - 1]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn previous(self) -> Option<Self> {
        self.index()
            .checked_sub(1)
            .and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn slug(self) -> &'static str {
        match self {
            WizardStep::Contacts => "contacts",
            WizardStep::Experience => "experience",
            WizardStep::Education => "education",
            WizardStep::Skills => "skills",
            WizardStep::Certificates => "certificates",
            WizardStep::Summary => "summary",
            WizardStep::JobDescription => "job-description",
            WizardStep::Finalize => "finalize",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::Contacts => "Contact details",
            WizardStep::Experience => "Work experience",
            WizardStep::Education => "Education",
            WizardStep::Skills => "Skills & languages",
            WizardStep::Certificates => "Certificates",
            WizardStep::Summary => "Professional summary",
            WizardStep::JobDescription => "Target job",
            WizardStep::Finalize => "Review & finalize",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|step| step.slug() == slug)
    }

    pub fn path(self) -> String {
        format!("{}/{}", BUILDER_PREFIX, self.slug())
    }

    /// Document sections edited on this step; the first one is the default
    /// target for add/remove.
    pub fn sections(self) -> &'static [Section] {
        match self {
            WizardStep::Contacts => &[Section::Contacts],
            WizardStep::Experience => &[Section::Experience],
            WizardStep::Education => &[Section::Education],
            WizardStep::Skills => &[Section::Skills, Section::Languages],
            WizardStep::Certificates => &[Section::Certifications],
            WizardStep::Summary => &[Section::Summary],
            WizardStep::JobDescription | WizardStep::Finalize => &[],
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Landing,
    Templates,
    Builder(WizardStep),
}

impl Route {
    /// Map a navigation path to a route; anything unknown lands on `/`.
    pub fn resolve(path: &str) -> Route {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim();
        let path = path.trim_end_matches('/');

        if path.is_empty() {
            return Route::Landing;
        }
        if path == TEMPLATES_PATH {
            return Route::Templates;
        }

        path.strip_prefix(BUILDER_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
            .and_then(WizardStep::from_slug)
            .map_or(Route::Landing, Route::Builder)
    }

    pub fn path(&self) -> String {
        match self {
            Route::Landing => LANDING_PATH.to_string(),
            Route::Templates => TEMPLATES_PATH.to_string(),
            Route::Builder(step) => step.path(),
        }
    }
}

/// Tracks the current location and derives the active step from it.
#[derive(Debug, Clone)]
pub struct Navigator {
    route: Route,
}

impl Default for Navigator {
    fn default() -> Self {
        Self {
            route: Route::Builder(WizardStep::first()),
        }
    }
}

impl Navigator {
    pub fn at(path: &str) -> Self {
        Self {
            route: Route::resolve(path),
        }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn location(&self) -> String {
        self.route.path()
    }

    pub fn current_step(&self) -> Option<WizardStep> {
        match self.route {
            Route::Builder(step) => Some(step),
            _ => None,
        }
    }

    pub fn navigate(&mut self, path: &str) -> Route {
        self.route = Route::resolve(path);
        self.route
    }

    /// Returns whether the location changed.
    pub fn next(&mut self) -> bool {
        match self.current_step().and_then(WizardStep::next) {
            Some(step) => {
                self.route = Route::Builder(step);
                true
            }
            None => false,
        }
    }

    pub fn back(&mut self) -> bool {
        match self.current_step().and_then(WizardStep::previous) {
            Some(step) => {
                self.route = Route::Builder(step);
                true
            }
            None => false,
        }
    }

    /// 1-based position and total, while on a builder step.
    pub fn progress(&self) -> Option<(usize, usize)> {
        self.current_step()
            .map(|step| (step.index() + 1, WizardStep::ALL.len()))
    }
}
