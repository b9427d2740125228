use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::graph::NodeKind;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphSettings {
    /// Zoom scale below which labels start fading out.
    pub text_fade_threshold: f32,
    pub node_size: f32,
    pub line_thickness: f32,
    pub center_force: f32,
    pub repel_force: f32,
    pub link_force: f32,
    pub link_distance: f32,
    pub show_initiatives: bool,
    pub show_operations: bool,
    pub show_milestones: bool,
    pub show_tasks: bool,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            text_fade_threshold: 0.7,
            node_size: 1.0,
            line_thickness: 1.0,
            center_force: 0.1,
            repel_force: 1.0,
            link_force: 1.0,
            link_distance: 80.0,
            show_initiatives: true,
            show_operations: true,
            show_milestones: true,
            show_tasks: true,
        }
    }
}

impl GraphSettings {
    pub const TEXT_FADE_RANGE: RangeInclusive<f32> = 0.1..=2.0;
    pub const NODE_SIZE_RANGE: RangeInclusive<f32> = 0.2..=4.0;
    pub const LINE_THICKNESS_RANGE: RangeInclusive<f32> = 0.1..=6.0;
    pub const CENTER_FORCE_RANGE: RangeInclusive<f32> = 0.0..=1.0;
    pub const REPEL_FORCE_RANGE: RangeInclusive<f32> = 0.0..=5.0;
    pub const LINK_FORCE_RANGE: RangeInclusive<f32> = 0.0..=3.0;
    pub const LINK_DISTANCE_RANGE: RangeInclusive<f32> = 10.0..=400.0;

    pub fn shows(&self, kind: NodeKind) -> bool {
        match kind {
            NodeKind::Initiative => self.show_initiatives,
            NodeKind::Operation => self.show_operations,
            NodeKind::Milestone => self.show_milestones,
            NodeKind::Task => self.show_tasks,
        }
    }

    pub fn show_mut(&mut self, kind: NodeKind) -> &mut bool {
        match kind {
            NodeKind::Initiative => &mut self.show_initiatives,
            NodeKind::Operation => &mut self.show_operations,
            NodeKind::Milestone => &mut self.show_milestones,
            NodeKind::Task => &mut self.show_tasks,
        }
    }

    /// Pulls hand-edited values back into the ranges the controls offer.
    /// Non-finite numbers fall back to their defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let fix = |value: f32, fallback: f32, range: RangeInclusive<f32>| {
            if value.is_finite() {
                value.clamp(*range.start(), *range.end())
            } else {
                fallback
            }
        };

        self.text_fade_threshold = fix(
            self.text_fade_threshold,
            defaults.text_fade_threshold,
            Self::TEXT_FADE_RANGE,
        );
        self.node_size = fix(self.node_size, defaults.node_size, Self::NODE_SIZE_RANGE);
        self.line_thickness = fix(
            self.line_thickness,
            defaults.line_thickness,
            Self::LINE_THICKNESS_RANGE,
        );
        self.center_force = fix(self.center_force, defaults.center_force, Self::CENTER_FORCE_RANGE);
        self.repel_force = fix(self.repel_force, defaults.repel_force, Self::REPEL_FORCE_RANGE);
        self.link_force = fix(self.link_force, defaults.link_force, Self::LINK_FORCE_RANGE);
        self.link_distance = fix(
            self.link_distance,
            defaults.link_distance,
            Self::LINK_DISTANCE_RANGE,
        );
        self
    }
}

/// Load-at-startup / save-on-change persistence for [`GraphSettings`].
#[derive(Clone, Debug)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn try_load(&self) -> Result<Option<GraphSettings>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read settings from {}", self.path.display()))?;
        let settings: GraphSettings = serde_json::from_str(&raw)
            .with_context(|| format!("invalid settings JSON in {}", self.path.display()))?;
        Ok(Some(settings.sanitized()))
    }

    /// Missing or malformed files yield the defaults.
    pub fn load(&self) -> GraphSettings {
        match self.try_load() {
            Ok(Some(settings)) => {
                tracing::info!(path = %self.path.display(), "loaded graph settings");
                settings
            }
            Ok(None) => {
                tracing::debug!(path = %self.path.display(), "no settings file, using defaults");
                GraphSettings::default()
            }
            Err(error) => {
                tracing::warn!("{error:#}; falling back to default graph settings");
                GraphSettings::default()
            }
        }
    }

    pub fn save(&self, settings: &GraphSettings) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let raw = serde_json::to_string_pretty(settings).context("failed to encode settings")?;
        fs::write(&self.path, raw)
            .with_context(|| format!("failed to write settings to {}", self.path.display()))
    }
}
