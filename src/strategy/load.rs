use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

use super::records::Portfolio;
use super::sample::sample_portfolio;

/// Where the host shell gets its records from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PortfolioSource {
    File(PathBuf),
    Sample { scale: usize },
}

impl PortfolioSource {
    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Sample { scale } => format!("sample portfolio (scale {scale})"),
        }
    }

    pub fn load(&self) -> Result<Portfolio> {
        let portfolio = match self {
            Self::File(path) => load_portfolio(path)?,
            Self::Sample { scale } => sample_portfolio(*scale),
        };

        if portfolio.is_empty() {
            tracing::warn!(source = %self.describe(), "portfolio has no records");
        }
        tracing::info!(
            source = %self.describe(),
            initiatives = portfolio.initiatives.len(),
            operations = portfolio.operations.len(),
            milestones = portfolio.milestones.len(),
            tasks = portfolio.tasks.len(),
            "loaded portfolio"
        );
        Ok(portfolio)
    }
}

pub fn parse_portfolio(raw: &str) -> Result<Portfolio> {
    let value: serde_json::Value = serde_json::from_str(raw).context("invalid portfolio JSON")?;
    if !value.is_object() {
        return Err(anyhow!("portfolio JSON must be an object with record collections"));
    }

    serde_json::from_value(value).context("portfolio JSON does not match the record format")
}

pub fn load_portfolio(path: &Path) -> Result<Portfolio> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read portfolio from {}", path.display()))?;
    parse_portfolio(&raw).with_context(|| format!("failed to parse {}", path.display()))
}
