//! Generation client: prompt construction per mode and the transport to
//! the generative text service.

pub mod client;
pub mod prompt;

use std::fmt;
use std::str::FromStr;

pub use client::{GenerationError, Generator, GeneratorConfig, OpenAiGenerator};
pub use prompt::{
    DraftBriefInput, PlanRequestInput, ProjectSnapshot, SnapshotPhase, SnapshotTask,
    build_doc_tex_prompt, build_draft_brief_prompt, build_plan_from_brief_prompt,
    build_replan_prompt, build_risks_prompt, build_spec_prompt,
};

/// The six prompt kinds the service is called with.
///
/// `PlanFromBrief` and `Replan` are JSON-producing modes whose output must
/// go through the plan validator; the rest return free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    DraftBrief,
    PlanFromBrief,
    Replan,
    Risks,
    Spec,
    DocTex,
}

impl PromptMode {
    /// True when this mode's output must parse as a plan.
    pub fn produces_json(self) -> bool {
        matches!(self, Self::PlanFromBrief | Self::Replan)
    }
}

impl fmt::Display for PromptMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::DraftBrief => "draft-brief",
            Self::PlanFromBrief => "plan-from-brief",
            Self::Replan => "replan",
            Self::Risks => "risks",
            Self::Spec => "spec",
            Self::DocTex => "doc-tex",
        };
        f.write_str(s)
    }
}

impl FromStr for PromptMode {
    type Err = PromptModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft-brief" => Ok(Self::DraftBrief),
            "plan-from-brief" => Ok(Self::PlanFromBrief),
            "replan" => Ok(Self::Replan),
            "risks" => Ok(Self::Risks),
            "spec" => Ok(Self::Spec),
            "doc-tex" => Ok(Self::DocTex),
            other => Err(PromptModeParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`PromptMode`] string.
#[derive(Debug, Clone)]
pub struct PromptModeParseError(pub String);

impl fmt::Display for PromptModeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid prompt mode: {:?}", self.0)
    }
}

impl std::error::Error for PromptModeParseError {}
