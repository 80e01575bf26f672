use crate::domain::model::MigrationStatistics;
use crate::utils::error::{MigrationError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 三條遷移管線，各自有獨立的 base path 與階段組合
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum Pipeline {
    Incoming,
    Outgoing,
    Internal,
}

/// 遷移階段，順序即儀表板上的卡片順序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    PrepareData,
    Creation,
    Assignment,
    Approval,
    BusinessLog,
    Comment,
    Closing,
}

const INCOMING_PHASES: &[Phase] = &[
    Phase::PrepareData,
    Phase::Creation,
    Phase::Assignment,
    Phase::BusinessLog,
    Phase::Comment,
    Phase::Closing,
];

const OUTGOING_PHASES: &[Phase] = &[
    Phase::PrepareData,
    Phase::Creation,
    Phase::Assignment,
    Phase::Approval,
    Phase::BusinessLog,
    Phase::Comment,
    Phase::Closing,
];

const INTERNAL_PHASES: &[Phase] = &[
    Phase::PrepareData,
    Phase::Creation,
    Phase::Assignment,
    Phase::Approval,
    Phase::BusinessLog,
    Phase::Closing,
];

impl Pipeline {
    pub const ALL: [Pipeline; 3] = [Pipeline::Incoming, Pipeline::Outgoing, Pipeline::Internal];

    /// `{origin}/api/` 之後的路徑片段
    pub fn path_segment(&self) -> &'static str {
        match self {
            Pipeline::Incoming => "incoming-migration",
            Pipeline::Outgoing => "outgoing-migration",
            Pipeline::Internal => "internal-migration",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Pipeline::Incoming => "Incoming",
            Pipeline::Outgoing => "Outgoing",
            Pipeline::Internal => "Internal",
        }
    }

    pub fn phases(&self) -> &'static [Phase] {
        match self {
            Pipeline::Incoming => INCOMING_PHASES,
            Pipeline::Outgoing => OUTGOING_PHASES,
            Pipeline::Internal => INTERNAL_PHASES,
        }
    }

    pub fn supports(&self, phase: Phase) -> bool {
        self.phases().contains(&phase)
    }

    /// 不支援的階段在發出請求前就擋下
    pub fn ensure_supports(&self, phase: Phase) -> Result<()> {
        if self.supports(phase) {
            Ok(())
        } else {
            Err(MigrationError::ValidationError {
                message: format!(
                    "The {} pipeline has no '{}' phase",
                    self.label().to_lowercase(),
                    phase
                ),
            })
        }
    }

    pub fn phase_description(&self, phase: Phase) -> &'static str {
        match (self, phase) {
            (Pipeline::Incoming, Phase::PrepareData) => {
                "Select and prepare incoming correspondences for migration"
            }
            (Pipeline::Outgoing, Phase::PrepareData) => {
                "Select and prepare outgoing correspondences for migration"
            }
            (Pipeline::Internal, Phase::PrepareData) => {
                "Select and prepare internal correspondences for migration"
            }
            (Pipeline::Incoming, Phase::Creation) => {
                "Create correspondences in destination system with attachments"
            }
            (Pipeline::Outgoing, Phase::Creation) => {
                "Create outgoing correspondences in destination system with attachments"
            }
            (Pipeline::Internal, Phase::Creation) => {
                "Create internal correspondences with attachments"
            }
            (Pipeline::Incoming, Phase::Assignment) => {
                "Assign correspondences to users and departments"
            }
            (Pipeline::Outgoing, Phase::Assignment) => {
                "Assign outgoing correspondences to users and departments"
            }
            (Pipeline::Internal, Phase::Assignment) => {
                "Create readonly assignments for internal correspondences"
            }
            (Pipeline::Internal, Phase::Approval) => {
                "Approve, register and send internal correspondences"
            }
            (_, Phase::Approval) => "Approve and register outgoing correspondences",
            (_, Phase::BusinessLog) => "Process business logic and workflows",
            (_, Phase::Comment) => "Process comments and annotations",
            (Pipeline::Incoming, Phase::Closing) => {
                "Close correspondences that need to be archived"
            }
            (Pipeline::Outgoing, Phase::Closing) => {
                "Close outgoing correspondences that need archiving"
            }
            (Pipeline::Internal, Phase::Closing) => {
                "Close internal correspondences that need archiving"
            }
        }
    }
}

impl Phase {
    /// 觸發階段與查詢明細時使用的路徑
    pub fn path(&self) -> &'static str {
        match self {
            Phase::PrepareData => "prepare-data",
            Phase::Creation => "creation",
            Phase::Assignment => "assignment",
            Phase::Approval => "approval",
            Phase::BusinessLog => "business-log",
            Phase::Comment => "comment",
            Phase::Closing => "closing",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Phase::PrepareData => "Prepare Data",
            Phase::Creation => "Creation",
            Phase::Assignment => "Assignment",
            Phase::Approval => "Approval",
            Phase::BusinessLog => "Business Log",
            Phase::Comment => "Comment",
            Phase::Closing => "Closing",
        }
    }

    /// `execute-specific` 請求體中的 GUID 欄位；prepare-data 沒有此端點
    pub fn id_field(&self) -> Option<&'static str> {
        match self {
            Phase::PrepareData => None,
            Phase::Creation | Phase::Approval | Phase::Closing => Some("correspondenceGuids"),
            Phase::Assignment | Phase::BusinessLog => Some("transactionGuids"),
            Phase::Comment => Some("commentGuids"),
        }
    }

    /// 除 status/search 之外，各階段明細端點額外接受的篩選參數
    pub fn extra_filter(&self) -> Option<&'static str> {
        match self {
            Phase::Approval => Some("step"),
            Phase::Closing => Some("needToClose"),
            Phase::Comment => Some("commentType"),
            _ => None,
        }
    }

    pub fn statistics_count(&self, stats: &MigrationStatistics) -> u64 {
        match self {
            Phase::PrepareData => stats.prepare_data,
            Phase::Creation => stats.creation,
            Phase::Assignment => stats.assignment,
            Phase::Approval => stats.approval,
            Phase::BusinessLog => stats.business_log,
            Phase::Comment => stats.comment,
            Phase::Closing => stats.closing,
        }
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Pipeline::Incoming => "incoming",
            Pipeline::Outgoing => "outgoing",
            Pipeline::Internal => "internal",
        })
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Phase {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self> {
        let phase = match s.trim().to_lowercase().replace('_', "-").as_str() {
            "prepare-data" => Phase::PrepareData,
            "creation" => Phase::Creation,
            "assignment" => Phase::Assignment,
            "approval" => Phase::Approval,
            "business-log" => Phase::BusinessLog,
            "comment" => Phase::Comment,
            "closing" => Phase::Closing,
            other => {
                return Err(MigrationError::ValidationError {
                    message: format!("Unknown phase: {}", other),
                })
            }
        };
        Ok(phase)
    }
}

/// 階段卡片的顯示狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseStatus {
    Pending,
    Running,
    Completed,
    Error,
}

impl PhaseStatus {
    pub fn icon(&self) -> &'static str {
        match self {
            PhaseStatus::Completed => "✓",
            PhaseStatus::Running => "⟳",
            PhaseStatus::Error => "✗",
            PhaseStatus::Pending => "○",
        }
    }

    pub fn button_text(&self) -> &'static str {
        match self {
            PhaseStatus::Running => "Running...",
            PhaseStatus::Completed => "Re-run Phase",
            PhaseStatus::Error => "Retry Phase",
            PhaseStatus::Pending => "Execute Phase",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PhaseStatus::Pending => "pending",
            PhaseStatus::Running => "running",
            PhaseStatus::Completed => "completed",
            PhaseStatus::Error => "error",
        }
    }
}
