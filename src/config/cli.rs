use super::settings::{Settings, SettingsOverrides};
use crate::domain::phase::{Phase, Pipeline};
use crate::utils::error::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "migration-console")]
#[command(about = "Operator console for the correspondence migration backend")]
pub struct CliConfig {
    /// 後端來源，例如 http://localhost:8080/data-import；未指定時讀 `API_BASE_URL`
    #[arg(long, global = true)]
    pub api_base_url: Option<String>,

    #[arg(long, global = true, help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true)]
    pub timeout_seconds: Option<u64>,

    #[arg(long, global = true)]
    pub page_size: Option<u32>,

    #[arg(long, short = 'y', global = true, help = "Answer yes to every confirmation")]
    pub yes: bool,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// 階段卡片與統計
    Dashboard {
        #[arg(value_enum)]
        pipeline: Pipeline,
        /// 依刷新間隔持續重繪，Ctrl-C 結束
        #[arg(long)]
        watch: bool,
    },
    /// 執行整個階段
    Run {
        #[arg(value_enum)]
        pipeline: Pipeline,
        #[arg(value_enum)]
        phase: Phase,
    },
    RetryFailed {
        #[arg(value_enum)]
        pipeline: Pipeline,
    },
    Stats {
        #[arg(value_enum)]
        pipeline: Pipeline,
    },
    /// 列出明細，可匯出成 CSV
    Details {
        #[arg(value_enum)]
        pipeline: Pipeline,
        #[arg(value_enum)]
        phase: Phase,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value = "all")]
        status: String,
        #[arg(long, default_value = "")]
        search: String,
        /// step / needToClose / commentType
        #[arg(long, default_value = "all")]
        filter: String,
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// 針對指定 GUID 執行階段
    Execute {
        #[arg(value_enum)]
        pipeline: Pipeline,
        #[arg(value_enum)]
        phase: Phase,
        #[arg(required = true)]
        guids: Vec<String>,
    },
    /// 互動式瀏覽明細；一般輸入為搜尋字串，`:help` 列出指令
    Browse {
        #[arg(value_enum)]
        pipeline: Pipeline,
        #[arg(value_enum)]
        phase: Phase,
    },
    Import {
        #[command(subcommand)]
        target: ImportTarget,
    },
    /// 各基本資料的筆數
    Counts,
    CorrespondenceStatus,
    CorrespondenceRelated {
        guid: String,
    },
    RetryCorrespondenceImports,
    ResetCorrespondence {
        guid: String,
    },
    Health,
}

#[derive(Debug, Clone, Subcommand)]
pub enum ImportTarget {
    Entity { name: String },
    Basic,
    Correspondences,
    AllRelated,
    Related { entity: String, doc_guid: String },
    ExternalAgencies,
    UsersToDestination,
}

impl CliConfig {
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            api_base_url: self
                .api_base_url
                .clone()
                .filter(|url| !url.trim().is_empty()),
            timeout_seconds: self.timeout_seconds,
            page_size: self.page_size,
        }
    }

    pub fn settings(&self) -> Result<Settings> {
        Settings::load(&self.overrides(), self.config.as_deref())
    }
}
