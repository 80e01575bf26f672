//! 終端機介面：把各個 view-model 渲染成文字並分派子命令

use crate::adapters::{export_rows, LocalStorage};
use crate::app::dashboard::PhaseBoard;
use crate::app::data_import::{ImportBoard, CORRESPONDENCES};
use crate::app::details::DetailTable;
use crate::app::prompt::TerminalPrompter;
use crate::config::{CliConfig, Command, ImportTarget};
use crate::core::debounce::debounce;
use crate::core::{DataImportClient, MigrationClient};
use crate::domain::model::{
    ApprovalDetail, AssignmentDetail, BusinessLogDetail, ClosingDetail, CommentDetail,
    CorrespondenceImportStatistics, CorrespondenceImportStatus, CreationDetail, CreationStatistics,
    ImportResponse,
};
use crate::domain::phase::{Phase, Pipeline};
use crate::domain::ports::{ConfigProvider, DataImportBackend, MigrationBackend, Prompter};
use crate::domain::row::DetailRow;
use crate::utils::error::{MigrationError, Result};
use crate::utils::format::{status_badge, status_icon, step_display_name, step_order};
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

/// 依階段選擇明細列型別後呼叫泛型函式
macro_rules! with_detail_row {
    ($phase:expr, $func:ident ( $($arg:expr),* $(,)? )) => {
        match $phase {
            Phase::Creation => $func::<CreationDetail>($($arg),*).await,
            Phase::Assignment => $func::<AssignmentDetail>($($arg),*).await,
            Phase::BusinessLog => $func::<BusinessLogDetail>($($arg),*).await,
            Phase::Comment => $func::<CommentDetail>($($arg),*).await,
            Phase::Closing => $func::<ClosingDetail>($($arg),*).await,
            Phase::Approval => $func::<ApprovalDetail>($($arg),*).await,
            Phase::PrepareData => Err(MigrationError::ValidationError {
                message: "Prepare Data has no detail rows".to_string(),
            }),
        }
    };
}

pub async fn run(config: CliConfig) -> Result<()> {
    let settings = config.settings()?;
    tracing::debug!("Resolved settings: {:?}", settings);
    let prompter = TerminalPrompter::new(config.yes);
    let http = reqwest::Client::new();

    let migration = |pipeline: Pipeline| -> Arc<MigrationClient> {
        Arc::new(
            MigrationClient::with_client(http.clone(), &settings, pipeline)
                .with_headers(settings.headers.clone()),
        )
    };
    let data_import = || -> Arc<DataImportClient> {
        Arc::new(
            DataImportClient::with_client(http.clone(), &settings)
                .with_headers(settings.headers.clone()),
        )
    };

    match config.command {
        Command::Dashboard { pipeline, watch } => {
            dashboard(migration(pipeline), &settings, watch).await
        }
        Command::Run { pipeline, phase } => {
            pipeline.ensure_supports(phase)?;
            let mut board = PhaseBoard::new(migration(pipeline));
            board.load_statistics().await;
            if !board.can_execute_phase(phase) {
                tracing::warn!(
                    "⚠️ {} is not ready: earlier phases are incomplete or nothing is pending",
                    phase.display_name()
                );
            }
            if !prompter.confirm(&format!("Execute {} phase?", phase.display_name())) {
                return Ok(());
            }
            if let Some(response) = board.execute_phase(phase).await {
                report(&prompter, phase.display_name(), &response);
            }
            println!("{}", render_board(&board));
            Ok(())
        }
        Command::RetryFailed { pipeline } => {
            let mut board = PhaseBoard::new(migration(pipeline));
            if !prompter.confirm(&format!("Retry all failed {} migrations?", pipeline)) {
                return Ok(());
            }
            if let Some(response) = board.retry_failed().await {
                report(&prompter, "Retry", &response);
            }
            println!("{}", render_board(&board));
            Ok(())
        }
        Command::Stats { pipeline } => {
            let client = migration(pipeline);
            let stats = client.statistics().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
            let creation = client.creation_statistics().await?;
            println!("{}", render_creation_statistics(&creation));
            Ok(())
        }
        Command::Details {
            pipeline,
            phase,
            page,
            status,
            search,
            filter,
            export,
        } => {
            let options = DetailOptions {
                page,
                status,
                search,
                filter,
                export: export.as_deref(),
            };
            with_detail_row!(phase, show_details(migration(pipeline), &settings, &options))
        }
        Command::Execute {
            pipeline,
            phase,
            guids,
        } => with_detail_row!(phase, execute_guids(migration(pipeline), &guids, &prompter)),
        Command::Browse { pipeline, phase } => {
            with_detail_row!(phase, browse(migration(pipeline), &settings))
        }
        Command::Import { target } => import(data_import(), target, &prompter).await,
        Command::Counts => {
            let mut board = ImportBoard::new(data_import());
            board.load_record_counts().await;
            println!("{}", render_import_board(&board));
            Ok(())
        }
        Command::CorrespondenceStatus => {
            let client = data_import();
            let stats = client.correspondence_import_statistics().await;
            let statuses = client.correspondence_import_statuses().await;
            println!("{}", render_correspondence_status(&stats, &statuses));
            Ok(())
        }
        Command::CorrespondenceRelated { guid } => {
            let mut board = ImportBoard::new(data_import());
            let response = board.import_correspondence_related(&guid).await;
            report(&prompter, "Related data import", &response);
            Ok(())
        }
        Command::RetryCorrespondenceImports => {
            let mut board = ImportBoard::new(data_import());
            let response = board.retry_failed_correspondence_imports().await;
            report(&prompter, "Retry", &response);
            Ok(())
        }
        Command::ResetCorrespondence { guid } => {
            let mut board = ImportBoard::new(data_import());
            if let Some(response) = board.reset_correspondence_import(&guid, &prompter).await {
                report(&prompter, "Reset", &response);
            }
            Ok(())
        }
        Command::Health => {
            let health = data_import().health().await?;
            println!(
                "{} {} {} {}",
                status_icon(if health.status.eq_ignore_ascii_case("UP") {
                    "SUCCESS"
                } else {
                    "FAILED"
                }),
                health.status,
                health.service.as_deref().unwrap_or("-"),
                health.version.as_deref().unwrap_or("-"),
            );
            Ok(())
        }
    }
}

fn report(prompter: &dyn Prompter, action: &str, response: &ImportResponse) {
    if response.is_completed() {
        prompter.alert(&format!(
            "{} {}: {} ({} ok, {} failed)",
            action,
            response.status,
            response.message,
            response.successful_imports,
            response.failed_imports
        ));
    } else {
        prompter.alert(&format!("{} failed: {}", action, response.message));
    }
    for error in &response.errors {
        eprintln!("   ❌ {}", error);
    }
}

async fn dashboard(
    client: Arc<MigrationClient>,
    config: &dyn ConfigProvider,
    watch: bool,
) -> Result<()> {
    let mut board = PhaseBoard::new(client);
    board.load_statistics().await;
    println!("{}", render_board(&board));
    if !watch {
        return Ok(());
    }

    let _refresh = board.start_auto_refresh(config.refresh_interval());
    let mut updates = board.cache().subscribe();
    tracing::info!(
        "🔄 Refreshing every {}s, press Ctrl-C to stop",
        config.refresh_interval().as_secs()
    );

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                board.sync_from_cache();
                println!("{}", render_board(&board));
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}

pub fn render_board<B: MigrationBackend + 'static>(board: &PhaseBoard<B>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "📊 {} migration", board.pipeline().label());
    for card in board.cards() {
        let ready = if board.can_execute_phase(card.phase) {
            "▶"
        } else {
            " "
        };
        let _ = writeln!(
            out,
            "{} {}. {} {:<14} {:>8}  {:<10} [{}]",
            ready,
            card.order,
            card.status_icon(),
            card.name,
            card.count,
            card.status.label(),
            card.button_text()
        );
        if let Some(result) = &card.last_result {
            let _ = writeln!(out, "       {} {}", status_badge(&result.status), result.message);
        }
    }
    if let Some(stats) = board.statistics() {
        let _ = writeln!(
            out,
            "   completed {}  in progress {}  failed {}",
            stats.completed, stats.in_progress, stats.failed
        );
    }
    out
}

pub struct DetailOptions<'a> {
    pub page: u32,
    pub status: String,
    pub search: String,
    pub filter: String,
    pub export: Option<&'a Path>,
}

async fn show_details<R: DetailRow>(
    client: Arc<MigrationClient>,
    config: &dyn ConfigProvider,
    options: &DetailOptions<'_>,
) -> Result<()> {
    let mut table = DetailTable::<R, _>::new(client, config.page_size()).with_filters(
        &options.status,
        &options.filter,
        &options.search,
    );
    table.load().await?;
    if options.page > 1 {
        table.go_to_page(options.page).await?;
    }
    println!("{}", render_table(&table));

    if let Some(path) = options.export {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| MigrationError::InvalidConfigValueError {
                field: "export".to_string(),
                value: path.display().to_string(),
                reason: "Export path must name a file".to_string(),
            })?;
        let storage = LocalStorage::new(dir);
        let rows = table.visible_rows().into_iter().map(|r| &r.row);
        let count = export_rows(&storage, file_name, rows).await?;
        println!("📁 Exported {} rows to {}", count, path.display());
    }
    Ok(())
}

pub fn render_table<R: DetailRow, B: MigrationBackend>(table: &DetailTable<R, B>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "📋 {} {} details (status: {}, filter: {}, search: {:?})",
        table.pipeline().label(),
        R::PHASE.display_name(),
        table.status_filter(),
        table.extra_filter(),
        table.search_term()
    );
    let _ = writeln!(out, "    #  [ ] {}", R::headers().join(" | "));

    let rows = table.visible_rows();
    if rows.is_empty() {
        let _ = writeln!(out, "    (no rows)");
    }
    for (index, row) in rows.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {:>3}  [{}] {}",
            index + 1,
            if row.selected { "x" } else { " " },
            row.row.cells().join(" | ")
        );
    }

    let pages: Vec<String> = table
        .pagination_pages()
        .into_iter()
        .map(|page| {
            if page == table.current_page() {
                format!("[{}]", page)
            } else {
                page.to_string()
            }
        })
        .collect();
    let _ = write!(
        out,
        "  page {} of {} ({} total)  {}",
        table.current_page(),
        table.total_pages(),
        table.total_elements(),
        pages.join(" ")
    );
    if let Some(count) = table.need_to_close_count() {
        let _ = write!(out, "  need to close: {}", count);
    }
    out
}

async fn execute_guids<R: DetailRow>(
    client: Arc<MigrationClient>,
    guids: &[String],
    prompter: &dyn Prompter,
) -> Result<()> {
    client.pipeline().ensure_supports(R::PHASE)?;
    if !prompter.confirm(&format!(
        "Execute {} for {} selected {}s?",
        R::PHASE.display_name().to_lowercase(),
        guids.len(),
        R::NOUN
    )) {
        return Ok(());
    }
    let response = client.execute_specific(R::PHASE, guids).await;
    prompter.alert(&response.summary(R::PHASE.display_name(), R::NOUN));
    if !response.is_completed() {
        prompter.alert(&response.message);
    }
    Ok(())
}

const BROWSE_HELP: &str = "Type to search. Commands: :next :prev :page N :status S :filter F :clear \
:select N :all :exec :run N :retry N :help :quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Search(String),
    Next,
    Previous,
    Page(u32),
    Status(String),
    Filter(String),
    Clear,
    /// 1 起算
    Select(usize),
    SelectAll,
    ExecuteSelected,
    Run(usize),
    Retry(usize),
    Help,
    Quit,
    Unknown(String),
}

impl BrowseCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let Some(command) = line.strip_prefix(':') else {
            return BrowseCommand::Search(line.to_string());
        };
        let (name, arg) = match command.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (command, ""),
        };
        let index = || arg.parse::<usize>().ok().filter(|&i| i >= 1);

        match (name, arg) {
            ("q" | "quit", _) => BrowseCommand::Quit,
            ("next", _) => BrowseCommand::Next,
            ("prev", _) => BrowseCommand::Previous,
            ("clear", _) => BrowseCommand::Clear,
            ("all", _) => BrowseCommand::SelectAll,
            ("exec", _) => BrowseCommand::ExecuteSelected,
            ("help", _) => BrowseCommand::Help,
            ("status", value) if !value.is_empty() => BrowseCommand::Status(value.to_string()),
            ("filter", value) if !value.is_empty() => BrowseCommand::Filter(value.to_string()),
            ("page", value) => match value.parse() {
                Ok(page) => BrowseCommand::Page(page),
                Err(_) => BrowseCommand::Unknown(line.to_string()),
            },
            ("select", _) => index().map_or_else(|| BrowseCommand::Unknown(line.to_string()), BrowseCommand::Select),
            ("run", _) => index().map_or_else(|| BrowseCommand::Unknown(line.to_string()), BrowseCommand::Run),
            ("retry", _) => index().map_or_else(|| BrowseCommand::Unknown(line.to_string()), BrowseCommand::Retry),
            _ => BrowseCommand::Unknown(line.to_string()),
        }
    }
}

/// 互動式瀏覽；輸入 `:exec`、`:run`、`:retry` 本身即為確認
async fn browse<R: DetailRow>(
    client: Arc<MigrationClient>,
    config: &dyn ConfigProvider,
) -> Result<()> {
    client.pipeline().ensure_supports(R::PHASE)?;
    let prompter = TerminalPrompter::new(true);
    let mut table = DetailTable::<R, _>::new(client, config.page_size());
    table.load().await?;
    println!("{}", render_table(&table));
    println!("{}", BROWSE_HELP);

    let (search, mut debouncer) = debounce::<String>(config.search_debounce());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let command = BrowseCommand::parse(&line);
                match command {
                    BrowseCommand::Quit => break,
                    BrowseCommand::Search(term) => {
                        search.push(term);
                        continue;
                    }
                    BrowseCommand::Help => {
                        println!("{}", BROWSE_HELP);
                        continue;
                    }
                    BrowseCommand::Unknown(input) => {
                        eprintln!("❓ Unknown command: {}", input);
                        continue;
                    }
                    command => {
                        if let Err(e) = apply_browse_command(&mut table, command, &prompter).await {
                            eprintln!("❌ {}", e.user_friendly_message());
                        }
                    }
                }
                println!("{}", render_table(&table));
            }
            Some(term) = debouncer.next() => {
                if let Err(e) = apply_search(&mut table, &term).await {
                    eprintln!("❌ {}", e.user_friendly_message());
                }
                println!("{}", render_table(&table));
            }
        }
    }
    Ok(())
}

/// 防抖後的搜尋字串才會送到後端
pub async fn apply_search<R: DetailRow, B: MigrationBackend>(
    table: &mut DetailTable<R, B>,
    term: &str,
) -> Result<()> {
    tracing::debug!("Applying search {:?}", term);
    table.set_search(term).await
}

pub async fn apply_browse_command<R: DetailRow, B: MigrationBackend>(
    table: &mut DetailTable<R, B>,
    command: BrowseCommand,
    prompter: &dyn Prompter,
) -> Result<()> {
    match command {
        BrowseCommand::Next => table.go_to_page(table.current_page() + 1).await?,
        BrowseCommand::Previous => {
            table
                .go_to_page(table.current_page().saturating_sub(1))
                .await?
        }
        BrowseCommand::Page(page) => table.go_to_page(page).await?,
        BrowseCommand::Status(status) => table.set_status_filter(&status).await?,
        BrowseCommand::Filter(value) => table.set_extra_filter(&value).await?,
        BrowseCommand::Clear => table.clear_filters().await?,
        BrowseCommand::Select(row) => {
            let toggled = row
                .checked_sub(1)
                .is_some_and(|index| table.toggle_selection(index));
            if !toggled {
                prompter.alert(&format!("No row {} on this page.", row));
            }
        }
        BrowseCommand::SelectAll => table.toggle_all_selection(),
        BrowseCommand::ExecuteSelected => {
            table.execute_for_selected(prompter).await;
        }
        BrowseCommand::Run(row) => {
            if let Some(index) = row.checked_sub(1) {
                table.execute_for_single(index, prompter).await;
            }
        }
        BrowseCommand::Retry(row) => {
            if let Some(index) = row.checked_sub(1) {
                table.retry_row(index, prompter).await;
            }
        }
        BrowseCommand::Search(term) => table.set_search(&term).await?,
        BrowseCommand::Help | BrowseCommand::Quit | BrowseCommand::Unknown(_) => {}
    }
    Ok(())
}

async fn import(
    client: Arc<DataImportClient>,
    target: ImportTarget,
    prompter: &dyn Prompter,
) -> Result<()> {
    let mut board = ImportBoard::new(client);
    let response = match target {
        ImportTarget::Entity { name } => {
            if board.entity(&name).is_none() {
                return Err(MigrationError::ValidationError {
                    message: format!("Unknown entity: {}", name),
                });
            }
            board.import_entity(&name).await
        }
        ImportTarget::Basic => board.import_all_basic_entities(prompter).await,
        ImportTarget::Correspondences => board.import_entity(CORRESPONDENCES).await,
        ImportTarget::AllRelated => board.import_all_correspondences_with_related(prompter).await,
        ImportTarget::Related { entity, doc_guid } => {
            Some(board.import_related(&entity, &doc_guid).await)
        }
        ImportTarget::ExternalAgencies => Some(board.import_external_agencies().await),
        ImportTarget::UsersToDestination => Some(board.import_users_to_destination().await),
    };

    println!("{}", render_logs(&board));
    if let Some(response) = response {
        for error in &response.errors {
            eprintln!("   ❌ {}", error);
        }
    }
    Ok(())
}

pub fn render_import_board<D: DataImportBackend + 'static>(board: &ImportBoard<D>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "📦 Basic entities");
    for entity in board.basic_entities() {
        let _ = writeln!(
            out,
            "  {:>2}. {:<16} {:>8}  [{}]",
            entity.order,
            entity.name,
            entity
                .record_count
                .map_or_else(|| "-".to_string(), |c| c.to_string()),
            entity.button_text()
        );
    }
    let correspondences = board.correspondence_import();
    let _ = writeln!(
        out,
        "📄 {:<20} {:>8}  [{}]",
        correspondences.name,
        correspondences
            .record_count
            .map_or_else(|| "-".to_string(), |c| c.to_string()),
        correspondences.button_text()
    );
    let progress = board.overall_progress();
    let _ = write!(
        out,
        "   {} of {} imported, {} in progress, {} failed",
        progress.completed, progress.total, progress.in_progress, progress.failed
    );
    out
}

pub fn render_logs<D: DataImportBackend + 'static>(board: &ImportBoard<D>) -> String {
    board
        .logs()
        .iter()
        .map(|log| {
            format!(
                "{} {} {}",
                log.kind.icon(),
                log.timestamp.format("%H:%M:%S"),
                log.message
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// 建立階段的步驟統計，依建立流程排序
pub fn render_creation_statistics(stats: &CreationStatistics) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "🏗️ Creation: {} total, {} completed, {} pending, {} error",
        stats.total, stats.completed, stats.pending, stats.error
    );
    let mut steps: Vec<_> = stats.step_statistics.iter().collect();
    steps.sort_by_key(|s| step_order(&s.step));
    for step in steps {
        let _ = writeln!(out, "  {:<18} {:>6}", step_display_name(&step.step), step.count);
    }
    out.trim_end().to_string()
}

pub fn render_correspondence_status(
    stats: &CorrespondenceImportStatistics,
    statuses: &[CorrespondenceImportStatus],
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "📊 total {}  completed {}  in progress {}  failed {}  pending {}",
        stats.total, stats.completed, stats.in_progress, stats.failed, stats.pending
    );
    for status in statuses {
        let _ = writeln!(
            out,
            "  {} {}  {}/{} entities, {} retries",
            status_badge(&status.overall_status),
            status.correspondence_guid,
            status.successful_entities_count,
            status.total_entities_count,
            status.retry_count
        );
        for (entity, entity_status) in status.entity_statuses() {
            let _ = writeln!(out, "      {:<20} {}", entity, status_badge(entity_status));
        }
    }
    out
}
