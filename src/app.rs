use std::{
    fs,
    io::{self, Write},
    path::Path,
    time::Duration,
};

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use tokio::runtime::Runtime;

use crate::{
    cli::{AttendanceArgs, Cli, Command, ContactsCommand, LogsArgs, ReportArgs},
    domain::{
        self,
        attendance::{AttendanceMark, AttendanceRoll},
        grouping::{current_logs, group_logs, LogTab},
        project::{ProjectRecord, ReportSettings},
        text_log::{LogMetadata, TextLog},
    },
    infra::{
        self, attendance_store::JsonAttendanceStore, contracts::ExternalOpener,
        error::AppError, opener::SystemOpener, pii::mask_phone,
    },
    ui::{
        self,
        text_log_view::{render_batch_card, render_grouped_logs, render_message_rows},
    },
    usecases::{
        self,
        attendance_autosave::AttendanceAutosave,
        batch_details::BatchDetailsCache,
        bootstrap,
        contacts_csv::{export_contacts, import_contacts},
        context::AppContext,
        error_explanation::explain_error,
        individual_messages::filter_and_sort_messages,
        load_text_logs::{
            load_batches, load_text_logs, SortDirection, SortField, TextLogQuery,
            MAX_LOGS_PAGE_SIZE,
        },
        project_report::render_report,
        resend_link::{create_resend_link, ResendDraft},
    },
};

const RESEND_LINK_CREATED: &str = "RESEND_LINK_CREATED";
const ATTENDANCE_EDITS_SAVED: &str = "ATTENDANCE_EDITS_SAVED";

pub fn run(cli: Cli) -> Result<()> {
    let command = cli.command_or_default();
    let context = bootstrap::bootstrap(cli.config.as_deref(), cli.data.as_deref())?;

    tracing::debug!(
        ui = ui::module_name(),
        domain = domain::module_name(),
        usecases = usecases::module_name(),
        infra = infra::module_name(),
        "module boundaries loaded"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(&context, command, &SystemOpener, &mut out)
}

fn execute(
    context: &AppContext,
    command: Command,
    opener: &dyn ExternalOpener,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        Command::Logs(args) => show_logs(context, &args, out),
        Command::Batches { expand } => show_batches(context, expand, out),
        Command::Batch { batch_id, search } => show_batch(context, &batch_id, &search, out),
        Command::Explain { message } => {
            let explanation = explain_error(&message.join(" "));
            writeln!(out, "{}", explanation.summary())?;
            Ok(())
        }
        Command::Resend { message_id, open } => {
            resend(context, &message_id, open.then_some(opener), out)
        }
        Command::Contacts(ContactsCommand::Import { file, export }) => {
            import_contacts_file(&file, export.as_deref(), out)
        }
        Command::Attendance(args) => record_attendance(context, &args, out),
        Command::Report(args) => write_report(context, &args, out),
    }
}

fn logs_query(args: &LogsArgs, page_size: usize) -> Result<TextLogQuery> {
    let sort_by = match args.sort_by.as_deref() {
        Some(raw) => SortField::parse(raw).ok_or_else(|| anyhow!("unknown sort field: {raw}"))?,
        None => SortField::default(),
    };
    let sort_direction = match args.direction.as_deref() {
        Some(raw) => {
            SortDirection::parse(raw).ok_or_else(|| anyhow!("unknown sort direction: {raw}"))?
        }
        None => SortDirection::default(),
    };

    Ok(TextLogQuery {
        page: args.page,
        limit: if args.limit == 0 { page_size } else { args.limit },
        start_date: args.from,
        end_date: args.to,
        status: args.status.clone(),
        search_term: args.search.clone(),
        recipient_phone: args.phone.clone(),
        sort_by,
        sort_direction,
    })
}

fn show_logs(context: &AppContext, args: &LogsArgs, out: &mut dyn Write) -> Result<()> {
    let query = logs_query(args, context.config.logs.page_size)?;
    let page = load_text_logs(&context.logs, query)?;
    let groups = current_logs(&page.logs, args.tab.into());

    if args.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&groups)?)?;
        return Ok(());
    }

    for line in render_grouped_logs(&groups, context.config.texting.preview_width) {
        writeln!(out, "{line}")?;
    }
    writeln!(
        out,
        "Page {} ({} matching rows)",
        args.page.max(1),
        page.total_count
    )?;

    Ok(())
}

fn show_batches(context: &AppContext, expand: bool, out: &mut dyn Write) -> Result<()> {
    let batches = load_batches(&context.logs)?;
    if batches.is_empty() {
        writeln!(out, "No batches found.")?;
        return Ok(());
    }

    let mut cache = BatchDetailsCache::new();
    if expand {
        for batch in &batches {
            // a failed expand falls back to the batch's stored counts
            if let Err(error) = cache.expand(&context.logs, &batch.id) {
                writeln!(out, "{}: {}", batch.id, error.user_message())?;
            }
        }
    }

    for batch in &batches {
        let counts = cache.display_counts(batch);
        for line in render_batch_card(batch, counts, context.config.texting.preview_width) {
            writeln!(out, "{line}")?;
        }
    }

    if !cache.is_empty() {
        writeln!(out, "Live counts for {} of {} batches.", cache.len(), batches.len())?;
    }

    Ok(())
}

fn show_batch(
    context: &AppContext,
    batch_id: &str,
    search: &str,
    out: &mut dyn Write,
) -> Result<()> {
    let batch = load_batches(&context.logs)?
        .into_iter()
        .find(|batch| batch.id == batch_id);

    let mut cache = BatchDetailsCache::new();
    cache.expand(&context.logs, batch_id)?;

    if let Some(batch) = &batch {
        let counts = cache.display_counts(batch);
        for line in render_batch_card(batch, counts, context.config.texting.preview_width) {
            writeln!(out, "{line}")?;
        }
    }

    let fallback = LogMetadata::default();
    let metadata = batch.as_ref().map_or(&fallback, |batch| &batch.metadata);
    let details = cache.get(batch_id).unwrap_or_default();
    for line in render_message_rows(&filter_and_sort_messages(details, search, metadata)) {
        writeln!(out, "{line}")?;
    }

    Ok(())
}

/// Collects every row of the export, page by page.
fn all_rows(context: &AppContext) -> Result<Vec<TextLog>> {
    let mut rows: Vec<TextLog> = Vec::new();
    let mut page = 1;

    loop {
        let query = TextLogQuery {
            page,
            limit: MAX_LOGS_PAGE_SIZE,
            ..TextLogQuery::default()
        };
        let result = load_text_logs(&context.logs, query)?;
        if result.logs.total_len() == 0 {
            break;
        }

        rows.extend(result.logs.flatten(LogTab::All).into_iter().cloned());
        page += 1;
    }

    Ok(rows)
}

/// Resolves a message id to its grouped send, falling back to a single row id.
fn resend_draft(rows: &[TextLog], id: &str) -> Option<ResendDraft> {
    if let Some(group) = group_logs(rows)
        .into_iter()
        .find(|group| group.message_id == id)
    {
        return Some(ResendDraft::from_group(&group));
    }

    rows.iter()
        .find(|row| row.id == id)
        .map(ResendDraft::from_log)
}

fn resend(
    context: &AppContext,
    message_id: &str,
    opener: Option<&dyn ExternalOpener>,
    out: &mut dyn Write,
) -> Result<()> {
    let draft = resend_draft(&all_rows(context)?, message_id)
        .ok_or_else(|| anyhow!("no message with id {message_id}"))?;
    let link = create_resend_link(&context.config.texting.send_page_url, &draft);

    tracing::info!(
        code = RESEND_LINK_CREATED,
        message_id,
        recipients = draft.phones.len(),
        first_recipient = %draft.phones.first().map(|phone| mask_phone(phone)).unwrap_or_default(),
        "resend link created"
    );

    writeln!(out, "{link}")?;
    if let Some(opener) = opener {
        opener.open(&link)?;
    }

    Ok(())
}

fn import_contacts_file(file: &Path, export: Option<&Path>, out: &mut dyn Write) -> Result<()> {
    let raw = fs::read_to_string(file).map_err(|source| AppError::DataRead {
        path: file.to_path_buf(),
        source,
    })?;
    let import = import_contacts(&raw)?;

    writeln!(out, "Imported {} contacts.", import.contacts.len())?;
    for error in &import.errors {
        writeln!(out, "{error}")?;
    }

    if let Some(path) = export {
        fs::write(path, export_contacts(&import.contacts)).map_err(|source| AppError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        writeln!(out, "Wrote {}.", path.display())?;
    }

    Ok(())
}

/// Parses `STUDENT:YYYY-MM-DD:MARK`. The student id may itself contain colons.
fn parse_mark_edit(raw: &str) -> Result<(String, NaiveDate, AttendanceMark)> {
    let mut parts = raw.rsplitn(3, ':');
    let (Some(mark), Some(date), Some(student)) = (parts.next(), parts.next(), parts.next())
    else {
        bail!("expected STUDENT:YYYY-MM-DD:MARK, got {raw}");
    };

    let student = student.trim();
    if student.is_empty() {
        bail!("missing student id in {raw}");
    }
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid date in {raw}"))?;
    let mark = AttendanceMark::parse(mark).ok_or_else(|| anyhow!("unknown mark in {raw}"))?;

    Ok((student.to_owned(), date, mark))
}

fn record_attendance(
    context: &AppContext,
    args: &AttendanceArgs,
    out: &mut dyn Write,
) -> Result<()> {
    let edits = args
        .marks
        .iter()
        .map(|raw| parse_mark_edit(raw))
        .collect::<Result<Vec<_>>>()?;

    let store = JsonAttendanceStore::new(&args.store);
    let mut roll = AttendanceRoll::new(args.class.as_str());
    roll.load(store.load(&args.class)?);

    let runtime = Runtime::new().context("failed to start autosave runtime")?;
    let autosave = AttendanceAutosave::start(
        &runtime,
        roll,
        store,
        Duration::from_millis(context.config.autosave.idle_ms),
    );

    let mut changed = 0;
    for (student, date, mark) in &edits {
        if autosave.mark(student, *date, *mark)? {
            changed += 1;
        }
    }

    let mut dates: Vec<NaiveDate> = edits.iter().map(|(_, date, _)| *date).collect();
    dates.sort_unstable();
    dates.dedup();
    for date in dates {
        writeln!(out, "{date}: {} present", autosave.present_count(date))?;
    }

    if autosave.is_dirty() {
        autosave.flush_now()?;
    }
    autosave.close()?;

    tracing::info!(
        code = ATTENDANCE_EDITS_SAVED,
        class_id = args.class.as_str(),
        changed,
        "attendance edits saved"
    );
    writeln!(
        out,
        "Saved {changed} of {} edits for class {}.",
        edits.len(),
        args.class
    )?;

    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let raw = fs::read_to_string(path).map_err(|source| AppError::DataRead {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&raw).map_err(|source| AppError::DataParse {
        path: path.to_path_buf(),
        source,
    })
}

fn write_report(context: &AppContext, args: &ReportArgs, out: &mut dyn Write) -> Result<()> {
    let record: ProjectRecord = read_json(&args.project)?;
    let mut settings: ReportSettings = match &args.settings {
        Some(path) => read_json(path)?,
        None => ReportSettings::default(),
    };
    settings.anonymize_pii |= args.anonymize;

    let pages = render_report(&record, &settings, context.config.report.lines_per_page);
    let text = pages
        .iter()
        .map(|page| page.lines.join("\n"))
        .collect::<Vec<_>>()
        .join("\n\n");

    match &args.out {
        Some(path) => {
            fs::write(path, format!("{text}\n")).map_err(|source| AppError::Write {
                path: path.to_path_buf(),
                source,
            })?;
            writeln!(out, "Wrote {} pages to {}.", pages.len(), path.display())?;
        }
        None => writeln!(out, "{text}")?,
    }

    Ok(())
}
