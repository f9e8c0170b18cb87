//! Plain-text renderings of grouped messages and batch cards.

use crate::{
    domain::{
        batch::{DisplayCounts, TextBatch},
        grouping::GroupedLog,
        status::{batch_status, display_status, status_icon, status_tone},
    },
    ui::format::{format_log_date, truncate_preview},
    usecases::{error_explanation::explain_error, individual_messages::MessageRow},
};

pub fn render_grouped_logs(groups: &[GroupedLog], preview_width: usize) -> Vec<String> {
    if groups.is_empty() {
        return vec!["No messages found.".to_owned()];
    }

    groups
        .iter()
        .map(|group| {
            let recipients = match group.recipient_count {
                1 => "1 recipient".to_owned(),
                count => format!("{count} recipients"),
            };

            format!(
                "{} {:<9} {:<22} {:<14} {}",
                status_icon(&group.status).glyph(),
                display_status(&group.status),
                format_log_date(group.created_at.as_deref()),
                recipients,
                truncate_preview(&group.message_content, preview_width)
            )
        })
        .collect()
}

pub fn render_batch_card(
    batch: &TextBatch,
    counts: DisplayCounts,
    preview_width: usize,
) -> Vec<String> {
    vec![
        format!(
            "{} [{}] {} ({})",
            status_icon(&batch.status).glyph(),
            batch.id,
            batch_status(&batch.status),
            status_tone(&batch.status).as_label()
        ),
        format!("  {}", truncate_preview(&batch.message_content, preview_width)),
        format!(
            "  sent {} | delivered {} | pending {} | failed {} | total {}",
            format_log_date(batch.created_at.as_deref()),
            counts.delivered,
            counts.pending,
            counts.failed,
            counts.total
        ),
    ]
}

pub fn render_message_rows(rows: &[MessageRow<'_>]) -> Vec<String> {
    if rows.is_empty() {
        return vec!["  No matching recipients.".to_owned()];
    }

    let mut lines = Vec::with_capacity(rows.len());
    for row in rows {
        lines.push(format!(
            "  {} {:<9} {}",
            status_icon(&row.log.status).glyph(),
            display_status(row.log.delivery_status().as_str()),
            row.display_name
        ));

        if let Some(error) = row
            .log
            .error_message
            .as_deref()
            .filter(|text| !text.trim().is_empty())
        {
            lines.push(format!("      {}", explain_error(error).summary()));
        }
    }

    lines
}
