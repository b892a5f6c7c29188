//! Human-readable report assembly for Telegram delivery.
//!
//! Pure formatting: identical inputs produce byte-identical output. The
//! markup is the Telegram HTML subset (`<b>`, `<i>` only).

use crate::check::Report;

const SEPARATOR: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Render a report into the message body sent to the operator.
///
/// One block per result, in input order, each carrying the check index,
/// roll number, category label, detail text, and extracted page title.
pub fn format_report(report: &Report) -> String {
    let checked_at = report.checked_at.format("%d %B %Y, %I:%M %p IST");

    let mut message = format!(
        "🎓 <b>Convocation Portal Check</b>\n\n\
         📅 <b>Check Time:</b> {checked_at}\n\
         👤 <b>Student:</b> {student}\n\
         🔢 <b>Roll Numbers Checked:</b> {count}\n\n",
        student = report.student,
        count = report.results.len(),
    );

    for (i, result) in report.results.iter().enumerate() {
        message.push_str(SEPARATOR);
        message.push('\n');
        message.push_str(&format!(
            "<b>Check #{index}: {roll}</b>\n\n\
             {label}\n\
             {detail}\n\n\
             📄 <b>Convocation:</b> {title}\n",
            index = i + 1,
            roll = result.roll_number,
            label = result.category.label(),
            detail = result.status_detail,
            title = result.page_title,
        ));
        if i + 1 < report.results.len() {
            message.push('\n');
        }
    }

    message.push_str(&format!(
        "\n{SEPARATOR}\n\n\
         💡 <b>What This Means:</b>\n\
         • \"Not Found\" everywhere is normal before the convocation list is published\n\
         • A \"Found\" entry means that roll number format works on the portal\n\
         • Mixed results mean the portal prefers one format over the other\n\n\
         <i>This is an automated check.</i>\n"
    ));

    message
}
