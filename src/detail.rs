//! Human-readable rendering of one record for a detail view.
//!
//! Fixed fields appear as labelled single lines; opaque JSON payloads are
//! pretty-printed; the untouched raw line comes last. Absent fields are
//! omitted entirely.

use crate::record::LogRecord;
use serde_json::Value;

/// Render the full detail view of one record.
pub fn format_record(record: &LogRecord) -> String {
    let mut out = String::new();

    push_text(&mut out, "File name", record.file_name.as_deref());
    push_text(&mut out, "Line number", Some(&record.seq.to_string()));
    out.push('\n');
    push_text(&mut out, "Level (l)", record.level.as_deref());
    push_text(&mut out, "Time (t)", record.timestamp.as_deref());
    push_text(&mut out, "Trace info (tr)", record.trace.as_deref());
    push_text(&mut out, "User account (un)", record.user_name.as_deref());
    out.push('\n');
    push_text(&mut out, "Message (mt)", record.message.as_deref());
    out.push('\n');
    push_json(&mut out, "Exception info (ex)", record.exception.as_ref());
    push_json(&mut out, "Message arguments (args)", record.arguments.as_ref());
    out.push('\n');
    push_text(&mut out, "System code (tn)", record.tenant.as_deref());
    push_text(&mut out, "Version (v)", record.version.as_deref());
    push_text(&mut out, "Logger name (lg)", record.logger.as_deref());
    push_text(&mut out, "Process id (pid)", record.process_id.as_deref());
    out.push('\n');
    push_text(&mut out, "Browser name (bn)", record.browser_name.as_deref());
    push_text(&mut out, "Browser version (bv)", record.browser_version.as_deref());
    push_text(&mut out, "Browser tab id (tab)", record.tab_id.as_deref());
    out.push('\n');
    push_json(&mut out, "Custom payload (cust)", record.custom.as_ref());
    push_json(&mut out, "Span info (span)", record.span.as_ref());
    out.push('\n');
    push_text(&mut out, "Raw json line", record.raw_line.as_deref());

    out
}

fn push_text(out: &mut String, label: &str, value: Option<&str>) {
    if let Some(value) = value {
        if !value.is_empty() {
            out.push_str(label);
            out.push_str(": ");
            out.push_str(value);
            out.push('\n');
        }
    }
}

fn push_json(out: &mut String, label: &str, value: Option<&Value>) {
    let Some(value) = value else { return };
    if value.is_null() {
        return;
    }

    out.push_str(label);
    out.push_str(":\n");
    match serde_json::to_string_pretty(value) {
        Ok(pretty) => out.push_str(&pretty),
        Err(_) => out.push_str(&value.to_string()),
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::LineDecoder;

    #[test]
    fn test_format_includes_present_fields_with_labels() {
        let mut decoder = LineDecoder::new();
        let record = decoder
            .decode(r#"{"t":"2024-01-01 10:00:00","l":"Error","mt":"boom","un":"alice"}"#)
            .unwrap()
            .unwrap();

        let text = format_record(&record);

        assert!(text.contains("Line number: 1"));
        assert!(text.contains("Level (l): Error"));
        assert!(text.contains("Time (t): 2024-01-01 10:00:00"));
        assert!(text.contains("Message (mt): boom"));
        assert!(text.contains("User account (un): alice"));
        assert!(text.contains("Raw json line: {"));
        // Absent fields leave no label behind.
        assert!(!text.contains("Browser name"));
        assert!(!text.contains("Exception info"));
    }

    #[test]
    fn test_format_pretty_prints_opaque_payloads() {
        let mut decoder = LineDecoder::new();
        let record = decoder
            .decode(r#"{"mt":"x","ex":{"type":"IOError","code":5}}"#)
            .unwrap()
            .unwrap();

        let text = format_record(&record);

        assert!(text.contains("Exception info (ex):\n"));
        assert!(text.contains("\"type\": \"IOError\""));
        assert!(text.contains("\"code\": 5"));
    }
}
