//! Response formatter turning a [`ShipmentRecord`] into the status report
//! sent to the user (HTML parse mode).

use teloxide::utils::html::escape;

use crate::shipment::{ShipmentRecord, StatusEvent};
use crate::tracking_errors::TrackingError;

/// Substring the provider uses when a parcel reaches the intermediate warehouse
pub const WAREHOUSE_ARRIVAL_MARKER: &str = "Код склада в Китае";

/// Shown instead of the provider's warehouse-arrival message
pub const WAREHOUSE_ARRIVAL_TEXT: &str = "Ваш товар прибыл на наш склад в Китае 📦";

/// Longest text Telegram accepts in one message
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Render the full report
///
/// The template's two slots receive the waybill number and the quantity.
/// Events are appended in the reverse of the order the API returned them.
pub fn render_report(template: &str, record: &ShipmentRecord) -> Result<String, TrackingError> {
    let waybill_number = escape(&record.waybill_number);
    let quantity = escape(&record.quantity);
    let mut content = fill_template(template, &[waybill_number.as_str(), quantity.as_str()])?;

    for event in record.events.iter().rev() {
        content.push_str(&format_event(event));
    }

    Ok(content)
}

/// The message to display for an event, after the warehouse rewrite rule
pub fn describe_event(message: &str) -> &str {
    if message.contains(WAREHOUSE_ARRIVAL_MARKER) {
        WAREHOUSE_ARRIVAL_TEXT
    } else {
        message
    }
}

pub fn format_event(event: &StatusEvent) -> String {
    format!(
        "\n<b>Время: {}</b>\n<b>Статус:</b> <i>{}</i>\n",
        escape(&event.time),
        escape(describe_event(&event.message))
    )
}

/// Split a report into messages of at most `limit` characters
///
/// Cuts fall between lines, so the tags of an event block stay in one
/// message. Only a single line longer than `limit` is cut mid-line.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();
        if current_len + line_len <= limit {
            current.push_str(line);
            current_len += line_len;
            continue;
        }

        if !current.is_empty() {
            parts.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if line_len <= limit {
            current.push_str(line);
            current_len = line_len;
            continue;
        }

        for c in line.chars() {
            if current_len == limit {
                parts.push(std::mem::take(&mut current));
                current_len = 0;
            }
            current.push(c);
            current_len += 1;
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }

    // Telegram rejects blank messages
    parts.retain(|part| !part.trim().is_empty());
    parts
}

/// Positional substitution: `{}` takes the next argument, `{N}` the N-th,
/// and `{{` / `}}` produce literal braces.
pub fn fill_template(template: &str, args: &[&str]) -> Result<String, TrackingError> {
    let mut output = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    let mut next_index = 0;

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                output.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                output.push('}');
            }
            '{' => {
                let mut slot = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(d) if d.is_ascii_digit() => slot.push(d),
                        Some(other) => {
                            return Err(TrackingError::Template(format!(
                                "unexpected character {other:?} in placeholder"
                            )))
                        }
                        None => {
                            return Err(TrackingError::Template(
                                "unterminated placeholder".to_string(),
                            ))
                        }
                    }
                }

                let index = if slot.is_empty() {
                    next_index += 1;
                    next_index - 1
                } else {
                    slot.parse::<usize>()
                        .map_err(|e| TrackingError::Template(e.to_string()))?
                };

                let value = args.get(index).ok_or_else(|| {
                    TrackingError::Template(format!(
                        "placeholder {index} has no value ({} provided)",
                        args.len()
                    ))
                })?;
                output.push_str(value);
            }
            '}' => {
                return Err(TrackingError::Template(
                    "single '}' outside a placeholder".to_string(),
                ))
            }
            other => output.push(other),
        }
    }

    Ok(output)
}
