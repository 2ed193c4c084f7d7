//! Plain-text list and detail views.

use std::fmt::Write;

use randex_types::{Dashboard, EnrichedItem, Phase};

const MISSING_IMAGE: &str = "-";

pub fn list(dashboard: &Dashboard) -> String {
    let items = dashboard.items();
    if items.is_empty() {
        return "No items.\n".to_string();
    }

    let width = items.iter().map(|item| item.name.len()).max().unwrap_or(0);
    let selected = dashboard.selected().map(|item| item.name.as_str());

    let mut out = String::new();
    for (index, item) in items.iter().enumerate() {
        let marker = if selected == Some(item.name.as_str()) {
            '>'
        } else {
            ' '
        };
        let _ = writeln!(
            out,
            "{marker} {:>2}. {:<width$}  {}",
            index + 1,
            item.name,
            image_cell(item),
        );
    }

    if dashboard.phase() == Phase::Ready {
        let failed = dashboard.failed().count();
        if failed > 0 {
            let _ = writeln!(out, "\n{failed} of {} items have no image.", items.len());
        }
    }

    out
}

pub fn detail(item: &EnrichedItem) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Name:  {}", item.name);
    let _ = writeln!(out, "URL:   {}", item.url);
    let _ = writeln!(out, "Image: {}", image_cell(item));
    out
}

fn image_cell(item: &EnrichedItem) -> &str {
    if item.is_loading {
        return "...";
    }
    item.image.as_deref().unwrap_or(MISSING_IMAGE)
}
