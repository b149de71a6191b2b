//! Text rendering of the UI state.

use std::fmt::Write;

use super::state::{FormMode, Phase, Status, UiState};

const HEADERS: [&str; 4] = ["NAME", "AGE", "MOBILE", "ID"];

/// Render the whole view as text.
///
/// Pure: the same state always renders to the same string.
#[must_use]
pub fn render(state: &UiState) -> String {
    let mut out = String::new();

    match &state.status {
        Some(Status::Success(message)) => {
            let _ = writeln!(out, "[ok] {message}");
        }
        Some(Status::Error(message)) => {
            let _ = writeln!(out, "[error] Error: {message}");
        }
        None => {}
    }

    match state.phase {
        Phase::Idle => out.push_str("No users loaded.\n"),
        Phase::Loading => out.push_str("Loading users...\n"),
        Phase::Rendered => {
            render_table(&mut out, state);
            render_pagination(&mut out, state);
        }
    }

    match &state.form_mode {
        FormMode::Create => out.push_str("Form: create\n"),
        FormMode::Edit { id } => {
            let _ = writeln!(
                out,
                "Form: update {id} (name: {}, age: {}, mobile: {})",
                state.form.name, state.form.age, state.form.mobile
            );
        }
    }

    if let Some(user) = &state.pending_delete {
        let _ = writeln!(
            out,
            "Are you sure you want to delete this user: {}?",
            user.name
        );
    }

    out
}

fn render_table(out: &mut String, state: &UiState) {
    let rows: Vec<[String; 4]> = state
        .page_users()
        .iter()
        .map(|u| [u.name.clone(), u.age.to_string(), u.mobile.clone(), u.id.clone()])
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    write_row(out, &widths, &HEADERS.map(String::from));
    for row in &rows {
        write_row(out, &widths, row);
    }
    if rows.is_empty() {
        out.push_str("(no users on this page)\n");
    }
}

fn write_row(out: &mut String, widths: &[usize; 4], cells: &[String; 4]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

fn render_pagination(out: &mut String, state: &UiState) {
    let count = state.page_count();
    if count == 0 {
        return;
    }
    let pages = (1..=count)
        .map(|i| {
            if i == state.page {
                format!("[{i}]")
            } else {
                i.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    let _ = writeln!(out, "Pages: {pages}");
}
