//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style, Stylize},
    widgets::{Block, Borders, Gauge, List, ListItem, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock, time::Duration};

use crate::app::App;
use crate::config::UiSettings;
use crate::player::PROGRESS_SCALE;

static CONTROLS_MAP: LazyLock<BTreeMap<String, String>> = LazyLock::new(|| {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    map.insert("j/k".to_string(), "up/down".to_string());
    map.insert("gg/G".to_string(), "top/bottom".to_string());
    map.insert("enter".to_string(), "play / apply seek".to_string());
    map.insert("space/p".to_string(), "play/pause".to_string());
    map.insert("h/l".to_string(), "prev/next track".to_string());
    // H/L is filled dynamically from config.
    map.insert("esc".to_string(), "cancel seek".to_string());
    map.insert("q".to_string(), "quit".to_string());
    map
});

/// Render the controls help text, incorporating the seek step.
fn controls_text(seek_step_permille: u16) -> String {
    // Keep the rendered order stable and human-friendly.
    let order = ["j/k", "h/l", "H/L", "enter", "esc", "space/p", "gg/G", "q"];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!(
                    "[H/L] seek -/+{}%",
                    u32::from(seek_step_permille) / 10
                ))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Track-row duration column: `M:SS`, or `--:--` while unknown.
fn format_track_duration(d: Option<Duration>) -> String {
    match d {
        Some(d) => {
            let secs = d.as_secs();
            format!("{}:{:02}", secs / 60, secs % 60)
        }
        None => "--:--".to_string(),
    }
}

/// Position text for a permille progress: "elapsed/total" when the duration
/// is known, a bare percentage otherwise.
fn position_text(permille: u16, total: Option<Duration>) -> String {
    match total {
        Some(total) if !total.is_zero() => {
            let elapsed = total * u32::from(permille) / u32::from(PROGRESS_SCALE);
            format!("{}/{}", format_mmss(elapsed), format_mmss(total))
        }
        _ => format!("{}%", u32::from(permille) / 10),
    }
}

/// Header lines: album title on top, artist/published/genre below.
fn header_lines(app: &App) -> (String, String) {
    match &app.meta {
        Some(meta) => {
            let mut info: Vec<String> = Vec::new();
            if !meta.artist.is_empty() {
                info.push(meta.artist.clone());
            }
            if !meta.published.is_empty() {
                info.push(meta.published.clone());
            }
            if !meta.genre.is_empty() {
                info.push(meta.genre.clone());
            }
            (meta.title.clone(), info.join(" • "))
        }
        None => ("Fetching album...".to_string(), String::new()),
    }
}

/// One line summarizing cursor mode and transport state.
fn status_text(app: &App) -> String {
    let mut parts: Vec<String> = Vec::new();

    if app.follow_playback {
        parts.push("CURSOR: Follow".to_string());
    } else {
        parts.push("CURSOR: Free-roam".to_string());
    }

    match &app.snapshot.current {
        Some(track) => {
            // The playing track can come from an older playlist than the
            // visible list, so name its album explicitly.
            let name = if track.album_title.is_empty() {
                track.title.clone()
            } else {
                format!("{} ({})", track.title, track.album_title)
            };
            parts.push(format!(
                "Track: {} [{}]",
                name,
                position_text(app.snapshot.progress_permille, track.duration)
            ));
            if app.snapshot.playing {
                parts.push("Playing".to_string());
            } else {
                parts.push("Paused".to_string());
            }
        }
        None => parts.push("Stopped".to_string()),
    }

    parts.join(" • ")
}

/// Render the entire UI into the provided `frame` using `app` state.
pub fn draw(frame: &mut Frame, app: &App, ui_settings: &UiSettings) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header: album metadata.
    let (title_line, info_line) = header_lines(app);
    let header = Paragraph::new(format!("{title_line}\n{info_line}"))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" attacca ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Status box; a fetch failure replaces it until the next key press.
    let status_par = match &app.toast {
        Some(toast) => Paragraph::new(toast.as_str()).red().bold(),
        None => Paragraph::new(status_text(app)),
    }
    .block(
        Block::bordered()
            .padding(Padding {
                left: 1,
                right: 0,
                top: 0,
                bottom: 0,
            })
            .title(" status "),
    )
    .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    // Main list.
    {
        let playing_id = if app.snapshot.playing {
            app.snapshot.current.as_ref().map(|t| t.id)
        } else {
            None
        };

        // Center the selected item when possible by creating a visible window.
        // Important: only build ListItems for the visible window.
        let total = app.tracks.len();
        let list_height = chunks[2].height as usize;
        let sel_pos = app.selected.min(total.saturating_sub(1));
        let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
            (0, total, sel_pos)
        } else {
            let half = list_height / 2;
            let mut start = if sel_pos > half { sel_pos - half } else { 0 };
            if start + list_height > total {
                start = total - list_height;
            }
            (start, start + list_height, sel_pos - start)
        };

        let visible_items: Vec<ListItem> = app.tracks[start..end]
            .iter()
            .enumerate()
            .map(|(offset, track)| {
                let marker = if Some(track.id) == playing_id {
                    "▶ "
                } else {
                    "  "
                };
                ListItem::new(format!(
                    "{}{:>2}. {}  {}",
                    marker,
                    start + offset + 1,
                    track.title,
                    format_track_duration(track.duration)
                ))
            })
            .collect();

        let list = List::new(visible_items)
            .block(Block::default().borders(Borders::ALL).title(" tracks "))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ratatui::widgets::ListState::default();
        if total > 0 {
            state.select(Some(selected_pos_in_visible));
        }
        frame.render_stateful_widget(list, chunks[2], &mut state);
    }

    // Progress gauge; while a seek is being adjusted it shows the target.
    {
        let permille = app.gauge_permille().min(PROGRESS_SCALE);
        let total = app
            .snapshot
            .current
            .as_ref()
            .and_then(|t| t.duration);
        let (title, label) = if app.pending_seek.is_some() {
            (" seek ", format!("seek {}", position_text(permille, total)))
        } else {
            (" progress ", position_text(permille, total))
        };
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(title))
            .ratio(f64::from(permille) / f64::from(PROGRESS_SCALE))
            .label(label);
        frame.render_widget(gauge, chunks[3]);
    }

    let footer_text = controls_text(ui_settings.seek_step_permille);
    let footer = Paragraph::new(footer_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, chunks[4]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mmss_formats_with_padding() {
        assert_eq!(format_mmss(Duration::from_secs(0)), "00:00");
        assert_eq!(format_mmss(Duration::from_secs(65)), "01:05");
        assert_eq!(format_mmss(Duration::from_secs(600)), "10:00");
    }

    #[test]
    fn unknown_track_durations_render_as_placeholder() {
        assert_eq!(format_track_duration(None), "--:--");
        assert_eq!(format_track_duration(Some(Duration::from_secs(154))), "2:34");
    }

    #[test]
    fn position_text_falls_back_to_percent() {
        assert_eq!(
            position_text(500, Some(Duration::from_secs(100))),
            "00:50/01:40"
        );
        assert_eq!(position_text(500, None), "50%");
        assert_eq!(position_text(0, Some(Duration::ZERO)), "0%");
    }

    #[test]
    fn status_line_names_the_playing_track_and_album() {
        let mut app = App::new();
        app.apply_snapshot(crate::player::PlayerSnapshot {
            playing: true,
            current: Some(crate::album::Track {
                id: 1,
                locator: "https://example.org/data/01_overture.mp3".to_string(),
                title: "01_overture".to_string(),
                album_title: "Some album".to_string(),
                duration: Some(Duration::from_secs(100)),
            }),
            progress_permille: 500,
        });

        let text = status_text(&app);
        assert!(text.contains("01_overture (Some album)"));
        assert!(text.contains("00:50/01:40"));
        assert!(text.ends_with("Playing"));
        assert_eq!(status_text(&App::new()), "CURSOR: Follow • Stopped");
    }

    #[test]
    fn controls_text_reflects_the_seek_step() {
        let text = controls_text(50);
        assert!(text.contains("[H/L] seek -/+5%"));
        assert!(text.contains("[q] quit"));
    }
}
