use crate::app::frame::{FrameStage, RunState};
use crate::app::perf::{LoopRateSnapshot, RollingMsStats};
use crate::app::rendering::{draw_text, Surface, GLYPH_ADVANCE, LINE_ADVANCE};

const OVERLAY_PADDING: i32 = 6;
const OVERLAY_TEXT_PRIMARY_COLOR: [u8; 4] = [244, 248, 252, 255];
const OVERLAY_TEXT_DIM_COLOR: [u8; 4] = [176, 198, 220, 255];
const OVERLAY_PANEL_BG_COLOR: [u8; 4] = [10, 12, 16, 210];
const OVERLAY_PANEL_BORDER_COLOR: [u8; 4] = [92, 106, 126, 255];
const SHELL_SECTION_LABEL: &str = "Shell";
const ENGINE_SECTION_LABEL: &str = "Engine";

#[derive(Debug, Clone)]
pub(crate) struct OverlayData<'a> {
    pub run_state: RunState,
    pub loop_rate: LoopRateSnapshot,
    pub stages: Vec<(FrameStage, RollingMsStats)>,
    pub engine_labels: &'a [String],
}

/// Redraws the perf panel, resizing `surface` to fit its text.
pub(crate) fn draw_overlay(surface: &mut Surface, data: &OverlayData<'_>) {
    let lines = build_overlay_lines(data);
    let longest = lines
        .iter()
        .map(|line| line.chars().count() as i32)
        .max()
        .unwrap_or(0);
    let width = longest * GLYPH_ADVANCE + OVERLAY_PADDING * 2;
    let height = lines.len() as i32 * LINE_ADVANCE + OVERLAY_PADDING * 2;
    surface.resize(width.max(1) as u32, height.max(1) as u32);
    surface.clear([0, 0, 0, 0]);
    surface.fill_rect(0, 0, width, height, OVERLAY_PANEL_BG_COLOR);
    surface.outline_rect(0, 0, width, height, OVERLAY_PANEL_BORDER_COLOR);

    let mut y = OVERLAY_PADDING;
    for line in &lines {
        draw_text(surface, OVERLAY_PADDING, y, line, overlay_line_color(line));
        y += LINE_ADVANCE;
    }
}

pub(crate) fn build_overlay_lines(data: &OverlayData<'_>) -> Vec<String> {
    let mut lines = vec![
        SHELL_SECTION_LABEL.to_string(),
        format!(
            "TPS: {:.1} {}",
            data.loop_rate.tps,
            run_state_text(data.run_state)
        ),
        format!("Tick: {:.2} ms", data.loop_rate.frame_time_ms),
    ];
    for (stage, stats) in &data.stages {
        lines.push(format_stage_line(*stage, *stats));
    }
    if !data.engine_labels.is_empty() {
        lines.push(String::new());
        lines.push(ENGINE_SECTION_LABEL.to_string());
        lines.extend(data.engine_labels.iter().cloned());
    }
    lines
}

fn overlay_line_color(line: &str) -> [u8; 4] {
    if matches!(line, SHELL_SECTION_LABEL | ENGINE_SECTION_LABEL) {
        OVERLAY_TEXT_DIM_COLOR
    } else {
        OVERLAY_TEXT_PRIMARY_COLOR
    }
}

fn run_state_text(state: RunState) -> &'static str {
    match state {
        RunState::Running => "",
        RunState::Paused => "[paused]",
    }
}

fn format_stage_line(stage: FrameStage, stats: RollingMsStats) -> String {
    format!(
        "{} l/a/m: {:.2}/{:.2}/{:.2} ms",
        stage.short_label(),
        stats.last_ms,
        stats.avg_ms,
        stats.max_ms
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(labels: &[String]) -> OverlayData<'_> {
        OverlayData {
            run_state: RunState::Paused,
            loop_rate: LoopRateSnapshot {
                tps: 19.96,
                frame_time_ms: 50.0,
            },
            stages: vec![(
                FrameStage::Advance,
                RollingMsStats {
                    last_ms: 1.0,
                    avg_ms: 2.0,
                    max_ms: 3.0,
                },
            )],
            engine_labels: labels,
        }
    }

    #[test]
    fn lines_include_stage_stats_and_engine_labels() {
        let labels = vec!["Simulate Avg: 0.412 ms".to_string()];
        let lines = build_overlay_lines(&data(&labels));

        assert_eq!(lines[1], "TPS: 20.0 [paused]");
        assert!(lines.contains(&"ADV l/a/m: 1.00/2.00/3.00 ms".to_string()));
        assert_eq!(lines.last(), Some(&"Simulate Avg: 0.412 ms".to_string()));
    }

    #[test]
    fn engine_section_omitted_without_labels() {
        let lines = build_overlay_lines(&data(&[]));
        assert!(!lines.iter().any(|line| line == ENGINE_SECTION_LABEL));
    }

    #[test]
    fn draw_overlay_sizes_surface_to_panel() {
        let mut surface = Surface::new(1, 1);
        let labels = Vec::new();
        draw_overlay(&mut surface, &data(&labels));

        assert!(surface.width() > 100);
        assert_eq!(surface.pixel(0, 0), Some(OVERLAY_PANEL_BORDER_COLOR));
    }
}
