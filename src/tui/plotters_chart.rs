//! Plotters-powered dashboard panel widget for Ratatui.
//!
//! The panel itself is drawn by [`crate::charts::draw_panel`], the same code
//! that writes the SVG pages. We render Plotters output into the Ratatui
//! buffer using `plotters-ratatui-backend`.

use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::app::pipeline::DashboardReport;
use crate::charts::{Theme, draw_panel};
use crate::domain::Panel;

/// Smallest area Plotters can lay a panel out in.
pub const MIN_WIDTH: u16 = 20;
pub const MIN_HEIGHT: u16 = 8;

/// Render-only view of one panel of a report.
pub struct PanelChart<'a> {
    pub report: &'a DashboardReport,
    pub panel: Panel,
}

impl<'a> Widget for PanelChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to build a chart in a tiny area; show a hint instead.
        if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let report = self.report;
        let panel = self.panel;
        let theme = Theme::terminal();

        let widget = widget_fn(move |root| {
            draw_panel(&root, panel, report, &theme)?;
            Ok(())
        });

        widget.render(area, buf);
    }
}
