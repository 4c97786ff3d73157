//! Output rendering and formatting

use cbnode_types::ProvisionReport;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use std::io;

/// Output renderer for the final report
#[derive(Clone)]
pub struct OutputRenderer {
    json_output: bool,
    colors_enabled: bool,
}

impl OutputRenderer {
    pub fn new(json_output: bool, colors_enabled: bool) -> Self {
        Self {
            json_output,
            colors_enabled,
        }
    }

    /// Render the provisioning report on stdout
    pub fn render_report(&self, report: &ProvisionReport) -> io::Result<()> {
        if self.json_output {
            let json = serde_json::to_string_pretty(report).map_err(io::Error::other)?;
            println!("{json}");
        } else {
            println!("{}", self.summary_table(report));
            println!("{}", self.phase_table(report));
        }
        Ok(())
    }

    fn summary_table(&self, report: &ProvisionReport) -> Table {
        let request = &report.request;
        let mut table = self.table();
        table.set_header(vec![self.header("Setting"), self.header("Value")]);

        let version = if request.defaulted {
            format!("{} (default)", request.version)
        } else {
            request.version.clone()
        };
        let swappiness = if report.swappiness_changed {
            format!("{} (updated)", request.swappiness)
        } else {
            format!("{} (unchanged)", request.swappiness)
        };

        table.add_row(vec![Cell::new("Edition"), Cell::new(request.edition)]);
        table.add_row(vec![Cell::new("Version"), Cell::new(version)]);
        table.add_row(vec![Cell::new("Checksum type"), Cell::new(request.checksum_type)]);
        table.add_row(vec![Cell::new("Platform"), Cell::new(&report.platform)]);
        table.add_row(vec![Cell::new("Package"), Cell::new(&report.artifact_url)]);
        table.add_row(vec![Cell::new("vm.swappiness"), Cell::new(swappiness)]);
        table.add_row(vec![Cell::new("Staged"), Cell::new(report.staged.join("\n"))]);
        table
    }

    fn phase_table(&self, report: &ProvisionReport) -> Table {
        let mut table = self.table();
        table.set_header(vec![self.header("Phase"), self.header("Duration")]);
        for record in &report.phases {
            table.add_row(vec![
                Cell::new(record.phase),
                Cell::new(format!("{} ms", record.duration_ms)),
            ]);
        }
        let total = Cell::new(format!("{} ms", report.duration_ms));
        let total = if self.colors_enabled {
            total.fg(Color::Green)
        } else {
            total
        };
        table.add_row(vec![Cell::new("total"), total]);
        table
    }

    fn table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        if !self.colors_enabled {
            table.force_no_tty();
        }
        table
    }

    fn header(&self, title: &str) -> Cell {
        let cell = Cell::new(title);
        if self.colors_enabled {
            cell.add_attribute(Attribute::Bold)
        } else {
            cell
        }
    }
}
