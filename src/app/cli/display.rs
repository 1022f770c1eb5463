//! End-of-run statistics table

use crate::queue::QueueStats;
use prettytable::{format, row, Cell, Row, Table};

fn stats_row(stats: &QueueStats, use_color: bool) -> Row {
    let dropped = Cell::new(&stats.dropped.to_string());
    let dropped = if use_color && stats.dropped > 0 {
        dropped.style_spec("Fr")
    } else {
        dropped
    };

    let unflushed = Cell::new(&stats.unflushed().to_string());
    let unflushed = if use_color && stats.unflushed() > 0 {
        unflushed.style_spec("Fy")
    } else {
        unflushed
    };

    Row::new(vec![
        Cell::new(&stats.name),
        Cell::new(&stats.end_offset().to_string()),
        Cell::new(&stats.flushed_up_to.to_string()),
        unflushed,
        dropped,
        Cell::new(&stats.capacity.to_string()),
        Cell::new(if stats.is_shutdown { "yes" } else { "no" }),
    ])
}

pub fn stats_table(stats: &[QueueStats], use_color: bool) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);

    let header = row!["Log", "Added", "Flushed", "Unflushed", "Dropped", "Capacity", "Shut down"];
    if use_color {
        table.set_titles(Row::new(
            header
                .iter()
                .map(|cell| cell.clone().style_spec("bFc"))
                .collect(),
        ));
    } else {
        table.set_titles(header);
    }

    for entry in stats {
        table.add_row(stats_row(entry, use_color));
    }
    table
}

pub fn print_stats_summary(stats: &[QueueStats], use_color: bool) {
    if stats.is_empty() {
        eprintln!("No system logs were registered.");
        return;
    }
    stats_table(stats, use_color).printstd();
}
