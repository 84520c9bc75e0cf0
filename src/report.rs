use crate::metadata::Batch;

const HEADERS: [&str; 4] = ["filenames", "latitudes", "longitudes", "addresses"];

/// Tabular view of a batch, one row per located photo.
pub fn render_table(batch: &Batch) -> String {
    let names = batch.file_names();
    let latitudes = batch.latitudes();
    let longitudes = batch.longitudes();
    let addresses = batch.addresses();
    let rows: Vec<[String; 4]> = (0..names.len())
        .map(|i| {
            [
                names[i].to_string(),
                format!("{:.6}", latitudes[i]),
                format!("{:.6}", longitudes[i]),
                format!("[{}]", addresses[i].join(", ")),
            ]
        })
        .collect();

    let index_width = rows.len().saturating_sub(1).to_string().len();
    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    out.push_str(&" ".repeat(index_width));
    for (header, w) in HEADERS.iter().zip(widths.iter()) {
        out.push_str(&format!("  {:<w$}", header, w = w));
    }
    out.push('\n');
    for (i, row) in rows.iter().enumerate() {
        out.push_str(&format!("{:>w$}", i, w = index_width));
        for (cell, w) in row.iter().zip(widths.iter()) {
            out.push_str(&format!("  {:<w$}", cell, w = w));
        }
        out.push('\n');
    }
    out
}

pub fn summary(batch: &Batch) -> String {
    let mut line = format!(
        "{} files: {} located, {} without EXIF, {} failed",
        batch.processed(),
        batch.records.len(),
        batch.skipped.len(),
        batch.failed.len()
    );
    if !batch.failed.is_empty() {
        let failed: Vec<String> = batch
            .failed
            .iter()
            .map(|f| format!("{} ({}: {})", f.file_name, f.reason, f.detail))
            .collect();
        line.push_str(&format!(": {}", failed.join(", ")));
    }
    line
}
