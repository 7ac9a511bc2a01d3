use mediagrab_core::{AppViewModel, FileRow, JobRowView, JobStatus, MediaKind};

pub fn summary_line(view: &AppViewModel) -> String {
    format!(
        "Jobs: {} | Downloading: {} | Completed: {} | Failed: {}",
        view.job_count, view.active_count, view.completed_count, view.failed_count
    )
}

pub fn job_line(job: &JobRowView) -> String {
    let mut line = format!(
        "[{}] {} {} ({})",
        job.job_id,
        job.status.label(),
        job.title(),
        describe_format(job)
    );

    match job.status {
        JobStatus::Downloading => {
            line.push_str(&format!(" {:.1}%", job.progress_percent));
            if let Some(text) = &job.progress_text {
                line.push_str(&format!(" {}", text.trim()));
            }
        }
        JobStatus::Completed => {
            if let Some(locator) = &job.download_locator {
                line.push_str(&format!(" -> {}", locator));
            }
        }
        JobStatus::Error => {
            if let Some(detail) = &job.error_detail {
                line.push_str(&format!(" error: {}", detail));
            }
        }
    }

    if let Some(secs) = job.elapsed_secs {
        line.push_str(&format!(" [{}s]", secs));
    }
    line
}

fn describe_format(job: &JobRowView) -> String {
    match job.media_kind {
        MediaKind::Audio => "audio".to_string(),
        MediaKind::Video => {
            let mut parts = vec!["video".to_string()];
            if let Some(height) = job.resolution {
                parts.push(format!("{}p", height));
            }
            if job.container != "best" {
                parts.push(job.container.to_uppercase());
            }
            parts.join(" ")
        }
    }
}

pub fn render_files(files: &[FileRow]) -> Vec<String> {
    if files.is_empty() {
        return vec!["No files yet".to_string()];
    }
    files
        .iter()
        .map(|file| {
            format!(
                "{:<6} {:>10}  {}  {}  {}",
                file.kind,
                format_size(file.size),
                file.modified_at,
                file.name,
                file.download_url
            )
        })
        .collect()
}

pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    let mut scaled = bytes as f64;
    let mut exponent = 0;
    while scaled >= 1024.0 && exponent < UNITS.len() - 1 {
        scaled /= 1024.0;
        exponent += 1;
    }
    let rounded = (scaled * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[exponent])
}
