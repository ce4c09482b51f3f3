use indicatif::{ProgressBar, ProgressStyle};

pub fn job_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::with_template(
            "{prefix:.bold} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} jobs {msg}",
        )
        .expect("valid bar template")
        .progress_chars("##-"),
    );
    pb.set_prefix("Rendering");
    pb
}
