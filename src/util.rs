use crate::model::Commit;
use crate::report::FilteredLog;
use console::style;

pub fn commits_matching<'a>(
    commits: &'a [Commit],
    path_prefix: Option<&'a str>,
) -> impl Iterator<Item = &'a Commit> + 'a {
    commits.iter().filter(move |c| {
        if let Some(prefix) = path_prefix {
            c.file_name().starts_with(prefix)
        } else {
            true
        }
    })
}

/// Prints collected errors to stderr so they never mix with JSON on stdout.
pub fn print_errors(log: &mut FilteredLog) {
    log.log_summary();
    for line in log.error_messages() {
        eprintln!("{}", style(line).yellow());
    }
}
