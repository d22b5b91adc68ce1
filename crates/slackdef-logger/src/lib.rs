use colored::Colorize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

const LOG_FILE_NAME: &str = "slackdef.log";

static LOG_FILE: Mutex<Option<PathBuf>> = Mutex::new(None);
static VERBOSITY: Mutex<u8> = Mutex::new(0);
static QUIET: Mutex<bool> = Mutex::new(false);

/// Get the current verbosity level
pub fn get_verbosity() -> u8 {
    VERBOSITY.lock().ok().map(|v| *v).unwrap_or(0)
}

/// Get whether console output other than errors is suppressed
pub fn get_quiet() -> bool {
    QUIET.lock().ok().map(|v| *v).unwrap_or(false)
}

/// Set whether console output other than errors is suppressed
pub fn set_quiet(quiet: bool) {
    if let Ok(mut v) = QUIET.lock() {
        *v = quiet;
    }
}

/// Convert verbosity level to a tracing filter directive
/// 0 = warn only, 1 = debug (-v), 2 = trace (-vv)
pub fn verbosity_to_filter() -> &'static str {
    if get_quiet() {
        return "error";
    }
    match get_verbosity() {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

/// Initialize the logger with a verbosity level, logging to the default file
pub fn init_with_verbosity(verbosity: u8, quiet: bool) -> Result<(), String> {
    let config_dir = get_config_dir()?;
    init_with_log_file(config_dir.join(LOG_FILE_NAME), verbosity, quiet)
}

/// Initialize the logger with an explicit log file
pub fn init_with_log_file(log_file: PathBuf, verbosity: u8, quiet: bool) -> Result<(), String> {
    if let Ok(mut v) = VERBOSITY.lock() {
        *v = verbosity;
    }
    set_quiet(quiet);

    if let Some(parent) = log_file.parent() {
        fs::create_dir_all(parent).map_err(|e| format!("Failed to create log directory: {}", e))?;
    }

    // Truncate log file on each run
    if log_file.exists() {
        let _ = fs::remove_file(&log_file);
    }

    let mut log_file_guard = LOG_FILE
        .lock()
        .map_err(|_| "Log file lock poisoned".to_string())?;
    *log_file_guard = Some(log_file);

    Ok(())
}

/// Get the config directory path
fn get_config_dir() -> Result<PathBuf, String> {
    #[cfg(not(target_os = "windows"))]
    let config_dir = dirs::home_dir()
        .ok_or("Could not determine home directory")?
        .join(".config")
        .join("slackdef");

    #[cfg(target_os = "windows")]
    let config_dir = dirs::config_dir()
        .ok_or("Could not determine config directory")?
        .join("slackdef");

    Ok(config_dir)
}

/// Write to log file
fn write_to_log(message: &str) {
    if let Ok(log_file_guard) = LOG_FILE.lock() {
        if let Some(ref log_path) = *log_file_guard {
            if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(log_path) {
                let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
                let _ = writeln!(file, "[{}] {}", timestamp, message);
            }
        }
    }
}

/// Log an informational message (to console if verbose >= 1, always to file)
pub fn info(message: &str) {
    write_to_log(&format!("INFO {}", message));
    if get_verbosity() >= 1 && !get_quiet() {
        eprintln!("{}", message);
    }
}

/// Log a debug message (to console if verbose >= 1, always to file)
pub fn debug(message: &str) {
    write_to_log(&format!("DEBUG {}", message));
    if get_verbosity() >= 1 && !get_quiet() {
        eprintln!("{} {}", "DEBUG:".blue().bold(), message);
    }
}

/// Log a warning message (to both file and console)
pub fn warn(message: &str) {
    write_to_log(&format!("WARN {}", message));
    if !get_quiet() {
        eprintln!("{} {}", "warning:".yellow().bold(), message);
    }
}

/// Log an error message (to both file and console)
pub fn error(message: &str) {
    write_to_log(&format!("ERROR {}", message));
    eprintln!("{} {}", "Error:".red().bold(), message);
}

/// Log a success message
pub fn success(message: &str) {
    write_to_log(&format!("SUCCESS {}", message));
    if !get_quiet() {
        let check = "\u{2714}".green().bold();
        eprintln!("{} {}", check, message);
    }
}

/// Log a step message (only shown with -vv)
pub fn step(message: &str) {
    if get_verbosity() >= 2 && !get_quiet() {
        eprintln!("TRACE: {}", message);
    }
    write_to_log(&format!("STEP: {}", message));
}

/// Get the log file path for display
pub fn get_log_path() -> Option<PathBuf> {
    LOG_FILE.lock().ok().and_then(|guard| guard.clone())
}

/// Print the log file path to the user
pub fn show_log_path() {
    if let Some(path) = get_log_path() {
        eprintln!("Log file: {}", path.display());
    } else if let Ok(config_dir) = get_config_dir() {
        eprintln!("Log file: {}", config_dir.join(LOG_FILE_NAME).display());
    } else {
        eprintln!("Log file location not available");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // Logger state is global; keep everything that touches it in one test
    #[test]
    fn test_messages_reach_log_file() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let log_file = temp_dir.path().join("logs").join("slackdef.log");

        assert!(init_with_log_file(log_file.clone(), 2, true).is_ok());
        assert_eq!(get_log_path(), Some(log_file.clone()));
        assert_eq!(get_verbosity(), 2);
        assert_eq!(verbosity_to_filter(), "error");

        set_quiet(false);
        assert_eq!(verbosity_to_filter(), "trace");

        info("building manifest");
        warn("no workflows declared");
        step("registered type 'incident'");

        let content = fs::read_to_string(&log_file).unwrap_or_default();
        assert!(content.contains("INFO building manifest"));
        assert!(content.contains("WARN no workflows declared"));
        assert!(content.contains("STEP: registered type 'incident'"));

        // Re-initializing starts a fresh file
        assert!(init_with_log_file(log_file.clone(), 0, false).is_ok());
        assert!(!log_file.exists());
        assert_eq!(verbosity_to_filter(), "warn");
    }
}
